use std::sync::Arc;

use log::*;
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use shop_common::{Money, PaymentAmount, PaymentDetails, PaymentVerifier, PaymentVerifierError};

use crate::{
    config::PaypalConfig,
    data_objects::{mock_payment_details, AccessToken, CreatedPayment, NewCheckoutOrder, PaypalOrder},
    helpers::is_sandbox_transaction_id,
    PaypalApiError,
};

#[derive(Clone)]
pub struct PaypalApi {
    config: PaypalConfig,
    client: Arc<Client>,
}

impl PaypalApi {
    pub fn new(config: PaypalConfig) -> Result<Self, PaypalApiError> {
        let client = Client::builder().build().map_err(|e| PaypalApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &PaypalConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    /// Fetches a fresh client-credentials token. Tokens are not cached; every call to PayPal asks for a new one.
    pub async fn access_token(&self) -> Result<String, PaypalApiError> {
        trace!("💳️ Requesting PayPal access token");
        let response = self
            .client
            .post(self.url("/v1/oauth2/token"))
            .basic_auth(&self.config.client_id, Some(self.config.client_secret.reveal()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| PaypalApiError::AuthenticationError(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(PaypalApiError::AuthenticationError(format!("{status}. {message}")));
        }
        let token =
            response.json::<AccessToken>().await.map_err(|e| PaypalApiError::AuthenticationError(e.to_string()))?;
        trace!("💳️ Access token received. Expires in {}s", token.expires_in);
        Ok(token.access_token)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, PaypalApiError> {
        let token = self.access_token().await?;
        let response = req
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| PaypalApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("💳️ PayPal query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| PaypalApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| PaypalApiError::RestResponseError(e.to_string()))?;
            Err(PaypalApiError::QueryError { status, message })
        }
    }

    pub async fn fetch_checkout_order(&self, order_id: &str) -> Result<PaypalOrder, PaypalApiError> {
        debug!("💳️ Fetching PayPal order {order_id}");
        let req = self.client.get(self.url(&format!("/v2/checkout/orders/{order_id}")));
        self.send(req).await
    }

    /// Asks PayPal about a checkout order. In mock mode, sandbox-looking ids are answered locally with a completed
    /// payment for 999999.00 USD.
    pub async fn fetch_payment_details(&self, transaction_id: &str) -> Result<PaymentDetails, PaypalApiError> {
        if self.config.mock_payments && is_sandbox_transaction_id(transaction_id) {
            warn!("💳️🧪️ Mock mode. Reporting {transaction_id} as a completed payment without asking PayPal");
            return Ok(mock_payment_details(transaction_id));
        }
        let order = self.fetch_checkout_order(transaction_id).await?;
        order.into_payment_details()
    }

    /// Creates a checkout order that captures `amount` once the customer approves it.
    pub async fn create_payment(&self, amount: Money, currency: &str) -> Result<CreatedPayment, PaypalApiError> {
        let body = NewCheckoutOrder::capture(
            PaymentAmount::new(currency, amount.to_string()),
            self.config.return_url(),
            self.config.cancel_url(),
        );
        debug!("💳️ Creating PayPal order for {amount} {currency}");
        let req = self.client.post(self.url("/v2/checkout/orders")).json(&body);
        let order = self.send::<PaypalOrder>(req).await?;
        let approval_url =
            order.approval_url().ok_or_else(|| PaypalApiError::MissingApprovalLink(order.id.clone()))?.to_string();
        info!("💳️ Created PayPal order {} for {amount} {currency}", order.id);
        Ok(CreatedPayment { id: order.id, approval_url })
    }
}

impl PaymentVerifier for PaypalApi {
    async fn verify_payment(&self, transaction_id: &str) -> Result<PaymentDetails, PaymentVerifierError> {
        self.fetch_payment_details(transaction_id).await.map_err(|e| {
            warn!("💳️ Could not verify payment {transaction_id}. {e}");
            PaymentVerifierError::from(e)
        })
    }
}
