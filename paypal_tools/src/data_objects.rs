use serde::{Deserialize, Serialize};
use shop_common::{payments::Payer, PaymentAmount, PaymentDetails, PAYMENT_STATUS_COMPLETED};

use crate::PaypalApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
    #[serde(default)]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseUnit {
    pub amount: PaymentAmount,
}

/// A PayPal checkout order, as returned by `/v2/checkout/orders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaypalOrder {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub purchase_units: Vec<PurchaseUnit>,
    #[serde(default)]
    pub payer: Option<Payer>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl PaypalOrder {
    /// The amount of the first purchase unit. The shop only ever creates single-unit orders.
    pub fn into_payment_details(self) -> Result<PaymentDetails, PaypalApiError> {
        let amount = self
            .purchase_units
            .into_iter()
            .next()
            .map(|u| u.amount)
            .ok_or_else(|| PaypalApiError::MissingPurchaseUnit(self.id.clone()))?;
        Ok(PaymentDetails { id: self.id, status: self.status, amount, payer: self.payer.unwrap_or_default() })
    }

    pub fn approval_url(&self) -> Option<&str> {
        self.links.iter().find(|l| l.rel == "approve").map(|l| l.href.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationContext {
    pub return_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCheckoutOrder {
    pub intent: String,
    pub purchase_units: Vec<PurchaseUnit>,
    pub application_context: ApplicationContext,
}

impl NewCheckoutOrder {
    pub fn capture(amount: PaymentAmount, return_url: String, cancel_url: String) -> Self {
        Self {
            intent: "CAPTURE".to_string(),
            purchase_units: vec![PurchaseUnit { amount }],
            application_context: ApplicationContext { return_url, cancel_url },
        }
    }
}

/// A checkout order that is waiting for the customer's approval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedPayment {
    pub id: String,
    pub approval_url: String,
}

pub fn mock_payment_details(transaction_id: &str) -> PaymentDetails {
    PaymentDetails {
        id: transaction_id.to_string(),
        status: PAYMENT_STATUS_COMPLETED.to_string(),
        amount: PaymentAmount::new("USD", "999999.00"),
        payer: Payer { email_address: Some("test@example.com".into()), payer_id: Some("TEST_PAYER_ID".into()) },
    }
}
