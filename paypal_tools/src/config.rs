use log::*;
use shop_common::{helpers::parse_boolean_flag, Secret};

pub const DEFAULT_PAYPAL_BASE_URL: &str = "https://api-m.sandbox.paypal.com";
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, Default)]
pub struct PaypalConfig {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub base_url: String,
    /// When set, sandbox-looking transaction ids are answered locally with a synthetic completed payment.
    pub mock_payments: bool,
    /// Where PayPal sends the customer after approving or cancelling a payment.
    pub frontend_url: String,
}

impl PaypalConfig {
    pub fn new_from_env_or_default() -> Self {
        let client_id = std::env::var("PAYPAL_CLIENT_ID").unwrap_or_else(|_| {
            warn!("🪛️ PAYPAL_CLIENT_ID not set, using an empty client id. Calls to PayPal will fail.");
            String::default()
        });
        let client_secret = Secret::new(std::env::var("PAYPAL_CLIENT_SECRET").unwrap_or_else(|_| {
            warn!("🪛️ PAYPAL_CLIENT_SECRET not set, using an empty secret. Calls to PayPal will fail.");
            String::default()
        }));
        let base_url = std::env::var("PAYPAL_BASE_URL").unwrap_or_else(|_| {
            info!("🪛️ PAYPAL_BASE_URL not set, using {DEFAULT_PAYPAL_BASE_URL}");
            DEFAULT_PAYPAL_BASE_URL.to_string()
        });
        let mock_payments = parse_boolean_flag(std::env::var("PAYPAL_MOCK_PAYMENTS").ok(), false);
        if mock_payments {
            warn!("🪛️ PAYPAL_MOCK_PAYMENTS is on. Sandbox transaction ids will be reported as paid without asking PayPal");
        }
        let frontend_url = std::env::var("FRONTEND_URL").unwrap_or_else(|_| {
            warn!("🪛️ FRONTEND_URL not set, using {DEFAULT_FRONTEND_URL}");
            DEFAULT_FRONTEND_URL.to_string()
        });
        Self {
            client_id,
            client_secret,
            base_url: base_url.trim_end_matches('/').to_string(),
            mock_payments,
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn return_url(&self) -> String {
        format!("{}/checkout/success", self.frontend_url)
    }

    pub fn cancel_url(&self) -> String {
        format!("{}/checkout/cancel", self.frontend_url)
    }
}
