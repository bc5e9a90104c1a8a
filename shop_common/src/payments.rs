//! The contract between the reconciliation engine and an external payment provider.
//!
//! A verifier takes a provider transaction id and reports what the provider knows about that transaction: its
//! settlement status and the amount that was actually captured. The engine never trusts client-supplied amounts;
//! everything it reconciles against comes through this trait.
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The only provider status that counts as a settled payment.
pub const PAYMENT_STATUS_COMPLETED: &str = "COMPLETED";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAmount {
    pub currency_code: String,
    /// Decimal amount as reported by the provider, e.g. "230.00"
    pub value: String,
}

impl PaymentAmount {
    pub fn new<S: Into<String>, V: Into<String>>(currency_code: S, value: V) -> Self {
        Self { currency_code: currency_code.into(), value: value.into() }
    }

    pub fn decimal_value(&self) -> Result<Decimal, rust_decimal::Error> {
        Decimal::from_str(self.value.trim())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payer {
    pub email_address: Option<String>,
    pub payer_id: Option<String>,
}

/// What the provider reports for a single transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub id: String,
    pub status: String,
    pub amount: PaymentAmount,
    #[serde(default)]
    pub payer: Payer,
}

impl PaymentDetails {
    pub fn is_completed(&self) -> bool {
        self.status == PAYMENT_STATUS_COMPLETED
    }
}

#[derive(Debug, Clone, Error)]
pub enum PaymentVerifierError {
    #[error("Could not authenticate with the payment provider: {0}")]
    AuthenticationFailed(String),
    #[error("The payment provider does not know transaction {0}")]
    TransactionNotFound(String),
    #[error("The payment provider rejected the request. Error {status}. {message}")]
    ProviderError { status: u16, message: String },
    #[error("Could not reach the payment provider: {0}")]
    RequestFailed(String),
    #[error("The payment provider returned an unexpected response: {0}")]
    MalformedResponse(String),
}

/// Looks up a transaction with an external payment provider.
#[allow(async_fn_in_trait)]
pub trait PaymentVerifier {
    async fn verify_payment(&self, transaction_id: &str) -> Result<PaymentDetails, PaymentVerifierError>;
}

#[cfg(test)]
mod test {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn deserialize_payment_details() {
        let json = r#"{
            "id": "8MC585209K746392H",
            "status": "COMPLETED",
            "amount": { "currency_code": "USD", "value": "230.00" },
            "payer": { "email_address": "buyer@example.com", "payer_id": "QYR5Z8XDVJNXQ" }
        }"#;
        let details: PaymentDetails = serde_json::from_str(json).unwrap();
        assert!(details.is_completed());
        assert_eq!(details.amount.decimal_value().unwrap(), dec!(230.00));
        assert_eq!(details.payer.payer_id.as_deref(), Some("QYR5Z8XDVJNXQ"));
    }

    #[test]
    fn payer_is_optional() {
        let json = r#"{"id": "X", "status": "PENDING", "amount": { "currency_code": "USD", "value": "1" }}"#;
        let details: PaymentDetails = serde_json::from_str(json).unwrap();
        assert!(!details.is_completed());
        assert_eq!(details.payer, Payer::default());
    }
}
