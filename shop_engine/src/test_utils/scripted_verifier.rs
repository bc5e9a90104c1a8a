use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
        Mutex,
    },
};

use shop_common::{
    payments::Payer,
    PaymentAmount,
    PaymentDetails,
    PaymentVerifier,
    PaymentVerifierError,
    DEFAULT_CURRENCY_CODE,
};

/// A payment provider stand-in that answers from a script. Clones share the same script, so a test can keep a handle
/// and adjust responses after handing a clone to the engine.
#[derive(Debug, Clone, Default)]
pub struct ScriptedVerifier {
    responses: Arc<Mutex<HashMap<String, Result<PaymentDetails, PaymentVerifierError>>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a response for `transaction_id` with the given status and amount (e.g. "230.00").
    pub fn with_payment(&self, transaction_id: &str, status: &str, value: &str) -> &Self {
        let details = PaymentDetails {
            id: transaction_id.to_string(),
            status: status.to_string(),
            amount: PaymentAmount::new(DEFAULT_CURRENCY_CODE, value),
            payer: Payer { email_address: Some("buyer@example.com".into()), payer_id: Some("TESTBUYER01".into()) },
        };
        self.script(transaction_id, Ok(details));
        self
    }

    /// Scripts the full provider response for `transaction_id`. The reported id need not match the one asked about.
    pub fn with_details(&self, transaction_id: &str, details: PaymentDetails) -> &Self {
        self.script(transaction_id, Ok(details));
        self
    }

    pub fn with_error(&self, transaction_id: &str, error: PaymentVerifierError) -> &Self {
        self.script(transaction_id, Err(error));
        self
    }

    /// The number of times the engine has asked about any transaction.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn script(&self, transaction_id: &str, response: Result<PaymentDetails, PaymentVerifierError>) {
        let mut responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
        responses.insert(transaction_id.to_string(), response);
    }
}

impl PaymentVerifier for ScriptedVerifier {
    async fn verify_payment(&self, transaction_id: &str) -> Result<PaymentDetails, PaymentVerifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
        responses
            .get(transaction_id)
            .cloned()
            .unwrap_or_else(|| Err(PaymentVerifierError::TransactionNotFound(transaction_id.to_string())))
    }
}
