use shop_common::PaymentVerifierError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaypalApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not obtain an access token: {0}")]
    AuthenticationError(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("PayPal did not return any purchase units for order {0}")]
    MissingPurchaseUnit(String),
    #[error("PayPal did not return an approval link for order {0}")]
    MissingApprovalLink(String),
}

impl From<PaypalApiError> for PaymentVerifierError {
    fn from(e: PaypalApiError) -> Self {
        match e {
            PaypalApiError::AuthenticationError(s) => Self::AuthenticationFailed(s),
            PaypalApiError::QueryError { status: 404, message } => Self::TransactionNotFound(message),
            PaypalApiError::QueryError { status, message } => Self::ProviderError { status, message },
            PaypalApiError::Initialization(s) | PaypalApiError::RestResponseError(s) => Self::RequestFailed(s),
            e => Self::MalformedResponse(e.to_string()),
        }
    }
}
