mod money;

pub mod helpers;
pub mod op;
pub mod payments;
mod secret;

pub use money::{Money, MoneyConversionError, DEFAULT_CURRENCY_CODE};
pub use payments::{PaymentAmount, PaymentDetails, PaymentVerifier, PaymentVerifierError, PAYMENT_STATUS_COMPLETED};
pub use secret::Secret;
