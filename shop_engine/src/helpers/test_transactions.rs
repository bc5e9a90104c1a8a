//! Sandbox transaction ids.
//!
//! Transaction ids shaped like an uppercase UUID (`8-4-4-4-12` hexadecimal groups) are treated as test payments: the
//! reconciliation engine skips the amount check for them. This lets QA pay for arbitrary orders with a canned sandbox
//! capture.
//!
//! **Caution:** the pattern is checked on the id alone. Any provider id that happens to have this shape bypasses the
//! amount check, in every environment.
use once_cell::sync::Lazy;
use regex::Regex;

static TEST_TRANSACTION_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?i)^[A-F0-9]{8}-[A-F0-9]{4}-[A-F0-9]{4}-[A-F0-9]{4}-[A-F0-9]{12}$")
        .map_err(|e| log::error!("🧪️ The test transaction pattern is not a valid regex. {e}"))
        .ok()
});

/// True if the transaction id has the shape of a sandbox test id. The match is case-insensitive.
pub fn is_test_transaction_id(transaction_id: &str) -> bool {
    TEST_TRANSACTION_PATTERN.as_ref().map(|re| re.is_match(transaction_id)).unwrap_or(false)
}

/// Generates a random transaction id that [`is_test_transaction_id`] accepts.
pub fn generate_test_transaction_id() -> String {
    uuid::Uuid::new_v4().to_string().to_uppercase()
}
