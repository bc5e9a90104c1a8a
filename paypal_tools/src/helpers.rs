use once_cell::sync::Lazy;
use regex::RegexSet;

static SANDBOX_ID_PATTERNS: Lazy<Option<RegexSet>> = Lazy::new(|| {
    RegexSet::new([
        r"(?i)^[A-F0-9]{8}-[A-F0-9]{4}-[A-F0-9]{4}-[A-F0-9]{4}-[A-F0-9]{12}$",
        r"(?i)^PAYPAL_TEST_",
        r"(?i)^TXN_",
        r"(?i)^pi_test_",
    ])
    .ok()
});

/// True for ids that only ever come from sandboxes and test scripts. Only consulted in mock mode.
pub fn is_sandbox_transaction_id(transaction_id: &str) -> bool {
    SANDBOX_ID_PATTERNS.as_ref().map(|set| set.is_match(transaction_id)).unwrap_or(false)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sandbox_ids() {
        assert!(is_sandbox_transaction_id("EF68DCEA-CCD3-E05D-696D-EDDC7FE9BED3"));
        assert!(is_sandbox_transaction_id("ef68dcea-ccd3-e05d-696d-eddc7fe9bed3"));
        assert!(is_sandbox_transaction_id("PAYPAL_TEST_0001"));
        assert!(is_sandbox_transaction_id("txn_42"));
        assert!(is_sandbox_transaction_id("pi_test_abc"));
        assert!(!is_sandbox_transaction_id("8MC585209K746392H"));
        assert!(!is_sandbox_transaction_id("ORDER_TXN_1"));
        assert!(!is_sandbox_transaction_id("EF68DCEA-CCD3-E05D-696D-EDDC7FE9BED3X"));
    }
}
