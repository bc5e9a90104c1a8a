mod test_transactions;

pub use test_transactions::{generate_test_transaction_id, is_test_transaction_id};
