use rand::{distributions::Alphanumeric, Rng};

/// Generates an opaque transaction identity for a settlement attempt, e.g. `txn-h2Kd81jJ3mPq0sWvXyZa4bCe`.
pub fn new_transaction_id() -> String {
    let suffix: String = rand::thread_rng().sample_iter(&Alphanumeric).take(24).map(char::from).collect();
    format!("txn-{suffix}")
}
