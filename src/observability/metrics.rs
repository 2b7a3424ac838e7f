//! Metrics collection.
//!
//! # Metrics
//! - `handroyal_transactions_total` (counter): pipeline outcomes by `outcome`
//! - `handroyal_transaction_polls_total` (counter): `transactionResult` polls
//! - `handroyal_transaction_wait_seconds` (histogram): staging to terminal status
//! - `handroyal_subscription_events_total` (counter): pushed events by `subscription`
//! - `handroyal_storage_writes_total` (counter): local storage flushes

use metrics::{counter, histogram};
use std::time::Duration;

/// Record a transaction reaching a pipeline milestone or terminal state.
pub fn record_transaction(outcome: &'static str) {
    counter!("handroyal_transactions_total", "outcome" => outcome).increment(1);
}

/// Record one `transactionResult` poll.
pub fn record_poll() {
    counter!("handroyal_transaction_polls_total").increment(1);
}

/// Record the time spent waiting for a terminal status.
pub fn record_wait(elapsed: Duration) {
    histogram!("handroyal_transaction_wait_seconds").record(elapsed.as_secs_f64());
}

/// Record an event delivered on a push subscription.
pub fn record_subscription_event(subscription: &str) {
    counter!("handroyal_subscription_events_total", "subscription" => subscription.to_string())
        .increment(1);
}

/// Record a flush of the local key/value store.
pub fn record_storage_write() {
    counter!("handroyal_storage_writes_total").increment(1);
}
