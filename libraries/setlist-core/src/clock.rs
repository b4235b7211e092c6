//! Wall-clock helpers.
//!
//! Every timestamp in the dataset is Unix time in milliseconds.

use chrono::Utc;

/// Current wall-clock time in Unix milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
