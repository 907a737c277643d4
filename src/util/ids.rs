use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Last id handed out (or observed from loaded data), in epoch milliseconds
static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Generate a fresh id: the current millisecond timestamp, bumped past the
/// last issued id so two calls in the same millisecond never collide.
pub fn fresh_id() -> String {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_ID.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_ID.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next.to_string(),
            Err(actual) => last = actual,
        }
    }
}

/// Raise the id floor above an id that already exists (e.g. loaded from disk).
/// Non-numeric ids are ignored.
pub fn observe_id(id: &str) {
    if let Ok(n) = id.parse::<i64>() {
        LAST_ID.fetch_max(n, Ordering::Relaxed);
    }
}
