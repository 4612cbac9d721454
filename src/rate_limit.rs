use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// In-memory minimum-interval guard keyed by "<limit id>:<client ip>".
/// A key may pass at most once per `throttle`; the pass is recorded at check time,
/// so an attempt that later fails still holds the slot.
pub struct RateLimiter {
    last_hit: Mutex<HashMap<String, Instant>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        RateLimiter {
            last_hit: Mutex::new(HashMap::new()),
        }
    }

    /// Record an attempt under `key` and return `None` if it is allowed.
    /// Returns the time left until the key frees up when the attempt is too early.
    /// A zero `throttle` always passes and records nothing.
    pub fn check_and_record(&self, key: &str, throttle: Duration) -> Option<Duration> {
        if throttle.is_zero() {
            return None;
        }
        let mut map = self.last_hit.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();

        if let Some(last) = map.get(key) {
            let elapsed = now.saturating_duration_since(*last);
            if elapsed < throttle {
                return Some(throttle - elapsed);
            }
        }

        map.insert(key.to_string(), now);
        None
    }

    /// Forget keys whose last pass is older than `max_age` (call from a fairing or timer).
    pub fn cleanup(&self, max_age: Duration) {
        let mut map = self.last_hit.lock().unwrap_or_else(|e| e.into_inner());
        map.retain(|_, last| last.elapsed() < max_age);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
