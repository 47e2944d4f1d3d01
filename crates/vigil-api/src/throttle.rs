//! # PIN Guessing Throttle
//!
//! Fixed-window failure counter keyed by complaint id. Once an id has
//! collected `max_failures` rejected track attempts inside the window,
//! further attempts are refused without reaching the store. The refusal
//! is the same generic 401 as a wrong PIN.
//!
//! Successful tracks do not clear the window, so interleaving a known
//! PIN with guesses buys nothing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use vigil_core::ComplaintId;

/// Throttle configuration.
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// Failures allowed per window.
    pub max_failures: u32,
    /// Window length.
    pub window: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_failures: 5,
            window: Duration::from_secs(15 * 60),
        }
    }
}

#[derive(Debug, Clone)]
struct Window {
    failures: u32,
    started: Instant,
}

/// Shared throttle state.
#[derive(Debug, Clone)]
pub struct PinThrottle {
    config: ThrottleConfig,
    windows: Arc<Mutex<HashMap<ComplaintId, Window>>>,
}

impl Default for PinThrottle {
    fn default() -> Self {
        Self::new(ThrottleConfig::default())
    }
}

impl PinThrottle {
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Whether another attempt for `id` may proceed.
    pub fn allows(&self, id: ComplaintId) -> bool {
        self.allows_at(id, Instant::now())
    }

    /// Count a rejected attempt for `id`.
    pub fn record_failure(&self, id: ComplaintId) {
        self.record_failure_at(id, Instant::now());
    }

    fn allows_at(&self, id: ComplaintId, now: Instant) -> bool {
        let mut windows = self.windows.lock();
        let Some(w) = windows.get(&id) else {
            return true;
        };
        if now.duration_since(w.started) < self.config.window {
            return w.failures < self.config.max_failures;
        }
        windows.remove(&id);
        true
    }

    fn record_failure_at(&self, id: ComplaintId, now: Instant) {
        let mut windows = self.windows.lock();
        let window = windows.entry(id).or_insert(Window {
            failures: 0,
            started: now,
        });
        if now.duration_since(window.started) >= self.config.window {
            window.failures = 0;
            window.started = now;
        }
        window.failures = window.failures.saturating_add(1);

        if window.failures == self.config.max_failures {
            tracing::warn!(complaint_id = %id, "track attempts throttled");
        }
    }

    /// Drop windows that have expired.
    pub fn prune(&self) {
        let now = Instant::now();
        let window = self.config.window;
        self.windows
            .lock()
            .retain(|_, w| now.duration_since(w.started) < window);
    }

    /// Number of ids currently tracked.
    pub fn tracked(&self) -> usize {
        self.windows.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_after_max_failures() {
        let throttle = PinThrottle::default();
        let id = ComplaintId::new();
        for _ in 0..5 {
            assert!(throttle.allows(id));
            throttle.record_failure(id);
        }
        assert!(!throttle.allows(id));
    }

    #[test]
    fn ids_are_independent() {
        let throttle = PinThrottle::default();
        let a = ComplaintId::new();
        let b = ComplaintId::new();
        for _ in 0..5 {
            throttle.record_failure(a);
        }
        assert!(!throttle.allows(a));
        assert!(throttle.allows(b));
    }

    #[test]
    fn window_expiry_resets() {
        let throttle = PinThrottle::new(ThrottleConfig {
            max_failures: 2,
            window: Duration::from_secs(60),
        });
        let id = ComplaintId::new();
        let start = Instant::now();
        throttle.record_failure_at(id, start);
        throttle.record_failure_at(id, start);
        assert!(!throttle.allows_at(id, start + Duration::from_secs(59)));
        assert!(throttle.allows_at(id, start + Duration::from_secs(60)));
        assert_eq!(throttle.tracked(), 0);
    }

    #[test]
    fn prune_keeps_live_windows() {
        let throttle = PinThrottle::default();
        throttle.record_failure(ComplaintId::new());
        throttle.prune();
        assert_eq!(throttle.tracked(), 1);
    }
}
