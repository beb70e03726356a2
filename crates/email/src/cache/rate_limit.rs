use crate::{abstract_trait::rate_limit::RateLimitMiddlewareTrait, config::RateLimitConfig};
use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing::{debug, error};

/// Past this many keys, expired windows are dropped before tracking a new one.
const MAX_TRACKED_KEYS: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter kept in process memory.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_seconds),
            windows: Mutex::new(HashMap::new()),
        }
    }

    fn current(&self, window: &Window, now: Instant) -> u32 {
        if now.duration_since(window.started) >= self.window {
            0
        } else {
            window.count
        }
    }
}

impl RateLimitMiddlewareTrait for RateLimiter {
    fn check_rate_limit(&self, key: &str) -> (bool, u32) {
        let mut windows = match self.windows.lock() {
            Ok(windows) => windows,
            Err(e) => {
                error!("Rate limiter state poisoned: {:?}", e);
                return (false, 0);
            }
        };

        let now = Instant::now();

        if windows.len() > MAX_TRACKED_KEYS {
            let before = windows.len();
            windows.retain(|_, w| now.duration_since(w.started) < self.window);
            debug!("Evicted {} expired rate limit windows", before - windows.len());
        }

        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= self.window {
            *window = Window {
                started: now,
                count: 0,
            };
        }

        if window.count >= self.max_requests {
            debug!("Rate limit exceeded for key: {key}");
            return (false, window.count);
        }

        window.count += 1;
        (true, window.count)
    }

    fn get_remaining(&self, key: &str) -> u32 {
        let windows = match self.windows.lock() {
            Ok(windows) => windows,
            Err(_) => return 0,
        };

        let used = windows
            .get(key)
            .map(|window| self.current(window, Instant::now()))
            .unwrap_or(0);

        self.max_requests.saturating_sub(used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_seconds: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            max_requests,
            window_seconds,
        })
    }

    #[test]
    fn admits_up_to_the_limit_per_key() {
        let limiter = limiter(2, 60);

        assert_eq!(limiter.check_rate_limit("rate_limit:1.1.1.1"), (true, 1));
        assert_eq!(limiter.check_rate_limit("rate_limit:1.1.1.1"), (true, 2));
        assert_eq!(limiter.check_rate_limit("rate_limit:1.1.1.1"), (false, 2));
        assert_eq!(limiter.check_rate_limit("rate_limit:2.2.2.2"), (true, 1));
        assert_eq!(limiter.get_remaining("rate_limit:1.1.1.1"), 0);
        assert_eq!(limiter.get_remaining("rate_limit:2.2.2.2"), 1);
    }

    fn tracked_keys(limiter: &RateLimiter) -> usize {
        limiter.windows.lock().unwrap().len()
    }

    #[test]
    fn expired_windows_are_evicted_once_the_map_is_full() {
        let limiter = limiter(1, 0);

        for i in 0..=MAX_TRACKED_KEYS + 1 {
            limiter.check_rate_limit(&format!("rate_limit:client-{i}"));
        }

        assert_eq!(tracked_keys(&limiter), 1);
    }

    #[test]
    fn live_windows_survive_eviction() {
        let limiter = limiter(1, 60);

        for i in 0..=MAX_TRACKED_KEYS + 1 {
            limiter.check_rate_limit(&format!("rate_limit:client-{i}"));
        }

        assert_eq!(tracked_keys(&limiter), MAX_TRACKED_KEYS + 2);
        assert!(!limiter.check_rate_limit("rate_limit:client-0").0);
    }

    #[test]
    fn window_resets_after_expiry() {
        let limiter = limiter(1, 0);

        assert!(limiter.check_rate_limit("k").0);
        assert!(limiter.check_rate_limit("k").0);
        assert_eq!(limiter.get_remaining("k"), 1);
    }
}
