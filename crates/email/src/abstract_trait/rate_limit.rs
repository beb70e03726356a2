use std::sync::Arc;

pub type DynRateLimitMiddleware = Arc<dyn RateLimitMiddlewareTrait + Send + Sync>;

pub trait RateLimitMiddlewareTrait {
    /// Counts one request against `key`; returns whether it is admitted and
    /// the count in the current window.
    fn check_rate_limit(&self, key: &str) -> (bool, u32);
    fn get_remaining(&self, key: &str) -> u32;
}
