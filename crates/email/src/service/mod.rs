mod dispatch;
mod email;
mod tracking;

pub use self::dispatch::EmailDispatchService;
pub use self::email::EmailService;
pub use self::tracking::InMemoryTrackingStore;
