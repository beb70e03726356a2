mod email;
mod tracking;

pub use self::email::{DynEmailService, EmailServiceTrait, OutgoingEmail};
pub use self::tracking::{DynTrackingStore, TrackingStoreTrait};
