//! Delivery policy enforcement.
//!
//! Channel selection never looks at [`NotificationPolicy`](crate::notification::NotificationPolicy);
//! the gate here sits between selection and delivery and applies cooldown,
//! duplicate suppression and a per-minute cap per channel id.

mod gate;
mod token_bucket;

pub use gate::{fingerprint, PolicyDecision, PolicyGate, PolicyGateConfig, PolicyGateStats};
pub use token_bucket::TokenBucket;
