//! Job state-change notification hub.
//!
//! - [`EventBus`]: in-process publish/subscribe hub with one bounded queue
//!   per subscriber.
//! - [`JobEvent`]: the event pushed to subscribers on every accepted
//!   transition.

pub mod bus;

pub use bus::{EventBus, JobEvent, SubscriberId, Subscription};
