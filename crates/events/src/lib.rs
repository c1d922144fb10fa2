//! Typed change notifications for the learning-space platform.
//!
//! Every mutation of a user-visible collection is announced as a
//! [`ChangeEvent`] on a [`ChangeBus`]. The server publishes from its
//! mutation handlers and forwards events over the realtime socket; the
//! client publishes after its own writes and republishes what the socket
//! delivers. Views that need to stay fresh subscribe to the topics they
//! display.
//!
//! - [`ChangeBus`]: in-process fan-out hub backed by `tokio::sync::broadcast`.
//! - [`ChangeEvent`]: the event envelope.
//! - [`ChangeTopic`] / [`ChangeKind`]: what changed and how.
//! - [`ScopedSubscription`]: a receiver filtered to one identity and a set
//!   of topics.

pub mod bus;
pub mod event;

pub use bus::{ChangeBus, ScopedSubscription};
pub use event::{ChangeEvent, ChangeKind, ChangeTopic, UnknownTopic};
