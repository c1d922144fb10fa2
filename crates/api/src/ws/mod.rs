//! Realtime WebSocket infrastructure.
//!
//! Connections are authenticated at upgrade time and registered per
//! identity with [`WsManager`]. [`ChangeForwarder`] relays every
//! [`ChangeEvent`](learnspace_events::ChangeEvent) on the server bus to
//! the sockets of the identity it concerns.

mod forwarder;
mod handler;
mod heartbeat;
pub mod manager;

pub use forwarder::ChangeForwarder;
pub use handler::realtime_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
