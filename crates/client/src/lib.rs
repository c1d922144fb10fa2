//! Client-side data sync for the learning space.
//!
//! A [`SessionStore`] owns the signed-in identity with its profile and
//! token balance. [`Collection`]s mirror backend lists (classrooms,
//! modules, prompt sessions, prompt messages) and refetch after every
//! write. Every successful mutation publishes a
//! [`ChangeEvent`](learnspace_events::ChangeEvent) on a shared
//! [`ChangeBus`](learnspace_events::ChangeBus); the [`Sidebar`] and any
//! other listener refetch from there. A [`RealtimeListener`] feeds the
//! server's change stream into the same bus.

pub mod backend;
pub mod collection;
pub mod config;
pub mod error;
mod guard;
pub mod http;
pub mod realtime;
pub mod reconnect;
pub mod session;
pub mod sidebar;
pub mod signal;

pub use backend::Backend;
pub use collection::{
    ClassroomCollection, Collection, CollectionSource, CollectionState, ModuleCollection,
    PromptMessageCollection, PromptSessionCollection, WritableSource,
};
pub use config::ClientConfig;
pub use error::ClientError;
pub use http::HttpBackend;
pub use realtime::RealtimeListener;
pub use session::{SessionSnapshot, SessionStore};
pub use sidebar::Sidebar;
pub use signal::signal;
