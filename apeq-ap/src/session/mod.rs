//! Playback session: coordinator task and listener registry

pub mod coordinator;
pub mod registry;

pub use coordinator::{
    SessionCoordinator, SessionHandle, SessionStatus, TransportCommand, PROGRESS_INTERVAL,
};
pub use registry::{CallbackRegistry, ListenerId};
