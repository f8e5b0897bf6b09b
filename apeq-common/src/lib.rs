//! # APEQ Common Library
//!
//! Shared code for the APEQ player processes including:
//! - Event types (PlayerEvent enum)
//! - Track descriptor wire type
//! - Configuration loading
//! - Time display formatting

pub mod config;
pub mod error;
pub mod events;
pub mod human_time;

pub use error::{Error, Result};
pub use events::{PlayerEvent, SessionState, TrackDescriptor};
