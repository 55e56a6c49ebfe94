//! Shared utilities for bento
//!
//! This crate provides:
//! - The canonical date key used to join todos and journal entries
//! - ID types (OwnerId, RecordId, SessionToken, ClientId)
//! - Clock helpers with mock time for development
//! - Default paths for socket, data, state, and config files

mod date_key;
mod ids;
mod paths;
mod time;

pub use date_key::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
