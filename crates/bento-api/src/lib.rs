//! Record types and protocol for bentod IPC
//!
//! This crate defines the stable API between bentod and clients:
//! - Records (todos, journal entries, identities)
//! - Commands (requests from clients)
//! - Responses
//! - Versioning

mod commands;
mod types;

pub use commands::*;
pub use types::*;

/// Current API version
pub const API_VERSION: u32 = 1;
