//! Planner state for bento
//!
//! This crate holds everything a front end needs to drive the planner:
//! - Session provider (sign in, register, restore, sign out)
//! - Task list with write-then-reflect mutations
//! - Calendar selection and the Monday-first month grid
//! - Journal entries with per-date drafts
//! - Theme and user-visible notices
//! - The dashboard that composes all of the above

mod calendar;
mod dashboard;
mod journal;
mod notice;
mod session;
mod tasks;
mod theme;

pub use calendar::*;
pub use dashboard::*;
pub use journal::*;
pub use notice::*;
pub use session::*;
pub use tasks::*;
pub use theme::*;

use bento_store::StoreError;
use bento_util::RecordId;
use thiserror::Error;

/// Planner errors
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Not signed in")]
    NotSignedIn,

    #[error("No task with id {0}")]
    UnknownTodo(RecordId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type PlannerResult<T> = Result<T, PlannerError>;
