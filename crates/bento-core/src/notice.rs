//! User-visible notices for failed operations

use std::fmt;
use tracing::warn;

use crate::PlannerResult;

/// A failed operation, phrased for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// What the user was trying to do, e.g. "save journal entry"
    pub action: String,
    pub message: String,
}

impl Notice {
    pub fn new(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not {}: {}", self.action, self.message)
    }
}

/// Pending notices, oldest first
#[derive(Debug, Default)]
pub struct Notices {
    pending: Vec<Notice>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notice: Notice) {
        warn!(action = %notice.action, message = %notice.message, "Operation failed");
        self.pending.push(notice);
    }

    /// Pass a result through, recording a notice if it is an error
    pub fn record<T>(&mut self, action: &str, result: PlannerResult<T>) -> PlannerResult<T> {
        if let Err(e) = &result {
            self.push(Notice::new(action, e.to_string()));
        }
        result
    }

    pub fn pending(&self) -> &[Notice] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Remove and return all pending notices
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.pending)
    }
}
