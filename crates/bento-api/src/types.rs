//! Shared record types for the bento API

use bento_util::{DateKey, OwnerId, RecordId, SessionToken};
use serde::{Deserialize, Serialize};

/// A date-scoped task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: RecordId,
    pub owner_id: OwnerId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub date: DateKey,
}

/// Fields supplied when creating a todo; id and owner are assigned elsewhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTodo {
    pub text: String,
    pub date: DateKey,
}

impl NewTodo {
    pub fn new(text: impl Into<String>, date: DateKey) -> Self {
        Self {
            text: text.into(),
            date,
        }
    }
}

/// Field-level update of a todo. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TodoPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            completed: None,
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            text: None,
            completed: Some(completed),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.completed.is_none()
    }

    /// Apply this patch to a local copy
    pub fn apply_to(&self, todo: &mut Todo) {
        if let Some(text) = &self.text {
            todo.text = text.clone();
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
    }
}

/// The single free-text entry for one owner and one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: RecordId,
    pub owner_id: OwnerId,
    pub date: DateKey,
    pub content: String,
}

/// An authenticated identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub owner_id: OwnerId,
    pub email: String,
}

/// Email/password pair submitted by the login and registration forms
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Result of a successful sign-in or registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionGrant {
    pub token: SessionToken,
    pub identity: Identity,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo() -> Todo {
        Todo {
            id: RecordId::new("t1"),
            owner_id: OwnerId::new("u1"),
            text: "Buy milk".into(),
            completed: false,
            date: DateKey::from_ymd(2024, 1, 1).unwrap(),
        }
    }

    #[test]
    fn patch_applies_only_present_fields() {
        let mut t = todo();
        TodoPatch::completed(true).apply_to(&mut t);
        assert!(t.completed);
        assert_eq!(t.text, "Buy milk");

        TodoPatch::text("Buy oat milk").apply_to(&mut t);
        assert_eq!(t.text, "Buy oat milk");
        assert!(t.completed);
        assert_eq!(t.id, RecordId::new("t1"));
    }

    #[test]
    fn empty_patch() {
        assert!(TodoPatch::default().is_empty());
        assert!(!TodoPatch::text("x").is_empty());
    }

    #[test]
    fn completed_defaults_to_false() {
        let json = r#"{"id":"t1","owner_id":"u1","text":"x","date":"2024-01-01"}"#;
        let parsed: Todo = serde_json::from_str(json).unwrap();
        assert!(!parsed.completed);
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("a@b.c", "hunter22");
        assert!(!format!("{:?}", creds).contains("hunter22"));
    }
}
