//! Command types for the bentod protocol

use bento_util::{DateKey, RecordId, SessionToken};
use serde::{Deserialize, Serialize};

use crate::{Credentials, Identity, JournalEntry, NewTodo, SessionGrant, Todo, TodoPatch, API_VERSION};

/// Request wrapper with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Request ID for correlation
    pub request_id: u64,
    /// API version
    pub api_version: u32,
    /// Session token; required for every data command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<SessionToken>,
    /// The command
    pub command: Command,
}

impl Request {
    pub fn new(request_id: u64, command: Command) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            token: None,
            command,
        }
    }

    pub fn with_token(mut self, token: Option<SessionToken>) -> Self {
        self.token = token;
        self
    }
}

/// Response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Corresponding request ID
    pub request_id: u64,
    /// API version
    pub api_version: u32,
    /// Response payload or error
    pub result: ResponseResult,
}

impl Response {
    pub fn success(request_id: u64, payload: ResponsePayload) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            result: ResponseResult::Ok(payload),
        }
    }

    pub fn error(request_id: u64, error: ErrorInfo) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            result: ResponseResult::Err(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseResult {
    Ok(ResponsePayload),
    Err(ErrorInfo),
}

/// Error information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Error codes for the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidRequest,
    UnsupportedVersion,
    Unauthenticated,
    InvalidCredentials,
    NotFound,
    Conflict,
    ValidationFailed,
    StoreError,
    InternalError,
}

/// All possible commands from clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    // Identity

    /// Create an account and sign it in
    Register { credentials: Credentials },

    /// Exchange credentials for a session token
    SignIn { credentials: Credentials },

    /// Look up the identity behind the request token
    ResolveSession,

    /// Revoke the request token
    SignOut,

    // Todos (owner comes from the session)

    ListTodos,

    CreateTodo { todo: NewTodo },

    UpdateTodo { id: RecordId, patch: TodoPatch },

    DeleteTodo { id: RecordId },

    // Journal (owner comes from the session)

    ListJournal,

    /// Query the entry for one date, if any
    FindJournal { date: DateKey },

    CreateJournal { date: DateKey, content: String },

    UpdateJournal { id: RecordId, content: String },

    DeleteJournal { id: RecordId },

    /// Ping for keepalive
    Ping,
}

impl Command {
    /// Whether the command needs an authenticated session
    pub fn requires_session(&self) -> bool {
        !matches!(
            self,
            Command::Register { .. } | Command::SignIn { .. } | Command::Ping
        )
    }
}

/// Response payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponsePayload {
    Session { grant: SessionGrant },
    Identity { identity: Identity },
    SignedOut,
    Todos { todos: Vec<Todo> },
    Todo { todo: Todo },
    JournalEntries { entries: Vec<JournalEntry> },
    JournalLookup { entry: Option<JournalEntry> },
    JournalEntry { entry: JournalEntry },
    Deleted,
    Pong,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bento_util::OwnerId;

    #[test]
    fn request_serialization() {
        let req = Request::new(1, Command::ListTodos).with_token(Some(SessionToken::new("t")));
        let json = serde_json::to_string(&req).unwrap();
        let parsed: Request = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.request_id, 1);
        assert_eq!(parsed.token, Some(SessionToken::new("t")));
        assert!(matches!(parsed.command, Command::ListTodos));
    }

    #[test]
    fn token_is_optional_on_the_wire() {
        let json = r#"{"request_id":7,"api_version":1,"command":{"type":"ping"}}"#;
        let parsed: Request = serde_json::from_str(json).unwrap();
        assert!(parsed.token.is_none());
        assert!(matches!(parsed.command, Command::Ping));
    }

    #[test]
    fn response_with_record_list() {
        let resp = Response::success(
            3,
            ResponsePayload::Todos {
                todos: vec![Todo {
                    id: RecordId::new("t1"),
                    owner_id: OwnerId::new("u1"),
                    text: "Buy milk".into(),
                    completed: false,
                    date: DateKey::from_ymd(2024, 1, 1).unwrap(),
                }],
            },
        );

        let json = serde_json::to_string(&resp).unwrap();
        let parsed: Response = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.request_id, 3);
        match parsed.result {
            ResponseResult::Ok(ResponsePayload::Todos { todos }) => {
                assert_eq!(todos.len(), 1);
                assert_eq!(todos[0].date.to_string(), "2024-01-01");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn session_requirements() {
        assert!(!Command::Ping.requires_session());
        assert!(
            !Command::SignIn {
                credentials: Credentials::new("a@b.c", "secret")
            }
            .requires_session()
        );
        assert!(Command::ResolveSession.requires_session());
        assert!(Command::ListJournal.requires_session());
    }
}
