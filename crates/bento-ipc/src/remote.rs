//! Repository traits spoken over the bentod socket

use async_trait::async_trait;
use bento_api::{
    Command, Credentials, ErrorCode, ErrorInfo, Identity, JournalEntry, NewTodo, ResponsePayload,
    ResponseResult, SessionGrant, Todo, TodoPatch,
};
use bento_store::{IdentityService, JournalRepository, StoreError, StoreResult, TodoRepository};
use bento_util::{DateKey, OwnerId, RecordId, SessionToken};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{IpcClient, IpcError, IpcResult};

/// Store backed by a bentod connection.
///
/// The token issued by the last successful register, sign-in or resolve is
/// attached to every data command. bentod takes the owner from that token,
/// so the `owner` arguments of the repository methods are not sent.
pub struct RemoteStore {
    inner: Mutex<Inner>,
}

struct Inner {
    client: IpcClient,
    token: Option<SessionToken>,
}

impl RemoteStore {
    pub async fn connect(socket_path: impl AsRef<Path>) -> IpcResult<Self> {
        let client = IpcClient::connect(socket_path).await?;
        Ok(Self::new(client))
    }

    pub fn new(client: IpcClient) -> Self {
        Self {
            inner: Mutex::new(Inner {
                client,
                token: None,
            }),
        }
    }

    /// Token currently attached to data commands
    pub async fn token(&self) -> Option<SessionToken> {
        self.inner.lock().await.token.clone()
    }

    /// Round trip that does not need a session
    pub async fn ping(&self) -> StoreResult<()> {
        match self.call_as(None, Command::Ping).await? {
            ResponsePayload::Pong => Ok(()),
            other => Err(unexpected(&other)),
        }
    }

    /// Send `command` with the remembered token
    async fn call(&self, command: Command) -> StoreResult<ResponsePayload> {
        let mut inner = self.inner.lock().await;
        let token = inner.token.clone();
        exchange(&mut inner.client, token, command).await
    }

    /// Send `command` with an explicit token
    async fn call_as(&self, token: Option<SessionToken>, command: Command) -> StoreResult<ResponsePayload> {
        let mut inner = self.inner.lock().await;
        exchange(&mut inner.client, token, command).await
    }

    async fn remember(&self, token: Option<SessionToken>) {
        self.inner.lock().await.token = token;
    }
}

async fn exchange(
    client: &mut IpcClient,
    token: Option<SessionToken>,
    command: Command,
) -> StoreResult<ResponsePayload> {
    let response = client.send_with_token(token, command).await.map_err(transport_error)?;
    match response.result {
        ResponseResult::Ok(payload) => Ok(payload),
        ResponseResult::Err(e) => Err(store_error(e)),
    }
}

fn transport_error(e: IpcError) -> StoreError {
    match e {
        IpcError::Io(io) => StoreError::Io(io),
        other => StoreError::Remote(other.to_string()),
    }
}

/// Map a protocol error back onto the store error it came from
pub fn store_error(info: ErrorInfo) -> StoreError {
    match info.code {
        ErrorCode::Unauthenticated => StoreError::Unauthenticated,
        ErrorCode::InvalidCredentials => StoreError::InvalidCredentials,
        ErrorCode::NotFound => StoreError::NotFound(info.message),
        ErrorCode::Conflict => StoreError::Conflict(info.message),
        ErrorCode::ValidationFailed => StoreError::Validation(info.message),
        ErrorCode::StoreError => StoreError::Database(info.message),
        ErrorCode::InvalidRequest | ErrorCode::UnsupportedVersion | ErrorCode::InternalError => {
            StoreError::Remote(info.message)
        }
    }
}

fn unexpected(payload: &ResponsePayload) -> StoreError {
    StoreError::Remote(format!("unexpected response: {:?}", payload))
}

#[async_trait]
impl TodoRepository for RemoteStore {
    async fn list_by_owner(&self, _owner: &OwnerId) -> StoreResult<Vec<Todo>> {
        match self.call(Command::ListTodos).await? {
            ResponsePayload::Todos { todos } => Ok(todos),
            other => Err(unexpected(&other)),
        }
    }

    async fn create(&self, _owner: &OwnerId, todo: NewTodo) -> StoreResult<Todo> {
        match self.call(Command::CreateTodo { todo }).await? {
            ResponsePayload::Todo { todo } => Ok(todo),
            other => Err(unexpected(&other)),
        }
    }

    async fn update(&self, _owner: &OwnerId, id: &RecordId, patch: TodoPatch) -> StoreResult<Todo> {
        let command = Command::UpdateTodo {
            id: id.clone(),
            patch,
        };
        match self.call(command).await? {
            ResponsePayload::Todo { todo } => Ok(todo),
            other => Err(unexpected(&other)),
        }
    }

    async fn delete(&self, _owner: &OwnerId, id: &RecordId) -> StoreResult<()> {
        match self.call(Command::DeleteTodo { id: id.clone() }).await? {
            ResponsePayload::Deleted => Ok(()),
            other => Err(unexpected(&other)),
        }
    }
}

#[async_trait]
impl JournalRepository for RemoteStore {
    async fn list_by_owner(&self, _owner: &OwnerId) -> StoreResult<Vec<JournalEntry>> {
        match self.call(Command::ListJournal).await? {
            ResponsePayload::JournalEntries { entries } => Ok(entries),
            other => Err(unexpected(&other)),
        }
    }

    async fn find_by_date(&self, _owner: &OwnerId, date: DateKey) -> StoreResult<Option<JournalEntry>> {
        match self.call(Command::FindJournal { date }).await? {
            ResponsePayload::JournalLookup { entry } => Ok(entry),
            other => Err(unexpected(&other)),
        }
    }

    async fn create(&self, _owner: &OwnerId, date: DateKey, content: String) -> StoreResult<JournalEntry> {
        match self.call(Command::CreateJournal { date, content }).await? {
            ResponsePayload::JournalEntry { entry } => Ok(entry),
            other => Err(unexpected(&other)),
        }
    }

    async fn update(&self, _owner: &OwnerId, id: &RecordId, content: String) -> StoreResult<JournalEntry> {
        let command = Command::UpdateJournal {
            id: id.clone(),
            content,
        };
        match self.call(command).await? {
            ResponsePayload::JournalEntry { entry } => Ok(entry),
            other => Err(unexpected(&other)),
        }
    }

    async fn delete(&self, _owner: &OwnerId, id: &RecordId) -> StoreResult<()> {
        match self.call(Command::DeleteJournal { id: id.clone() }).await? {
            ResponsePayload::Deleted => Ok(()),
            other => Err(unexpected(&other)),
        }
    }
}

#[async_trait]
impl IdentityService for RemoteStore {
    async fn register(&self, credentials: &Credentials) -> StoreResult<SessionGrant> {
        let command = Command::Register {
            credentials: credentials.clone(),
        };
        match self.call_as(None, command).await? {
            ResponsePayload::Session { grant } => {
                self.remember(Some(grant.token.clone())).await;
                Ok(grant)
            }
            other => Err(unexpected(&other)),
        }
    }

    async fn sign_in(&self, credentials: &Credentials) -> StoreResult<SessionGrant> {
        let command = Command::SignIn {
            credentials: credentials.clone(),
        };
        match self.call_as(None, command).await? {
            ResponsePayload::Session { grant } => {
                self.remember(Some(grant.token.clone())).await;
                Ok(grant)
            }
            other => Err(unexpected(&other)),
        }
    }

    async fn resolve(&self, token: &SessionToken) -> StoreResult<Identity> {
        match self.call_as(Some(token.clone()), Command::ResolveSession).await? {
            ResponsePayload::Identity { identity } => {
                self.remember(Some(token.clone())).await;
                debug!(owner_id = %identity.owner_id, "Remote session resolved");
                Ok(identity)
            }
            other => Err(unexpected(&other)),
        }
    }

    async fn sign_out(&self, token: &SessionToken) -> StoreResult<()> {
        let result = self.call_as(Some(token.clone()), Command::SignOut).await;

        // Forget the token locally whatever the server said
        {
            let mut inner = self.inner.lock().await;
            if inner.token.as_ref() == Some(token) {
                inner.token = None;
            }
        }

        match result? {
            ResponsePayload::SignedOut => Ok(()),
            other => Err(unexpected(&other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_map_back() {
        let err = store_error(ErrorInfo::new(ErrorCode::NotFound, "todo abc"));
        assert!(matches!(err, StoreError::NotFound(ref m) if m == "todo abc"));

        assert!(matches!(
            store_error(ErrorInfo::new(ErrorCode::Unauthenticated, "")),
            StoreError::Unauthenticated
        ));
        assert!(matches!(
            store_error(ErrorInfo::new(ErrorCode::Conflict, "dup")),
            StoreError::Conflict(_)
        ));
        assert!(matches!(
            store_error(ErrorInfo::new(ErrorCode::InternalError, "boom")),
            StoreError::Remote(_)
        ));
    }
}
