//! Repository trait definitions

use async_trait::async_trait;
use bento_api::{Credentials, Identity, JournalEntry, NewTodo, SessionGrant, Todo, TodoPatch};
use bento_util::{DateKey, OwnerId, RecordId, SessionToken};
use std::sync::Arc;

use crate::StoreResult;

/// Todo collection, scoped by owner
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// All todos belonging to `owner`, in creation order
    async fn list_by_owner(&self, owner: &OwnerId) -> StoreResult<Vec<Todo>>;

    /// Insert a todo; the store assigns the id and sets `completed = false`
    async fn create(&self, owner: &OwnerId, todo: NewTodo) -> StoreResult<Todo>;

    /// Field-level update; `NotFound` if the record does not exist for `owner`
    async fn update(&self, owner: &OwnerId, id: &RecordId, patch: TodoPatch) -> StoreResult<Todo>;

    /// Remove a todo; `NotFound` if the record does not exist for `owner`
    async fn delete(&self, owner: &OwnerId, id: &RecordId) -> StoreResult<()>;
}

/// Journal collection, at most one entry per (owner, date)
#[async_trait]
pub trait JournalRepository: Send + Sync {
    async fn list_by_owner(&self, owner: &OwnerId) -> StoreResult<Vec<JournalEntry>>;

    /// The entry for `date`, if one exists
    async fn find_by_date(&self, owner: &OwnerId, date: DateKey) -> StoreResult<Option<JournalEntry>>;

    /// Insert an entry; `Conflict` if one already exists for the date
    async fn create(&self, owner: &OwnerId, date: DateKey, content: String) -> StoreResult<JournalEntry>;

    async fn update(&self, owner: &OwnerId, id: &RecordId, content: String) -> StoreResult<JournalEntry>;

    async fn delete(&self, owner: &OwnerId, id: &RecordId) -> StoreResult<()>;
}

/// Identity service: accounts and sessions
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Create an account and return a signed-in session for it
    async fn register(&self, credentials: &Credentials) -> StoreResult<SessionGrant>;

    async fn sign_in(&self, credentials: &Credentials) -> StoreResult<SessionGrant>;

    /// Identity behind a token; `Unauthenticated` if the token is unknown
    async fn resolve(&self, token: &SessionToken) -> StoreResult<Identity>;

    /// Revoke a token. Revoking an unknown token is not an error.
    async fn sign_out(&self, token: &SessionToken) -> StoreResult<()>;
}

/// The three collaborators the planner needs, behind trait objects
#[derive(Clone)]
pub struct Repositories {
    pub todos: Arc<dyn TodoRepository>,
    pub journal: Arc<dyn JournalRepository>,
    pub identity: Arc<dyn IdentityService>,
}

impl Repositories {
    /// Use one backend for all three roles
    pub fn from_backend<S>(backend: Arc<S>) -> Self
    where
        S: TodoRepository + JournalRepository + IdentityService + 'static,
    {
        Self {
            todos: backend.clone(),
            journal: backend.clone(),
            identity: backend,
        }
    }
}
