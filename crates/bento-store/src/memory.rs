//! In-memory store for tests and offline use

use async_trait::async_trait;
use bento_api::{Credentials, Identity, JournalEntry, NewTodo, SessionGrant, Todo, TodoPatch};
use bento_util::{DateKey, OwnerId, RecordId, SessionToken};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::credentials::{hash_password, hash_token, new_salt, normalize_email, validate_registration};
use crate::{
    check_todo_text, IdentityService, JournalRepository, StoreError, StoreResult, TodoRepository,
    DEFAULT_MIN_PASSWORD_LENGTH,
};

struct Account {
    owner_id: OwnerId,
    salt: String,
    password_hash: String,
}

#[derive(Default)]
struct MemoryState {
    todos: Vec<Todo>,
    journal: Vec<JournalEntry>,
    /// Keyed by normalized email
    accounts: HashMap<String, Account>,
    /// Token digest -> email
    sessions: HashMap<String, String>,
}

/// Store that keeps everything in process memory.
///
/// Reads and writes can be made to fail on demand, which lets the planner's
/// failure paths be exercised without a broken database.
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    min_password_length: usize,

    /// Configure writes to fail
    fail_writes: AtomicBool,

    /// Configure reads to fail
    fail_reads: AtomicBool,

    writes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
            fail_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            writes: AtomicU64::new(0),
        }
    }

    pub fn with_min_password_length(mut self, len: usize) -> Self {
        self.min_password_length = len;
        self
    }

    /// Make every todo/journal write fail until reset
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every todo/journal read fail until reset
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of successful todo/journal writes
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn state(&self) -> StoreResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Database("memory store lock poisoned".into()))
    }

    fn check_read(&self) -> StoreResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Remote("injected read failure".into()));
        }
        Ok(())
    }

    fn begin_write(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Remote("injected write failure".into()));
        }
        Ok(())
    }

    fn finish_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    fn issue_session(state: &mut MemoryState, email: String, owner_id: OwnerId) -> SessionGrant {
        let token = SessionToken::generate();
        state.sessions.insert(hash_token(&token), email.clone());
        SessionGrant {
            token,
            identity: Identity { owner_id, email },
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TodoRepository for MemoryStore {
    async fn list_by_owner(&self, owner: &OwnerId) -> StoreResult<Vec<Todo>> {
        self.check_read()?;
        let state = self.state()?;
        Ok(state
            .todos
            .iter()
            .filter(|t| &t.owner_id == owner)
            .cloned()
            .collect())
    }

    async fn create(&self, owner: &OwnerId, todo: NewTodo) -> StoreResult<Todo> {
        self.begin_write()?;
        check_todo_text(&todo.text)?;

        let created = Todo {
            id: RecordId::generate(),
            owner_id: owner.clone(),
            text: todo.text,
            completed: false,
            date: todo.date,
        };
        self.state()?.todos.push(created.clone());
        self.finish_write();

        debug!(todo_id = %created.id, "Memory todo created");
        Ok(created)
    }

    async fn update(&self, owner: &OwnerId, id: &RecordId, patch: TodoPatch) -> StoreResult<Todo> {
        self.begin_write()?;
        if let Some(text) = &patch.text {
            check_todo_text(text)?;
        }

        let mut state = self.state()?;
        let todo = state
            .todos
            .iter_mut()
            .find(|t| &t.id == id && &t.owner_id == owner)
            .ok_or_else(|| StoreError::NotFound(format!("todo {}", id)))?;
        patch.apply_to(todo);
        let updated = todo.clone();
        drop(state);

        self.finish_write();
        Ok(updated)
    }

    async fn delete(&self, owner: &OwnerId, id: &RecordId) -> StoreResult<()> {
        self.begin_write()?;

        let mut state = self.state()?;
        let before = state.todos.len();
        state.todos.retain(|t| !(&t.id == id && &t.owner_id == owner));
        if state.todos.len() == before {
            return Err(StoreError::NotFound(format!("todo {}", id)));
        }
        drop(state);

        self.finish_write();
        Ok(())
    }
}

#[async_trait]
impl JournalRepository for MemoryStore {
    async fn list_by_owner(&self, owner: &OwnerId) -> StoreResult<Vec<JournalEntry>> {
        self.check_read()?;
        let state = self.state()?;
        let mut entries: Vec<JournalEntry> = state
            .journal
            .iter()
            .filter(|e| &e.owner_id == owner)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.date);
        Ok(entries)
    }

    async fn find_by_date(&self, owner: &OwnerId, date: DateKey) -> StoreResult<Option<JournalEntry>> {
        self.check_read()?;
        let state = self.state()?;
        Ok(state
            .journal
            .iter()
            .find(|e| &e.owner_id == owner && e.date == date)
            .cloned())
    }

    async fn create(&self, owner: &OwnerId, date: DateKey, content: String) -> StoreResult<JournalEntry> {
        self.begin_write()?;

        let mut state = self.state()?;
        if state.journal.iter().any(|e| &e.owner_id == owner && e.date == date) {
            return Err(StoreError::Conflict(format!(
                "journal entry for {} already exists",
                date
            )));
        }

        let entry = JournalEntry {
            id: RecordId::generate(),
            owner_id: owner.clone(),
            date,
            content,
        };
        state.journal.push(entry.clone());
        drop(state);

        self.finish_write();
        Ok(entry)
    }

    async fn update(&self, owner: &OwnerId, id: &RecordId, content: String) -> StoreResult<JournalEntry> {
        self.begin_write()?;

        let mut state = self.state()?;
        let entry = state
            .journal
            .iter_mut()
            .find(|e| &e.id == id && &e.owner_id == owner)
            .ok_or_else(|| StoreError::NotFound(format!("journal entry {}", id)))?;
        entry.content = content;
        let updated = entry.clone();
        drop(state);

        self.finish_write();
        Ok(updated)
    }

    async fn delete(&self, owner: &OwnerId, id: &RecordId) -> StoreResult<()> {
        self.begin_write()?;

        let mut state = self.state()?;
        let before = state.journal.len();
        state.journal.retain(|e| !(&e.id == id && &e.owner_id == owner));
        if state.journal.len() == before {
            return Err(StoreError::NotFound(format!("journal entry {}", id)));
        }
        drop(state);

        self.finish_write();
        Ok(())
    }
}

#[async_trait]
impl IdentityService for MemoryStore {
    async fn register(&self, credentials: &Credentials) -> StoreResult<SessionGrant> {
        validate_registration(credentials, self.min_password_length)?;
        let email = normalize_email(&credentials.email);

        let mut state = self.state()?;
        if state.accounts.contains_key(&email) {
            return Err(StoreError::Conflict("email already registered".into()));
        }

        let owner_id = OwnerId::generate();
        let salt = new_salt();
        let password_hash = hash_password(&salt, &credentials.password);
        state.accounts.insert(
            email.clone(),
            Account {
                owner_id: owner_id.clone(),
                salt,
                password_hash,
            },
        );

        Ok(Self::issue_session(&mut state, email, owner_id))
    }

    async fn sign_in(&self, credentials: &Credentials) -> StoreResult<SessionGrant> {
        let email = normalize_email(&credentials.email);

        let mut state = self.state()?;
        let owner_id = match state.accounts.get(&email) {
            Some(account) if hash_password(&account.salt, &credentials.password) == account.password_hash => {
                account.owner_id.clone()
            }
            _ => return Err(StoreError::InvalidCredentials),
        };

        Ok(Self::issue_session(&mut state, email, owner_id))
    }

    async fn resolve(&self, token: &SessionToken) -> StoreResult<Identity> {
        let state = self.state()?;
        let email = state
            .sessions
            .get(&hash_token(token))
            .ok_or(StoreError::Unauthenticated)?;
        let account = state.accounts.get(email).ok_or(StoreError::Unauthenticated)?;

        Ok(Identity {
            owner_id: account.owner_id.clone(),
            email: email.clone(),
        })
    }

    async fn sign_out(&self, token: &SessionToken) -> StoreResult<()> {
        self.state()?.sessions.remove(&hash_token(token));
        Ok(())
    }
}
