//! SQLite-based store implementation

use async_trait::async_trait;
use bento_api::{Credentials, Identity, JournalEntry, NewTodo, SessionGrant, Todo, TodoPatch};
use bento_util::{DateKey, OwnerId, RecordId, SessionToken};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::credentials::{hash_password, hash_token, new_salt, normalize_email, validate_registration};
use crate::{
    check_todo_text, IdentityService, JournalRepository, StoreError, StoreResult, TodoRepository,
    DEFAULT_MIN_PASSWORD_LENGTH,
};

/// SQLite-based store
pub struct SqliteStore {
    conn: Mutex<Connection>,
    min_password_length: usize,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        let store = Self {
            conn: Mutex::new(conn),
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Set the minimum password length enforced at registration
    pub fn with_min_password_length(mut self, len: usize) -> Self {
        self.min_password_length = len;
        self
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("store lock poisoned".into()))
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Accounts
            CREATE TABLE IF NOT EXISTS users (
                owner_id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_salt TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            -- Sessions (token stored as digest)
            CREATE TABLE IF NOT EXISTS sessions (
                token_hash TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL REFERENCES users(owner_id),
                created_at TEXT NOT NULL
            );

            -- Todos
            CREATE TABLE IF NOT EXISTS todos (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                text TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            -- Journal (one entry per owner and day)
            CREATE TABLE IF NOT EXISTS journal (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                date TEXT NOT NULL,
                content TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (owner_id, date)
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_todos_owner_date ON todos(owner_id, date);
            CREATE INDEX IF NOT EXISTS idx_sessions_owner ON sessions(owner_id);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }

    /// Check if store is healthy
    pub fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }

    fn issue_session(conn: &Connection, identity: Identity) -> StoreResult<SessionGrant> {
        let token = SessionToken::generate();
        conn.execute(
            "INSERT INTO sessions (token_hash, owner_id, created_at) VALUES (?, ?, ?)",
            params![
                hash_token(&token),
                identity.owner_id.as_str(),
                bento_util::now().to_rfc3339()
            ],
        )?;

        debug!(owner_id = %identity.owner_id, "Session issued");
        Ok(SessionGrant { token, identity })
    }

    fn fetch_todo(conn: &Connection, owner: &OwnerId, id: &RecordId) -> StoreResult<Todo> {
        let row = conn
            .query_row(
                "SELECT id, owner_id, text, completed, date FROM todos WHERE id = ? AND owner_id = ?",
                params![id.as_str(), owner.as_str()],
                TodoRow::from_row,
            )
            .optional()?;

        row.ok_or_else(|| StoreError::NotFound(format!("todo {}", id)))?
            .into_todo()
    }

    fn fetch_entry(conn: &Connection, owner: &OwnerId, id: &RecordId) -> StoreResult<JournalEntry> {
        let row = conn
            .query_row(
                "SELECT id, owner_id, date, content FROM journal WHERE id = ? AND owner_id = ?",
                params![id.as_str(), owner.as_str()],
                EntryRow::from_row,
            )
            .optional()?;

        row.ok_or_else(|| StoreError::NotFound(format!("journal entry {}", id)))?
            .into_entry()
    }
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

struct TodoRow {
    id: String,
    owner_id: String,
    text: String,
    completed: bool,
    date: String,
}

impl TodoRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            text: row.get(2)?,
            completed: row.get(3)?,
            date: row.get(4)?,
        })
    }

    fn into_todo(self) -> StoreResult<Todo> {
        Ok(Todo {
            id: RecordId::new(self.id),
            owner_id: OwnerId::new(self.owner_id),
            text: self.text,
            completed: self.completed,
            date: self.date.parse::<DateKey>()?,
        })
    }
}

struct EntryRow {
    id: String,
    owner_id: String,
    date: String,
    content: String,
}

impl EntryRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            date: row.get(2)?,
            content: row.get(3)?,
        })
    }

    fn into_entry(self) -> StoreResult<JournalEntry> {
        Ok(JournalEntry {
            id: RecordId::new(self.id),
            owner_id: OwnerId::new(self.owner_id),
            date: self.date.parse::<DateKey>()?,
            content: self.content,
        })
    }
}

#[async_trait]
impl TodoRepository for SqliteStore {
    async fn list_by_owner(&self, owner: &OwnerId) -> StoreResult<Vec<Todo>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, owner_id, text, completed, date FROM todos WHERE owner_id = ? ORDER BY rowid",
        )?;
        let rows = stmt.query_map([owner.as_str()], TodoRow::from_row)?;

        let mut todos = Vec::new();
        for row in rows {
            todos.push(row?.into_todo()?);
        }

        debug!(owner_id = %owner, count = todos.len(), "Todos listed");
        Ok(todos)
    }

    async fn create(&self, owner: &OwnerId, todo: NewTodo) -> StoreResult<Todo> {
        check_todo_text(&todo.text)?;
        let conn = self.conn()?;
        let id = RecordId::generate();

        conn.execute(
            "INSERT INTO todos (id, owner_id, text, completed, date, created_at) VALUES (?, ?, ?, 0, ?, ?)",
            params![
                id.as_str(),
                owner.as_str(),
                todo.text,
                todo.date.to_string(),
                bento_util::now().to_rfc3339()
            ],
        )?;

        debug!(owner_id = %owner, todo_id = %id, date = %todo.date, "Todo created");
        Ok(Todo {
            id,
            owner_id: owner.clone(),
            text: todo.text,
            completed: false,
            date: todo.date,
        })
    }

    async fn update(&self, owner: &OwnerId, id: &RecordId, patch: TodoPatch) -> StoreResult<Todo> {
        if let Some(text) = &patch.text {
            check_todo_text(text)?;
        }
        let conn = self.conn()?;

        let changed = conn.execute(
            r#"
            UPDATE todos
            SET text = COALESCE(?, text), completed = COALESCE(?, completed)
            WHERE id = ? AND owner_id = ?
            "#,
            params![patch.text, patch.completed, id.as_str(), owner.as_str()],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(format!("todo {}", id)));
        }

        debug!(owner_id = %owner, todo_id = %id, "Todo updated");
        Self::fetch_todo(&conn, owner, id)
    }

    async fn delete(&self, owner: &OwnerId, id: &RecordId) -> StoreResult<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "DELETE FROM todos WHERE id = ? AND owner_id = ?",
            params![id.as_str(), owner.as_str()],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(format!("todo {}", id)));
        }

        debug!(owner_id = %owner, todo_id = %id, "Todo deleted");
        Ok(())
    }
}

#[async_trait]
impl JournalRepository for SqliteStore {
    async fn list_by_owner(&self, owner: &OwnerId) -> StoreResult<Vec<JournalEntry>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, owner_id, date, content FROM journal WHERE owner_id = ? ORDER BY date",
        )?;
        let rows = stmt.query_map([owner.as_str()], EntryRow::from_row)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.into_entry()?);
        }

        debug!(owner_id = %owner, count = entries.len(), "Journal listed");
        Ok(entries)
    }

    async fn find_by_date(&self, owner: &OwnerId, date: DateKey) -> StoreResult<Option<JournalEntry>> {
        let conn = self.conn()?;

        let row = conn
            .query_row(
                "SELECT id, owner_id, date, content FROM journal WHERE owner_id = ? AND date = ?",
                params![owner.as_str(), date.to_string()],
                EntryRow::from_row,
            )
            .optional()?;

        row.map(EntryRow::into_entry).transpose()
    }

    async fn create(&self, owner: &OwnerId, date: DateKey, content: String) -> StoreResult<JournalEntry> {
        let conn = self.conn()?;
        let id = RecordId::generate();

        let result = conn.execute(
            "INSERT INTO journal (id, owner_id, date, content, updated_at) VALUES (?, ?, ?, ?, ?)",
            params![
                id.as_str(),
                owner.as_str(),
                date.to_string(),
                content,
                bento_util::now().to_rfc3339()
            ],
        );

        match result {
            Ok(_) => {}
            Err(e) if is_constraint_violation(&e) => {
                return Err(StoreError::Conflict(format!(
                    "journal entry for {} already exists",
                    date
                )));
            }
            Err(e) => return Err(e.into()),
        }

        debug!(owner_id = %owner, entry_id = %id, date = %date, "Journal entry created");
        Ok(JournalEntry {
            id,
            owner_id: owner.clone(),
            date,
            content,
        })
    }

    async fn update(&self, owner: &OwnerId, id: &RecordId, content: String) -> StoreResult<JournalEntry> {
        let conn = self.conn()?;

        let changed = conn.execute(
            "UPDATE journal SET content = ?, updated_at = ? WHERE id = ? AND owner_id = ?",
            params![content, bento_util::now().to_rfc3339(), id.as_str(), owner.as_str()],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(format!("journal entry {}", id)));
        }

        debug!(owner_id = %owner, entry_id = %id, "Journal entry updated");
        Self::fetch_entry(&conn, owner, id)
    }

    async fn delete(&self, owner: &OwnerId, id: &RecordId) -> StoreResult<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "DELETE FROM journal WHERE id = ? AND owner_id = ?",
            params![id.as_str(), owner.as_str()],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(format!("journal entry {}", id)));
        }

        debug!(owner_id = %owner, entry_id = %id, "Journal entry deleted");
        Ok(())
    }
}

#[async_trait]
impl IdentityService for SqliteStore {
    async fn register(&self, credentials: &Credentials) -> StoreResult<SessionGrant> {
        validate_registration(credentials, self.min_password_length)?;

        let conn = self.conn()?;
        let email = normalize_email(&credentials.email);
        let owner_id = OwnerId::generate();
        let salt = new_salt();

        let result = conn.execute(
            "INSERT INTO users (owner_id, email, password_salt, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
            params![
                owner_id.as_str(),
                email,
                salt,
                hash_password(&salt, &credentials.password),
                bento_util::now().to_rfc3339()
            ],
        );

        match result {
            Ok(_) => {}
            Err(e) if is_constraint_violation(&e) => {
                return Err(StoreError::Conflict("email already registered".into()));
            }
            Err(e) => return Err(e.into()),
        }

        info!(owner_id = %owner_id, "Account registered");
        Self::issue_session(&conn, Identity { owner_id, email })
    }

    async fn sign_in(&self, credentials: &Credentials) -> StoreResult<SessionGrant> {
        let conn = self.conn()?;
        let email = normalize_email(&credentials.email);

        let account: Option<(String, String, String)> = conn
            .query_row(
                "SELECT owner_id, password_salt, password_hash FROM users WHERE email = ?",
                [&email],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let Some((owner_id, salt, expected)) = account else {
            debug!("Sign-in for unknown email");
            return Err(StoreError::InvalidCredentials);
        };

        if hash_password(&salt, &credentials.password) != expected {
            debug!(owner_id = %owner_id, "Sign-in with wrong password");
            return Err(StoreError::InvalidCredentials);
        }

        Self::issue_session(
            &conn,
            Identity {
                owner_id: OwnerId::new(owner_id),
                email,
            },
        )
    }

    async fn resolve(&self, token: &SessionToken) -> StoreResult<Identity> {
        let conn = self.conn()?;

        let identity: Option<(String, String)> = conn
            .query_row(
                r#"
                SELECT u.owner_id, u.email
                FROM sessions s JOIN users u ON u.owner_id = s.owner_id
                WHERE s.token_hash = ?
                "#,
                [hash_token(token)],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        identity
            .map(|(owner_id, email)| Identity {
                owner_id: OwnerId::new(owner_id),
                email,
            })
            .ok_or(StoreError::Unauthenticated)
    }

    async fn sign_out(&self, token: &SessionToken) -> StoreResult<()> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM sessions WHERE token_hash = ?", [hash_token(token)])?;
        debug!(removed, "Session revoked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> DateKey {
        DateKey::from_ymd(2024, 1, d).unwrap()
    }

    fn todos(store: &SqliteStore) -> &dyn TodoRepository {
        store
    }

    fn journal(store: &SqliteStore) -> &dyn JournalRepository {
        store
    }

    #[test]
    fn test_in_memory_store() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.is_healthy());
    }

    #[tokio::test]
    async fn test_todo_lifecycle() {
        let store = SqliteStore::in_memory().unwrap();
        let owner = OwnerId::new("u1");

        assert!(todos(&store).list_by_owner(&owner).await.unwrap().is_empty());

        let created = todos(&store)
            .create(&owner, NewTodo::new("Buy milk", day(1)))
            .await
            .unwrap();
        assert!(!created.completed);
        assert_eq!(created.owner_id, owner);

        let toggled = todos(&store)
            .update(&owner, &created.id, TodoPatch::completed(true))
            .await
            .unwrap();
        assert!(toggled.completed);
        assert_eq!(toggled.text, "Buy milk");

        let edited = todos(&store)
            .update(&owner, &created.id, TodoPatch::text("Buy oat milk"))
            .await
            .unwrap();
        assert_eq!(edited.text, "Buy oat milk");
        assert!(edited.completed);
        assert_eq!(edited.id, created.id);

        todos(&store).delete(&owner, &created.id).await.unwrap();
        assert!(todos(&store).list_by_owner(&owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_todos_are_owner_scoped() {
        let store = SqliteStore::in_memory().unwrap();
        let alice = OwnerId::new("alice");
        let bob = OwnerId::new("bob");

        let todo = todos(&store)
            .create(&alice, NewTodo::new("Alice's task", day(2)))
            .await
            .unwrap();

        assert!(todos(&store).list_by_owner(&bob).await.unwrap().is_empty());
        assert!(matches!(
            todos(&store).update(&bob, &todo.id, TodoPatch::completed(true)).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            todos(&store).delete(&bob, &todo.id).await,
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(todos(&store).list_by_owner(&alice).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_todo_list_keeps_creation_order() {
        let store = SqliteStore::in_memory().unwrap();
        let owner = OwnerId::new("u1");

        for text in ["first", "second", "third"] {
            todos(&store).create(&owner, NewTodo::new(text, day(3))).await.unwrap();
        }

        let texts: Vec<String> = todos(&store)
            .list_by_owner(&owner)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_blank_todo_text_rejected() {
        let store = SqliteStore::in_memory().unwrap();
        let owner = OwnerId::new("u1");

        assert!(matches!(
            todos(&store).create(&owner, NewTodo::new("   ", day(1))).await,
            Err(StoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_journal_one_entry_per_day() {
        let store = SqliteStore::in_memory().unwrap();
        let owner = OwnerId::new("u1");

        assert!(journal(&store).find_by_date(&owner, day(1)).await.unwrap().is_none());

        let entry = journal(&store)
            .create(&owner, day(1), "Good day".into())
            .await
            .unwrap();

        let dup = journal(&store).create(&owner, day(1), "Again".into()).await;
        assert!(matches!(dup, Err(StoreError::Conflict(_))));

        let updated = journal(&store)
            .update(&owner, &entry.id, "Great day".into())
            .await
            .unwrap();
        assert_eq!(updated.content, "Great day");

        let found = journal(&store).find_by_date(&owner, day(1)).await.unwrap().unwrap();
        assert_eq!(found.id, entry.id);

        let all = journal(&store).list_by_owner(&owner).await.unwrap();
        assert_eq!(all.len(), 1);

        // Another owner may write the same day
        journal(&store)
            .create(&OwnerId::new("u2"), day(1), "Mine".into())
            .await
            .unwrap();

        journal(&store).delete(&owner, &entry.id).await.unwrap();
        assert!(journal(&store).list_by_owner(&owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_register_sign_in_resolve_sign_out() {
        let store = SqliteStore::in_memory().unwrap();
        let creds = Credentials::new("Ada@Example.com", "correct horse");

        let grant = store.register(&creds).await.unwrap();
        assert_eq!(grant.identity.email, "ada@example.com");

        let again = store.register(&creds).await;
        assert!(matches!(again, Err(StoreError::Conflict(_))));

        let wrong = store
            .sign_in(&Credentials::new("ada@example.com", "battery staple"))
            .await;
        assert!(matches!(wrong, Err(StoreError::InvalidCredentials)));

        let unknown = store
            .sign_in(&Credentials::new("nobody@example.com", "whatever"))
            .await;
        assert!(matches!(unknown, Err(StoreError::InvalidCredentials)));

        let second = store
            .sign_in(&Credentials::new("ADA@example.com", "correct horse"))
            .await
            .unwrap();
        assert_eq!(second.identity.owner_id, grant.identity.owner_id);
        assert_ne!(second.token, grant.token);

        let resolved = store.resolve(&second.token).await.unwrap();
        assert_eq!(resolved, grant.identity);

        store.sign_out(&second.token).await.unwrap();
        assert!(matches!(
            store.resolve(&second.token).await,
            Err(StoreError::Unauthenticated)
        ));

        // The first session is unaffected
        assert!(store.resolve(&grant.token).await.is_ok());
    }

    #[tokio::test]
    async fn test_password_policy() {
        let store = SqliteStore::in_memory().unwrap().with_min_password_length(12);
        let result = store.register(&Credentials::new("a@b.c", "too-short")).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bento.db");
        let owner = OwnerId::new("u1");

        {
            let store = SqliteStore::open(&path).unwrap();
            todos(&store).create(&owner, NewTodo::new("persist me", day(5))).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let listed = todos(&store).list_by_owner(&owner).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].date, day(5));
    }
}
