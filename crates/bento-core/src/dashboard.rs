//! Root composer
//!
//! The dashboard owns the session, the three planner components, the theme
//! and the pending notices. Front ends call its passthroughs, which supply
//! the signed-in owner and the relevant date, and render [`DashboardView`].

use bento_api::{Identity, Todo};
use bento_config::{ClientConfig, NewTaskDate, ThemePreference};
use bento_store::Repositories;
use bento_util::{DateKey, OwnerId, RecordId, SessionToken};
use tracing::{debug, info};

use crate::{
    Calendar, Journal, JournalSave, MonthGrid, Notice, Notices, PlannerError, PlannerResult,
    SessionProvider, TaskList, Theme, TodoChange,
};

/// Knobs the dashboard takes from client configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardOptions {
    pub theme: ThemePreference,
    pub new_task_date: NewTaskDate,
}

impl From<&ClientConfig> for DashboardOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            theme: config.theme,
            new_task_date: config.new_task_date,
        }
    }
}

/// Everything a signed-in screen shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSnapshot {
    pub identity: Identity,
    pub theme: Theme,
    pub today: DateKey,
    pub selected: DateKey,
    pub selected_label: String,
    pub todos: Vec<Todo>,
    pub editing: Option<RecordId>,
    pub journal_label: String,
    pub journal_content: String,
    /// The displayed journal text has unsaved changes
    pub journal_dirty: bool,
    pub month_label: String,
    pub grid: MonthGrid,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardView {
    SignedOut { theme: Theme, notices: Vec<Notice> },
    SignedIn(Box<DashboardSnapshot>),
}

pub struct Dashboard {
    session: SessionProvider,
    tasks: TaskList,
    journal: Journal,
    calendar: Calendar,
    theme: Theme,
    notices: Notices,
    today: DateKey,
    new_task_date: NewTaskDate,
}

impl Dashboard {
    pub fn new(repos: Repositories, options: DashboardOptions) -> Self {
        let today = DateKey::today();
        let theme = Theme::from_preference(options.theme, Theme::detect_host());
        debug!(%today, %theme, new_task_date = %options.new_task_date, "Dashboard created");

        Self {
            session: SessionProvider::new(repos.identity),
            tasks: TaskList::new(repos.todos),
            journal: Journal::new(repos.journal),
            calendar: Calendar::new(today),
            theme,
            notices: Notices::new(),
            today,
            new_task_date: options.new_task_date,
        }
    }

    /// Pin "today" (and the selection) to a fixed day
    pub fn with_today(mut self, today: DateKey) -> Self {
        self.today = today;
        self.calendar = Calendar::new(today);
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn today(&self) -> DateKey {
        self.today
    }

    pub fn session(&self) -> &SessionProvider {
        &self.session
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Load both collections for the signed-in owner.
    ///
    /// Both loads are attempted; each failure becomes a notice and leaves
    /// that collection as it was. Does nothing when signed out.
    pub async fn mount(&mut self) {
        let Some(owner) = self.session.owner().cloned() else {
            debug!("Mount skipped: signed out");
            return;
        };

        let todos = self.tasks.load(&owner).await;
        let _ = self.notices.record("load tasks", todos);

        let entries = self.journal.load(&owner).await;
        let _ = self.notices.record("load journal", entries);

        info!(
            owner_id = %owner,
            todos = self.tasks.len(),
            journal_entries = self.journal.len(),
            "Dashboard mounted"
        );
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> PlannerResult<Identity> {
        let previous = self.session.token().cloned();
        let result = self.session.sign_in(email, password).await.cloned();
        let identity = self.notices.record("sign in", result)?;
        self.begin_session(previous).await;
        Ok(identity)
    }

    pub async fn register(&mut self, email: &str, password: &str) -> PlannerResult<Identity> {
        let previous = self.session.token().cloned();
        let result = self.session.register(email, password).await.cloned();
        let identity = self.notices.record("register", result)?;
        self.begin_session(previous).await;
        Ok(identity)
    }

    /// Resume a saved session and load its data
    pub async fn restore(&mut self, token: SessionToken) -> PlannerResult<Identity> {
        let previous = self.session.token().cloned();
        let result = self.session.restore(token).await.cloned();
        let identity = self.notices.record("restore session", result)?;
        self.begin_session(previous).await;
        Ok(identity)
    }

    /// Sign out and forget all local planner data; the theme survives
    pub async fn sign_out(&mut self) -> PlannerResult<()> {
        let result = self.session.sign_out().await;
        self.reset_local_state();
        self.notices.record("sign out", result)
    }

    /// Start a newly granted session from empty state.
    ///
    /// A session it replaced is revoked; nothing of the previous user's
    /// tasks, journal, drafts or edit target carries over.
    async fn begin_session(&mut self, previous: Option<SessionToken>) {
        self.reset_local_state();

        if let Some(token) = previous
            && self.session.token() != Some(&token)
        {
            let result = self.session.revoke(&token).await;
            let _ = self.notices.record("sign out", result);
        }

        self.mount().await;
    }

    fn reset_local_state(&mut self) {
        self.tasks.clear();
        self.journal.clear();
        self.calendar = Calendar::new(self.today);
    }

    /// Add a task (or rename the one being edited)
    pub async fn add_todo(&mut self, text: &str) -> PlannerResult<TodoChange> {
        let owner = self.require_owner("add task")?;
        let date = match self.new_task_date {
            NewTaskDate::Today => self.today,
            NewTaskDate::Selected => self.calendar.selected(),
        };
        let result = self.tasks.add_or_update(&owner, text, date).await;
        self.notices.record("save task", result)
    }

    pub fn begin_edit(&mut self, id: &RecordId) -> PlannerResult<Todo> {
        let result = self.tasks.begin_edit(id).cloned();
        self.notices.record("edit task", result)
    }

    pub fn cancel_edit(&mut self) {
        self.tasks.cancel_edit();
    }

    pub async fn toggle_todo(&mut self, id: &RecordId) -> PlannerResult<Todo> {
        let owner = self.require_owner("update task")?;
        let result = self.tasks.toggle(&owner, id).await;
        self.notices.record("update task", result)
    }

    pub async fn delete_todo(&mut self, id: &RecordId) -> PlannerResult<()> {
        let owner = self.require_owner("delete task")?;
        let result = self.tasks.delete(&owner, id).await;
        self.notices.record("delete task", result)
    }

    /// Tasks for the selected day
    pub fn visible_todos(&self) -> Vec<&Todo> {
        self.tasks.visible_for(self.calendar.selected())
    }

    pub fn select_date(&mut self, date: DateKey) {
        self.calendar.select(date);
    }

    pub fn prev_month(&mut self) {
        self.calendar.prev_month();
    }

    pub fn next_month(&mut self) {
        self.calendar.next_month();
    }

    pub fn jump_to_today(&mut self) {
        self.calendar.jump_to_today(self.today);
    }

    /// Replace the draft for the selected day
    pub fn set_journal_draft(&mut self, text: impl Into<String>) {
        self.journal.set_draft(self.calendar.selected(), text);
    }

    pub fn discard_journal_draft(&mut self) -> Option<String> {
        self.journal.discard_draft(self.calendar.selected())
    }

    /// Journal text shown for the selected day
    pub fn journal_content(&self) -> &str {
        self.journal.displayed_content(self.calendar.selected())
    }

    pub async fn save_journal(&mut self) -> PlannerResult<JournalSave> {
        let owner = self.require_owner("save journal entry")?;
        let result = self.journal.save(&owner, self.calendar.selected()).await;
        self.notices.record("save journal entry", result)
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme.toggle();
        self.theme
    }

    pub fn notices(&self) -> &[Notice] {
        self.notices.pending()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    pub fn view(&self) -> DashboardView {
        let Some(identity) = self.session.current_identity() else {
            return DashboardView::SignedOut {
                theme: self.theme,
                notices: self.notices.pending().to_vec(),
            };
        };

        let selected = self.calendar.selected();
        DashboardView::SignedIn(Box::new(DashboardSnapshot {
            identity: identity.clone(),
            theme: self.theme,
            today: self.today,
            selected,
            selected_label: self.calendar.selected_label(),
            todos: self.visible_todos().into_iter().cloned().collect(),
            editing: self.tasks.editing().cloned(),
            journal_label: Calendar::long_label(selected),
            journal_content: self.journal_content().to_string(),
            journal_dirty: self.journal.has_draft(selected),
            month_label: self.calendar.month_label(),
            grid: self.calendar.month_grid(self.today, &self.tasks, &self.journal),
            notices: self.notices.pending().to_vec(),
        }))
    }

    fn require_owner(&mut self, action: &str) -> PlannerResult<OwnerId> {
        let owner = self.session.owner().cloned().ok_or(PlannerError::NotSignedIn);
        self.notices.record(action, owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bento_store::{MemoryStore, TodoRepository};
    use std::sync::Arc;

    fn day(d: u32) -> DateKey {
        DateKey::from_ymd(2024, 1, d).unwrap()
    }

    fn dashboard(store: &Arc<MemoryStore>, options: DashboardOptions) -> Dashboard {
        Dashboard::new(Repositories::from_backend(store.clone()), options)
            .with_today(day(1))
            .with_theme(Theme::Light)
    }

    async fn signed_in(store: &Arc<MemoryStore>, options: DashboardOptions) -> Dashboard {
        let mut dash = dashboard(store, options);
        dash.register("u1@example.com", "password").await.unwrap();
        dash
    }

    fn snapshot(dash: &Dashboard) -> DashboardSnapshot {
        match dash.view() {
            DashboardView::SignedIn(snapshot) => *snapshot,
            DashboardView::SignedOut { .. } => panic!("expected signed-in view"),
        }
    }

    fn created(change: TodoChange) -> Todo {
        match change {
            TodoChange::Created(todo) => todo,
            other => panic!("expected a created todo, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_signed_out_view_loads_nothing() {
        let store = Arc::new(MemoryStore::new());
        let mut dash = dashboard(&store, DashboardOptions::default());

        dash.mount().await;
        assert!(matches!(dash.view(), DashboardView::SignedOut { .. }));
        assert!(dash.tasks().is_empty());

        assert!(matches!(dash.add_todo("nope").await, Err(PlannerError::NotSignedIn)));
        assert_eq!(store.write_count(), 0);
        assert_eq!(dash.take_notices().len(), 1);
    }

    #[tokio::test]
    async fn test_task_scenario() {
        let store = Arc::new(MemoryStore::new());
        let mut dash = signed_in(&store, DashboardOptions::default()).await;

        let todo = created(dash.add_todo("Buy milk").await.unwrap());
        let visible = dash.visible_todos();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].date, day(1));
        assert!(!visible[0].completed);

        assert!(dash.toggle_todo(&todo.id).await.unwrap().completed);
        assert!(dash.visible_todos()[0].completed);

        dash.begin_edit(&todo.id).unwrap();
        let TodoChange::Updated(edited) = dash.add_todo("Buy oat milk").await.unwrap() else {
            panic!("expected an update");
        };
        assert_eq!(edited.id, todo.id);
        assert_eq!(dash.visible_todos()[0].text, "Buy oat milk");
        assert_eq!(dash.visible_todos()[0].id, todo.id);

        dash.delete_todo(&todo.id).await.unwrap();
        assert!(dash.visible_todos().is_empty());
        assert!(dash.take_notices().is_empty());
    }

    #[tokio::test]
    async fn test_journal_scenario() {
        let store = Arc::new(MemoryStore::new());
        let mut dash = signed_in(&store, DashboardOptions::default()).await;

        dash.set_journal_draft("Good day");
        dash.save_journal().await.unwrap();
        dash.set_journal_draft("Great day");
        dash.save_journal().await.unwrap();

        let owner = dash.session().owner().cloned().unwrap();
        let repo: &dyn bento_store::JournalRepository = store.as_ref();
        let entries = repo.list_by_owner(&owner).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content, "Great day");
        assert_eq!(entries[0].date, day(1));
    }

    #[tokio::test]
    async fn test_new_tasks_follow_configured_date() {
        let store = Arc::new(MemoryStore::new());

        let mut dash = signed_in(&store, DashboardOptions::default()).await;
        dash.select_date(day(5));
        let todo = created(dash.add_todo("filed today").await.unwrap());
        assert_eq!(todo.date, day(1));
        assert!(dash.visible_todos().is_empty());

        let options = DashboardOptions {
            new_task_date: NewTaskDate::Selected,
            ..Default::default()
        };
        let mut dash = dashboard(&store, options);
        dash.sign_in("u1@example.com", "password").await.unwrap();
        dash.select_date(day(5));
        let todo = created(dash.add_todo("filed on selection").await.unwrap());
        assert_eq!(todo.date, day(5));
        assert_eq!(dash.visible_todos().len(), 1);
    }

    #[tokio::test]
    async fn test_drafts_do_not_follow_navigation() {
        let store = Arc::new(MemoryStore::new());
        let mut dash = signed_in(&store, DashboardOptions::default()).await;

        dash.set_journal_draft("half a thought");
        dash.select_date(day(2));
        assert_eq!(dash.journal_content(), "");
        assert!(!snapshot(&dash).journal_dirty);

        dash.select_date(day(1));
        assert_eq!(dash.journal_content(), "half a thought");
        assert!(snapshot(&dash).journal_dirty);
    }

    #[tokio::test]
    async fn test_failed_write_produces_notice() {
        let store = Arc::new(MemoryStore::new());
        let mut dash = signed_in(&store, DashboardOptions::default()).await;
        let todo = created(dash.add_todo("steady").await.unwrap());

        store.set_fail_writes(true);
        assert!(dash.toggle_todo(&todo.id).await.is_err());
        assert!(!dash.visible_todos()[0].completed);

        dash.set_journal_draft("not yet");
        assert!(dash.save_journal().await.is_err());
        assert_eq!(dash.journal_content(), "not yet");

        let view = snapshot(&dash);
        assert_eq!(view.notices.len(), 2);
        let notices = dash.take_notices();
        assert_eq!(notices[0].action, "update task");
        assert_eq!(notices[1].action, "save journal entry");
        assert!(dash.notices().is_empty());
    }

    #[tokio::test]
    async fn test_mount_failure_keeps_going() {
        let store = Arc::new(MemoryStore::new());
        let grant = {
            let mut dash = signed_in(&store, DashboardOptions::default()).await;
            dash.add_todo("persisted").await.unwrap();
            dash.session().token().cloned().unwrap()
        };

        store.set_fail_reads(true);
        let mut dash = dashboard(&store, DashboardOptions::default());
        dash.restore(grant.clone()).await.unwrap();
        assert!(dash.is_authenticated());
        assert!(dash.tasks().is_empty());
        let actions: Vec<String> = dash.take_notices().into_iter().map(|n| n.action).collect();
        assert_eq!(actions, vec!["load tasks", "load journal"]);

        store.set_fail_reads(false);
        dash.mount().await;
        assert_eq!(dash.tasks().len(), 1);
    }

    #[tokio::test]
    async fn test_sign_out_clears_local_state_but_not_theme() {
        let store = Arc::new(MemoryStore::new());
        let mut dash = signed_in(&store, DashboardOptions::default()).await;
        dash.add_todo("private").await.unwrap();
        dash.set_journal_draft("secret");
        dash.select_date(day(20));
        dash.toggle_theme();

        dash.sign_out().await.unwrap();
        assert!(dash.tasks().is_empty());
        assert_eq!(dash.journal_content(), "");
        assert_eq!(dash.calendar().selected(), day(1));
        assert!(matches!(
            dash.view(),
            DashboardView::SignedOut { theme: Theme::Dark, .. }
        ));
    }

    #[tokio::test]
    async fn test_switching_users_starts_from_empty_state() {
        let store = Arc::new(MemoryStore::new());
        {
            let mut other = dashboard(&store, DashboardOptions::default());
            other.register("b@example.com", "password").await.unwrap();
            other.sign_out().await.unwrap();
        }

        let mut dash = dashboard(&store, DashboardOptions::default());
        dash.register("a@example.com", "password").await.unwrap();
        let TodoChange::Created(todo) = dash.add_todo("A's task").await.unwrap() else {
            panic!("expected a created todo");
        };
        dash.set_journal_draft("A's private diary");
        dash.begin_edit(&todo.id).unwrap();
        dash.select_date(day(20));
        let first_token = dash.session().token().cloned().unwrap();

        // Loads fail, so only a reset keeps A's records off B's screen
        store.set_fail_reads(true);
        dash.sign_in("b@example.com", "password").await.unwrap();
        assert_eq!(snapshot(&dash).identity.email, "b@example.com");
        assert!(dash.tasks().is_empty());
        assert_eq!(dash.journal_content(), "");
        assert!(dash.tasks().editing().is_none());
        assert_eq!(dash.calendar().selected(), day(1));

        store.set_fail_reads(false);
        dash.mount().await;
        assert!(dash.visible_todos().is_empty());
        assert_eq!(dash.journal_content(), "");

        // B's first save is B's own text, and adding is not blocked by A's edit
        assert!(matches!(dash.save_journal().await.unwrap(), JournalSave::Unchanged));
        assert!(matches!(
            dash.add_todo("B's task").await.unwrap(),
            TodoChange::Created(_)
        ));

        // The replaced session no longer resolves
        let identity: &dyn bento_store::IdentityService = store.as_ref();
        assert!(identity.resolve(&first_token).await.is_err());
    }

    #[tokio::test]
    async fn test_other_users_records_stay_hidden() {
        let store = Arc::new(MemoryStore::new());
        let repo: &dyn TodoRepository = store.as_ref();
        repo.create(&OwnerId::new("someone-else"), bento_api::NewTodo::new("theirs", day(1)))
            .await
            .unwrap();

        let dash = signed_in(&store, DashboardOptions::default()).await;
        assert!(dash.visible_todos().is_empty());
        assert!(!snapshot(&dash).grid.cell(day(1)).unwrap().decoration.has_todos);
    }

    #[tokio::test]
    async fn test_snapshot_contents() {
        let store = Arc::new(MemoryStore::new());
        let mut dash = signed_in(&store, DashboardOptions::default()).await;
        dash.add_todo("one").await.unwrap();
        dash.set_journal_draft("entry");
        dash.save_journal().await.unwrap();

        let view = snapshot(&dash);
        assert_eq!(view.identity.email, "u1@example.com");
        assert_eq!(view.selected, day(1));
        assert_eq!(view.selected_label, "January 1, 2024");
        assert_eq!(view.journal_label, "Monday, January 1, 2024");
        assert_eq!(view.month_label, "January 2024");
        assert_eq!(view.journal_content, "entry");
        assert!(!view.journal_dirty);
        assert_eq!(view.todos.len(), 1);
        assert_eq!(
            view.grid.cell(day(1)).unwrap().decoration.css_class(),
            "has-journal has-todos"
        );
    }
}
