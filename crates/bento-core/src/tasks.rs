//! Date-scoped task list
//!
//! Every mutation goes to the repository first and is reflected locally only
//! once the store has confirmed it. A failed write therefore leaves the local
//! collection exactly as it was.

use bento_api::{NewTodo, Todo, TodoPatch};
use bento_store::TodoRepository;
use bento_util::{DateKey, OwnerId, RecordId};
use std::sync::Arc;
use tracing::debug;

use crate::{PlannerError, PlannerResult};

/// Outcome of [`TaskList::add_or_update`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoChange {
    Created(Todo),
    Updated(Todo),
    /// Blank input; nothing was written
    Unchanged,
}

pub struct TaskList {
    repo: Arc<dyn TodoRepository>,
    todos: Vec<Todo>,
    editing: Option<RecordId>,
}

impl TaskList {
    pub fn new(repo: Arc<dyn TodoRepository>) -> Self {
        Self {
            repo,
            todos: Vec::new(),
            editing: None,
        }
    }

    /// Replace the local collection with the owner's todos.
    ///
    /// On failure the previous collection is kept.
    pub async fn load(&mut self, owner: &OwnerId) -> PlannerResult<usize> {
        let todos = self.repo.list_by_owner(owner).await?;
        debug!(owner_id = %owner, count = todos.len(), "Tasks loaded");
        self.todos = todos;
        Ok(self.todos.len())
    }

    /// Create a todo on `date`, or rename the todo being edited
    pub async fn add_or_update(
        &mut self,
        owner: &OwnerId,
        text: &str,
        date: DateKey,
    ) -> PlannerResult<TodoChange> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(TodoChange::Unchanged);
        }

        if let Some(id) = self.editing.clone() {
            let index = self.index_of(&id)?;
            let updated = self.repo.update(owner, &id, TodoPatch::text(text)).await?;
            self.todos[index] = updated.clone();
            self.editing = None;
            debug!(todo_id = %id, "Task renamed");
            return Ok(TodoChange::Updated(updated));
        }

        let created = self.repo.create(owner, NewTodo::new(text, date)).await?;
        debug!(todo_id = %created.id, date = %date, "Task added");
        self.todos.push(created.clone());
        Ok(TodoChange::Created(created))
    }

    /// Switch to editing mode for `id`
    pub fn begin_edit(&mut self, id: &RecordId) -> PlannerResult<&Todo> {
        let index = self.index_of(id)?;
        self.editing = Some(id.clone());
        Ok(&self.todos[index])
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// The todo currently being edited, if any
    pub fn editing(&self) -> Option<&RecordId> {
        self.editing.as_ref()
    }

    /// Flip `completed` based on the local value
    pub async fn toggle(&mut self, owner: &OwnerId, id: &RecordId) -> PlannerResult<Todo> {
        let index = self.index_of(id)?;
        let completed = !self.todos[index].completed;

        let updated = self
            .repo
            .update(owner, id, TodoPatch::completed(completed))
            .await?;
        self.todos[index] = updated.clone();
        debug!(todo_id = %id, completed, "Task toggled");
        Ok(updated)
    }

    pub async fn delete(&mut self, owner: &OwnerId, id: &RecordId) -> PlannerResult<()> {
        self.index_of(id)?;
        self.repo.delete(owner, id).await?;

        self.todos.retain(|t| &t.id != id);
        if self.editing.as_ref() == Some(id) {
            self.editing = None;
        }
        debug!(todo_id = %id, "Task deleted");
        Ok(())
    }

    /// Todos filed under `date`, in creation order
    pub fn visible_for(&self, date: DateKey) -> Vec<&Todo> {
        self.todos.iter().filter(|t| t.date == date).collect()
    }

    pub fn has_todos_on(&self, date: DateKey) -> bool {
        self.todos.iter().any(|t| t.date == date)
    }

    pub fn get(&self, id: &RecordId) -> Option<&Todo> {
        self.todos.iter().find(|t| &t.id == id)
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// Forget all local state (used on sign-out)
    pub fn clear(&mut self) {
        self.todos.clear();
        self.editing = None;
    }

    fn index_of(&self, id: &RecordId) -> PlannerResult<usize> {
        self.todos
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| PlannerError::UnknownTodo(id.clone()))
    }
}
