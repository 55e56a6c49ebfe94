//! Per-day journal
//!
//! At most one entry exists per owner and day. Unsaved text lives in a draft
//! buffer keyed by day, so moving between days never carries text along.

use bento_api::JournalEntry;
use bento_store::JournalRepository;
use bento_util::{DateKey, OwnerId};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

use crate::PlannerResult;

/// Outcome of [`Journal::save`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalSave {
    Created(JournalEntry),
    Updated(JournalEntry),
    /// No draft, or only whitespace; nothing was written
    Unchanged,
}

pub struct Journal {
    repo: Arc<dyn JournalRepository>,
    entries: BTreeMap<DateKey, JournalEntry>,
    drafts: HashMap<DateKey, String>,
}

impl Journal {
    pub fn new(repo: Arc<dyn JournalRepository>) -> Self {
        Self {
            repo,
            entries: BTreeMap::new(),
            drafts: HashMap::new(),
        }
    }

    /// Replace the local map with the owner's entries; prior map kept on failure
    pub async fn load(&mut self, owner: &OwnerId) -> PlannerResult<usize> {
        let entries = self.repo.list_by_owner(owner).await?;
        self.entries = entries.into_iter().map(|e| (e.date, e)).collect();
        debug!(owner_id = %owner, count = self.entries.len(), "Journal loaded");
        Ok(self.entries.len())
    }

    pub fn set_draft(&mut self, date: DateKey, text: impl Into<String>) {
        self.drafts.insert(date, text.into());
    }

    pub fn discard_draft(&mut self, date: DateKey) -> Option<String> {
        self.drafts.remove(&date)
    }

    pub fn draft(&self, date: DateKey) -> Option<&str> {
        self.drafts.get(&date).map(String::as_str)
    }

    pub fn entry(&self, date: DateKey) -> Option<&JournalEntry> {
        self.entries.get(&date)
    }

    /// Draft for `date`, else the saved content, else empty
    pub fn displayed_content(&self, date: DateKey) -> &str {
        self.draft(date)
            .or_else(|| self.entries.get(&date).map(|e| e.content.as_str()))
            .unwrap_or("")
    }

    /// Write the draft for `date` to the store.
    ///
    /// Looks the day up first so an existing entry is updated in place. The
    /// draft is cleared only after the write succeeds.
    pub async fn save(&mut self, owner: &OwnerId, date: DateKey) -> PlannerResult<JournalSave> {
        let Some(content) = self.drafts.get(&date).filter(|d| !d.trim().is_empty()).cloned() else {
            return Ok(JournalSave::Unchanged);
        };

        let result = match self.repo.find_by_date(owner, date).await? {
            Some(existing) => {
                let entry = self.repo.update(owner, &existing.id, content).await?;
                debug!(entry_id = %entry.id, date = %date, "Journal entry updated");
                JournalSave::Updated(entry)
            }
            None => {
                let entry = self.repo.create(owner, date, content).await?;
                debug!(entry_id = %entry.id, date = %date, "Journal entry created");
                JournalSave::Created(entry)
            }
        };

        if let JournalSave::Created(entry) | JournalSave::Updated(entry) = &result {
            self.entries.insert(date, entry.clone());
        }
        self.drafts.remove(&date);
        Ok(result)
    }

    pub fn has_entry(&self, date: DateKey) -> bool {
        self.entries.contains_key(&date)
    }

    pub fn has_draft(&self, date: DateKey) -> bool {
        self.drafts.contains_key(&date)
    }

    /// Saved entries ordered by day
    pub fn entries(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.drafts.clear();
    }
}
