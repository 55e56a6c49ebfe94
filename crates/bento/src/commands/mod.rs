pub mod auth;
pub mod interactive;
pub mod journal;
pub mod show;
pub mod todo;

use anyhow::{Context as _, Result, bail};
use bento_core::{Dashboard, DashboardOptions, PlannerError};
use bento_ipc::RemoteStore;
use bento_store::{Repositories, StoreError};
use bento_util::{DateKey, RecordId};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::render::{Palette, render_notices};
use crate::session_file::SessionFile;

/// Everything a command needs to reach bentod and the saved session
pub struct Context {
    pub socket_path: PathBuf,
    pub session: SessionFile,
    pub options: DashboardOptions,
}

impl Context {
    /// A signed-out dashboard on a fresh connection
    pub async fn connect(&self) -> Result<Dashboard> {
        let remote = RemoteStore::connect(&self.socket_path).await.with_context(|| {
            format!(
                "Could not connect to bentod at {:?}. Is the service running?",
                self.socket_path
            )
        })?;
        let repos = Repositories::from_backend(Arc::new(remote));
        Ok(Dashboard::new(repos, self.options))
    }

    /// A dashboard with the saved session restored and its data loaded
    pub async fn signed_in(&self) -> Result<Dashboard> {
        let Some(token) = self.session.load()? else {
            bail!("Not signed in.\n\nSign in with:\n  bento login <email>");
        };

        let mut dash = self.connect().await?;
        match dash.restore(token).await {
            Ok(identity) => {
                debug!(owner_id = %identity.owner_id, "Session restored");
                Ok(dash)
            }
            Err(PlannerError::Store(StoreError::Unauthenticated)) => {
                self.session.clear()?;
                bail!("Session expired.\n\nSign in again with:\n  bento login <email>");
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist the token of the current session, or forget it when signed out
    pub fn remember(&self, dash: &Dashboard) -> Result<()> {
        match dash.session().token() {
            Some(token) => self.session.save(token),
            None => self.session.clear(),
        }
    }
}

/// Print notices that did not abort the command
pub fn flush_notices(dash: &mut Dashboard) {
    let notices = dash.take_notices();
    if !notices.is_empty() {
        let palette = Palette::for_theme(dash.theme());
        eprint!("{}", render_notices(&notices, &palette));
    }
}

/// Parse `today`, `tomorrow`, `yesterday` or `YYYY-MM-DD`
pub fn parse_date_arg(arg: &str, today: DateKey) -> Result<DateKey> {
    match arg.trim().to_ascii_lowercase().as_str() {
        "today" => Ok(today),
        "tomorrow" => Ok(today.add_days(1)),
        "yesterday" => Ok(today.add_days(-1)),
        other => other
            .parse()
            .with_context(|| format!("Invalid date '{}' (expected YYYY-MM-DD)", arg)),
    }
}

/// Select `date` if one was given
pub fn select_date_arg(dash: &mut Dashboard, date: Option<&str>) -> Result<()> {
    if let Some(arg) = date {
        let date = parse_date_arg(arg, dash.today())?;
        dash.select_date(date);
    }
    Ok(())
}

/// Find a todo by 1-based position in the visible list or by id prefix
pub fn resolve_todo(dash: &Dashboard, target: &str) -> Result<RecordId> {
    let target = target.trim();

    if let Ok(n) = target.parse::<usize>() {
        let visible = dash.visible_todos();
        if n >= 1 && n <= visible.len() {
            return Ok(visible[n - 1].id.clone());
        }
    }

    let matches: Vec<&RecordId> = dash
        .tasks()
        .todos()
        .iter()
        .map(|t| &t.id)
        .filter(|id| id.as_str().starts_with(target))
        .collect();

    match matches.as_slice() {
        [id] => Ok((*id).clone()),
        [] => bail!("No task matches '{}'", target),
        _ => bail!("'{}' matches {} tasks; use more of the id", target, matches.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bento_store::MemoryStore;

    fn day(d: u32) -> DateKey {
        DateKey::from_ymd(2024, 3, d).unwrap()
    }

    #[test]
    fn test_parse_date_arg() {
        let today = day(10);
        assert_eq!(parse_date_arg("today", today).unwrap(), today);
        assert_eq!(parse_date_arg("Tomorrow", today).unwrap(), day(11));
        assert_eq!(parse_date_arg("yesterday", today).unwrap(), day(9));
        assert_eq!(parse_date_arg("2024-03-01", today).unwrap(), day(1));
        assert!(parse_date_arg("next week", today).is_err());
        assert!(parse_date_arg("2024-02-30", today).is_err());
    }

    #[tokio::test]
    async fn test_resolve_todo_by_index_and_prefix() {
        let store = Arc::new(MemoryStore::new());
        let mut dash = Dashboard::new(Repositories::from_backend(store), DashboardOptions::default())
            .with_today(day(10));
        dash.register("ada@example.com", "password").await.unwrap();
        dash.add_todo("first").await.unwrap();
        dash.add_todo("second").await.unwrap();

        let second = dash.visible_todos()[1].id.clone();
        assert_eq!(resolve_todo(&dash, "2").unwrap(), second);
        assert_eq!(resolve_todo(&dash, second.as_str()).unwrap(), second);
        // Record ids are hex, so these can only miss
        assert!(resolve_todo(&dash, "3z").is_err());
        assert!(resolve_todo(&dash, "zzzz-not-an-id").is_err());
    }
}
