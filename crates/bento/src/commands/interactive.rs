//! Line-driven dashboard session
//!
//! Keeps one connection and one dashboard for the whole session, so drafts
//! and calendar navigation survive between commands.

use anyhow::{Result, bail};
use bento_core::{Dashboard, DashboardView, JournalSave, TodoChange};
use bento_util::DateKey;
use owo_colors::OwoColorize;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use super::auth::prompt_password;
use super::{Context, flush_notices, parse_date_arg, resolve_todo};
use crate::render::{Render, palette_for};

const HELP: &str = "\
Tasks:    add <text>   edit <n> [text]   cancel   toggle <n>   rm <n>
Calendar: select <date>   today   next   prev
Journal:  write <text>   save   discard
Session:  login <email>   register <email>   logout
Other:    show   theme   help   quit

<n> is a task number from the list or the start of its id.
<date> is today, tomorrow, yesterday or YYYY-MM-DD.";

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Add(String),
    Edit { target: String, text: Option<String> },
    Cancel,
    Toggle(String),
    Remove(String),
    Select(DateKey),
    Today,
    Next,
    Prev,
    Write(String),
    Save,
    Discard,
    Theme,
    Login(String),
    Register(String),
    Logout,
    Show,
    Help,
    Quit,
}

fn required(arg: &str, usage: &str) -> Result<String> {
    if arg.is_empty() {
        bail!("Usage: {}", usage);
    }
    Ok(arg.to_string())
}

/// Parse an input line; `None` for a blank line
pub fn parse_action(line: &str, today: DateKey) -> Result<Option<Action>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let action = match word.to_ascii_lowercase().as_str() {
        "add" | "a" => Action::Add(required(rest, "add <text>")?),
        "edit" | "e" => {
            let target = required(rest, "edit <n> [text]")?;
            match target.split_once(char::is_whitespace) {
                Some((target, text)) => Action::Edit {
                    target: target.to_string(),
                    text: Some(text.trim().to_string()),
                },
                None => Action::Edit { target, text: None },
            }
        }
        "cancel" => Action::Cancel,
        "toggle" | "t" | "done" => Action::Toggle(required(rest, "toggle <n>")?),
        "rm" | "delete" => Action::Remove(required(rest, "rm <n>")?),
        "select" | "s" | "go" => {
            Action::Select(parse_date_arg(&required(rest, "select <date>")?, today)?)
        }
        "today" => Action::Today,
        "next" | "n" => Action::Next,
        "prev" | "p" => Action::Prev,
        "write" | "w" => Action::Write(rest.to_string()),
        "save" => Action::Save,
        "discard" => Action::Discard,
        "theme" => Action::Theme,
        "login" => Action::Login(required(rest, "login <email>")?),
        "register" => Action::Register(required(rest, "register <email>")?),
        "logout" => Action::Logout,
        "show" | "ls" => Action::Show,
        "help" | "?" => Action::Help,
        "quit" | "q" | "exit" => Action::Quit,
        other => bail!("Unknown command '{}'. Type `help` for a list.", other),
    };
    Ok(Some(action))
}

fn print_view(dash: &mut Dashboard) {
    let view = dash.view();
    println!("{}", view.render(&palette_for(&view)));
    // Shown once, as part of this view
    dash.take_notices();
}

/// Apply one action. Returns false when the session should end.
async fn apply(ctx: &Context, dash: &mut Dashboard, action: Action) -> Result<bool> {
    debug!(?action, "Interactive action");

    match action {
        Action::Quit => return Ok(false),
        Action::Help => {
            println!("{}", HELP);
            return Ok(true);
        }
        Action::Show => {}

        Action::Login(email) => {
            let password = prompt_password(false)?;
            if dash.sign_in(&email, &password).await.is_ok() {
                ctx.remember(dash)?;
            }
        }
        Action::Register(email) => {
            let password = prompt_password(true)?;
            if dash.register(&email, &password).await.is_ok() {
                ctx.remember(dash)?;
            }
        }
        Action::Logout => {
            let _ = dash.sign_out().await;
            ctx.session.clear()?;
        }

        Action::Add(text) => {
            if let Ok(TodoChange::Unchanged) = dash.add_todo(&text).await {
                println!("{}", "Nothing to save".dimmed());
            }
        }
        Action::Edit { target, text } => {
            let id = resolve_todo(dash, &target)?;
            if dash.begin_edit(&id).is_ok()
                && let Some(text) = text
            {
                let _ = dash.add_todo(&text).await;
            }
        }
        Action::Cancel => dash.cancel_edit(),
        Action::Toggle(target) => {
            let id = resolve_todo(dash, &target)?;
            let _ = dash.toggle_todo(&id).await;
        }
        Action::Remove(target) => {
            let id = resolve_todo(dash, &target)?;
            let _ = dash.delete_todo(&id).await;
        }

        Action::Select(date) => dash.select_date(date),
        Action::Today => dash.jump_to_today(),
        Action::Next => dash.next_month(),
        Action::Prev => dash.prev_month(),

        Action::Write(text) => dash.set_journal_draft(text),
        Action::Save => {
            if let Ok(JournalSave::Unchanged) = dash.save_journal().await {
                println!("{}", "Nothing to save".dimmed());
            }
        }
        Action::Discard => {
            dash.discard_journal_draft();
        }

        Action::Theme => {
            let theme = dash.toggle_theme();
            debug!(%theme, "Theme toggled");
        }
    }

    print_view(dash);
    Ok(true)
}

pub async fn run(ctx: &Context) -> Result<()> {
    let mut dash = ctx.connect().await?;

    if let Some(token) = ctx.session.load()?
        && dash.restore(token).await.is_err()
    {
        // Stale token; start signed out
        ctx.session.clear()?;
    }

    print_view(&mut dash);
    println!("{}", "Type `help` for commands.".dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ">".bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        let action = match parse_action(&line, dash.today()) {
            Ok(Some(action)) => action,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{}", e.to_string().red());
                continue;
            }
        };

        match apply(ctx, &mut dash, action).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                eprintln!("{}", e.to_string().red());
                flush_notices(&mut dash);
            }
        }
    }

    if matches!(dash.view(), DashboardView::SignedIn(ref s) if s.journal_dirty) {
        eprintln!("{}", "Unsaved journal text was discarded".yellow());
    }
    Ok(())
}
