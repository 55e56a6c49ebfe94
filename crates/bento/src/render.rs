//! Terminal rendering for dashboard state

use bento_api::Todo;
use bento_core::{DashboardSnapshot, DashboardView, DayCell, MonthGrid, Notice, Theme, WEEKDAY_LABELS};
use owo_colors::{OwoColorize, Style};

/// Colors for one theme
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    heading: Style,
    muted: Style,
    accent: Style,
    done: Style,
    warning: Style,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                heading: Style::new().bright_white().bold(),
                muted: Style::new().bright_black(),
                accent: Style::new().bright_cyan(),
                done: Style::new().bright_black().strikethrough(),
                warning: Style::new().bright_yellow(),
            },
            Theme::Light => Self {
                heading: Style::new().black().bold(),
                muted: Style::new().dimmed(),
                accent: Style::new().blue(),
                done: Style::new().dimmed().strikethrough(),
                warning: Style::new().red(),
            },
        }
    }
}

/// Extension trait for themed terminal rendering
pub trait Render {
    fn render(&self, palette: &Palette) -> String;
}

impl Render for Notice {
    fn render(&self, palette: &Palette) -> String {
        format!("{} {}", "!".style(palette.warning), self.to_string().style(palette.warning))
    }
}

/// A todo line; `index` is its 1-based position in the visible list
pub fn render_todo(index: usize, todo: &Todo, editing: bool, palette: &Palette) -> String {
    let mark = if todo.completed { "[x]" } else { "[ ]" };
    let text = if todo.completed {
        todo.text.style(palette.done).to_string()
    } else {
        todo.text.clone()
    };
    let id = todo.id.short().style(palette.muted).to_string();
    let edit = if editing {
        format!(" {}", "(editing)".style(palette.accent))
    } else {
        String::new()
    };
    format!("{:>3}. {} {} {}{}", index, mark, text, id, edit)
}

/// Marker shown under a day number
fn marker(cell: &DayCell) -> char {
    match (cell.decoration.has_journal, cell.decoration.has_todos) {
        (true, true) => '*',
        (true, false) => 'j',
        (false, true) => 't',
        (false, false) => ' ',
    }
}

fn render_cell(cell: &DayCell, palette: &Palette) -> String {
    let text = format!("{:>2}{}", cell.date.format("%-d"), marker(cell));

    let mut style = if cell.in_month { Style::new() } else { palette.muted };
    if cell.is_today {
        style = style.bold().underline();
    }
    if cell.is_selected {
        style = style.reversed();
    }
    text.style(style).to_string()
}

impl Render for MonthGrid {
    fn render(&self, palette: &Palette) -> String {
        let mut out = String::new();

        let header: Vec<String> = WEEKDAY_LABELS.iter().map(|l| format!("{:>3}", l)).collect();
        out.push_str(&header.join(" ").style(palette.muted).to_string());
        out.push('\n');

        for week in &self.weeks {
            let cells: Vec<String> = week.iter().map(|c| render_cell(c, palette)).collect();
            out.push_str(&cells.join(" "));
            out.push('\n');
        }
        out
    }
}

pub fn render_notices(notices: &[Notice], palette: &Palette) -> String {
    notices
        .iter()
        .map(|n| n.render(palette) + "\n")
        .collect()
}

/// Todo list section for the selected day
pub fn render_todos(snapshot: &DashboardSnapshot, palette: &Palette) -> String {
    let mut out = format!("{}\n", snapshot.selected_label.style(palette.heading));
    if snapshot.todos.is_empty() {
        out.push_str(&format!("     {}\n", "No tasks".style(palette.muted)));
    }
    for (i, todo) in snapshot.todos.iter().enumerate() {
        let editing = snapshot.editing.as_ref() == Some(&todo.id);
        out.push_str(&render_todo(i + 1, todo, editing, palette));
        out.push('\n');
    }
    out
}

/// Journal section for the selected day
pub fn render_journal(snapshot: &DashboardSnapshot, palette: &Palette) -> String {
    let mut title = snapshot.journal_label.style(palette.heading).to_string();
    if snapshot.journal_dirty {
        title.push_str(&format!(" {}", "(unsaved)".style(palette.warning)));
    }

    let body = if snapshot.journal_content.is_empty() {
        "Nothing written yet".style(palette.muted).to_string()
    } else {
        snapshot.journal_content.clone()
    };
    format!("{}\n{}\n", title, body)
}

pub fn render_calendar(snapshot: &DashboardSnapshot, palette: &Palette) -> String {
    format!(
        "{}\n{}",
        snapshot.month_label.style(palette.heading),
        snapshot.grid.render(palette)
    )
}

impl Render for DashboardSnapshot {
    fn render(&self, palette: &Palette) -> String {
        let header = format!(
            "{} {} {}",
            "bento".style(palette.accent).bold(),
            self.identity.email.style(palette.muted),
            format!("[{}]", self.theme).style(palette.muted),
        );

        [
            header,
            String::new(),
            render_calendar(self, palette),
            render_todos(self, palette),
            render_journal(self, palette),
            render_notices(&self.notices, palette),
        ]
        .join("\n")
        .trim_end()
        .to_string()
    }
}

impl Render for DashboardView {
    fn render(&self, palette: &Palette) -> String {
        match self {
            DashboardView::SignedIn(snapshot) => snapshot.render(palette),
            DashboardView::SignedOut { notices, .. } => {
                let mut out = format!(
                    "{}\n{}\n",
                    "bento".style(palette.accent).bold(),
                    "Not signed in. Use `login` or `register`.".style(palette.muted)
                );
                out.push_str(&render_notices(notices, palette));
                out.trim_end().to_string()
            }
        }
    }
}

pub fn palette_for(view: &DashboardView) -> Palette {
    match view {
        DashboardView::SignedIn(snapshot) => Palette::for_theme(snapshot.theme),
        DashboardView::SignedOut { theme, .. } => Palette::for_theme(*theme),
    }
}
