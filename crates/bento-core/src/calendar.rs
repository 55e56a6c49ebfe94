//! Calendar selection and month grid

use bento_util::DateKey;
use chrono::Datelike;

use crate::{Journal, TaskList};

/// Rows in a month grid; enough for any month starting on Sunday
pub const GRID_WEEKS: usize = 6;

/// Column headers, Monday first
pub const WEEKDAY_LABELS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

/// What a day cell shows beyond its number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decoration {
    pub has_journal: bool,
    pub has_todos: bool,
}

impl Decoration {
    /// Class names used by the web front end for the same markers
    pub fn css_class(&self) -> &'static str {
        match (self.has_journal, self.has_todos) {
            (true, true) => "has-journal has-todos",
            (true, false) => "has-journal",
            (false, true) => "has-todos",
            (false, false) => "",
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.has_journal && !self.has_todos
    }
}

/// Decoration for `date` from the local collections. Recomputed on every
/// call so it can never disagree with them.
pub fn decoration_for(date: DateKey, tasks: &TaskList, journal: &Journal) -> Decoration {
    Decoration {
        has_journal: journal.has_entry(date),
        has_todos: tasks.has_todos_on(date),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub date: DateKey,
    pub in_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub decoration: Decoration,
}

/// Six Monday-first weeks covering a month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    /// First day of the month shown
    pub month: DateKey,
    pub weeks: Vec<[DayCell; 7]>,
}

impl MonthGrid {
    pub fn cells(&self) -> impl Iterator<Item = &DayCell> {
        self.weeks.iter().flatten()
    }

    pub fn cell(&self, date: DateKey) -> Option<&DayCell> {
        self.cells().find(|c| c.date == date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    selected: DateKey,
    displayed_month: DateKey,
}

impl Calendar {
    /// Calendar with `today` selected
    pub fn new(today: DateKey) -> Self {
        Self {
            selected: today,
            displayed_month: today.month_start(),
        }
    }

    pub fn selected(&self) -> DateKey {
        self.selected
    }

    pub fn displayed_month(&self) -> DateKey {
        self.displayed_month
    }

    /// Select a day and bring its month into view
    pub fn select(&mut self, date: DateKey) {
        self.selected = date;
        self.displayed_month = date.month_start();
    }

    /// Page the grid back a month; the selection stays put
    pub fn prev_month(&mut self) {
        self.displayed_month = self.displayed_month.sub_months(1);
    }

    pub fn next_month(&mut self) {
        self.displayed_month = self.displayed_month.add_months(1);
    }

    pub fn jump_to_today(&mut self, today: DateKey) {
        self.select(today);
    }

    pub fn month_grid(&self, today: DateKey, tasks: &TaskList, journal: &Journal) -> MonthGrid {
        let first = self.displayed_month;
        let offset = first.date().weekday().num_days_from_monday() as i64;
        let grid_start = first.add_days(-offset);

        let weeks: Vec<[DayCell; 7]> = (0..GRID_WEEKS as i64)
            .map(|week| {
                std::array::from_fn(|col| {
                    let date = grid_start.add_days(week * 7 + col as i64);
                    DayCell {
                        date,
                        in_month: date.same_month(&first),
                        is_today: date == today,
                        is_selected: date == self.selected,
                        decoration: decoration_for(date, tasks, journal),
                    }
                })
            })
            .collect();

        MonthGrid { month: first, weeks }
    }

    /// e.g. "January 2024"
    pub fn month_label(&self) -> String {
        self.displayed_month.format("%B %Y")
    }

    /// e.g. "January 1, 2024"
    pub fn selected_label(&self) -> String {
        self.selected.format("%B %-d, %Y")
    }

    /// e.g. "Monday, January 1, 2024"
    pub fn long_label(date: DateKey) -> String {
        date.format("%A, %B %-d, %Y")
    }
}
