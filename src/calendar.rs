use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::{Priority, Task};

pub const WEEKDAY_HEADERS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
pub const MAX_MARKERS_PER_DAY: usize = 3;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A displayed calendar page. `month` is 1-based.
///
/// Only pages whose own first day and both neighbours' first days are
/// representable dates can be built, so the grid arithmetic never leaves
/// chrono's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearMonth {
    year: i32,
    month: u32,
    #[serde(skip)]
    first: NaiveDate,
    #[serde(skip)]
    prev_first: NaiveDate,
    #[serde(skip)]
    next_first: NaiveDate,
}

fn month_offset(year: i32, month: u32, delta: i32) -> Option<(i32, u32)> {
    let index = year
        .checked_mul(12)?
        .checked_add(month as i32 - 1)?
        .checked_add(delta)?;
    Some((index.div_euclid(12), index.rem_euclid(12) as u32 + 1))
}

fn first_of(year: i32, month: u32, delta: i32) -> Option<NaiveDate> {
    let (year, month) = month_offset(year, month, delta)?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(Self {
            year,
            month,
            first: first_of(year, month, 0)?,
            prev_first: first_of(year, month, -1)?,
            next_first: first_of(year, month, 1)?,
        })
    }

    pub fn of(date: NaiveDate) -> Option<Self> {
        Self::new(date.year(), date.month())
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    /// Moves `delta` months forward (or back), wrapping across years.
    /// `None` when the target page is out of range.
    pub fn shifted(self, delta: i32) -> Option<Self> {
        let (year, month) = month_offset(self.year, self.month, delta)?;
        Self::new(year, month)
    }

    pub fn first_day(self) -> NaiveDate {
        self.first
    }

    /// 0 = Sunday .. 6 = Saturday.
    pub fn first_weekday(self) -> u32 {
        self.first.weekday().num_days_from_sunday()
    }

    pub fn days_in_month(self) -> u32 {
        (self.next_first - self.first).num_days() as u32
    }

    pub fn days_in_prev_month(self) -> u32 {
        (self.first - self.prev_first).num_days() as u32
    }

    pub fn title(self) -> String {
        format!("{} {}", MONTH_NAMES[(self.month - 1) as usize], self.year)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    PrevMonth,
    CurrentMonth,
    NextMonth,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMarker {
    pub task_id: String,
    pub priority: Priority,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub day: u32,
    pub kind: CellKind,
    pub is_today: bool,
    /// Number of tasks due that day, including ones without a marker.
    pub task_count: usize,
    pub markers: Vec<TaskMarker>,
}

impl DayCell {
    fn outside(day: u32, kind: CellKind) -> Self {
        Self {
            day,
            kind,
            is_today: false,
            task_count: 0,
            markers: Vec::new(),
        }
    }

    pub fn has_tasks(&self) -> bool {
        self.task_count > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalendarCell {
    Header { label: &'static str },
    Day(DayCell),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGrid {
    pub month: YearMonth,
    pub title: String,
    /// Seven header cells followed by the day cells, row-major.
    pub cells: Vec<CalendarCell>,
}

impl MonthGrid {
    pub fn day_cells(&self) -> impl Iterator<Item = &DayCell> {
        self.cells.iter().filter_map(|cell| match cell {
            CalendarCell::Day(day) => Some(day),
            CalendarCell::Header { .. } => None,
        })
    }

    pub fn weeks(&self) -> Vec<Vec<&DayCell>> {
        let days: Vec<&DayCell> = self.day_cells().collect();
        days.chunks(7).map(|week| week.to_vec()).collect()
    }
}

pub fn month_grid(month: YearMonth, tasks: &[Task], today: NaiveDate) -> MonthGrid {
    let first_weekday = month.first_weekday();
    let days_in_month = month.days_in_month();
    let days_in_prev_month = month.days_in_prev_month();

    let mut cells: Vec<CalendarCell> = WEEKDAY_HEADERS
        .iter()
        .map(|&label| CalendarCell::Header { label })
        .collect();

    for day in (days_in_prev_month - first_weekday + 1)..=days_in_prev_month {
        cells.push(CalendarCell::Day(DayCell::outside(day, CellKind::PrevMonth)));
    }

    for day in 1..=days_in_month {
        let Some(date) = NaiveDate::from_ymd_opt(month.year(), month.month(), day) else {
            continue;
        };
        let due: Vec<&Task> = tasks.iter().filter(|task| task.date == date).collect();
        let markers = due
            .iter()
            .take(MAX_MARKERS_PER_DAY)
            .map(|task| TaskMarker {
                task_id: task.id.clone(),
                priority: task.priority,
                color: task.priority.color(),
            })
            .collect();
        cells.push(CalendarCell::Day(DayCell {
            day,
            kind: CellKind::CurrentMonth,
            is_today: date == today,
            task_count: due.len(),
            markers,
        }));
    }

    let used = first_weekday + days_in_month;
    let trailing = used.div_ceil(7) * 7 - used;
    for day in 1..=trailing {
        cells.push(CalendarCell::Day(DayCell::outside(day, CellKind::NextMonth)));
    }

    MonthGrid {
        month,
        title: month.title(),
        cells,
    }
}
