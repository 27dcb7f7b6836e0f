use std::fmt;

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::models::Task;
use crate::status::is_overdue;

pub const UPCOMING_WINDOW_DAYS: i64 = 7;
pub const UPCOMING_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
    pub progress_percentage: u8,
}

pub fn summarize(tasks: &[Task], now: NaiveDateTime) -> DashboardSummary {
    let total = tasks.len();
    let completed = tasks.iter().filter(|task| task.completed).count();
    let overdue = tasks.iter().filter(|task| is_overdue(task, now)).count();
    DashboardSummary {
        total,
        completed,
        pending: total - completed,
        overdue,
        progress_percentage: progress_percentage(completed, total),
    }
}

pub fn progress_percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = completed.min(total) as f64 / total as f64;
    (ratio * 100.0).round() as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaysUntilDue {
    Today,
    Days(i64),
}

impl DaysUntilDue {
    fn from_days(days: i64) -> Self {
        if days <= 0 {
            DaysUntilDue::Today
        } else {
            DaysUntilDue::Days(days)
        }
    }

    pub fn as_days(self) -> i64 {
        match self {
            DaysUntilDue::Today => 0,
            DaysUntilDue::Days(days) => days,
        }
    }
}

impl fmt::Display for DaysUntilDue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaysUntilDue::Today => f.write_str("Today"),
            DaysUntilDue::Days(1) => f.write_str("1 day"),
            DaysUntilDue::Days(days) => write!(f, "{days} days"),
        }
    }
}

impl Serialize for DaysUntilDue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_days())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingTask {
    pub task: Task,
    pub days_until_due: DaysUntilDue,
}

/// Whole days from `now` to the start of `task.date`, rounded up.
pub fn days_until_due(task: &Task, now: NaiveDateTime) -> DaysUntilDue {
    let start_of_day = task.date.and_time(NaiveTime::MIN);
    let seconds = (start_of_day - now).num_seconds();
    let days = (seconds as f64 / 86_400.0).ceil() as i64;
    DaysUntilDue::from_days(days)
}

/// Incomplete tasks due between today and seven days out, soonest first, at most five.
pub fn upcoming(tasks: &[Task], now: NaiveDateTime) -> Vec<UpcomingTask> {
    let first_day = now.date();
    let last_day = (now + Duration::days(UPCOMING_WINDOW_DAYS)).date();
    let mut window: Vec<&Task> = tasks
        .iter()
        .filter(|task| !task.completed && task.date >= first_day && task.date <= last_day)
        .collect();
    window.sort_by_key(|task| task.date);
    window
        .into_iter()
        .take(UPCOMING_LIMIT)
        .map(|task| UpcomingTask {
            task: task.clone(),
            days_until_due: days_until_due(task, now),
        })
        .collect()
}
