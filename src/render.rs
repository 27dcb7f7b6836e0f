//! Plain-text views for the terminal front end.

use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::calendar::{CellKind, DayCell, MonthGrid, WEEKDAY_HEADERS};
use crate::dashboard::{DashboardSummary, UpcomingTask};
use crate::events::{Notification, NotificationLevel};
use crate::models::{Priority, Task};
use crate::status::{is_overdue, status};

const PROGRESS_BAR_WIDTH: usize = 20;
const CELL_WIDTH: usize = 7;

pub fn format_due(task: &Task) -> String {
    format!(
        "{} {}",
        task.date.format("%a, %b %-d, %Y"),
        task.time.format("%H:%M")
    )
}

pub fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{hours:.0}")
    } else {
        format!("{hours}")
    }
}

fn priority_mark(priority: Priority) -> char {
    match priority {
        Priority::High => 'H',
        Priority::Medium => 'M',
        Priority::Low => 'L',
    }
}

pub fn notification_line(notification: &Notification) -> String {
    let tag = match notification.level {
        NotificationLevel::Success => "ok",
        NotificationLevel::Warning => "warn",
        NotificationLevel::Error => "error",
    };
    format!("[{tag}] {}", notification.message)
}

pub fn progress_bar(percentage: u8) -> String {
    let filled = (percentage.min(100) as usize * PROGRESS_BAR_WIDTH) / 100;
    format!(
        "[{}{}] {percentage}% Complete",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}

pub fn dashboard(
    summary: &DashboardSummary,
    upcoming: &[UpcomingTask],
    now: NaiveDateTime,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total tasks:     {}", summary.total);
    let _ = writeln!(out, "Completed:       {}", summary.completed);
    let _ = writeln!(out, "Pending:         {}", summary.pending);
    let _ = writeln!(out, "Overdue:         {}", summary.overdue);
    let _ = writeln!(out, "{}", progress_bar(summary.progress_percentage));
    out.push('\n');
    out.push_str("Upcoming (next 7 days)\n");
    if upcoming.is_empty() {
        out.push_str("  No upcoming tasks\n");
        return out;
    }
    for item in upcoming {
        let task = &item.task;
        let flag = if is_overdue(task, now) { " [overdue]" } else { "" };
        let _ = writeln!(
            out,
            "  - {} ({}) [{}]{flag}",
            task.name, task.subject, task.priority
        );
        let _ = writeln!(
            out,
            "    Due: {}  Days left: {}  Duration: {} hours",
            format_due(task),
            item.days_until_due,
            format_hours(task.duration)
        );
    }
    out
}

pub fn task_list(tasks: &[Task], now: NaiveDateTime) -> String {
    if tasks.is_empty() {
        return "No tasks found\n".to_string();
    }
    let mut out = String::new();
    for task in tasks {
        let check = if task.completed { 'x' } else { ' ' };
        let _ = writeln!(out, "[{check}] {}  ({})  #{}", task.name, task.subject, task.id);
        let _ = writeln!(
            out,
            "    Due: {}  Duration: {} hours  Priority: {}  Status: {}",
            format_due(task),
            format_hours(task.duration),
            task.priority,
            status(task, now).label()
        );
        if !task.notes.is_empty() {
            let _ = writeln!(out, "    Notes: {}", task.notes);
        }
    }
    out
}

fn day_cell(cell: &DayCell) -> String {
    let (open, close) = match (cell.kind, cell.is_today) {
        (CellKind::CurrentMonth, true) => ('[', ']'),
        (CellKind::CurrentMonth, false) => (' ', ' '),
        _ => ('.', '.'),
    };
    let marks: String = cell
        .markers
        .iter()
        .map(|marker| priority_mark(marker.priority))
        .collect();
    format!("{open}{:>2}{close}{marks:<3}", cell.day)
}

pub fn calendar(grid: &MonthGrid) -> String {
    let mut out = String::new();
    let width = CELL_WIDTH * 7;
    let _ = writeln!(out, "{:^width$}", grid.title);
    for label in WEEKDAY_HEADERS {
        let _ = write!(out, " {label:<width$}", width = CELL_WIDTH - 1);
    }
    out.push('\n');
    for week in grid.weeks() {
        let line: String = week.iter().copied().map(day_cell).collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.push_str("[dd] today  .dd. other month  H/M/L task priority\n");
    out
}

pub fn subjects(subjects: &[String]) -> String {
    let mut out = String::from("all\n");
    for subject in subjects {
        out.push_str(subject);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{month_grid, YearMonth};
    use crate::dashboard::{summarize, upcoming};
    use crate::status::test_support::{at, completed, make_task};
    use chrono::NaiveDate;

    #[test]
    fn due_and_hours_formatting() {
        let task = make_task("a", "2026-10-20", "09:05");
        assert_eq!(format_due(&task), "Tue, Oct 20, 2026 09:05");
        assert_eq!(format_hours(2.0), "2");
        assert_eq!(format_hours(1.5), "1.5");
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0), format!("[{}] 0% Complete", "-".repeat(20)));
        assert_eq!(
            progress_bar(50),
            format!("[{}{}] 50% Complete", "#".repeat(10), "-".repeat(10))
        );
        assert_eq!(progress_bar(100), format!("[{}] 100% Complete", "#".repeat(20)));
    }

    #[test]
    fn empty_views_show_placeholders() {
        let now = at(2026, 10, 19, 9, 0);
        let text = dashboard(&summarize(&[], now), &[], now);
        assert!(text.contains("Total tasks:     0"));
        assert!(text.contains("0% Complete"));
        assert!(text.contains("No upcoming tasks"));
        assert_eq!(task_list(&[], now), "No tasks found\n");
    }

    #[test]
    fn dashboard_lists_upcoming_tasks() {
        let now = at(2026, 10, 19, 9, 0);
        let tasks = vec![
            make_task("a", "2026-10-19", "18:00"),
            make_task("b", "2026-10-21", "10:00"),
        ];
        let text = dashboard(&summarize(&tasks, now), &upcoming(&tasks, now), now);
        assert!(text.contains("Days left: Today"));
        assert!(text.contains("Days left: 2 days"));
        assert!(text.contains("task-b (Math) [medium]"));
    }

    #[test]
    fn task_list_shows_status_and_notes() {
        let now = at(2026, 10, 19, 9, 0);
        let mut noted = make_task("a", "2026-10-18", "10:00");
        noted.notes = "bring calculator".to_string();
        let done = completed(make_task("b", "2026-10-25", "10:00"));
        let text = task_list(&[noted, done], now);
        assert!(text.contains("[ ] task-a  (Math)  #a"));
        assert!(text.contains("Status: Overdue"));
        assert!(text.contains("Notes: bring calculator"));
        assert!(text.contains("[x] task-b"));
        assert!(text.contains("Status: Completed"));
    }

    #[test]
    fn calendar_marks_today_and_priorities() {
        let mut task = make_task("a", "2026-10-21", "10:00");
        task.priority = Priority::High;
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let grid = month_grid(YearMonth::new(2026, 10).unwrap(), &[task], today);
        let text = calendar(&grid);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0].trim(), "October 2026");
        assert!(lines[1].starts_with(" Sun"));
        assert!(text.contains("[19]"));
        assert!(text.contains(" 21 H"));
        assert!(text.contains(".27."));
        // title + header + five weeks + legend
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn notification_lines_are_tagged_by_level() {
        assert_eq!(
            notification_line(&Notification::success("Task deleted")),
            "[ok] Task deleted"
        );
        assert_eq!(
            notification_line(&Notification::warning("soon")),
            "[warn] soon"
        );
        assert_eq!(notification_line(&Notification::error("late")), "[error] late");
    }
}
