use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

use crate::models::{Task, TaskStatus};
use crate::status::{is_overdue, status};

const ALL: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubjectFilter {
    #[default]
    All,
    Only(String),
}

impl SubjectFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            SubjectFilter::All => true,
            SubjectFilter::Only(subject) => task.subject == *subject,
        }
    }
}

impl FromStr for SubjectFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value == ALL {
            Ok(SubjectFilter::All)
        } else {
            Ok(SubjectFilter::Only(value.to_string()))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    pub fn matches(self, task: &Task, now: NaiveDateTime) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => status(task, now) == wanted,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            ALL => Ok(StatusFilter::All),
            "completed" => Ok(StatusFilter::Only(TaskStatus::Completed)),
            "pending" => Ok(StatusFilter::Only(TaskStatus::Pending)),
            "overdue" => Ok(StatusFilter::Only(TaskStatus::Overdue)),
            other => Err(format!(
                "unknown status filter: {other} (expected all, completed, pending or overdue)"
            )),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str(ALL),
            StatusFilter::Only(TaskStatus::Completed) => f.write_str("completed"),
            StatusFilter::Only(TaskStatus::Pending) => f.write_str("pending"),
            StatusFilter::Only(TaskStatus::Overdue) => f.write_str("overdue"),
        }
    }
}

/// Display ordering: overdue incomplete tasks first, then by due date.
/// Ties keep collection order.
pub fn sort_for_display(tasks: &mut [Task], now: NaiveDateTime) {
    tasks.sort_by_key(|task| (!is_overdue(task, now), task.date));
}

pub fn filter_tasks(
    tasks: &[Task],
    subject: &SubjectFilter,
    status: StatusFilter,
    now: NaiveDateTime,
) -> Vec<Task> {
    let mut out: Vec<Task> = tasks
        .iter()
        .filter(|task| subject.matches(task) && status.matches(task, now))
        .cloned()
        .collect();
    sort_for_display(&mut out, now);
    out
}

/// Distinct subjects in ascending order, the choices offered after "all".
pub fn subjects(tasks: &[Task]) -> Vec<String> {
    tasks
        .iter()
        .map(|task| task.subject.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::test_support::{at, completed, make_task};

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn all_filters_return_every_task_resorted() {
        let now = at(2026, 10, 19, 12, 0);
        let tasks = vec![
            make_task("later", "2026-10-25", "10:00"),
            completed(make_task("done", "2026-10-10", "10:00")),
            make_task("late", "2026-10-18", "10:00"),
            make_task("soon", "2026-10-20", "10:00"),
        ];
        let out = filter_tasks(&tasks, &SubjectFilter::All, StatusFilter::All, now);
        assert_eq!(out.len(), tasks.len());
        assert_eq!(ids(&out), vec!["late", "done", "soon", "later"]);
    }

    #[test]
    fn overdue_bucket_is_stable_and_first() {
        let now = at(2026, 10, 19, 12, 0);
        let mut tasks = vec![
            make_task("A", "2026-10-18", "10:00"),
            completed(make_task("C", "2026-10-10", "10:00")),
            make_task("B", "2026-10-18", "08:00"),
        ];
        sort_for_display(&mut tasks, now);
        assert_eq!(ids(&tasks), vec!["A", "B", "C"]);
    }

    #[test]
    fn today_tasks_split_by_time_of_day() {
        let now = at(2026, 10, 19, 12, 0);
        let mut tasks = vec![
            make_task("evening", "2026-10-19", "18:00"),
            make_task("morning", "2026-10-19", "08:00"),
            make_task("tomorrow", "2026-10-20", "07:00"),
        ];
        sort_for_display(&mut tasks, now);
        assert_eq!(ids(&tasks), vec!["morning", "evening", "tomorrow"]);
    }

    #[test]
    fn equal_dates_keep_collection_order() {
        let now = at(2026, 10, 1, 0, 0);
        let mut tasks = vec![
            make_task("x", "2026-10-20", "18:00"),
            make_task("y", "2026-10-20", "07:00"),
            make_task("z", "2026-10-20", "12:00"),
        ];
        sort_for_display(&mut tasks, now);
        assert_eq!(ids(&tasks), vec!["x", "y", "z"]);
    }

    #[test]
    fn status_filters_partition_the_collection() {
        let now = at(2026, 10, 19, 12, 0);
        let tasks = vec![
            make_task("pending", "2026-10-21", "10:00"),
            completed(make_task("done", "2026-10-10", "10:00")),
            make_task("late", "2026-10-18", "10:00"),
        ];
        let only = |value: &str| {
            let filter: StatusFilter = value.parse().unwrap();
            ids(&filter_tasks(&tasks, &SubjectFilter::All, filter, now))
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        };
        assert_eq!(only("completed"), vec!["done"]);
        assert_eq!(only("pending"), vec!["pending"]);
        assert_eq!(only("overdue"), vec!["late"]);
    }

    #[test]
    fn subject_filter_is_exact_match() {
        let now = at(2026, 10, 19, 12, 0);
        let mut physics = make_task("p", "2026-10-21", "10:00");
        physics.subject = "Physics".to_string();
        let mut lower = make_task("l", "2026-10-21", "10:00");
        lower.subject = "physics".to_string();
        let tasks = vec![physics, lower, make_task("m", "2026-10-21", "10:00")];

        let filter: SubjectFilter = "Physics".parse().unwrap();
        let out = filter_tasks(&tasks, &filter, StatusFilter::All, now);
        assert_eq!(ids(&out), vec!["p"]);
    }

    #[test]
    fn status_filter_parse_and_display() {
        assert_eq!("all".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!(
            "Overdue".parse::<StatusFilter>(),
            Ok(StatusFilter::Only(TaskStatus::Overdue))
        );
        assert!("late".parse::<StatusFilter>().is_err());
        assert_eq!(StatusFilter::Only(TaskStatus::Pending).to_string(), "pending");
    }

    #[test]
    fn subjects_are_unique_and_sorted() {
        let mut a = make_task("a", "2026-10-21", "10:00");
        a.subject = "Science".to_string();
        let mut b = make_task("b", "2026-10-21", "10:00");
        b.subject = "English".to_string();
        let c = make_task("c", "2026-10-21", "10:00");
        let d = make_task("d", "2026-10-22", "10:00");
        assert_eq!(subjects(&[a, b, c, d]), vec!["English", "Math", "Science"]);
        assert!(subjects(&[]).is_empty());
    }
}
