use chrono::NaiveDateTime;

use crate::models::{Task, TaskStatus};

/// Wall-clock instant the task is due, in the user's local time.
pub fn due_date_time(task: &Task) -> NaiveDateTime {
    task.date.and_time(task.time)
}

pub fn is_overdue(task: &Task, now: NaiveDateTime) -> bool {
    !task.completed && due_date_time(task) < now
}

pub fn status(task: &Task, now: NaiveDateTime) -> TaskStatus {
    if task.completed {
        TaskStatus::Completed
    } else if is_overdue(task, now) {
        TaskStatus::Overdue
    } else {
        TaskStatus::Pending
    }
}
