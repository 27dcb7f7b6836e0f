use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;

use crate::commands::PlannerCtx;
use crate::events::Notification;
use crate::models::Task;
use crate::state::AppState;
use crate::status::due_date_time;

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReminderWindow {
    DayBefore,
    HourBefore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub task_id: String,
    pub task_name: String,
    pub window: ReminderWindow,
    pub hours_left: i64,
}

impl Reminder {
    fn new(task: &Task, window: ReminderWindow, hours_left: i64) -> Self {
        Self {
            task_id: task.id.clone(),
            task_name: task.name.clone(),
            window,
            hours_left,
        }
    }

    pub fn notification(&self) -> Notification {
        match self.window {
            ReminderWindow::DayBefore => Notification::warning(format!(
                "Reminder: \"{}\" is due in {} hours!",
                self.task_name, self.hours_left
            )),
            ReminderWindow::HourBefore => {
                Notification::error(format!("Urgent: \"{}\" is due in 1 hour!", self.task_name))
            }
        }
    }
}

/// Hours until the task is due, rounded up. `None` once the due time has passed.
pub fn hours_left(task: &Task, now: NaiveDateTime) -> Option<i64> {
    let millis = (due_date_time(task) - now).num_milliseconds();
    if millis <= 0 {
        return None;
    }
    Some((millis + MILLIS_PER_HOUR - 1) / MILLIS_PER_HOUR)
}

/// Stateless scan: a reminder only when the rounded-up hour count is exactly 24 or 1.
pub fn reminders_due(tasks: &[Task], now: NaiveDateTime) -> Vec<Reminder> {
    tasks
        .iter()
        .filter(|task| !task.completed)
        .filter_map(|task| {
            let hours = hours_left(task, now)?;
            match hours {
                24 => Some(Reminder::new(task, ReminderWindow::DayBefore, hours)),
                1 => Some(Reminder::new(task, ReminderWindow::HourBefore, hours)),
                _ => None,
            }
        })
        .collect()
}

/// Remembers which reminders already fired so each window fires once, on first entry,
/// however far apart the scans are.
#[derive(Debug, Default)]
pub struct ReminderLedger {
    fired: HashSet<(String, ReminderWindow)>,
}

impl ReminderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scan(&mut self, tasks: &[Task], now: NaiveDateTime) -> Vec<Reminder> {
        let active: HashSet<&str> = tasks
            .iter()
            .filter(|task| !task.completed)
            .map(|task| task.id.as_str())
            .collect();
        self.fired.retain(|(id, _)| active.contains(id.as_str()));

        let mut due = Vec::new();
        for task in tasks.iter().filter(|task| !task.completed) {
            let Some(hours) = hours_left(task, now) else {
                continue;
            };
            let window = match hours {
                1 => ReminderWindow::HourBefore,
                2..=24 => ReminderWindow::DayBefore,
                _ => continue,
            };
            if window == ReminderWindow::HourBefore {
                // Entering the last hour also spends the 24-hour reminder.
                self.fired.insert((task.id.clone(), ReminderWindow::DayBefore));
            }
            if self.fired.insert((task.id.clone(), window)) {
                due.push(Reminder::new(task, window, hours));
            }
        }
        due
    }

    pub fn len(&self) -> usize {
        self.fired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }
}

/// Runs one reminder pass and hands the results to the view layer.
pub fn run_scan<C: PlannerCtx>(ctx: &C, state: &AppState, ledger: &mut ReminderLedger) -> usize {
    ctx.before_scan(state);
    let settings = state.settings();
    if !settings.reminders_enabled {
        return 0;
    }
    let now = ctx.now().naive_local();
    let due = ledger.scan(&state.tasks(), now);
    let ttl = settings.notification_ttl();
    for reminder in &due {
        log::info!(
            "reminder fired task_id={} window={:?} hours_left={}",
            reminder.task_id,
            reminder.window,
            reminder.hours_left
        );
        ctx.notify(reminder.notification().with_ttl(ttl));
    }
    due.len()
}

/// Scans once immediately, then every `period`, for the life of the runtime.
pub fn start_scheduler<C>(
    ctx: Arc<C>,
    state: AppState,
    period: Duration,
) -> tokio::task::JoinHandle<()>
where
    C: PlannerCtx + Send + Sync + 'static,
{
    log::debug!("reminder scheduler started period_secs={}", period.as_secs());
    tokio::spawn(async move {
        let mut ledger = ReminderLedger::new();
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            run_scan(ctx.as_ref(), &state, &mut ledger);
        }
    })
}
