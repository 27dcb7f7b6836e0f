use std::path::PathBuf;

use chrono::{DateTime, Local, Utc};

use crate::calendar::{month_grid, MonthGrid};
use crate::events::{Notification, StatePayload};
use crate::models::{Settings, Task, TaskDraft};
use crate::state::AppState;
use crate::storage::{Storage, StorageError};

pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this task?";

#[derive(Debug, serde::Serialize)]
pub struct CommandResult<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

/// Everything an operation needs from its host: where data lives, the clock,
/// and the view layer (notifications, confirmation, re-render).
pub trait PlannerCtx {
    fn app_data_dir(&self) -> Result<PathBuf, StorageError>;
    fn now(&self) -> DateTime<Local>;
    fn notify(&self, notification: Notification);
    fn confirm(&self, message: &str) -> bool;
    fn emit_state_updated(&self, payload: StatePayload);

    /// Called by the reminder scheduler right before each scan.
    fn before_scan(&self, _state: &AppState) {}
}

fn ok<T>(data: T) -> CommandResult<T> {
    CommandResult {
        ok: true,
        data: Some(data),
        error: None,
    }
}

fn err<T>(message: &str) -> CommandResult<T> {
    CommandResult {
        ok: false,
        data: None,
        error: Some(message.to_string()),
    }
}

/// Shows `notification` for the configured lifetime.
fn notify(ctx: &impl PlannerCtx, state: &AppState, notification: Notification) {
    ctx.notify(notification.with_ttl(state.settings().notification_ttl()));
}

fn persist(ctx: &impl PlannerCtx, state: &AppState) -> Result<(), StorageError> {
    let root = ctx.app_data_dir()?;
    let storage = Storage::new(root);
    storage.ensure_dirs()?;
    storage.save_tasks(&state.tasks())?;
    storage.save_settings(&state.settings_file())?;
    let payload = StatePayload {
        tasks: state.tasks(),
        settings: state.settings(),
    };
    ctx.emit_state_updated(payload);
    Ok(())
}

/// Restores tasks and settings from the data directory. Absent or malformed data
/// falls back to an empty collection and default settings.
pub fn load_state_impl(ctx: &impl PlannerCtx, state: &AppState) -> CommandResult<Vec<Task>> {
    let root = match ctx.app_data_dir() {
        Ok(path) => path,
        Err(e) => return err(&format!("app_data_dir error: {e}")),
    };
    let storage = Storage::new(root);
    let tasks = storage.load_tasks_or_empty();
    let settings = storage
        .load_settings()
        .map(|data| data.settings)
        .unwrap_or_else(|_| Settings::default());
    log::debug!(
        "state loaded root={} tasks={}",
        storage.root().display(),
        tasks.len()
    );
    state.replace_tasks(tasks.clone());
    state.update_settings(settings);
    ok(tasks)
}

pub fn add_task_impl(
    ctx: &impl PlannerCtx,
    state: &AppState,
    draft: TaskDraft,
) -> CommandResult<Task> {
    let valid = match draft.validate() {
        Ok(valid) => valid,
        Err(error) => {
            log::debug!("task rejected reason={error:?}");
            let message = error.to_string();
            notify(ctx, state, Notification::error(message.clone()));
            return err(&message);
        }
    };

    let previous = state.tasks();
    let created_at = ctx.now().with_timezone(&Utc);
    let task = state.add_task(valid, created_at);
    if let Err(error) = persist(ctx, state) {
        state.replace_tasks(previous);
        log::error!("persist failed after add id={} error={error}", task.id);
        return err(&format!("storage error: {error}"));
    }
    log::info!(
        "task added id={} subject={} date={}",
        task.id,
        task.subject,
        task.date
    );
    notify(ctx, state, Notification::success("Task added successfully!"));
    ok(task)
}

/// Flips completion of `task_id`. An unknown id is a silent no-op (`data == Some(None)`).
pub fn toggle_complete_impl(
    ctx: &impl PlannerCtx,
    state: &AppState,
    task_id: &str,
) -> CommandResult<Option<Task>> {
    let Some(previous) = state.task(task_id) else {
        log::debug!("toggle ignored, no task id={task_id}");
        return ok(None);
    };
    let at = ctx.now().with_timezone(&Utc);
    let Some(task) = state.toggle_complete(task_id, at) else {
        return ok(None);
    };
    if let Err(error) = persist(ctx, state) {
        state.update_task(previous);
        log::error!("persist failed after toggle id={task_id} error={error}");
        return err(&format!("storage error: {error}"));
    }
    log::info!("task toggled id={} completed={}", task.id, task.completed);
    let message = if task.completed {
        "Task completed!"
    } else {
        "Task marked as pending"
    };
    notify(ctx, state, Notification::success(message));
    ok(Some(task))
}

/// Deletes `task_id` after the host confirms. Returns whether anything was removed.
pub fn delete_task_impl(
    ctx: &impl PlannerCtx,
    state: &AppState,
    task_id: &str,
) -> CommandResult<bool> {
    if state.task(task_id).is_none() {
        log::debug!("delete ignored, no task id={task_id}");
        return ok(false);
    }
    if !ctx.confirm(DELETE_CONFIRMATION) {
        log::debug!("delete declined id={task_id}");
        return ok(false);
    }
    let previous = state.tasks();
    state.remove_task(task_id);
    if let Err(error) = persist(ctx, state) {
        state.replace_tasks(previous);
        log::error!("persist failed after delete id={task_id} error={error}");
        return err(&format!("storage error: {error}"));
    }
    log::info!("task deleted id={task_id}");
    notify(ctx, state, Notification::success("Task deleted"));
    ok(true)
}

/// Moves the displayed calendar page and returns the grid to render.
pub fn change_month_impl(
    ctx: &impl PlannerCtx,
    state: &AppState,
    delta: i32,
) -> CommandResult<MonthGrid> {
    let Some(month) = state.change_month(delta) else {
        log::debug!("month change out of range delta={delta}");
        return err("invalid month");
    };
    let today = ctx.now().date_naive();
    ok(month_grid(month, &state.tasks(), today))
}
