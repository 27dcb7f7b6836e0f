//! Study planner: a task collection with deadlines, completion tracking,
//! a progress dashboard, a month calendar and deadline reminders.

pub mod calendar;
pub mod commands;
pub mod dashboard;
pub mod events;
pub mod filter;
pub mod logging;
pub mod models;
pub mod render;
pub mod scheduler;
pub mod state;
pub mod status;
pub mod storage;

#[cfg(feature = "app")]
mod cli;

pub use commands::{CommandResult, PlannerCtx};
pub use models::{Priority, Settings, Task, TaskDraft, TaskStatus};
pub use state::AppState;
pub use storage::{Storage, StorageError};

#[cfg(feature = "app")]
pub fn run() -> std::process::ExitCode {
    cli::run()
}
