//! Terminal front end.
//!
//! Each subcommand loads the task slot, runs one operation against a
//! [`TerminalCtx`], and prints the resulting view as text or JSON.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::calendar::YearMonth;
use crate::commands::{
    add_task_impl, change_month_impl, delete_task_impl, load_state_impl, toggle_complete_impl,
    CommandResult, PlannerCtx,
};
use crate::dashboard::{summarize, upcoming};
use crate::events::{Notification, NotificationLevel, StatePayload};
use crate::filter::{filter_tasks, subjects, StatusFilter, SubjectFilter};
use crate::models::{parse_time, Priority, Settings, TaskDraft, PRESET_SUBJECTS};
use crate::render;
use crate::scheduler::start_scheduler;
use crate::state::AppState;
use crate::storage::{Storage, StorageError};

pub const DATA_DIR_ENV: &str = "STUDY_PLANNER_DATA_DIR";
const PAST_DATE_MESSAGE: &str = "Please choose today or a later date";

/// study-planner - track study tasks, progress and deadlines
#[derive(Parser, Debug)]
#[command(name = "study-planner")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the task slot, settings and logs
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    pub data_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a study task
    Add {
        #[arg(long, default_value = "")]
        name: String,

        /// One of the preset subjects, or "Other" together with --custom-subject
        #[arg(long, default_value = "")]
        subject: String,

        #[arg(long, default_value = "")]
        custom_subject: String,

        /// Due date (YYYY-MM-DD), today or later
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Due time (HH:MM), defaults to 23:59
        #[arg(long, value_parser = parse_time_arg)]
        time: Option<NaiveTime>,

        /// Estimated hours, defaults to 1
        #[arg(long)]
        duration: Option<f64>,

        /// low, medium or high
        #[arg(long, default_value = "medium")]
        priority: Priority,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// List tasks, overdue first
    List {
        /// "all" or an exact subject
        #[arg(long, default_value = "all")]
        subject: SubjectFilter,

        /// all, completed, pending or overdue
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },

    /// Flip a task between completed and pending
    Toggle { id: String },

    /// Delete a task
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show totals, progress and the next upcoming tasks
    Dashboard,

    /// Show a month grid with task markers
    Calendar {
        #[arg(long)]
        year: Option<i32>,

        #[arg(long)]
        month: Option<u32>,

        /// Months to move from the selected page
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        shift: i32,
    },

    /// List subject filter choices and presets
    Subjects,

    /// Run the reminder scheduler until Ctrl-C
    Watch,
}

fn parse_time_arg(raw: &str) -> Result<NaiveTime, String> {
    parse_time(raw).ok_or_else(|| format!("invalid time: {raw} (expected HH:MM)"))
}

/// `--data-dir` / `STUDY_PLANNER_DATA_DIR`, else the platform data directory.
pub fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf, StorageError> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    directories::ProjectDirs::from("", "", "study-planner")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            StorageError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                "no home directory to place the data directory in",
            ))
        })
}

/// Host context backed by the terminal: notifications go to stdout (stderr
/// under `--json`), confirmation reads a y/N answer from stdin.
pub struct TerminalCtx {
    data_dir: PathBuf,
    json: bool,
    assume_yes: bool,
    reload_before_scan: bool,
    shown_errors: Mutex<Vec<String>>,
}

impl TerminalCtx {
    pub fn new(data_dir: PathBuf, json: bool) -> Self {
        Self {
            data_dir,
            json,
            assume_yes: false,
            reload_before_scan: false,
            shown_errors: Mutex::new(Vec::new()),
        }
    }

    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    pub fn watching(mut self) -> Self {
        self.reload_before_scan = true;
        self
    }

    /// Reports a failed operation unless its message was already shown as a notification.
    fn fail(&self, error: Option<String>) -> ExitCode {
        let message = error.unwrap_or_else(|| "operation failed".to_string());
        let shown = self.shown_errors.lock().expect("state poisoned");
        if !shown.contains(&message) {
            eprintln!("error: {message}");
        }
        ExitCode::FAILURE
    }
}

impl PlannerCtx for TerminalCtx {
    fn app_data_dir(&self) -> Result<PathBuf, StorageError> {
        Ok(self.data_dir.clone())
    }

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn notify(&self, notification: Notification) {
        if notification.level == NotificationLevel::Error {
            let mut shown = self.shown_errors.lock().expect("state poisoned");
            shown.push(notification.message.clone());
        }
        let line = render::notification_line(&notification);
        if self.json {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{message} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }

    fn emit_state_updated(&self, payload: StatePayload) {
        log::debug!("state updated tasks={}", payload.tasks.len());
    }

    fn before_scan(&self, state: &AppState) {
        if !self.reload_before_scan {
            return;
        }
        let storage = Storage::new(self.data_dir.clone());
        state.replace_tasks(storage.load_tasks_or_empty());
        if let Ok(file) = storage.load_settings() {
            state.update_settings(file.settings);
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let data_dir = match resolve_data_dir(cli.data_dir.clone()) {
        Ok(dir) => dir,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::FAILURE;
        }
    };

    start_logging(&data_dir);

    let yes = matches!(cli.command, Commands::Delete { yes: true, .. });
    let ctx = TerminalCtx::new(data_dir, cli.json).assume_yes(yes);
    execute(ctx, cli.command)
}

#[cfg(not(test))]
fn start_logging(data_dir: &Path) {
    if let Err(error) = crate::logging::init_logging(data_dir) {
        eprintln!("warning: file logging disabled: {error}");
    }
}

#[cfg(test)]
fn start_logging(_data_dir: &Path) {}

pub fn execute(ctx: TerminalCtx, command: Commands) -> ExitCode {
    let today = ctx.now().date_naive();
    let Some(page) = YearMonth::of(today) else {
        return ctx.fail(Some(format!("today ({today}) is outside the calendar range")));
    };
    let state = AppState::new(Vec::new(), Settings::default(), page);
    let loaded = load_state_impl(&ctx, &state);
    if !loaded.ok {
        return ctx.fail(loaded.error);
    }
    log::debug!("command={command:?}");

    match command {
        Commands::Add {
            name,
            subject,
            custom_subject,
            date,
            time,
            duration,
            priority,
            notes,
        } => {
            if date.is_some_and(|date| date < today) {
                ctx.notify(Notification::error(PAST_DATE_MESSAGE));
                return ExitCode::FAILURE;
            }
            let draft = TaskDraft {
                name,
                subject,
                custom_subject,
                date,
                time,
                duration,
                priority,
                notes,
            };
            let result = add_task_impl(&ctx, &state, draft);
            finish(&ctx, result, |task| {
                render::task_list(std::slice::from_ref(task), ctx.now().naive_local())
            })
        }
        Commands::List { subject, status } => {
            let now = ctx.now().naive_local();
            let tasks = filter_tasks(&state.tasks(), &subject, status, now);
            if ctx.json {
                return print_json(&tasks);
            }
            print!("{}", render::task_list(&tasks, now));
            ExitCode::SUCCESS
        }
        Commands::Toggle { id } => {
            let result = toggle_complete_impl(&ctx, &state, &id);
            finish(&ctx, result, |_| String::new())
        }
        Commands::Delete { id, .. } => {
            let result = delete_task_impl(&ctx, &state, &id);
            finish(&ctx, result, |_| String::new())
        }
        Commands::Dashboard => {
            let now = ctx.now().naive_local();
            let tasks = state.tasks();
            let summary = summarize(&tasks, now);
            let soon = upcoming(&tasks, now);
            if ctx.json {
                return print_json(&serde_json::json!({
                    "summary": summary,
                    "upcoming": soon,
                }));
            }
            print!("{}", render::dashboard(&summary, &soon, now));
            ExitCode::SUCCESS
        }
        Commands::Calendar { year, month, shift } => {
            let year = year.unwrap_or_else(|| today.year());
            let month = month.unwrap_or_else(|| today.month());
            let Some(page) = YearMonth::new(year, month) else {
                return ctx.fail(Some(format!("invalid month: {year}-{month}")));
            };
            state.set_displayed_month(page);
            let result = change_month_impl(&ctx, &state, shift);
            finish(&ctx, result, render::calendar)
        }
        Commands::Subjects => {
            let in_use = subjects(&state.tasks());
            if ctx.json {
                return print_json(&serde_json::json!({
                    "presets": PRESET_SUBJECTS,
                    "filters": in_use,
                }));
            }
            print!("{}", render::subjects(&in_use));
            ExitCode::SUCCESS
        }
        Commands::Watch => watch(ctx.watching(), state),
    }
}

/// Prints a successful result with `view` (or as JSON) and maps failures to an exit code.
fn finish<T: Serialize>(
    ctx: &TerminalCtx,
    result: CommandResult<T>,
    view: impl FnOnce(&T) -> String,
) -> ExitCode {
    if !result.ok {
        return ctx.fail(result.error);
    }
    if ctx.json {
        return print_json(&result.data);
    }
    if let Some(data) = &result.data {
        print!("{}", view(data));
    }
    ExitCode::SUCCESS
}

fn watch(ctx: TerminalCtx, state: AppState) -> ExitCode {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => return ctx.fail(Some(format!("failed to start runtime: {error}"))),
    };
    let period = Duration::from_secs(state.settings().reminder_interval_secs.max(1));
    if !ctx.json {
        println!(
            "Watching {} for reminders every {}s. Press Ctrl-C to stop.",
            ctx.data_dir.display(),
            period.as_secs()
        );
    }
    let ctx = Arc::new(ctx);
    runtime.block_on(async move {
        let handle = start_scheduler(ctx, state, period);
        if let Err(error) = tokio::signal::ctrl_c().await {
            log::error!("ctrl-c handler failed error={error}");
        }
        handle.abort();
    });
    log::info!("watch stopped");
    ExitCode::SUCCESS
}
