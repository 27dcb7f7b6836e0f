use std::sync::{Arc, Mutex};

use crate::calendar::YearMonth;
use crate::models::{Settings, SettingsFile, Task, Timestamp, ValidDraft};

const SCHEMA_VERSION: u32 = 1;

/// The task collection plus view state, shared by the operations and the reminder scheduler.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Mutex<AppData>>,
}

impl AppState {
    pub fn new(tasks: Vec<Task>, settings: Settings, displayed_month: YearMonth) -> Self {
        Self {
            inner: Arc::new(Mutex::new(AppData {
                tasks,
                settings,
                displayed_month,
            })),
        }
    }

    pub fn settings_file(&self) -> SettingsFile {
        let guard = self.inner.lock().expect("state poisoned");
        SettingsFile {
            schema_version: SCHEMA_VERSION,
            settings: guard.settings.clone(),
        }
    }

    pub fn tasks(&self) -> Vec<Task> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.tasks.clone()
    }

    pub fn task(&self, task_id: &str) -> Option<Task> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.tasks.iter().find(|t| t.id == task_id).cloned()
    }

    pub fn len(&self) -> usize {
        let guard = self.inner.lock().expect("state poisoned");
        guard.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a task built from `draft`. The id is the creation time in milliseconds,
    /// bumped forward while it collides with an existing id.
    pub fn add_task(&self, draft: ValidDraft, created_at: Timestamp) -> Task {
        let mut guard = self.inner.lock().expect("state poisoned");
        let mut stamp = created_at.timestamp_millis();
        while guard.tasks.iter().any(|t| t.id == stamp.to_string()) {
            stamp += 1;
        }
        let task = Task {
            id: stamp.to_string(),
            name: draft.name,
            subject: draft.subject,
            date: draft.date,
            time: draft.time,
            duration: draft.duration,
            priority: draft.priority,
            notes: draft.notes,
            completed: false,
            created_at,
            completed_at: None,
        };
        guard.tasks.push(task.clone());
        task
    }

    pub fn replace_tasks(&self, tasks: Vec<Task>) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.tasks = tasks;
    }

    pub fn update_task(&self, task: Task) {
        let mut guard = self.inner.lock().expect("state poisoned");
        if let Some(existing) = guard.tasks.iter_mut().find(|t| t.id == task.id) {
            *existing = task;
        }
    }

    /// Flips completion. `completed_at` is set to `at` when completing and cleared when reverting.
    pub fn toggle_complete(&self, task_id: &str, at: Timestamp) -> Option<Task> {
        let mut guard = self.inner.lock().expect("state poisoned");
        let task = guard.tasks.iter_mut().find(|t| t.id == task_id)?;
        task.completed = !task.completed;
        task.completed_at = task.completed.then_some(at);
        Some(task.clone())
    }

    pub fn remove_task(&self, task_id: &str) -> bool {
        let mut guard = self.inner.lock().expect("state poisoned");
        let before = guard.tasks.len();
        guard.tasks.retain(|task| task.id != task_id);
        guard.tasks.len() != before
    }

    pub fn settings(&self) -> Settings {
        let guard = self.inner.lock().expect("state poisoned");
        guard.settings.clone()
    }

    pub fn update_settings(&self, settings: Settings) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.settings = settings;
    }

    pub fn displayed_month(&self) -> YearMonth {
        let guard = self.inner.lock().expect("state poisoned");
        guard.displayed_month
    }

    pub fn set_displayed_month(&self, month: YearMonth) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.displayed_month = month;
    }

    /// Moves the calendar page by `delta` months and returns the new page.
    /// An out-of-range target leaves the page where it was.
    pub fn change_month(&self, delta: i32) -> Option<YearMonth> {
        let mut guard = self.inner.lock().expect("state poisoned");
        let next = guard.displayed_month.shifted(delta)?;
        guard.displayed_month = next;
        Some(next)
    }
}

#[derive(Debug)]
struct AppData {
    tasks: Vec<Task>,
    settings: Settings,
    displayed_month: YearMonth,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{default_due_time, Priority};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn draft(name: &str) -> ValidDraft {
        ValidDraft {
            name: name.to_string(),
            subject: "Math".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
            time: default_due_time(),
            duration: 1.0,
            priority: Priority::High,
            notes: String::new(),
        }
    }

    fn october() -> YearMonth {
        YearMonth::new(2026, 10).unwrap()
    }

    fn make_state() -> AppState {
        AppState::new(Vec::new(), Settings::default(), october())
    }

    #[test]
    fn add_task_uses_creation_millis_as_id() {
        let state = make_state();
        let created = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();
        let task = state.add_task(draft("a"), created);
        assert_eq!(task.id, created.timestamp_millis().to_string());
        assert!(!task.completed);
        assert_eq!(task.completed_at, None);
        assert_eq!(task.created_at, created);
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn add_task_keeps_ids_unique_within_the_same_millisecond() {
        let state = make_state();
        let created = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();
        let first = state.add_task(draft("a"), created);
        let second = state.add_task(draft("b"), created);
        let third = state.add_task(draft("c"), created);
        assert_ne!(first.id, second.id);
        assert_ne!(second.id, third.id);
        assert_ne!(first.id, third.id);
        let names: Vec<String> = state.tasks().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn toggle_twice_restores_original_values() {
        let state = make_state();
        let created = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();
        let task = state.add_task(draft("a"), created);
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();

        let done = state.toggle_complete(&task.id, at).expect("task exists");
        assert!(done.completed);
        assert_eq!(done.completed_at, Some(at));

        let back = state.toggle_complete(&task.id, at).expect("task exists");
        assert_eq!(back, task);
    }

    #[test]
    fn toggle_and_remove_missing_are_no_ops() {
        let state = make_state();
        let created = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();
        let task = state.add_task(draft("a"), created);

        assert!(state.toggle_complete("missing", created).is_none());
        assert!(!state.remove_task("missing"));
        assert_eq!(state.tasks(), vec![task.clone()]);

        // Updating a non-existent task should be a no-op.
        let mut ghost = task.clone();
        ghost.id = "ghost".to_string();
        state.update_task(ghost);
        assert_eq!(state.tasks(), vec![task.clone()]);

        assert!(state.remove_task(&task.id));
        assert!(state.is_empty());
        assert!(state.task(&task.id).is_none());
    }

    #[test]
    fn change_month_moves_the_calendar_page() {
        let state = make_state();
        assert_eq!(state.change_month(3), YearMonth::new(2027, 1));
        assert_eq!(state.change_month(-1), YearMonth::new(2026, 12));
        assert_eq!(state.displayed_month(), YearMonth::new(2026, 12).unwrap());

        state.set_displayed_month(YearMonth::new(2015, 2).unwrap());
        assert_eq!(state.change_month(-2), YearMonth::new(2014, 12));

        assert_eq!(state.change_month(i32::MAX), None);
        assert_eq!(state.displayed_month(), YearMonth::new(2014, 12).unwrap());
    }

    #[test]
    fn settings_file_includes_schema_version() {
        let state = make_state();
        let mut next = Settings::default();
        next.reminders_enabled = false;
        state.update_settings(next.clone());
        let file = state.settings_file();
        assert_eq!(file.schema_version, SCHEMA_VERSION);
        assert_eq!(file.settings, next);
        assert_eq!(state.settings(), next);
    }
}
