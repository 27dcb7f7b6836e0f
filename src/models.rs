use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

pub type Timestamp = DateTime<Utc>;

pub const OTHER_SUBJECT: &str = "Other";
pub const PRESET_SUBJECTS: [&str; 6] = [
    "Math",
    "Science",
    "English",
    "History",
    "Computer Science",
    OTHER_SUBJECT,
];

pub const DEFAULT_DURATION_HOURS: f64 = 1.0;

pub fn default_due_time() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Marker color used by the calendar and the list views.
    pub fn color(self) -> &'static str {
        match self {
            Priority::High => "#f44336",
            Priority::Medium => "#ff9800",
            Priority::Low => "#4caf50",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

/// Derived classification of a task at a given instant. Never stored.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Completed,
    Overdue,
    Pending,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Completed => "Completed",
            TaskStatus::Overdue => "Overdue",
            TaskStatus::Pending => "Pending",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub subject: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm", default = "default_due_time")]
    pub time: NaiveTime,
    #[serde(
        deserialize_with = "lenient_hours::deserialize",
        default = "default_duration"
    )]
    pub duration: f64,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
}

fn default_duration() -> f64 {
    DEFAULT_DURATION_HOURS
}

/// Form input for a new task. Validation happens in `TaskDraft::validate`.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub name: String,
    pub subject: String,
    pub custom_subject: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub duration: Option<f64>,
    pub priority: Priority,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingFields(Vec<&'static str>),
    NonPositiveDuration,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingFields(_) => f.write_str("Please fill in all required fields"),
            ValidationError::NonPositiveDuration => {
                f.write_str("Duration must be a positive number of hours")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// A draft that passed validation. Subject already resolved from the custom field.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidDraft {
    pub name: String,
    pub subject: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration: f64,
    pub priority: Priority,
    pub notes: String,
}

impl TaskDraft {
    pub fn validate(&self) -> Result<ValidDraft, ValidationError> {
        let name = self.name.trim();
        let subject = self.subject.trim();
        let custom_subject = self.custom_subject.trim();

        let mut missing = Vec::new();
        if name.is_empty() {
            missing.push("name");
        }
        if self.date.is_none() {
            missing.push("date");
        }
        let resolved_subject = if subject == OTHER_SUBJECT || subject.is_empty() {
            custom_subject
        } else {
            subject
        };
        if resolved_subject.is_empty() {
            missing.push("subject");
        }
        let date = match self.date {
            Some(date) if missing.is_empty() => date,
            _ => return Err(ValidationError::MissingFields(missing)),
        };

        let duration = self.duration.unwrap_or(DEFAULT_DURATION_HOURS);
        if !duration.is_finite() || duration <= 0.0 {
            return Err(ValidationError::NonPositiveDuration);
        }

        Ok(ValidDraft {
            name: name.to_string(),
            subject: resolved_subject.to_string(),
            date,
            time: self.time.map_or_else(default_due_time, hhmm::to_minute),
            duration,
            priority: self.priority,
            notes: self.notes.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Settings {
    #[serde(default = "default_reminders_enabled")]
    pub reminders_enabled: bool,
    #[serde(default = "default_reminder_interval_secs")]
    pub reminder_interval_secs: u64,
    #[serde(default = "default_notification_ttl_secs")]
    pub notification_ttl_secs: u64,
}

impl Settings {
    pub fn notification_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.notification_ttl_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reminders_enabled: default_reminders_enabled(),
            reminder_interval_secs: default_reminder_interval_secs(),
            notification_ttl_secs: default_notification_ttl_secs(),
        }
    }
}

fn default_reminders_enabled() -> bool {
    true
}

fn default_reminder_interval_secs() -> u64 {
    60
}

fn default_notification_ttl_secs() -> u64 {
    4
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SettingsFile {
    pub schema_version: u32,
    pub settings: Settings,
}

mod hhmm {
    use chrono::{NaiveTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid time: {raw}")))
    }

    pub fn parse(raw: &str) -> Option<NaiveTime> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .ok()
            .map(to_minute)
    }

    /// Due times have minute precision; seconds are dropped.
    pub fn to_minute(time: NaiveTime) -> NaiveTime {
        NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
    }
}

pub use hhmm::parse as parse_time;

// Older data stored the raw form value, so "2" and 2 both mean two hours.
mod lenient_hours {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Hours {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Hours::deserialize(deserializer)? {
            Hours::Number(value) => Ok(value),
            Hours::Text(text) if text.trim().is_empty() => Ok(super::DEFAULT_DURATION_HOURS),
            Hours::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| serde::de::Error::custom(format!("invalid duration: {text}"))),
        }
    }
}
