use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type TaskId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Done,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// Ordering weight, higher is more urgent.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// Steps through `ALL`, stopping at either end.
    pub fn step(self, direction: isize) -> Self {
        let index = Self::ALL.iter().position(|p| *p == self).unwrap_or(1) as isize;
        let next = (index + direction).clamp(0, Self::ALL.len() as isize - 1) as usize;
        Self::ALL[next]
    }
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Todo => "TODO",
            Status::InProgress => "IN_PROGRESS",
            Status::Done => "DONE",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Todo => "To Do",
            Status::InProgress => "In Progress",
            Status::Done => "Done",
        }
    }

    pub fn step(self, direction: isize) -> Self {
        let index = Self::ALL.iter().position(|s| *s == self).unwrap_or(0) as isize;
        let next = (index + direction).clamp(0, Self::ALL.len() as isize - 1) as usize;
        Self::ALL[next]
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_ascii_uppercase().replace(['-', ' '], "_")
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| ParseEnumError {
                kind: "priority",
                value: s.to_string(),
            })
    }
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == wanted)
            .ok_or_else(|| ParseEnumError {
                kind: "status",
                value: s.to_string(),
            })
    }
}

/// A task as stored by the server.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TaskId>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
}

impl Task {
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn is_overdue_at(&self, now: NaiveDateTime) -> bool {
        match self.deadline {
            Some(deadline) if self.status != Status::Done => now > deadline,
            _ => false,
        }
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_at(Local::now().naive_local())
    }

    /// Copy of this task with only the status replaced.
    pub fn with_status(&self, status: Status) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}

/// Body of `POST /api/tasks`. The server assigns id and status.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

/// Unsaved form state handed to the shell on submit.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub id: Option<TaskId>,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: Status,
    pub deadline: Option<NaiveDateTime>,
}

impl TaskDraft {
    pub fn to_new_task(&self) -> NewTask {
        NewTask {
            title: self.title.clone(),
            description: self.description.clone(),
            priority: self.priority,
        }
    }

    /// Full replacement body for `PUT /api/tasks/{id}`.
    pub fn to_task(&self) -> Task {
        Task {
            id: self.id,
            title: self.title.clone(),
            description: Some(self.description.clone()),
            priority: self.priority,
            status: self.status,
            deadline: self.deadline,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Stable sort, HIGH first.
pub fn sort_by_priority(tasks: &mut [&Task]) {
    tasks.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn task(title: &str, priority: Priority) -> Task {
        Task {
            id: Some(1),
            title: title.to_string(),
            description: None,
            priority,
            status: Status::Todo,
            deadline: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn decodes_server_payload() {
        let json = r#"{
            "id": 7,
            "title": "Write report",
            "description": "Q3 numbers",
            "priority": "HIGH",
            "status": "IN_PROGRESS",
            "deadline": "2024-05-01T12:00:00",
            "createdAt": "2024-04-01T08:30:00.123456",
            "updatedAt": null
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, Some(7));
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.status, Status::InProgress);
        assert!(task.deadline.is_some());
        assert!(task.created_at.is_some());
        assert_eq!(task.updated_at, None);
    }

    #[test]
    fn missing_status_defaults_to_todo() {
        let task: Task = serde_json::from_str(r#"{"id":1,"title":"t"}"#).unwrap();
        assert_eq!(task.status, Status::Todo);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.description_text(), "");
    }

    #[test]
    fn new_task_body_has_only_create_fields() {
        let draft = TaskDraft {
            id: None,
            title: "Neue Aufgabe".to_string(),
            description: "Beschreibung".to_string(),
            priority: Priority::Medium,
            status: Status::Todo,
            deadline: None,
        };
        let body = serde_json::to_value(draft.to_new_task()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "title": "Neue Aufgabe",
                "description": "Beschreibung",
                "priority": "MEDIUM"
            })
        );
    }

    #[test]
    fn update_body_omits_absent_server_fields() {
        let body = serde_json::to_value(task("a", Priority::Low).with_status(Status::Done)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "id": 1,
                "title": "a",
                "description": null,
                "priority": "LOW",
                "status": "DONE"
            })
        );
    }

    #[test]
    fn parses_enums_leniently() {
        assert_eq!("high".parse::<Priority>(), Ok(Priority::High));
        assert_eq!("in-progress".parse::<Status>(), Ok(Status::InProgress));
        assert_eq!("IN_PROGRESS".parse::<Status>(), Ok(Status::InProgress));
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn step_clamps_at_the_ends() {
        assert_eq!(Status::Todo.step(-1), Status::Todo);
        assert_eq!(Status::Todo.step(1), Status::InProgress);
        assert_eq!(Status::Done.step(1), Status::Done);
        assert_eq!(Priority::Medium.step(1), Priority::High);
        assert_eq!(Priority::Low.step(-1), Priority::Low);
    }

    #[test]
    fn overdue_only_when_deadline_passed_and_not_done() {
        let now = Local::now().naive_local();
        let mut t = task("late", Priority::Low);
        assert!(!t.is_overdue_at(now));

        t.deadline = Some(now - Duration::days(1));
        assert!(t.is_overdue_at(now));

        t.status = Status::Done;
        assert!(!t.is_overdue_at(now));

        t.status = Status::Todo;
        t.deadline = Some(now + Duration::days(1));
        assert!(!t.is_overdue_at(now));
    }

    #[test]
    fn sorts_high_priority_first() {
        let low = task("low", Priority::Low);
        let medium = task("medium", Priority::Medium);
        let high = task("high", Priority::High);
        let mut tasks = vec![&low, &medium, &high];
        sort_by_priority(&mut tasks);
        let order: Vec<_> = tasks.iter().map(|t| t.priority).collect();
        assert_eq!(order, vec![Priority::High, Priority::Medium, Priority::Low]);
    }
}
