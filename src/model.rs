use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type LaneId = String;
pub type TaskId = String;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A work center. Fixed for the session.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Lane {
    pub id: LaneId,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Open,
    Blocked,
    #[serde(rename = "In_progress", alias = "InProgress")]
    InProgress,
    Complete,
}

/// A work order placed in exactly one lane.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub lane_id: LaneId,
    pub name: String,
    pub status: TaskStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Every task field except the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub lane_id: LaneId,
    pub name: String,
    pub status: TaskStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("lane not found: {0}")]
    UnknownLane(LaneId),
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    #[error("end date {end} is before start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("invalid date (use YYYY-MM-DD): {0}")]
    InvalidDate(String),
    #[error("Work order overlaps with an existing order for this work center ({conflicting} in {lane}).")]
    Overlap { lane: LaneId, conflicting: TaskId },
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Open,
        TaskStatus::InProgress,
        TaskStatus::Complete,
        TaskStatus::Blocked,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Open => "Open",
            TaskStatus::Blocked => "Blocked",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Complete => "Complete",
        }
    }

    pub fn parse(input: &str) -> Option<TaskStatus> {
        let key: String = input
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "open" => Some(TaskStatus::Open),
            "blocked" => Some(TaskStatus::Blocked),
            "inprogress" => Some(TaskStatus::InProgress),
            "complete" => Some(TaskStatus::Complete),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Task {
    pub fn from_draft(id: TaskId, draft: TaskDraft) -> Self {
        Task {
            id,
            lane_id: draft.lane_id,
            name: draft.name,
            status: draft.status,
            start_date: draft.start_date,
            end_date: draft.end_date,
        }
    }

    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            lane_id: self.lane_id.clone(),
            name: self.name.clone(),
            status: self.status,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

impl TaskDraft {
    pub fn ensure_range(&self) -> Result<(), ScheduleError> {
        if self.start_date > self.end_date {
            return Err(ScheduleError::InvalidRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }
}

pub fn parse_date(input: &str) -> Result<NaiveDate, ScheduleError> {
    let raw = input.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| ScheduleError::InvalidDate(raw.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
