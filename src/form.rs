//! The boundary with the editing form.
//!
//! Dates cross this boundary as `YYYY-MM-DD` strings.

use crate::model::{format_date, parse_date, ScheduleError, Task, TaskDraft, TaskStatus};
use crate::validate::{validate, Candidate, Scheduled};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const OVERLAP_MESSAGE: &str = "Work order overlaps with an existing order for this work center.";

/// A task range already present in the lane being edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingRange {
    pub task_id: Option<String>,
    pub start: String,
    pub end: String,
}

/// Sent to the form when it opens: prefill plus overlap context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenRequest {
    pub lane_id: Option<String>,
    pub task_id: Option<String>,
    pub name: Option<String>,
    pub status: Option<TaskStatus>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub existing_ranges_in_lane: Vec<ExistingRange>,
}

/// Received back from the form on submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub task_id: Option<String>,
    pub lane_id: String,
    pub name: String,
    pub status: TaskStatus,
    pub start_date: String,
    pub end_date: String,
}

/// Transient state shared with the form: what it was opened with and the
/// current advisory error.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    open: Option<OpenRequest>,
    error: Option<String>,
    overlap: bool,
}

struct ParsedRange {
    task_id: Option<String>,
    start: NaiveDate,
    end: NaiveDate,
}

impl Scheduled for ParsedRange {
    fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    fn lane_id(&self) -> Option<&str> {
        None
    }

    fn start(&self) -> NaiveDate {
        self.start
    }

    fn end(&self) -> NaiveDate {
        self.end
    }
}

impl ExistingRange {
    pub fn from_task(task: &Task) -> Self {
        ExistingRange {
            task_id: Some(task.id.clone()),
            start: format_date(task.start_date),
            end: format_date(task.end_date),
        }
    }
}

impl SubmitRequest {
    pub fn to_draft(&self) -> Result<TaskDraft, ScheduleError> {
        let draft = TaskDraft {
            lane_id: self.lane_id.clone(),
            name: self.name.trim().to_string(),
            status: self.status,
            start_date: parse_date(&self.start_date)?,
            end_date: parse_date(&self.end_date)?,
        };
        draft.ensure_range()?;
        Ok(draft)
    }
}

impl FormState {
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_overlap(&self) -> bool {
        self.overlap
    }

    pub fn open(&mut self, request: OpenRequest) {
        self.clear_error();
        self.open = Some(request);
    }

    pub fn close(&mut self) {
        self.clear_error();
        self.open = None;
    }

    pub fn set_error(&mut self, message: impl Into<String>, overlap: bool) {
        self.error = Some(message.into());
        self.overlap = overlap;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
        self.overlap = false;
    }

    /// Live check while the form is being filled in. Incomplete or
    /// unparseable dates clear the indicator rather than raising one.
    pub fn check(&mut self, start: &str, end: &str) -> bool {
        let (Ok(start), Ok(end)) = (parse_date(start), parse_date(end)) else {
            self.clear_error();
            return false;
        };
        let Some(request) = self.open.as_ref() else {
            return false;
        };
        let ranges: Vec<ParsedRange> = request
            .existing_ranges_in_lane
            .iter()
            .filter_map(|r| {
                Some(ParsedRange {
                    task_id: r.task_id.clone(),
                    start: parse_date(&r.start).ok()?,
                    end: parse_date(&r.end).ok()?,
                })
            })
            .collect();
        let candidate = Candidate {
            lane_id: None,
            start,
            end,
        };
        let overlap = validate(&candidate, &ranges, request.task_id.as_deref());
        if overlap {
            self.set_error(OVERLAP_MESSAGE, true);
        } else {
            self.clear_error();
        }
        overlap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(id: &str, start: &str, end: &str) -> ExistingRange {
        ExistingRange {
            task_id: Some(id.into()),
            start: start.into(),
            end: end.into(),
        }
    }

    fn opened(task_id: Option<&str>) -> FormState {
        let mut form = FormState::default();
        form.open(OpenRequest {
            lane_id: Some("L1".into()),
            task_id: task_id.map(String::from),
            existing_ranges_in_lane: vec![
                range("wo-1", "2026-01-01", "2026-01-10"),
                range("wo-2", "2026-02-01", "2026-02-05"),
            ],
            ..OpenRequest::default()
        });
        form
    }

    #[test]
    fn test_check_flags_overlap() {
        let mut form = opened(None);
        assert!(form.check("2026-01-10", "2026-01-15"));
        assert!(form.has_overlap());
        assert_eq!(form.error(), Some(OVERLAP_MESSAGE));

        assert!(!form.check("2026-01-11", "2026-01-15"));
        assert!(!form.has_overlap());
        assert_eq!(form.error(), None);
    }

    #[test]
    fn test_check_ignores_task_being_edited() {
        let mut form = opened(Some("wo-1"));
        assert!(!form.check("2026-01-01", "2026-01-12"));
        assert!(form.check("2026-01-01", "2026-02-01"));
    }

    #[test]
    fn test_check_with_incomplete_dates_clears() {
        let mut form = opened(None);
        form.check("2026-01-10", "2026-01-15");
        assert!(!form.check("2026-01-", "2026-01-15"));
        assert!(!form.has_overlap());
    }

    #[test]
    fn test_close_clears_indicator() {
        let mut form = opened(None);
        form.check("2026-01-10", "2026-01-15");
        form.close();
        assert!(!form.is_open());
        assert!(!form.has_overlap());
        assert_eq!(form.error(), None);
    }

    #[test]
    fn test_submit_to_draft() {
        let submit = SubmitRequest {
            task_id: None,
            lane_id: "L1".into(),
            name: "  Weld frames ".into(),
            status: TaskStatus::Open,
            start_date: "2026-01-02".into(),
            end_date: "2026-01-01".into(),
        };
        assert!(matches!(submit.to_draft(), Err(ScheduleError::InvalidRange { .. })));

        let submit = SubmitRequest {
            end_date: "2026-01-03".into(),
            ..submit
        };
        let draft = submit.to_draft().unwrap();
        assert_eq!(draft.name, "Weld frames");
    }

    #[test]
    fn test_open_request_wire_shape() {
        let req = OpenRequest {
            lane_id: Some("L1".into()),
            existing_ranges_in_lane: vec![range("wo-1", "2026-01-01", "2026-01-10")],
            ..OpenRequest::default()
        };
        let yaml = serde_yaml::to_string(&req).unwrap();
        assert!(yaml.contains("laneId: L1"));
        assert!(yaml.contains("existingRangesInLane"));
        assert!(yaml.contains("taskId: wo-1"));
    }
}
