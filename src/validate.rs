//! Overlap rules.
//!
//! Two policies live here and are deliberately different:
//! - [`ranges_overlap`] gates every write. Closed intervals, so ranges that
//!   share a single boundary date conflict.
//! - [`occupies_cell`] decides which tasks are drawn in a timeline cell. In
//!   month view it uses the looser "starts in this month or spans it" rule.

use crate::calendar::Granularity;
use crate::model::Task;
use chrono::{Datelike, NaiveDate};

/// Anything with a date range that can block a candidate.
pub trait Scheduled {
    fn task_id(&self) -> Option<&str>;

    /// `None` when the caller already scoped the ranges to one lane.
    fn lane_id(&self) -> Option<&str>;

    fn start(&self) -> NaiveDate;

    fn end(&self) -> NaiveDate;
}

impl Scheduled for Task {
    fn task_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn lane_id(&self) -> Option<&str> {
        Some(&self.lane_id)
    }

    fn start(&self) -> NaiveDate {
        self.start_date
    }

    fn end(&self) -> NaiveDate {
        self.end_date
    }
}

/// The proposed range of a create or an edit.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub lane_id: Option<&'a str>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

pub fn ranges_overlap(a_start: NaiveDate, a_end: NaiveDate, b_start: NaiveDate, b_end: NaiveDate) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// First existing entry that conflicts with `candidate`.
///
/// Entries in another lane and the entry whose id equals `exclude_id` are
/// skipped.
pub fn find_conflict<'a, T, I>(candidate: &Candidate<'_>, existing: I, exclude_id: Option<&str>) -> Option<&'a T>
where
    T: Scheduled + 'a,
    I: IntoIterator<Item = &'a T>,
{
    existing.into_iter().find(|other| {
        if let (Some(lane), Some(other_lane)) = (candidate.lane_id, other.lane_id()) {
            if lane != other_lane {
                return false;
            }
        }
        if exclude_id.is_some() && other.task_id() == exclude_id {
            return false;
        }
        ranges_overlap(candidate.start, candidate.end, other.start(), other.end())
    })
}

pub fn validate<'a, T, I>(candidate: &Candidate<'_>, existing: I, exclude_id: Option<&str>) -> bool
where
    T: Scheduled + 'a,
    I: IntoIterator<Item = &'a T>,
{
    find_conflict(candidate, existing, exclude_id).is_some()
}

/// Whether `task` is drawn in the cell whose unit starts at `unit`.
pub fn occupies_cell(task: &Task, unit: NaiveDate, granularity: Granularity) -> bool {
    match granularity {
        Granularity::Month => {
            let same_month = unit.year() == task.start_date.year() && unit.month() == task.start_date.month();
            same_month || (unit > task.start_date && unit < task.end_date)
        }
        Granularity::Day | Granularity::Week => {
            let unit_end = granularity.unit_end(unit);
            ranges_overlap(unit, unit_end, task.start_date, task.end_date)
        }
    }
}
