//! Geometry for the timeline.
//!
//! Lengths and paddings are measured in unit-widths (1.0 = one column of the
//! active granularity); offsets returned by [`Layout::now_marker_offset`],
//! [`Layout::bar`] and [`Layout::centered_offset`] are in display units.
//! Everything here is a pure function of the window, the task or date, and
//! the `now` handed in by the caller.

use crate::calendar::{days_in_month, Granularity};
use crate::model::Task;
use crate::window::RangeWindow;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

/// Horizontal placement of a task bar, in display units from the left edge
/// of the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub offset: f64,
    pub width: f64,
}

pub struct Layout<'a> {
    window: &'a RangeWindow,
    units: Vec<NaiveDate>,
    unit_width: f64,
}

impl<'a> Layout<'a> {
    pub fn new(window: &'a RangeWindow, unit_width: f64) -> Self {
        Layout {
            window,
            units: window.units(),
            unit_width,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.window.granularity()
    }

    pub fn units(&self) -> &[NaiveDate] {
        &self.units
    }

    pub fn unit_width(&self) -> f64 {
        self.unit_width
    }

    pub fn content_width(&self) -> f64 {
        self.units.len() as f64 * self.unit_width
    }

    /// Task length in unit-widths. Single-day tasks are 1.0 in day view.
    pub fn length(&self, task: &Task) -> f64 {
        let spec = self.granularity().spec();
        ((spec.diff)(task.start_date, task.end_date) + spec.length_bias).max(0.0)
    }

    /// Distance from `reference` to the task start in unit-widths. Tasks
    /// starting before `reference` get zero.
    pub fn padding(&self, task: &Task, reference: NaiveDate) -> f64 {
        let spec = self.granularity().spec();
        (spec.diff)(reference, task.start_date).max(0.0)
    }

    /// Bar placement within the window. The part before the window start is
    /// cut off; `None` when no day of the task is inside the window.
    pub fn bar(&self, task: &Task) -> Option<Bar> {
        let granularity = self.granularity();
        let last_day = granularity.unit_end(self.window.end());
        if task.end_date < self.window.start() || task.start_date > last_day {
            return None;
        }
        let visible_start = task.start_date.max(self.window.start());
        let index = self.unit_index(visible_start)? as f64;
        let offset = (index + self.fraction_into_unit(visible_start)) * self.unit_width;
        let visible = Task {
            start_date: visible_start,
            ..task.clone()
        };
        let width = (self.length(&visible) * self.unit_width)
            .min(self.content_width() - offset)
            .max(0.0);
        Some(Bar { offset, width })
    }

    fn fraction_into_unit(&self, date: NaiveDate) -> f64 {
        match self.granularity() {
            Granularity::Day => 0.0,
            Granularity::Week => date.weekday().num_days_from_monday() as f64 / 7.0,
            Granularity::Month => {
                (date.day() - 1) as f64 / days_in_month(date.year(), date.month()) as f64
            }
        }
    }

    /// Index of the unit containing `date`, or `None` outside the window.
    pub fn unit_index(&self, date: NaiveDate) -> Option<usize> {
        let granularity = self.granularity();
        let target = granularity.start_of(date);
        self.units
            .iter()
            .position(|unit| granularity.start_of(*unit) == target)
    }

    /// Position of the "now" marker, or `None` when today is outside the window.
    pub fn now_marker_offset(&self, now: NaiveDateTime) -> Option<f64> {
        let today = now.date();
        let index = self.unit_index(today)? as f64;
        let hours = now.hour() as f64 + now.minute() as f64 / 60.0;
        let fraction = match self.granularity() {
            Granularity::Day => hours / 24.0,
            Granularity::Week => {
                let day_of_week = today.weekday().num_days_from_monday() as f64;
                (day_of_week + hours / 24.0) / 7.0
            }
            Granularity::Month => {
                today.day() as f64 / days_in_month(today.year(), today.month()) as f64
            }
        };
        Some((index + fraction) * self.unit_width)
    }

    /// Scroll offset that puts `today`'s unit in the middle of the viewport.
    pub fn centered_offset(&self, today: NaiveDate, viewport_width: f64) -> Option<f64> {
        let index = self.unit_index(today)? as f64;
        let offset = index * self.unit_width - viewport_width / 2.0 + self.unit_width / 2.0;
        Some(offset.max(0.0))
    }
}
