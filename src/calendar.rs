use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Zoom level of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

/// Everything that varies per granularity, in one place.
pub struct UnitSpec {
    pub label: &'static str,
    /// Units added by a single grow step.
    pub chunk: i64,
    /// Units before and after "now" on reset.
    pub span_back: i64,
    pub span_forward: i64,
    /// Added to the raw difference when measuring a task's length.
    pub length_bias: f64,
    pub start_of: fn(NaiveDate) -> NaiveDate,
    pub step: fn(NaiveDate, i64) -> NaiveDate,
    pub diff: fn(NaiveDate, NaiveDate) -> f64,
    pub format: fn(NaiveDate) -> String,
}

static DAY: UnitSpec = UnitSpec {
    label: "day",
    chunk: 30,
    span_back: 60,
    span_forward: 120,
    length_bias: 1.0,
    start_of: start_of_day,
    step: add_days,
    diff: diff_days_f64,
    format: format_day,
};

static WEEK: UnitSpec = UnitSpec {
    label: "week",
    chunk: 10,
    span_back: 8,
    span_forward: 12,
    length_bias: 0.0,
    start_of: start_of_week,
    step: add_weeks,
    diff: diff_weeks_f64,
    format: format_week,
};

static MONTH: UnitSpec = UnitSpec {
    label: "month",
    chunk: 3,
    span_back: 6,
    span_forward: 6,
    length_bias: 0.0,
    start_of: start_of_month,
    step: add_months,
    diff: diff_in_month_fraction,
    format: format_month,
};

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Day, Granularity::Week, Granularity::Month];

    pub fn spec(self) -> &'static UnitSpec {
        match self {
            Granularity::Day => &DAY,
            Granularity::Week => &WEEK,
            Granularity::Month => &MONTH,
        }
    }

    pub fn label(self) -> &'static str {
        self.spec().label
    }

    pub fn start_of(self, date: NaiveDate) -> NaiveDate {
        (self.spec().start_of)(date)
    }

    pub fn step(self, date: NaiveDate, n: i64) -> NaiveDate {
        (self.spec().step)(date, n)
    }

    pub fn format(self, unit: NaiveDate) -> String {
        (self.spec().format)(unit)
    }

    /// Last calendar day covered by the unit starting at `unit`.
    pub fn unit_end(self, unit: NaiveDate) -> NaiveDate {
        add_days(self.step(unit, 1), -1)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "d" => Ok(Granularity::Day),
            "week" | "w" => Ok(Granularity::Week),
            "month" | "m" => Ok(Granularity::Month),
            other => Err(format!("unknown view `{other}` (expected day|week|month)")),
        }
    }
}

pub fn start_of_day(date: NaiveDate) -> NaiveDate {
    date
}

/// Monday of the week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    let from_monday = date.weekday().num_days_from_monday() as i64;
    add_days(date, -from_monday)
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Signed day offset, saturating at the calendar bounds.
pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    let days = Days::new(n.unsigned_abs());
    let moved = if n >= 0 {
        date.checked_add_days(days)
    } else {
        date.checked_sub_days(days)
    };
    moved.unwrap_or(if n >= 0 { NaiveDate::MAX } else { NaiveDate::MIN })
}

pub fn add_weeks(date: NaiveDate, n: i64) -> NaiveDate {
    add_days(date, n.saturating_mul(7))
}

/// Signed month offset. Days past the end of the target month clamp to its
/// last day (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, n: i64) -> NaiveDate {
    let months = Months::new(u32::try_from(n.unsigned_abs()).unwrap_or(u32::MAX));
    let moved = if n >= 0 {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    };
    moved.unwrap_or(if n >= 0 { NaiveDate::MAX } else { NaiveDate::MIN })
}

/// Inclusive enumeration of unit starts from `start` to `end`.
///
/// Both bounds must already sit on a unit boundary for `granularity`.
pub fn units_between(start: NaiveDate, end: NaiveDate, granularity: Granularity) -> Vec<NaiveDate> {
    let mut units = Vec::new();
    let mut current = start;
    while current <= end {
        units.push(current);
        let next = granularity.step(current, 1);
        if next <= current {
            break;
        }
        current = next;
    }
    units
}

/// Whole days from `a` to `b`, never negative.
pub fn diff_in_days(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days().max(0)
}

/// Weeks from `a` to `b`, rounded up, never negative.
pub fn diff_in_weeks(a: NaiveDate, b: NaiveDate) -> i64 {
    let days = diff_in_days(a, b);
    (days + 6) / 7
}

/// Month distance from `a` to `b` with a fractional day term measured
/// against the length of `b`'s month. Not clamped.
pub fn diff_in_month_fraction(a: NaiveDate, b: NaiveDate) -> f64 {
    let mut months = (b.year() - a.year()) as i64 * 12 + (b.month() as i64 - a.month() as i64);
    if b.day() < a.day() {
        months -= 1;
    }
    let day_diff = b.day() as f64 - a.day() as f64;
    months as f64 + day_diff / days_in_month(b.year(), b.month()) as f64
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = first.and_then(|d| d.checked_add_months(Months::new(1)));
    match (first, next) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 31,
    }
}

fn diff_days_f64(a: NaiveDate, b: NaiveDate) -> f64 {
    diff_in_days(a, b) as f64
}

fn diff_weeks_f64(a: NaiveDate, b: NaiveDate) -> f64 {
    diff_in_weeks(a, b) as f64
}

fn format_day(unit: NaiveDate) -> String {
    unit.format("%a %b %d %Y").to_string()
}

fn format_week(unit: NaiveDate) -> String {
    format!("Week of {}", format_day(unit))
}

fn format_month(unit: NaiveDate) -> String {
    unit.format("%B %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_start_of_week_is_monday() {
        // 2026-01-07 is a Wednesday
        assert_eq!(start_of_week(d("2026-01-07")), d("2026-01-05"));
        assert_eq!(start_of_week(d("2026-01-05")), d("2026-01-05"));
        // Sunday belongs to the week that started six days earlier
        assert_eq!(start_of_week(d("2026-01-11")), d("2026-01-05"));
    }

    #[test]
    fn test_start_of_month() {
        assert_eq!(start_of_month(d("2026-02-17")), d("2026-02-01"));
    }

    #[test]
    fn test_add_months_clamps_day() {
        assert_eq!(add_months(d("2026-01-31"), 1), d("2026-02-28"));
        assert_eq!(add_months(d("2026-03-01"), -3), d("2025-12-01"));
    }

    #[test]
    fn test_add_days_saturates() {
        assert_eq!(add_days(NaiveDate::MAX, 1), NaiveDate::MAX);
        assert_eq!(add_days(NaiveDate::MIN, -1), NaiveDate::MIN);
    }

    #[test]
    fn test_units_between_week() {
        let units = units_between(d("2026-01-05"), d("2026-01-26"), Granularity::Week);
        assert_eq!(
            units,
            vec![d("2026-01-05"), d("2026-01-12"), d("2026-01-19"), d("2026-01-26")]
        );
    }

    #[test]
    fn test_units_between_month_crosses_year() {
        let units = units_between(d("2025-11-01"), d("2026-02-01"), Granularity::Month);
        assert_eq!(units.len(), 4);
        assert_eq!(units[2], d("2026-01-01"));
    }

    #[test]
    fn test_units_between_empty_when_reversed() {
        assert!(units_between(d("2026-02-01"), d("2026-01-01"), Granularity::Day).is_empty());
    }

    #[test]
    fn test_diff_in_days_clamps_negative() {
        assert_eq!(diff_in_days(d("2026-01-01"), d("2026-01-10")), 9);
        assert_eq!(diff_in_days(d("2026-01-10"), d("2026-01-01")), 0);
    }

    #[test]
    fn test_diff_in_days_across_dst_change() {
        // European DST starts on 2026-03-29; calendar dates are unaffected
        assert_eq!(diff_in_days(d("2026-03-28"), d("2026-03-30")), 2);
    }

    #[test]
    fn test_diff_in_weeks_rounds_up() {
        assert_eq!(diff_in_weeks(d("2026-01-01"), d("2026-01-01")), 0);
        assert_eq!(diff_in_weeks(d("2026-01-01"), d("2026-01-02")), 1);
        assert_eq!(diff_in_weeks(d("2026-01-01"), d("2026-01-08")), 1);
        assert_eq!(diff_in_weeks(d("2026-01-01"), d("2026-01-09")), 2);
        assert_eq!(diff_in_weeks(d("2026-01-09"), d("2026-01-01")), 0);
    }

    #[test]
    fn test_diff_in_month_fraction_decrements_on_earlier_day() {
        // Jan -> Mar is 2 months, day 1 < day 15 drops it to 1,
        // then (1 - 15) / 31 days of March
        let got = diff_in_month_fraction(d("2026-01-15"), d("2026-03-01"));
        let want = 1.0 + (1.0 - 15.0) / 31.0;
        assert!((got - want).abs() < 1e-12);
    }

    #[test]
    fn test_diff_in_month_fraction_half_month() {
        let got = diff_in_month_fraction(d("2026-04-01"), d("2026-04-16"));
        assert!((got - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2026, 12), 31);
    }

    #[test]
    fn test_format_labels() {
        assert_eq!(Granularity::Day.format(d("2026-01-05")), "Mon Jan 05 2026");
        assert_eq!(Granularity::Week.format(d("2026-01-05")), "Week of Mon Jan 05 2026");
        assert_eq!(Granularity::Month.format(d("2026-01-01")), "January 2026");
    }

    #[test]
    fn test_unit_end() {
        assert_eq!(Granularity::Week.unit_end(d("2026-01-05")), d("2026-01-11"));
        assert_eq!(Granularity::Month.unit_end(d("2026-02-01")), d("2026-02-28"));
        assert_eq!(Granularity::Day.unit_end(d("2026-02-01")), d("2026-02-01"));
    }

    #[test]
    fn test_granularity_from_str() {
        assert_eq!("Week".parse::<Granularity>(), Ok(Granularity::Week));
        assert!("year".parse::<Granularity>().is_err());
    }
}
