use crate::calendar::{units_between, Granularity};
use chrono::NaiveDate;
use log::debug;

/// The materialized `[start, end]` span of the timeline.
///
/// Both bounds always sit on a unit boundary of the active granularity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeWindow {
    start: NaiveDate,
    end: NaiveDate,
    granularity: Granularity,
}

impl RangeWindow {
    pub fn new(granularity: Granularity, today: NaiveDate) -> Self {
        let mut window = RangeWindow {
            start: today,
            end: today,
            granularity,
        };
        window.reset(today);
        window
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Recenters the window on `today` using the granularity's fixed span.
    pub fn reset(&mut self, today: NaiveDate) {
        let spec = self.granularity.spec();
        let anchor = self.granularity.start_of(today);
        self.start = self.granularity.step(anchor, -spec.span_back);
        self.end = self.granularity.step(anchor, spec.span_forward);
        debug!(
            "event=window_reset view={} start={} end={}",
            self.granularity, self.start, self.end
        );
    }

    /// Switching granularity always resets, even to the same value.
    pub fn set_granularity(&mut self, granularity: Granularity, today: NaiveDate) {
        self.granularity = granularity;
        self.reset(today);
    }

    pub fn grow_forward(&mut self) {
        let chunk = self.granularity.spec().chunk;
        self.end = self.granularity.step(self.end, chunk);
        debug!("event=window_grow edge=end view={} end={}", self.granularity, self.end);
    }

    pub fn grow_backward(&mut self) {
        let chunk = self.granularity.spec().chunk;
        self.start = self.granularity.step(self.start, -chunk);
        debug!(
            "event=window_grow edge=start view={} start={}",
            self.granularity, self.start
        );
    }

    /// The timeline unit sequence. Recomputed on every call.
    pub fn units(&self) -> Vec<NaiveDate> {
        units_between(self.start, self.end, self.granularity)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        let unit = self.granularity.start_of(date);
        unit >= self.start && unit <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{add_days, add_months, add_weeks, start_of_week};

    fn today() -> NaiveDate {
        // a Wednesday in the middle of a month
        NaiveDate::from_ymd_opt(2026, 1, 14).unwrap()
    }

    #[test]
    fn test_reset_day_span() {
        let w = RangeWindow::new(Granularity::Day, today());
        assert_eq!(w.start(), add_days(today(), -60));
        assert_eq!(w.end(), add_days(today(), 120));
        assert_eq!(w.units().len(), 181);
    }

    #[test]
    fn test_reset_week_span_starts_on_monday() {
        let w = RangeWindow::new(Granularity::Week, today());
        let monday = start_of_week(today());
        assert_eq!(w.start(), add_weeks(monday, -8));
        assert_eq!(w.end(), add_weeks(monday, 12));
        assert_eq!(w.units().len(), 21);
    }

    #[test]
    fn test_reset_month_span() {
        let w = RangeWindow::new(Granularity::Month, today());
        let first = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(w.start(), add_months(first, -6));
        assert_eq!(w.end(), add_months(first, 6));
        assert_eq!(w.units().len(), 13);
    }

    #[test]
    fn test_start_not_after_end_for_all_operations() {
        for g in Granularity::ALL {
            let mut w = RangeWindow::new(g, today());
            assert!(w.start() <= w.end());
            w.grow_forward();
            assert!(w.start() <= w.end());
            w.grow_backward();
            assert!(w.start() <= w.end());
            w.reset(today());
            assert!(w.start() <= w.end());
        }
    }

    #[test]
    fn test_grow_chunks() {
        let mut w = RangeWindow::new(Granularity::Day, today());
        let (start, end) = (w.start(), w.end());
        w.grow_forward();
        assert_eq!(w.end(), add_days(end, 30));
        assert_eq!(w.start(), start);
        w.grow_backward();
        assert_eq!(w.start(), add_days(start, -30));
        assert_eq!(w.end(), add_days(end, 30));

        let mut w = RangeWindow::new(Granularity::Week, today());
        let end = w.end();
        w.grow_forward();
        assert_eq!(w.end(), add_weeks(end, 10));

        let mut w = RangeWindow::new(Granularity::Month, today());
        let start = w.start();
        w.grow_backward();
        assert_eq!(w.start(), add_months(start, -3));
    }

    #[test]
    fn test_grow_forward_then_backward_are_independent() {
        let mut w = RangeWindow::new(Granularity::Week, today());
        let before = w.clone();
        w.grow_forward();
        w.grow_backward();
        // both edges moved outward; neither undoes the other
        assert!(w.start() < before.start());
        assert!(w.end() > before.end());
        assert_eq!(w.granularity(), Granularity::Week);
    }

    #[test]
    fn test_grown_bounds_stay_on_unit_boundaries() {
        let mut w = RangeWindow::new(Granularity::Month, today());
        w.grow_backward();
        w.grow_forward();
        assert_eq!(Granularity::Month.start_of(w.start()), w.start());
        assert_eq!(Granularity::Month.start_of(w.end()), w.end());
    }

    #[test]
    fn test_set_granularity_resets() {
        let mut w = RangeWindow::new(Granularity::Day, today());
        w.grow_forward();
        w.set_granularity(Granularity::Month, today());
        assert_eq!(w.granularity(), Granularity::Month);
        assert_eq!(w.units().len(), 13);
    }

    #[test]
    fn test_contains() {
        let w = RangeWindow::new(Granularity::Week, today());
        assert!(w.contains(today()));
        assert!(!w.contains(add_weeks(today(), 40)));
    }
}
