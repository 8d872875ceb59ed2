use crate::layout::Layout;
use crate::window::RangeWindow;
use chrono::NaiveDate;
use log::debug;

/// Work deferred until the display has rendered the current window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PendingAdjustment {
    /// Units were prepended; shift the offset by the width they added.
    Anchor { added: f64 },
    /// Put today in the middle of the viewport.
    Recenter,
}

/// Which edges a scroll signal grew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Growth {
    pub backward: bool,
    pub forward: bool,
}

/// Decides when the window grows and keeps the view anchored while it does.
///
/// Holds at most one pending adjustment. A recenter wins over an anchor
/// correction, and repeated backward grows add up so the final correction
/// covers all of them.
#[derive(Debug, Clone)]
pub struct ScrollCoordinator {
    offset: f64,
    edge_threshold: f64,
    pending: Option<PendingAdjustment>,
}

impl ScrollCoordinator {
    pub fn new(edge_threshold: f64) -> Self {
        ScrollCoordinator {
            offset: 0.0,
            edge_threshold,
            pending: None,
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn pending(&self) -> Option<PendingAdjustment> {
        self.pending
    }

    /// Handles a scroll-position signal and grows the window when the
    /// viewport comes within the trigger distance of either edge.
    pub fn on_scroll(
        &mut self,
        offset: f64,
        viewport_width: f64,
        window: &mut RangeWindow,
        unit_width: f64,
    ) -> Growth {
        let content_width = Layout::new(window, unit_width).content_width();
        let max = (content_width - viewport_width).max(0.0);
        self.offset = offset.clamp(0.0, max);

        let mut growth = Growth::default();
        if self.offset < self.edge_threshold {
            window.grow_backward();
            let added = Layout::new(window, unit_width).content_width() - content_width;
            self.request(PendingAdjustment::Anchor { added });
            growth.backward = true;
        }
        if self.offset > max - self.edge_threshold {
            window.grow_forward();
            growth.forward = true;
        }
        growth
    }

    /// Asks for today to be centered on the next settle.
    pub fn request_recenter(&mut self) {
        self.request(PendingAdjustment::Recenter);
    }

    /// Applies the pending adjustment against the window as rendered now.
    /// Returns the offset the display should scroll to.
    pub fn settle(&mut self, layout: &Layout<'_>, today: NaiveDate, viewport_width: f64) -> f64 {
        match self.pending.take() {
            Some(PendingAdjustment::Anchor { added }) => {
                self.offset += added;
                debug!("event=scroll_anchor delta={} offset={}", added, self.offset);
            }
            Some(PendingAdjustment::Recenter) => {
                // today outside the window leaves the offset alone
                if let Some(centered) = layout.centered_offset(today, viewport_width) {
                    self.offset = centered;
                }
                debug!("event=scroll_recenter offset={}", self.offset);
            }
            None => {}
        }
        self.offset
    }

    fn request(&mut self, adjustment: PendingAdjustment) {
        self.pending = match (self.pending, adjustment) {
            (Some(PendingAdjustment::Recenter), _) => Some(PendingAdjustment::Recenter),
            (
                Some(PendingAdjustment::Anchor { added: earlier }),
                PendingAdjustment::Anchor { added },
            ) => Some(PendingAdjustment::Anchor {
                added: earlier + added,
            }),
            (_, next) => Some(next),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Granularity;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 14).unwrap()
    }

    #[test]
    fn test_middle_scroll_does_not_grow() {
        let mut w = RangeWindow::new(Granularity::Day, today());
        let before = w.clone();
        let mut s = ScrollCoordinator::new(300.0);
        let growth = s.on_scroll(4000.0, 800.0, &mut w, 80.0);
        assert_eq!(growth, Growth::default());
        assert_eq!(w, before);
        assert_eq!(s.pending(), None);
    }

    #[test]
    fn test_near_start_grows_backward_and_anchors() {
        let mut w = RangeWindow::new(Granularity::Day, today());
        let mut s = ScrollCoordinator::new(300.0);
        let growth = s.on_scroll(120.0, 800.0, &mut w, 80.0);
        assert!(growth.backward);
        assert!(!growth.forward);

        let layout = Layout::new(&w, 80.0);
        let offset = s.settle(&layout, today(), 800.0);
        // thirty day columns were prepended
        assert_eq!(offset, 120.0 + 30.0 * 80.0);
        assert_eq!(s.pending(), None);
    }

    #[test]
    fn test_near_end_grows_forward_without_anchor() {
        let mut w = RangeWindow::new(Granularity::Month, today());
        let mut s = ScrollCoordinator::new(300.0);
        let content = 13.0 * 120.0;
        let growth = s.on_scroll(content - 800.0 - 10.0, 800.0, &mut w, 120.0);
        assert!(growth.forward);
        assert!(!growth.backward);
        assert_eq!(w.units().len(), 16);
        assert_eq!(s.pending(), None);
    }

    #[test]
    fn test_offset_is_clamped_to_content() {
        let mut w = RangeWindow::new(Granularity::Day, today());
        let mut s = ScrollCoordinator::new(300.0);
        s.on_scroll(1.0e9, 800.0, &mut w, 80.0);
        assert_eq!(s.offset(), 181.0 * 80.0 - 800.0);
    }

    #[test]
    fn test_repeated_backward_grows_coalesce() {
        let mut w = RangeWindow::new(Granularity::Week, today());
        let mut s = ScrollCoordinator::new(300.0);
        s.on_scroll(0.0, 800.0, &mut w, 100.0);
        s.on_scroll(0.0, 800.0, &mut w, 100.0);
        assert_eq!(
            s.pending(),
            Some(PendingAdjustment::Anchor { added: 2000.0 })
        );
        let layout = Layout::new(&w, 100.0);
        // both chunks of ten weeks are accounted for in one correction
        assert_eq!(s.settle(&layout, today(), 800.0), 2000.0);
    }

    #[test]
    fn test_growth_at_both_edges_anchors_only_prepended_width() {
        let mut w = RangeWindow::new(Granularity::Month, today());
        let mut s = ScrollCoordinator::new(300.0);
        // 13 months of 120 leave less than twice the threshold to scroll
        let growth = s.on_scroll(0.0, 1500.0, &mut w, 120.0);
        assert_eq!(
            growth,
            Growth {
                backward: true,
                forward: true
            }
        );
        assert_eq!(w.units().len(), 19);
        let layout = Layout::new(&w, 120.0);
        assert_eq!(s.settle(&layout, today(), 1500.0), 3.0 * 120.0);
    }

    #[test]
    fn test_recenter_supersedes_anchor() {
        let mut w = RangeWindow::new(Granularity::Day, today());
        let mut s = ScrollCoordinator::new(300.0);
        s.on_scroll(0.0, 800.0, &mut w, 80.0);
        w.set_granularity(Granularity::Day, today());
        s.request_recenter();
        s.on_scroll(0.0, 800.0, &mut w, 80.0);
        assert_eq!(s.pending(), Some(PendingAdjustment::Recenter));
    }

    #[test]
    fn test_recenter_centers_today() {
        let w = RangeWindow::new(Granularity::Day, today());
        let mut s = ScrollCoordinator::new(300.0);
        s.request_recenter();
        let layout = Layout::new(&w, 80.0);
        let offset = s.settle(&layout, today(), 800.0);
        assert_eq!(offset, 60.0 * 80.0 - 400.0 + 40.0);
    }

    #[test]
    fn test_settle_without_pending_keeps_offset() {
        let mut w = RangeWindow::new(Granularity::Day, today());
        let mut s = ScrollCoordinator::new(300.0);
        s.on_scroll(4000.0, 800.0, &mut w, 80.0);
        let layout = Layout::new(&w, 80.0);
        assert_eq!(s.settle(&layout, today(), 800.0), 4000.0);
    }
}
