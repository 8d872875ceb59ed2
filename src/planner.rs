use crate::calendar::Granularity;
use crate::config::{Config, UnitWidths};
use crate::form::{ExistingRange, FormState, OpenRequest, SubmitRequest};
use crate::layout::Layout;
use crate::model::{format_date, ScheduleError, Task};
use crate::scroll::{Growth, ScrollCoordinator};
use crate::store::TaskStore;
use crate::window::RangeWindow;
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info, warn};

/// One timeline session: the store, the visible window, scrolling and the
/// form it talks to.
pub struct Planner {
    store: TaskStore,
    window: RangeWindow,
    scroll: ScrollCoordinator,
    form: FormState,
    widths: UnitWidths,
    show_now_marker: bool,
}

impl Planner {
    pub fn new(store: TaskStore, config: &Config, today: NaiveDate) -> Self {
        let mut scroll = ScrollCoordinator::new(config.edge_threshold);
        scroll.request_recenter();
        Planner {
            store,
            window: RangeWindow::new(config.default_view, today),
            scroll,
            form: FormState::default(),
            widths: config.unit_widths,
            show_now_marker: config.show_now_marker,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn window(&self) -> &RangeWindow {
        &self.window
    }

    pub fn granularity(&self) -> Granularity {
        self.window.granularity()
    }

    pub fn unit_width(&self) -> f64 {
        self.widths.for_granularity(self.granularity())
    }

    pub fn layout(&self) -> Layout<'_> {
        Layout::new(&self.window, self.unit_width())
    }

    pub fn set_granularity(&mut self, granularity: Granularity, today: NaiveDate) {
        self.window.set_granularity(granularity, today);
        self.scroll.request_recenter();
        info!("event=view_switch view={}", granularity);
    }

    pub fn recenter(&mut self) {
        self.scroll.request_recenter();
    }

    pub fn on_scroll(&mut self, offset: f64, viewport_width: f64) -> Growth {
        let unit_width = self.unit_width();
        self.scroll
            .on_scroll(offset, viewport_width, &mut self.window, unit_width)
    }

    /// Runs deferred scroll work; call once the current window is rendered.
    pub fn settle(&mut self, today: NaiveDate, viewport_width: f64) -> f64 {
        if let Some(adjustment) = self.scroll.pending() {
            debug!("event=scroll_settle adjustment={:?}", adjustment);
        }
        let layout = Layout::new(&self.window, self.unit_width());
        self.scroll.settle(&layout, today, viewport_width)
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll.offset()
    }

    pub fn show_now_marker(&self) -> bool {
        self.show_now_marker
    }

    pub fn toggle_now_marker(&mut self) -> bool {
        self.show_now_marker = !self.show_now_marker;
        self.show_now_marker
    }

    /// Marker position, or `None` when hidden or outside the window.
    pub fn now_marker(&self, now: NaiveDateTime) -> Option<f64> {
        if !self.show_now_marker {
            return None;
        }
        self.layout().now_marker_offset(now)
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    /// Opens the form for a new task in the unit starting at `unit`.
    pub fn open_for_cell(&mut self, lane_id: &str, unit: NaiveDate) -> Result<OpenRequest, ScheduleError> {
        if self.store.find_lane(lane_id).is_none() {
            return Err(ScheduleError::UnknownLane(lane_id.to_string()));
        }
        let end = self.granularity().unit_end(unit);
        let request = OpenRequest {
            lane_id: Some(lane_id.to_string()),
            task_id: None,
            name: None,
            status: None,
            start_date: Some(format_date(unit)),
            end_date: Some(format_date(end)),
            existing_ranges_in_lane: self.existing_ranges(lane_id),
        };
        self.form.open(request.clone());
        Ok(request)
    }

    /// Opens the form prefilled with an existing task.
    pub fn open_for_task(&mut self, task_id: &str) -> Result<OpenRequest, ScheduleError> {
        let task = self
            .store
            .get(task_id)
            .ok_or_else(|| ScheduleError::TaskNotFound(task_id.to_string()))?;
        let request = OpenRequest {
            lane_id: Some(task.lane_id.clone()),
            task_id: Some(task.id.clone()),
            name: Some(task.name.clone()),
            status: Some(task.status),
            start_date: Some(format_date(task.start_date)),
            end_date: Some(format_date(task.end_date)),
            existing_ranges_in_lane: self.existing_ranges(&task.lane_id),
        };
        self.form.open(request.clone());
        Ok(request)
    }

    /// Validates and commits a submit. On failure the form stays open with
    /// the error attached and nothing is written.
    pub fn submit(&mut self, request: SubmitRequest) -> Result<Task, ScheduleError> {
        let result = request.to_draft().and_then(|draft| match &request.task_id {
            Some(id) => self.store.replace(id, draft),
            None => self.store.create(draft),
        });
        match &result {
            Ok(_) => self.form.close(),
            Err(err) => {
                warn!("event=submit_rejected lane={} reason={}", request.lane_id, err);
                if self.form.is_open() {
                    let overlap = matches!(err, ScheduleError::Overlap { .. });
                    self.form.set_error(err.to_string(), overlap);
                }
            }
        }
        result
    }

    pub fn close_form(&mut self) {
        self.form.close();
    }

    fn existing_ranges(&self, lane_id: &str) -> Vec<ExistingRange> {
        self.store
            .list_by_lane(lane_id)
            .into_iter()
            .map(ExistingRange::from_task)
            .collect()
    }
}
