use crate::calendar::Granularity;
use crate::commands::now;
use crate::form::SubmitRequest;
use crate::model::{format_date, Lane, Task, TaskStatus};
use crate::planner::Planner;
use crate::storage::SeedSource;
use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::Duration;

/// Display units covered by one terminal cell.
const DISPLAY_UNITS_PER_CELL: f64 = 10.0;
const LANE_PANEL_WIDTH: u16 = 24;
const PAGE_UNITS: i64 = 7;

pub fn run(planner: Planner, source: SeedSource) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(planner, source);
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct App {
    planner: Planner,
    source: SeedSource,
    selected_lane: usize,
    selected_task: usize,
    cursor: NaiveDate,
    viewport_width: f64,
    status: String,
    mode: Mode,
}

enum Mode {
    Normal,
    Form(TaskForm),
}

struct TaskForm {
    task_id: Option<String>,
    lane_id: String,
    name: FieldValue,
    status: TaskStatus,
    start: FieldValue,
    end: FieldValue,
    field: FormField,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum FormField {
    Name,
    Status,
    Start,
    End,
}

#[derive(Clone)]
struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = prev_grapheme(self.cursor, &self.value);
    }

    fn move_right(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        self.cursor = next_grapheme(self.cursor, &self.value);
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_grapheme(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }
}

impl App {
    fn new(planner: Planner, source: SeedSource) -> Self {
        let status = format!(
            "Loaded {} lanes and {} tasks from {}",
            planner.store().lanes().len(),
            planner.store().len(),
            source
        );
        let cursor = planner.granularity().start_of(now().date());
        App {
            planner,
            source,
            selected_lane: 0,
            selected_task: 0,
            cursor,
            viewport_width: 0.0,
            status,
            mode: Mode::Normal,
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            // deferred scroll work runs against what was just drawn
            if self.after_render() {
                continue;
            }
            if event::poll(Duration::from_millis(200))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Returns true when the scroll offset moved and a redraw is due.
    fn after_render(&mut self) -> bool {
        let before = self.planner.scroll_offset();
        let after = self.planner.settle(now().date(), self.viewport_width);
        (after - before).abs() > f64::EPSILON
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Form(_) => {
                self.handle_form_key(key);
                Ok(false)
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('d') => self.set_view(Granularity::Day),
            KeyCode::Char('w') => self.set_view(Granularity::Week),
            KeyCode::Char('m') => self.set_view(Granularity::Month),
            KeyCode::Char('v') => {
                let all = Granularity::ALL;
                let idx = all
                    .iter()
                    .position(|g| *g == self.planner.granularity())
                    .unwrap_or(0);
                self.set_view(all[(idx + 1) % all.len()]);
            }
            KeyCode::Char('t') => {
                let shown = self.planner.toggle_now_marker();
                self.status = format!("Now marker {}", if shown { "shown" } else { "hidden" });
            }
            KeyCode::Char('.') => {
                self.cursor = self.planner.granularity().start_of(now().date());
                self.planner.recenter();
                self.status = "Centered on today".into();
            }
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(1),
            KeyCode::Char('H') => self.move_cursor(-PAGE_UNITS),
            KeyCode::Char('L') => self.move_cursor(PAGE_UNITS),
            KeyCode::Up | KeyCode::Char('k') => self.select_lane(-1),
            KeyCode::Down | KeyCode::Char('j') => self.select_lane(1),
            KeyCode::Char('[') => self.select_task(-1),
            KeyCode::Char(']') => self.select_task(1),
            KeyCode::Char('n') | KeyCode::Enter => self.open_new(),
            KeyCode::Char('e') => self.open_edit(),
            _ => {}
        }
        Ok(false)
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        let close_form = match &mut mode {
            Mode::Form(form) => self.process_form_key(form, key),
            Mode::Normal => true,
        };
        if close_form {
            self.planner.close_form();
        } else {
            self.mode = mode;
        }
    }

    fn process_form_key(&mut self, form: &mut TaskForm, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => {
                self.status = "Canceled".into();
                return true;
            }
            KeyCode::Enter => return self.try_submit(form),
            KeyCode::Tab => form.next_field(),
            KeyCode::BackTab => form.prev_field(),
            KeyCode::Left if form.field == FormField::Status => form.cycle_status(-1),
            KeyCode::Right if form.field == FormField::Status => form.cycle_status(1),
            KeyCode::Left => {
                if let Some(field) = form.active_field_mut() {
                    field.move_left();
                }
            }
            KeyCode::Right => {
                if let Some(field) = form.active_field_mut() {
                    field.move_right();
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = form.active_field_mut() {
                    field.backspace();
                }
            }
            KeyCode::Char(c) => {
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    if let Some(field) = form.active_field_mut() {
                        field.insert_char(c);
                    }
                }
            }
            _ => {}
        }
        self.planner
            .form_mut()
            .check(&form.start.value, &form.end.value);
        false
    }

    fn try_submit(&mut self, form: &TaskForm) -> bool {
        if form.name.value.trim().is_empty() {
            self.status = "Name is required".into();
            return false;
        }
        if self.planner.form().has_overlap() {
            self.status = "Resolve the overlap before saving".into();
            return false;
        }
        let request = SubmitRequest {
            task_id: form.task_id.clone(),
            lane_id: form.lane_id.clone(),
            name: form.name.value.clone(),
            status: form.status,
            start_date: form.start.value.clone(),
            end_date: form.end.value.clone(),
        };
        match self.planner.submit(request) {
            Ok(task) => {
                self.status = format!("Saved {} ({})", task.name, task.id);
                self.cursor = self.planner.granularity().start_of(task.start_date);
                self.ensure_cursor_visible();
                true
            }
            Err(err) => {
                self.status = format!("Could not save: {}", err);
                false
            }
        }
    }

    fn set_view(&mut self, granularity: Granularity) {
        let today = now().date();
        self.planner.set_granularity(granularity, today);
        self.cursor = granularity.start_of(today);
        self.status = format!("Switched to {} view", granularity);
    }

    fn move_cursor(&mut self, delta: i64) {
        let granularity = self.planner.granularity();
        let window = self.planner.window();
        let moved = granularity.step(self.cursor, delta);
        self.cursor = moved.clamp(window.start(), window.end());
        self.ensure_cursor_visible();
    }

    /// Scrolls so the cursor unit is on screen, then reports the new
    /// position; the window grows when that lands near an edge.
    fn ensure_cursor_visible(&mut self) {
        let offset = {
            let layout = self.planner.layout();
            let Some(index) = layout.unit_index(self.cursor) else {
                return;
            };
            let width = layout.unit_width();
            let left = index as f64 * width;
            let current = self.planner.scroll_offset();
            if left < current {
                left
            } else if left + width > current + self.viewport_width {
                left + width - self.viewport_width
            } else {
                current
            }
        };
        let growth = self.planner.on_scroll(offset, self.viewport_width);
        if growth.backward || growth.forward {
            let window = self.planner.window();
            self.status = format!(
                "Timeline now {} to {}",
                format_date(window.start()),
                format_date(window.end())
            );
        }
    }

    fn select_lane(&mut self, delta: isize) {
        let count = self.planner.store().lanes().len();
        if count == 0 {
            return;
        }
        let next = (self.selected_lane as isize + delta).rem_euclid(count as isize);
        self.selected_lane = next as usize;
        self.selected_task = 0;
    }

    fn select_task(&mut self, delta: isize) {
        let Some(lane) = self.current_lane() else {
            return;
        };
        let count = self.planner.store().list_by_lane(&lane.id).len();
        if count == 0 {
            self.status = "No tasks in this lane".into();
            return;
        }
        let next = (self.selected_task as isize + delta).rem_euclid(count as isize);
        self.selected_task = next as usize;
        if let Some(start) = self.current_task().map(|t| t.start_date) {
            let granularity = self.planner.granularity();
            let window = self.planner.window();
            if window.contains(start) {
                self.cursor = granularity.start_of(start);
                self.ensure_cursor_visible();
            }
        }
    }

    fn open_new(&mut self) {
        let Some(lane_id) = self.current_lane().map(|l| l.id.clone()) else {
            return;
        };
        match self.planner.open_for_cell(&lane_id, self.cursor) {
            Ok(request) => {
                self.mode = Mode::Form(TaskForm {
                    task_id: None,
                    lane_id,
                    name: FieldValue::new(""),
                    status: TaskStatus::Open,
                    start: FieldValue::new(request.start_date.as_deref().unwrap_or_default()),
                    end: FieldValue::new(request.end_date.as_deref().unwrap_or_default()),
                    field: FormField::Name,
                });
                self.status = "New work order (Tab moves, Enter saves, Esc cancels)".into();
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    fn open_edit(&mut self) {
        let Some(task_id) = self.current_task().map(|t| t.id.clone()) else {
            self.status = "No task selected to edit".into();
            return;
        };
        match self.planner.open_for_task(&task_id) {
            Ok(request) => {
                self.mode = Mode::Form(TaskForm {
                    task_id: request.task_id.clone(),
                    lane_id: request.lane_id.clone().unwrap_or_default(),
                    name: FieldValue::new(request.name.as_deref().unwrap_or_default()),
                    status: request.status.unwrap_or(TaskStatus::Open),
                    start: FieldValue::new(request.start_date.as_deref().unwrap_or_default()),
                    end: FieldValue::new(request.end_date.as_deref().unwrap_or_default()),
                    field: FormField::Name,
                });
                self.status = format!("Editing {}", task_id);
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    fn current_lane(&self) -> Option<&Lane> {
        self.planner.store().lanes().get(self.selected_lane)
    }

    fn current_task(&self) -> Option<&Task> {
        let lane = self.current_lane()?;
        self.planner
            .store()
            .list_by_lane(&lane.id)
            .get(self.selected_task)
            .copied()
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(f.size());

        self.draw_header(f, layout[0]);
        self.draw_timeline(f, layout[1]);
        self.draw_footer(f, layout[2]);

        if let Mode::Form(form) = &self.mode {
            self.draw_form(f, form);
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let marker = if self.planner.show_now_marker() {
            "now on"
        } else {
            "now off"
        };
        let title = Line::from(vec![
            Span::styled(
                "workcal ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                self.source.to_string(),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("view {}", self.planner.granularity()),
                Style::default().fg(Color::Magenta),
            ),
            Span::raw("  •  "),
            Span::styled(
                self.planner.granularity().format(self.cursor),
                Style::default().fg(Color::Green),
            ),
            Span::raw("  •  "),
            Span::styled(marker, Style::default().fg(Color::Gray)),
        ]);

        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(title)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_timeline(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title("Work centers");
        let inner = block.inner(area);
        f.render_widget(block, area);

        let cols = inner.width.saturating_sub(LANE_PANEL_WIDTH) as usize;
        self.viewport_width = cols as f64 * DISPLAY_UNITS_PER_CELL;
        let lines = self.timeline_lines(cols, now());
        f.render_widget(Paragraph::new(lines), inner);
    }

    fn timeline_lines(&self, cols: usize, now: NaiveDateTime) -> Vec<Line<'static>> {
        let layout = self.planner.layout();
        let granularity = layout.granularity();
        let units = layout.units();
        let width = layout.unit_width();
        let offset = self.planner.scroll_offset();

        // unit index under each terminal column
        let column_units: Vec<Option<usize>> = (0..cols)
            .map(|x| {
                let position = offset + x as f64 * DISPLAY_UNITS_PER_CELL;
                let index = (position / width).floor() as usize;
                (index < units.len()).then_some(index)
            })
            .collect();
        let starts_unit =
            |x: usize| x == 0 || column_units[x] != column_units[x - 1];
        let marker_col = self.planner.now_marker(now).and_then(|x| {
            let col = (x - offset) / DISPLAY_UNITS_PER_CELL;
            (col >= 0.0 && (col as usize) < cols).then_some(col as usize)
        });

        let mut header: Vec<char> = vec![' '; cols];
        for x in 0..cols {
            let Some(index) = column_units[x] else {
                continue;
            };
            if !starts_unit(x) {
                continue;
            }
            for (i, ch) in short_label(units[index], granularity).chars().enumerate() {
                let at = x + i;
                if at >= cols || (i > 0 && starts_unit(at)) {
                    break;
                }
                header[at] = ch;
            }
        }
        let mut lines = vec![
            Line::from(vec![
                Span::raw(" ".repeat(LANE_PANEL_WIDTH as usize)),
                Span::styled(
                    header.into_iter().collect::<String>(),
                    Style::default().fg(Color::Gray),
                ),
            ]),
            Line::from(""),
        ];

        let selected_task = self.current_task().map(|t| t.id.clone());
        for (lane_idx, lane) in self.planner.store().lanes().iter().enumerate() {
            let selected_lane = lane_idx == self.selected_lane;
            let label = format!(
                "{} {}",
                if selected_lane { ">" } else { " " },
                truncate_text(&lane.name, LANE_PANEL_WIDTH as usize - 3)
            );
            let mut spans = vec![Span::styled(
                format!("{:width$}", label, width = LANE_PANEL_WIDTH as usize),
                if selected_lane {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                },
            )];

            let mut last_unit = None;
            let mut cell: Option<(TaskStatus, bool)> = None;
            for x in 0..cols {
                let Some(index) = column_units[x] else {
                    spans.push(Span::raw(" "));
                    continue;
                };
                if last_unit != Some(index) {
                    let tasks = self
                        .planner
                        .store()
                        .list_in_cell(&lane.id, units[index], granularity);
                    let chosen = tasks
                        .iter()
                        .find(|t| Some(&t.id) == selected_task.as_ref())
                        .or_else(|| tasks.first());
                    cell = chosen.map(|t| (t.status, Some(&t.id) == selected_task.as_ref()));
                    last_unit = Some(index);
                }
                let is_cursor = selected_lane && units[index] == self.cursor;
                let (ch, mut style) = if marker_col == Some(x) {
                    ("│", Style::default().fg(Color::LightRed))
                } else if let Some((status, selected)) = cell {
                    let style = Style::default().fg(status_color(status));
                    if selected {
                        ("▓", style.add_modifier(Modifier::BOLD))
                    } else {
                        ("█", style)
                    }
                } else if starts_unit(x) {
                    ("·", Style::default().fg(Color::DarkGray))
                } else {
                    (" ", Style::default())
                };
                if is_cursor {
                    style = style.bg(Color::DarkGray);
                }
                spans.push(Span::styled(ch, style));
            }
            lines.push(Line::from(spans));
            lines.push(Line::from(""));
        }
        lines
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2)])
            .split(area);

        let help_bar = Paragraph::new(footer_help_line())
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(help_bar, rows[0]);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);

        let status = Paragraph::new(self.status.clone())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(status, bottom[0]);

        let detail = Paragraph::new(self.detail_line())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title("Selected"),
            );
        f.render_widget(detail, bottom[1]);
    }

    fn detail_line(&self) -> Line<'static> {
        let Some(task) = self.current_task() else {
            return Line::from(Span::styled(
                "(no task)",
                Style::default().fg(Color::DarkGray),
            ));
        };
        let layout = self.planner.layout();
        Line::from(vec![
            Span::styled(
                task.name.clone(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                task.status.label(),
                Style::default().fg(status_color(task.status)),
            ),
            Span::raw("  "),
            Span::raw(format!(
                "{} .. {}",
                format_date(task.start_date),
                format_date(task.end_date)
            )),
            Span::styled(
                format!(
                    "  length {:.2} {}s, starts in {:.2}",
                    layout.length(task),
                    layout.granularity(),
                    layout.padding(task, now().date())
                ),
                Style::default().fg(Color::Gray),
            ),
        ])
    }

    fn draw_form(&self, f: &mut ratatui::Frame<'_>, form: &TaskForm) {
        let area = centered_rect(60, 50, f.size());
        let title = if form.task_id.is_some() {
            "Edit Work Order"
        } else {
            "Add Work Order"
        };
        let lane_name = self
            .planner
            .store()
            .find_lane(&form.lane_id)
            .map(|l| l.name.clone())
            .unwrap_or_else(|| form.lane_id.clone());
        let mut fields = vec![Line::from(vec![
            Span::styled(
                "Work center: ",
                Style::default()
                    .fg(Color::Gray)
                    .add_modifier(Modifier::BOLD | Modifier::DIM),
            ),
            Span::raw(lane_name),
        ])];
        fields.push(field_line("Name", &form.name, form.field == FormField::Name));
        fields.push(Line::from(vec![
            Span::styled(
                "Status: ",
                Style::default()
                    .fg(Color::Gray)
                    .add_modifier(Modifier::BOLD | Modifier::DIM),
            ),
            Span::styled(
                format!("< {} >", form.status.label()),
                Style::default().fg(if form.field == FormField::Status {
                    Color::Cyan
                } else {
                    status_color(form.status)
                }),
            ),
        ]));
        fields.push(field_line(
            "Start (YYYY-MM-DD)",
            &form.start,
            form.field == FormField::Start,
        ));
        fields.push(field_line(
            "End (YYYY-MM-DD)",
            &form.end,
            form.field == FormField::End,
        ));
        fields.push(Line::from(""));
        if let Some(error) = self.planner.form().error() {
            fields.push(Line::from(Span::styled(
                error.to_string(),
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            )));
        }
        fields.push(Line::from(Span::styled(
            "Enter to save • Esc to cancel • Tab/Shift-Tab to move • ←→ change status",
            Style::default().fg(Color::Gray),
        )));
        let dialog = Paragraph::new(fields)
            .block(
                Block::default()
                    .title(Span::styled(
                        title,
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: true });

        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }
}

impl TaskForm {
    fn next_field(&mut self) {
        self.field = match self.field {
            FormField::Name => FormField::Status,
            FormField::Status => FormField::Start,
            FormField::Start => FormField::End,
            FormField::End => FormField::Name,
        };
    }

    fn prev_field(&mut self) {
        self.field = match self.field {
            FormField::Name => FormField::End,
            FormField::Status => FormField::Name,
            FormField::Start => FormField::Status,
            FormField::End => FormField::Start,
        };
    }

    fn cycle_status(&mut self, delta: isize) {
        let all = TaskStatus::ALL;
        let idx = all.iter().position(|s| *s == self.status).unwrap_or(0) as isize;
        let next = (idx + delta).rem_euclid(all.len() as isize) as usize;
        self.status = all[next];
    }

    fn active_field_mut(&mut self) -> Option<&mut FieldValue> {
        match self.field {
            FormField::Name => Some(&mut self.name),
            FormField::Status => None,
            FormField::Start => Some(&mut self.start),
            FormField::End => Some(&mut self.end),
        }
    }
}

fn footer_help_line() -> Line<'static> {
    Line::from(vec![
        Span::styled("←→ / h l", Style::default().fg(Color::LightCyan)),
        Span::raw(" scroll  "),
        Span::styled("↑↓ / j k", Style::default().fg(Color::LightCyan)),
        Span::raw(" lane  "),
        Span::styled("[ ]", Style::default().fg(Color::LightCyan)),
        Span::raw(" task  "),
        Span::styled("d w m v", Style::default().fg(Color::LightGreen)),
        Span::raw(" view  "),
        Span::styled("t", Style::default().fg(Color::LightGreen)),
        Span::raw(" now  "),
        Span::styled(".", Style::default().fg(Color::LightGreen)),
        Span::raw(" today  "),
        Span::styled("n", Style::default().fg(Color::LightMagenta)),
        Span::raw(" new  "),
        Span::styled("e", Style::default().fg(Color::LightYellow)),
        Span::raw(" edit  "),
        Span::styled("q", Style::default().fg(Color::LightRed)),
        Span::raw(" quit"),
    ])
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Open => Color::Rgb(47, 138, 229),
        TaskStatus::Blocked => Color::Rgb(255, 193, 7),
        TaskStatus::InProgress => Color::Rgb(79, 93, 255),
        TaskStatus::Complete => Color::Rgb(40, 219, 0),
    }
}

/// Column header text; the long form is shown in the title bar.
fn short_label(unit: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Day => unit.format("%d %a").to_string(),
        Granularity::Week => unit.format("%d %b").to_string(),
        Granularity::Month => unit.format("%b %Y").to_string(),
    }
}

fn field_line(label: &str, field: &FieldValue, active: bool) -> Line<'static> {
    let label_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD | Modifier::DIM);
    let value_style = Style::default().fg(if active { Color::Cyan } else { Color::White });
    let text = if active {
        field.with_caret()
    } else {
        field.value.clone()
    };
    Line::from(vec![
        Span::styled(format!("{}: ", label), label_style),
        Span::styled(text, value_style),
    ])
}

fn prev_grapheme(cursor: usize, text: &str) -> usize {
    if cursor == 0 {
        return 0;
    }
    let mut prev = 0;
    for (idx, _) in text.char_indices() {
        if idx >= cursor {
            break;
        }
        prev = idx;
    }
    prev
}

fn next_grapheme(cursor: usize, text: &str) -> usize {
    for (idx, ch) in text.char_indices() {
        if idx > cursor {
            return idx;
        }
        if idx == cursor {
            return cursor + ch.len_utf8();
        }
    }
    text.len()
}

fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_editing() {
        let mut field = FieldValue::new("2026-01-0");
        field.insert_char('5');
        assert_eq!(field.value, "2026-01-05");
        field.move_left();
        field.backspace();
        assert_eq!(field.value, "2026-01-5");
        assert_eq!(field.with_caret(), "2026-01-▌5");
    }

    #[test]
    fn test_cycle_status_wraps() {
        let mut form = TaskForm {
            task_id: None,
            lane_id: "L1".into(),
            name: FieldValue::new(""),
            status: TaskStatus::Open,
            start: FieldValue::new(""),
            end: FieldValue::new(""),
            field: FormField::Status,
        };
        form.cycle_status(-1);
        assert_eq!(form.status, TaskStatus::Blocked);
        form.cycle_status(1);
        assert_eq!(form.status, TaskStatus::Open);
        assert!(form.active_field_mut().is_none());
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("Assembly", 10), "Assembly");
        assert_eq!(truncate_text("Quality Control Lab", 10), "Quality...");
    }

    #[test]
    fn test_short_labels() {
        let unit = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(short_label(unit, Granularity::Day), "05 Mon");
        assert_eq!(short_label(unit, Granularity::Week), "05 Jan");
    }
}
