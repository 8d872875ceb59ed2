use crate::calendar::Granularity;
use crate::cli::Cli;
use crate::config::{load_config, Config};
use crate::logging::{default_log_dir, default_log_level, init_logging};
use crate::model::{format_date, parse_date, Task, TaskDraft, TaskStatus};
use crate::planner::Planner;
use crate::storage::{build_store, init_project_seed, load_seed, locate_seed, SeedSource};
use crate::store::TaskStore;
use crate::ui;
use anyhow::{bail, Result};
use chrono::{Local, NaiveDateTime};
use log::info;
use std::env;

/// Config and seed data for the commands that read tasks.
pub struct Context {
    pub config: Config,
    pub source: SeedSource,
    pub store: TaskStore,
}

/// Loads the config and starts logging. Every command needs both.
pub fn prepare(args: &Cli) -> Result<Config> {
    let config = load_config(args.config.as_deref())?;
    let level = args
        .log_level
        .clone()
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| default_log_level().to_string());
    init_logging(&level, &default_log_dir()?)?;
    info!("event=config_load default_view={}", config.default_view);
    Ok(config)
}

impl Context {
    pub fn load(args: &Cli, config: Config) -> Result<Self> {
        let cwd = env::current_dir()?;
        let explicit = args.seed.as_deref().or(config.seed.as_deref());
        let source = locate_seed(explicit, &cwd)?;
        let store = build_store(load_seed(&source)?);
        Ok(Context {
            config,
            source,
            store,
        })
    }
}

pub fn init(force: bool) -> Result<()> {
    let path = init_project_seed(&env::current_dir()?, force)?;
    println!("Wrote seed data to {}", path.display());
    Ok(())
}

pub fn lanes(ctx: &Context, lane: Option<String>, status: Option<String>) -> Result<()> {
    let status = match status {
        Some(raw) => match TaskStatus::parse(&raw) {
            Some(s) => Some(s),
            None => bail!("unknown status {}", raw),
        },
        None => None,
    };
    println!("Seed: {}", ctx.source);
    if ctx.store.is_empty() {
        println!("No tasks scheduled");
    }
    let mut shown = 0;
    for l in ctx.store.lanes() {
        if let Some(ref filter) = lane {
            if &l.id != filter {
                continue;
            }
        }
        shown += 1;
        println!("{} [{}]", l.name, l.id);
        let tasks: Vec<&Task> = ctx
            .store
            .list_by_lane(&l.id)
            .into_iter()
            .filter(|t| status.map_or(true, |s| t.status == s))
            .collect();
        if tasks.is_empty() {
            println!("  (empty)");
        }
        for task in tasks {
            print_task(task);
        }
        println!();
    }
    if let (Some(filter), 0) = (lane, shown) {
        bail!("lane {} not found", filter);
    }
    Ok(())
}

pub fn layout(ctx: &Context, view: Option<Granularity>, viewport: f64) -> Result<()> {
    let now = now();
    let today = now.date();
    let mut planner = Planner::new(ctx.store.clone(), &ctx.config, today);
    if let Some(view) = view {
        planner.set_granularity(view, today);
    }
    let offset = planner.settle(today, viewport);
    let layout = planner.layout();
    let window = planner.window();

    println!(
        "View {} ({} units of {} from {} to {})",
        window.granularity(),
        layout.units().len(),
        layout.unit_width(),
        format_date(window.start()),
        format_date(window.end())
    );
    println!("Content width {}", layout.content_width());
    match layout.now_marker_offset(now) {
        Some(x) => println!("Now marker at {:.1}", x),
        None => println!("Now marker outside window"),
    }
    println!("Initial scroll offset {:.1} (viewport {})", offset, viewport);
    println!();
    for lane in planner.store().lanes() {
        println!("{} [{}]", lane.name, lane.id);
        for task in planner.store().list_by_lane(&lane.id) {
            let bar = match layout.bar(task) {
                Some(bar) => format!("bar {:.1}+{:.1}", bar.offset, bar.width),
                None => "outside window".to_string(),
            };
            println!(
                "  - {}: padding {:.2} length {:.2}  {}",
                task.id,
                layout.padding(task, today),
                layout.length(task),
                bar
            );
        }
    }
    Ok(())
}

pub fn check(
    ctx: &Context,
    lane: String,
    start: String,
    end: String,
    task: Option<String>,
) -> Result<()> {
    let draft = TaskDraft {
        lane_id: lane,
        name: String::new(),
        status: TaskStatus::Open,
        start_date: parse_date(&start)?,
        end_date: parse_date(&end)?,
    };
    draft.ensure_range()?;
    if ctx.store.find_lane(&draft.lane_id).is_none() {
        bail!("lane {} not found", draft.lane_id);
    }
    if let Some(conflict) = ctx.store.conflict_for(&draft, task.as_deref()) {
        print_task(conflict);
        bail!(
            "{} to {} overlaps {} in {}",
            start.trim(),
            end.trim(),
            conflict.id,
            draft.lane_id
        );
    }
    println!(
        "{} to {} fits in {}",
        format_date(draft.start_date),
        format_date(draft.end_date),
        draft.lane_id
    );
    Ok(())
}

pub fn tui(ctx: Context) -> Result<()> {
    let planner = Planner::new(ctx.store, &ctx.config, now().date());
    ui::run(planner, ctx.source)
}

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn print_task(task: &Task) {
    println!("  - {}: {}", task.id, task.name);
    println!(
        "    {} .. {}  {}",
        format_date(task.start_date),
        format_date(task.end_date),
        task.status
    );
}
