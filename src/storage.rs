use crate::config::project_dirs;
use crate::model::{parse_date, Lane, Task, TaskStatus};
use crate::store::TaskStore;
use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const PROJECT_SEED: &str = ".workcal/seed.yml";

/// Initial lanes and tasks, as found in a seed file.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Seed {
    pub lanes: Vec<Lane>,
    #[serde(default)]
    pub tasks: Vec<SeedTask>,
}

/// Dates stay strings here so one bad record does not reject the file.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SeedTask {
    pub id: String,
    pub lane_id: String,
    pub name: String,
    pub status: TaskStatus,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSource {
    File(PathBuf),
    BuiltIn,
}

impl std::fmt::Display for SeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedSource::File(path) => write!(f, "{}", path.display()),
            SeedSource::BuiltIn => f.write_str("built-in demo data"),
        }
    }
}

/// Writes the demo seed to `<dir>/.workcal/seed.yml`. The existing file is
/// never read, so `force` also replaces one that no longer parses.
pub fn init_project_seed(dir: &Path, force: bool) -> Result<PathBuf> {
    let path = dir.join(PROJECT_SEED);
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    save_seed(&path, &demo_seed())?;
    Ok(path)
}

/// Resolves the seed to use: an explicit path, the nearest project seed,
/// the global seed, or the built-in demo data.
pub fn locate_seed(explicit: Option<&Path>, start: &Path) -> Result<SeedSource> {
    if let Some(path) = explicit {
        return Ok(SeedSource::File(path.to_path_buf()));
    }
    if let Some(path) = find_project_seed(start) {
        return Ok(SeedSource::File(path));
    }
    let global = project_dirs()?.data_dir().join("seed.yml");
    if global.exists() {
        return Ok(SeedSource::File(global));
    }
    Ok(SeedSource::BuiltIn)
}

pub fn load_seed(source: &SeedSource) -> Result<Seed> {
    match source {
        SeedSource::File(path) => {
            let data =
                fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
            let seed: Seed = serde_yaml::from_str(&data)
                .with_context(|| format!("parsing seed file {:?}", path))?;
            Ok(seed)
        }
        SeedSource::BuiltIn => Ok(demo_seed()),
    }
}

pub fn save_seed(path: &Path, seed: &Seed) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let serialized = serde_yaml::to_string(seed).context("serializing seed")?;
    fs::write(path, serialized).with_context(|| format!("writing {:?}", path))?;
    Ok(())
}

/// Builds the store from a seed. Records that cannot be placed are logged
/// and skipped.
pub fn build_store(seed: Seed) -> TaskStore {
    let mut store = TaskStore::new(seed.lanes);
    let mut skipped = 0usize;
    for record in seed.tasks {
        let id = record.id.clone();
        let result = to_task(record).and_then(|task| store.insert_seeded(task).map_err(Into::into));
        if let Err(err) = result {
            warn!("event=seed_skip id={} reason={}", id, err);
            skipped += 1;
        }
    }
    info!(
        "event=seed_load lanes={} tasks={} skipped={}",
        store.lanes().len(),
        store.len(),
        skipped
    );
    store
}

fn to_task(record: SeedTask) -> Result<Task> {
    Ok(Task {
        start_date: parse_date(&record.start_date)?,
        end_date: parse_date(&record.end_date)?,
        id: record.id,
        lane_id: record.lane_id,
        name: record.name,
        status: record.status,
    })
}

fn find_project_seed(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(PROJECT_SEED);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}

pub fn demo_seed() -> Seed {
    let lane = |id: &str, name: &str| Lane {
        id: id.into(),
        name: name.into(),
    };
    let task = |id: &str, lane_id: &str, name: &str, status, start: &str, end: &str| SeedTask {
        id: id.into(),
        lane_id: lane_id.into(),
        name: name.into(),
        status,
        start_date: start.into(),
        end_date: end.into(),
    };
    Seed {
        lanes: vec![
            lane("wc-assembly", "Assembly Line"),
            lane("wc-packaging", "Packaging"),
            lane("wc-quality", "Quality Control"),
            lane("wc-maintenance", "Maintenance"),
            lane("wc-logistics", "Logistics"),
        ],
        tasks: vec![
            task("wo-001", "wc-assembly", "Long-Term Assembly Phase 1", TaskStatus::Open, "2025-07-01", "2026-01-15"),
            task("wo-002", "wc-assembly", "Long-Term Assembly Phase 2", TaskStatus::InProgress, "2026-01-20", "2026-08-30"),
            task("wo-003", "wc-packaging", "Extended Packaging Program", TaskStatus::Complete, "2025-09-10", "2026-06-05"),
            task("wo-004", "wc-packaging", "Export Packaging Hold", TaskStatus::Blocked, "2026-06-10", "2026-10-20"),
            task("wo-005", "wc-quality", "Ongoing Quality Audits", TaskStatus::InProgress, "2025-08-01", "2026-03-31"),
            task("wo-006", "wc-maintenance", "Preventive Maintenance Cycle", TaskStatus::Open, "2025-12-15", "2026-07-15"),
            task("wo-007", "wc-maintenance", "Critical Equipment Overhaul", TaskStatus::Complete, "2025-06-20", "2025-11-05"),
            task("wo-008", "wc-logistics", "Long-Term Logistics Optimization", TaskStatus::Blocked, "2026-02-01", "2026-11-30"),
        ],
    }
}
