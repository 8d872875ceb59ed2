use crate::calendar::Granularity;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Display units per timeline column, per view.
    pub unit_widths: UnitWidths,
    /// Distance from either edge, in display units, that grows the window.
    pub edge_threshold: f64,
    pub default_view: Granularity,
    pub show_now_marker: bool,
    pub log_level: Option<String>,
    /// Seed file to load instead of the discovered one.
    pub seed: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UnitWidths {
    pub day: f64,
    pub week: f64,
    pub month: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            unit_widths: UnitWidths::default(),
            edge_threshold: 300.0,
            default_view: Granularity::Day,
            show_now_marker: true,
            log_level: None,
            seed: None,
        }
    }
}

impl Default for UnitWidths {
    fn default() -> Self {
        UnitWidths {
            day: 80.0,
            week: 100.0,
            month: 120.0,
        }
    }
}

impl Config {
    /// Widths must be positive and the edge threshold non-negative.
    pub fn validate(&self) -> Result<()> {
        for g in Granularity::ALL {
            let width = self.unit_widths.for_granularity(g);
            if !(width.is_finite() && width > 0.0) {
                anyhow::bail!("unit_widths.{} must be a positive number, got {}", g, width);
            }
        }
        if !(self.edge_threshold.is_finite() && self.edge_threshold >= 0.0) {
            anyhow::bail!(
                "edge_threshold must be zero or more, got {}",
                self.edge_threshold
            );
        }
        Ok(())
    }
}

impl UnitWidths {
    pub fn for_granularity(&self, granularity: Granularity) -> f64 {
        match granularity {
            Granularity::Day => self.day,
            Granularity::Week => self.week,
            Granularity::Month => self.month,
        }
    }
}

pub fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "workcal").context("locating workcal directories")
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.yml"))
}

/// Loads `explicit` if given, else the platform config file. A missing file
/// means defaults; an explicit path that does not exist is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("config file not found: {}", p.display());
            }
            p.to_path_buf()
        }
        None => {
            let p = default_config_path()?;
            if !p.exists() {
                return Ok(Config::default());
            }
            p
        }
    };
    read_config(&path)
}

fn read_config(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    if data.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config =
        serde_yaml::from_str(&data).with_context(|| format!("parsing config {:?}", path))?;
    config
        .validate()
        .with_context(|| format!("invalid config {:?}", path))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let c = Config::default();
        assert_eq!(c.unit_widths.for_granularity(Granularity::Day), 80.0);
        assert_eq!(c.unit_widths.for_granularity(Granularity::Week), 100.0);
        assert_eq!(c.unit_widths.for_granularity(Granularity::Month), 120.0);
        assert_eq!(c.edge_threshold, 300.0);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_view: week\nunit_widths:\n  month: 150").unwrap();
        let c = load_config(Some(file.path())).unwrap();
        assert_eq!(c.default_view, Granularity::Week);
        assert_eq!(c.unit_widths.month, 150.0);
        assert_eq!(c.unit_widths.day, 80.0);
        assert!(c.show_now_marker);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "edge_threshold: [nope").unwrap();
        assert!(load_config(Some(file.path())).is_err());
    }

    #[test]
    fn test_non_positive_widths_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "unit_widths:\n  day: 0").unwrap();
        let err = load_config(Some(file.path())).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("invalid config"));
        assert!(message.contains("unit_widths.day"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "edge_threshold: -5").unwrap();
        assert!(load_config(Some(file.path())).is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.yml");
        assert!(load_config(Some(missing.as_path())).is_err());
    }
}
