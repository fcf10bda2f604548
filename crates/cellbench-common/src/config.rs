//! ---
//! cb_section: "01-core-functionality"
//! cb_subsection: "module"
//! cb_type: "source"
//! cb_scope: "code"
//! cb_description: "Bench configuration loading and validation."
//! cb_version: "v0.1.0"
//! cb_owner: "tbd"
//! ---
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use cellbench_sim::{cell_key, Chemistry, TaskProfile};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use tracing::debug;

use crate::logging::LogFormat;

fn default_bench_name() -> String {
    "Test Bench Alpha".to_owned()
}

fn default_group() -> u32 {
    1
}

fn default_cell_count() -> usize {
    1
}

fn default_random_seed() -> u64 {
    0xCE11_BE4Cu64
}

fn default_tick_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_ticks() -> u64 {
    60
}

fn default_history_capacity() -> usize {
    500
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_write_file() -> bool {
    true
}

/// Primary configuration object for a test bench run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BenchConfig {
    #[serde(default)]
    pub bench: BenchSection,
    #[serde(default)]
    pub cells: Vec<CellGroupConfig>,
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Metadata describing where a [`BenchConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedBenchConfig {
    pub config: BenchConfig,
    pub source: PathBuf,
}

impl BenchConfig {
    pub const ENV_CONFIG_PATH: &'static str = "CELLBENCH_CONFIG";

    /// Load configuration from disk, respecting the `CELLBENCH_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedBenchConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(LoadedBenchConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(&path)?;
                return Ok(LoadedBenchConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<BenchConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Identifiers the registry will assign to the configured cell groups, in order.
    pub fn planned_cell_ids(&self) -> Vec<String> {
        self.cells
            .iter()
            .flat_map(|group| std::iter::repeat(group.chemistry).take(group.count))
            .enumerate()
            .map(|(idx, chemistry)| cell_key(idx + 1, chemistry))
            .collect()
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        if self.bench.name.trim().is_empty() {
            return Err(anyhow!("bench name cannot be empty"));
        }
        if self.cells.is_empty() {
            return Err(anyhow!("configuration must declare at least one cell group"));
        }
        for (idx, group) in self.cells.iter().enumerate() {
            if group.count == 0 {
                return Err(anyhow!(
                    "cell group {} ({}) must contain at least one cell",
                    idx + 1,
                    group.chemistry
                ));
            }
        }

        let planned: HashSet<String> = self.planned_cell_ids().into_iter().collect();
        let mut bound = HashSet::new();
        for (idx, task) in self.tasks.iter().enumerate() {
            task.profile
                .validate()
                .with_context(|| format!("task {} has invalid parameters", idx + 1))?;
            if task.duration_secs == Some(0) {
                return Err(anyhow!("task {} duration must be greater than zero", idx + 1));
            }
            for cell in &task.cells {
                if !planned.contains(cell) {
                    return Err(anyhow!(
                        "task {} is bound to unknown cell '{}'",
                        idx + 1,
                        cell
                    ));
                }
                if !bound.insert(cell.as_str()) {
                    return Err(anyhow!("cell '{}' is bound to more than one task", cell));
                }
            }
        }

        self.simulation.validate()?;
        Ok(())
    }
}

impl std::str::FromStr for BenchConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: BenchConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchSection {
    #[serde(default = "default_bench_name")]
    pub name: String,
    #[serde(default = "default_group")]
    pub group: u32,
}

impl Default for BenchSection {
    fn default() -> Self {
        Self {
            name: default_bench_name(),
            group: default_group(),
        }
    }
}

/// A run of identical cells added to the bench.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellGroupConfig {
    pub chemistry: Chemistry,
    #[serde(default = "default_cell_count")]
    pub count: usize,
}

/// A task created at bench start-up, with its cell bindings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    #[serde(flatten)]
    pub profile: TaskProfile,
    #[serde(default)]
    pub duration_secs: Option<u64>,
    #[serde(default)]
    pub capacity_ah: Option<f64>,
    #[serde(default)]
    pub cells: Vec<String>,
    #[serde(default)]
    pub autostart: bool,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,
    #[serde(default = "default_tick_interval", rename = "tick_interval_secs")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub tick_interval: Duration,
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval.is_zero() {
            return Err(anyhow!("simulation tick_interval_secs must be greater than zero"));
        }
        if self.history_capacity == 0 {
            return Err(anyhow!("simulation history_capacity must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            random_seed: default_random_seed(),
            tick_interval: default_tick_interval(),
            ticks: default_ticks(),
            history_capacity: default_history_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
    #[serde(default = "default_write_file")]
    pub write_file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
            write_file: default_write_file(),
        }
    }
}
