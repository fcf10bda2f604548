//! ---
//! cb_section: "04-bench"
//! cb_subsection: "module"
//! cb_type: "source"
//! cb_scope: "code"
//! cb_description: "Test bench driver tying cells, tasks and history to the simulator."
//! cb_version: "v0.1.0"
//! cb_owner: "tbd"
//! ---
use std::time::Duration;

use cellbench_common::config::BenchConfig;
use cellbench_logging::{bench_debug, bench_info, bench_warn};
use cellbench_logging::{log_bench_event, BenchEventOutcome, LogContext};
use cellbench_sim::{step, CellStatus, Chemistry, RandomSource, SeededSource, TaskProfile};

use crate::analytics::FleetSummary;
use crate::errors::{BenchError, Result};
use crate::history::{TelemetryHistory, TelemetrySample};
use crate::registry::{CellRecord, CellRegistry};
use crate::tasks::TaskQueue;

const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Status change observed on one cell during a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusTransition {
    pub cell_id: String,
    pub from: CellStatus,
    pub to: CellStatus,
}

/// Outcome of a single bench tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    /// Cells stepped under a running task.
    pub driven: usize,
    /// Cells left untouched because no running task is bound to them.
    pub untouched: usize,
    pub transitions: Vec<StatusTransition>,
    pub completed_tasks: Vec<String>,
}

/// One bench session: the cells, the task queue, the rolling history and the
/// random source feeding the simulator.
pub struct TestBench {
    name: String,
    registry: CellRegistry,
    tasks: TaskQueue,
    history: TelemetryHistory,
    rng: Box<dyn RandomSource + Send>,
    tick: u64,
    tick_interval: Duration,
}

impl std::fmt::Debug for TestBench {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestBench")
            .field("name", &self.name)
            .field("cells", &self.registry.len())
            .field("tasks", &self.tasks.len())
            .field("tick", &self.tick)
            .field("tick_interval", &self.tick_interval)
            .finish_non_exhaustive()
    }
}

impl TestBench {
    pub fn new(name: impl Into<String>, rng: impl RandomSource + Send + 'static) -> Self {
        Self {
            name: name.into(),
            registry: CellRegistry::new(),
            tasks: TaskQueue::new(),
            history: TelemetryHistory::default(),
            rng: Box::new(rng),
            tick: 0,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history = TelemetryHistory::with_capacity(capacity);
        self
    }

    /// Build a bench from configuration, seeding the simulator from
    /// `simulation.random_seed`.
    pub fn from_config(config: &BenchConfig) -> Result<Self> {
        let rng = SeededSource::from_seed(config.simulation.random_seed);
        Self::from_config_with_rng(config, rng)
    }

    pub fn from_config_with_rng(
        config: &BenchConfig,
        rng: impl RandomSource + Send + 'static,
    ) -> Result<Self> {
        let mut bench = TestBench::new(config.bench.name.clone(), rng)
            .with_tick_interval(config.simulation.tick_interval)
            .with_history_capacity(config.simulation.history_capacity);

        for group in &config.cells {
            bench.add_cells(group.chemistry, group.count)?;
        }
        for task in &config.tasks {
            let id = bench.create_task(
                task.profile,
                task.duration_secs.map(Duration::from_secs),
                task.capacity_ah,
            )?;
            for cell in &task.cells {
                bench.assign(&id, cell)?;
            }
            if task.autostart {
                bench.tasks.start(&id)?;
            }
        }

        let ctx = LogContext::new().with_bench(&bench.name);
        log_bench_event(
            Some(&ctx),
            "bench.configured",
            &format!(
                "{} cells, {} tasks, group {}",
                bench.registry.len(),
                bench.tasks.len(),
                config.bench.group
            ),
            BenchEventOutcome::Success,
        );
        Ok(bench)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &CellRegistry {
        &self.registry
    }

    pub fn tasks(&self) -> &TaskQueue {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut TaskQueue {
        &mut self.tasks
    }

    pub fn history(&self) -> &TelemetryHistory {
        &self.history
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn add_cells(&mut self, chemistry: Chemistry, count: usize) -> Result<Vec<String>> {
        let ids = self
            .registry
            .add_cells(chemistry, count, self.rng.as_mut())?;
        bench_info!(
            context = LogContext::new().with_bench(&self.name),
            "added {} {} cell(s)",
            ids.len(),
            chemistry
        );
        Ok(ids)
    }

    /// Remove a cell and release its task binding.
    pub fn remove_cell(&mut self, id: &str) -> Result<CellRecord> {
        let record = self.registry.remove(id)?;
        self.tasks.unbind(id);
        Ok(record)
    }

    pub fn create_task(
        &mut self,
        profile: TaskProfile,
        duration: Option<Duration>,
        capacity_ah: Option<f64>,
    ) -> Result<String> {
        self.tasks.create(profile, duration, capacity_ah)
    }

    /// Bind a registered cell to a queued task.
    pub fn assign(&mut self, task: &str, cell: &str) -> Result<()> {
        if !self.registry.contains(cell) {
            return Err(BenchError::UnknownCell(cell.to_owned()));
        }
        self.tasks.assign(task, cell)
    }

    /// Jitter every cell's readings.
    pub fn randomize(&mut self) {
        self.registry.randomize(self.rng.as_mut());
    }

    /// Step every cell once under its running task and record the result.
    pub fn tick(&mut self) -> Result<TickReport> {
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };

        for id in self.registry.ids() {
            let profile = self.tasks.active_profile_for(&id);
            let current = self.registry.state(&id)?;
            let previous_status = current.status;
            let next = step(current, profile.as_ref(), self.rng.as_mut());

            if profile.is_some() {
                report.driven += 1;
            } else {
                report.untouched += 1;
            }

            if next.status != previous_status {
                let ctx = LogContext::new()
                    .with_bench(&self.name)
                    .with_cell(&id)
                    .with_tick(self.tick);
                if next.status == CellStatus::Critical {
                    bench_warn!(
                        context = ctx,
                        "cell status {} -> {} at {:.3} V",
                        previous_status,
                        next.status,
                        next.voltage
                    );
                } else {
                    bench_info!(
                        context = ctx,
                        "cell status {} -> {}",
                        previous_status,
                        next.status
                    );
                }
                report.transitions.push(StatusTransition {
                    cell_id: id.clone(),
                    from: previous_status,
                    to: next.status,
                });
            }

            self.history
                .push(TelemetrySample::capture(self.tick, &id, &next));
            self.registry.store(&id, next)?;
        }

        report.completed_tasks = self.tasks.advance(self.tick_interval);
        bench_debug!(
            context = LogContext::new().with_bench(&self.name).with_tick(self.tick),
            "tick complete: {} driven, {} untouched",
            report.driven,
            report.untouched
        );
        Ok(report)
    }

    pub fn run(&mut self, ticks: u64) -> Result<Vec<TickReport>> {
        (0..ticks).map(|_| self.tick()).collect()
    }

    /// Pause every running task and cut the current on every cell.
    pub fn emergency_stop(&mut self) -> Vec<String> {
        let paused = self.tasks.pause_all();
        for id in self.registry.ids() {
            if let Some(record) = self.registry.get_mut(&id) {
                record.state.current = 0.0;
                record.state.refresh_derived();
            }
        }
        let ctx = LogContext::new().with_bench(&self.name).with_tick(self.tick);
        log_bench_event(
            Some(&ctx),
            "bench.emergency_stop",
            &format!("{} task(s) halted", paused.len()),
            BenchEventOutcome::Fault,
        );
        paused
    }

    pub fn summary(&self) -> FleetSummary {
        FleetSummary::from_registry(&self.registry)
    }
}
