//! ---
//! cb_section: "04-bench"
//! cb_subsection: "module"
//! cb_type: "source"
//! cb_scope: "code"
//! cb_description: "Owned registry of bench cells keyed by identifier."
//! cb_version: "v0.1.0"
//! cb_owner: "tbd"
//! ---
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use cellbench_sim::{cell_key, round2, CellState, Chemistry, RandomSource};

use crate::errors::{BenchError, Result};

const INITIAL_CURRENT_RANGE: (f64, f64) = (0.0, 5.0);
const INITIAL_TEMPERATURE_RANGE: (f64, f64) = (25.0, 40.0);
const INITIAL_HEALTH_RANGE: (f64, f64) = (85.0, 100.0);
const INITIAL_CYCLES_MAX: u32 = 1000;

const JITTER_TEMPERATURE: f64 = 1.0;
const JITTER_VOLTAGE: f64 = 0.1;
const JITTER_CURRENT: f64 = 0.5;
const JITTER_HEALTH: (f64, f64) = (-1.0, 0.5);

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// A cell on the bench together with its bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub id: String,
    pub state: CellState,
    /// Synthetic state of health in percent; not driven by the simulator.
    pub health: f64,
    /// Completed charge-to-discharge reversals.
    pub cycles: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CellRecord {
    fn new(id: String, state: CellState, health: f64, cycles: u32) -> Self {
        let now = Utc::now();
        Self {
            id,
            state,
            health,
            cycles,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Insertion-ordered collection of cells. Identifiers are never reused, even
/// after a cell is removed.
#[derive(Debug, Clone, Default)]
pub struct CellRegistry {
    cells: IndexMap<String, CellRecord>,
    next_index: usize,
}

impl CellRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` cells of `chemistry` with randomised starting readings.
    pub fn add_cells<R>(&mut self, chemistry: Chemistry, count: usize, rng: &mut R) -> Result<Vec<String>>
    where
        R: RandomSource + ?Sized,
    {
        let spec = chemistry.spec();
        let mut added = Vec::with_capacity(count);
        for _ in 0..count {
            let current = round2(rng.uniform(INITIAL_CURRENT_RANGE.0, INITIAL_CURRENT_RANGE.1));
            let temperature = round1(rng.uniform(
                INITIAL_TEMPERATURE_RANGE.0,
                INITIAL_TEMPERATURE_RANGE.1,
            ));
            let health = round1(rng.uniform(INITIAL_HEALTH_RANGE.0, INITIAL_HEALTH_RANGE.1));
            let cycles = rng.uniform_u32(0, INITIAL_CYCLES_MAX);
            let state =
                CellState::with_readings(chemistry, spec.nominal_voltage, current, temperature)?;

            let id = self.next_free_key(chemistry);
            debug!(cell = %id, %chemistry, current, temperature, "cell added");
            self.cells
                .insert(id.clone(), CellRecord::new(id.clone(), state, health, cycles));
            added.push(id);
        }
        Ok(added)
    }

    /// Next generated key, skipping any already taken by [`Self::insert`].
    fn next_free_key(&mut self, chemistry: Chemistry) -> String {
        loop {
            self.next_index += 1;
            let id = cell_key(self.next_index, chemistry);
            if !self.cells.contains_key(&id) {
                return id;
            }
        }
    }

    /// Register a caller-built cell under an explicit identifier.
    pub fn insert(&mut self, id: impl Into<String>, state: CellState) -> Result<()> {
        let id = id.into();
        if self.cells.contains_key(&id) {
            return Err(BenchError::DuplicateCell(id));
        }
        self.cells
            .insert(id.clone(), CellRecord::new(id, state, 100.0, 0));
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<CellRecord> {
        self.cells
            .shift_remove(id)
            .ok_or_else(|| BenchError::UnknownCell(id.to_owned()))
    }

    pub fn get(&self, id: &str) -> Option<&CellRecord> {
        self.cells.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut CellRecord> {
        self.cells.get_mut(id)
    }

    pub fn state(&self, id: &str) -> Result<&CellState> {
        self.get(id)
            .map(|record| &record.state)
            .ok_or_else(|| BenchError::UnknownCell(id.to_owned()))
    }

    /// Overwrite a cell with a simulator result. A switch from charging to
    /// discharging counts as one cycle.
    pub fn store(&mut self, id: &str, state: CellState) -> Result<()> {
        let record = self
            .cells
            .get_mut(id)
            .ok_or_else(|| BenchError::UnknownCell(id.to_owned()))?;
        if record.state.current > 0.0 && state.current < 0.0 {
            record.cycles = record.cycles.saturating_add(1);
        }
        record.state = state;
        record.updated_at = Utc::now();
        Ok(())
    }

    /// Jitter every cell's readings, as a manual "refresh data" would.
    pub fn randomize<R>(&mut self, rng: &mut R)
    where
        R: RandomSource + ?Sized,
    {
        let now = Utc::now();
        for record in self.cells.values_mut() {
            let state = &mut record.state;
            state.temperature += rng.uniform(-JITTER_TEMPERATURE, JITTER_TEMPERATURE);
            state.voltage += rng.uniform(-JITTER_VOLTAGE, JITTER_VOLTAGE);
            state.current += rng.uniform(-JITTER_CURRENT, JITTER_CURRENT);
            state.refresh_derived();
            record.health =
                (record.health + rng.uniform(JITTER_HEALTH.0, JITTER_HEALTH.1)).clamp(0.0, 100.0);
            record.updated_at = now;
        }
    }

    pub fn reset(&mut self, id: &str) -> Result<()> {
        let record = self
            .cells
            .get_mut(id)
            .ok_or_else(|| BenchError::UnknownCell(id.to_owned()))?;
        record.state.reset();
        record.updated_at = Utc::now();
        Ok(())
    }

    pub fn reset_all(&mut self) {
        let now = Utc::now();
        for record in self.cells.values_mut() {
            record.state.reset();
            record.updated_at = now;
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.cells.contains_key(id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.cells.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CellRecord> {
        self.cells.values()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
