//! ---
//! cb_section: "04-bench"
//! cb_subsection: "module"
//! cb_type: "source"
//! cb_scope: "code"
//! cb_description: "Bounded in-memory telemetry history."
//! cb_version: "v0.1.0"
//! cb_owner: "tbd"
//! ---
use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cellbench_sim::{CellState, CellStatus, Chemistry};

/// One cell reading captured after a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub tick: u64,
    pub timestamp: DateTime<Utc>,
    pub cell_id: String,
    pub chemistry: Chemistry,
    pub voltage: f64,
    pub current: f64,
    pub temperature: f64,
    pub capacity: f64,
    pub status: CellStatus,
}

impl TelemetrySample {
    pub fn capture(tick: u64, cell_id: &str, state: &CellState) -> Self {
        Self {
            tick,
            timestamp: Utc::now(),
            cell_id: cell_id.to_owned(),
            chemistry: state.chemistry,
            voltage: state.voltage,
            current: state.current,
            temperature: state.temperature,
            capacity: state.capacity,
            status: state.status,
        }
    }
}

/// Rolling buffer of samples; the oldest entries are evicted first.
#[derive(Debug, Clone)]
pub struct TelemetryHistory {
    samples: VecDeque<TelemetrySample>,
    capacity: usize,
}

impl TelemetryHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: TelemetrySample) {
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn samples_for<'a>(&'a self, cell_id: &'a str) -> impl Iterator<Item = &'a TelemetrySample> {
        self.samples
            .iter()
            .filter(move |sample| sample.cell_id == cell_id)
    }

    pub fn latest(&self) -> Option<&TelemetrySample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TelemetrySample> {
        self.samples.iter()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for TelemetryHistory {
    fn default() -> Self {
        Self::with_capacity(500)
    }
}
