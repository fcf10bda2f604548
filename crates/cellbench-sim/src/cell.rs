//! ---
//! cb_section: "02-simulation"
//! cb_subsection: "module"
//! cb_type: "source"
//! cb_scope: "code"
//! cb_description: "Cell state, derived capacity and status classification."
//! cb_version: "v0.1.0"
//! cb_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::chemistry::{Chemistry, ChemistrySpec};
use crate::errors::{Result, SimError};

/// Starting temperature for freshly created cells, in °C.
pub const DEFAULT_TEMPERATURE: f64 = 25.0;

const CRITICAL_MARGIN: f64 = 1.1;
const WARNING_MARGIN: f64 = 0.9;

/// Registry key for the `index`-th cell of a bench, e.g. `cell_3_nmc`.
pub fn cell_key(index: usize, chemistry: Chemistry) -> String {
    format!("cell_{}_{}", index, chemistry)
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Voltage-derived health of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Default)]
pub enum CellStatus {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl CellStatus {
    /// `Critical` below 110% of the minimum voltage, `Warning` above 90% of the
    /// maximum, otherwise `Normal`. The critical check wins when both apply.
    pub fn classify(voltage: f64, min_voltage: f64, max_voltage: f64) -> Self {
        if voltage < min_voltage * CRITICAL_MARGIN {
            CellStatus::Critical
        } else if voltage > max_voltage * WARNING_MARGIN {
            CellStatus::Warning
        } else {
            CellStatus::Normal
        }
    }
}

/// Snapshot of one battery cell.
///
/// `current` is signed: positive while charging, negative while discharging.
/// `capacity` (Wh) and `status` are derived and refreshed after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellState {
    pub chemistry: Chemistry,
    pub voltage: f64,
    pub current: f64,
    pub temperature: f64,
    pub capacity: f64,
    pub min_voltage: f64,
    pub nominal_voltage: f64,
    pub max_voltage: f64,
    pub status: CellStatus,
}

impl CellState {
    /// Cell at rest on the chemistry's nominal voltage and ambient temperature.
    pub fn new(chemistry: Chemistry) -> Self {
        let spec = chemistry.spec();
        Self::from_parts(chemistry, &spec, spec.nominal_voltage, 0.0, DEFAULT_TEMPERATURE)
    }

    /// Cell using the chemistry window with caller-supplied readings.
    pub fn with_readings(
        chemistry: Chemistry,
        voltage: f64,
        current: f64,
        temperature: f64,
    ) -> Result<Self> {
        check_finite("voltage", voltage)?;
        check_finite("current", current)?;
        check_finite("temperature", temperature)?;
        Ok(Self::from_parts(
            chemistry,
            &chemistry.spec(),
            voltage,
            current,
            temperature,
        ))
    }

    /// Cell with a custom voltage window. The window is validated here once so
    /// the simulator can rely on it without re-checking every tick.
    pub fn with_bounds(
        chemistry: Chemistry,
        bounds: ChemistrySpec,
        voltage: f64,
        current: f64,
        temperature: f64,
    ) -> Result<Self> {
        bounds.validate()?;
        check_finite("voltage", voltage)?;
        check_finite("current", current)?;
        check_finite("temperature", temperature)?;
        Ok(Self::from_parts(chemistry, &bounds, voltage, current, temperature))
    }

    fn from_parts(
        chemistry: Chemistry,
        spec: &ChemistrySpec,
        voltage: f64,
        current: f64,
        temperature: f64,
    ) -> Self {
        let mut state = Self {
            chemistry,
            voltage,
            current,
            temperature,
            capacity: 0.0,
            min_voltage: spec.min_voltage,
            nominal_voltage: spec.nominal_voltage,
            max_voltage: spec.max_voltage,
            status: CellStatus::Normal,
        };
        state.refresh_derived();
        state
    }

    /// Recompute `capacity` and `status` from the current readings.
    pub fn refresh_derived(&mut self) {
        self.capacity = round2((self.voltage * self.current).abs());
        self.status = CellStatus::classify(self.voltage, self.min_voltage, self.max_voltage);
    }

    /// Restore chemistry defaults while keeping the cell's voltage window.
    pub fn reset(&mut self) {
        self.voltage = self.nominal_voltage;
        self.current = 0.0;
        self.temperature = DEFAULT_TEMPERATURE;
        self.refresh_derived();
    }

    /// Instantaneous power in watts, signed like `current`.
    pub fn power_w(&self) -> f64 {
        self.voltage * self.current
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimError::NonFinite { field })
    }
}
