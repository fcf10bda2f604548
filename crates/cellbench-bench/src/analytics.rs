//! ---
//! cb_section: "04-bench"
//! cb_subsection: "module"
//! cb_type: "source"
//! cb_scope: "code"
//! cb_description: "Fleet summaries, health bands, status rows and recommendations."
//! cb_version: "v0.1.0"
//! cb_owner: "tbd"
//! ---
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::Display;

use cellbench_sim::{round2, CellState, CellStatus, Chemistry};

use crate::registry::{CellRecord, CellRegistry};

/// Cells above this temperature (°C) count as hot.
pub const HOT_CELL_THRESHOLD: f64 = 35.0;
/// Cells below this health (%) should be replaced.
pub const DEGRADED_HEALTH_THRESHOLD: f64 = 80.0;
/// Cells above this cycle count need closer monitoring.
pub const HIGH_CYCLE_THRESHOLD: u32 = 800;

const HIGH_VOLTAGE_MARGIN: f64 = 0.95;
const LOW_VOLTAGE_MARGIN: f64 = 1.05;

/// Aggregate view over every cell on the bench.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetSummary {
    pub total_cells: usize,
    pub avg_voltage: f64,
    pub avg_temperature: f64,
    pub total_capacity_wh: f64,
    pub total_rated_capacity_ah: f64,
    pub avg_health: f64,
    pub hot_cells: usize,
    pub total_power_w: f64,
    pub total_current_a: f64,
    pub total_cycles: u64,
    pub by_chemistry: BTreeMap<Chemistry, usize>,
    pub normal_cells: usize,
    pub warning_cells: usize,
    pub critical_cells: usize,
}

impl FleetSummary {
    pub fn from_registry(registry: &CellRegistry) -> Self {
        let mut summary = FleetSummary::default();
        for record in registry.iter() {
            let state = &record.state;
            summary.total_cells += 1;
            summary.avg_voltage += state.voltage;
            summary.avg_temperature += state.temperature;
            summary.avg_health += record.health;
            summary.total_capacity_wh += state.capacity;
            summary.total_rated_capacity_ah += state.chemistry.spec().rated_capacity_ah;
            summary.total_power_w += state.power_w();
            summary.total_current_a += state.current.abs();
            summary.total_cycles += u64::from(record.cycles);
            if state.temperature > HOT_CELL_THRESHOLD {
                summary.hot_cells += 1;
            }
            *summary.by_chemistry.entry(state.chemistry).or_default() += 1;
            match state.status {
                CellStatus::Normal => summary.normal_cells += 1,
                CellStatus::Warning => summary.warning_cells += 1,
                CellStatus::Critical => summary.critical_cells += 1,
            }
        }
        if summary.total_cells > 0 {
            let count = summary.total_cells as f64;
            summary.avg_voltage /= count;
            summary.avg_temperature /= count;
            summary.avg_health /= count;
        }
        summary.total_capacity_wh = round2(summary.total_capacity_wh);
        summary
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
pub enum HealthBand {
    #[strum(serialize = "Excellent (90-100%)")]
    Excellent,
    #[strum(serialize = "Good (80-89%)")]
    Good,
    #[strum(serialize = "Fair (70-79%)")]
    Fair,
    #[strum(serialize = "Poor (<70%)")]
    Poor,
}

impl HealthBand {
    pub const ALL: [HealthBand; 4] = [
        HealthBand::Excellent,
        HealthBand::Good,
        HealthBand::Fair,
        HealthBand::Poor,
    ];

    pub fn of(health: f64) -> Self {
        if health >= 90.0 {
            HealthBand::Excellent
        } else if health >= 80.0 {
            HealthBand::Good
        } else if health >= 70.0 {
            HealthBand::Fair
        } else {
            HealthBand::Poor
        }
    }
}

/// Count of cells per health band; every band is present, possibly with zero.
pub fn health_distribution(registry: &CellRegistry) -> BTreeMap<HealthBand, usize> {
    let mut bands: BTreeMap<HealthBand, usize> =
        HealthBand::ALL.iter().map(|band| (*band, 0)).collect();
    for record in registry.iter() {
        *bands.entry(HealthBand::of(record.health)).or_default() += 1;
    }
    bands
}

/// Operator-facing condition label shown in the status table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum CellCondition {
    #[serde(rename = "High Voltage")]
    #[strum(serialize = "High Voltage")]
    HighVoltage,
    #[serde(rename = "Low Voltage")]
    #[strum(serialize = "Low Voltage")]
    LowVoltage,
    #[serde(rename = "High Temperature")]
    #[strum(serialize = "High Temperature")]
    HighTemperature,
    Normal,
}

impl CellCondition {
    pub fn evaluate(state: &CellState) -> Self {
        if state.voltage >= state.max_voltage * HIGH_VOLTAGE_MARGIN {
            CellCondition::HighVoltage
        } else if state.voltage <= state.min_voltage * LOW_VOLTAGE_MARGIN {
            CellCondition::LowVoltage
        } else if state.temperature > HOT_CELL_THRESHOLD {
            CellCondition::HighTemperature
        } else {
            CellCondition::Normal
        }
    }
}

/// One line of the detailed status table, rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRow {
    pub cell_id: String,
    pub chemistry: Chemistry,
    pub voltage: f64,
    pub current: f64,
    pub temperature: f64,
    pub capacity: f64,
    pub health: f64,
    pub cycles: u32,
    pub condition: CellCondition,
    pub status: CellStatus,
}

impl From<&CellRecord> for StatusRow {
    fn from(record: &CellRecord) -> Self {
        let state = &record.state;
        Self {
            cell_id: record.id.clone(),
            chemistry: state.chemistry,
            voltage: round2(state.voltage),
            current: round2(state.current),
            temperature: (state.temperature * 10.0).round() / 10.0,
            capacity: state.capacity,
            health: (record.health * 10.0).round() / 10.0,
            cycles: record.cycles,
            condition: CellCondition::evaluate(state),
            status: state.status,
        }
    }
}

pub fn status_rows(registry: &CellRegistry) -> Vec<StatusRow> {
    registry.iter().map(StatusRow::from).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    CoolingAdvised,
    ReplaceDegraded,
    MonitorHighCycle,
    AllNormal,
}

impl Recommendation {
    pub fn message(&self) -> &'static str {
        match self {
            Recommendation::CoolingAdvised => "Consider cooling: some cells are running hot",
            Recommendation::ReplaceDegraded => "Replace cells with health below 80%",
            Recommendation::MonitorHighCycle => "Monitor high-cycle cells closely",
            Recommendation::AllNormal => "All systems operating normally",
        }
    }
}

pub fn recommendations(registry: &CellRegistry) -> Vec<Recommendation> {
    let mut out = Vec::new();
    if registry
        .iter()
        .any(|record| record.state.temperature > HOT_CELL_THRESHOLD)
    {
        out.push(Recommendation::CoolingAdvised);
    }
    if registry
        .iter()
        .any(|record| record.health < DEGRADED_HEALTH_THRESHOLD)
    {
        out.push(Recommendation::ReplaceDegraded);
    }
    if registry
        .iter()
        .any(|record| record.cycles > HIGH_CYCLE_THRESHOLD)
    {
        out.push(Recommendation::MonitorHighCycle);
    }
    if out.is_empty() {
        out.push(Recommendation::AllNormal);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(cells: &[(&str, CellState, f64, u32)]) -> CellRegistry {
        let mut registry = CellRegistry::new();
        for (id, state, health, cycles) in cells {
            registry.insert(*id, state.clone()).unwrap();
            let record = registry.get_mut(id).unwrap();
            record.health = *health;
            record.cycles = *cycles;
        }
        registry
    }

    #[test]
    fn empty_registry_summarises_to_zero() {
        let summary = FleetSummary::from_registry(&CellRegistry::new());
        assert_eq!(summary, FleetSummary::default());
        assert_eq!(
            recommendations(&CellRegistry::new()),
            vec![Recommendation::AllNormal]
        );
    }

    #[test]
    fn summary_aggregates_cells() {
        let registry = registry_with(&[
            (
                "a",
                CellState::with_readings(Chemistry::Lfp, 3.2, 2.0, 30.0).unwrap(),
                95.0,
                10,
            ),
            (
                "b",
                CellState::with_readings(Chemistry::Nmc, 3.6, -1.0, 40.0).unwrap(),
                75.0,
                900,
            ),
        ]);
        let summary = FleetSummary::from_registry(&registry);
        assert_eq!(summary.total_cells, 2);
        assert!((summary.avg_voltage - 3.4).abs() < 1e-9);
        assert!((summary.avg_temperature - 35.0).abs() < 1e-9);
        assert_eq!(summary.total_capacity_wh, 10.0);
        assert_eq!(summary.total_rated_capacity_ah, 210.0);
        assert!((summary.total_power_w - 2.8).abs() < 1e-9);
        assert!((summary.total_current_a - 3.0).abs() < 1e-9);
        assert_eq!(summary.total_cycles, 910);
        assert_eq!(summary.hot_cells, 1);
        assert_eq!(summary.by_chemistry[&Chemistry::Lfp], 1);
        assert_eq!(summary.normal_cells, 2);

        assert_eq!(
            recommendations(&registry),
            vec![
                Recommendation::CoolingAdvised,
                Recommendation::ReplaceDegraded,
                Recommendation::MonitorHighCycle
            ]
        );
    }

    #[test]
    fn health_bands_cover_every_range() {
        assert_eq!(HealthBand::of(90.0), HealthBand::Excellent);
        assert_eq!(HealthBand::of(89.9), HealthBand::Good);
        assert_eq!(HealthBand::of(70.0), HealthBand::Fair);
        assert_eq!(HealthBand::of(12.0), HealthBand::Poor);

        let registry = registry_with(&[
            ("a", CellState::new(Chemistry::Lto), 99.0, 0),
            ("b", CellState::new(Chemistry::Lto), 91.0, 0),
            ("c", CellState::new(Chemistry::Lto), 65.0, 0),
        ]);
        let bands = health_distribution(&registry);
        assert_eq!(bands.len(), 4);
        assert_eq!(bands[&HealthBand::Excellent], 2);
        assert_eq!(bands[&HealthBand::Good], 0);
        assert_eq!(bands[&HealthBand::Poor], 1);
    }

    #[test]
    fn condition_checks_voltage_before_temperature() {
        let high = CellState::with_readings(Chemistry::Lfp, 3.45, 0.0, 50.0).unwrap();
        let low = CellState::with_readings(Chemistry::Lfp, 2.9, 0.0, 25.0).unwrap();
        let hot = CellState::with_readings(Chemistry::Lfp, 3.2, 0.0, 36.0).unwrap();
        assert_eq!(CellCondition::evaluate(&high), CellCondition::HighVoltage);
        assert_eq!(CellCondition::evaluate(&low), CellCondition::LowVoltage);
        assert_eq!(CellCondition::evaluate(&hot), CellCondition::HighTemperature);
        assert_eq!(
            CellCondition::evaluate(&CellState::new(Chemistry::Lfp)),
            CellCondition::Normal
        );
        assert_eq!(CellCondition::HighTemperature.to_string(), "High Temperature");
    }

    #[test]
    fn status_rows_round_for_display() {
        let registry = registry_with(&[(
            "a",
            CellState::with_readings(Chemistry::LiIon, 3.71234, 1.23456, 31.26).unwrap(),
            88.88,
            3,
        )]);
        let rows = status_rows(&registry);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].voltage, 3.71);
        assert_eq!(rows[0].current, 1.23);
        assert_eq!(rows[0].temperature, 31.3);
        assert_eq!(rows[0].health, 88.9);
        assert_eq!(rows[0].condition, CellCondition::Normal);
    }
}
