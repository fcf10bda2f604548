//! ---
//! cb_section: "02-simulation"
//! cb_subsection: "module"
//! cb_type: "source"
//! cb_scope: "code"
//! cb_description: "Task-driven per-tick cell telemetry simulator."
//! cb_version: "v0.1.0"
//! cb_owner: "tbd"
//! ---
//! One simulator step nudges a cell toward the target implied by its task.
//! The tuning values below are empirical and do not model real
//! electrochemistry.

use crate::cell::CellState;
use crate::random::{RandomSource, SeededSource};
use crate::task::TaskProfile;

/// Fraction of the CV setpoint at which charging switches from CC to CV.
pub const CC_PHASE_THRESHOLD: f64 = 0.95;
/// Volts gained per step per 2 A of charge current.
pub const CHARGE_VOLTAGE_GAIN: f64 = 0.01;
/// Volts lost per step per 2 A of discharge current.
pub const DISCHARGE_VOLTAGE_GAIN: f64 = 0.008;
/// Geometric current taper applied per step in the CV phase.
pub const CURRENT_TAPER: f64 = 0.95;
/// Floor for the tapered CV current, in amps.
pub const MIN_TAPER_CURRENT: f64 = 0.1;
pub const CHARGE_TEMP_RISE: (f64, f64) = (0.1, 0.3);
pub const CHARGE_TEMP_CEILING: f64 = 45.0;
pub const DISCHARGE_TEMP_RISE: (f64, f64) = (0.05, 0.2);
pub const DISCHARGE_TEMP_CEILING: f64 = 40.0;
pub const AMBIENT_TEMPERATURE: f64 = 25.0;
/// Maximum idle cooling per step, in °C.
pub const IDLE_COOLING_STEP: f64 = 0.5;
/// Share of the remaining gap to nominal voltage closed per idle step.
pub const IDLE_RELAXATION: f64 = 0.1;
/// Idle voltage gaps at or below this are left alone.
pub const IDLE_DEAD_BAND: f64 = 0.01;

/// Advance `state` by one tick under `task`.
///
/// With no task the state is returned unchanged. The cell's voltage window
/// must already be well ordered; it is validated when the cell is built, not
/// here.
pub fn step<R>(state: &CellState, task: Option<&TaskProfile>, rng: &mut R) -> CellState
where
    R: RandomSource + ?Sized,
{
    let Some(task) = task else {
        return state.clone();
    };

    let mut next = state.clone();
    match *task {
        TaskProfile::CcCv {
            target_current,
            cv_voltage,
        } => {
            if next.voltage < CC_PHASE_THRESHOLD * cv_voltage {
                next.voltage = (next.voltage + CHARGE_VOLTAGE_GAIN * (target_current / 2.0))
                    .min(cv_voltage);
                next.current = target_current;
            } else {
                next.voltage = cv_voltage;
                next.current = (next.current * CURRENT_TAPER).max(MIN_TAPER_CURRENT);
            }
            let rise = rng.uniform(CHARGE_TEMP_RISE.0, CHARGE_TEMP_RISE.1);
            next.temperature = (next.temperature + rise).min(CHARGE_TEMP_CEILING);
        }
        TaskProfile::CcCd { target_current } => {
            next.voltage = (next.voltage - DISCHARGE_VOLTAGE_GAIN * (target_current / 2.0))
                .max(next.min_voltage);
            next.current = -target_current;
            let rise = rng.uniform(DISCHARGE_TEMP_RISE.0, DISCHARGE_TEMP_RISE.1);
            next.temperature = (next.temperature + rise).min(DISCHARGE_TEMP_CEILING);
        }
        TaskProfile::Idle => {
            next.current = 0.0;
            if next.temperature > AMBIENT_TEMPERATURE {
                next.temperature =
                    (next.temperature - IDLE_COOLING_STEP).max(AMBIENT_TEMPERATURE);
            }
            let gap = next.nominal_voltage - next.voltage;
            if gap.abs() > IDLE_DEAD_BAND {
                next.voltage += IDLE_RELAXATION * gap;
            }
        }
    }
    next.refresh_derived();
    next
}

/// Convenience wrapper that owns the random source between steps.
#[derive(Debug, Clone)]
pub struct Simulator<R = SeededSource> {
    rng: R,
}

impl Simulator<SeededSource> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(SeededSource::from_seed(seed))
    }
}

impl<R: RandomSource> Simulator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn step(&mut self, state: &CellState, task: Option<&TaskProfile>) -> CellState {
        step(state, task, &mut self.rng)
    }

    /// Step `steps` times under the same task and return the final state.
    pub fn run(&mut self, state: &CellState, task: Option<&TaskProfile>, steps: usize) -> CellState {
        let mut current = state.clone();
        for _ in 0..steps {
            current = self.step(&current, task);
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellStatus;
    use crate::chemistry::Chemistry;
    use crate::random::MidpointSource;

    #[test]
    fn missing_task_is_identity() {
        let state = CellState::with_readings(Chemistry::Lfp, 3.4, 1.2, 33.3).unwrap();
        let next = step(&state, None, &mut MidpointSource);
        assert_eq!(next, state);
    }

    #[test]
    fn charge_step_in_cc_phase() {
        let state = CellState::with_readings(Chemistry::Nmc, 3.6, 0.0, 30.0).unwrap();
        let task = TaskProfile::cc_cv(2.0, 4.0).unwrap();
        let next = step(&state, Some(&task), &mut MidpointSource);
        assert!((next.voltage - 3.61).abs() < 1e-12);
        assert_eq!(next.current, 2.0);
        assert!((next.temperature - 30.2).abs() < 1e-12);
        assert_eq!(next.capacity, 7.22);
    }

    #[test]
    fn charge_step_in_cv_phase_tapers_current() {
        let state = CellState::with_readings(Chemistry::Nmc, 3.9, 2.0, 30.0).unwrap();
        let task = TaskProfile::cc_cv(2.0, 4.0).unwrap();
        let next = step(&state, Some(&task), &mut MidpointSource);
        assert_eq!(next.voltage, 4.0);
        assert!((next.current - 1.9).abs() < 1e-12);
        assert_eq!(next.status, CellStatus::Warning);
    }

    #[test]
    fn charge_temperature_is_capped() {
        let state = CellState::with_readings(Chemistry::Nmc, 3.6, 0.0, 44.9).unwrap();
        let task = TaskProfile::cc_cv(2.0, 4.0).unwrap();
        let next = step(&state, Some(&task), &mut MidpointSource);
        assert_eq!(next.temperature, CHARGE_TEMP_CEILING);
    }

    #[test]
    fn discharge_sets_negative_current_and_caps_temperature() {
        let state = CellState::with_readings(Chemistry::Lfp, 3.2, 0.0, 39.95).unwrap();
        let task = TaskProfile::cc_cd(2.0).unwrap();
        let next = step(&state, Some(&task), &mut MidpointSource);
        assert_eq!(next.current, -2.0);
        assert!((next.voltage - 3.192).abs() < 1e-12);
        assert_eq!(next.temperature, DISCHARGE_TEMP_CEILING);
    }

    #[test]
    fn idle_cools_without_undershoot() {
        let state = CellState::with_readings(Chemistry::Lfp, 3.2, 1.0, 25.3).unwrap();
        let next = step(&state, Some(&TaskProfile::Idle), &mut MidpointSource);
        assert_eq!(next.temperature, AMBIENT_TEMPERATURE);
        assert_eq!(next.current, 0.0);
        assert_eq!(next.capacity, 0.0);
    }

    #[test]
    fn idle_leaves_cold_cell_alone() {
        let state = CellState::with_readings(Chemistry::Lfp, 3.2, 0.0, 18.0).unwrap();
        let next = step(&state, Some(&TaskProfile::Idle), &mut MidpointSource);
        assert_eq!(next.temperature, 18.0);
    }

    #[test]
    fn idle_dead_band_holds_voltage() {
        let state = CellState::with_readings(Chemistry::Lfp, 3.205, 0.0, 25.0).unwrap();
        let next = step(&state, Some(&TaskProfile::Idle), &mut MidpointSource);
        assert_eq!(next.voltage, 3.205);
    }

    #[test]
    fn simulator_run_is_reproducible_from_seed() {
        let state = CellState::new(Chemistry::LiIon);
        let task = TaskProfile::cc_cv(3.0, 4.2).unwrap();
        let a = Simulator::seeded(11).run(&state, Some(&task), 40);
        let b = Simulator::seeded(11).run(&state, Some(&task), 40);
        assert_eq!(a, b);
    }
}
