//! ---
//! cb_section: "02-simulation"
//! cb_subsection: "module"
//! cb_type: "source"
//! cb_scope: "code"
//! cb_description: "Simulation module exports and shared types."
//! cb_version: "v0.1.0"
//! cb_owner: "tbd"
//! ---
//! Battery cell model and the task-driven telemetry simulator.
//!
//! The simulator is a pure function of a [`CellState`] and the
//! [`TaskProfile`] bound to it; randomness is supplied through a
//! [`RandomSource`] so runs can be replayed from a seed.

pub mod cell;
pub mod chemistry;
pub mod errors;
pub mod random;
pub mod simulator;
pub mod task;

pub use cell::{cell_key, round2, CellState, CellStatus};
pub use chemistry::{Chemistry, ChemistrySpec};
pub use errors::{Result, SimError};
pub use random::{MidpointSource, RandomSource, SeededSource};
pub use simulator::{step, Simulator};
pub use task::{TaskKind, TaskProfile};
