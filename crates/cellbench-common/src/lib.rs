//! ---
//! cb_section: "01-core-functionality"
//! cb_subsection: "module"
//! cb_type: "source"
//! cb_scope: "code"
//! cb_description: "Shared configuration and tracing primitives."
//! cb_version: "v0.1.0"
//! cb_owner: "tbd"
//! ---
//! Shared primitives for the cellbench workspace: bench configuration loading
//! and tracing subscriber bootstrap.

pub mod config;
pub mod logging;

pub use config::{
    BenchConfig, BenchSection, CellGroupConfig, LoadedBenchConfig, LoggingConfig,
    SimulationConfig, TaskConfig,
};
pub use logging::{init_tracing, LogFormat};
