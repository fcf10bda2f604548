//! ---
//! cb_section: "04-bench"
//! cb_subsection: "module"
//! cb_type: "source"
//! cb_scope: "code"
//! cb_description: "Test bench runtime exports."
//! cb_version: "v0.1.0"
//! cb_owner: "tbd"
//! ---
//! The test bench around the simulator: cells and tasks owned by explicit
//! collections, a rolling telemetry buffer, fleet analytics and exports.

pub mod analytics;
pub mod bench;
pub mod errors;
pub mod export;
pub mod history;
pub mod registry;
pub mod tasks;

pub use analytics::{
    health_distribution, recommendations, status_rows, CellCondition, FleetSummary, HealthBand,
    Recommendation, StatusRow,
};
pub use bench::{StatusTransition, TestBench, TickReport};
pub use errors::{BenchError, Result};
pub use export::{
    export_file_name, export_history_csv, export_history_json, export_status_csv,
    export_status_json,
};
pub use history::{TelemetryHistory, TelemetrySample};
pub use registry::{CellRecord, CellRegistry};
pub use tasks::{Task, TaskQueue, TaskStatus};
