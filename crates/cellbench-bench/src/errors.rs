//! ---
//! cb_section: "04-bench"
//! cb_subsection: "module"
//! cb_type: "source"
//! cb_scope: "code"
//! cb_description: "Error taxonomy for bench operations."
//! cb_version: "v0.1.0"
//! cb_owner: "tbd"
//! ---
use thiserror::Error;

use crate::tasks::TaskStatus;

pub type Result<T> = std::result::Result<T, BenchError>;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("cell {0} not found in registry")]
    UnknownCell(String),
    #[error("cell {0} already exists in registry")]
    DuplicateCell(String),
    #[error("task {0} not found in queue")]
    UnknownTask(String),
    #[error("task {task} cannot {action} while {status}")]
    InvalidTransition {
        task: String,
        action: &'static str,
        status: TaskStatus,
    },
    #[error("invalid cell or task definition: {0}")]
    Model(#[from] cellbench_sim::SimError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("json export failed: {0}")]
    Json(#[from] serde_json::Error),
}
