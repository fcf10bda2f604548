//! ---
//! cb_section: "02-simulation"
//! cb_subsection: "module"
//! cb_type: "source"
//! cb_scope: "code"
//! cb_description: "Error taxonomy for cell and task construction."
//! cb_version: "v0.1.0"
//! cb_owner: "tbd"
//! ---
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("voltage bounds must satisfy min < nominal < max (got min={min}, nominal={nominal}, max={max})")]
    InvalidBounds { min: f64, nominal: f64, max: f64 },
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
    #[error("invalid task parameter {field}: {value} (must be a positive magnitude)")]
    InvalidTaskParameter { field: &'static str, value: f64 },
    #[error("unknown chemistry '{0}'")]
    UnknownChemistry(String),
}
