//! ---
//! cb_section: "02-simulation"
//! cb_subsection: "module"
//! cb_type: "source"
//! cb_scope: "code"
//! cb_description: "Charge, discharge and idle task profiles."
//! cb_version: "v0.1.0"
//! cb_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::errors::{Result, SimError};

/// Discriminant of a [`TaskProfile`], useful for tables and filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum TaskKind {
    #[strum(serialize = "CC_CV")]
    CcCv,
    #[strum(serialize = "CC_CD")]
    CcCd,
    #[strum(serialize = "IDLE")]
    Idle,
}

/// Operation applied to a cell on every simulator step.
///
/// `target_current` is always a positive magnitude; direction comes from the
/// variant and the simulator applies the sign to the resulting cell current.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskProfile {
    /// Constant-current charge up to `cv_voltage`, then constant-voltage taper.
    CcCv { target_current: f64, cv_voltage: f64 },
    /// Constant-current discharge down to the cell's minimum voltage.
    CcCd { target_current: f64 },
    /// Rest: current off, voltage and temperature relax.
    Idle,
}

impl TaskProfile {
    pub fn cc_cv(target_current: f64, cv_voltage: f64) -> Result<Self> {
        let profile = TaskProfile::CcCv {
            target_current,
            cv_voltage,
        };
        profile.validate()?;
        Ok(profile)
    }

    pub fn cc_cd(target_current: f64) -> Result<Self> {
        let profile = TaskProfile::CcCd { target_current };
        profile.validate()?;
        Ok(profile)
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            TaskProfile::CcCv { .. } => TaskKind::CcCv,
            TaskProfile::CcCd { .. } => TaskKind::CcCd,
            TaskProfile::Idle => TaskKind::Idle,
        }
    }

    /// Re-check parameters, e.g. after deserialising a profile from config.
    pub fn validate(&self) -> Result<()> {
        match *self {
            TaskProfile::CcCv {
                target_current,
                cv_voltage,
            } => {
                positive("target_current", target_current)?;
                positive("cv_voltage", cv_voltage)
            }
            TaskProfile::CcCd { target_current } => positive("target_current", target_current),
            TaskProfile::Idle => Ok(()),
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidTaskParameter { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_reject_signed_or_zero_currents() {
        assert!(TaskProfile::cc_cd(-2.0).is_err());
        assert!(TaskProfile::cc_cv(0.0, 4.0).is_err());
        assert!(TaskProfile::cc_cv(2.0, f64::INFINITY).is_err());
        assert_eq!(
            TaskProfile::cc_cd(2.0).unwrap(),
            TaskProfile::CcCd { target_current: 2.0 }
        );
    }

    #[test]
    fn serde_uses_kind_tag() {
        let json = serde_json::to_value(TaskProfile::cc_cv(2.0, 4.0).unwrap()).unwrap();
        assert_eq!(json["kind"], "CC_CV");
        assert_eq!(json["cv_voltage"], 4.0);

        let idle: TaskProfile = serde_json::from_str(r#"{"kind":"IDLE"}"#).unwrap();
        assert_eq!(idle, TaskProfile::Idle);
        let discharge: TaskProfile =
            serde_json::from_str(r#"{"kind":"CC_CD","target_current":1.5}"#).unwrap();
        assert_eq!(discharge.kind(), TaskKind::CcCd);
    }

    #[test]
    fn kind_display_matches_wire_names() {
        assert_eq!(TaskKind::CcCv.to_string(), "CC_CV");
        assert_eq!(TaskKind::Idle.to_string(), "IDLE");
    }
}
