//! ---
//! cb_section: "02-simulation"
//! cb_subsection: "module"
//! cb_type: "source"
//! cb_scope: "code"
//! cb_description: "Cell chemistries and their fixed voltage windows."
//! cb_version: "v0.1.0"
//! cb_owner: "tbd"
//! ---
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::errors::{Result, SimError};

/// Lithium cell chemistries supported by the bench.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Chemistry {
    #[serde(rename = "lfp")]
    #[strum(serialize = "lfp")]
    Lfp,
    #[serde(rename = "li-ion")]
    #[strum(serialize = "li-ion")]
    LiIon,
    #[serde(rename = "nmc")]
    #[strum(serialize = "nmc")]
    Nmc,
    #[serde(rename = "lto")]
    #[strum(serialize = "lto")]
    Lto,
}

/// Voltage window and nameplate capacity for a chemistry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChemistrySpec {
    pub nominal_voltage: f64,
    pub min_voltage: f64,
    pub max_voltage: f64,
    pub rated_capacity_ah: f64,
}

impl ChemistrySpec {
    /// Check the `min < nominal < max` ordering.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("min_voltage", self.min_voltage),
            ("nominal_voltage", self.nominal_voltage),
            ("max_voltage", self.max_voltage),
        ] {
            if !value.is_finite() {
                return Err(SimError::NonFinite { field });
            }
        }
        if self.min_voltage < self.nominal_voltage && self.nominal_voltage < self.max_voltage {
            Ok(())
        } else {
            Err(SimError::InvalidBounds {
                min: self.min_voltage,
                nominal: self.nominal_voltage,
                max: self.max_voltage,
            })
        }
    }
}

impl Chemistry {
    pub const ALL: [Chemistry; 4] = [Chemistry::Lfp, Chemistry::LiIon, Chemistry::Nmc, Chemistry::Lto];

    pub fn spec(&self) -> ChemistrySpec {
        match self {
            Chemistry::Lfp => ChemistrySpec {
                nominal_voltage: 3.2,
                min_voltage: 2.8,
                max_voltage: 3.6,
                rated_capacity_ah: 100.0,
            },
            Chemistry::LiIon => ChemistrySpec {
                nominal_voltage: 3.7,
                min_voltage: 3.2,
                max_voltage: 4.2,
                rated_capacity_ah: 120.0,
            },
            Chemistry::Nmc => ChemistrySpec {
                nominal_voltage: 3.6,
                min_voltage: 3.0,
                max_voltage: 4.0,
                rated_capacity_ah: 110.0,
            },
            Chemistry::Lto => ChemistrySpec {
                nominal_voltage: 2.4,
                min_voltage: 1.5,
                max_voltage: 2.8,
                rated_capacity_ah: 80.0,
            },
        }
    }

    /// Long-form label used in operator output.
    pub fn description(&self) -> &'static str {
        match self {
            Chemistry::Lfp => "Lithium Iron Phosphate",
            Chemistry::LiIon => "Lithium-ion",
            Chemistry::Nmc => "Nickel Manganese Cobalt",
            Chemistry::Lto => "Lithium Titanate",
        }
    }
}

impl FromStr for Chemistry {
    type Err = SimError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Chemistry::iter()
            .find(|chemistry| chemistry.to_string() == wanted)
            .or_else(|| (wanted == "liion").then_some(Chemistry::LiIon))
            .ok_or_else(|| SimError::UnknownChemistry(s.to_owned()))
    }
}
