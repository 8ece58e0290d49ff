//! JSON wire schema for production-plan requests and responses.
//!
//! Field names follow the public payload format (`gas(euro/MWh)`, `pmin`, …).
//! Everything here is validated before the optimizer sees it; the optimizer
//! itself only asserts.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dispatch::{
    DispatchPlan, DispatchRequest, DispatchableUnit, FuelKind, FuelPrices, IntermittentUnit,
    UnitDispatch,
};

/// Production-plan request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    /// Load to cover (MW).
    pub load: f64,
    /// Fuel prices and wind availability.
    pub fuels: Fuels,
    /// Power plants, in any order.
    pub powerplants: Vec<PowerPlant>,
}

/// Market inputs as carried on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fuels {
    #[serde(rename = "gas(euro/MWh)")]
    pub gas_euro_per_mwh: f64,
    #[serde(rename = "kerosine(euro/MWh)")]
    pub kerosine_euro_per_mwh: f64,
    #[serde(rename = "co2(euro/ton)")]
    pub co2_euro_per_ton: f64,
    #[serde(rename = "wind(%)")]
    pub wind_percent: f64,
}

/// Plant technology tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantType {
    GasFired,
    TurboJet,
    WindTurbine,
}

impl PlantType {
    /// Fuel burned by this plant type; `None` for wind turbines.
    pub fn fuel(self) -> Option<FuelKind> {
        match self {
            Self::GasFired => Some(FuelKind::GasFired),
            Self::TurboJet => Some(FuelKind::TurboJet),
            Self::WindTurbine => None,
        }
    }
}

/// One plant as carried on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerPlant {
    pub name: String,
    #[serde(rename = "type")]
    pub plant_type: PlantType,
    pub efficiency: f64,
    pub pmin: f64,
    pub pmax: f64,
}

/// Single constraint violation with a JSON-path-like field name.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Offending field (e.g., `"$.powerplants[2].pmin"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Failure to obtain a usable payload.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("cannot read payload \"{}\": {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid payload JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid payload: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Payload {
    /// Parses a payload from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns a `PayloadError` if the file cannot be read or is not a payload.
    pub fn from_json_file(path: &Path) -> Result<Self, PayloadError> {
        let content = fs::read_to_string(path).map_err(|source| PayloadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Parses a payload from a JSON string. Does not validate value ranges.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError::Json` on syntax or shape errors.
    pub fn from_json_str(s: &str) -> Result<Self, PayloadError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the payload is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !(self.load.is_finite() && self.load >= 0.0) {
            errors.push(ValidationError::new("$.load", "must be >= 0"));
        }

        let f = &self.fuels;
        for (field, price) in [
            ("$.fuels.gas(euro/MWh)", f.gas_euro_per_mwh),
            ("$.fuels.kerosine(euro/MWh)", f.kerosine_euro_per_mwh),
            ("$.fuels.co2(euro/ton)", f.co2_euro_per_ton),
        ] {
            if !(price.is_finite() && price >= 0.0) {
                errors.push(ValidationError::new(field, "must be >= 0"));
            }
        }
        if !(0.0..=100.0).contains(&f.wind_percent) {
            errors.push(ValidationError::new("$.fuels.wind(%)", "must be in [0, 100]"));
        }

        let mut seen = HashSet::new();
        for (i, plant) in self.powerplants.iter().enumerate() {
            let path = format!("$.powerplants[{i}]");
            if plant.name.trim().is_empty() {
                errors.push(ValidationError::new(
                    format!("{path}.name"),
                    "must not be empty",
                ));
            } else if !seen.insert(plant.name.as_str()) {
                errors.push(ValidationError::new(
                    format!("{path}.name"),
                    format!("duplicate plant name \"{}\"", plant.name),
                ));
            }
            if !(plant.efficiency > 0.0 && plant.efficiency <= 1.0) {
                errors.push(ValidationError::new(
                    format!("{path}.efficiency"),
                    "must be in (0, 1]",
                ));
            }
            if !(plant.pmin.is_finite() && plant.pmin >= 0.0) {
                errors.push(ValidationError::new(format!("{path}.pmin"), "must be >= 0"));
            }
            if !(plant.pmax.is_finite() && plant.pmax >= 0.0) {
                errors.push(ValidationError::new(format!("{path}.pmax"), "must be >= 0"));
            }
            if plant.pmin > plant.pmax {
                errors.push(ValidationError::new(
                    format!("{path}.pmin"),
                    format!("must be <= {path}.pmax"),
                ));
            }
        }

        errors
    }

    /// Validates the payload and splits its plants into optimizer inputs.
    ///
    /// Wind turbines become intermittent units; all other plants become
    /// dispatchable units. Relative order within each group is preserved.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError::Invalid` with every violated constraint.
    pub fn into_request(self) -> Result<DispatchRequest, PayloadError> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(PayloadError::Invalid(errors));
        }

        let mut intermittent = Vec::new();
        let mut dispatchable = Vec::new();
        for plant in self.powerplants {
            match plant.plant_type.fuel() {
                None => intermittent.push(IntermittentUnit::new(plant.name, plant.pmax)),
                Some(fuel) => dispatchable.push(DispatchableUnit::new(
                    plant.name,
                    fuel,
                    plant.efficiency,
                    plant.pmin,
                    plant.pmax,
                )),
            }
        }

        Ok(DispatchRequest {
            load_mw: self.load,
            fuel_prices: FuelPrices {
                gas_per_mwh: self.fuels.gas_euro_per_mwh,
                kerosine_per_mwh: self.fuels.kerosine_euro_per_mwh,
                co2_per_ton: self.fuels.co2_euro_per_ton,
                wind_percent: self.fuels.wind_percent,
            },
            intermittent,
            dispatchable,
        })
    }
}

/// Response record: plant name and its output rounded to 0.1 MW.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantOutput {
    pub name: String,
    pub p: f64,
}

/// Rounds a power value to one decimal place for presentation.
pub fn round_to_tenth(mw: f64) -> f64 {
    (mw * 10.0).round() / 10.0
}

impl From<&UnitDispatch> for PlantOutput {
    fn from(u: &UnitDispatch) -> Self {
        Self {
            name: u.name.clone(),
            p: round_to_tenth(u.output_mw),
        }
    }
}

/// Converts a plan into response records, keeping plan order.
pub fn plan_outputs(plan: &DispatchPlan) -> Vec<PlantOutput> {
    plan.iter().map(PlantOutput::from).collect()
}
