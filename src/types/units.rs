// src/types/units.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Kilometres in one international mile.
pub const KM_PER_MILE: f64 = 1.609344;

/// Distance unit for depths and radii. The catalog service works in kilometres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Kilometers,
    Miles,
}

impl DistanceUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Miles => "mi",
        }
    }

    fn in_km(&self) -> f64 {
        match self {
            DistanceUnit::Kilometers => 1.0,
            DistanceUnit::Miles => KM_PER_MILE,
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for DistanceUnit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "km" | "kilometer" | "kilometers" | "kilometre" | "kilometres" => {
                Ok(DistanceUnit::Kilometers)
            }
            "mi" | "mile" | "miles" => Ok(DistanceUnit::Miles),
            other => Err(ValidationError::new(
                "unit",
                format!("'{}' is not a distance unit (expected 'km' or 'mi')", other),
            )),
        }
    }
}

/// Converts a distance between units.
pub fn convert(value: f64, from: DistanceUnit, to: DistanceUnit) -> f64 {
    if from == to {
        return value;
    }
    value * (from.in_km() / to.in_km())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miles_to_kilometers() {
        let km = convert(100.0, DistanceUnit::Miles, DistanceUnit::Kilometers);
        assert!((km - 160.9344).abs() < 1e-9);
    }

    #[test]
    fn same_unit_is_identity() {
        assert_eq!(
            convert(42.5, DistanceUnit::Kilometers, DistanceUnit::Kilometers),
            42.5
        );
    }

    #[test]
    fn parses_unit_names_loosely() {
        assert_eq!(" MI ".parse::<DistanceUnit>(), Ok(DistanceUnit::Miles));
        assert_eq!("Kilometres".parse::<DistanceUnit>(), Ok(DistanceUnit::Kilometers));
        let err = "furlong".parse::<DistanceUnit>().unwrap_err();
        assert_eq!(err.field, "unit");
    }
}
