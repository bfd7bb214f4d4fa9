//! Planar distances between map coordinates.
//!
//! Coordinates are taken as-is in the layer's coordinate system; no geodesic
//! correction is applied. A [`DistanceModel`] knows the unit of that system
//! and converts results into whichever unit the caller asks for, as long as
//! the conversion is linear. Angular and linear units never mix.

use crate::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DistanceError {
    #[error("unsupported distance unit: {0}")]
    UnsupportedUnit(String),
    #[error("cannot express {from} distances in {to}")]
    IncompatibleUnits { from: LinearUnit, to: LinearUnit },
}

/// Distance unit, either of the layer itself or requested by a caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearUnit {
    /// Whatever unit the layer's coordinates are in.
    MapUnits,
    Meters,
    Kilometers,
    Feet,
    Degrees,
}

impl LinearUnit {
    /// Length of one unit in meters, or `None` for non-linear units.
    fn meters(self) -> Option<f64> {
        match self {
            LinearUnit::Meters => Some(1.0),
            LinearUnit::Kilometers => Some(1000.0),
            LinearUnit::Feet => Some(0.3048),
            LinearUnit::MapUnits | LinearUnit::Degrees => None,
        }
    }
}

impl fmt::Display for LinearUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LinearUnit::MapUnits => "map units",
            LinearUnit::Meters => "meters",
            LinearUnit::Kilometers => "kilometers",
            LinearUnit::Feet => "feet",
            LinearUnit::Degrees => "degrees",
        };
        f.write_str(s)
    }
}

impl FromStr for LinearUnit {
    type Err = DistanceError;

    /// Parse a unit name as found in a CRS definition or on a command line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        let unit = match key.as_str() {
            "map" | "map units" | "map_units" | "mapunits" => LinearUnit::MapUnits,
            "m" | "meter" | "meters" | "metre" | "metres" => LinearUnit::Meters,
            "km" | "kilometer" | "kilometers" | "kilometre" | "kilometres" => {
                LinearUnit::Kilometers
            }
            "ft" | "foot" | "feet" | "international foot" => LinearUnit::Feet,
            "deg" | "degree" | "degrees" | "°" => LinearUnit::Degrees,
            _ => return Err(DistanceError::UnsupportedUnit(s.to_string())),
        };
        Ok(unit)
    }
}

/// Planar Euclidean distance model for one coordinate system.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceModel {
    /// Unit of the layer coordinates. `MapUnits` means "unknown".
    pub crs_unit: LinearUnit,
}

impl DistanceModel {
    pub fn new(crs_unit: LinearUnit) -> Self {
        Self { crs_unit }
    }

    /// Model for layers whose coordinate unit is unknown; only
    /// [`LinearUnit::MapUnits`] distances can be produced.
    pub fn map_units() -> Self {
        Self::new(LinearUnit::MapUnits)
    }

    /// Resolve the model from the unit name of a CRS definition.
    pub fn from_crs_unit(name: &str) -> Result<Self, DistanceError> {
        Ok(Self::new(name.parse()?))
    }

    /// Factor converting one coordinate unit into `unit`.
    pub fn scale_to(&self, unit: LinearUnit) -> Result<f64, DistanceError> {
        if unit == LinearUnit::MapUnits || unit == self.crs_unit {
            return Ok(1.0);
        }
        match (self.crs_unit.meters(), unit.meters()) {
            (Some(from), Some(to)) => Ok(from / to),
            _ => Err(DistanceError::IncompatibleUnits {
                from: self.crs_unit,
                to: unit,
            }),
        }
    }

    /// Convert a length expressed in `unit` into coordinate units.
    pub fn to_map_units(&self, length: f64, unit: LinearUnit) -> Result<f64, DistanceError> {
        Ok(length / self.scale_to(unit)?)
    }

    /// Planar distance between `a` and `b`, expressed in `unit`.
    #[inline]
    pub fn distance(&self, a: &Point, b: &Point, unit: LinearUnit) -> Result<f64, DistanceError> {
        Ok(nalgebra::distance(a, b) * self.scale_to(unit)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn map_unit_distance_is_euclidean() {
        let model = DistanceModel::map_units();
        let d = model
            .distance(&Point::new(0.0, 0.0), &Point::new(3.0, 4.0), LinearUnit::MapUnits)
            .unwrap();
        assert_relative_eq!(5.0, d);
    }

    #[test]
    fn converts_between_linear_units() {
        let model = DistanceModel::new(LinearUnit::Meters);
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1500.0, 0.0);
        assert_relative_eq!(
            1.5,
            model.distance(&a, &b, LinearUnit::Kilometers).unwrap(),
            max_relative = 1e-12
        );
        assert_relative_eq!(
            1500.0 / 0.3048,
            model.distance(&a, &b, LinearUnit::Feet).unwrap(),
            max_relative = 1e-12
        );
        assert_relative_eq!(
            250.0,
            model.to_map_units(0.25, LinearUnit::Kilometers).unwrap(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn degrees_and_meters_do_not_mix() {
        let model = DistanceModel::new(LinearUnit::Degrees);
        let err = model
            .distance(&Point::new(0.0, 0.0), &Point::new(0.001, 0.0), LinearUnit::Meters)
            .unwrap_err();
        assert_eq!(
            DistanceError::IncompatibleUnits {
                from: LinearUnit::Degrees,
                to: LinearUnit::Meters
            },
            err
        );
        let unknown = DistanceModel::map_units();
        assert!(unknown.scale_to(LinearUnit::Meters).is_err());
    }

    #[test]
    fn parses_crs_unit_names() {
        assert_eq!(LinearUnit::Meters, "metre".parse().unwrap());
        assert_eq!(LinearUnit::Degrees, " Degree ".parse().unwrap());
        assert_eq!(
            Err(DistanceError::UnsupportedUnit("furlong".to_string())),
            "furlong".parse::<LinearUnit>()
        );
        assert!(DistanceModel::from_crs_unit("US survey chain").is_err());
    }

    #[test]
    fn distance_is_symmetric_and_obeys_triangle_inequality() {
        let model = DistanceModel::new(LinearUnit::Meters);
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(120.0, -35.5),
            Point::new(-40.0, 310.0),
        ];
        for a in &pts {
            for b in &pts {
                let ab = model.distance(a, b, LinearUnit::Meters).unwrap();
                let ba = model.distance(b, a, LinearUnit::Meters).unwrap();
                assert!(ab >= 0.0);
                assert_relative_eq!(ab, ba);
                for c in &pts {
                    let ac = model.distance(a, c, LinearUnit::Meters).unwrap();
                    let cb = model.distance(c, b, LinearUnit::Meters).unwrap();
                    assert!(ab <= ac + cb + 1e-9);
                }
            }
        }
    }
}
