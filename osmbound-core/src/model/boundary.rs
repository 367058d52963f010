use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Semantic kind of boundary requested by the caller.
///
/// The kind selects the Overpass query template upstream and is stamped
/// into the `type` property of every assembled feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    Neighborhood,
    Zipcode,
}

impl BoundaryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neighborhood => "neighborhood",
            Self::Zipcode => "zipcode",
        }
    }
}

impl fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoundaryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "neighborhood" => Ok(Self::Neighborhood),
            "zipcode" => Ok(Self::Zipcode),
            other => Err(Error::InvalidInput(format!(
                "Unknown boundary kind '{other}', expected 'neighborhood' or 'zipcode'"
            ))),
        }
    }
}

/// Geographic bounding box in WGS84 degrees
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Creates a validated bounding box
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a bound is not finite, lies outside
    /// the WGS84 range or if a minimum exceeds its maximum.
    pub fn new(min_lat: f64, min_lng: f64, max_lat: f64, max_lng: f64) -> Result<Self, Error> {
        let bbox = Self {
            min_lat,
            min_lng,
            max_lat,
            max_lng,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    fn validate(&self) -> Result<(), Error> {
        let bounds = [self.min_lat, self.min_lng, self.max_lat, self.max_lng];
        if bounds.iter().any(|value| !value.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "Bounding box contains non-finite values: {self}"
            )));
        }

        for lat in [self.min_lat, self.max_lat] {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(Error::InvalidInput(format!(
                    "Latitude {lat} is outside of [-90, 90]"
                )));
            }
        }
        for lng in [self.min_lng, self.max_lng] {
            if !(-180.0..=180.0).contains(&lng) {
                return Err(Error::InvalidInput(format!(
                    "Longitude {lng} is outside of [-180, 180]"
                )));
            }
        }

        if self.min_lat > self.max_lat || self.min_lng > self.max_lng {
            return Err(Error::InvalidInput(format!(
                "Bounding box minimum exceeds maximum: {self}"
            )));
        }

        Ok(())
    }

    /// Overpass QL bbox filter, `(south,west,north,east)`
    pub fn overpass_filter(&self) -> String {
        format!(
            "({},{},{},{})",
            self.min_lat, self.min_lng, self.max_lat, self.max_lng
        )
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] - [{}, {}]",
            self.min_lat, self.min_lng, self.max_lat, self.max_lng
        )
    }
}
