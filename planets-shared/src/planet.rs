//! Planet catalogue records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned planet identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanetId(pub i64);

impl fmt::Display for PlanetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PlanetId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// One entry of the `/planets` listing.
///
/// Only `planetId` and `name` are required; the descriptive fields are
/// carried through when the service provides them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Planet {
    pub planet_id: PlanetId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    /// Image file name as reported by the service (not a URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Distance from the sun, in the service's units (millions of km)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_from_sun: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_moons: Option<u32>,
}

impl Planet {
    /// Create a planet with only the required fields set.
    pub fn new(planet_id: impl Into<PlanetId>, name: impl Into<String>) -> Self {
        Self {
            planet_id: planet_id.into(),
            name: name.into(),
            overview: None,
            image: None,
            description: None,
            distance_from_sun: None,
            number_of_moons: None,
        }
    }
}
