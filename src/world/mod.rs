//! The simulated building: places, routes, visibility and weather

pub mod navgraph;
pub mod place;
pub mod route;
pub mod visibility;
pub mod weather;
pub mod zones;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::SimError;
use crate::core::types::Point;

pub use navgraph::{TransportBank, Waypoint, WaypointGraph};
pub use place::{Place, PlaceKind, PlaceRegistry};
pub use route::{polyline_length, CachedRoutes, Polyline, RouteProvider};
pub use visibility::{OpenFloor, SpaceTypeFlags, VisibilityClassifier};
pub use weather::{Exposure, WeatherCondition, WeatherTable};
pub use zones::ZoneClassifier;

/// Building use, selecting which use cases apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingType {
    Residential,
    Office,
    MixedUse,
}

impl FromStr for BuildingType {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "residential" => Ok(BuildingType::Residential),
            "office" => Ok(BuildingType::Office),
            "mixed_use" => Ok(BuildingType::MixedUse),
            _ => Err(SimError::UnknownBuildingType(s.to_string())),
        }
    }
}

impl fmt::Display for BuildingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildingType::Residential => "residential",
            BuildingType::Office => "office",
            BuildingType::MixedUse => "mixed_use",
        };
        f.write_str(name)
    }
}

/// Everything the engines need to know about the building
pub struct Site {
    pub building_type: BuildingType,
    pub places: PlaceRegistry,
    pub routes: Box<dyn RouteProvider>,
    pub visibility: Box<dyn VisibilityClassifier>,
    pub weather: WeatherTable,
}

impl Site {
    pub fn new(
        building_type: BuildingType,
        places: PlaceRegistry,
        routes: Box<dyn RouteProvider>,
        visibility: Box<dyn VisibilityClassifier>,
        weather: WeatherTable,
    ) -> Self {
        Self {
            building_type,
            places,
            routes,
            visibility,
            weather,
        }
    }

    /// Positions of every place whose class is in `classes`, in id order
    pub fn points_of_classes(&self, classes: &[String]) -> Vec<Point> {
        self.places
            .iter()
            .filter(|p| classes.iter().any(|c| *c == p.class))
            .map(|p| p.position)
            .collect()
    }
}
