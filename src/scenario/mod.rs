//! Scenario files
//!
//! A scenario is a single TOML document describing one building and its
//! occupants: agent types, use cases, households, places, the waypoint
//! graph with its transport banks, visibility zones, and weather. Any
//! simulation constant can be overridden under `[config]`.

pub mod loader;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::agent::{AgentType, UseCase};
use crate::core::config::SimulationConfig;
use crate::world::{BuildingType, Exposure, PlaceKind, SpaceTypeFlags};

/// Parsed scenario, not yet validated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub building_type: BuildingType,
    #[serde(default)]
    pub config: SimulationConfig,
    pub agent_types: Vec<AgentType>,
    pub use_cases: Vec<UseCase>,
    pub households: Vec<HouseholdSpec>,
    pub places: Vec<PlaceSpec>,
    pub waypoints: Vec<WaypointSpec>,
    /// Undirected walkable edges between waypoint indices
    #[serde(default)]
    pub edges: Vec<[usize; 2]>,
    #[serde(default)]
    pub banks: Vec<BankSpec>,
    #[serde(default)]
    pub zones: Vec<ZoneSpec>,
    #[serde(default)]
    pub walls: Vec<WallSpec>,
    #[serde(default)]
    pub pause_spaces: Vec<[f64; 3]>,
    /// Inline `hour,hot_cold,raining` rows
    #[serde(default)]
    pub weather: Option<String>,
    /// Weather table on disk; relative paths resolve against the scenario file
    #[serde(default)]
    pub weather_file: Option<PathBuf>,
}

/// `count` occupants of one agent type sharing a home
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseholdSpec {
    pub agent_type: String,
    pub home: String,
    #[serde(default = "one")]
    pub count: u32,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceSpec {
    pub name: String,
    pub class: String,
    pub position: [f64; 3],
    /// Waypoint the place is reached through
    pub waypoint: usize,
    #[serde(default)]
    pub exposure: Exposure,
    #[serde(default)]
    pub kind: PlaceKind,
    #[serde(default)]
    pub openness: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaypointSpec {
    pub position: [f64; 3],
    #[serde(default)]
    pub exposure: Exposure,
}

/// Lift or escalator bank, one door waypoint per floor served
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankSpec {
    pub name: String,
    pub doors: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneSpec {
    pub outline: Vec<[f64; 2]>,
    pub z_min: f64,
    pub z_max: f64,
    #[serde(default)]
    pub flags: SpaceTypeFlags,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallSpec {
    pub from: [f64; 2],
    pub to: [f64; 2],
    pub z_min: f64,
    pub z_max: f64,
}
