//! Use cases: recurring activity templates and the catalogue that ranks them

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::time::{deserialize_clock, DayKind, SECONDS_PER_DAY};
use crate::world::BuildingType;

/// How an activity interacts with what is already on the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityFunction {
    /// Needs a free run of seconds; never overlaps other blocking activities
    #[default]
    BlockCalendar,
    /// Brackets an already placed parent; ignores the busy mask
    ClearCalendar,
}

/// Weight of one place class in a roulette-wheel draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassPropensity {
    pub class: String,
    pub propensity: f64,
}

/// Where an activity starts or dwells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceSelector {
    /// The agent's home
    OwnPlace,
    /// Any reachable place of these classes, weighted by propensity
    Classes(Vec<ClassPropensity>),
}

impl PlaceSelector {
    pub fn class_names(&self) -> Vec<String> {
        match self {
            PlaceSelector::OwnPlace => Vec::new(),
            PlaceSelector::Classes(classes) => classes.iter().map(|c| c.class.clone()).collect(),
        }
    }

    /// Propensity for a place class, zero if not listed
    pub fn weight_of(&self, class: &str) -> f64 {
        match self {
            PlaceSelector::OwnPlace => 0.0,
            PlaceSelector::Classes(classes) => classes
                .iter()
                .find(|c| c.class == class)
                .map(|c| c.propensity)
                .unwrap_or(0.0),
        }
    }
}

/// A preferred start time with its tolerance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypicalTime {
    /// Second of day, written "HH:MM" or "HH:MM:SS" in scenario files
    #[serde(deserialize_with = "deserialize_clock")]
    pub at: u32,
    /// Seconds either side of `at`
    pub half_width: u32,
}

impl TypicalTime {
    /// Earliest and latest start, clamped to the day
    pub fn window(&self) -> (u32, u32) {
        let earliest = self.at.saturating_sub(self.half_width);
        let latest = self.at.saturating_add(self.half_width).min(SECONDS_PER_DAY - 1);
        (earliest, latest)
    }
}

/// A named recurring activity template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCase {
    pub name: String,
    /// Agent type this use case belongs to
    pub agent_type: String,
    pub start: PlaceSelector,
    pub destination: PlaceSelector,
    pub typical_times: Vec<TypicalTime>,
    pub dwell_secs: u32,
    pub workday_propensity: f64,
    pub day_off_propensity: f64,
    #[serde(default)]
    pub opportunity: OpportunityFunction,
    /// Weather-sensitive: skipped while its exposed destination is unusable
    #[serde(default)]
    pub optional: bool,
    /// Use cases this one depends on; empty makes it a root
    #[serde(default)]
    pub parents: Vec<String>,
    /// Building types it applies to; empty means all
    #[serde(default)]
    pub building_types: Vec<BuildingType>,
}

impl UseCase {
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn base_propensity(&self, day: DayKind) -> f64 {
        match day {
            DayKind::Workday => self.workday_propensity,
            DayKind::DayOff => self.day_off_propensity,
        }
    }

    pub fn applies_to(&self, building: BuildingType) -> bool {
        self.building_types.is_empty() || self.building_types.contains(&building)
    }
}

/// All use cases of a scenario
#[derive(Debug, Clone, Default)]
pub struct ActivityCatalogue {
    use_cases: Vec<Arc<UseCase>>,
}

impl ActivityCatalogue {
    /// Build and validate a catalogue
    pub fn new(use_cases: Vec<UseCase>) -> Result<Self> {
        let names: BTreeSet<&str> = use_cases.iter().map(|u| u.name.as_str()).collect();
        if names.len() != use_cases.len() {
            return Err(SimError::InvalidScenario("duplicate use case name".into()));
        }

        for uc in &use_cases {
            if uc.typical_times.is_empty() {
                return Err(SimError::InvalidScenario(format!("use case '{}' has no typical time", uc.name)));
            }
            for p in [uc.workday_propensity, uc.day_off_propensity] {
                if !(0.0..=1.0).contains(&p) {
                    return Err(SimError::InvalidScenario(format!(
                        "use case '{}' propensity {} outside 0..1",
                        uc.name, p
                    )));
                }
            }
            if let Some(missing) = uc.parents.iter().find(|p| !names.contains(p.as_str())) {
                return Err(SimError::InvalidScenario(format!(
                    "use case '{}' names unknown parent '{}'",
                    uc.name, missing
                )));
            }
            if uc.opportunity == OpportunityFunction::ClearCalendar && uc.is_root() {
                return Err(SimError::InvalidScenario(format!(
                    "use case '{}' clears the calendar but has no parent",
                    uc.name
                )));
            }
        }

        Ok(Self {
            use_cases: use_cases.into_iter().map(Arc::new).collect(),
        })
    }

    /// Use cases for an agent type in a building, longest dwell first
    ///
    /// Stable, so equal dwells keep catalogue order.
    pub fn ranked_for(&self, agent_type: &str, building: BuildingType) -> Vec<Arc<UseCase>> {
        let mut ranked: Vec<Arc<UseCase>> = self
            .use_cases
            .iter()
            .filter(|u| u.agent_type == agent_type && u.applies_to(building))
            .cloned()
            .collect();
        ranked.sort_by(|a, b| b.dwell_secs.cmp(&a.dwell_secs));
        ranked
    }

    /// Every place class named as a destination, sorted and deduplicated
    pub fn destination_classes(&self) -> Vec<String> {
        let classes: BTreeSet<String> = self
            .use_cases
            .iter()
            .flat_map(|u| u.destination.class_names())
            .collect();
        classes.into_iter().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<UseCase>> {
        self.use_cases.iter()
    }

    pub fn len(&self) -> usize {
        self.use_cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.use_cases.is_empty()
    }
}
