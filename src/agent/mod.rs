//! Building occupants
//!
//! An agent is created once per household member and lives for the whole
//! run. Its calendars are appended day by day by the scheduler; its social
//! state is mutated second by second by the encounter engine.

pub mod archetype;
pub mod usecase;

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::GreetingConfig;
use crate::core::types::{AgentId, PlaceId};
use crate::schedule::Calendar;
use crate::social::SocialState;

pub use archetype::AgentType;
pub use usecase::{ActivityCatalogue, ClassPropensity, OpportunityFunction, PlaceSelector, TypicalTime, UseCase};

/// Per-agent greeting trigger thresholds, sampled once at creation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Strangers closer than this may trigger a greeting (metres)
    pub greet_distance: f64,
    /// Strangers closer than this are about to collide (metres)
    pub collision_distance: f64,
    /// Seconds of mutual awareness before silence becomes awkward
    pub awkward_timeout: f64,
}

fn around<R: Rng>(rng: &mut R, mean: f64, spread: f64) -> f64 {
    let spread = spread.abs();
    rng.gen_range(mean - spread..=mean + spread)
}

impl Thresholds {
    pub fn sample<R: Rng>(config: &GreetingConfig, rng: &mut R) -> Self {
        Self {
            greet_distance: around(rng, config.greet_distance_mean, config.greet_distance_spread),
            collision_distance: around(rng, config.collision_distance_mean, config.collision_distance_spread),
            awkward_timeout: around(rng, config.awkward_timeout_mean, config.awkward_timeout_spread),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub agent_type: Arc<AgentType>,
    pub home: PlaceId,
    /// Highest priority (longest dwell) first
    pub use_cases: Vec<Arc<UseCase>>,
    /// One per simulated day, indexed by day
    pub calendars: Vec<Calendar>,
    pub thresholds: Thresholds,
    pub social: SocialState,
}

impl Agent {
    pub fn new(
        id: AgentId,
        name: impl Into<String>,
        agent_type: Arc<AgentType>,
        home: PlaceId,
        use_cases: Vec<Arc<UseCase>>,
        thresholds: Thresholds,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            agent_type,
            home,
            use_cases,
            calendars: Vec::new(),
            thresholds,
            social: SocialState::default(),
        }
    }

    pub fn calendar(&self, day: u32) -> Option<&Calendar> {
        match self.calendars.get(day as usize) {
            Some(c) if c.day() == day => Some(c),
            _ => self.calendars.iter().find(|c| c.day() == day),
        }
    }
}
