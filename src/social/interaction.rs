//! Interaction log entries and per-agent social state

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::time::SimTime;
use crate::core::types::{AgentId, Point};
use crate::social::anchor::{Anchor, Familiarity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Encounter,
    Greeting,
    Conversation,
}

/// One logged interaction, from the logging agent's point of view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Interaction {
    Encounter {
        at: SimTime,
        my_position: Point,
        their_position: Point,
        cooldown_secs: u64,
        /// Set later if the anchor was evicted soon after
        forgotten: bool,
    },
    Greeting {
        at: SimTime,
        my_position: Point,
        their_position: Point,
        cooldown_secs: u64,
    },
    Conversation {
        at: SimTime,
        my_position: Point,
        their_position: Point,
        cooldown_secs: u64,
        gathering: Point,
    },
}

impl Interaction {
    pub fn kind(&self) -> InteractionKind {
        match self {
            Interaction::Encounter { .. } => InteractionKind::Encounter,
            Interaction::Greeting { .. } => InteractionKind::Greeting,
            Interaction::Conversation { .. } => InteractionKind::Conversation,
        }
    }

    pub fn at(&self) -> SimTime {
        match self {
            Interaction::Encounter { at, .. } | Interaction::Greeting { at, .. } | Interaction::Conversation { at, .. } => {
                *at
            }
        }
    }

    pub fn cooldown_secs(&self) -> u64 {
        match self {
            Interaction::Encounter { cooldown_secs, .. }
            | Interaction::Greeting { cooldown_secs, .. }
            | Interaction::Conversation { cooldown_secs, .. } => *cooldown_secs,
        }
    }

    pub fn positions(&self) -> (Point, Point) {
        match self {
            Interaction::Encounter {
                my_position,
                their_position,
                ..
            }
            | Interaction::Greeting {
                my_position,
                their_position,
                ..
            }
            | Interaction::Conversation {
                my_position,
                their_position,
                ..
            } => (*my_position, *their_position),
        }
    }

    /// Still cooling down at `now`?
    pub fn cooling_at(&self, now: SimTime) -> bool {
        now.seconds_since(self.at()) < self.cooldown_secs()
    }
}

/// Everything an agent knows about the others
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialState {
    pub in_mind: BTreeMap<AgentId, Anchor>,
    /// Promotion time per acquaintance
    pub acquaintances: BTreeMap<AgentId, SimTime>,
    /// Promotion time per associate
    pub associates: BTreeMap<AgentId, SimTime>,
    pub interaction_log: BTreeMap<AgentId, Vec<Interaction>>,
}

impl SocialState {
    pub fn familiarity_with(&self, other: AgentId) -> Familiarity {
        if self.associates.contains_key(&other) {
            Familiarity::Associate
        } else if self.acquaintances.contains_key(&other) {
            Familiarity::Acquaintance
        } else {
            Familiarity::Stranger
        }
    }

    pub fn log(&mut self, other: AgentId, interaction: Interaction) {
        self.interaction_log.entry(other).or_default().push(interaction);
    }

    pub fn log_with(&self, other: AgentId) -> &[Interaction] {
        self.interaction_log.get(&other).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count_with(&self, other: AgentId, kind: InteractionKind) -> usize {
        self.log_with(other).iter().filter(|i| i.kind() == kind).count()
    }

    pub fn last_of_kind(&self, other: AgentId, kind: InteractionKind) -> Option<&Interaction> {
        self.log_with(other).iter().rev().find(|i| i.kind() == kind)
    }

    /// Mark the latest encounter with `other` forgotten if it happened
    /// within `window_secs` of `now`
    pub fn forget_latest_encounter(&mut self, other: AgentId, now: SimTime, window_secs: u64) -> bool {
        let Some(log) = self.interaction_log.get_mut(&other) else {
            return false;
        };
        let latest = log.iter_mut().rev().find(|i| i.kind() == InteractionKind::Encounter);
        match latest {
            Some(Interaction::Encounter { at, forgotten, .. }) if now.seconds_since(*at) <= window_secs => {
                *forgotten = true;
                true
            }
            _ => false,
        }
    }
}
