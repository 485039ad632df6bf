//! Anchors: what one agent currently holds in mind about another

use serde::{Deserialize, Serialize};

use crate::core::config::MemoryConfig;
use crate::core::time::SimTime;
use crate::core::types::AgentId;

/// Relationship tier; only ever moves up
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Familiarity {
    Stranger,
    Acquaintance,
    Associate,
}

/// Short-term memory of another agent during one episode of awareness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub other: AgentId,
    pub first_perceived: SimTime,
    pub last_perceived: SimTime,
    /// Random interest in [0, interest_max)
    pub interest: f64,
    pub familiarity: Familiarity,
    pub consider_greeting: bool,
    pub consider_conversation: bool,
    pub distance_attempted: bool,
    pub collision_attempted: bool,
    /// When the awkwardness timer was last (re)started
    pub awkward_since: Option<SimTime>,
}

impl Anchor {
    pub fn new(other: AgentId, now: SimTime, interest: f64, familiarity: Familiarity) -> Self {
        Self {
            other,
            first_perceived: now,
            last_perceived: now,
            interest,
            familiarity,
            consider_greeting: true,
            consider_conversation: true,
            distance_attempted: false,
            collision_attempted: false,
            awkward_since: None,
        }
    }

    /// Ranking score for capacity eviction
    pub fn salience(&self, now: SimTime, config: &MemoryConfig) -> f64 {
        let familiarity_bonus = match self.familiarity {
            Familiarity::Associate => config.associate_bonus,
            Familiarity::Acquaintance => config.acquaintance_bonus,
            Familiarity::Stranger => 0.0,
        };
        let decay = (now.seconds_since(self.last_perceived) as f64 * config.salience_decay_per_sec).max(0.0);

        let mut salience = familiarity_bonus + self.interest - decay;
        if self.consider_greeting {
            salience += config.consider_greeting_bonus;
        }
        if self.consider_conversation {
            salience += config.consider_conversation_bonus;
        }
        salience
    }

    pub fn is_stale(&self, now: SimTime, window_secs: u64) -> bool {
        now.seconds_since(self.last_perceived) > window_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_familiarity_orders_upwards() {
        assert!(Familiarity::Stranger < Familiarity::Acquaintance);
        assert!(Familiarity::Acquaintance < Familiarity::Associate);
    }

    #[test]
    fn test_salience_terms() {
        let config = MemoryConfig::default();
        let now = SimTime::new(0, 100);
        let mut anchor = Anchor::new(AgentId(1), SimTime::new(0, 90), 20.0, Familiarity::Acquaintance);

        // 100 + 20 - 1.0 + 50 + 100
        assert!((anchor.salience(now, &config) - 269.0).abs() < 1e-9);

        anchor.consider_greeting = false;
        anchor.consider_conversation = false;
        anchor.familiarity = Familiarity::Stranger;
        assert!((anchor.salience(now, &config) - 19.0).abs() < 1e-9);
    }

    #[test]
    fn test_staleness_crosses_midnight() {
        let anchor = Anchor::new(AgentId(1), SimTime::new(0, 86_395), 0.0, Familiarity::Stranger);
        assert!(!anchor.is_stale(SimTime::new(1, 10), 15));
        assert!(anchor.is_stale(SimTime::new(1, 11), 15));
    }
}
