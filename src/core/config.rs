//! Simulation configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other. A scenario file can override any
//! of them under its `[config]` table; missing keys keep their defaults.

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

/// Configuration for the whole simulation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub scheduling: SchedulingConfig,
    pub transport: TransportConfig,
    pub memory: MemoryConfig,
    pub perception: PerceptionConfig,
    pub greeting: GreetingConfig,
    pub conversation: ConversationConfig,
}

// === SCHEDULING ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Extra seconds a free run must hold beyond the plan itself
    ///
    /// Leaves room for a conversation on the way without spilling into the
    /// next activity.
    pub conversation_headroom_secs: u32,

    /// Half-width of the symmetric jitter added to plan durations when
    /// choosing between candidates (seconds)
    pub plan_jitter_secs: u32,

    /// Emit a heartbeat every this many scanned seconds
    pub heartbeat_scan_interval: u32,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            conversation_headroom_secs: 120,
            plan_jitter_secs: 25,
            heartbeat_scan_interval: 10_000,
        }
    }
}

// === VERTICAL TRANSPORT ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Ceiling of the uniformly sampled wait for a car (seconds)
    pub max_wait_secs: f64,

    /// Doors opening and closing, added to both waiting and riding (seconds)
    pub door_cycle_secs: f64,

    /// Maximum car acceleration (m/s²)
    pub max_acceleration: f64,

    /// Maximum car speed (m/s)
    ///
    /// Short rides never reach it; the kinematic model switches from a
    /// triangular to a trapezoidal profile once distance > v²/a.
    pub max_speed: f64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_wait_secs: 60.0,
            door_cycle_secs: 10.0,
            max_acceleration: 1.0,
            max_speed: 2.5,
        }
    }
}

// === SHORT-TERM SOCIAL MEMORY ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Anchors not refreshed for longer than this are forgotten (seconds)
    pub memory_window_secs: u64,

    /// Maximum anchors held in mind after eviction
    pub max_in_mind: usize,

    /// Upper bound (exclusive) of the random interest given to a new anchor
    pub interest_max: f64,

    /// Salience lost per second since last perceived
    pub salience_decay_per_sec: f64,

    pub associate_bonus: f64,
    pub acquaintance_bonus: f64,
    pub consider_greeting_bonus: f64,
    pub consider_conversation_bonus: f64,

    /// Hard cap on capacity-eviction passes per observer per second
    pub max_eviction_passes: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            memory_window_secs: 15,
            max_in_mind: 7,
            interest_max: 50.0,
            salience_decay_per_sec: 0.1,
            associate_bonus: 150.0,
            acquaintance_bonus: 100.0,
            consider_greeting_bonus: 50.0,
            consider_conversation_bonus: 100.0,
            max_eviction_passes: 64,
        }
    }
}

// === PERCEPTION ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Horizontal separation must be strictly below this (metres)
    pub horizontal_range: f64,

    /// Vertical separation must be strictly below this (metres)
    ///
    /// Roughly one storey, so agents on different floors never meet.
    pub vertical_range: f64,

    /// Agents closer than this are treated as co-located and skip the
    /// line-of-sight query (metres)
    pub colocation_distance: f64,

    /// Openness lost per anchor already in mind
    pub in_mind_penalty: f64,
    /// Openness lost when the pair are acquainted
    pub acquainted_penalty: f64,
    /// Openness lost when the pair are associates
    pub associated_penalty: f64,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            horizontal_range: 30.0,
            vertical_range: 2.5,
            colocation_distance: 0.1,
            in_mind_penalty: 0.07,
            acquainted_penalty: 0.04,
            associated_penalty: 0.07,
        }
    }
}

// === GREETING AND PROMOTION ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreetingConfig {
    /// Mean and spread of the per-agent greeting distance (metres)
    pub greet_distance_mean: f64,
    pub greet_distance_spread: f64,

    /// Mean and spread of the per-agent collision distance (metres)
    pub collision_distance_mean: f64,
    pub collision_distance_spread: f64,

    /// Mean and spread of the per-agent awkwardness timeout (seconds)
    pub awkward_timeout_mean: f64,
    pub awkward_timeout_spread: f64,

    /// Strangers stop considering a greeting this long after first
    /// perception (seconds)
    pub stranger_horizon_secs: u64,

    pub associate_base: f64,
    pub acquaintance_base: f64,
    pub stranger_base: f64,

    /// Added when the other agent is inside the observer's view cone
    pub view_cone_bonus: f64,
    pub view_cone_half_angle_deg: f64,

    /// A new episode does not consider greeting again within this long of
    /// the last greeting (seconds)
    pub greeting_cooldown_secs: u64,

    /// Interactions needed before strangers become acquaintances
    pub acquaintance_interactions: usize,
    /// Greetings needed before acquaintances become associates
    pub associate_greetings: usize,
}

impl Default for GreetingConfig {
    fn default() -> Self {
        Self {
            greet_distance_mean: 8.0,
            greet_distance_spread: 1.0,
            collision_distance_mean: 1.5,
            collision_distance_spread: 0.5,
            awkward_timeout_mean: 5.0,
            awkward_timeout_spread: 2.0,
            stranger_horizon_secs: 60,
            associate_base: 1.0,
            acquaintance_base: 0.5,
            stranger_base: 0.05,
            view_cone_bonus: 0.10,
            view_cone_half_angle_deg: 60.0,
            greeting_cooldown_secs: 300,
            acquaintance_interactions: 5,
            associate_greetings: 5,
        }
    }
}

// === CONVERSATION ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    pub stranger_base: f64,
    pub acquaintance_base: f64,
    pub associate_base: f64,

    /// Closer than this earns a bonus, further a penalty (metres)
    pub moderate_distance: f64,
    /// Beyond this no conversation starts (metres)
    pub cutoff_distance: f64,
    pub distance_bonus: f64,
    pub distance_penalty: f64,

    /// Speeds above this are hasty (m/s)
    pub haste_threshold: f64,
    /// Probability lost per m/s of excess speed
    pub haste_scale: f64,

    /// Memory load of 3..=5 anchors gives a bonus, above 5 a penalty
    pub memory_load_bonus: f64,
    pub memory_load_penalty: f64,

    /// Radius of the 8-ray prospect-refuge scan (metres)
    pub prospect_radius: f64,
    pub prospect_heavy_penalty: f64,
    pub prospect_moderate_penalty: f64,

    /// Destination places visible within this distance give a bonus
    pub destination_sight_distance: f64,
    pub destination_sight_bonus: f64,

    /// Pause spaces attract conversations within this radius (metres)
    pub pause_attraction_radius: f64,
    pub pause_max_bonus: f64,

    /// Tight scan: heavy obstruction within this radius is confining
    pub intimacy_near_radius: f64,
    pub intimacy_near_penalty: f64,
    /// Looser scan: moderate obstruction within this radius feels intimate
    pub intimacy_far_radius: f64,
    pub intimacy_far_bonus: f64,

    pub semi_private_bonus: f64,

    pub daylight_bonus: f64,
    pub daylight_start_hour: u32,
    pub daylight_end_hour: u32,

    pub outside_hot_cold: f64,
    pub outside_raining: f64,
    pub outside_fair: f64,
    pub undercover_hot_cold: f64,
    pub undercover_raining: f64,
    pub undercover_fair: f64,

    /// A new episode does not consider conversation again within this long
    /// of the last conversation (seconds)
    pub conversation_cooldown_secs: u64,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            stranger_base: 0.01,
            acquaintance_base: 0.1,
            associate_base: 0.9,
            moderate_distance: 3.0,
            cutoff_distance: 10.0,
            distance_bonus: 0.1,
            distance_penalty: 0.2,
            haste_threshold: 1.0,
            haste_scale: 0.2,
            memory_load_bonus: 0.05,
            memory_load_penalty: 0.05,
            prospect_radius: 5.0,
            prospect_heavy_penalty: 0.10,
            prospect_moderate_penalty: 0.05,
            destination_sight_distance: 20.0,
            destination_sight_bonus: 0.05,
            pause_attraction_radius: 3.0,
            pause_max_bonus: 0.10,
            intimacy_near_radius: 1.5,
            intimacy_near_penalty: 0.10,
            intimacy_far_radius: 3.0,
            intimacy_far_bonus: 0.05,
            semi_private_bonus: 0.05,
            daylight_bonus: 0.05,
            daylight_start_hour: 7,
            daylight_end_hour: 19,
            outside_hot_cold: -0.20,
            outside_raining: -0.30,
            outside_fair: 0.10,
            undercover_hot_cold: -0.10,
            undercover_raining: 0.05,
            undercover_fair: 0.05,
            conversation_cooldown_secs: 900,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.memory.max_in_mind == 0 {
            return Err(SimError::InvalidConfig("max_in_mind must be at least 1".into()));
        }

        if self.memory.memory_window_secs == 0 {
            return Err(SimError::InvalidConfig("memory_window_secs must be positive".into()));
        }

        if self.transport.max_acceleration <= 0.0 || self.transport.max_speed <= 0.0 {
            return Err(SimError::InvalidConfig(
                "transport acceleration and speed must be positive".into(),
            ));
        }

        // Collision distance is the tighter of the two distance triggers
        if self.greeting.collision_distance_mean >= self.greeting.greet_distance_mean {
            return Err(SimError::InvalidConfig(format!(
                "collision_distance_mean ({}) should be < greet_distance_mean ({})",
                self.greeting.collision_distance_mean, self.greeting.greet_distance_mean
            )));
        }

        if self.conversation.moderate_distance >= self.conversation.cutoff_distance {
            return Err(SimError::InvalidConfig(format!(
                "moderate_distance ({}) should be < cutoff_distance ({})",
                self.conversation.moderate_distance, self.conversation.cutoff_distance
            )));
        }

        if self.conversation.intimacy_near_radius >= self.conversation.intimacy_far_radius {
            return Err(SimError::InvalidConfig(
                "intimacy_near_radius should be < intimacy_far_radius".into(),
            ));
        }

        if self.conversation.daylight_start_hour >= self.conversation.daylight_end_hour
            || self.conversation.daylight_end_hour > 24
        {
            return Err(SimError::InvalidConfig("daylight window must lie within 0-24h".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_distances_rejected() {
        let mut config = SimulationConfig::default();
        config.greeting.collision_distance_mean = 9.0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.conversation.cutoff_distance = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_override_from_toml() {
        let text = r#"
            [memory]
            max_in_mind = 5

            [conversation]
            daylight_bonus = 0.2
        "#;
        let config: SimulationConfig = toml::from_str(text).unwrap();
        assert_eq!(config.memory.max_in_mind, 5);
        assert_eq!(config.memory.memory_window_secs, 15);
        assert!((config.conversation.daylight_bonus - 0.2).abs() < 1e-9);
        assert_eq!(config.scheduling, SchedulingConfig::default());
    }
}
