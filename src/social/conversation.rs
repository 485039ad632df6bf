//! Conversation propensity
//!
//! Starts from a per-tier base and applies a fixed sequence of spatial,
//! temporal and weather adjustments, clamping to [0, 1] after each.

use std::f64::consts::TAU;

use glam::DVec3;

use crate::core::config::ConversationConfig;
use crate::core::time::is_daylight_hour;
use crate::core::types::Point;
use crate::social::anchor::Familiarity;
use crate::world::visibility::VisibilityClassifier;
use crate::world::weather::WeatherCondition;

const RAY_COUNT: usize = 8;
const DEGREES_PER_RAY: f64 = 360.0 / RAY_COUNT as f64;

/// The observer's side of a greeting that might become a conversation
#[derive(Debug, Clone, Copy)]
pub struct ConversationScene {
    pub familiarity: Familiarity,
    /// Horizontal separation (metres)
    pub distance: f64,
    /// Observer speed (m/s)
    pub speed: f64,
    /// Anchors the observer holds
    pub in_mind: usize,
    pub position: Point,
    pub hour: u32,
    pub weather: WeatherCondition,
    pub caution: f64,
    pub baseline_scale: f64,
}

/// Degrees of horizon blocked within `radius`, sampled with 8 rays
pub fn blocked_degrees(visibility: &dyn VisibilityClassifier, origin: Point, radius: f64) -> f64 {
    let blocked = (0..RAY_COUNT)
        .filter(|&k| {
            let angle = k as f64 * TAU / RAY_COUNT as f64;
            let end = origin + DVec3::new(angle.cos() * radius, angle.sin() * radius, 0.0);
            !visibility.line_of_sight(origin, end)
        })
        .count();
    blocked as f64 * DEGREES_PER_RAY
}

fn adjust(p: f64, delta: f64) -> f64 {
    (p + delta).clamp(0.0, 1.0)
}

fn distance_adjustment(distance: f64, config: &ConversationConfig) -> Option<f64> {
    if distance >= config.cutoff_distance {
        return None;
    }
    if distance <= config.moderate_distance {
        Some(config.distance_bonus * (1.0 - distance / config.moderate_distance))
    } else {
        let span = config.cutoff_distance - config.moderate_distance;
        Some(-config.distance_penalty * (distance - config.moderate_distance) / span)
    }
}

pub fn propensity(
    scene: &ConversationScene,
    visibility: &dyn VisibilityClassifier,
    destinations: &[Point],
    config: &ConversationConfig,
) -> f64 {
    let base = match scene.familiarity {
        Familiarity::Associate => config.associate_base,
        Familiarity::Acquaintance => config.acquaintance_base,
        Familiarity::Stranger => config.stranger_base,
    };
    let mut p = (base * scene.baseline_scale).clamp(0.0, 1.0);

    // Distance
    match distance_adjustment(scene.distance, config) {
        Some(delta) => p = adjust(p, delta),
        None => return 0.0,
    }

    // Haste
    if scene.speed > config.haste_threshold {
        p = adjust(p, -(scene.speed - config.haste_threshold) * config.haste_scale);
    }

    // Memory load
    if (3..=5).contains(&scene.in_mind) {
        p = adjust(p, config.memory_load_bonus);
    } else if scene.in_mind > 5 {
        p = adjust(p, -config.memory_load_penalty);
    }

    // Prospect and refuge
    let prospect = blocked_degrees(visibility, scene.position, config.prospect_radius);
    if prospect > 270.0 {
        p = adjust(p, -config.prospect_heavy_penalty);
    } else if prospect > 180.0 {
        p = adjust(p, -config.prospect_moderate_penalty);
    }

    // A destination in sight
    let sees_destination = destinations.iter().any(|d| {
        d.distance(scene.position) <= config.destination_sight_distance && visibility.line_of_sight(scene.position, *d)
    });
    if sees_destination {
        p = adjust(p, config.destination_sight_bonus);
    }

    // Pause space attraction
    if let Some(pause) = visibility.nearest_pause_space(scene.position) {
        let d = pause.distance(scene.position);
        if d <= config.pause_attraction_radius {
            p = adjust(p, config.pause_max_bonus * (1.0 - d / config.pause_attraction_radius));
        }
    }

    // Confinement and intimacy
    if blocked_degrees(visibility, scene.position, config.intimacy_near_radius) > 270.0 {
        p = adjust(p, -config.intimacy_near_penalty);
    } else if blocked_degrees(visibility, scene.position, config.intimacy_far_radius) > 180.0 {
        p = adjust(p, config.intimacy_far_bonus);
    }

    let space = visibility.space_type_at(scene.position);
    if space.semi_private {
        p = adjust(p, config.semi_private_bonus);
    }

    if is_daylight_hour(scene.hour, config.daylight_start_hour, config.daylight_end_hour) {
        p = adjust(p, config.daylight_bonus);
    }

    // Weather by exposure; inside is neutral
    let table = if space.outside {
        Some((config.outside_hot_cold, config.outside_raining, config.outside_fair))
    } else if space.undercover {
        Some((config.undercover_hot_cold, config.undercover_raining, config.undercover_fair))
    } else {
        None
    };
    if let Some((hot_cold, raining, fair)) = table {
        if scene.weather.is_fair() {
            p = adjust(p, fair);
        } else {
            if scene.weather.hot_cold {
                p = adjust(p, hot_cold);
            }
            if scene.weather.raining {
                p = adjust(p, raining);
            }
        }
    }

    (p * (1.0 - scene.caution)).clamp(0.0, 1.0)
}

/// Where a conversation gathers: a nearby pause space, else where the
/// observer stands
pub fn gathering_point(position: Point, visibility: &dyn VisibilityClassifier, config: &ConversationConfig) -> Point {
    visibility
        .nearest_pause_space(position)
        .filter(|p| p.distance(position) <= config.pause_attraction_radius)
        .unwrap_or(position)
}
