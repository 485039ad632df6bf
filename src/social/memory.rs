//! Short-term social memory
//!
//! Each agent holds a handful of anchors. Noticing someone depends on how
//! open the observer is and how much is already on their mind; once noticed,
//! the anchor is kept fresh while the other stays perceivable. Once per
//! second anchors idle past the memory window are dropped, then the least
//! salient are evicted down to the capacity.

use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use rand::Rng;

use crate::core::config::{MemoryConfig, PerceptionConfig, SimulationConfig};
use crate::core::time::SimTime;
use crate::core::types::{horizontal_distance, vertical_distance, AgentId, Point};
use crate::social::anchor::Anchor;
use crate::social::interaction::{InteractionKind, SocialState};
use crate::world::visibility::VisibilityClassifier;

/// Probability that `state`'s owner notices `other` this second
///
/// Knowing someone already lowers the chance, as does a full mind.
pub fn openness(
    state: &SocialState,
    other: AgentId,
    type_openness: f64,
    location_openness: f64,
    config: &PerceptionConfig,
) -> f64 {
    let mut load = config.in_mind_penalty * state.in_mind.len() as f64;
    if state.acquaintances.contains_key(&other) {
        load += config.acquainted_penalty;
    }
    if state.associates.contains_key(&other) {
        load += config.associated_penalty;
    }
    ((1.0 - load) * type_openness * location_openness).clamp(0.0, 1.0)
}

/// Range and sight test between two positions
pub fn can_perceive(a: Point, b: Point, visibility: &dyn VisibilityClassifier, config: &PerceptionConfig) -> bool {
    if horizontal_distance(a, b) >= config.horizontal_range || vertical_distance(a, b) >= config.vertical_range {
        return false;
    }
    a.distance(b) <= config.colocation_distance || visibility.line_of_sight(a, b)
}

/// Start a new episode with `other`
///
/// Greeting and conversation are not considered again while the last one
/// with this agent is still cooling down.
pub fn open_anchor<'a, R: Rng>(
    state: &'a mut SocialState,
    other: AgentId,
    now: SimTime,
    config: &SimulationConfig,
    rng: &mut R,
) -> &'a mut Anchor {
    let interest = if config.memory.interest_max > 0.0 {
        rng.gen_range(0.0..config.memory.interest_max)
    } else {
        0.0
    };
    let mut anchor = Anchor::new(other, now, interest, state.familiarity_with(other));

    let cooling = |kind| {
        state
            .last_of_kind(other, kind)
            .map_or(false, |last| last.cooling_at(now))
    };
    anchor.consider_greeting = !cooling(InteractionKind::Greeting);
    anchor.consider_conversation = !cooling(InteractionKind::Conversation);

    state.in_mind.entry(other).or_insert(anchor)
}

/// What one eviction pass removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Eviction {
    pub stale: usize,
    pub displaced: usize,
    pub forgotten_encounters: usize,
}

fn forget(state: &mut SocialState, other: AgentId, now: SimTime, window: u64, eviction: &mut Eviction) {
    state.in_mind.remove(&other);
    if state.forget_latest_encounter(other, now, window) {
        eviction.forgotten_encounters += 1;
    }
}

/// Drop stale anchors, then keep only the most salient
pub fn evict(state: &mut SocialState, now: SimTime, config: &MemoryConfig) -> Eviction {
    let mut eviction = Eviction::default();
    let window = config.memory_window_secs;

    let stale: Vec<AgentId> = state
        .in_mind
        .values()
        .filter(|a| a.is_stale(now, window))
        .map(|a| a.other)
        .collect();
    for other in stale {
        forget(state, other, now, window, &mut eviction);
        eviction.stale += 1;
    }

    let mut passes = 0;
    while state.in_mind.len() > config.max_in_mind {
        passes += 1;
        if passes > config.max_eviction_passes {
            tracing::error!(
                held = state.in_mind.len(),
                cap = config.max_in_mind,
                "eviction pass cap exceeded, abandoning"
            );
            break;
        }

        // Highest salience first, lower id wins ties
        let mut ranked: Vec<(AgentId, f64)> = state
            .in_mind
            .values()
            .map(|a| (a.other, a.salience(now, config)))
            .collect();
        ranked.sort_by_key(|(id, salience)| (Reverse(OrderedFloat(*salience)), *id));

        for (other, _) in ranked.into_iter().skip(config.max_in_mind) {
            forget(state, other, now, window, &mut eviction);
            eviction.displaced += 1;
        }
    }

    eviction
}
