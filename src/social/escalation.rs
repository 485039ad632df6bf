//! Escalation: from noticing someone to greeting them, and tier promotion
//!
//! Acquaintances and associates greet on first sight in an episode.
//! Strangers need a reason: coming within the agent's greeting distance,
//! nearly colliding, or sharing space long enough for silence to get
//! awkward. Each fired trigger is one propensity draw.

use glam::DVec3;

use crate::agent::{Agent, AgentType, Thresholds};
use crate::core::config::GreetingConfig;
use crate::core::time::SimTime;
use crate::core::types::{AgentId, Point};
use crate::social::anchor::{Anchor, Familiarity};
use crate::social::interaction::{Interaction, InteractionKind, SocialState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GreetingTrigger {
    /// Known agent seen at the start of an episode
    FirstSight,
    Distance,
    Collision,
    Awkwardness,
}

/// Decide whether this second gives the observer a reason to greet
///
/// Updates the anchor's per-episode trigger state.
pub fn greeting_trigger(
    anchor: &mut Anchor,
    distance: f64,
    now: SimTime,
    new_episode: bool,
    thresholds: &Thresholds,
    config: &GreetingConfig,
) -> Option<GreetingTrigger> {
    if anchor.familiarity != Familiarity::Stranger {
        return (new_episode && anchor.consider_greeting).then_some(GreetingTrigger::FirstSight);
    }

    if !anchor.consider_greeting {
        return None;
    }
    if now.seconds_since(anchor.first_perceived) > config.stranger_horizon_secs {
        anchor.consider_greeting = false;
        return None;
    }

    if !anchor.distance_attempted && distance < thresholds.greet_distance {
        anchor.distance_attempted = true;
        return Some(GreetingTrigger::Distance);
    }
    if !anchor.collision_attempted && distance < thresholds.collision_distance {
        anchor.collision_attempted = true;
        return Some(GreetingTrigger::Collision);
    }

    match anchor.awkward_since {
        None => {
            anchor.awkward_since = Some(now);
            None
        }
        Some(since) if now.seconds_since(since) as f64 >= thresholds.awkward_timeout => {
            anchor.awkward_since = Some(now);
            Some(GreetingTrigger::Awkwardness)
        }
        Some(_) => None,
    }
}

/// Is `target` inside the cone around `heading` seen from `from`?
///
/// Without a heading (standing still) nothing is in the cone.
pub fn in_view_cone(heading: Option<DVec3>, from: Point, target: Point, half_angle_deg: f64) -> bool {
    let Some(heading) = heading else {
        return false;
    };
    let to_target = DVec3::new(target.x - from.x, target.y - from.y, 0.0);
    if to_target.length_squared() <= f64::EPSILON {
        return true;
    }
    heading.angle_between(to_target).to_degrees() <= half_angle_deg
}

pub fn greeting_propensity(
    familiarity: Familiarity,
    in_view_cone: bool,
    agent_type: &AgentType,
    config: &GreetingConfig,
) -> f64 {
    let base = match familiarity {
        Familiarity::Associate => config.associate_base,
        Familiarity::Acquaintance => config.acquaintance_base,
        Familiarity::Stranger => config.stranger_base,
    } * agent_type.greeting_baseline_scale;
    let cone = if in_view_cone { config.view_cone_bonus } else { 0.0 };
    ((base + cone) * (1.0 - agent_type.caution)).clamp(0.0, 1.0)
}

/// Promote the tier with `other` if the log now warrants it
///
/// Returns the new tier. The anchor, if any, follows immediately.
pub fn promote(state: &mut SocialState, other: AgentId, now: SimTime, config: &GreetingConfig) -> Option<Familiarity> {
    let mut promoted = None;

    if state.familiarity_with(other) == Familiarity::Stranger
        && state.log_with(other).len() >= config.acquaintance_interactions
    {
        state.acquaintances.insert(other, now);
        promoted = Some(Familiarity::Acquaintance);
    }
    if state.familiarity_with(other) == Familiarity::Acquaintance
        && state.count_with(other, InteractionKind::Greeting) >= config.associate_greetings
    {
        state.associates.insert(other, now);
        promoted = Some(Familiarity::Associate);
    }

    if let Some(tier) = promoted {
        if let Some(anchor) = state.in_mind.get_mut(&other) {
            anchor.familiarity = anchor.familiarity.max(tier);
        }
    }
    promoted
}

/// Log a greeting on both sides and stop both considering another
pub fn record_greeting(a: &mut Agent, b: &mut Agent, a_position: Point, b_position: Point, now: SimTime, cooldown_secs: u64) {
    let (a_id, b_id) = (a.id, b.id);
    for (me, them, mine, theirs) in [(a, b_id, a_position, b_position), (b, a_id, b_position, a_position)] {
        me.social.log(
            them,
            Interaction::Greeting {
                at: now,
                my_position: mine,
                their_position: theirs,
                cooldown_secs,
            },
        );
        if let Some(anchor) = me.social.in_mind.get_mut(&them) {
            anchor.consider_greeting = false;
        }
    }
}

/// Log a conversation on both sides and stop both considering another
pub fn record_conversation(
    a: &mut Agent,
    b: &mut Agent,
    a_position: Point,
    b_position: Point,
    gathering: Point,
    now: SimTime,
    cooldown_secs: u64,
) {
    let (a_id, b_id) = (a.id, b.id);
    for (me, them, mine, theirs) in [(a, b_id, a_position, b_position), (b, a_id, b_position, a_position)] {
        me.social.log(
            them,
            Interaction::Conversation {
                at: now,
                my_position: mine,
                their_position: theirs,
                cooldown_secs,
                gathering,
            },
        );
        if let Some(anchor) = me.social.in_mind.get_mut(&them) {
            anchor.consider_conversation = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> Thresholds {
        Thresholds {
            greet_distance: 8.0,
            collision_distance: 1.5,
            awkward_timeout: 5.0,
        }
    }

    fn stranger(now: SimTime) -> Anchor {
        Anchor::new(AgentId(1), now, 10.0, Familiarity::Stranger)
    }

    fn agent_type(caution: f64) -> AgentType {
        AgentType {
            name: "t".into(),
            velocity: 1.0,
            openness: 1.0,
            caution,
            greeting_baseline_scale: 1.0,
            conversation_baseline_scale: 1.0,
        }
    }

    #[test]
    fn test_known_agents_greet_only_on_first_sight() {
        let config = GreetingConfig::default();
        let now = SimTime::new(0, 0);
        let mut anchor = Anchor::new(AgentId(1), now, 0.0, Familiarity::Acquaintance);
        assert_eq!(
            greeting_trigger(&mut anchor, 20.0, now, true, &thresholds(), &config),
            Some(GreetingTrigger::FirstSight)
        );
        assert_eq!(greeting_trigger(&mut anchor, 0.5, now, false, &thresholds(), &config), None);
    }

    #[test]
    fn test_collision_trigger_fires_once() {
        let config = GreetingConfig::default();
        let start = SimTime::new(0, 0);
        let mut anchor = stranger(start);
        let mut collisions = 0;
        for s in 0..3 {
            let t = greeting_trigger(&mut anchor, 1.0, SimTime::new(0, s), s == 0, &thresholds(), &config);
            if t == Some(GreetingTrigger::Collision) {
                collisions += 1;
            }
        }
        assert_eq!(collisions, 1);
        assert!(anchor.distance_attempted && anchor.collision_attempted);
    }

    #[test]
    fn test_awkwardness_timer_restarts() {
        let config = GreetingConfig::default();
        let mut anchor = stranger(SimTime::new(0, 0));
        anchor.distance_attempted = true;
        anchor.collision_attempted = true;

        let fired: Vec<u32> = (0..12)
            .filter(|&s| {
                greeting_trigger(&mut anchor, 20.0, SimTime::new(0, s), false, &thresholds(), &config)
                    == Some(GreetingTrigger::Awkwardness)
            })
            .collect();
        assert_eq!(fired, vec![5, 10]);
    }

    #[test]
    fn test_stranger_horizon_disables_greeting() {
        let config = GreetingConfig::default();
        let mut anchor = stranger(SimTime::new(0, 0));
        assert_eq!(
            greeting_trigger(&mut anchor, 1.0, SimTime::new(0, 61), false, &thresholds(), &config),
            None
        );
        assert!(!anchor.consider_greeting);
    }

    #[test]
    fn test_view_cone() {
        let east = Some(DVec3::X);
        assert!(in_view_cone(east, Point::ZERO, Point::new(5.0, 1.0, 0.0), 60.0));
        assert!(!in_view_cone(east, Point::ZERO, Point::new(-5.0, 0.0, 0.0), 60.0));
        assert!(!in_view_cone(None, Point::ZERO, Point::new(5.0, 0.0, 0.0), 60.0));
    }

    #[test]
    fn test_greeting_propensity() {
        let config = GreetingConfig::default();
        let p = greeting_propensity(Familiarity::Stranger, true, &agent_type(0.5), &config);
        assert!((p - 0.075).abs() < 1e-9);
        let p = greeting_propensity(Familiarity::Associate, true, &agent_type(0.0), &config);
        assert_eq!(p, 1.0);
    }

    #[test]
    fn test_promotion_is_monotonic() {
        let config = GreetingConfig::default();
        let mut state = SocialState::default();
        let other = AgentId(4);
        let now = SimTime::new(0, 0);
        let greet = Interaction::Greeting {
            at: now,
            my_position: Point::ZERO,
            their_position: Point::X,
            cooldown_secs: 0,
        };

        for _ in 0..4 {
            state.log(other, greet.clone());
        }
        assert_eq!(promote(&mut state, other, now, &config), None);

        state.log(other, greet.clone());
        state.in_mind.insert(other, Anchor::new(other, now, 0.0, Familiarity::Stranger));
        // Five greetings: acquainted and associated in one step
        assert_eq!(promote(&mut state, other, now, &config), Some(Familiarity::Associate));
        assert_eq!(state.familiarity_with(other), Familiarity::Associate);
        assert_eq!(state.in_mind[&other].familiarity, Familiarity::Associate);
        assert!(state.acquaintances.contains_key(&other));
        assert_eq!(promote(&mut state, other, now, &config), None);
    }
}
