//! One observer noticing one other agent, and everything that follows
//!
//! Perception may open a new episode (anchor plus Encounter), after which
//! the escalation rules may fire a greeting and, right after a successful
//! greeting, a conversation. Greetings and conversations are logged on both
//! sides.

use rand::Rng;

use crate::agent::Agent;
use crate::core::config::SimulationConfig;
use crate::core::context::RunCounters;
use crate::core::time::SimTime;
use crate::core::types::{horizontal_distance, pair_mut, AgentId, Point};
use crate::simulation::presence::Presence;
use crate::social::conversation::{self, ConversationScene};
use crate::social::escalation::{self, GreetingTrigger};
use crate::social::{memory, Interaction};
use crate::world::Site;

pub struct SocialStep<'a> {
    pub site: &'a Site,
    pub config: &'a SimulationConfig,
    /// Positions of destination places, for the sight-line bonus
    pub destinations: &'a [Point],
}

impl<'a> SocialStep<'a> {
    pub fn new(site: &'a Site, config: &'a SimulationConfig, destinations: &'a [Point]) -> Self {
        Self {
            site,
            config,
            destinations,
        }
    }

    /// Observer `i` looks at agent `j` this second
    #[allow(clippy::too_many_arguments)]
    pub fn observe<R: Rng>(
        &self,
        agents: &mut [Agent],
        i: usize,
        j: usize,
        me: &Presence,
        them: &Presence,
        now: SimTime,
        rng: &mut R,
        counters: &mut RunCounters,
    ) {
        let other = agents[j].id;
        let observer = &agents[i];
        let openness = memory::openness(
            &observer.social,
            other,
            observer.agent_type.openness,
            me.location_openness(&self.site.places),
            &self.config.perception,
        );
        if rng.gen::<f64>() >= openness {
            return;
        }
        if !memory::can_perceive(
            me.position,
            them.position,
            self.site.visibility.as_ref(),
            &self.config.perception,
        ) {
            return;
        }

        let new_episode = !agents[i].social.in_mind.contains_key(&other);
        if new_episode {
            self.begin_episode(&mut agents[i], other, me.position, them.position, now, rng, counters);
        }
        if let Some(anchor) = agents[i].social.in_mind.get_mut(&other) {
            anchor.last_perceived = now;
        }

        self.escalate(agents, i, j, me, them, now, new_episode, rng, counters);
    }

    /// New anchor and Encounter, then the promotion check
    #[allow(clippy::too_many_arguments)]
    fn begin_episode<R: Rng>(
        &self,
        agent: &mut Agent,
        other: AgentId,
        my_position: Point,
        their_position: Point,
        now: SimTime,
        rng: &mut R,
        counters: &mut RunCounters,
    ) {
        memory::open_anchor(&mut agent.social, other, now, self.config, rng);
        agent.social.log(
            other,
            Interaction::Encounter {
                at: now,
                my_position,
                their_position,
                cooldown_secs: 0,
                forgotten: false,
            },
        );
        let counts = counters.get_mut(now.day, agent.id);
        counts.encounters += 1;

        if let Some(tier) = escalation::promote(&mut agent.social, other, now, &self.config.greeting) {
            counts.promotions += 1;
            tracing::debug!(agent = agent.id.0, other = other.0, ?tier, "promoted");
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn escalate<R: Rng>(
        &self,
        agents: &mut [Agent],
        i: usize,
        j: usize,
        me: &Presence,
        them: &Presence,
        now: SimTime,
        new_episode: bool,
        rng: &mut R,
        counters: &mut RunCounters,
    ) {
        let other = agents[j].id;
        let distance = horizontal_distance(me.position, them.position);

        let observer = &mut agents[i];
        let observer_id = observer.id;
        let thresholds = observer.thresholds;
        let Some(anchor) = observer.social.in_mind.get_mut(&other) else {
            return;
        };
        let Some(trigger) =
            escalation::greeting_trigger(anchor, distance, now, new_episode, &thresholds, &self.config.greeting)
        else {
            return;
        };
        let familiarity = anchor.familiarity;

        let counts = counters.get_mut(now.day, observer_id);
        counts.greeting_attempts += 1;
        match trigger {
            GreetingTrigger::Distance => counts.distance_triggers += 1,
            GreetingTrigger::Collision => counts.collision_triggers += 1,
            GreetingTrigger::Awkwardness => counts.awkwardness_triggers += 1,
            GreetingTrigger::FirstSight => {}
        }

        let in_cone = escalation::in_view_cone(
            me.heading,
            me.position,
            them.position,
            self.config.greeting.view_cone_half_angle_deg,
        );
        let p = escalation::greeting_propensity(familiarity, in_cone, &observer.agent_type, &self.config.greeting);
        if rng.gen::<f64>() >= p {
            return;
        }

        let (a, b) = pair_mut(agents, i, j);
        // The greeted agent must have noticed the greeter first
        if !b.social.in_mind.contains_key(&a.id) {
            self.begin_episode(b, a.id, them.position, me.position, now, rng, counters);
        }
        escalation::record_greeting(
            a,
            b,
            me.position,
            them.position,
            now,
            self.config.greeting.greeting_cooldown_secs,
        );
        counters.get_mut(now.day, a.id).greetings += 1;
        counters.get_mut(now.day, b.id).greetings += 1;

        let considering = a
            .social
            .in_mind
            .get(&b.id)
            .map_or(false, |anchor| anchor.consider_conversation);
        if !considering {
            return;
        }

        let scene = ConversationScene {
            familiarity: a.social.familiarity_with(b.id),
            distance,
            speed: me.speed,
            in_mind: a.social.in_mind.len(),
            position: me.position,
            hour: now.hour(),
            weather: self.site.weather.condition_at(now.day, now.second),
            caution: a.agent_type.caution,
            baseline_scale: a.agent_type.conversation_baseline_scale,
        };
        let visibility = self.site.visibility.as_ref();
        let p = conversation::propensity(&scene, visibility, self.destinations, &self.config.conversation);
        if rng.gen::<f64>() >= p {
            return;
        }

        let gathering = conversation::gathering_point(me.position, visibility, &self.config.conversation);
        escalation::record_conversation(
            a,
            b,
            me.position,
            them.position,
            gathering,
            now,
            self.config.conversation.conversation_cooldown_secs,
        );
        counters.get_mut(now.day, a.id).conversations += 1;
        counters.get_mut(now.day, b.id).conversations += 1;
        tracing::trace!(a = a.id.0, b = b.id.0, day = now.day, second = now.second, "conversation");
    }
}
