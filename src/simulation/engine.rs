//! Simulation driver
//!
//! Each day is scheduled for every agent in parallel (each agent-day draws
//! from its own RNG sub-stream), then played second by second. Within a
//! second every visible observer looks at every other visible agent in
//! ascending id order, after which memory eviction runs for everyone.

use std::time::Instant;

use rayon::prelude::*;

use crate::agent::Agent;
use crate::core::context::{substream, SimulationContext};
use crate::core::time::{SimTime, SECONDS_PER_DAY, SECONDS_PER_HOUR};
use crate::core::types::Point;
use crate::schedule::Scheduler;
use crate::simulation::encounter::SocialStep;
use crate::simulation::output::SimulationOutput;
use crate::simulation::presence::Presence;
use crate::social::memory;
use crate::world::Site;

pub struct Simulation {
    pub context: SimulationContext,
    pub site: Site,
    pub agents: Vec<Agent>,
    /// Destination place positions, for the conversation sight-line bonus
    pub destinations: Vec<Point>,
}

impl Simulation {
    pub fn new(context: SimulationContext, site: Site, agents: Vec<Agent>, destinations: Vec<Point>) -> Self {
        Self {
            context,
            site,
            agents,
            destinations,
        }
    }

    /// Build every agent's calendar for `day`
    pub fn schedule_day(&mut self, day: u32) {
        let scheduler = Scheduler::new(&self.site, &self.context.config, self.context.heartbeat());
        let seed = self.context.seed;

        self.agents.par_iter_mut().for_each(|agent| {
            let mut rng = substream(seed, day, agent.id);
            let calendar = scheduler.schedule_day(agent, day, &mut rng);
            agent.calendars.push(calendar);
        });

        for agent in &self.agents {
            let placed = agent.calendar(day).map_or(0, |c| c.activities().len());
            self.context.counters.get_mut(day, agent.id).activities += placed as u64;
        }
    }

    /// Play one scheduled day second by second
    pub fn run_encounters(&mut self, day: u32) {
        let mut previous: Vec<Option<Point>> = vec![None; self.agents.len()];

        for second in 0..SECONDS_PER_DAY {
            let now = SimTime::new(day, second);
            let presences = self.step_second(now, &previous);
            previous = presences.iter().map(|p| p.map(|p| p.position)).collect();

            if second % SECONDS_PER_HOUR == 0 {
                self.context.beat("encounter", now.absolute());
            }
        }
    }

    /// One second of the encounter phase
    ///
    /// `previous` holds each agent's position one second earlier, if it was
    /// visible then. Returns this second's presences, indexed like `agents`.
    pub fn step_second(&mut self, now: SimTime, previous: &[Option<Point>]) -> Vec<Option<Presence>> {
        let presences: Vec<Option<Presence>> = self
            .agents
            .iter()
            .enumerate()
            .map(|(i, agent)| {
                let prev = previous.get(i).copied().flatten();
                agent.calendar(now.day).and_then(|c| Presence::at(c, now.second, prev))
            })
            .collect();

        let present: Vec<usize> = presences
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|_| i))
            .collect();

        if present.len() >= 2 {
            let step = SocialStep::new(&self.site, &self.context.config, &self.destinations);
            for &i in &present {
                for &j in &present {
                    if i == j {
                        continue;
                    }
                    if let (Some(me), Some(them)) = (&presences[i], &presences[j]) {
                        step.observe(
                            &mut self.agents,
                            i,
                            j,
                            me,
                            them,
                            now,
                            &mut self.context.rng,
                            &mut self.context.counters,
                        );
                    }
                }
            }
        }

        for agent in self.agents.iter_mut() {
            if agent.social.in_mind.is_empty() {
                continue;
            }
            let eviction = memory::evict(&mut agent.social, now, &self.context.config.memory);
            if eviction.forgotten_encounters > 0 {
                self.context.counters.get_mut(now.day, agent.id).forgotten_encounters +=
                    eviction.forgotten_encounters as u64;
            }
        }

        presences
    }

    /// Run `days` days from day 0 and summarise
    pub fn run(&mut self, days: u32) -> SimulationOutput {
        let started = Instant::now();

        for day in 0..days {
            self.schedule_day(day);
            self.run_encounters(day);

            let totals = self.context.counters.day_total(day);
            tracing::info!(
                day,
                activities = totals.activities,
                encounters = totals.encounters,
                greetings = totals.greetings,
                conversations = totals.conversations,
                "day complete"
            );
        }

        SimulationOutput::new(self, days, started.elapsed())
    }
}
