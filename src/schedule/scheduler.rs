//! Calendar scheduler
//!
//! Turns an agent's ranked use cases into one day's calendar. The first root
//! use case to occur seeds the empty day at a random point in its window.
//! Later roots and every other use case are fitted by scanning the busy mask
//! second by second for a long enough free run, ending runs early when the
//! weather makes an optional exposed destination unusable.
//!
//! Failures are local: an instance with no reachable place, no route or no
//! room is skipped with a debug log and the day carries on.

use rand::Rng;

use crate::agent::{Agent, OpportunityFunction, PlaceSelector, TypicalTime, UseCase};
use crate::core::config::SimulationConfig;
use crate::core::context::Heartbeat;
use crate::core::time::{DayKind, SECONDS_PER_DAY};
use crate::core::types::PlaceId;
use crate::schedule::action::Plan;
use crate::schedule::calendar::{Activity, Calendar, Placement};
use crate::schedule::plan::PlanBuilder;
use crate::world::Site;

/// Roulette-wheel draw over weighted places, in slice order
pub fn roulette<R: Rng>(weighted: &[(PlaceId, f64)], rng: &mut R) -> Option<PlaceId> {
    let total: f64 = weighted.iter().map(|(_, w)| w).sum();
    if !(total > 0.0) {
        return None;
    }

    let draw = rng.gen::<f64>() * total;
    let mut cumulative = 0.0;
    for (id, weight) in weighted {
        cumulative += weight;
        if draw < cumulative {
            return Some(*id);
        }
    }
    weighted.last().map(|(id, _)| *id)
}

/// Occurrence draw against the day's base propensity
///
/// Independent of how much room is available.
fn occurs<R: Rng>(use_case: &UseCase, day: DayKind, rng: &mut R) -> bool {
    rng.gen::<f64>() < use_case.base_propensity(day)
}

/// Places and plans resolved for one use-case instance
struct Prepared {
    start: PlaceId,
    dwell_place: PlaceId,
    entering: Plan,
    exiting: Plan,
    earliest: u32,
    latest: u32,
    plan_duration: u32,
}

enum Attempt {
    Placed(Activity),
    /// Occurrence draw failed; keep scanning
    Declined,
    /// Give up on this instance
    Abandoned,
}

struct DayPass {
    day: u32,
    day_kind: DayKind,
    calendar: Calendar,
    scanned: u64,
}

pub struct Scheduler<'a> {
    site: &'a Site,
    config: &'a SimulationConfig,
    heartbeat: &'a dyn Heartbeat,
}

impl<'a> Scheduler<'a> {
    pub fn new(site: &'a Site, config: &'a SimulationConfig, heartbeat: &'a dyn Heartbeat) -> Self {
        Self {
            site,
            config,
            heartbeat,
        }
    }

    fn builder(&self) -> PlanBuilder<'_> {
        PlanBuilder::new(self.site.routes.as_ref(), &self.site.places, &self.config.transport)
    }

    /// Build one day's calendar for an agent
    pub fn schedule_day<R: Rng>(&self, agent: &Agent, day: u32, rng: &mut R) -> Calendar {
        let mut pass = DayPass {
            day,
            day_kind: DayKind::from_day(day),
            calendar: Calendar::new(day),
            scanned: 0,
        };

        let (roots, fitted): (Vec<_>, Vec<_>) = agent.use_cases.iter().partition(|u| u.is_root());

        for use_case in roots {
            for slot in &use_case.typical_times {
                // Only an empty day can take a root without a conflict check
                if pass.calendar.activities().is_empty() {
                    self.place_root(agent, use_case, slot, &mut pass, rng);
                } else {
                    self.place_fitted(agent, use_case, slot, &mut pass, rng);
                }
            }
        }
        for use_case in fitted {
            for slot in &use_case.typical_times {
                self.place_fitted(agent, use_case, slot, &mut pass, rng);
            }
        }

        tracing::trace!(
            agent = agent.id.0,
            day,
            activities = pass.calendar.activities().len(),
            scanned = pass.scanned,
            "day scheduled"
        );
        pass.calendar
    }

    fn choose_place<R: Rng>(&self, agent: &Agent, selector: &PlaceSelector, rng: &mut R) -> Option<PlaceId> {
        match selector {
            PlaceSelector::OwnPlace => Some(agent.home),
            PlaceSelector::Classes(_) => {
                let reachable = self
                    .site
                    .routes
                    .places_reachable_on_foot(agent.home, &selector.class_names());
                let weighted: Vec<(PlaceId, f64)> = reachable
                    .keys()
                    .filter_map(|id| {
                        let place = self.site.places.get(*id)?;
                        let weight = selector.weight_of(&place.class);
                        (weight > 0.0).then_some((*id, weight))
                    })
                    .collect();
                roulette(&weighted, rng)
            }
        }
    }

    /// Shortest candidate after jitter; ties keep the first
    fn pick<R: Rng>(&self, plans: Vec<Plan>, rng: &mut R) -> Option<Plan> {
        let jitter = self.config.scheduling.plan_jitter_secs as i64;
        plans
            .into_iter()
            .map(|plan| (plan.duration() as i64 + rng.gen_range(-jitter..=jitter), plan))
            .min_by_key(|(key, _)| *key)
            .map(|(_, plan)| plan)
    }

    fn prepare<R: Rng>(
        &self,
        agent: &Agent,
        use_case: &UseCase,
        slot: &TypicalTime,
        day: u32,
        rng: &mut R,
    ) -> Option<Prepared> {
        let Some(start) = self.choose_place(agent, &use_case.start, rng) else {
            tracing::debug!(agent = agent.id.0, use_case = %use_case.name, "no reachable start place");
            return None;
        };
        let Some(dwell_place) = self.choose_place(agent, &use_case.destination, rng) else {
            tracing::debug!(agent = agent.id.0, use_case = %use_case.name, "no reachable destination");
            return None;
        };

        let weather = self.site.weather.condition_at(day, slot.at);
        let speed = agent.agent_type.velocity;
        let builder = self.builder();

        let entering = builder.candidates(start, dwell_place, weather, speed, rng);
        let Some(entering) = self.pick(entering, rng) else {
            tracing::debug!(agent = agent.id.0, use_case = %use_case.name, "no entering route");
            return None;
        };
        let exiting = builder.candidates(dwell_place, start, weather, speed, rng);
        let Some(exiting) = self.pick(exiting, rng) else {
            tracing::debug!(agent = agent.id.0, use_case = %use_case.name, "no exiting route");
            return None;
        };

        let (earliest, latest) = slot.window();
        let plan_duration = entering.duration() + use_case.dwell_secs + exiting.duration();
        Some(Prepared {
            start,
            dwell_place,
            entering,
            exiting,
            earliest,
            latest,
            plan_duration,
        })
    }

    /// Free seconds a fitted instance needs: the plan plus conversation headroom
    fn required(&self, plan_duration: u32) -> u32 {
        plan_duration + self.config.scheduling.conversation_headroom_secs
    }

    fn place_root<R: Rng>(
        &self,
        agent: &Agent,
        use_case: &UseCase,
        slot: &TypicalTime,
        pass: &mut DayPass,
        rng: &mut R,
    ) {
        let Some(prep) = self.prepare(agent, use_case, slot, pass.day, rng) else {
            return;
        };
        if !occurs(use_case, pass.day_kind, rng) {
            return;
        }
        let Some(dwell) = self.builder().dwell(prep.dwell_place, use_case.dwell_secs) else {
            return;
        };

        let start_time = rng.gen_range(prep.earliest..=prep.latest);
        pass.calendar.place(Activity {
            use_case: use_case.name.clone(),
            opportunity: use_case.opportunity,
            start_place: prep.start,
            dwell_place: prep.dwell_place,
            entering: prep.entering,
            dwell,
            exiting: prep.exiting,
            start_time,
            speed: agent.agent_type.velocity,
            preemptible: true,
            placement: Placement::Seed,
        });
    }

    fn place_fitted<R: Rng>(
        &self,
        agent: &Agent,
        use_case: &UseCase,
        slot: &TypicalTime,
        pass: &mut DayPass,
        rng: &mut R,
    ) {
        let clearing = !use_case.is_root() && use_case.opportunity == OpportunityFunction::ClearCalendar;
        if clearing && !use_case.parents.iter().any(|p| pass.calendar.has_instance_of(p)) {
            tracing::debug!(agent = agent.id.0, use_case = %use_case.name, "no parent placed today");
            return;
        }

        let Some(prep) = self.prepare(agent, use_case, slot, pass.day, rng) else {
            return;
        };

        let exposure = self
            .site
            .places
            .get(prep.dwell_place)
            .map(|p| p.exposure)
            .unwrap_or_default();
        let weather_sensitive = use_case.optional && exposure.is_exposed();
        let interval = self.config.scheduling.heartbeat_scan_interval.max(1) as u64;
        let scan_end = (prep.latest + prep.plan_duration).min(SECONDS_PER_DAY);
        let required = self.required(prep.plan_duration);

        let mut run_start = prep.earliest;
        let mut run_len = 0u32;

        for t in prep.earliest..scan_end {
            pass.scanned += 1;
            if pass.scanned % interval == 0 {
                self.heartbeat.beat("schedule", pass.scanned);
            }

            let free = clearing || !pass.calendar.is_busy(t);
            let usable =
                !weather_sensitive || exposure.usable_for_activity(self.site.weather.condition_at(pass.day, t));
            if free && usable {
                if run_len == 0 {
                    run_start = t;
                }
                run_len += 1;
                continue;
            }

            if run_len >= required {
                match self.attempt(agent, use_case, &prep, pass, run_start, run_len, rng) {
                    Attempt::Placed(activity) => {
                        pass.calendar.place(activity);
                        return;
                    }
                    Attempt::Abandoned => return,
                    Attempt::Declined => {}
                }
            }
            run_len = 0;
        }

        if run_len >= required {
            if let Attempt::Placed(activity) = self.attempt(agent, use_case, &prep, pass, run_start, run_len, rng) {
                pass.calendar.place(activity);
                return;
            }
        }
        tracing::debug!(
            agent = agent.id.0,
            use_case = %use_case.name,
            day = pass.day,
            "window exhausted without placement"
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn attempt<R: Rng>(
        &self,
        agent: &Agent,
        use_case: &UseCase,
        prep: &Prepared,
        pass: &DayPass,
        run_start: u32,
        run_len: u32,
        rng: &mut R,
    ) -> Attempt {
        if !occurs(use_case, pass.day_kind, rng) {
            return Attempt::Declined;
        }

        let run_end = run_start + run_len;
        let latest_start = (run_start + (run_len - self.required(prep.plan_duration))).min(prep.latest);
        if latest_start < run_start {
            tracing::debug!(agent = agent.id.0, use_case = %use_case.name, "free run opens after the window");
            return Attempt::Abandoned;
        }
        let mut start_time = rng.gen_range(run_start..=latest_start);

        // Legs again under the weather at the moment they are walked
        let builder = self.builder();
        let speed = agent.agent_type.velocity;
        let weather = &self.site.weather;
        let Some(entering) = builder.rebuild(
            prep.entering.kind,
            prep.start,
            prep.dwell_place,
            weather.condition_at(pass.day, start_time),
            speed,
            rng,
        ) else {
            tracing::debug!(agent = agent.id.0, use_case = %use_case.name, "entering leg lost to weather");
            return Attempt::Abandoned;
        };
        let exit_at = start_time + entering.duration() + use_case.dwell_secs;
        let Some(exiting) = builder.rebuild(
            prep.exiting.kind,
            prep.dwell_place,
            prep.start,
            weather.condition_at(pass.day, exit_at),
            speed,
            rng,
        ) else {
            tracing::debug!(agent = agent.id.0, use_case = %use_case.name, "exiting leg lost to weather");
            return Attempt::Abandoned;
        };

        let needed = self.required(entering.duration() + use_case.dwell_secs + exiting.duration());
        if start_time + needed > run_end {
            if run_start + needed <= run_end {
                start_time = run_start;
            } else {
                tracing::debug!(agent = agent.id.0, use_case = %use_case.name, "recomputed plan no longer fits");
                return Attempt::Abandoned;
            }
        }

        let Some(dwell) = builder.dwell(prep.dwell_place, use_case.dwell_secs) else {
            return Attempt::Abandoned;
        };

        Attempt::Placed(Activity {
            use_case: use_case.name.clone(),
            opportunity: use_case.opportunity,
            start_place: prep.start,
            dwell_place: prep.dwell_place,
            entering,
            dwell,
            exiting,
            start_time,
            speed,
            preemptible: use_case.is_root(),
            placement: if use_case.is_root() {
                Placement::Seed
            } else if use_case.opportunity == OpportunityFunction::ClearCalendar {
                Placement::Clearing
            } else {
                Placement::Blocking
            },
        })
    }
}
