//! Simulation output and serialization

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::context::{InteractionCounts, RunCounters};
use crate::core::error::Result;
use crate::core::types::{AgentId, PlaceId};
use crate::schedule::{Calendar, Placement, PlanKind};
use crate::simulation::engine::Simulation;
use crate::social::Interaction;
use crate::world::{BuildingType, PlaceRegistry};

/// Complete simulation output
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub run_id: Uuid,
    pub seed: u64,
    pub days: u32,
    pub building_type: BuildingType,
    pub agents: Vec<AgentSummary>,
    pub counters: RunCounters,
    pub statistics: SimulationStats,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentSummary {
    pub id: AgentId,
    pub name: String,
    pub agent_type: String,
    pub home: String,
    pub calendars: Vec<DayRecord>,
    pub totals: InteractionCounts,
    pub acquaintances: Vec<AgentId>,
    pub associates: Vec<AgentId>,
    pub interactions: Vec<PairLog>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DayRecord {
    pub day: u32,
    pub busy_seconds: u32,
    pub visible_seconds: u32,
    pub activities: Vec<ActivityRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub use_case: String,
    pub start_place: String,
    pub dwell_place: String,
    pub start_time: u32,
    pub end_time: u32,
    pub entering: PlanKind,
    pub exiting: PlanKind,
    pub placement: Placement,
}

/// Everything one agent logged about another
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PairLog {
    pub other: AgentId,
    pub interactions: Vec<Interaction>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SimulationStats {
    pub agents: u32,
    pub days_simulated: u32,
    pub simulation_time_ms: u64,
    pub totals: InteractionCounts,
    /// Share of encounters later marked forgotten
    pub forgotten_share: f64,
    pub mean_encounters_per_agent_day: f64,
    pub mean_greetings_per_agent_day: f64,
    pub mean_conversations_per_agent_day: f64,
}

fn place_name(places: &PlaceRegistry, id: PlaceId) -> String {
    places
        .get(id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| format!("#{}", id.0))
}

fn day_record(calendar: &Calendar, places: &PlaceRegistry) -> DayRecord {
    DayRecord {
        day: calendar.day(),
        busy_seconds: calendar.busy().count_ones(),
        visible_seconds: calendar.visible().count_ones(),
        activities: calendar
            .activities()
            .iter()
            .map(|a| ActivityRecord {
                use_case: a.use_case.clone(),
                start_place: place_name(places, a.start_place),
                dwell_place: place_name(places, a.dwell_place),
                start_time: a.start_time,
                end_time: a.end_time(),
                entering: a.entering.kind,
                exiting: a.exiting.kind,
                placement: a.placement,
            })
            .collect(),
    }
}

impl SimulationOutput {
    pub fn new(sim: &Simulation, days: u32, elapsed: Duration) -> Self {
        let places = &sim.site.places;
        let counters = &sim.context.counters;

        let agents: Vec<AgentSummary> = sim
            .agents
            .iter()
            .map(|agent| AgentSummary {
                id: agent.id,
                name: agent.name.clone(),
                agent_type: agent.agent_type.name.clone(),
                home: place_name(places, agent.home),
                calendars: agent.calendars.iter().map(|c| day_record(c, places)).collect(),
                totals: counters.agent_total(agent.id),
                acquaintances: agent.social.acquaintances.keys().copied().collect(),
                associates: agent.social.associates.keys().copied().collect(),
                interactions: agent
                    .social
                    .interaction_log
                    .iter()
                    .map(|(other, log)| PairLog {
                        other: *other,
                        interactions: log.clone(),
                    })
                    .collect(),
            })
            .collect();

        let mut totals = InteractionCounts::default();
        for day in 0..days {
            totals.add(&counters.day_total(day));
        }

        let agent_days = (agents.len() as f64 * days as f64).max(1.0);
        let per_agent_day = |n: u64| n as f64 / agent_days;
        let forgotten_share = if totals.encounters > 0 {
            totals.forgotten_encounters as f64 / totals.encounters as f64
        } else {
            0.0
        };

        let statistics = SimulationStats {
            agents: agents.len() as u32,
            days_simulated: days,
            simulation_time_ms: elapsed.as_millis() as u64,
            totals,
            forgotten_share,
            mean_encounters_per_agent_day: per_agent_day(totals.encounters),
            mean_greetings_per_agent_day: per_agent_day(totals.greetings),
            mean_conversations_per_agent_day: per_agent_day(totals.conversations),
        };

        Self {
            run_id: Uuid::new_v4(),
            seed: sim.context.seed,
            days,
            building_type: sim.site.building_type,
            agents,
            counters: counters.clone(),
            statistics,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn summary(&self) -> String {
        let s = &self.statistics;
        format!(
            "Simulated {} agents for {} days in {}ms\n\
             {} activities, {} encounters ({:.1}% forgotten), {} greetings, {} conversations, {} promotions\n\
             per agent-day: {:.2} encounters, {:.2} greetings, {:.2} conversations",
            s.agents,
            s.days_simulated,
            s.simulation_time_ms,
            s.totals.activities,
            s.totals.encounters,
            s.forgotten_share * 100.0,
            s.totals.greetings,
            s.totals.conversations,
            s.totals.promotions,
            s.mean_encounters_per_agent_day,
            s.mean_greetings_per_agent_day,
            s.mean_conversations_per_agent_day,
        )
    }
}
