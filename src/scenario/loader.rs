//! Load a scenario from TOML and assemble a runnable simulation

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use ahash::AHashMap;

use crate::agent::{ActivityCatalogue, Agent, AgentType, Thresholds};
use crate::core::context::{Heartbeat, SimulationContext, TracingHeartbeat};
use crate::core::error::{Result, SimError};
use crate::core::types::{AgentId, Point};
use crate::scenario::Scenario;
use crate::simulation::Simulation;
use crate::world::{
    CachedRoutes, OpenFloor, PlaceRegistry, Site, VisibilityClassifier, Waypoint, WaypointGraph, WeatherTable,
    ZoneClassifier,
};

impl Scenario {
    /// Load a scenario from a TOML file on disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut scenario = Self::from_str(&content)?;

        if let (Some(file), Some(dir)) = (scenario.weather_file.as_ref(), path.parent()) {
            if file.is_relative() {
                scenario.weather_file = Some(dir.join(file));
            }
        }
        Ok(scenario)
    }

    /// Parse a scenario from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Cross-check names and indices before anything is built
    pub fn validate(&self) -> Result<()> {
        self.config.validate()?;

        let mut type_names = BTreeSet::new();
        for agent_type in &self.agent_types {
            agent_type.validate()?;
            if !type_names.insert(agent_type.name.as_str()) {
                return Err(SimError::InvalidScenario(format!(
                    "agent type '{}' defined twice",
                    agent_type.name
                )));
            }
        }

        let mut place_names = BTreeSet::new();
        for place in &self.places {
            if !place_names.insert(place.name.as_str()) {
                return Err(SimError::InvalidScenario(format!("place '{}' defined twice", place.name)));
            }
            if let Some(openness) = place.openness {
                if !(0.0..=1.0).contains(&openness) {
                    return Err(SimError::InvalidScenario(format!(
                        "place '{}' openness {} outside 0..1",
                        place.name, openness
                    )));
                }
            }
        }

        for uc in &self.use_cases {
            if !type_names.contains(uc.agent_type.as_str()) {
                return Err(SimError::UnknownAgentType(uc.agent_type.clone()));
            }
        }

        for household in &self.households {
            if !type_names.contains(household.agent_type.as_str()) {
                return Err(SimError::UnknownAgentType(household.agent_type.clone()));
            }
            if !place_names.contains(household.home.as_str()) {
                return Err(SimError::UnknownPlace(household.home.clone()));
            }
        }

        let classes: BTreeSet<&str> = self.places.iter().map(|p| p.class.as_str()).collect();
        for uc in &self.use_cases {
            for class in uc.destination.class_names().iter().chain(uc.start.class_names().iter()) {
                if !classes.contains(class.as_str()) {
                    tracing::warn!(use_case = %uc.name, class = %class, "no place of this class in the building");
                }
            }
        }

        Ok(())
    }

    fn weather_table(&self) -> Result<WeatherTable> {
        match (&self.weather, &self.weather_file) {
            (Some(_), Some(_)) => Err(SimError::InvalidScenario(
                "give either inline weather or a weather_file, not both".into(),
            )),
            (Some(text), None) => Ok(WeatherTable::parse(text)),
            (None, Some(path)) => Ok(WeatherTable::parse(&std::fs::read_to_string(path)?)),
            (None, None) => Ok(WeatherTable::fair()),
        }
    }

    fn build_site(&self) -> Result<Site> {
        let mut places = PlaceRegistry::new();
        let mut graph = WaypointGraph::new(
            self.waypoints
                .iter()
                .map(|w| Waypoint {
                    position: Point::from(w.position),
                    exposure: w.exposure,
                })
                .collect(),
        );

        for [a, b] in &self.edges {
            graph.connect(*a, *b)?;
        }
        for spec in &self.places {
            let id = places.add(
                spec.name.clone(),
                spec.class.clone(),
                Point::from(spec.position),
                spec.exposure,
                spec.kind,
                spec.openness,
            );
            graph.attach_place(id, spec.class.clone(), spec.waypoint)?;
        }
        for bank in &self.banks {
            graph.add_bank(bank.name.clone(), bank.doors.clone())?;
        }

        let visibility: Box<dyn VisibilityClassifier> =
            if self.zones.is_empty() && self.walls.is_empty() && self.pause_spaces.is_empty() {
                Box::new(OpenFloor)
            } else {
                let mut zones = ZoneClassifier::new();
                for zone in &self.zones {
                    zones.add_zone(&zone.outline, zone.z_min, zone.z_max, zone.flags)?;
                }
                for wall in &self.walls {
                    zones.add_wall(wall.from, wall.to, wall.z_min, wall.z_max);
                }
                for point in &self.pause_spaces {
                    zones.add_pause_space(Point::from(*point));
                }
                Box::new(zones)
            };

        Ok(Site::new(
            self.building_type,
            places,
            Box::new(CachedRoutes::new(graph)),
            visibility,
            self.weather_table()?,
        ))
    }

    /// Validate and assemble a simulation seeded with `seed`
    pub fn build(&self, seed: u64) -> Result<Simulation> {
        self.build_with_heartbeat(seed, Arc::new(TracingHeartbeat::new()))
    }

    pub fn build_with_heartbeat(&self, seed: u64, heartbeat: Arc<dyn Heartbeat>) -> Result<Simulation> {
        self.validate()?;

        let catalogue = ActivityCatalogue::new(self.use_cases.clone())?;
        let site = self.build_site()?;
        let mut context = SimulationContext::with_heartbeat(self.config.clone(), seed, heartbeat);

        let types: AHashMap<&str, Arc<AgentType>> = self
            .agent_types
            .iter()
            .map(|t| (t.name.as_str(), Arc::new(t.clone())))
            .collect();

        let mut agents = Vec::new();
        for household in &self.households {
            let agent_type = types
                .get(household.agent_type.as_str())
                .cloned()
                .ok_or_else(|| SimError::UnknownAgentType(household.agent_type.clone()))?;
            let home = site
                .places
                .lookup(&household.home)
                .ok_or_else(|| SimError::UnknownPlace(household.home.clone()))?;
            let use_cases = catalogue.ranked_for(&agent_type.name, self.building_type);
            if use_cases.is_empty() {
                tracing::warn!(agent_type = %agent_type.name, "agent type has no use cases in this building");
            }

            for member in 0..household.count {
                let id = AgentId(agents.len() as u32);
                let thresholds = Thresholds::sample(&context.config.greeting, &mut context.rng);
                agents.push(Agent::new(
                    id,
                    format!("{}/{}", household.home, member + 1),
                    agent_type.clone(),
                    home,
                    use_cases.clone(),
                    thresholds,
                ));
            }
        }

        let destinations = site.points_of_classes(&catalogue.destination_classes());
        tracing::info!(
            agents = agents.len(),
            places = site.places.len(),
            use_cases = catalogue.len(),
            building = %self.building_type,
            "scenario built"
        );

        Ok(Simulation::new(context, site, agents, destinations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOBBY: &str = r#"
        building_type = "residential"
        edges = [[0, 1]]

        [[agent_types]]
        name = "resident"
        velocity = 1.2
        openness = 0.9
        caution = 0.2

        [[use_cases]]
        name = "fetch_mail"
        agent_type = "resident"
        start = "own_place"
        destination = { classes = [{ class = "mailroom", propensity = 1.0 }] }
        typical_times = [{ at = "08:00", half_width = 600 }]
        dwell_secs = 60
        workday_propensity = 1.0
        day_off_propensity = 0.5

        [[households]]
        agent_type = "resident"
        home = "flat_1"
        count = 2

        [[places]]
        name = "flat_1"
        class = "home"
        position = [0.0, 0.0, 0.0]
        waypoint = 0

        [[places]]
        name = "mail"
        class = "mailroom"
        position = [20.0, 0.0, 0.0]
        waypoint = 1

        [[waypoints]]
        position = [0.0, 0.0, 0.0]

        [[waypoints]]
        position = [20.0, 0.0, 0.0]
    "#;

    #[test]
    fn test_build_lobby() {
        let scenario = Scenario::from_str(LOBBY).unwrap();
        let sim = scenario.build(3).unwrap();
        assert_eq!(sim.agents.len(), 2);
        assert_eq!(sim.agents[0].name, "flat_1/1");
        assert_eq!(sim.agents[1].id, AgentId(1));
        assert_eq!(sim.agents[0].use_cases.len(), 1);
        assert_eq!(sim.destinations, vec![Point::new(20.0, 0.0, 0.0)]);
        assert!(sim.site.weather.is_empty());
    }

    #[test]
    fn test_unknown_home_rejected() {
        let mut scenario = Scenario::from_str(LOBBY).unwrap();
        scenario.households[0].home = "penthouse".into();
        assert!(matches!(scenario.build(1), Err(SimError::UnknownPlace(p)) if p == "penthouse"));
    }

    #[test]
    fn test_unknown_agent_type_rejected() {
        let mut scenario = Scenario::from_str(LOBBY).unwrap();
        scenario.use_cases[0].agent_type = "ghost".into();
        assert!(matches!(scenario.build(1), Err(SimError::UnknownAgentType(_))));
    }

    #[test]
    fn test_bad_edge_rejected() {
        let mut scenario = Scenario::from_str(LOBBY).unwrap();
        scenario.edges.push([0, 9]);
        assert!(matches!(scenario.build(1), Err(SimError::InvalidScenario(_))));
    }

    #[test]
    fn test_config_override() {
        let text = format!("{}\n[config.memory]\nmax_in_mind = 3\n", LOBBY);
        let scenario = Scenario::from_str(&text).unwrap();
        assert_eq!(scenario.config.memory.max_in_mind, 3);
        assert_eq!(scenario.config.memory.memory_window_secs, 15);
    }

    #[test]
    fn test_inline_weather() {
        let text = format!("weather = \"0,0,1\\n1,1,0\"\n{}", LOBBY);
        let scenario = Scenario::from_str(&text).unwrap();
        let sim = scenario.build(1).unwrap();
        assert_eq!(sim.site.weather.len(), 2);
        assert!(sim.site.weather.condition_at(0, 10).raining);
    }

    #[test]
    fn test_same_seed_same_thresholds() {
        let scenario = Scenario::from_str(LOBBY).unwrap();
        let a = scenario.build(42).unwrap();
        let b = scenario.build(42).unwrap();
        assert_eq!(a.agents[1].thresholds, b.agents[1].thresholds);
    }
}
