//! Candidate plans between two places
//!
//! For a pair of places the builder offers the direct walk plus one plan per
//! transport bank (walk to the nearest door, wait, ride, walk on). It makes
//! no choice between them; the scheduler picks.

use rand::Rng;

use crate::core::config::TransportConfig;
use crate::core::types::{BankId, PlaceId};
use crate::schedule::action::{Action, Plan, PlanKind};
use crate::world::place::{PlaceKind, PlaceRegistry};
use crate::world::route::RouteProvider;
use crate::world::weather::WeatherCondition;

/// Doors closer than this in height are on the same floor (metres)
const SAME_FLOOR_TOLERANCE: f64 = 0.5;

/// Seconds for a lift car to cover `distance` metres
///
/// Triangular velocity profile when the car never reaches `max_speed`,
/// trapezoidal otherwise.
pub fn ride_seconds(distance: f64, max_acceleration: f64, max_speed: f64) -> f64 {
    let d = distance.abs();
    if d <= max_speed * max_speed / max_acceleration {
        2.0 * (d / max_acceleration).sqrt()
    } else {
        d / max_speed + max_speed / max_acceleration
    }
}

pub struct PlanBuilder<'a> {
    routes: &'a dyn RouteProvider,
    places: &'a PlaceRegistry,
    transport: &'a TransportConfig,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(routes: &'a dyn RouteProvider, places: &'a PlaceRegistry, transport: &'a TransportConfig) -> Self {
        Self {
            routes,
            places,
            transport,
        }
    }

    /// All candidate plans from `from` to `to`
    pub fn candidates<R: Rng>(
        &self,
        from: PlaceId,
        to: PlaceId,
        weather: WeatherCondition,
        speed: f64,
        rng: &mut R,
    ) -> Vec<Plan> {
        if from == to {
            return vec![Plan::null()];
        }

        let mut plans = Vec::new();
        if let Some(plan) = self.direct(from, to, weather, speed) {
            plans.push(plan);
        }
        for bank in self.routes.transport_banks() {
            if let Some(plan) = self.via_bank(bank, from, to, weather, speed, rng) {
                plans.push(plan);
            }
        }
        plans
    }

    /// Rebuild a plan of a known kind under different weather
    pub fn rebuild<R: Rng>(
        &self,
        kind: PlanKind,
        from: PlaceId,
        to: PlaceId,
        weather: WeatherCondition,
        speed: f64,
        rng: &mut R,
    ) -> Option<Plan> {
        match kind {
            PlanKind::Null => Some(Plan::null()),
            PlanKind::Direct => self.direct(from, to, weather, speed),
            PlanKind::ViaBank(bank) => self.via_bank(bank, from, to, weather, speed, rng),
        }
    }

    /// Dwell action at a place: standing there, or absent for exit places
    pub fn dwell(&self, place: PlaceId, duration: u32) -> Option<Action> {
        let p = self.places.get(place)?;
        Some(match p.kind {
            PlaceKind::Interior => Action::Motionless {
                position: p.position,
                place: Some(place),
                duration,
            },
            PlaceKind::Exit => Action::Absent {
                place,
                position: p.position,
                duration,
            },
        })
    }

    fn direct(&self, from: PlaceId, to: PlaceId, weather: WeatherCondition, speed: f64) -> Option<Plan> {
        let route = self.routes.route(from, to, weather)?;
        Some(Plan {
            kind: PlanKind::Direct,
            actions: vec![Action::journey(route, speed)],
        })
    }

    fn via_bank<R: Rng>(
        &self,
        bank: BankId,
        from: PlaceId,
        to: PlaceId,
        weather: WeatherCondition,
        speed: f64,
        rng: &mut R,
    ) -> Option<Plan> {
        let to_door = self.routes.route_to_nearest_transport(from, bank, weather, false)?;
        let from_door = self.routes.route_to_nearest_transport(to, bank, weather, true)?;
        let boarding = *to_door.last()?;
        let alighting = *from_door.first()?;

        if (boarding.z - alighting.z).abs() < SAME_FLOOR_TOLERANCE {
            return None;
        }

        let cfg = self.transport;
        let waited = if cfg.max_wait_secs > 0.0 {
            // (0, max] rather than [0, max)
            cfg.max_wait_secs - rng.gen_range(0.0..cfg.max_wait_secs)
        } else {
            0.0
        };
        let ride = ride_seconds(alighting.z - boarding.z, cfg.max_acceleration, cfg.max_speed);

        Some(Plan {
            kind: PlanKind::ViaBank(bank),
            actions: vec![
                Action::journey(to_door, speed),
                Action::Motionless {
                    position: boarding,
                    place: None,
                    duration: (waited + cfg.door_cycle_secs).ceil() as u32,
                },
                Action::InTransport {
                    bank,
                    from: boarding,
                    to: alighting,
                    duration: (ride + cfg.door_cycle_secs).ceil() as u32,
                },
                Action::journey(from_door, speed),
            ],
        })
    }
}
