//! Where an agent is and how it is moving at a given second

use glam::DVec3;

use crate::core::types::{PlaceId, Point};
use crate::schedule::{ActionKind, Calendar};
use crate::world::PlaceRegistry;

/// Movement below this per second counts as standing still (metres)
const STILL_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Presence {
    pub position: Point,
    /// Metres covered over the last second
    pub speed: f64,
    /// Horizontal unit direction of travel, if moving
    pub heading: Option<DVec3>,
    pub motionless_at: Option<PlaceId>,
    pub kind: ActionKind,
}

impl Presence {
    /// Presence of a calendar's owner at `second`, or None when not visible
    ///
    /// Motion comes from the previous second's position when known, else
    /// from where the current action leads over the next second.
    pub fn at(calendar: &Calendar, second: u32, previous: Option<Point>) -> Option<Self> {
        if !calendar.is_visible(second) {
            return None;
        }
        let current = calendar.action_at(second)?;
        let position = current.position();
        let delta = match previous {
            Some(prev) => position - prev,
            None => current.action.position_at(current.elapsed + 1) - position,
        };

        let flat = DVec3::new(delta.x, delta.y, 0.0);
        let heading = (flat.length() > STILL_EPSILON).then(|| flat.normalize());

        Some(Self {
            position,
            speed: delta.length(),
            heading,
            motionless_at: current.action.motionless_place(),
            kind: current.action.kind(),
        })
    }

    /// Intrinsic openness of the place the agent stands at, else 1
    pub fn location_openness(&self, places: &PlaceRegistry) -> f64 {
        self.motionless_at
            .and_then(|id| places.get(id))
            .and_then(|p| p.openness)
            .unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::OpportunityFunction;
    use crate::schedule::{Action, Activity, Placement, Plan, PlanKind};
    use crate::world::Exposure;
    use crate::world::PlaceKind;
    use std::sync::Arc;

    fn calendar() -> Calendar {
        let walk = Action::journey(Arc::new(vec![Point::ZERO, Point::new(10.0, 0.0, 0.0)]), 2.0);
        let mut cal = Calendar::new(0);
        cal.place(Activity {
            use_case: "lounge".into(),
            opportunity: OpportunityFunction::BlockCalendar,
            start_place: PlaceId(0),
            dwell_place: PlaceId(1),
            entering: Plan {
                kind: PlanKind::Direct,
                actions: vec![walk],
            },
            dwell: Action::Motionless {
                position: Point::new(10.0, 0.0, 0.0),
                place: Some(PlaceId(1)),
                duration: 60,
            },
            exiting: Plan::null(),
            start_time: 100,
            speed: 2.0,
            preemptible: false,
            placement: Placement::Blocking,
        });
        cal
    }

    #[test]
    fn test_walking_presence_has_heading() {
        let cal = calendar();
        let p = Presence::at(&cal, 101, None).unwrap();
        assert!(p.position.distance(Point::new(2.0, 0.0, 0.0)) < 1e-9);
        assert!((p.speed - 2.0).abs() < 1e-9);
        assert_eq!(p.heading, Some(DVec3::X));
        assert_eq!(p.kind, ActionKind::Journey);
    }

    #[test]
    fn test_standing_presence() {
        let cal = calendar();
        let p = Presence::at(&cal, 120, Some(Point::new(10.0, 0.0, 0.0))).unwrap();
        assert_eq!(p.speed, 0.0);
        assert_eq!(p.heading, None);
        assert_eq!(p.motionless_at, Some(PlaceId(1)));

        let mut places = PlaceRegistry::new();
        places.add("flat", "home", Point::ZERO, Exposure::Inside, PlaceKind::Interior, None);
        places.add("lounge", "lounge", Point::new(10.0, 0.0, 0.0), Exposure::Inside, PlaceKind::Interior, Some(0.5));
        assert_eq!(p.location_openness(&places), 0.5);
    }

    #[test]
    fn test_invisible_outside_activities() {
        let cal = calendar();
        assert!(Presence::at(&cal, 99, None).is_none());
        assert!(Presence::at(&cal, 165, None).is_none());
    }
}
