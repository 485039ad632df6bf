//! Timed actions and plans
//!
//! A plan is an ordered list of actions. Each action lasts a whole number of
//! seconds and can report where the agent is at any offset into it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::types::{BankId, PlaceId, Point};
use crate::world::route::{polyline_length, Polyline};

/// Discriminant of an action, used where the payload is not needed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Journey,
    Motionless,
    Absent,
    InTransport,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Walking along a route at constant speed
    Journey {
        route: Arc<Polyline>,
        speed: f64,
        duration: u32,
    },
    /// Standing still, optionally at a place
    Motionless {
        position: Point,
        place: Option<PlaceId>,
        duration: u32,
    },
    /// Out of the building (dwelling at an exit place)
    Absent { place: PlaceId, position: Point, duration: u32 },
    /// Riding a lift car between two doors
    InTransport {
        bank: BankId,
        from: Point,
        to: Point,
        duration: u32,
    },
}

impl Action {
    /// Walk a route; lasts the whole seconds needed to cover it
    pub fn journey(route: Arc<Polyline>, speed: f64) -> Self {
        let length = polyline_length(&route);
        let duration = if speed > 0.0 { (length / speed).ceil() as u32 } else { 0 };
        Action::Journey { route, speed, duration }
    }

    pub fn duration(&self) -> u32 {
        match self {
            Action::Journey { duration, .. }
            | Action::Motionless { duration, .. }
            | Action::Absent { duration, .. }
            | Action::InTransport { duration, .. } => *duration,
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Journey { .. } => ActionKind::Journey,
            Action::Motionless { .. } => ActionKind::Motionless,
            Action::Absent { .. } => ActionKind::Absent,
            Action::InTransport { .. } => ActionKind::InTransport,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Action::Absent { .. })
    }

    /// Is the agent present and observable `elapsed` seconds into this action?
    pub fn is_active_at(&self, elapsed: u32) -> bool {
        elapsed < self.duration() && !self.is_absent()
    }

    /// Position `elapsed` seconds into the action, clamped to its end
    pub fn position_at(&self, elapsed: u32) -> Point {
        match self {
            Action::Journey { route, speed, .. } => point_along(route, speed * elapsed as f64),
            Action::Motionless { position, .. } | Action::Absent { position, .. } => *position,
            Action::InTransport { from, to, duration, .. } => {
                if *duration == 0 {
                    return *to;
                }
                let t = (elapsed as f64 / *duration as f64).min(1.0);
                from.lerp(*to, t)
            }
        }
    }

    /// Place the agent is standing at, if any
    pub fn motionless_place(&self) -> Option<PlaceId> {
        match self {
            Action::Motionless { place, .. } => *place,
            _ => None,
        }
    }
}

/// Point at `distance` metres along a polyline
fn point_along(route: &[Point], distance: f64) -> Point {
    let Some(first) = route.first() else {
        return Point::ZERO;
    };
    let mut remaining = distance.max(0.0);
    for w in route.windows(2) {
        let seg = w[0].distance(w[1]);
        if remaining <= seg {
            if seg <= f64::EPSILON {
                return w[1];
            }
            return w[0].lerp(w[1], remaining / seg);
        }
        remaining -= seg;
    }
    route.last().copied().unwrap_or(*first)
}

/// How a plan gets from one place to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    /// Already there
    Null,
    /// Walk the direct route
    Direct,
    /// Walk, wait, ride, walk through a transport bank
    ViaBank(BankId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub kind: PlanKind,
    pub actions: Vec<Action>,
}

impl Plan {
    /// The zero-duration plan for staying put
    pub fn null() -> Self {
        Self {
            kind: PlanKind::Null,
            actions: Vec::new(),
        }
    }

    pub fn duration(&self) -> u32 {
        self.actions.iter().map(Action::duration).sum()
    }
}
