//! Daily timetables: actions, plans, calendars and the scheduler

pub mod action;
pub mod calendar;
pub mod plan;
pub mod scheduler;

pub use action::{Action, ActionKind, Plan, PlanKind};
pub use calendar::{ActionAt, Activity, Calendar, Placement, SecondMask};
pub use plan::{ride_seconds, PlanBuilder};
pub use scheduler::Scheduler;
