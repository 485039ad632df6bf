//! One agent's day: placed activities and per-second masks

use serde::{Deserialize, Serialize};

use crate::agent::OpportunityFunction;
use crate::core::time::SECONDS_PER_DAY;
use crate::core::types::{PlaceId, Point};
use crate::schedule::action::{Action, Plan};

const WORDS_PER_DAY: usize = (SECONDS_PER_DAY as usize).div_ceil(64);

/// One bit per second of the day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondMask {
    words: Vec<u64>,
}

impl Default for SecondMask {
    fn default() -> Self {
        Self {
            words: vec![0; WORDS_PER_DAY],
        }
    }
}

impl SecondMask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, second: u32) -> bool {
        let s = second as usize;
        match self.words.get(s / 64) {
            Some(word) => word & (1 << (s % 64)) != 0,
            None => false,
        }
    }

    /// Seconds past midnight are ignored
    pub fn set(&mut self, second: u32, value: bool) {
        let s = second as usize;
        if let Some(word) = self.words.get_mut(s / 64) {
            if value {
                *word |= 1 << (s % 64);
            } else {
                *word &= !(1 << (s % 64));
            }
        }
    }

    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// True if no second in `[start, end)` is set
    pub fn is_clear(&self, start: u32, end: u32) -> bool {
        (start..end.min(SECONDS_PER_DAY)).all(|s| !self.get(s))
    }
}

/// How an activity got onto the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Root use case seeding the day
    Seed,
    /// Fitted into a free run
    Blocking,
    /// Placed over an existing parent
    Clearing,
}

/// A placed instance of a use case
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub use_case: String,
    pub opportunity: OpportunityFunction,
    pub start_place: PlaceId,
    pub dwell_place: PlaceId,
    pub entering: Plan,
    pub dwell: Action,
    pub exiting: Plan,
    /// Second of day the entering leg begins
    pub start_time: u32,
    /// Walking speed used for the journeys (m/s)
    pub speed: f64,
    pub preemptible: bool,
    pub placement: Placement,
}

impl Activity {
    pub fn duration(&self) -> u32 {
        self.entering.duration() + self.dwell.duration() + self.exiting.duration()
    }

    /// Exclusive end, possibly past midnight
    pub fn end_time(&self) -> u32 {
        self.start_time + self.duration()
    }

    pub fn covers(&self, second: u32) -> bool {
        second >= self.start_time && second < self.end_time()
    }

    /// Every action with the second of day it starts at
    pub fn timeline(&self) -> Vec<(u32, &Action)> {
        let mut at = self.start_time;
        let mut out = Vec::with_capacity(self.entering.actions.len() + self.exiting.actions.len() + 1);
        let actions = self
            .entering
            .actions
            .iter()
            .chain(std::iter::once(&self.dwell))
            .chain(self.exiting.actions.iter());
        for action in actions {
            out.push((at, action));
            at += action.duration();
        }
        out
    }
}

/// The action an agent is performing at a given second
#[derive(Debug, Clone, Copy)]
pub struct ActionAt<'a> {
    pub activity: &'a Activity,
    pub action: &'a Action,
    /// Seconds into the action
    pub elapsed: u32,
}

impl ActionAt<'_> {
    pub fn position(&self) -> Point {
        self.action.position_at(self.elapsed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Calendar {
    day: u32,
    busy: SecondMask,
    sociable: SecondMask,
    visible: SecondMask,
    activities: Vec<Activity>,
}

impl Calendar {
    pub fn new(day: u32) -> Self {
        Self {
            day,
            busy: SecondMask::new(),
            sociable: SecondMask::new(),
            visible: SecondMask::new(),
            activities: Vec::new(),
        }
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn is_busy(&self, second: u32) -> bool {
        self.busy.get(second)
    }

    pub fn is_sociable(&self, second: u32) -> bool {
        self.sociable.get(second)
    }

    pub fn is_visible(&self, second: u32) -> bool {
        self.visible.get(second)
    }

    pub fn busy(&self) -> &SecondMask {
        &self.busy
    }

    pub fn visible(&self) -> &SecondMask {
        &self.visible
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// Has an instance of this use case been placed today?
    pub fn has_instance_of(&self, use_case: &str) -> bool {
        self.activities.iter().any(|a| a.use_case == use_case)
    }

    /// Stamp an activity's actions into the masks and append it
    ///
    /// Seconds past midnight are clipped.
    pub fn place(&mut self, activity: Activity) {
        let clearing = activity.placement == Placement::Clearing;
        for (start, action) in activity.timeline() {
            let absent = action.is_absent();
            let end = start.saturating_add(action.duration()).min(SECONDS_PER_DAY);
            for t in start..end {
                self.busy.set(t, true);
                self.sociable.set(t, !absent);
                let mut visible = action.is_active_at(t - start);
                if clearing {
                    visible &= !absent;
                }
                self.visible.set(t, visible);
            }
        }
        self.activities.push(activity);
    }

    /// What the agent is doing at `second`; later placements take precedence
    pub fn action_at(&self, second: u32) -> Option<ActionAt<'_>> {
        let activity = self.activities.iter().rev().find(|a| a.covers(second))?;
        activity
            .timeline()
            .into_iter()
            .find(|(start, action)| second >= *start && second < start + action.duration())
            .map(|(start, action)| ActionAt {
                activity,
                action,
                elapsed: second - start,
            })
    }
}
