//! Integration tests for day scheduling
//!
//! These run the scheduler over the demo tower and over small purpose-built
//! buildings, then check the calendars it produces:
//! - busy seconds cover every placed action
//! - only clearing activities share time with others
//! - roots land inside their typical-time window
//! - workday and day-off propensities are honoured

use std::path::PathBuf;

use encounter_sim::core::time::{DayKind, SECONDS_PER_DAY};
use encounter_sim::scenario::Scenario;
use encounter_sim::schedule::{Calendar, Placement};

fn tower() -> Scenario {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios/tower.toml");
    Scenario::load(&path).unwrap()
}

const CORRIDOR: &str = r#"
    building_type = "residential"
    edges = [[0, 1]]

    [[agent_types]]
    name = "resident"
    velocity = 1.0
    openness = 0.8
    caution = 0.3

    [[use_cases]]
    name = "gym"
    agent_type = "resident"
    start = "own_place"
    destination = { classes = [{ class = "gym", propensity = 1.0 }] }
    typical_times = [{ at = "09:00", half_width = 1800 }]
    dwell_secs = 3600
    workday_propensity = 0.0
    day_off_propensity = 1.0

    [[households]]
    agent_type = "resident"
    home = "flat"
    count = 4

    [[places]]
    name = "flat"
    class = "home"
    position = [0.0, 0.0, 0.0]
    waypoint = 0

    [[places]]
    name = "gym"
    class = "gym"
    position = [40.0, 0.0, 0.0]
    waypoint = 1

    [[waypoints]]
    position = [0.0, 0.0, 0.0]

    [[waypoints]]
    position = [40.0, 0.0, 0.0]
"#;

fn assert_busy_covers_activities(calendar: &Calendar) {
    for activity in calendar.activities() {
        for (start, action) in activity.timeline() {
            let end = (start + action.duration()).min(SECONDS_PER_DAY);
            for t in start..end {
                assert!(
                    calendar.is_busy(t),
                    "{} leaves second {} free on day {}",
                    activity.use_case,
                    t,
                    calendar.day()
                );
            }
        }
    }
}

/// Only clearing activities may share seconds with another activity
fn assert_no_overlap(calendar: &Calendar) {
    let activities = calendar.activities();
    for (n, a) in activities.iter().enumerate() {
        if a.placement == Placement::Clearing {
            continue;
        }
        for b in activities.iter().skip(n + 1) {
            if b.placement == Placement::Clearing {
                continue;
            }
            let overlap = a.start_time < b.end_time() && b.start_time < a.end_time();
            assert!(
                !overlap,
                "{} [{}, {}) overlaps {} [{}, {}) on day {}",
                a.use_case,
                a.start_time,
                a.end_time(),
                b.use_case,
                b.start_time,
                b.end_time(),
                calendar.day()
            );
        }
    }
}

#[test]
fn test_tower_week_calendars_are_consistent() {
    let mut sim = tower().build(2024).unwrap();
    for day in 0..7 {
        sim.schedule_day(day);
    }

    let mut placed = 0;
    for agent in &sim.agents {
        assert_eq!(agent.calendars.len(), 7);
        for calendar in &agent.calendars {
            assert_busy_covers_activities(calendar);
            assert_no_overlap(calendar);
            placed += calendar.activities().len();
        }
    }
    assert!(placed > 0, "a week in the tower should schedule something");
}

#[test]
fn test_roots_land_in_their_window() {
    let mut sim = tower().build(5).unwrap();
    for day in 0..5 {
        sim.schedule_day(day);
    }

    for agent in &sim.agents {
        for calendar in &agent.calendars {
            for activity in calendar.activities() {
                if activity.placement != Placement::Seed {
                    continue;
                }
                let use_case = agent
                    .use_cases
                    .iter()
                    .find(|u| u.name == activity.use_case)
                    .unwrap();
                let in_some_window = use_case.typical_times.iter().any(|slot| {
                    let (earliest, latest) = slot.window();
                    activity.start_time >= earliest && activity.start_time <= latest
                });
                assert!(in_some_window, "{} starts at {}", activity.use_case, activity.start_time);
                assert!(activity.preemptible);
            }
        }
    }
}

#[test]
fn test_retiree_roots_never_double_book() {
    let scenario = tower();
    let mut both = 0;
    for seed in 0..20 {
        let mut sim = scenario.build(seed).unwrap();
        for day in 0..14 {
            sim.schedule_day(day);
        }
        for agent in sim.agents.iter().filter(|a| a.agent_type.name == "retiree") {
            for calendar in &agent.calendars {
                assert_no_overlap(calendar);
                if calendar.has_instance_of("morning_walk") && calendar.has_instance_of("collect_post") {
                    both += 1;
                }
            }
        }
    }
    assert!(both > 0, "the two retiree roots should share a day at least once");
}

#[test]
fn test_clearing_activity_needs_its_parent() {
    let mut sim = tower().build(99).unwrap();
    for day in 0..7 {
        sim.schedule_day(day);
    }

    for agent in &sim.agents {
        for calendar in &agent.calendars {
            if calendar.has_instance_of("wait_for_lift_share") {
                assert!(calendar.has_instance_of("commute"));
            }
        }
    }
}

#[test]
fn test_day_off_only_use_case() {
    let mut sim = Scenario::from_str(CORRIDOR).unwrap().build(8).unwrap();
    for day in 0..14 {
        sim.schedule_day(day);
    }

    for agent in &sim.agents {
        for calendar in &agent.calendars {
            let day = calendar.day();
            match DayKind::from_day(day) {
                DayKind::Workday => {
                    assert!(day % 7 <= 4);
                    assert!(!calendar.has_instance_of("gym"), "gym on workday {}", day);
                }
                DayKind::DayOff => {
                    assert!(calendar.has_instance_of("gym"), "no gym on day off {}", day);
                }
            }
        }
    }
}

#[test]
fn test_activity_counter_matches_calendars() {
    let mut sim = Scenario::from_str(CORRIDOR).unwrap().build(8).unwrap();
    sim.schedule_day(5);
    let total = sim.context.counters.day_total(5).activities;
    let placed: usize = sim
        .agents
        .iter()
        .filter_map(|a| a.calendar(5))
        .map(|c| c.activities().len())
        .sum();
    assert_eq!(total, placed as u64);
    assert_eq!(placed, 4);
}
