//! Property tests for scheduled calendars
//!
//! Random use-case catalogues are scheduled over a small corridor building;
//! whatever is drawn, busy seconds must cover every action and fitted
//! blocking activities must never collide.

use encounter_sim::core::time::SECONDS_PER_DAY;
use encounter_sim::scenario::Scenario;
use encounter_sim::schedule::Placement;
use proptest::prelude::*;

const BUILDING: &str = r#"
    building_type = "residential"
    edges = [[0, 1], [1, 2], [1, 3]]

    [[agent_types]]
    name = "resident"
    velocity = 1.1
    openness = 0.8
    caution = 0.3

    [[households]]
    agent_type = "resident"
    home = "flat"
    count = 3

    [[places]]
    name = "flat"
    class = "home"
    position = [0.0, 0.0, 0.0]
    waypoint = 0

    [[places]]
    name = "cafe"
    class = "cafe"
    position = [30.0, 10.0, 0.0]
    waypoint = 2

    [[places]]
    name = "garden"
    class = "garden"
    position = [30.0, -10.0, 0.0]
    waypoint = 3
    exposure = "outside"

    [[waypoints]]
    position = [0.0, 0.0, 0.0]

    [[waypoints]]
    position = [20.0, 0.0, 0.0]

    [[waypoints]]
    position = [30.0, 10.0, 0.0]

    [[waypoints]]
    position = [30.0, -10.0, 0.0]
    exposure = "outside"
"#;

fn use_case_toml(n: usize, hour: u32, half_width: u32, dwell: u32, root: bool, garden: bool) -> String {
    let class = if garden { "garden" } else { "cafe" };
    let parents = if root || n == 0 {
        String::new()
    } else {
        "parents = [\"uc0\"]\n".to_string()
    };
    format!(
        "[[use_cases]]\n\
         name = \"uc{n}\"\n\
         agent_type = \"resident\"\n\
         start = \"own_place\"\n\
         destination = {{ classes = [{{ class = \"{class}\", propensity = 1.0 }}] }}\n\
         typical_times = [{{ at = \"{hour:02}:00\", half_width = {half_width} }}]\n\
         dwell_secs = {dwell}\n\
         workday_propensity = 0.8\n\
         day_off_propensity = 0.8\n\
         optional = {garden}\n\
         {parents}\n"
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_calendars_stay_consistent(
        seed in any::<u64>(),
        shapes in prop::collection::vec(
            (0u32..24, 0u32..7200, 60u32..14400, any::<bool>(), any::<bool>()),
            1..6,
        ),
        weather in prop::collection::vec((any::<bool>(), any::<bool>()), 0..24),
    ) {
        let rows: String = weather
            .iter()
            .enumerate()
            .map(|(hour, (hot_cold, raining))| format!("{},{},{}\\n", hour, *hot_cold as u8, *raining as u8))
            .collect();
        // Top-level keys must come before the first table
        let mut text = format!("weather = \"{}\"\n{}", rows, BUILDING);
        for (n, (hour, half_width, dwell, root, garden)) in shapes.iter().enumerate() {
            text.push_str(&use_case_toml(n, *hour, *half_width, *dwell, *root, *garden));
        }

        let scenario = Scenario::from_str(&text).unwrap();
        let mut sim = scenario.build(seed).unwrap();
        for day in 0..2 {
            sim.schedule_day(day);
        }

        for agent in &sim.agents {
            for calendar in &agent.calendars {
                for activity in calendar.activities() {
                    for (start, action) in activity.timeline() {
                        let end = (start + action.duration()).min(SECONDS_PER_DAY);
                        for t in start..end {
                            prop_assert!(calendar.is_busy(t));
                        }
                    }
                }

                let activities = calendar.activities();
                for (n, a) in activities.iter().enumerate() {
                    if a.placement == Placement::Clearing {
                        continue;
                    }
                    for (m, b) in activities.iter().enumerate().skip(n + 1) {
                        if b.placement == Placement::Clearing {
                            continue;
                        }
                        prop_assert!(a.start_time >= b.end_time() || b.start_time >= a.end_time());
                    }
                }
            }
        }
    }
}
