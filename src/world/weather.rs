//! Weather table and exposure classes
//!
//! Weather affects which outdoor routes are walkable, when optional outdoor
//! activities can be scheduled, and how inviting a spot is for conversation.
//! The table is hourly; each hour is either fair or carries hot/cold and
//! raining flags.

use serde::{Deserialize, Serialize};

use crate::core::time::{HOURS_PER_DAY, SECONDS_PER_HOUR};

/// How exposed a place or waypoint is to the weather
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exposure {
    #[default]
    Inside,
    Outside,
    Undercover,
}

impl Exposure {
    /// Can an optional activity take place here under this weather?
    pub fn usable_for_activity(&self, weather: WeatherCondition) -> bool {
        match self {
            Self::Inside => true,
            Self::Outside => !weather.hot_cold && !weather.raining,
            // A roof keeps the rain off but not the heat or cold
            Self::Undercover => !weather.hot_cold,
        }
    }

    /// Can a route pass through here under this weather?
    pub fn walkable(&self, weather: WeatherCondition) -> bool {
        match self {
            Self::Outside => !weather.hot_cold && !weather.raining,
            Self::Inside | Self::Undercover => true,
        }
    }

    pub fn is_exposed(&self) -> bool {
        !matches!(self, Self::Inside)
    }
}

/// One hour's weather
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub hot_cold: bool,
    pub raining: bool,
}

impl WeatherCondition {
    pub const FAIR: WeatherCondition = WeatherCondition {
        hot_cold: false,
        raining: false,
    };

    pub fn new(hot_cold: bool, raining: bool) -> Self {
        Self { hot_cold, raining }
    }

    /// Index 0-3 of this condition, used as a cache key
    pub fn quadrant(&self) -> u8 {
        (self.hot_cold as u8) << 1 | self.raining as u8
    }

    pub fn is_fair(&self) -> bool {
        !self.hot_cold && !self.raining
    }
}

/// Hourly weather for the simulated location
///
/// Hours are counted from the start of the run. A table shorter than the run
/// repeats, so a single 24-row table describes every day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherTable {
    hours: Vec<WeatherCondition>,
}

impl WeatherTable {
    /// Always-fair weather
    pub fn fair() -> Self {
        Self::default()
    }

    pub fn from_hours(hours: Vec<WeatherCondition>) -> Self {
        Self { hours }
    }

    /// Parse `hour,hot_cold,raining` rows
    ///
    /// Blank lines and `#` comments are ignored. Malformed rows are skipped
    /// with a warning; hours with no row default to fair weather.
    pub fn parse(text: &str) -> Self {
        let mut hours: Vec<WeatherCondition> = Vec::new();

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match parse_row(line) {
                Some((hour, condition)) => {
                    if hours.len() <= hour {
                        hours.resize(hour + 1, WeatherCondition::FAIR);
                    }
                    hours[hour] = condition;
                }
                None => {
                    tracing::warn!(line = line_no + 1, row = line, "skipping malformed weather row");
                }
            }
        }

        Self { hours }
    }

    /// Weather at a second of a given day
    pub fn condition_at(&self, day: u32, second: u32) -> WeatherCondition {
        if self.hours.is_empty() {
            return WeatherCondition::FAIR;
        }
        let hour = day as usize * HOURS_PER_DAY as usize + (second / SECONDS_PER_HOUR) as usize;
        self.hours[hour % self.hours.len()]
    }

    pub fn len(&self) -> usize {
        self.hours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }
}

fn parse_row(line: &str) -> Option<(usize, WeatherCondition)> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 3 {
        return None;
    }
    let hour = fields[0].parse::<usize>().ok()?;
    let hot_cold = parse_flag(fields[1])?;
    let raining = parse_flag(fields[2])?;
    Some((hour, WeatherCondition::new(hot_cold, raining)))
}

fn parse_flag(field: &str) -> Option<bool> {
    match field.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exposure_rules() {
        let rain = WeatherCondition::new(false, true);
        let heat = WeatherCondition::new(true, false);

        assert!(Exposure::Inside.usable_for_activity(rain));
        assert!(!Exposure::Outside.usable_for_activity(rain));
        assert!(Exposure::Undercover.usable_for_activity(rain));
        assert!(!Exposure::Undercover.usable_for_activity(heat));

        assert!(Exposure::Undercover.walkable(heat));
        assert!(!Exposure::Outside.walkable(heat));
        assert!(Exposure::Outside.walkable(WeatherCondition::FAIR));
    }

    #[test]
    fn test_quadrants_are_distinct() {
        let qs: Vec<u8> = [(false, false), (false, true), (true, false), (true, true)]
            .iter()
            .map(|&(h, r)| WeatherCondition::new(h, r).quadrant())
            .collect();
        assert_eq!(qs, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_parse_skips_malformed_rows() {
        let table = WeatherTable::parse(
            "# hour,hot_cold,raining\n\
             0,0,0\n\
             1,0,1\n\
             oops\n\
             2,maybe,0\n\
             3,1,0\n",
        );
        assert_eq!(table.len(), 4);
        assert!(table.condition_at(0, 3600).raining);
        // Row 2 was malformed and defaults to fair
        assert!(table.condition_at(0, 2 * 3600).is_fair());
        assert!(table.condition_at(0, 3 * 3600 + 10).hot_cold);
    }

    #[test]
    fn test_table_repeats() {
        let mut hours = vec![WeatherCondition::FAIR; 24];
        hours[9] = WeatherCondition::new(false, true);
        let table = WeatherTable::from_hours(hours);
        assert!(table.condition_at(0, 9 * 3600).raining);
        assert!(table.condition_at(5, 9 * 3600 + 59).raining);
        assert!(!table.condition_at(5, 10 * 3600).raining);
        assert!(WeatherTable::fair().condition_at(3, 100).is_fair());
    }
}
