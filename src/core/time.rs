//! Simulation clock: second-of-day arithmetic, day kinds and daylight
//!
//! The simulation runs on a continuous second timeline split into days of
//! 86 400 seconds. Scheduling works on the second-of-day; the encounter engine
//! compares absolute times so memories survive midnight correctly.

use serde::{Deserialize, Deserializer, Serialize};

use crate::core::error::{Result, SimError};

pub const SECONDS_PER_DAY: u32 = 86_400;
pub const SECONDS_PER_HOUR: u32 = 3_600;
pub const HOURS_PER_DAY: u32 = 24;

/// Whether a simulated day follows the workday or day-off pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayKind {
    Workday,
    DayOff,
}

impl DayKind {
    /// Days 0-4 of each week are workdays, 5-6 are days off
    pub fn from_day(day: u32) -> Self {
        if day % 7 <= 4 {
            DayKind::Workday
        } else {
            DayKind::DayOff
        }
    }
}

/// Hour of day (0-23) for a second of day
pub fn hour_of(second: u32) -> u32 {
    (second % SECONDS_PER_DAY) / SECONDS_PER_HOUR
}

/// True when `hour` falls inside the half-open daylight window
pub fn is_daylight_hour(hour: u32, start_hour: u32, end_hour: u32) -> bool {
    hour >= start_hour && hour < end_hour
}

/// A moment on the simulation timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTime {
    pub day: u32,
    pub second: u32,
}

impl SimTime {
    pub fn new(day: u32, second: u32) -> Self {
        Self { day, second }
    }

    /// Seconds since the start of the run
    pub fn absolute(&self) -> u64 {
        self.day as u64 * SECONDS_PER_DAY as u64 + self.second as u64
    }

    /// Seconds elapsed since `earlier` (zero if `earlier` is in the future)
    pub fn seconds_since(&self, earlier: SimTime) -> u64 {
        self.absolute().saturating_sub(earlier.absolute())
    }

    pub fn hour(&self) -> u32 {
        hour_of(self.second)
    }
}

/// Parse "HH:MM" or "HH:MM:SS" into a second of day
pub fn parse_clock(text: &str) -> Result<u32> {
    let parts: Vec<&str> = text.trim().split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(SimError::InvalidClock(text.to_string()));
    }

    let mut fields = [0u32; 3];
    for (i, part) in parts.iter().enumerate() {
        fields[i] = part
            .parse::<u32>()
            .map_err(|_| SimError::InvalidClock(text.to_string()))?;
    }

    let [h, m, s] = fields;
    if h >= HOURS_PER_DAY || m >= 60 || s >= 60 {
        return Err(SimError::InvalidClock(text.to_string()));
    }

    Ok(h * SECONDS_PER_HOUR + m * 60 + s)
}

/// Serde adapter for clock strings
pub fn deserialize_clock<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_clock(&text).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_kind_week_pattern() {
        for day in 0..5 {
            assert_eq!(DayKind::from_day(day), DayKind::Workday);
        }
        assert_eq!(DayKind::from_day(5), DayKind::DayOff);
        assert_eq!(DayKind::from_day(6), DayKind::DayOff);
        assert_eq!(DayKind::from_day(7), DayKind::Workday);
        assert_eq!(DayKind::from_day(13), DayKind::DayOff);
    }

    #[test]
    fn test_sim_time_crosses_midnight() {
        let late = SimTime::new(0, SECONDS_PER_DAY - 5);
        let early = SimTime::new(1, 10);
        assert_eq!(early.seconds_since(late), 15);
        assert_eq!(late.seconds_since(early), 0);
        assert!(late < early);
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("08:30").unwrap(), 8 * 3600 + 30 * 60);
        assert_eq!(parse_clock("23:59:59").unwrap(), SECONDS_PER_DAY - 1);
        assert!(parse_clock("24:00").is_err());
        assert!(parse_clock("8").is_err());
        assert!(parse_clock("aa:bb").is_err());
    }

    #[test]
    fn test_daylight_window() {
        assert!(!is_daylight_hour(6, 7, 19));
        assert!(is_daylight_hour(7, 7, 19));
        assert!(is_daylight_hour(18, 7, 19));
        assert!(!is_daylight_hour(19, 7, 19));
        assert_eq!(hour_of(7 * 3600 + 59), 7);
    }
}
