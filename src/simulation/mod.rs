//! Day-by-day, second-by-second simulation of a building's occupants

pub mod encounter;
pub mod engine;
pub mod output;
pub mod presence;

pub use encounter::SocialStep;
pub use engine::Simulation;
pub use output::{ActivityRecord, AgentSummary, DayRecord, PairLog, SimulationOutput, SimulationStats};
pub use presence::Presence;
