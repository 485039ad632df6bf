pub mod config;
pub mod context;
pub mod error;
pub mod time;
pub mod types;

pub use config::SimulationConfig;
pub use context::{Heartbeat, SimulationContext, TracingHeartbeat};
pub use error::{Result, SimError};
pub use time::{DayKind, SimTime};
