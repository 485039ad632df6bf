//! Agent type definitions: behavioural parameters shared by a class of occupant

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

fn unit_scale() -> f64 {
    1.0
}

/// Behavioural parameters for a kind of occupant ("resident", "visitor", ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentType {
    pub name: String,
    /// Walking speed (m/s)
    pub velocity: f64,
    /// Base willingness to notice others (0.0 to 1.0)
    pub openness: f64,
    /// Reluctance to greet or talk, applied as `(1 - caution)` (0.0 to 1.0)
    pub caution: f64,
    /// Multiplies the per-tier greeting base propensity
    #[serde(default = "unit_scale")]
    pub greeting_baseline_scale: f64,
    /// Multiplies the per-tier conversation base propensity
    #[serde(default = "unit_scale")]
    pub conversation_baseline_scale: f64,
}

impl AgentType {
    pub fn validate(&self) -> Result<()> {
        if !(self.velocity > 0.0) {
            return Err(SimError::InvalidScenario(format!(
                "agent type '{}' needs a positive velocity",
                self.name
            )));
        }
        for (label, value) in [("openness", self.openness), ("caution", self.caution)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimError::InvalidScenario(format!(
                    "agent type '{}' {} {} outside 0..1",
                    self.name, label, value
                )));
            }
        }
        if self.greeting_baseline_scale < 0.0 || self.conversation_baseline_scale < 0.0 {
            return Err(SimError::InvalidScenario(format!(
                "agent type '{}' has a negative baseline scale",
                self.name
            )));
        }
        Ok(())
    }
}
