//! Encounter Sim - how the occupants of a building meet, greet and talk
//!
//! Each simulated day every agent's calendar is built from recurring use
//! cases, then the day is played second by second while agents notice one
//! another, remember each other briefly, and sometimes escalate to a
//! greeting or a conversation.

pub mod agent;
pub mod core;
pub mod scenario;
pub mod schedule;
pub mod simulation;
pub mod social;
pub mod world;
