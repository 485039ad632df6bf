//! Social memory and escalation
//!
//! Per dyad and per episode the state runs
//! `Unperceived -> Perceived -> Greeted -> Conversed`, with eviction sending
//! it back to `Unperceived`. Familiarity tiers move independently and only
//! upwards.

pub mod anchor;
pub mod conversation;
pub mod escalation;
pub mod interaction;
pub mod memory;

pub use anchor::{Anchor, Familiarity};
pub use conversation::{ConversationScene, gathering_point};
pub use escalation::GreetingTrigger;
pub use interaction::{Interaction, InteractionKind, SocialState};
pub use memory::Eviction;
