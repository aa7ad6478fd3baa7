//! Frag race simulator: one high-skill agent against a pooled team of N low-skill
//! agents, used to find the pool size where the team overtakes the pro.

pub mod agent;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod personality;
pub mod report;
pub mod sweep;
pub mod utils;

pub use config::{Fidelity, MapProfile, SimConfig};
pub use engine::{FragRace, MatchResult, Sample, run};
pub use error::{SimError, SimResult};
pub use personality::Archetype;
