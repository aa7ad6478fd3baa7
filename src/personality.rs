//! Low-skill archetypes. Each one is pure data: a bias on the agent's personal
//! frag rate, the spread of its per-tick noise, and a multiplier on how often it dies.

use rand::Rng;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Archetype {
    Coder,
    TwitchStreamer,
    Tactician,
    Rager,
    CluelessDad,
    Speedrunner,
    Strategist,
    AfkGuy,
}

impl Archetype {
    pub const ALL: [Archetype; 8] = [
        Archetype::Coder,
        Archetype::TwitchStreamer,
        Archetype::Tactician,
        Archetype::Rager,
        Archetype::CluelessDad,
        Archetype::Speedrunner,
        Archetype::Strategist,
        Archetype::AfkGuy,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Archetype::Coder => "Coder",
            Archetype::TwitchStreamer => "Twitch Streamer",
            Archetype::Tactician => "Tactician",
            Archetype::Rager => "Rager",
            Archetype::CluelessDad => "Clueless Dad",
            Archetype::Speedrunner => "Speedrunner",
            Archetype::Strategist => "Strategist",
            Archetype::AfkGuy => "AFK Guy",
        }
    }

    pub fn kill_rate_bias(self) -> f64 {
        match self {
            Archetype::Coder => 0.7,
            Archetype::TwitchStreamer => 1.2,
            Archetype::Tactician => 0.5,
            Archetype::Rager => 1.0,
            Archetype::CluelessDad => 0.3,
            Archetype::Speedrunner => 1.5,
            Archetype::Strategist => 0.6,
            Archetype::AfkGuy => 0.1,
        }
    }

    pub fn kill_rate_variance(self) -> f64 {
        match self {
            Archetype::Coder => 0.2,
            Archetype::TwitchStreamer => 0.5,
            Archetype::Tactician => 0.1,
            Archetype::Rager => 0.6,
            Archetype::CluelessDad => 0.05,
            Archetype::Speedrunner => 0.3,
            Archetype::Strategist => 0.1,
            Archetype::AfkGuy => 0.01,
        }
    }

    pub fn death_rate_multiplier(self) -> f64 {
        match self {
            Archetype::Coder => 1.1,
            Archetype::TwitchStreamer => 1.5,
            Archetype::Tactician => 0.6,
            Archetype::Rager => 2.0,
            Archetype::CluelessDad => 0.9,
            Archetype::Speedrunner => 1.3,
            Archetype::Strategist => 0.5,
            Archetype::AfkGuy => 0.1,
        }
    }

    /// Uniform pick from the catalog.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
