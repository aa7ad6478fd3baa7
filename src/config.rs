//! Configuration model for the frag race simulation.
//!
//! Defaults are plain constants; `SimConfig::default()` wires them together.
//! A config is immutable for the duration of a run and can be reused freely.

use crate::error::{SimError, SimResult};
use serde::Serialize;
use std::collections::BTreeMap;

// Time
pub const TICK_DURATION: f64 = 1.0 / 60.0; // Minutes per tick (one second)
pub const DEFAULT_MATCH_DURATION: f64 = 10.0; // Minutes
pub const DEFAULT_POPULATION: u32 = 140;
pub const DEFAULT_VARIANT: &str = "open";

// Base frag rates (frags per minute)
pub const HIGH_SKILL_BASE_RATE: f64 = 70.0;
pub const LOW_SKILL_BASE_RATE: f64 = 0.3;
pub const LOW_SKILL_RATE_STD: f64 = 0.1; // Spread of each low-skill agent's personal rate

// Noise and bursts
pub const RATE_NOISE_STD: f64 = 0.1;
pub const BURST_EVENT_PROBABILITY: f64 = 0.001; // Per tick
pub const BURST_MIN_BONUS: u64 = 3;
pub const BURST_MAX_BONUS: u64 = 7;

// Deaths
pub const RESPAWN_DELAY: f64 = 0.025; // Minutes (1.5 seconds)
pub const DEATH_RATE_HIGH: f64 = 0.2;
pub const DEATH_RATE_LOW: f64 = 0.8;

// Collision dampening for very large low-skill pools
pub const COLLISION_ONSET: f64 = 100.0;
pub const COLLISION_SCALE: f64 = 400.0;
pub const COLLISION_FLOOR: f64 = 0.5;

/// Snaps float noise in tick arithmetic.
pub const TIME_EPSILON: f64 = 1e-9;

/// Longest match we will play, in ticks. Keeps the timeline bounded in memory.
pub const MAX_MATCH_TICKS: usize = 1_000_000;

/// Congestion penalty for the high-skill agent: `1 - min(max_penalty, n / scale)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CongestionCurve {
    pub scale: f64,
    pub max_penalty: f64,
}

impl CongestionCurve {
    pub fn multiplier(&self, population: u32) -> f64 {
        let penalty = (population as f64 / self.scale).clamp(0.0, self.max_penalty);
        (1.0 - penalty).max(0.0)
    }
}

/// Spam boost for the low-skill pool: `1 + clamp((n - onset) / scale, 0, max_boost)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpamCurve {
    pub onset: f64,
    pub scale: f64,
    pub max_boost: f64,
}

impl SpamCurve {
    pub fn multiplier(&self, population: u32) -> f64 {
        let boost = (population as f64 - self.onset) / self.scale;
        1.0 + boost.clamp(0.0, self.max_boost)
    }
}

/// Collision dampening: `clamp(1 - (n - onset) / scale, floor, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CollisionCurve {
    pub onset: f64,
    pub scale: f64,
    pub floor: f64,
}

impl CollisionCurve {
    pub fn multiplier(&self, population: u32) -> f64 {
        let raw = 1.0 - (population as f64 - self.onset) / self.scale;
        raw.clamp(self.floor, 1.0)
    }
}

impl Default for CollisionCurve {
    fn default() -> Self {
        CollisionCurve {
            onset: COLLISION_ONSET,
            scale: COLLISION_SCALE,
            floor: COLLISION_FLOOR,
        }
    }
}

/// Rate modifiers that depend on the map layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapProfile {
    pub congestion: CongestionCurve,
    pub spam: SpamCurve,
}

impl MapProfile {
    /// Wide map: the pro is slowed less, spam pays off less.
    pub fn open() -> Self {
        MapProfile {
            congestion: CongestionCurve {
                scale: 500.0,
                max_penalty: 0.4,
            },
            spam: SpamCurve {
                onset: 50.0,
                scale: 150.0,
                max_boost: 0.8,
            },
        }
    }

    /// Cramped map: heavy congestion for the pro, strong overlap for the pool.
    pub fn tight() -> Self {
        MapProfile {
            congestion: CongestionCurve {
                scale: 300.0,
                max_penalty: 0.6,
            },
            spam: SpamCurve {
                onset: 50.0,
                scale: 100.0,
                max_boost: 1.2,
            },
        }
    }
}

/// Which parts of the model are switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Fidelity {
    /// Poisson-sampled frags; otherwise expected values are credited.
    pub discrete: bool,
    /// Agents can die and sit out `respawn_delay`.
    pub respawn: bool,
    /// Low-skill agents carry an archetype.
    pub personalities: bool,
}

impl Fidelity {
    pub fn continuous() -> Self {
        Fidelity {
            discrete: false,
            respawn: false,
            personalities: false,
        }
    }

    pub fn discrete() -> Self {
        Fidelity {
            discrete: true,
            respawn: true,
            personalities: false,
        }
    }

    pub fn full() -> Self {
        Fidelity {
            discrete: true,
            respawn: true,
            personalities: true,
        }
    }
}

impl Default for Fidelity {
    fn default() -> Self {
        Self::full()
    }
}

/// Every knob that shapes a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimConfig {
    pub tick_duration: f64,
    pub high_skill_base_rate: f64,
    pub low_skill_base_rate: f64,
    pub low_skill_rate_std: f64,
    pub maps: BTreeMap<String, MapProfile>,
    pub collision: CollisionCurve,
    pub rate_noise_std: f64,
    pub burst_event_probability: f64,
    pub burst_min_bonus: u64,
    pub burst_max_bonus: u64,
    pub respawn_delay: f64,
    pub death_rate_high: f64,
    pub death_rate_low: f64,
    pub fidelity: Fidelity,
}

impl Default for SimConfig {
    fn default() -> Self {
        let mut maps = BTreeMap::new();
        maps.insert("open".to_string(), MapProfile::open());
        maps.insert("tight".to_string(), MapProfile::tight());

        SimConfig {
            tick_duration: TICK_DURATION,
            high_skill_base_rate: HIGH_SKILL_BASE_RATE,
            low_skill_base_rate: LOW_SKILL_BASE_RATE,
            low_skill_rate_std: LOW_SKILL_RATE_STD,
            maps,
            collision: CollisionCurve::default(),
            rate_noise_std: RATE_NOISE_STD,
            burst_event_probability: BURST_EVENT_PROBABILITY,
            burst_min_bonus: BURST_MIN_BONUS,
            burst_max_bonus: BURST_MAX_BONUS,
            respawn_delay: RESPAWN_DELAY,
            death_rate_high: DEATH_RATE_HIGH,
            death_rate_low: DEATH_RATE_LOW,
            fidelity: Fidelity::default(),
        }
    }
}

impl SimConfig {
    /// Deterministic frag accrual, no deaths, no noise. The simplest model.
    pub fn continuous() -> Self {
        Self {
            low_skill_rate_std: 0.0,
            rate_noise_std: 0.0,
            burst_event_probability: 0.01,
            fidelity: Fidelity::continuous(),
            ..Default::default()
        }
    }

    /// Poisson frags and respawns, but every low-skill agent is alike.
    pub fn discrete() -> Self {
        Self {
            fidelity: Fidelity::discrete(),
            ..Default::default()
        }
    }

    pub fn with_fidelity(mut self, fidelity: Fidelity) -> Self {
        self.fidelity = fidelity;
        self
    }

    pub fn with_burst(mut self, probability: f64, min_bonus: u64, max_bonus: u64) -> Self {
        self.burst_event_probability = probability;
        self.burst_min_bonus = min_bonus;
        self.burst_max_bonus = max_bonus;
        self
    }

    pub fn with_respawn_delay(mut self, delay: f64) -> Self {
        self.respawn_delay = delay;
        self
    }

    pub fn with_rate_noise(mut self, std: f64) -> Self {
        self.rate_noise_std = std;
        self
    }

    pub fn with_map(mut self, name: impl Into<String>, profile: MapProfile) -> Self {
        self.maps.insert(name.into(), profile);
        self
    }

    /// Looks up the rate curves for a map, failing on names we don't know.
    pub fn profile(&self, variant: &str) -> SimResult<&MapProfile> {
        self.maps
            .get(variant)
            .ok_or_else(|| SimError::UnknownVariant(variant.to_string()))
    }

    pub fn high_skill_rate_penalty(&self, population: u32, variant: &str) -> SimResult<f64> {
        Ok(self.profile(variant)?.congestion.multiplier(population))
    }

    pub fn low_skill_rate_boost(&self, population: u32, variant: &str) -> SimResult<f64> {
        Ok(self.profile(variant)?.spam.multiplier(population))
    }

    pub fn low_skill_collision_penalty(&self, population: u32) -> f64 {
        self.collision.multiplier(population)
    }

    /// Number of ticks a match of `duration` minutes lasts.
    pub fn tick_count(&self, duration: f64) -> usize {
        ((duration / self.tick_duration) + TIME_EPSILON).floor() as usize
    }

    /// Checks the config itself plus the inputs of one run.
    pub fn validate_run(&self, population: u32, duration: f64, variant: &str) -> SimResult<()> {
        if population < 1 {
            return Err(SimError::InvalidParameter(
                "population must be at least 1".to_string(),
            ));
        }
        if !(duration.is_finite() && duration > 0.0) {
            return Err(SimError::InvalidParameter(format!(
                "match duration must be positive, got {}",
                duration
            )));
        }
        self.validate()?;
        if duration / self.tick_duration > MAX_MATCH_TICKS as f64 {
            return Err(SimError::InvalidParameter(format!(
                "match duration {} exceeds the {}-tick limit",
                duration, MAX_MATCH_TICKS
            )));
        }
        self.profile(variant)?;
        Ok(())
    }

    /// Rejects configs that would produce negative or runaway rates.
    pub fn validate(&self) -> SimResult<()> {
        if !(self.tick_duration.is_finite() && self.tick_duration > 0.0) {
            return Err(invalid("tick_duration", self.tick_duration));
        }

        let non_negative = [
            ("high_skill_base_rate", self.high_skill_base_rate),
            ("low_skill_base_rate", self.low_skill_base_rate),
            ("low_skill_rate_std", self.low_skill_rate_std),
            ("rate_noise_std", self.rate_noise_std),
            ("respawn_delay", self.respawn_delay),
            ("death_rate_high", self.death_rate_high),
            ("death_rate_low", self.death_rate_low),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(name, value));
            }
        }

        if !(0.0..=1.0).contains(&self.burst_event_probability) {
            return Err(invalid(
                "burst_event_probability",
                self.burst_event_probability,
            ));
        }
        if self.burst_min_bonus > self.burst_max_bonus {
            return Err(SimError::InvalidParameter(format!(
                "burst bonus range {}..={} is empty",
                self.burst_min_bonus, self.burst_max_bonus
            )));
        }

        for (name, profile) in &self.maps {
            let congestion = profile.congestion;
            let spam = profile.spam;
            if !(congestion.scale > 0.0 && (0.0..1.0).contains(&congestion.max_penalty)) {
                return Err(SimError::InvalidParameter(format!(
                    "map '{}' has an invalid congestion curve",
                    name
                )));
            }
            if !(spam.scale > 0.0 && spam.max_boost.is_finite() && spam.max_boost >= 0.0) {
                return Err(SimError::InvalidParameter(format!(
                    "map '{}' has an invalid spam curve",
                    name
                )));
            }
        }
        if !(self.collision.scale > 0.0 && self.collision.floor > 0.0 && self.collision.floor <= 1.0)
        {
            return Err(SimError::InvalidParameter(
                "collision curve must have a positive scale and a floor in (0, 1]".to_string(),
            ));
        }

        Ok(())
    }
}

fn invalid(name: &str, value: f64) -> SimError {
    SimError::InvalidParameter(format!("{} out of range: {}", name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_congestion_penalty_is_capped() {
        let config = SimConfig::default();
        assert_approx_eq!(config.high_skill_rate_penalty(100, "open").unwrap(), 0.8);
        assert_approx_eq!(config.high_skill_rate_penalty(10_000, "open").unwrap(), 0.6);
        assert_approx_eq!(config.high_skill_rate_penalty(150, "tight").unwrap(), 0.5);
        assert_approx_eq!(config.high_skill_rate_penalty(10_000, "tight").unwrap(), 0.4);
    }

    #[test]
    fn test_spam_boost_never_drops_below_one() {
        let config = SimConfig::default();
        assert_approx_eq!(config.low_skill_rate_boost(1, "open").unwrap(), 1.0);
        assert_approx_eq!(config.low_skill_rate_boost(50, "open").unwrap(), 1.0);
        assert_approx_eq!(config.low_skill_rate_boost(125, "open").unwrap(), 1.5);
        assert_approx_eq!(config.low_skill_rate_boost(5_000, "open").unwrap(), 1.8);
        assert_approx_eq!(config.low_skill_rate_boost(5_000, "tight").unwrap(), 2.2);
    }

    #[test]
    fn test_collision_penalty_stays_in_unit_range() {
        let config = SimConfig::default();
        assert_approx_eq!(config.low_skill_collision_penalty(1), 1.0);
        assert_approx_eq!(config.low_skill_collision_penalty(100), 1.0);
        assert_approx_eq!(config.low_skill_collision_penalty(200), 0.75);
        assert_approx_eq!(config.low_skill_collision_penalty(1_000), 0.5);
    }

    #[test]
    fn test_curves_are_monotonic() {
        let config = SimConfig::default();
        let mut prev_penalty = f64::MAX;
        let mut prev_boost = 0.0;
        for n in (1..2_000).step_by(7) {
            let penalty = config.high_skill_rate_penalty(n, "tight").unwrap();
            let boost = config.low_skill_rate_boost(n, "tight").unwrap();
            assert!(penalty <= prev_penalty);
            assert!(boost >= prev_boost);
            prev_penalty = penalty;
            prev_boost = boost;
        }
    }

    #[test]
    fn test_tick_count() {
        let config = SimConfig::default();
        assert_eq!(config.tick_count(10.0), 600);
        assert_eq!(config.tick_count(0.5), 30);
        assert_eq!(config.tick_count(1.01), 60);
        assert_eq!(config.tick_count(0.01), 0);
    }

    #[test]
    fn test_validate_run_rejects_bad_inputs() {
        let config = SimConfig::default();
        assert!(matches!(
            config.validate_run(0, 10.0, "open"),
            Err(SimError::InvalidParameter(_))
        ));
        assert!(matches!(
            config.validate_run(10, 0.0, "open"),
            Err(SimError::InvalidParameter(_))
        ));
        assert!(matches!(
            config.validate_run(10, -3.0, "open"),
            Err(SimError::InvalidParameter(_))
        ));
        assert!(matches!(
            config.validate_run(10, f64::NAN, "open"),
            Err(SimError::InvalidParameter(_))
        ));
        assert_eq!(
            config.validate_run(10, 10.0, "swamp"),
            Err(SimError::UnknownVariant("swamp".to_string()))
        );
        assert!(config.validate_run(10, 10.0, "tight").is_ok());
    }

    #[test]
    fn test_validate_run_rejects_oversized_matches() {
        let config = SimConfig::default();
        let limit = MAX_MATCH_TICKS as f64 * TICK_DURATION;
        assert!(config.validate_run(1, limit - 1.0, "open").is_ok());
        assert!(matches!(
            config.validate_run(1, limit * 2.0, "open"),
            Err(SimError::InvalidParameter(_))
        ));
        assert!(matches!(
            config.validate_run(1, 1e300, "open"),
            Err(SimError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        let config = SimConfig::default().with_burst(1.5, 3, 7);
        assert!(config.validate().is_err());

        let config = SimConfig::default().with_burst(0.1, 9, 2);
        assert!(config.validate().is_err());

        let config = SimConfig::default().with_respawn_delay(-1.0);
        assert!(config.validate().is_err());

        let config = SimConfig {
            tick_duration: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_custom_map_is_recognized() {
        let config = SimConfig::default().with_map("arena", MapProfile::tight());
        assert!(config.validate_run(5, 1.0, "arena").is_ok());
        assert_eq!(config.profile("arena").unwrap(), &MapProfile::tight());
    }

    #[test]
    fn test_presets_set_fidelity() {
        assert_eq!(SimConfig::continuous().fidelity, Fidelity::continuous());
        assert_eq!(SimConfig::discrete().fidelity, Fidelity::discrete());
        assert_eq!(SimConfig::default().fidelity, Fidelity::full());
        assert!(SimConfig::continuous().validate().is_ok());
        assert_eq!(SimConfig::continuous().low_skill_rate_std, 0.0);
    }
}
