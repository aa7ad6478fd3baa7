//! Tick-by-tick frag race between one high-skill agent and a pool of low-skill agents.
//!
//! `FragRace` owns the mutable state of a single match. Each call to
//! [`FragRace::step`] advances one tick:
//!
//! 1. respawn timers count down,
//! 2. both sides' instantaneous rates are computed from the config curves and noise,
//! 3. rates become frag counts (Poisson, or expected values in continuous mode),
//! 4. the low-skill side may land a burst bonus,
//! 5. active agents roll for death,
//! 6. a cumulative sample is appended to the timeline.
//!
//! All randomness comes from the caller's RNG, so a seeded generator reproduces a
//! match exactly.

use crate::agent::{HighSkillAgent, LowSkillAgent};
use crate::config::{SimConfig, MAX_MATCH_TICKS};
use crate::error::{SimError, SimResult};
use crate::personality::Archetype;
use crate::utils::{noise_multiplier, normal_non_negative, poisson_count};
use crate::{debug_engine, debug_respawn};
use log::info;
use rand::Rng;
use serde::Serialize;

/// Cumulative score after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub elapsed_minutes: f64,
    pub high_frags: u64,
    pub low_frags: u64,
}

/// Everything a finished match hands back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub population: u32,
    pub duration: f64,
    pub variant: String,
    pub timeline: Vec<Sample>,
    pub high_frags: u64,
    pub low_frags: u64,
    /// Archetype of each low-skill agent, in agent order. Empty when personalities are off.
    pub personalities: Vec<Archetype>,
    pub high_deaths: u32,
    pub low_deaths: u32,
    pub bursts: u32,
    /// Minutes the high-skill agent spent in play.
    pub high_active_time: f64,
    /// Minutes each low-skill agent spent in play.
    pub low_active_time: Vec<f64>,
}

/// Per-tick rate modifiers that only depend on population and map.
#[derive(Debug, Clone, Copy)]
struct Modifiers {
    congestion: f64,
    spam: f64,
    collision: f64,
}

pub struct FragRace<'a> {
    config: &'a SimConfig,
    population: u32,
    duration: f64,
    variant: String,
    modifiers: Modifiers,
    high: HighSkillAgent,
    low: Vec<LowSkillAgent>,
    high_frags: u64,
    low_frags: u64,
    // Fractional frags not yet credited in continuous mode
    high_carry: f64,
    low_carry: f64,
    bursts: u32,
    current_tick: usize,
    total_ticks: usize,
    timeline: Vec<Sample>,
}

impl<'a> FragRace<'a> {
    /// Validate inputs and spawn every agent. Fails before any state exists.
    pub fn new<R: Rng + ?Sized>(
        config: &'a SimConfig,
        population: u32,
        duration: f64,
        variant: &str,
        rng: &mut R,
    ) -> SimResult<Self> {
        config.validate_run(population, duration, variant)?;
        let profile = config.profile(variant)?;

        let modifiers = Modifiers {
            congestion: profile.congestion.multiplier(population),
            spam: profile.spam.multiplier(population),
            collision: config.low_skill_collision_penalty(population),
        };

        let low = (0..population)
            .map(|_| spawn_low_skill(config, rng))
            .collect::<Vec<_>>();

        let total_ticks = config.tick_count(duration);
        info!(
            "Frag race: {} low-skill agents vs 1 on '{}' for {:.2} min ({} ticks)",
            population, variant, duration, total_ticks
        );
        info!(
            "Modifiers: congestion {:.3}, spam {:.3}, collision {:.3}",
            modifiers.congestion, modifiers.spam, modifiers.collision
        );

        Ok(FragRace {
            config,
            population,
            duration,
            variant: variant.to_string(),
            modifiers,
            high: HighSkillAgent::default(),
            low,
            high_frags: 0,
            low_frags: 0,
            high_carry: 0.0,
            low_carry: 0.0,
            bursts: 0,
            current_tick: 0,
            total_ticks,
            timeline: Vec::with_capacity(total_ticks.min(MAX_MATCH_TICKS)),
        })
    }

    pub fn high(&self) -> &HighSkillAgent {
        &self.high
    }

    pub fn low(&self) -> &[LowSkillAgent] {
        &self.low
    }

    pub fn timeline(&self) -> &[Sample] {
        &self.timeline
    }

    pub fn totals(&self) -> (u64, u64) {
        (self.high_frags, self.low_frags)
    }

    pub fn is_finished(&self) -> bool {
        self.current_tick >= self.total_ticks
    }

    /// Put the high-skill agent into respawn right now.
    pub fn force_death_high(&mut self) {
        self.high.timer.kill(self.config.respawn_delay);
        self.high.deaths += 1;
    }

    /// Put low-skill agent `index` into respawn right now.
    pub fn force_death_low(&mut self, index: usize) -> SimResult<()> {
        let delay = self.config.respawn_delay;
        let agent = self.low.get_mut(index).ok_or_else(|| {
            SimError::InvalidParameter(format!("no low-skill agent at index {}", index))
        })?;
        agent.timer.kill(delay);
        agent.deaths += 1;
        Ok(())
    }

    /// Advance one tick. Returns the new sample, or `None` once the match is over.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Sample> {
        if self.is_finished() {
            return None;
        }

        let config = self.config;
        let tick = config.tick_duration;
        let fidelity = config.fidelity;
        let elapsed = self.current_tick as f64 * tick;

        self.high.timer.tick(tick);
        for agent in &mut self.low {
            agent.timer.tick(tick);
        }

        let high_active = self.high.timer.is_active();
        let active_low = self.low.iter().filter(|a| a.is_active()).count();

        // High-skill rate
        let high_rate = config.high_skill_base_rate
            * self.modifiers.congestion
            * noise_multiplier(config.rate_noise_std, rng);

        // Low-skill pooled rate
        let pooled_rate: f64 = self
            .low
            .iter()
            .filter(|a| a.is_active())
            .map(|a| a.personal_rate)
            .sum();
        let pooled_noise = if fidelity.personalities {
            if active_low > 0 {
                let spread_sum: f64 = self
                    .low
                    .iter()
                    .filter(|a| a.is_active())
                    .map(|a| noise_multiplier(a.noise_spread, rng))
                    .sum();
                spread_sum / active_low as f64
            } else {
                1.0
            }
        } else {
            noise_multiplier(config.rate_noise_std, rng)
        };
        let low_rate =
            pooled_rate * self.modifiers.spam * self.modifiers.collision * pooled_noise;

        let high_step = if high_active {
            if fidelity.discrete {
                poisson_count(high_rate * tick, rng)
            } else {
                credit_expected(&mut self.high_carry, high_rate * tick)
            }
        } else {
            0
        };

        let mut low_step = if active_low > 0 {
            if fidelity.discrete {
                poisson_count(low_rate * tick, rng)
            } else {
                credit_expected(&mut self.low_carry, low_rate * tick)
            }
        } else {
            0
        };

        if active_low > 0
            && config.burst_event_probability > 0.0
            && rng.gen_bool(config.burst_event_probability)
        {
            let bonus = rng.gen_range(config.burst_min_bonus..=config.burst_max_bonus);
            low_step += bonus;
            self.bursts += 1;
            debug_engine!(self.current_tick, "Burst event: +{} low-skill frags", bonus);
        }

        self.high_frags += high_step;
        self.low_frags += low_step;

        if fidelity.respawn {
            self.roll_deaths(high_active, high_step, rng);
        }

        if self.high.timer.is_active() {
            self.high.active_time += tick;
        }
        for agent in &mut self.low {
            if agent.is_active() {
                agent.active_time += tick;
            }
        }

        let sample = Sample {
            elapsed_minutes: elapsed,
            high_frags: self.high_frags,
            low_frags: self.low_frags,
        };
        self.timeline.push(sample);

        debug_engine!(
            self.current_tick,
            "rates {:.2}/{:.2} fpm, step {}/{}, active low {}, totals {}/{}",
            high_rate,
            low_rate,
            high_step,
            low_step,
            active_low,
            self.high_frags,
            self.low_frags
        );

        self.current_tick += 1;
        Some(sample)
    }

    // Death risk scales with aggression: realized frags for the high-skill agent,
    // personal rate for each low-skill agent regardless of who scored.
    fn roll_deaths<R: Rng + ?Sized>(&mut self, high_active: bool, high_step: u64, rng: &mut R) {
        let config = self.config;
        let tick = config.tick_duration;

        if high_active {
            let mean = high_step as f64 * tick * config.death_rate_high;
            if poisson_count(mean, rng) > 0 {
                self.high.timer.kill(config.respawn_delay);
                self.high.deaths += 1;
                debug_respawn!(self.current_tick, "High-skill agent died");
            }
        }

        for (index, agent) in self.low.iter_mut().enumerate() {
            if !agent.is_active() {
                continue;
            }
            let mean = agent.personal_rate * tick * agent.death_rate;
            if poisson_count(mean, rng) > 0 {
                agent.timer.kill(config.respawn_delay);
                agent.deaths += 1;
                debug_respawn!(self.current_tick, "Low-skill agent {} died", index);
            }
        }
    }

    /// Run the remaining ticks and package the result.
    pub fn run_to_end<R: Rng + ?Sized>(mut self, rng: &mut R) -> MatchResult {
        while self.step(rng).is_some() {}
        self.finish()
    }

    pub fn finish(self) -> MatchResult {
        info!(
            "Match over after {} ticks: high-skill {} vs low-skill {}",
            self.current_tick, self.high_frags, self.low_frags
        );

        let personalities = self.low.iter().filter_map(|a| a.personality).collect();
        let low_deaths = self.low.iter().map(|a| a.deaths).sum();
        let low_active_time = self.low.iter().map(|a| a.active_time).collect();

        MatchResult {
            population: self.population,
            duration: self.duration,
            variant: self.variant,
            timeline: self.timeline,
            high_frags: self.high_frags,
            low_frags: self.low_frags,
            personalities,
            high_deaths: self.high.deaths,
            low_deaths,
            bursts: self.bursts,
            high_active_time: self.high.active_time,
            low_active_time,
        }
    }
}

/// Play a full match.
pub fn run<R: Rng + ?Sized>(
    population: u32,
    duration: f64,
    variant: &str,
    config: &SimConfig,
    rng: &mut R,
) -> SimResult<MatchResult> {
    let race = FragRace::new(config, population, duration, variant, rng)?;
    Ok(race.run_to_end(rng))
}

fn spawn_low_skill<R: Rng + ?Sized>(config: &SimConfig, rng: &mut R) -> LowSkillAgent {
    if config.fidelity.personalities {
        let archetype = Archetype::random(rng);
        let rate = normal_non_negative(
            config.low_skill_base_rate * archetype.kill_rate_bias(),
            config.low_skill_rate_std,
            rng,
        );
        LowSkillAgent::new(
            Some(archetype),
            rate,
            archetype.kill_rate_variance(),
            config.death_rate_low * archetype.death_rate_multiplier(),
        )
    } else {
        let rate = normal_non_negative(config.low_skill_base_rate, config.low_skill_rate_std, rng);
        LowSkillAgent::new(None, rate, config.rate_noise_std, config.death_rate_low)
    }
}

// Adds the expected frags to the carry and pays out whole frags.
fn credit_expected(carry: &mut f64, expected: f64) -> u64 {
    *carry += expected.max(0.0);
    let whole = carry.floor();
    *carry -= whole;
    whole as u64
}
