//! Repeated-trial population sweep.
//!
//! Plays `trials` matches at each population in the range and records how often the
//! pooled side wins. The tipping point is the first population where the pool wins
//! at least half of its trials.

use crate::config::SimConfig;
use crate::debug_sweep;
use crate::engine;
use crate::error::{SimError, SimResult};
use crate::report::{MatchOutcome, Side};
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub start: u32,
    pub end: u32,
    pub step: u32,
    pub trials: u32,
    /// Trial `k` at every population uses `seed + k`. `None` draws fresh entropy.
    pub seed: Option<u64>,
    pub duration: f64,
    pub variant: String,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            start: 50,
            end: 250,
            step: 10,
            trials: 20,
            seed: None,
            duration: crate::config::DEFAULT_MATCH_DURATION,
            variant: crate::config::DEFAULT_VARIANT.to_string(),
        }
    }
}

impl SweepConfig {
    pub fn populations(&self) -> impl Iterator<Item = u32> {
        (self.start..=self.end).step_by(self.step.max(1) as usize)
    }

    fn validate(&self) -> SimResult<()> {
        if self.step == 0 {
            return Err(SimError::InvalidParameter("sweep step must be at least 1".to_string()));
        }
        if self.start > self.end {
            return Err(SimError::InvalidParameter(format!(
                "sweep range {}..={} is empty",
                self.start, self.end
            )));
        }
        if self.trials == 0 {
            return Err(SimError::InvalidParameter("sweep needs at least one trial".to_string()));
        }
        Ok(())
    }
}

/// Aggregated trials at one population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationStats {
    pub population: u32,
    pub trials: u32,
    pub low_wins: u32,
    pub avg_high_frags: f64,
    pub avg_low_frags: f64,
}

impl PopulationStats {
    pub fn low_win_fraction(&self) -> f64 {
        self.low_wins as f64 / self.trials.max(1) as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepReport {
    pub variant: String,
    pub duration: f64,
    pub rows: Vec<PopulationStats>,
}

impl SweepReport {
    /// First population where the pool wins at least half its trials.
    pub fn tipping_point(&self) -> Option<u32> {
        self.rows
            .iter()
            .find(|row| row.low_win_fraction() >= 0.5)
            .map(|row| row.population)
    }

    pub fn to_text(&self) -> String {
        let mut report = String::new();
        report.push_str(&format!(
            "Population Sweep ('{}' map, {}-minute matches)\n",
            self.variant, self.duration
        ));
        report.push_str("  Pop    Trials   Pool Wins   Avg Pro   Avg Pool\n");
        report.push_str("  ────   ──────   ─────────   ───────   ────────\n");
        for row in &self.rows {
            report.push_str(&format!(
                "  {:4}   {:6}   {:>8.1}%   {:7.1}   {:8.1}\n",
                row.population,
                row.trials,
                row.low_win_fraction() * 100.0,
                row.avg_high_frags,
                row.avg_low_frags
            ));
        }
        match self.tipping_point() {
            Some(population) => {
                report.push_str(&format!("  Tipping point: {} beginners\n", population))
            }
            None => report.push_str("  Tipping point: not reached in this range\n"),
        }
        report
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Run every trial at every population in the sweep.
pub fn run_sweep(sweep: &SweepConfig, config: &SimConfig) -> SimResult<SweepReport> {
    sweep.validate()?;
    config.validate_run(sweep.start.max(1), sweep.duration, &sweep.variant)?;

    let mut rows = Vec::new();
    for population in sweep.populations() {
        let row = run_population(population, sweep, config)?;
        debug_sweep!(
            population,
            "pool won {}/{} (avg {:.1} vs {:.1})",
            row.low_wins,
            row.trials,
            row.avg_low_frags,
            row.avg_high_frags
        );
        rows.push(row);
    }

    let report = SweepReport {
        variant: sweep.variant.clone(),
        duration: sweep.duration,
        rows,
    };
    info!(
        "Sweep finished: tipping point {:?}",
        report.tipping_point()
    );
    Ok(report)
}

fn run_population(
    population: u32,
    sweep: &SweepConfig,
    config: &SimConfig,
) -> SimResult<PopulationStats> {
    let mut low_wins = 0;
    let mut high_total = 0u64;
    let mut low_total = 0u64;

    for trial in 0..sweep.trials {
        let mut rng = match sweep.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(trial as u64)),
            None => ChaCha8Rng::from_entropy(),
        };
        let result = engine::run(population, sweep.duration, &sweep.variant, config, &mut rng)?;
        if MatchOutcome::from_result(&result).winner == Side::LowSkill {
            low_wins += 1;
        }
        high_total += result.high_frags;
        low_total += result.low_frags;
    }

    Ok(PopulationStats {
        population,
        trials: sweep.trials,
        low_wins,
        avg_high_frags: high_total as f64 / sweep.trials as f64,
        avg_low_frags: low_total as f64 / sweep.trials as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(population: u32, low_wins: u32) -> PopulationStats {
        PopulationStats {
            population,
            trials: 10,
            low_wins,
            avg_high_frags: 0.0,
            avg_low_frags: 0.0,
        }
    }

    #[test]
    fn test_populations_inclusive() {
        let sweep = SweepConfig {
            start: 10,
            end: 30,
            step: 10,
            ..Default::default()
        };
        assert_eq!(sweep.populations().collect::<Vec<_>>(), vec![10, 20, 30]);
    }

    #[test]
    fn test_tipping_point_is_first_majority() {
        let report = SweepReport {
            variant: "open".to_string(),
            duration: 10.0,
            rows: vec![row(100, 0), row(120, 3), row(140, 5), row(160, 4), row(180, 9)],
        };
        assert_eq!(report.tipping_point(), Some(140));
        assert!(report.to_text().contains("Tipping point: 140 beginners"));
    }

    #[test]
    fn test_no_tipping_point() {
        let report = SweepReport {
            variant: "open".to_string(),
            duration: 10.0,
            rows: vec![row(10, 0), row(20, 1)],
        };
        assert_eq!(report.tipping_point(), None);
        assert!(report.to_text().contains("not reached"));
    }

    #[test]
    fn test_invalid_sweeps_rejected() {
        let config = SimConfig::default();
        let bad_step = SweepConfig {
            step: 0,
            ..Default::default()
        };
        assert!(run_sweep(&bad_step, &config).is_err());

        let bad_range = SweepConfig {
            start: 100,
            end: 50,
            ..Default::default()
        };
        assert!(run_sweep(&bad_range, &config).is_err());

        let bad_map = SweepConfig {
            variant: "moon".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            run_sweep(&bad_map, &config),
            Err(SimError::UnknownVariant(_))
        ));

        let zero_start = SweepConfig {
            start: 0,
            end: 0,
            trials: 1,
            seed: Some(1),
            duration: 0.1,
            ..Default::default()
        };
        assert!(matches!(
            run_sweep(&zero_start, &config),
            Err(SimError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_seeded_sweep_is_reproducible() {
        let config = SimConfig::default();
        let sweep = SweepConfig {
            start: 20,
            end: 60,
            step: 20,
            trials: 3,
            seed: Some(42),
            duration: 1.0,
            ..Default::default()
        };
        let a = run_sweep(&sweep, &config).unwrap();
        let b = run_sweep(&sweep, &config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.rows.len(), 3);
        assert!(a.rows.iter().all(|r| r.trials == 3));
    }
}
