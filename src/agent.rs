use crate::config::TIME_EPSILON;
use crate::personality::Archetype;

// Whether an agent can score and die this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentStatus {
    Active,
    Respawning,
}

/// Remaining downtime in minutes. Zero means the agent is in play.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RespawnTimer {
    remaining: f64,
}

impl RespawnTimer {
    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.remaining == 0.0
    }

    pub fn status(&self) -> AgentStatus {
        if self.is_active() {
            AgentStatus::Active
        } else {
            AgentStatus::Respawning
        }
    }

    /// Advance by one tick, flooring at zero. Residue below `TIME_EPSILON` counts as zero.
    pub fn tick(&mut self, tick_duration: f64) {
        let next = self.remaining - tick_duration;
        self.remaining = if next <= TIME_EPSILON { 0.0 } else { next };
    }

    pub fn kill(&mut self, respawn_delay: f64) {
        self.remaining = respawn_delay.max(0.0);
    }
}

// The lone high-skill player
#[derive(Debug, Clone, Default)]
pub struct HighSkillAgent {
    pub timer: RespawnTimer,
    pub deaths: u32,
    pub active_time: f64,
}

// One member of the low-skill pool
#[derive(Debug, Clone)]
pub struct LowSkillAgent {
    pub personality: Option<Archetype>,
    /// Frags per minute, fixed at spawn.
    pub personal_rate: f64,
    pub noise_spread: f64,
    pub death_rate: f64,
    pub timer: RespawnTimer,
    pub deaths: u32,
    pub active_time: f64,
}

impl LowSkillAgent {
    pub fn new(personality: Option<Archetype>, personal_rate: f64, noise_spread: f64, death_rate: f64) -> Self {
        LowSkillAgent {
            personality,
            personal_rate: personal_rate.max(0.0),
            noise_spread,
            death_rate,
            timer: RespawnTimer::default(),
            deaths: 0,
            active_time: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RESPAWN_DELAY, TICK_DURATION};
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_timer_starts_active() {
        let timer = RespawnTimer::default();
        assert!(timer.is_active());
        assert_eq!(timer.status(), AgentStatus::Active);
    }

    #[test]
    fn test_kill_sets_exact_delay() {
        let mut timer = RespawnTimer::default();
        timer.kill(RESPAWN_DELAY);
        assert_eq!(timer.remaining(), RESPAWN_DELAY);
        assert_eq!(timer.status(), AgentStatus::Respawning);
    }

    #[test]
    fn test_timer_decays_in_whole_ticks() {
        // 1.5 ticks of downtime rounds up to two ticks
        let mut timer = RespawnTimer::default();
        timer.kill(RESPAWN_DELAY);
        timer.tick(TICK_DURATION);
        assert!(!timer.is_active());
        assert_approx_eq!(timer.remaining(), RESPAWN_DELAY - TICK_DURATION);
        timer.tick(TICK_DURATION);
        assert!(timer.is_active());
        assert_eq!(timer.remaining(), 0.0);
    }

    #[test]
    fn test_exact_multiple_of_tick_is_not_stretched() {
        let mut timer = RespawnTimer::default();
        timer.kill(3.0 * TICK_DURATION);
        for _ in 0..2 {
            timer.tick(TICK_DURATION);
            assert!(!timer.is_active());
        }
        timer.tick(TICK_DURATION);
        assert!(timer.is_active());
    }

    #[test]
    fn test_timer_never_negative() {
        let mut timer = RespawnTimer::default();
        for _ in 0..10 {
            timer.tick(TICK_DURATION);
            assert!(timer.remaining() >= 0.0);
        }
        timer.kill(-5.0);
        assert_eq!(timer.remaining(), 0.0);
    }

    #[test]
    fn test_low_skill_rate_clamped() {
        let agent = LowSkillAgent::new(None, -0.2, 0.1, 0.8);
        assert_eq!(agent.personal_rate, 0.0);
        assert!(agent.is_active());
    }
}
