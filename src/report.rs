//! Match summaries.

use crate::engine::MatchResult;
use crate::personality::Archetype;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    HighSkill,
    LowSkill,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::HighSkill => f.write_str("PRO"),
            Side::LowSkill => f.write_str("BEGINNER TEAM"),
        }
    }
}

/// Final score of one match and who took it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchOutcome {
    pub winner: Side,
    pub margin: u64,
    pub high_frags: u64,
    pub low_frags: u64,
    pub duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Vec<ArchetypeCount>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchetypeCount {
    pub archetype: Archetype,
    pub count: usize,
}

impl MatchOutcome {
    /// The pool only wins on a strictly higher total; a tie goes to the high-skill agent.
    pub fn from_totals(high_frags: u64, low_frags: u64, duration: f64) -> Self {
        let winner = if low_frags > high_frags {
            Side::LowSkill
        } else {
            Side::HighSkill
        };
        MatchOutcome {
            winner,
            margin: high_frags.abs_diff(low_frags),
            high_frags,
            low_frags,
            duration,
            breakdown: None,
        }
    }

    /// Attach the pool's archetype counts so they travel with the JSON form.
    pub fn with_breakdown(mut self, personalities: &[Archetype]) -> Self {
        self.breakdown = Some(
            archetype_breakdown(personalities)
                .into_iter()
                .map(|(archetype, count)| ArchetypeCount { archetype, count })
                .collect(),
        );
        self
    }

    pub fn from_result(result: &MatchResult) -> Self {
        Self::from_totals(result.high_frags, result.low_frags, result.duration)
    }

    pub fn to_text(&self) -> String {
        let mut report = String::new();
        report.push_str(&format!("Final Result ({}-minute match)\n", self.duration));
        report.push_str(&format!("  Pro Frags:           {}\n", self.high_frags));
        report.push_str(&format!("  Beginner Team Frags: {}\n", self.low_frags));
        report.push_str(&format!(
            "  Winner: {} (by {} frags)\n",
            self.winner, self.margin
        ));
        report
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Count of each archetype present, in catalog order.
pub fn archetype_breakdown(personalities: &[Archetype]) -> Vec<(Archetype, usize)> {
    let mut counts: BTreeMap<Archetype, usize> = BTreeMap::new();
    for archetype in personalities {
        *counts.entry(*archetype).or_insert(0) += 1;
    }
    Archetype::ALL
        .iter()
        .filter_map(|a| counts.get(a).map(|&n| (*a, n)))
        .collect()
}

pub fn breakdown_text(personalities: &[Archetype]) -> String {
    let mut report = String::from("Beginner Archetype Breakdown:\n");
    for (archetype, count) in archetype_breakdown(personalities) {
        report.push_str(&format!("  {:<16} {}\n", format!("{}:", archetype), count));
    }
    report
}

/// Deaths, bursts and uptime for a finished match.
pub fn detail_text(result: &MatchResult) -> String {
    let population = result.low_active_time.len().max(1) as f64;
    let avg_low_uptime = result.low_active_time.iter().sum::<f64>() / population;
    let mut report = String::from("Match Details:\n");
    report.push_str(&format!(
        "  Map / Population:    {} / {}\n",
        result.variant, result.population
    ));
    report.push_str(&format!("  Pro Deaths:          {}\n", result.high_deaths));
    report.push_str(&format!("  Beginner Deaths:     {}\n", result.low_deaths));
    report.push_str(&format!("  Burst Events:        {}\n", result.bursts));
    report.push_str(&format!(
        "  Pro Uptime:          {:.2} min\n",
        result.high_active_time
    ));
    report.push_str(&format!(
        "  Avg Beginner Uptime: {:.2} min\n",
        avg_low_uptime
    ));
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_skill_wins_only_when_strictly_ahead() {
        let outcome = MatchOutcome::from_totals(500, 501, 10.0);
        assert_eq!(outcome.winner, Side::LowSkill);
        assert_eq!(outcome.margin, 1);

        let outcome = MatchOutcome::from_totals(500, 500, 10.0);
        assert_eq!(outcome.winner, Side::HighSkill);
        assert_eq!(outcome.margin, 0);

        let outcome = MatchOutcome::from_totals(612, 480, 10.0);
        assert_eq!(outcome.winner, Side::HighSkill);
        assert_eq!(outcome.margin, 132);
    }

    #[test]
    fn test_text_mentions_winner_and_margin() {
        let text = MatchOutcome::from_totals(300, 420, 10.0).to_text();
        assert!(text.contains("Pro Frags:           300"));
        assert!(text.contains("Beginner Team Frags: 420"));
        assert!(text.contains("Winner: BEGINNER TEAM (by 120 frags)"));
    }

    #[test]
    fn test_json_fields() {
        let json = MatchOutcome::from_totals(10, 3, 1.0).to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["winner"], "HighSkill");
        assert_eq!(value["margin"], 7);
        assert!(value.get("breakdown").is_none());
    }

    #[test]
    fn test_json_carries_breakdown() {
        let personalities = vec![Archetype::Rager, Archetype::Coder, Archetype::Rager];
        let json = MatchOutcome::from_totals(10, 3, 1.0)
            .with_breakdown(&personalities)
            .to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let breakdown = value["breakdown"].as_array().unwrap();
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0]["archetype"], "Coder");
        assert_eq!(breakdown[0]["count"], 1);
        assert_eq!(breakdown[1]["archetype"], "Rager");
        assert_eq!(breakdown[1]["count"], 2);
    }

    #[test]
    fn test_breakdown_in_catalog_order() {
        let personalities = vec![
            Archetype::Rager,
            Archetype::Coder,
            Archetype::Rager,
            Archetype::AfkGuy,
        ];
        let breakdown = archetype_breakdown(&personalities);
        assert_eq!(
            breakdown,
            vec![
                (Archetype::Coder, 1),
                (Archetype::Rager, 2),
                (Archetype::AfkGuy, 1)
            ]
        );
        let text = breakdown_text(&personalities);
        assert!(text.contains("Rager:"));
        assert!(!text.contains("Tactician"));
    }

    #[test]
    fn test_detail_text_from_real_match() {
        use crate::config::SimConfig;
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        let config = SimConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let result = crate::engine::run(60, 2.0, "tight", &config, &mut rng).unwrap();
        let text = detail_text(&result);
        assert!(text.contains("tight / 60"));
        assert!(text.contains(&format!("Burst Events:        {}", result.bursts)));

        let outcome = MatchOutcome::from_result(&result);
        assert_eq!(outcome.high_frags, result.high_frags);
        assert_eq!(outcome.duration, 2.0);
    }

    #[test]
    fn test_breakdown_empty() {
        assert!(archetype_breakdown(&[]).is_empty());
    }
}
