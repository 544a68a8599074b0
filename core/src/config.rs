//! Season economy configuration and the built-in presets.
//!
//! The engine trusts whatever it is handed. `validate()` is the
//! caller-side gate that keeps divisors strictly positive and values
//! inside the ranges the tooling exposes.

use crate::error::{SimError, SimResult};
use crate::types::Xp;
use serde::{Deserialize, Serialize};

pub const MIN_SEASON_DAYS: u32 = 14;
pub const MAX_SEASON_DAYS: u32 = 120;

/// One season's economic rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonConfig {
    pub total_days: u32,
    pub total_tiers: u32,
    pub xp_per_tier: Xp,
    /// Passive experience per minute of play.
    pub xp_per_minute: Xp,
    pub daily_quest_xp: Xp,
    pub weekly_challenge_xp: Xp,
    /// Catch-up lever: unclaimed weekly sets accumulate as a backlog.
    pub is_weekly_stackable: bool,
    /// One-time pool spread across every expected play day.
    pub milestone_xp: Xp,
    /// Play minutes needed to clear one week of challenges (stackable only).
    pub challenge_clear_mins: f64,
    /// Real-money price of one tier. Only used by summaries.
    pub cost_per_tier: f64,
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            total_days:           85,
            total_tiers:          100,
            xp_per_tier:          80_000.0,
            xp_per_minute:        300.0,
            daily_quest_xp:       25_000.0,
            weekly_challenge_xp:  120_000.0,
            is_weekly_stackable:  true,
            milestone_xp:         2_400_000.0,
            challenge_clear_mins: 180.0,
            cost_per_tier:        1.50,
        }
    }
}

impl SeasonConfig {
    /// Load a configuration from a JSON file.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SeasonConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        log::debug!("Loaded season config from {path}");
        Ok(config)
    }

    /// Check every field against its documented domain.
    pub fn validate(&self) -> SimResult<()> {
        if !(MIN_SEASON_DAYS..=MAX_SEASON_DAYS).contains(&self.total_days) {
            return Err(invalid(
                "totalDays",
                format!("{} outside {MIN_SEASON_DAYS}..={MAX_SEASON_DAYS}", self.total_days),
            ));
        }
        if self.total_tiers == 0 {
            return Err(invalid("totalTiers", "must be at least 1".into()));
        }
        positive("xpPerTier", self.xp_per_tier)?;
        positive("challengeClearMins", self.challenge_clear_mins)?;
        non_negative("xpPerMinute", self.xp_per_minute)?;
        non_negative("dailyQuestXp", self.daily_quest_xp)?;
        non_negative("weeklyChallengeXp", self.weekly_challenge_xp)?;
        non_negative("milestoneXp", self.milestone_xp)?;
        non_negative("costPerTier", self.cost_per_tier)?;
        Ok(())
    }

    /// Return a copy with every `Some` field of `patch` applied.
    pub fn patched(&self, patch: &ConfigPatch) -> Self {
        let mut next = self.clone();
        if let Some(v) = patch.total_days           { next.total_days = v; }
        if let Some(v) = patch.total_tiers          { next.total_tiers = v; }
        if let Some(v) = patch.xp_per_tier          { next.xp_per_tier = v; }
        if let Some(v) = patch.xp_per_minute        { next.xp_per_minute = v; }
        if let Some(v) = patch.daily_quest_xp       { next.daily_quest_xp = v; }
        if let Some(v) = patch.weekly_challenge_xp  { next.weekly_challenge_xp = v; }
        if let Some(v) = patch.is_weekly_stackable  { next.is_weekly_stackable = v; }
        if let Some(v) = patch.milestone_xp         { next.milestone_xp = v; }
        if let Some(v) = patch.challenge_clear_mins { next.challenge_clear_mins = v; }
        if let Some(v) = patch.cost_per_tier        { next.cost_per_tier = v; }
        next
    }
}

/// Partial update to a `SeasonConfig`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    pub total_days:           Option<u32>,
    pub total_tiers:          Option<u32>,
    pub xp_per_tier:          Option<Xp>,
    pub xp_per_minute:        Option<Xp>,
    pub daily_quest_xp:       Option<Xp>,
    pub weekly_challenge_xp:  Option<Xp>,
    pub is_weekly_stackable:  Option<bool>,
    pub milestone_xp:         Option<Xp>,
    pub challenge_clear_mins: Option<f64>,
    pub cost_per_tier:        Option<f64>,
}

fn invalid(field: &'static str, reason: String) -> SimError {
    SimError::InvalidValue { field, reason }
}

fn positive(field: &'static str, value: f64) -> SimResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} must be a finite number > 0")))
    }
}

fn non_negative(field: &'static str, value: f64) -> SimResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} must be a finite number >= 0")))
    }
}

// ── Presets ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SeasonPreset {
    pub key:         &'static str,
    pub label:       &'static str,
    pub description: &'static str,
    pub config:      SeasonConfig,
}

/// All built-in presets, in display order.
pub fn presets() -> Vec<SeasonPreset> {
    vec![
        SeasonPreset {
            key: "balanced",
            label: "Balanced Standard",
            description: "A fair season where dedicated players complete without spending.",
            config: SeasonConfig::default(),
        },
        SeasonPreset {
            key: "generous_grind",
            label: "Generous Grind",
            description: "High XP rates reward playtime; most players finish early.",
            config: SeasonConfig {
                total_days:           90,
                total_tiers:          100,
                xp_per_tier:          60_000.0,
                xp_per_minute:        500.0,
                daily_quest_xp:       35_000.0,
                weekly_challenge_xp:  200_000.0,
                is_weekly_stackable:  true,
                milestone_xp:         3_000_000.0,
                challenge_clear_mins: 120.0,
                cost_per_tier:        1.00,
            },
        },
        SeasonPreset {
            key: "time_gated",
            label: "Time-Gated",
            description: "Daily login matters more than session length. Consistency wins.",
            config: SeasonConfig {
                total_days:           70,
                total_tiers:          100,
                xp_per_tier:          90_000.0,
                xp_per_minute:        150.0,
                daily_quest_xp:       40_000.0,
                weekly_challenge_xp:  80_000.0,
                is_weekly_stackable:  false,
                milestone_xp:         1_500_000.0,
                challenge_clear_mins: 60.0,
                cost_per_tier:        2.00,
            },
        },
        SeasonPreset {
            key: "whale_bait",
            label: "Whale Bait",
            description: "Aggressive monetization; most players fall short without spending.",
            config: SeasonConfig {
                total_days:           60,
                total_tiers:          100,
                xp_per_tier:          120_000.0,
                xp_per_minute:        200.0,
                daily_quest_xp:       15_000.0,
                weekly_challenge_xp:  80_000.0,
                is_weekly_stackable:  false,
                milestone_xp:         1_000_000.0,
                challenge_clear_mins: 240.0,
                cost_per_tier:        3.50,
            },
        },
    ]
}

/// Look up a preset by key.
pub fn preset(key: &str) -> SimResult<SeasonPreset> {
    presets()
        .into_iter()
        .find(|p| p.key == key)
        .ok_or_else(|| SimError::UnknownPreset { key: key.to_string() })
}
