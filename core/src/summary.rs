//! Downstream summaries derived from finished traces.
//!
//! Nothing here feeds back into the engine. These are the numbers a
//! designer reads off a cohort: completion, catch-up spend, pace.

use crate::{
    cohort::CohortRun,
    config::SeasonConfig,
    engine::{expected_play_days, TraceEntry},
    types::{Day, PersonaId},
};
use serde::Serialize;

/// How hard the season pushes a persona toward buying tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionPressure {
    None,
    Low,
    Medium,
    High,
}

impl ConversionPressure {
    pub fn from_completion(completion_pct: u32) -> Self {
        match completion_pct {
            100.. => Self::None,
            80..=99 => Self::Low,
            50..=79 => Self::Medium,
            _ => Self::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaOutcome {
    pub final_tier: u32,
    /// Floor of final/total as a percentage, capped at 100.
    pub completion_pct: u32,
    pub play_days: u32,
    pub play_hours: f64,
    pub hours_per_tier: Option<f64>,
    pub tiers_short: u32,
    pub catch_up_cost: f64,
    pub pressure: ConversionPressure,
}

impl PersonaOutcome {
    pub fn from_run(run: &CohortRun, config: &SeasonConfig) -> Self {
        let final_tier = run.final_entry().map_or(0, |e| e.tier);
        let completion_pct = completion_pct(final_tier, config);
        let play_days = expected_play_days(&run.persona, config);
        let play_hours = (f64::from(play_days) * run.persona.minutes_per_session / 60.0).round();
        let tiers_short = config.total_tiers.saturating_sub(final_tier);

        Self {
            final_tier,
            completion_pct,
            play_days,
            play_hours,
            hours_per_tier: (final_tier > 0).then(|| play_hours / f64::from(final_tier)),
            tiers_short,
            catch_up_cost: f64::from(tiers_short) * config.cost_per_tier,
            pressure: ConversionPressure::from_completion(completion_pct),
        }
    }
}

fn completion_pct(tier: u32, config: &SeasonConfig) -> u32 {
    let pct = (f64::from(tier) / f64::from(config.total_tiers) * 100.0).floor() as u32;
    pct.min(100)
}

// ── Pace ───────────────────────────────────────────────────────────

/// First 1-based day on which each share of the tier track is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaceMilestones {
    pub day_25: Option<Day>,
    pub day_50: Option<Day>,
    pub day_75: Option<Day>,
}

impl PaceMilestones {
    pub fn from_trace(trace: &[TraceEntry], config: &SeasonConfig) -> Self {
        let reach = |share: f64| {
            let threshold = f64::from(config.total_tiers) * share;
            trace
                .iter()
                .position(|e| f64::from(e.tier) >= threshold)
                .map(|i| i as Day + 1)
        };
        Self {
            day_25: reach(0.25),
            day_50: reach(0.50),
            day_75: reach(0.75),
        }
    }
}

/// Tier earn rate in the first versus second half of active play.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaceShift {
    /// Tiers per week.
    pub first_half_rate: f64,
    pub second_half_rate: f64,
    /// Percent slower in the second half. Negative means faster.
    pub slowdown_pct: i64,
    pub completed: bool,
}

/// Last index worth measuring: the day the cap is first hit, or the
/// final day if it never is. Measuring past the cap would read a
/// finished pass as a slowdown.
fn progression_end(trace: &[TraceEntry], config: &SeasonConfig) -> usize {
    let last = trace.len().saturating_sub(1);
    let capped = trace.last().is_some_and(|e| e.tier >= config.total_tiers);
    if capped {
        trace
            .iter()
            .position(|e| e.tier >= config.total_tiers)
            .unwrap_or(last)
    } else {
        last
    }
}

fn tier_at(trace: &[TraceEntry], i: usize) -> u32 {
    trace.get(i).map_or(0, |e| e.tier)
}

impl PaceShift {
    pub fn from_run(run: &CohortRun, config: &SeasonConfig) -> Self {
        let trace = &run.trace;
        let completed = run.final_entry().is_some_and(|e| e.tier >= config.total_tiers);
        let start = run.persona.start_day as usize;
        let end = progression_end(trace, config);

        if end <= start {
            return Self {
                first_half_rate: 0.0,
                second_half_rate: 0.0,
                slowdown_pct: 0,
                completed,
            };
        }

        let mid = start + (end - start) / 2;
        let rate = |from: usize, to: usize| {
            let weeks = (to - from) as f64 / 7.0;
            if weeks > 0.0 {
                f64::from(tier_at(trace, to).saturating_sub(tier_at(trace, from))) / weeks
            } else {
                0.0
            }
        };
        let first_half_rate = rate(start, mid);
        let second_half_rate = rate(mid, end);
        let slowdown_pct = if first_half_rate > 0.0 {
            ((first_half_rate - second_half_rate) / first_half_rate * 100.0).round() as i64
        } else {
            0
        };

        Self { first_half_rate, second_half_rate, slowdown_pct, completed }
    }
}

/// What skipping one mid-season week costs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissTolerance {
    pub tiers_lost: u32,
    /// Tiers of headroom past the cap, from uncapped XP.
    pub surplus_tiers: u32,
    pub still_completes: bool,
    pub cost_to_recover: f64,
}

impl MissTolerance {
    pub fn from_run(run: &CohortRun, config: &SeasonConfig) -> Self {
        let trace = &run.trace;
        let last = trace.len().saturating_sub(1);
        let start = run.persona.start_day as usize;
        let end = progression_end(trace, config);

        // Sample the week starting 40% into the uncapped span.
        let span = end.saturating_sub(start).max(7) as f64;
        let week_start = (start + (span * 0.4).floor() as usize).min(last);
        let week_end = (week_start + 7).min(last);
        let tiers_lost = tier_at(trace, week_end).saturating_sub(tier_at(trace, week_start));

        let final_xp = run.final_entry().map_or(0.0, |e| e.total_xp);
        let uncapped = (final_xp / config.xp_per_tier).floor() as u32;
        let surplus_tiers = uncapped.saturating_sub(config.total_tiers);
        let still_completes = surplus_tiers >= tiers_lost;

        Self {
            tiers_lost,
            surplus_tiers,
            still_completes,
            cost_to_recover: if still_completes {
                0.0
            } else {
                f64::from(tiers_lost) * config.cost_per_tier
            },
        }
    }
}

// ── Reports ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaReport {
    pub id: PersonaId,
    pub name: String,
    pub outcome: PersonaOutcome,
    pub pace: PaceMilestones,
    pub shift: PaceShift,
    pub miss: MissTolerance,
}

impl PersonaReport {
    pub fn from_run(run: &CohortRun, config: &SeasonConfig) -> Self {
        Self {
            id: run.persona.id.clone(),
            name: run.persona.name.clone(),
            outcome: PersonaOutcome::from_run(run, config),
            pace: PaceMilestones::from_trace(&run.trace, config),
            shift: PaceShift::from_run(run, config),
            miss: MissTolerance::from_run(run, config),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureBand {
    Low,
    Moderate,
    High,
}

impl PressureBand {
    pub fn from_avg_cost(avg_cost: f64) -> Self {
        if avg_cost < 10.0 {
            Self::Low
        } else if avg_cost < 50.0 {
            Self::Moderate
        } else {
            Self::High
        }
    }
}

/// Gap between the fastest and slowest persona to reach half the track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MidpointSpread {
    pub fastest: String,
    pub slowest: String,
    pub gap_days: Day,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonSummary {
    pub persona_count: usize,
    pub completed_count: usize,
    pub avg_completion_pct: u32,
    pub avg_catch_up_cost: f64,
    pub pressure: PressureBand,
    pub midpoint_spread: Option<MidpointSpread>,
}

impl SeasonSummary {
    /// `None` when there is nothing to summarize.
    pub fn from_reports(reports: &[PersonaReport], config: &SeasonConfig) -> Option<Self> {
        if reports.is_empty() {
            return None;
        }
        let n = reports.len() as f64;
        let completed_count = reports
            .iter()
            .filter(|r| r.outcome.completion_pct >= 100)
            .count();
        let avg_completion =
            reports.iter().map(|r| f64::from(r.outcome.completion_pct)).sum::<f64>() / n;
        let avg_short = reports.iter().map(|r| f64::from(r.outcome.tiers_short)).sum::<f64>() / n;
        let avg_catch_up_cost = avg_short * config.cost_per_tier;

        Some(Self {
            persona_count: reports.len(),
            completed_count,
            avg_completion_pct: avg_completion.round() as u32,
            avg_catch_up_cost,
            pressure: PressureBand::from_avg_cost(avg_catch_up_cost),
            midpoint_spread: midpoint_spread(reports),
        })
    }

    pub fn completion_phrase(&self) -> String {
        match self.completed_count {
            c if c == self.persona_count => "All personas complete the pass".to_string(),
            0 => "No persona completes the pass".to_string(),
            c => format!("{c} of {} personas complete", self.persona_count),
        }
    }
}

fn midpoint_spread(reports: &[PersonaReport]) -> Option<MidpointSpread> {
    let mut reached: Vec<(&str, Day)> = reports
        .iter()
        .filter_map(|r| r.pace.day_50.map(|d| (r.name.as_str(), d)))
        .collect();
    if reached.len() < 2 {
        return None;
    }
    reached.sort_by_key(|&(_, day)| day);
    let (fastest, first) = reached[0];
    let (slowest, last) = reached[reached.len() - 1];
    Some(MidpointSpread {
        fastest: fastest.to_string(),
        slowest: slowest.to_string(),
        gap_days: last - first,
    })
}
