//! The season engine: turns (persona, config) into a day-by-day trace.
//!
//! ACCRUAL ORDER on a play day (fixed, documented, never reordered):
//!   1. Passive        minutes_per_session * xp_per_minute
//!   2. Daily quest    flat daily_quest_xp
//!   3. Milestone      milestone_xp / expected play days
//!   4. Weekly         stackable backlog or reset-day payout
//!
//! RULES:
//!   - Days before start_day record tier 0 and 0 XP. No retroactive XP.
//!   - Inputs are never mutated and are assumed pre-validated.
//!   - The trace and the breakdown are two views over one ledger,
//!     so they cannot drift apart.

use crate::{
    config::SeasonConfig,
    persona::Persona,
    schedule::{FixedSchedule, PlaySchedule},
    types::{Day, Xp},
};
use serde::{Deserialize, Serialize};

/// Progress at the end of one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceEntry {
    pub day: Day,
    pub tier: u32,
    pub total_xp: Xp,
}

/// Season experience split by source. `total` is the sum of the rest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpBreakdown {
    pub passive: Xp,
    pub daily_quests: Xp,
    pub weekly_challenges: Xp,
    pub milestones: Xp,
    pub total: Xp,
}

impl XpBreakdown {
    fn record(&mut self, accrual: &DayAccrual) {
        self.passive += accrual.passive;
        self.daily_quests += accrual.daily_quest;
        self.weekly_challenges += accrual.weekly_challenge;
        self.milestones += accrual.milestone;
        self.total += accrual.total();
    }
}

/// Experience earned on a single day, by source.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DayAccrual {
    pub passive: Xp,
    pub daily_quest: Xp,
    pub weekly_challenge: Xp,
    pub milestone: Xp,
}

impl DayAccrual {
    pub fn total(&self) -> Xp {
        self.passive + self.daily_quest + self.milestone + self.weekly_challenge
    }
}

/// Trace plus breakdown from a single pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonRun {
    pub trace: Vec<TraceEntry>,
    pub breakdown: XpBreakdown,
}

/// Number of days the persona is expected to play after joining:
/// `min(active_days, ceil(active_days / 7) * sessions_per_week)`.
pub fn expected_play_days(persona: &Persona, config: &SeasonConfig) -> u32 {
    let active_days = config.total_days.saturating_sub(persona.start_day);
    let active_weeks = active_days.div_ceil(7);
    active_days.min(active_weeks * persona.sessions_per_week)
}

/// Tier reached with `total_xp`, capped at the season's tier count.
pub fn tier_for(total_xp: Xp, config: &SeasonConfig) -> u32 {
    // f64 -> u32 casts saturate, so huge XP totals land on the cap.
    ((total_xp / config.xp_per_tier).floor() as u32).min(config.total_tiers)
}

/// Running state carried from one day to the next.
struct SeasonLedger<'a, S> {
    persona: &'a Persona,
    config: &'a SeasonConfig,
    schedule: S,
    milestone_share: Xp,
    weekly_cleared: u32,
    backlog_minutes: f64,
}

impl<'a, S: PlaySchedule> SeasonLedger<'a, S> {
    fn new(persona: &'a Persona, config: &'a SeasonConfig, schedule: S) -> Self {
        let play_days = expected_play_days(persona, config);
        let milestone_share = if play_days == 0 {
            0.0
        } else {
            config.milestone_xp / f64::from(play_days)
        };
        Self {
            persona,
            config,
            schedule,
            milestone_share,
            weekly_cleared: 0,
            backlog_minutes: 0.0,
        }
    }

    /// Accrue one day. `None` means the persona has not joined yet.
    fn accrue(&mut self, day: Day) -> Option<DayAccrual> {
        if day < self.persona.start_day {
            return None;
        }
        if !self.schedule.plays_on(day, self.persona) {
            return Some(DayAccrual::default());
        }

        let minutes = self.persona.minutes_per_session;
        Some(DayAccrual {
            passive: minutes * self.config.xp_per_minute,
            daily_quest: self.config.daily_quest_xp,
            milestone: self.milestone_share,
            weekly_challenge: self.weekly_payout(day, minutes),
        })
    }

    fn weekly_payout(&mut self, day: Day, minutes: f64) -> Xp {
        let weeks_available = day / 7 + 1;

        if !self.config.is_weekly_stackable {
            // Missing the reset day forfeits the set.
            if day % 7 == 0 && weeks_available > self.weekly_cleared {
                self.weekly_cleared = weeks_available;
                return self.config.weekly_challenge_xp;
            }
            return 0.0;
        }

        self.backlog_minutes += minutes;
        let clearable = (self.backlog_minutes / self.config.challenge_clear_mins).floor() as u32;
        let unpaid = weeks_available.saturating_sub(self.weekly_cleared);

        let mut payout = 0.0;
        for _ in 0..clearable.min(unpaid) {
            payout += self.config.weekly_challenge_xp;
            self.weekly_cleared += 1;
            self.backlog_minutes -= self.config.challenge_clear_mins;
        }
        payout
    }
}

/// Run the full season under an arbitrary play schedule.
pub fn run_season_with<S: PlaySchedule>(
    persona: &Persona,
    config: &SeasonConfig,
    schedule: S,
) -> SeasonRun {
    let mut ledger = SeasonLedger::new(persona, config, schedule);
    let mut trace = Vec::with_capacity(config.total_days as usize);
    let mut breakdown = XpBreakdown::default();
    let mut total_xp: Xp = 0.0;

    for day in 0..config.total_days {
        match ledger.accrue(day) {
            None => trace.push(TraceEntry { day, tier: 0, total_xp: 0.0 }),
            Some(accrual) => {
                total_xp += accrual.total();
                breakdown.record(&accrual);
                trace.push(TraceEntry {
                    day,
                    tier: tier_for(total_xp, config),
                    total_xp,
                });
            }
        }
    }

    log::debug!(
        "persona={} days={} final_xp={:.0} weekly_sets={}",
        persona.name,
        config.total_days,
        total_xp,
        ledger.weekly_cleared
    );

    SeasonRun { trace, breakdown }
}

/// Run the season under the canonical fixed schedule.
pub fn run_season(persona: &Persona, config: &SeasonConfig) -> SeasonRun {
    run_season_with(persona, config, FixedSchedule)
}

/// Day-by-day progression trace, exactly `config.total_days` long.
pub fn simulate(persona: &Persona, config: &SeasonConfig) -> Vec<TraceEntry> {
    run_season(persona, config).trace
}

/// Season experience split by source.
pub fn breakdown(persona: &Persona, config: &SeasonConfig) -> XpBreakdown {
    run_season(persona, config).breakdown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona(sessions: u32, minutes: f64, start_day: Day) -> Persona {
        Persona {
            id: "p".into(),
            name: "test".into(),
            color: "#000000".into(),
            sessions_per_week: sessions,
            minutes_per_session: minutes,
            start_day,
        }
    }

    #[test]
    fn expected_play_days_formula() {
        let config = SeasonConfig { total_days: 85, ..SeasonConfig::default() };
        // 85 active days, 13 weeks rounded up.
        assert_eq!(expected_play_days(&persona(2, 60.0, 0), &config), 26);
        assert_eq!(expected_play_days(&persona(7, 60.0, 0), &config), 85);
        assert_eq!(expected_play_days(&persona(0, 60.0, 0), &config), 0);
        // 65 active days, 10 weeks rounded up.
        assert_eq!(expected_play_days(&persona(6, 60.0, 20), &config), 60);
    }

    #[test]
    fn tier_is_capped() {
        let config = SeasonConfig { total_tiers: 3, xp_per_tier: 10.0, ..SeasonConfig::default() };
        assert_eq!(tier_for(29.9, &config), 2);
        assert_eq!(tier_for(30.0, &config), 3);
        assert_eq!(tier_for(1e300, &config), 3);
    }

    #[test]
    fn stackable_backlog_pays_multiple_sets_once_unlocked() {
        // Join on day 14: three weeks are unlocked. Each session is worth
        // exactly one clear, so one set is paid per play day until caught up.
        let config = SeasonConfig {
            total_days: 21,
            xp_per_minute: 0.0,
            daily_quest_xp: 0.0,
            milestone_xp: 0.0,
            weekly_challenge_xp: 100.0,
            challenge_clear_mins: 60.0,
            is_weekly_stackable: true,
            ..SeasonConfig::default()
        };
        let run = run_season(&persona(7, 60.0, 14), &config);
        let xp: Vec<Xp> = run.trace.iter().map(|e| e.total_xp).collect();
        assert_eq!(xp[14], 100.0);
        assert_eq!(xp[15], 200.0);
        assert_eq!(xp[16], 300.0);
        assert_eq!(xp[20], 300.0, "never pays more sets than have unlocked");
    }

    #[test]
    fn long_session_clears_whole_backlog_at_once() {
        let config = SeasonConfig {
            total_days: 21,
            xp_per_minute: 0.0,
            daily_quest_xp: 0.0,
            milestone_xp: 0.0,
            weekly_challenge_xp: 100.0,
            challenge_clear_mins: 10.0,
            is_weekly_stackable: true,
            ..SeasonConfig::default()
        };
        let run = run_season(&persona(1, 240.0, 14), &config);
        assert_eq!(run.trace[14].total_xp, 300.0);
        assert_eq!(run.breakdown.weekly_challenges, 300.0);
    }

    #[test]
    fn non_stackable_forfeits_missed_reset_day() {
        let config = SeasonConfig {
            total_days: 21,
            xp_per_minute: 0.0,
            daily_quest_xp: 0.0,
            milestone_xp: 0.0,
            weekly_challenge_xp: 100.0,
            is_weekly_stackable: false,
            ..SeasonConfig::default()
        };
        // Joins on day 1, so the first reset day (0) is missed.
        let run = run_season(&persona(7, 30.0, 1), &config);
        assert_eq!(run.trace[6].total_xp, 0.0);
        assert_eq!(run.trace[7].total_xp, 100.0);
        assert_eq!(run.trace[20].total_xp, 200.0);
    }

    #[test]
    fn breakdown_attributes_each_source() {
        let config = SeasonConfig {
            total_days: 14,
            xp_per_minute: 10.0,
            daily_quest_xp: 5.0,
            weekly_challenge_xp: 1000.0,
            is_weekly_stackable: false,
            milestone_xp: 140.0,
            ..SeasonConfig::default()
        };
        let b = breakdown(&persona(7, 6.0, 0), &config);
        assert_eq!(b.passive, 14.0 * 60.0);
        assert_eq!(b.daily_quests, 14.0 * 5.0);
        assert_eq!(b.weekly_challenges, 2000.0);
        assert!((b.milestones - 140.0).abs() < 1e-9);
        assert!((b.total - (b.passive + b.daily_quests + b.weekly_challenges + b.milestones)).abs() < 1e-9);
    }
}
