//! Seeded stochastic play-day modelling.
//!
//! Layered on top of the engine: each play day is a Bernoulli draw
//! weighted by `sessions_per_week / 7` instead of the fixed schedule.
//! Every run is seeded, so results are still reproducible.

use crate::{
    config::SeasonConfig,
    engine::{run_season_with, SeasonRun},
    error::{SimError, SimResult},
    persona::Persona,
    rng::SeasonRng,
    schedule::RandomSchedule,
    types::{Day, Xp},
};
use serde::{Deserialize, Serialize};

/// Mean progress on one day across several stochastic runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AveragedEntry {
    pub day: Day,
    pub mean_tier: f64,
    pub mean_total_xp: Xp,
}

/// One stochastic season. Stream 0 of `seed`.
pub fn simulate_stochastic(persona: &Persona, config: &SeasonConfig, seed: u64) -> SeasonRun {
    stochastic_run(persona, config, seed, 0)
}

fn stochastic_run(persona: &Persona, config: &SeasonConfig, seed: u64, stream: u64) -> SeasonRun {
    let schedule = RandomSchedule::new(SeasonRng::new(seed, stream));
    run_season_with(persona, config, schedule)
}

/// Average `runs` independent stochastic seasons day by day.
/// Run `i` uses stream `i` of `seed`.
pub fn averaged_trace(
    persona: &Persona,
    config: &SeasonConfig,
    seed: u64,
    runs: u32,
) -> SimResult<Vec<AveragedEntry>> {
    if runs == 0 {
        return Err(SimError::InvalidValue {
            field: "runs",
            reason: "at least one run is required".into(),
        });
    }

    let days = config.total_days as usize;
    let mut tier_sums = vec![0.0; days];
    let mut xp_sums = vec![0.0; days];

    for stream in 0..u64::from(runs) {
        let run = stochastic_run(persona, config, seed, stream);
        for (i, entry) in run.trace.iter().enumerate() {
            tier_sums[i] += f64::from(entry.tier);
            xp_sums[i] += entry.total_xp;
        }
    }

    let n = f64::from(runs);
    log::debug!("persona={} averaged {runs} stochastic runs", persona.name);

    Ok((0..config.total_days)
        .zip(tier_sums.iter().zip(&xp_sums))
        .map(|(day, (tier, xp))| AveragedEntry {
            day,
            mean_tier: tier / n,
            mean_total_xp: xp / n,
        })
        .collect())
}
