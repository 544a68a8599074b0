//! Cohort comparison: the engine fanned out over a handful of personas.
//!
//! Personas never influence one another. Each run reads only its own
//! persona and the shared, immutable config.

use crate::{
    config::SeasonConfig,
    engine::{run_season, TraceEntry, XpBreakdown},
    persona::Persona,
    types::{Day, PersonaId},
};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortRun {
    pub persona: Persona,
    pub trace: Vec<TraceEntry>,
    pub breakdown: XpBreakdown,
}

impl CohortRun {
    pub fn final_entry(&self) -> Option<&TraceEntry> {
        self.trace.last()
    }
}

/// Simulate every persona against the same season.
pub fn compare(config: &SeasonConfig, personas: &[Persona]) -> Vec<CohortRun> {
    personas
        .iter()
        .map(|persona| {
            let run = run_season(persona, config);
            CohortRun {
                persona: persona.clone(),
                trace: run.trace,
                breakdown: run.breakdown,
            }
        })
        .collect()
}

/// One chart row: every persona's tier on a given (1-based) day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierRow {
    pub day: Day,
    pub tiers: BTreeMap<PersonaId, u32>,
}

/// Pivot cohort traces into per-day rows keyed by persona id.
pub fn tier_rows(runs: &[CohortRun], total_days: u32) -> Vec<TierRow> {
    (0..total_days)
        .map(|day| TierRow {
            day: day + 1,
            tiers: runs
                .iter()
                .map(|r| {
                    let tier = r.trace.get(day as usize).map_or(0, |e| e.tier);
                    (r.persona.id.clone(), tier)
                })
                .collect(),
        })
        .collect()
}
