//! Play-day schedules.
//!
//! The accrual loop asks a `PlaySchedule` whether the persona plays on a
//! given day. Only days on or after the persona's start day are asked,
//! in increasing order, exactly once each.

use crate::persona::Persona;
use crate::rng::SeasonRng;
use crate::types::Day;

pub trait PlaySchedule {
    fn plays_on(&mut self, day: Day, persona: &Persona) -> bool;
}

/// The canonical rule: the first `sessions_per_week` days of every
/// 7-day cycle are play days.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSchedule;

impl PlaySchedule for FixedSchedule {
    fn plays_on(&mut self, day: Day, persona: &Persona) -> bool {
        is_play_day(day, persona)
    }
}

/// Each day is an independent draw with probability `sessions_per_week / 7`.
pub struct RandomSchedule {
    rng: SeasonRng,
}

impl RandomSchedule {
    pub fn new(rng: SeasonRng) -> Self {
        Self { rng }
    }
}

impl PlaySchedule for RandomSchedule {
    fn plays_on(&mut self, _day: Day, persona: &Persona) -> bool {
        let p = f64::from(persona.sessions_per_week.min(7)) / 7.0;
        self.rng.chance(p)
    }
}

pub fn is_play_day(day: Day, persona: &Persona) -> bool {
    day % 7 < persona.sessions_per_week
}
