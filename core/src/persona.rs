//! Player personas: behavioural archetypes simulated independently.

use crate::config::SeasonConfig;
use crate::error::{SimError, SimResult};
use crate::types::{Day, PersonaId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound on personas compared side by side.
pub const MAX_PERSONAS: usize = 4;

pub const COLOR_PALETTE: [&str; 5] = ["#818cf8", "#fbbf24", "#34d399", "#f472b6", "#22d3ee"];

/// One simulated player archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: PersonaId,
    pub name: String,
    /// Display only.
    pub color: String,
    /// Play days per 7-day cycle, 0..=7.
    pub sessions_per_week: u32,
    pub minutes_per_session: f64,
    /// Zero-indexed join day.
    pub start_day: Day,
}

/// A persona without identity. This is the shape stored in snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaTemplate {
    pub name: String,
    pub color: String,
    pub sessions_per_week: u32,
    pub minutes_per_session: f64,
    pub start_day: Day,
}

/// Partial update to a persona. Identity is never patchable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub sessions_per_week: Option<u32>,
    pub minutes_per_session: Option<f64>,
    pub start_day: Option<Day>,
}

impl Persona {
    /// Instantiate a template under a freshly generated identity.
    pub fn from_template(template: &PersonaTemplate) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), template)
    }

    pub fn with_id(id: PersonaId, template: &PersonaTemplate) -> Self {
        Self {
            id,
            name: template.name.clone(),
            color: template.color.clone(),
            sessions_per_week: template.sessions_per_week,
            minutes_per_session: template.minutes_per_session,
            start_day: template.start_day,
        }
    }

    /// Strip identity for interchange.
    pub fn template(&self) -> PersonaTemplate {
        PersonaTemplate {
            name: self.name.clone(),
            color: self.color.clone(),
            sessions_per_week: self.sessions_per_week,
            minutes_per_session: self.minutes_per_session,
            start_day: self.start_day,
        }
    }

    pub fn apply(&mut self, patch: &PersonaPatch) {
        if let Some(v) = &patch.name                { self.name = v.clone(); }
        if let Some(v) = &patch.color               { self.color = v.clone(); }
        if let Some(v) = patch.sessions_per_week    { self.sessions_per_week = v; }
        if let Some(v) = patch.minutes_per_session  { self.minutes_per_session = v; }
        if let Some(v) = patch.start_day            { self.start_day = v; }
    }

    /// Check the persona against its own domain and the season it joins.
    pub fn validate(&self, config: &SeasonConfig) -> SimResult<()> {
        if self.sessions_per_week > 7 {
            return Err(SimError::InvalidValue {
                field: "sessionsPerWeek",
                reason: format!("{} exceeds 7", self.sessions_per_week),
            });
        }
        if !(self.minutes_per_session.is_finite() && self.minutes_per_session > 0.0) {
            return Err(SimError::InvalidValue {
                field: "minutesPerSession",
                reason: format!("{} must be a finite number > 0", self.minutes_per_session),
            });
        }
        if self.start_day >= config.total_days {
            return Err(SimError::InvalidValue {
                field: "startDay",
                reason: format!(
                    "{} is not before the season end (day {})",
                    self.start_day, config.total_days
                ),
            });
        }
        Ok(())
    }
}

fn template(name: &str, color: &str, sessions: u32, minutes: f64, start_day: Day) -> PersonaTemplate {
    PersonaTemplate {
        name: name.to_string(),
        color: color.to_string(),
        sessions_per_week: sessions,
        minutes_per_session: minutes,
        start_day,
    }
}

/// Built-in archetypes offered when adding a persona.
pub fn persona_templates() -> Vec<PersonaTemplate> {
    vec![
        template("The Weekend Warrior", COLOR_PALETTE[0], 2, 180.0, 0),
        template("The Daily Grinder",   COLOR_PALETTE[1], 7, 45.0,  0),
        template("The Casual Pro",      COLOR_PALETTE[2], 5, 120.0, 0),
        template("The Completionist",   COLOR_PALETTE[3], 7, 240.0, 0),
        template("The Late Starter",    COLOR_PALETTE[4], 6, 90.0,  20),
    ]
}
