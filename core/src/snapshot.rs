//! Snapshot interchange: configuration + personas to/from JSON.
//!
//! Import is checked against a declarative schema before anything is
//! built. The whole document is checked once and every issue is
//! collected in document order; callers surface the first one.
//! Identities never travel in a snapshot. Every imported persona gets
//! a freshly generated id.

use crate::{
    config::{SeasonConfig, MAX_SEASON_DAYS, MIN_SEASON_DAYS},
    error::SimResult,
    persona::{Persona, PersonaTemplate, MAX_PERSONAS},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

pub const SNAPSHOT_VERSION: u64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u64,
    pub config: SeasonConfig,
    pub personas: Vec<PersonaTemplate>,
}

impl Snapshot {
    pub fn capture(config: &SeasonConfig, personas: &[Persona]) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            config: config.clone(),
            personas: personas.iter().map(Persona::template).collect(),
        }
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Serialize the current configuration and personas for export.
pub fn export_json(config: &SeasonConfig, personas: &[Persona]) -> SimResult<String> {
    Snapshot::capture(config, personas).to_json()
}

/// A fully validated import, ready to replace the current state.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedWorkspace {
    pub config: SeasonConfig,
    pub personas: Vec<Persona>,
}

/// Parse and validate a snapshot document.
pub fn import_json(text: &str) -> Result<ImportedWorkspace, SnapshotError> {
    let value: Value = serde_json::from_str(text)?;
    import_value(&value)
}

pub fn import_value(value: &Value) -> Result<ImportedWorkspace, SnapshotError> {
    let report = validate(value);
    if !report.is_valid() {
        log::warn!("Snapshot rejected: {}", report.summary());
        return Err(SnapshotError::Invalid(report));
    }

    // Validation guarantees every lookup below succeeds.
    let config_obj = value.get("config").and_then(Value::as_object).ok_or(SnapshotError::Malformed)?;
    let config = build_config(config_obj)?;

    let entries = value.get("personas").and_then(Value::as_array).ok_or(SnapshotError::Malformed)?;
    if entries.len() > MAX_PERSONAS {
        log::warn!(
            "Snapshot lists {} personas; keeping the first {MAX_PERSONAS}",
            entries.len()
        );
    }
    let personas = entries
        .iter()
        .take(MAX_PERSONAS)
        .map(|entry| {
            let obj = entry.as_object().ok_or(SnapshotError::Malformed)?;
            Ok(Persona::from_template(&build_persona(obj)?))
        })
        .collect::<Result<Vec<_>, SnapshotError>>()?;

    log::info!("Imported snapshot with {} personas", personas.len());
    Ok(ImportedWorkspace { config, personas })
}

// ── Errors ─────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{}", .0.summary())]
    Invalid(ValidationReport),

    #[error("snapshot shape changed after validation")]
    Malformed,
}

impl SnapshotError {
    /// The first concrete problem, when the failure came from validation.
    pub fn first_issue(&self) -> Option<&ValidationIssue> {
        match self {
            Self::Invalid(report) => report.issues.first(),
            _ => None,
        }
    }
}

/// Where in the document an issue was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Config,
    Persona(usize),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Config => write!(f, "config"),
            Scope::Persona(i) => write!(f, "persona #{}", i + 1),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    #[error("snapshot must be a JSON object")]
    RootNotObject,

    #[error("unsupported snapshot version {found}")]
    UnsupportedVersion { found: String },

    #[error("missing \"config\" section")]
    MissingConfig,

    #[error("\"config\" must be an object")]
    ConfigNotObject,

    #[error("\"personas\" must be a non-empty list")]
    PersonasNotList,

    #[error("{scope} must be an object")]
    EntryNotObject { scope: Scope },

    #[error("missing {scope} field \"{field}\"")]
    MissingField { scope: Scope, field: &'static str },

    #[error("{scope} field \"{field}\" must be {expected}")]
    WrongType { scope: Scope, field: &'static str, expected: &'static str },

    #[error("{scope} field \"{field}\" out of range: {detail}")]
    OutOfRange { scope: Scope, field: &'static str, detail: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn summary(&self) -> String {
        match self.issues.as_slice() {
            [] => "valid".to_string(),
            [only] => only.to_string(),
            [first, rest @ ..] => format!("{first} (and {} more issues)", rest.len()),
        }
    }
}

// ── Schema ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Kind {
    /// Whole number within `min..=max`.
    Integer { min: f64, max: f64 },
    /// Finite number above `min` (strictly, when `exclusive`).
    Number { min: f64, exclusive: bool },
    Boolean,
    Text,
}

struct FieldRule {
    key: &'static str,
    kind: Kind,
}

const fn rule(key: &'static str, kind: Kind) -> FieldRule {
    FieldRule { key, kind }
}

const AT_LEAST_ZERO: Kind = Kind::Number { min: 0.0, exclusive: false };
const ABOVE_ZERO: Kind = Kind::Number { min: 0.0, exclusive: true };

const CONFIG_SCHEMA: &[FieldRule] = &[
    rule("totalDays", Kind::Integer { min: MIN_SEASON_DAYS as f64, max: MAX_SEASON_DAYS as f64 }),
    rule("totalTiers", Kind::Integer { min: 1.0, max: u32::MAX as f64 }),
    rule("xpPerTier", ABOVE_ZERO),
    rule("xpPerMinute", AT_LEAST_ZERO),
    rule("dailyQuestXp", AT_LEAST_ZERO),
    rule("weeklyChallengeXp", AT_LEAST_ZERO),
    rule("isWeeklyStackable", Kind::Boolean),
    rule("milestoneXp", AT_LEAST_ZERO),
    rule("challengeClearMins", ABOVE_ZERO),
    rule("costPerTier", AT_LEAST_ZERO),
];

const PERSONA_SCHEMA: &[FieldRule] = &[
    rule("name", Kind::Text),
    rule("color", Kind::Text),
    rule("sessionsPerWeek", Kind::Integer { min: 0.0, max: 7.0 }),
    rule("minutesPerSession", ABOVE_ZERO),
    rule("startDay", Kind::Integer { min: 0.0, max: u32::MAX as f64 }),
];

/// Check a snapshot document against the schema.
pub fn validate(value: &Value) -> ValidationReport {
    let mut issues = Vec::new();

    let Some(root) = value.as_object() else {
        issues.push(ValidationIssue::RootNotObject);
        return ValidationReport { issues };
    };

    if let Some(version) = root.get("version") {
        let whole = version.as_f64().filter(|n| n.fract() == 0.0);
        if whole != Some(SNAPSHOT_VERSION as f64) {
            issues.push(ValidationIssue::UnsupportedVersion { found: version.to_string() });
        }
    }

    let mut total_days = None;
    match root.get("config") {
        None => issues.push(ValidationIssue::MissingConfig),
        Some(Value::Object(config)) => {
            let before = issues.len();
            check_fields(config, CONFIG_SCHEMA, Scope::Config, &mut issues);
            if issues.len() == before {
                total_days = config.get("totalDays").and_then(Value::as_f64);
            }
        }
        Some(_) => issues.push(ValidationIssue::ConfigNotObject),
    }

    match root.get("personas").and_then(Value::as_array) {
        Some(list) if !list.is_empty() => {
            for (i, entry) in list.iter().enumerate() {
                let scope = Scope::Persona(i);
                let Some(obj) = entry.as_object() else {
                    issues.push(ValidationIssue::EntryNotObject { scope });
                    continue;
                };
                let before = issues.len();
                check_fields(obj, PERSONA_SCHEMA, scope, &mut issues);
                if issues.len() == before {
                    check_start_day(obj, total_days, scope, &mut issues);
                }
            }
        }
        _ => issues.push(ValidationIssue::PersonasNotList),
    }

    ValidationReport { issues }
}

fn check_fields(
    obj: &Map<String, Value>,
    schema: &[FieldRule],
    scope: Scope,
    issues: &mut Vec<ValidationIssue>,
) {
    for rule in schema {
        let field = rule.key;
        let Some(value) = obj.get(field) else {
            issues.push(ValidationIssue::MissingField { scope, field });
            continue;
        };
        if let Some(issue) = check_kind(value, rule.kind, scope, field) {
            issues.push(issue);
        }
    }
}

fn check_kind(value: &Value, kind: Kind, scope: Scope, field: &'static str) -> Option<ValidationIssue> {
    let wrong_type = |expected| Some(ValidationIssue::WrongType { scope, field, expected });
    match kind {
        Kind::Boolean if !value.is_boolean() => wrong_type("a boolean"),
        Kind::Text if !value.is_string() => wrong_type("a string"),
        Kind::Boolean | Kind::Text => None,
        Kind::Integer { min, max } => {
            let Some(n) = value.as_f64().filter(|n| n.fract() == 0.0) else {
                return wrong_type("a whole number");
            };
            (n < min || n > max).then(|| ValidationIssue::OutOfRange {
                scope,
                field,
                detail: format!("{n} not in {min}..={max}"),
            })
        }
        Kind::Number { min, exclusive } => {
            let Some(n) = value.as_f64() else {
                return wrong_type("a number");
            };
            let below = if exclusive { n <= min } else { n < min };
            below.then(|| ValidationIssue::OutOfRange {
                scope,
                field,
                detail: if exclusive {
                    format!("{n} must be greater than {min}")
                } else {
                    format!("{n} must be at least {min}")
                },
            })
        }
    }
}

fn check_start_day(
    obj: &Map<String, Value>,
    total_days: Option<f64>,
    scope: Scope,
    issues: &mut Vec<ValidationIssue>,
) {
    let (Some(total_days), Some(start)) = (total_days, obj.get("startDay").and_then(Value::as_f64)) else {
        return;
    };
    if start >= total_days {
        issues.push(ValidationIssue::OutOfRange {
            scope,
            field: "startDay",
            detail: format!("{start} is not before season end {total_days}"),
        });
    }
}

// ── Builders (run only on validated documents) ─────────────────────

fn number(obj: &Map<String, Value>, key: &str) -> Result<f64, SnapshotError> {
    obj.get(key).and_then(Value::as_f64).ok_or(SnapshotError::Malformed)
}

fn whole(obj: &Map<String, Value>, key: &str) -> Result<u32, SnapshotError> {
    number(obj, key).map(|n| n as u32)
}

fn text(obj: &Map<String, Value>, key: &str) -> Result<String, SnapshotError> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(SnapshotError::Malformed)
}

fn build_config(obj: &Map<String, Value>) -> Result<SeasonConfig, SnapshotError> {
    Ok(SeasonConfig {
        total_days:           whole(obj, "totalDays")?,
        total_tiers:          whole(obj, "totalTiers")?,
        xp_per_tier:          number(obj, "xpPerTier")?,
        xp_per_minute:        number(obj, "xpPerMinute")?,
        daily_quest_xp:       number(obj, "dailyQuestXp")?,
        weekly_challenge_xp:  number(obj, "weeklyChallengeXp")?,
        is_weekly_stackable:  obj
            .get("isWeeklyStackable")
            .and_then(Value::as_bool)
            .ok_or(SnapshotError::Malformed)?,
        milestone_xp:         number(obj, "milestoneXp")?,
        challenge_clear_mins: number(obj, "challengeClearMins")?,
        cost_per_tier:        number(obj, "costPerTier")?,
    })
}

fn build_persona(obj: &Map<String, Value>) -> Result<PersonaTemplate, SnapshotError> {
    Ok(PersonaTemplate {
        name:                text(obj, "name")?,
        color:               text(obj, "color")?,
        sessions_per_week:   whole(obj, "sessionsPerWeek")?,
        minutes_per_session: number(obj, "minutesPerSession")?,
        start_day:           whole(obj, "startDay")?,
    })
}
