//! The explicit state object a front end holds: one season config and
//! the personas being compared.
//!
//! RULE: every mutation either fully applies or leaves the workspace
//! untouched. Imports are validated before anything is replaced.
//! RULE: every reachable state exports to a snapshot the importer
//! accepts. There is always at least one persona, and each one is
//! valid for the current config.

use crate::{
    cohort::{compare, CohortRun},
    config::{preset, ConfigPatch, SeasonConfig},
    error::{SimError, SimResult},
    persona::{persona_templates, Persona, PersonaPatch, PersonaTemplate, COLOR_PALETTE, MAX_PERSONAS},
    snapshot::{import_json, ImportedWorkspace, Snapshot},
    summary::{PersonaReport, SeasonSummary},
    types::PersonaId,
};

pub const INITIAL_PERSONA_ID: &str = "initial-player";

#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    config: SeasonConfig,
    personas: Vec<Persona>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// Default season with a single starting persona.
    pub fn new() -> Self {
        let first = &persona_templates()[0];
        Self {
            config: SeasonConfig::default(),
            personas: vec![Persona::with_id(INITIAL_PERSONA_ID.to_string(), first)],
        }
    }

    pub fn config(&self) -> &SeasonConfig {
        &self.config
    }

    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    pub fn persona(&self, id: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.id == id)
    }

    // ── Personas ───────────────────────────────────────────────

    pub fn add_persona(&mut self, template: &PersonaTemplate) -> SimResult<&Persona> {
        if self.personas.len() >= MAX_PERSONAS {
            return Err(SimError::PersonaLimit { max: MAX_PERSONAS });
        }
        let persona = Persona::from_template(template);
        persona.validate(&self.config)?;
        log::info!("Added persona '{}' ({})", persona.name, persona.id);
        self.personas.push(persona);
        Ok(&self.personas[self.personas.len() - 1])
    }

    /// Add the first built-in template not already in use. When every
    /// template is taken, reuse the first one under a fresh colour.
    pub fn add_next_template(&mut self) -> SimResult<&Persona> {
        let templates = persona_templates();
        let unused = templates
            .iter()
            .find(|t| !self.personas.iter().any(|p| p.name == t.name))
            .cloned();
        let template = match unused {
            Some(t) => t,
            None => {
                let mut t = templates[0].clone();
                t.color = COLOR_PALETTE[self.personas.len() % COLOR_PALETTE.len()].to_string();
                t
            }
        };
        self.add_persona(&template)
    }

    pub fn remove_persona(&mut self, id: &str) -> SimResult<Persona> {
        let index = self.index_of(id)?;
        if self.personas.len() == 1 {
            return Err(SimError::LastPersona { id: PersonaId::from(id) });
        }
        let removed = self.personas.remove(index);
        log::info!("Removed persona '{}' ({})", removed.name, removed.id);
        Ok(removed)
    }

    pub fn update_persona(&mut self, id: &str, patch: &PersonaPatch) -> SimResult<&Persona> {
        let index = self.index_of(id)?;
        let mut next = self.personas[index].clone();
        next.apply(patch);
        next.validate(&self.config)?;
        self.personas[index] = next;
        Ok(&self.personas[index])
    }

    fn index_of(&self, id: &str) -> SimResult<usize> {
        self.personas
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| SimError::PersonaNotFound { id: PersonaId::from(id) })
    }

    // ── Config ─────────────────────────────────────────────────

    /// Apply a partial config update. A shorter season pulls late
    /// joiners' start days back inside it.
    pub fn update_config(&mut self, patch: &ConfigPatch) -> SimResult<()> {
        self.set_config(self.config.patched(patch))
    }

    pub fn set_config(&mut self, config: SeasonConfig) -> SimResult<()> {
        config.validate()?;
        self.replace_config(config);
        Ok(())
    }

    pub fn apply_preset(&mut self, key: &str) -> SimResult<()> {
        let preset = preset(key)?;
        log::info!("Applying preset '{}'", preset.key);
        self.replace_config(preset.config);
        Ok(())
    }

    fn replace_config(&mut self, config: SeasonConfig) {
        let last_day = config.total_days.saturating_sub(1);
        for persona in &mut self.personas {
            if persona.start_day > last_day {
                log::debug!(
                    "Clamping start day of '{}' from {} to {last_day}",
                    persona.name,
                    persona.start_day
                );
                persona.start_day = last_day;
            }
        }
        self.config = config;
    }

    // ── Interchange ────────────────────────────────────────────

    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.config, &self.personas)
    }

    pub fn export_json(&self) -> SimResult<String> {
        self.to_snapshot().to_json()
    }

    /// Replace config and personas from a snapshot document. On any
    /// validation failure the workspace is left exactly as it was.
    pub fn import_json(&mut self, text: &str) -> SimResult<()> {
        let imported = import_json(text)?;
        self.replace_with(imported);
        Ok(())
    }

    /// Only ever handed the output of the snapshot importer.
    pub(crate) fn replace_with(&mut self, imported: ImportedWorkspace) {
        self.config = imported.config;
        self.personas = imported.personas;
        log::info!("Workspace replaced: {} personas", self.personas.len());
    }

    // ── Simulation ─────────────────────────────────────────────

    pub fn simulate_all(&self) -> Vec<CohortRun> {
        compare(&self.config, &self.personas)
    }

    pub fn reports(&self) -> Vec<PersonaReport> {
        self.simulate_all()
            .iter()
            .map(|run| PersonaReport::from_run(run, &self.config))
            .collect()
    }

    pub fn summary(&self) -> Option<SeasonSummary> {
        SeasonSummary::from_reports(&self.reports(), &self.config)
    }
}
