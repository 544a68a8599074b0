//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! Workspaces are stored as snapshot documents and re-validated through
//! the snapshot importer on load, so a hand-edited row cannot smuggle
//! invalid state past the interchange rules.

use crate::{
    error::{SimError, SimResult},
    snapshot::import_json,
    workspace::Workspace,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

pub struct WorkspaceStore {
    conn: Connection,
}

/// Listing entry for a saved workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedWorkspace {
    pub name: String,
    pub persona_count: usize,
    pub saved_at: DateTime<Utc>,
}

impl WorkspaceStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only for real files; in-memory databases ignore it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_workspace.sql"))?;
        Ok(())
    }

    /// Insert or overwrite the workspace saved under `name`.
    pub fn save_workspace(&self, name: &str, workspace: &Workspace) -> SimResult<()> {
        let json = workspace.export_json()?;
        let saved_at = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO saved_workspace (name, state_json, persona_count, saved_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(name) DO UPDATE SET
                state_json = excluded.state_json,
                persona_count = excluded.persona_count,
                saved_at = excluded.saved_at",
            params![name, json, workspace.personas().len() as i64, saved_at],
        )?;
        log::info!("Saved workspace '{name}'");
        Ok(())
    }

    pub fn load_workspace(&self, name: &str) -> SimResult<Workspace> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT state_json FROM saved_workspace WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        let json = json.ok_or_else(|| SimError::WorkspaceNotFound { name: name.to_string() })?;

        let mut workspace = Workspace::new();
        workspace.replace_with(import_json(&json)?);
        log::debug!("Loaded workspace '{name}'");
        Ok(workspace)
    }

    /// Saved workspaces, most recent first.
    pub fn list_workspaces(&self) -> SimResult<Vec<SavedWorkspace>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, persona_count, saved_at FROM saved_workspace
             ORDER BY saved_at DESC, name ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(name, count, saved_at)| -> SimResult<SavedWorkspace> {
                let saved_at = DateTime::parse_from_rfc3339(&saved_at)
                    .map_err(|e| anyhow::anyhow!("Bad timestamp for '{name}': {e}"))?
                    .with_timezone(&Utc);
                Ok(SavedWorkspace {
                    name,
                    persona_count: count as usize,
                    saved_at,
                })
            })
            .collect()
    }

    /// Returns whether a row was deleted.
    pub fn delete_workspace(&self, name: &str) -> SimResult<bool> {
        let n = self
            .conn
            .execute("DELETE FROM saved_workspace WHERE name = ?1", params![name])?;
        Ok(n > 0)
    }
}
