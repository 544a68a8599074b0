//! Shared primitive types used across the entire simulation.

/// A zero-indexed day within a season.
pub type Day = u32;

/// A stable, unique identifier for a persona. Never part of the
/// interchange payload.
pub type PersonaId = String;

/// Experience points. Fractional because the milestone pool is spread
/// evenly across play days.
pub type Xp = f64;
