//! Season pass progression simulator.
//!
//! Given a player persona and a season's economy, the engine produces a
//! day-by-day trace of experience and unlocked tier, plus a breakdown of
//! where that experience came from. Everything else in this crate is
//! plumbing around that engine: cohort comparison, summaries, snapshot
//! interchange and persistence.

pub mod cohort;
pub mod config;
pub mod engine;
pub mod error;
pub mod persona;
pub mod rng;
pub mod schedule;
pub mod snapshot;
pub mod stochastic;
pub mod store;
pub mod summary;
pub mod types;
pub mod workspace;
