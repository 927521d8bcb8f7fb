//! Personality assessment scoring: response validation, trait aggregation, typology
//! classification, administrator overrides, and the bulk recalculation protocol.

pub mod config;
pub mod error;
pub mod overrides;
pub mod recalculation;
pub mod scoring;
pub mod telemetry;

pub use overrides::ScoringOverrides;
pub use scoring::{PersonalityProfile, ScoringEngine};
