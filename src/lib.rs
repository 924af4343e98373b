//! Occupancy aggregation engine for building sensors.
//!
//! Answers "what fraction of working time was each sensor, and each
//! section of sensors, occupied?" over an arbitrary historical window.
//! Readings come from an external, append-only store; the engine cuts
//! business hours into 30-minute intervals and counts the intervals in
//! which at least one occupied reading was seen.
//!
//! This crate follows the Explicit Module Boundary Pattern (EMBP): sibling
//! modules talk to each other through the re-exports below, so refactoring
//! one module does not ripple through the import lists of the others.

pub mod calendar;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod routes;
pub mod schema;
pub mod sections;
pub mod store;

pub use calendar::{business_intervals, business_intervals_for_day, Interval, PeriodSelector};
pub use config::Config;
pub use engine::{EngineSettings, EvaluationStrategy, OccupancyEngine};
pub use error::{EngineError, SectionConfigError, StoreError};
pub use models::{
    OccupancyStats, PeriodStats, Reading, ReadingKind, SectionOccupancyResult, SensorOccupancy,
};
pub use sections::{Section, SectionRegistry, SectionSensor};
pub use store::{MemoryReadingStore, PgReadingStore, ReadingStore};
