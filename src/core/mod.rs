//! Core business logic for the order pipeline.
//!
//! Everything in here is framework-agnostic: the cleaning, aggregation, and
//! allocation steps are pure functions over snapshots handed in by the caller,
//! and the database-touching helpers live beside the domain logic they serve
//! so each module owns one stage of the pipeline end to end.

/// Backstock allocation and inventory operations
pub mod backstock;
/// Row parsing and order normalization
pub mod clean;
/// Meal aggregation and weight formatting
pub mod meals;
/// Reference-data snapshot loading
pub mod reference;
/// Order report assembly and persistence
pub mod report;
