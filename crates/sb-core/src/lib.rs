//! # sb-core
//!
//! Core types and pure aggregation logic for skillbench.
//!
//! This crate has no I/O. It provides:
//! - Entity structs for every stored object (profiles, assessments, templates, cohorts, ...)
//! - Status and role enums with state machine transitions
//! - ID prefix constants
//! - Cross-cutting error types
//! - The scoring pipeline: per-question points → per-skill-group and per-template totals
//! - Benchmark statistics (mean, percentile bands) and the filter set that scopes them
//! - Learning path rule matching and assessment time estimates

pub mod benchmark;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod ids;
pub mod overview;
pub mod recommend;
pub mod scoring;
