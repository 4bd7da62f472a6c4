//! Repository modules implementing storage operations for all skillbench entities.
//!
//! Each module adds methods to `SkillService` via `impl SkillService` blocks.

pub mod assessment;
pub mod benchmark;
pub mod cohort;
pub mod learning;
pub mod lookups;
pub mod org;
pub mod profile;
pub mod settings;
pub mod sync_log;
pub mod template;
