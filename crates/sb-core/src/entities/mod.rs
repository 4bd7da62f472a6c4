//! Entity structs for all skillbench domain objects.
//!
//! Each entity maps to a table in the libSQL schema (`sb-db/migrations`).
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` for JSON
//! roundtrip and schema validation.

mod assessment;
mod cohort;
mod learning;
mod org;
mod profile;
mod sync_log;
mod template;

pub use assessment::{Assessment, AssessmentSkillScore};
pub use cohort::{Cohort, CohortMember};
pub use learning::{LearningPath, LearningPathRule};
pub use org::{CorpMembership, Corporation, OrgMembership, Organization};
pub use profile::{Profile, UserDimensions, UserSettings};
pub use sync_log::SyncLogEntry;
pub use template::{Question, ResponseOption, SkillGroup, Template};
