//! ID prefixes for generated entity identifiers.
//!
//! IDs look like `asm-3fa81c0e`: a three-letter prefix, a dash, and eight hex
//! characters produced by the database (`randomblob(4)`).

pub const PREFIX_PROFILE: &str = "prf";
pub const PREFIX_ASSESSMENT: &str = "asm";
pub const PREFIX_TEMPLATE: &str = "tpl";
pub const PREFIX_SKILL_GROUP: &str = "sgp";
pub const PREFIX_TEMPLATE_SKILL: &str = "skl";
pub const PREFIX_RESPONSE_OPTION: &str = "opt";
pub const PREFIX_ORGANIZATION: &str = "org";
pub const PREFIX_CORPORATION: &str = "crp";
pub const PREFIX_COHORT: &str = "coh";
pub const PREFIX_LEARNING_PATH: &str = "lpa";
pub const PREFIX_LEARNING_RULE: &str = "lpr";
pub const PREFIX_SYNC_LOG: &str = "syn";

pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_PROFILE,
    PREFIX_ASSESSMENT,
    PREFIX_TEMPLATE,
    PREFIX_SKILL_GROUP,
    PREFIX_TEMPLATE_SKILL,
    PREFIX_RESPONSE_OPTION,
    PREFIX_ORGANIZATION,
    PREFIX_CORPORATION,
    PREFIX_COHORT,
    PREFIX_LEARNING_PATH,
    PREFIX_LEARNING_RULE,
    PREFIX_SYNC_LOG,
];
