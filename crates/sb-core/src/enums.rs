//! Status, role, and preference enums for skillbench.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! and expose `as_str()` for SQL storage. `AssessmentStatus` is the only state
//! machine and provides `allowed_next_states()`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// AssessmentStatus
// ---------------------------------------------------------------------------

/// Status of an assessment attempt.
///
/// ```text
/// in_progress → submitted
/// ```
///
/// A submitted attempt is frozen: no further answer writes, no transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    InProgress,
    Submitted,
}

impl AssessmentStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::InProgress => &[Self::Submitted],
            Self::Submitted => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Whether answers may still be written to an attempt in this state.
    #[must_use]
    pub const fn accepts_answers(self) -> bool {
        matches!(self, Self::InProgress)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Submitted => "submitted",
        }
    }
}

impl fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// UserRole
// ---------------------------------------------------------------------------

/// Application role derived from a user's organization membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    CorpAdmin,
    Reviewer,
    User,
}

impl UserRole {
    /// Map a stored membership role to an application role.
    ///
    /// Missing or unrecognized roles fall back to `User`.
    #[must_use]
    pub fn from_membership(role: Option<&str>) -> Self {
        match role {
            Some("admin") => Self::Admin,
            Some("corp_admin") => Self::CorpAdmin,
            Some("reviewer") => Self::Reviewer,
            _ => Self::User,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::CorpAdmin => "corp_admin",
            Self::Reviewer => "reviewer",
            Self::User => "user",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CorpRole
// ---------------------------------------------------------------------------

/// Role of a user inside a corporation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CorpRole {
    CorpAdmin,
    Member,
}

impl CorpRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CorpAdmin => "corp_admin",
            Self::Member => "member",
        }
    }
}

impl fmt::Display for CorpRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PaymentStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

impl PaymentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SyncType
// ---------------------------------------------------------------------------

/// Kind of inbound integration event recorded in the sync log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SyncType {
    PaymentReceived,
    AdminProvisioned,
}

impl SyncType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PaymentReceived => "payment_received",
            Self::AdminProvisioned => "admin_provisioned",
        }
    }
}

impl fmt::Display for SyncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// User settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SummaryReportMode {
    #[default]
    SummaryReports,
    AssessmentCompletion,
}

impl SummaryReportMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SummaryReports => "summary_reports",
            Self::AssessmentCompletion => "assessment_completion",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DashboardOption {
    #[default]
    Insights,
    Assessments,
}

impl DashboardOption {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insights => "insights",
            Self::Assessments => "assessments",
        }
    }
}

/// Which benchmark the results page opens with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkDefault {
    #[default]
    Global,
    Country,
}

impl BenchmarkDefault {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Country => "country",
        }
    }
}
