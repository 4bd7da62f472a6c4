//! Benchmark statistics over other users' submitted attempts.
//!
//! The storage layer selects the cohort (matching [`BenchmarkFilter`]) and hands
//! raw numbers to the summarizers here:
//! - [`summarize_group_scores`]: one summed group score per attempt → mean
//! - [`summarize_skill_scores`]: one question score per attempt → mean and percentile bands

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Demographic and geographic dimensions that narrow a benchmark cohort.
///
/// Every field is optional; an empty filter benchmarks against everyone.
/// Query keys use the camelCase names the results page sends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkFilter {
    pub submitted_year: Option<i32>,
    pub country: Option<String>,
    pub industry: Option<String>,
    pub job_level: Option<String>,
    pub functional_area: Option<String>,
    pub role: Option<String>,
    pub region: Option<String>,
    pub sub_region: Option<String>,
    pub years_experience: Option<i64>,
    pub education_level: Option<String>,
}

impl BenchmarkFilter {
    /// Build a filter from raw query pairs.
    ///
    /// Unknown keys are ignored. Blank values and the UI's `"All"` sentinel are
    /// treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if a numeric dimension is not a number.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filter = Self::default();
        for (key, raw) in pairs {
            let value = raw.trim();
            if value.is_empty() || value == "All" {
                continue;
            }
            match key {
                "submittedYear" => filter.submitted_year = Some(parse_number(key, value)?),
                "yearsExperience" => filter.years_experience = Some(parse_number(key, value)?),
                "country" => filter.country = Some(value.to_string()),
                "industry" => filter.industry = Some(value.to_string()),
                "jobLevel" => filter.job_level = Some(value.to_string()),
                "functionalArea" => filter.functional_area = Some(value.to_string()),
                "role" => filter.role = Some(value.to_string()),
                "region" => filter.region = Some(value.to_string()),
                "subRegion" => filter.sub_region = Some(value.to_string()),
                "educationLevel" => filter.education_level = Some(value.to_string()),
                _ => {}
            }
        }
        Ok(filter)
    }

    /// Set dimensions as `(query key, value)` pairs, sorted by key.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = Vec::new();
        let mut push = |key: &'static str, value: Option<String>| {
            if let Some(v) = value {
                entries.push((key, v));
            }
        };
        push("country", self.country.clone());
        push("educationLevel", self.education_level.clone());
        push("functionalArea", self.functional_area.clone());
        push("industry", self.industry.clone());
        push("jobLevel", self.job_level.clone());
        push("region", self.region.clone());
        push("role", self.role.clone());
        push("subRegion", self.sub_region.clone());
        push("submittedYear", self.submitted_year.map(|y| y.to_string()));
        push("yearsExperience", self.years_experience.map(|y| y.to_string()));
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Deterministic `key=value&...` string, empty for the global benchmark.
    #[must_use]
    pub fn stable_key(&self) -> String {
        self.entries()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    #[must_use]
    pub fn is_global(&self) -> bool {
        self.entries().is_empty()
    }

    /// Human-readable name of the comparison cohort.
    #[must_use]
    pub fn label(&self) -> String {
        if self.is_global() {
            return "the global average".to_string();
        }
        let values: Vec<String> = self.entries().into_iter().map(|(_, v)| v).collect();
        format!("the average for {}", values.join(", "))
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, CoreError> {
    value
        .parse()
        .map_err(|_| CoreError::Validation(format!("{key} must be a number, got '{value}'")))
}

/// Mean score of a skill group across the benchmark cohort.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct GroupBenchmark {
    pub mean_score: Option<f64>,
    pub total_possible_points: Option<f64>,
    pub n: u32,
}

impl GroupBenchmark {
    /// Benchmark mean as a whole percentage of the group's possible points.
    #[must_use]
    pub fn percentage(&self) -> i64 {
        match (self.mean_score, self.total_possible_points) {
            (Some(mean), Some(total)) => crate::scoring::percentage(mean, total),
            _ => 0,
        }
    }
}

/// Distribution of one question's score across the benchmark cohort.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SkillBenchmark {
    pub n: u32,
    pub mean_score: Option<f64>,
    pub p10: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub p90: Option<f64>,
}

/// Summarize per-attempt group sums into a [`GroupBenchmark`].
///
/// `total_possible` is the group's maximum across all of its questions.
#[must_use]
pub fn summarize_group_scores(per_attempt: &[f64], total_possible: f64) -> GroupBenchmark {
    GroupBenchmark {
        mean_score: mean(per_attempt),
        total_possible_points: Some(total_possible),
        n: sample_size(per_attempt),
    }
}

/// Summarize per-attempt question scores into a [`SkillBenchmark`].
#[must_use]
pub fn summarize_skill_scores(samples: &[f64]) -> SkillBenchmark {
    if samples.is_empty() {
        return SkillBenchmark::default();
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    SkillBenchmark {
        n: sample_size(samples),
        mean_score: mean(samples),
        p10: percentile_cont(&sorted, 0.10),
        p25: percentile_cont(&sorted, 0.25),
        p50: percentile_cont(&sorted, 0.50),
        p75: percentile_cont(&sorted, 0.75),
        p90: percentile_cont(&sorted, 0.90),
    }
}

#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    Some(values.iter().sum::<f64>() / n)
}

/// Continuous percentile over an ascending slice (linear interpolation between ranks).
#[must_use]
pub fn percentile_cont(sorted: &[f64], fraction: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    #[allow(clippy::cast_precision_loss)]
    let rank = fraction.clamp(0.0, 1.0) * last as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(last);
    #[allow(clippy::cast_precision_loss)]
    let weight = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

fn sample_size(values: &[f64]) -> u32 {
    u32::try_from(values.len()).unwrap_or(u32::MAX)
}
