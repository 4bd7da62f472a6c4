//! Learning path recommendation by score range.

use std::collections::HashSet;

use crate::entities::LearningPathRule;

/// Context a rule must match besides the score.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleScope<'a> {
    pub org_id: Option<&'a str>,
    pub template_id: Option<&'a str>,
}

impl LearningPathRule {
    /// Whether this rule applies to `score_pct` within `scope`.
    ///
    /// The range is inclusive on both ends. An unset rule org/template matches anything.
    /// `skill_group_id` and `template_skill_id` are not evaluated; the overall percentage decides.
    #[must_use]
    pub fn matches(&self, score_pct: f64, scope: RuleScope<'_>) -> bool {
        let in_range = score_pct >= self.min_score && score_pct <= self.max_score;
        let org_ok = self.org_id.is_none() || self.org_id.as_deref() == scope.org_id;
        let template_ok =
            self.template_id.is_none() || self.template_id.as_deref() == scope.template_id;
        in_range && org_ok && template_ok
    }
}

/// Learning path IDs recommended for a score, highest priority first.
///
/// Each path appears once, at the position of its best-priority rule.
#[must_use]
pub fn match_learning_paths(
    rules: &[LearningPathRule],
    score_pct: f64,
    scope: RuleScope<'_>,
) -> Vec<String> {
    let mut matching: Vec<&LearningPathRule> =
        rules.iter().filter(|r| r.matches(score_pct, scope)).collect();
    matching.sort_by(|a, b| b.priority.cmp(&a.priority));

    let mut seen = HashSet::new();
    matching
        .into_iter()
        .filter(|r| seen.insert(r.learning_path_id.as_str()))
        .map(|r| r.learning_path_id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rule(id: &str, path: &str, min: f64, max: f64, priority: i64) -> LearningPathRule {
        LearningPathRule {
            id: id.into(),
            org_id: None,
            template_id: None,
            skill_group_id: None,
            template_skill_id: None,
            min_score: min,
            max_score: max,
            learning_path_id: path.into(),
            priority,
        }
    }

    #[test]
    fn range_is_inclusive() {
        let r = rule("r1", "lpa-1", 0.0, 50.0, 0);
        assert!(r.matches(0.0, RuleScope::default()));
        assert!(r.matches(50.0, RuleScope::default()));
        assert!(!r.matches(50.5, RuleScope::default()));
    }

    #[test]
    fn scoped_rule_requires_matching_scope() {
        let mut r = rule("r1", "lpa-1", 0.0, 100.0, 0);
        r.template_id = Some("tpl-1".into());
        assert!(!r.matches(40.0, RuleScope::default()));
        assert!(r.matches(
            40.0,
            RuleScope {
                template_id: Some("tpl-1"),
                org_id: None,
            }
        ));

        r.org_id = Some("org-1".into());
        assert!(!r.matches(
            40.0,
            RuleScope {
                template_id: Some("tpl-1"),
                org_id: Some("org-2"),
            }
        ));
    }

    #[test]
    fn skill_scopes_do_not_narrow_matching() {
        let mut r = rule("r1", "lpa-1", 0.0, 50.0, 0);
        r.skill_group_id = Some("grp-1".into());
        r.template_skill_id = Some("skl-1".into());
        assert!(r.matches(25.0, RuleScope::default()));
        assert!(!r.matches(75.0, RuleScope::default()));
    }

    #[test]
    fn ordered_by_priority_and_deduplicated() {
        let rules = vec![
            rule("r1", "lpa-basics", 0.0, 60.0, 1),
            rule("r2", "lpa-advanced", 40.0, 100.0, 5),
            rule("r3", "lpa-basics", 30.0, 70.0, 9),
            rule("r4", "lpa-expert", 90.0, 100.0, 10),
        ];
        let paths = match_learning_paths(&rules, 45.0, RuleScope::default());
        assert_eq!(paths, vec!["lpa-basics", "lpa-advanced"]);
    }

    #[test]
    fn no_match_is_empty() {
        let rules = vec![rule("r1", "lpa-1", 80.0, 100.0, 0)];
        assert!(match_learning_paths(&rules, 10.0, RuleScope::default()).is_empty());
    }
}
