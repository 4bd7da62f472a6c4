//! Shared test utilities for sb-db unit tests.

use sb_core::entities::{Profile, Question, SkillGroup, Template};

use crate::repos::template::NewQuestion;
use crate::service::SkillService;

/// Create an in-memory service.
pub async fn test_service() -> SkillService {
    SkillService::new_local(":memory:").await.unwrap()
}

pub async fn test_profile(svc: &SkillService, clerk_id: &str) -> Profile {
    svc.upsert_profile(clerk_id, Some("Test User"), Some(&format!("{clerk_id}@example.com")))
        .await
        .unwrap()
}

/// A template with two groups: "Strategy" (q1, q2 at 4 points) and "Execution" (q3 at 5 points).
pub struct SeededTemplate {
    pub template: Template,
    pub groups: Vec<SkillGroup>,
    pub questions: Vec<Question>,
}

pub async fn seed_template(svc: &SkillService) -> SeededTemplate {
    let template = svc.create_template("Procurement Core").await.unwrap();
    let strategy = svc.create_skill_group(&template.id, "Strategy").await.unwrap();
    let execution = svc.create_skill_group(&template.id, "Execution").await.unwrap();

    let mut questions = Vec::new();
    for (name, group, max_points, order) in [
        ("Sourcing plan", &strategy, 4.0, 1),
        ("Category review", &strategy, 4.0, 2),
        ("Supplier onboarding", &execution, 5.0, 3),
    ] {
        let question = svc
            .create_question(&NewQuestion {
                skill_group_id: Some(group.id.clone()),
                name: name.to_string(),
                description: format!("How mature is {name}?"),
                max_points,
                order_index: order,
                template_ids: vec![template.id.clone()],
            })
            .await
            .unwrap();
        questions.push(question);
    }

    SeededTemplate {
        template,
        groups: vec![strategy, execution],
        questions,
    }
}
