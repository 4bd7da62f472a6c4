#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;

use sb_auth::{ClerkClient, StaticTokenVerifier};
use sb_config::SkillbenchConfig;
use sb_core::entities::{Question, SkillGroup, Template};
use sb_db::repos::template::NewQuestion;
use sb_db::service::SkillService;
use sb_server::AppState;

pub const TOKEN: &str = "token-ada";
pub const CLERK_USER: &str = "user_ada";
pub const OTHER_TOKEN: &str = "token-grace";
pub const OTHER_USER: &str = "user_grace";

pub const SVIX_SECRET: &str = "whsec_dGVzdC13ZWJob29rLXNlY3JldC1rZXk=";
pub const PROVISION_SECRET: &str = "provision-secret";
pub const SANITY_SECRET: &str = "sanity-secret";

/// A template with one skill group and two 5-point questions.
pub struct Catalog {
    pub template: Template,
    pub group: SkillGroup,
    pub questions: Vec<Question>,
}

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub catalog: Catalog,
}

impl TestApp {
    pub fn svc(&self) -> &SkillService {
        &self.state.svc
    }
}

pub async fn seed_catalog(svc: &SkillService) -> Catalog {
    let template = svc.create_template("Contract Management").await.unwrap();
    let group = svc.create_skill_group(&template.id, "Planning").await.unwrap();
    let mut questions = Vec::new();
    for (i, name) in ["Scope definition", "Risk allocation"].into_iter().enumerate() {
        let q = svc
            .create_question(&NewQuestion {
                skill_group_id: Some(group.id.clone()),
                name: name.to_string(),
                description: format!("How well do you handle {name}?"),
                max_points: 5.0,
                order_index: i64::try_from(i).unwrap(),
                template_ids: vec![template.id.clone()],
            })
            .await
            .unwrap();
        questions.push(q);
    }
    Catalog {
        template,
        group,
        questions,
    }
}

pub fn base_config() -> SkillbenchConfig {
    let mut config = SkillbenchConfig::default();
    config.clerk.webhook_secret = SVIX_SECRET.to_string();
    config.webhooks.provision_secret = PROVISION_SECRET.to_string();
    config.webhooks.sanity_secret = SANITY_SECRET.to_string();
    config
}

/// App over a fresh in-memory database with the catalog as default template.
pub async fn spawn_with(mut config: SkillbenchConfig, clerk: Option<ClerkClient>) -> TestApp {
    let svc = SkillService::new_local(":memory:").await.unwrap();
    let catalog = seed_catalog(&svc).await;
    config.assessment.default_template_id = catalog.template.id.clone();

    let verifier = StaticTokenVerifier::new()
        .with_token(TOKEN, CLERK_USER)
        .with_token(OTHER_TOKEN, OTHER_USER);
    let state = AppState::new(svc, Arc::new(verifier), clerk, config);
    let server = TestServer::new(sb_server::router(state.clone())).unwrap();
    TestApp {
        server,
        state,
        catalog,
    }
}

pub async fn spawn() -> TestApp {
    spawn_with(base_config(), None).await
}

/// Spawn and create the profile for [`CLERK_USER`].
pub async fn spawn_signed_in() -> TestApp {
    let app = spawn().await;
    app.svc()
        .upsert_profile(CLERK_USER, Some("Ada Lovelace"), Some("ada@example.com"))
        .await
        .unwrap();
    app
}
