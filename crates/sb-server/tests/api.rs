mod support;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use sb_db::repos::assessment::SaveAnswer;
use sb_db::repos::learning::{NewLearningPath, NewLearningPathRule};
use support::{CLERK_USER, OTHER_TOKEN, OTHER_USER, TOKEN, TestApp, spawn, spawn_signed_in};

async fn start(app: &TestApp) -> Value {
    let resp = app.server.post("/api/assessment/start").authorization_bearer(TOKEN).await;
    resp.assert_status_ok();
    resp.json::<Value>()
}

async fn answer(app: &TestApp, assessment_id: &str, question: usize, points: f64) -> StatusCode {
    app.server
        .post("/api/assessment/save-answer")
        .authorization_bearer(TOKEN)
        .json(&json!({
            "assessmentId": assessment_id,
            "templateSkillId": app.catalog.questions[question].id,
            "points": points,
            "openEndedResponse": "  "
        }))
        .await
        .status_code()
}

async fn submit(app: &TestApp, assessment_id: &str) -> StatusCode {
    app.server
        .post("/api/assessment/submit")
        .authorization_bearer(TOKEN)
        .json(&json!({ "assessmentId": assessment_id }))
        .await
        .status_code()
}

/// Another user's submitted attempt with the given points per question.
async fn submit_other(app: &TestApp, points: &[f64]) {
    let svc = app.svc();
    let profile = svc.upsert_profile(OTHER_USER, Some("Grace Hopper"), None).await.unwrap();
    let (attempt, _) = svc
        .start_or_resume_assessment(&profile.id, &app.catalog.template.id)
        .await
        .unwrap();
    for (question, &p) in app.catalog.questions.iter().zip(points) {
        svc.save_answer(
            &profile.id,
            &SaveAnswer {
                assessment_id: &attempt.id,
                template_skill_id: &question.id,
                points: p,
                open_ended_response: None,
            },
        )
        .await
        .unwrap();
    }
    svc.submit_assessment(&attempt.id, &profile.id).await.unwrap();
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = spawn().await;
    let resp = app.server.get("/api/me").await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(resp.json::<Value>(), json!({"error": "Unauthorized"}));
}

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let app = spawn().await;
    let resp = app.server.get("/api/me").authorization_bearer("forged").await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_without_profile_is_not_found() {
    let app = spawn().await;
    let resp = app.server.get("/api/me").authorization_bearer(TOKEN).await;
    resp.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(resp.json::<Value>()["error"], "Profile not found");
}

// ---------------------------------------------------------------------------
// Assessment flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn start_then_resume_returns_saved_answers() {
    let app = spawn_signed_in().await;

    let first = start(&app).await;
    assert_eq!(first["resumed"], false);
    assert_eq!(first["template"]["title"], "Contract Management");
    assert_eq!(first["skillGroups"].as_array().unwrap().len(), 1);
    assert_eq!(first["questions"].as_array().unwrap().len(), 2);
    assert_eq!(first["answers"], json!([]));

    let id = first["assessmentId"].as_str().unwrap().to_string();
    assert_eq!(answer(&app, &id, 0, 4.0).await, StatusCode::OK);

    let second = start(&app).await;
    assert_eq!(second["resumed"], true);
    assert_eq!(second["assessmentId"], id.as_str());
    assert_eq!(second["answers"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn save_answer_rejects_out_of_range_points() {
    let app = spawn_signed_in().await;
    let id = start(&app).await["assessmentId"].as_str().unwrap().to_string();

    assert_eq!(answer(&app, &id, 0, 6.0).await, StatusCode::BAD_REQUEST);
    assert_eq!(answer(&app, &id, 0, -1.0).await, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn save_answer_rejects_malformed_body() {
    let app = spawn_signed_in().await;
    let resp = app
        .server
        .post("/api/assessment/save-answer")
        .authorization_bearer(TOKEN)
        .json(&json!({"assessmentId": "asm-1"}))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn submitted_attempt_is_read_only() {
    let app = spawn_signed_in().await;
    let id = start(&app).await["assessmentId"].as_str().unwrap().to_string();
    assert_eq!(answer(&app, &id, 0, 3.0).await, StatusCode::OK);

    assert_eq!(submit(&app, &id).await, StatusCode::OK);
    assert_eq!(answer(&app, &id, 1, 3.0).await, StatusCode::CONFLICT);
    assert_eq!(submit(&app, &id).await, StatusCode::CONFLICT);
}

#[tokio::test]
async fn foreign_attempt_is_not_found() {
    let app = spawn_signed_in().await;
    submit_other(&app, &[1.0, 1.0]).await;
    let other = app.svc().find_profile_by_clerk_id(OTHER_USER).await.unwrap().unwrap();
    let (attempt, _) = app
        .svc()
        .start_or_resume_assessment(&other.id, &app.catalog.template.id)
        .await
        .unwrap();

    assert_eq!(answer(&app, &attempt.id, 0, 2.0).await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn overview_counts_questions_and_sections() {
    let app = spawn_signed_in().await;

    let resp = app.server.get("/api/assessment/overview").authorization_bearer(TOKEN).await;
    resp.assert_status_ok();
    let body = resp.json::<Value>();
    assert_eq!(body["templateId"], app.catalog.template.id.as_str());
    assert_eq!(body["questionCount"], 2);
    assert_eq!(body["sectionCount"], 1);
    assert!(body["timeLabel"].as_str().unwrap().contains("min"));
    assert_eq!(body["inProgressAssessmentId"], Value::Null);

    let id = start(&app).await["assessmentId"].clone();
    let body = app
        .server
        .get("/api/assessment/overview")
        .authorization_bearer(TOKEN)
        .await
        .json::<Value>();
    assert_eq!(body["inProgressAssessmentId"], id);
}

// ---------------------------------------------------------------------------
// Results and recommendations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn results_before_submission_are_empty() {
    let app = spawn_signed_in().await;
    start(&app).await;

    let body = app.server.get("/api/results").authorization_bearer(TOKEN).await.json::<Value>();
    assert_eq!(body["hasResults"], false);
    assert_eq!(body["assessmentId"], Value::Null);
    assert_eq!(body["settings"]["benchmark_default"], "global");
}

#[tokio::test]
async fn results_score_latest_submission() {
    let app = spawn_signed_in().await;
    let id = start(&app).await["assessmentId"].as_str().unwrap().to_string();
    answer(&app, &id, 0, 4.0).await;
    answer(&app, &id, 1, 3.0).await;
    submit(&app, &id).await;

    let resp = app.server.get("/api/results").authorization_bearer(TOKEN).await;
    resp.assert_status_ok();
    let body = resp.json::<Value>();
    assert_eq!(body["hasResults"], true);
    assert_eq!(body["assessmentId"], id.as_str());
    assert_eq!(body["userScore"], 7.0);
    assert_eq!(body["totalPossible"], 10.0);
    assert_eq!(body["percentage"], 70);
    assert_eq!(body["groups"][0]["name"], "Planning");
    assert_eq!(body["groups"][0]["answeredCount"], 2);
}

#[tokio::test]
async fn recommendations_match_overall_percentage() {
    let app = spawn_signed_in().await;
    let svc = app.svc();
    let fits = svc
        .upsert_learning_path(&NewLearningPath {
            external_id: "doc-intermediate".into(),
            title: "Intermediate negotiation".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let too_high = svc
        .upsert_learning_path(&NewLearningPath {
            external_id: "doc-expert".into(),
            title: "Expert negotiation".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    for (path, min, max) in [(&fits, 60.0, 80.0), (&too_high, 81.0, 100.0)] {
        svc.insert_learning_path_rule(&NewLearningPathRule {
            min_score: min,
            max_score: max,
            learning_path_id: path.id.clone(),
            ..Default::default()
        })
        .await
        .unwrap();
    }

    let empty = app
        .server
        .get("/api/learning-paths/recommended")
        .authorization_bearer(TOKEN)
        .await
        .json::<Value>();
    assert_eq!(empty, json!({"scorePercentage": null, "paths": []}));

    let id = start(&app).await["assessmentId"].as_str().unwrap().to_string();
    answer(&app, &id, 0, 4.0).await;
    answer(&app, &id, 1, 3.0).await;
    submit(&app, &id).await;

    let body = app
        .server
        .get("/api/learning-paths/recommended")
        .authorization_bearer(TOKEN)
        .await
        .json::<Value>();
    assert_eq!(body["scorePercentage"], 70);
    let titles: Vec<&str> = body["paths"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Intermediate negotiation"]);
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn benchmark_requires_template_and_group() {
    let app = spawn_signed_in().await;
    let resp = app
        .server
        .get("/api/assessment/benchmark")
        .authorization_bearer(TOKEN)
        .add_query_param("templateId", &app.catalog.template.id)
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["error"], "templateId and skillGroupId are required");
}

#[tokio::test]
async fn benchmark_is_null_without_other_submissions() {
    let app = spawn_signed_in().await;
    let resp = app
        .server
        .get("/api/assessment/benchmark")
        .authorization_bearer(TOKEN)
        .add_query_param("templateId", &app.catalog.template.id)
        .add_query_param("skillGroupId", &app.catalog.group.id)
        .await;
    resp.assert_status_ok();
    assert_eq!(resp.json::<Value>(), Value::Null);
}

#[tokio::test]
async fn benchmark_summarizes_other_users() {
    let app = spawn_signed_in().await;
    submit_other(&app, &[5.0, 3.0]).await;

    let body = app
        .server
        .get("/api/assessment/benchmark")
        .authorization_bearer(TOKEN)
        .add_query_param("templateId", &app.catalog.template.id)
        .add_query_param("skillGroupId", &app.catalog.group.id)
        .await
        .json::<Value>();
    assert_eq!(body["n"], 1);
    assert_eq!(body["mean_score"], 8.0);
    assert_eq!(body["total_possible_points"], 10.0);

    let skill = app
        .server
        .get("/api/assessment/skill-benchmark")
        .authorization_bearer(TOKEN)
        .add_query_param("templateId", &app.catalog.template.id)
        .add_query_param("templateSkillId", &app.catalog.questions[0].id)
        .await
        .json::<Value>();
    assert_eq!(skill["n"], 1);
    assert_eq!(skill["p50"], 5.0);
}

#[tokio::test]
async fn benchmark_excludes_the_requester() {
    let app = spawn_signed_in().await;
    submit_other(&app, &[5.0, 3.0]).await;

    let body = app
        .server
        .get("/api/assessment/benchmark")
        .authorization_bearer(OTHER_TOKEN)
        .add_query_param("templateId", &app.catalog.template.id)
        .add_query_param("skillGroupId", &app.catalog.group.id)
        .await
        .json::<Value>();
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn benchmark_rejects_non_numeric_year_filter() {
    let app = spawn_signed_in().await;
    let resp = app
        .server
        .get("/api/assessment/benchmark")
        .authorization_bearer(TOKEN)
        .add_query_param("templateId", &app.catalog.template.id)
        .add_query_param("skillGroupId", &app.catalog.group.id)
        .add_query_param("submittedYear", "last")
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn filter_options_need_only_a_session() {
    let app = spawn().await;
    let resp = app
        .server
        .get("/api/assessment/filter-options")
        .authorization_bearer(TOKEN)
        .await;
    resp.assert_status_ok();
    assert!(resp.json::<Value>()["country"].is_array());
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

#[tokio::test]
async fn settings_round_trip() {
    let app = spawn_signed_in().await;

    let defaults = app
        .server
        .get("/api/account/settings")
        .authorization_bearer(TOKEN)
        .await
        .json::<Value>();
    assert_eq!(defaults["benchmarkDefault"], "global");

    app.server
        .post("/api/account/settings")
        .authorization_bearer(TOKEN)
        .json(&json!({"benchmarkDefault": "country", "dashboardOption": "assessments"}))
        .await
        .assert_status_ok();

    let saved = app
        .server
        .get("/api/account/settings")
        .authorization_bearer(TOKEN)
        .await
        .json::<Value>();
    assert_eq!(
        saved,
        json!({
            "summaryReportMode": "summary_reports",
            "dashboardOption": "assessments",
            "percentageBasedScoring": true,
            "benchmarkDefault": "country"
        })
    );
}

#[tokio::test]
async fn settings_reject_unknown_enum_value() {
    let app = spawn_signed_in().await;
    app.server
        .post("/api/account/settings")
        .authorization_bearer(TOKEN)
        .json(&json!({"benchmarkDefault": "galactic"}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn management_updates_profile_and_dimensions() {
    let app = spawn_signed_in().await;
    app.server
        .post("/api/account/management")
        .authorization_bearer(TOKEN)
        .json(&json!({
            "fullName": "Ada King",
            "country": "United Kingdom",
            "industry": "",
            "yearsExperience": "12"
        }))
        .await
        .assert_status_ok();

    let me = app.server.get("/api/me").authorization_bearer(TOKEN).await.json::<Value>();
    assert_eq!(me["profile"]["full_name"], "Ada King");
    assert_eq!(me["profile"]["clerk_user_id"], CLERK_USER);
    assert_eq!(me["role"], "user");
    assert_eq!(me["dimensions"]["country"], "United Kingdom");
    assert_eq!(me["dimensions"]["industry"], Value::Null);
    assert_eq!(me["dimensions"]["years_experience"], 12);
    assert_eq!(me["settings"]["dashboardOption"], "insights");
}

#[tokio::test]
async fn management_rejects_bad_years() {
    let app = spawn_signed_in().await;
    app.server
        .post("/api/account/management")
        .authorization_bearer(TOKEN)
        .json(&json!({"yearsExperience": "a decade"}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Public endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn templates_are_public_with_cors() {
    let app = spawn().await;
    let resp = app
        .server
        .get("/api/templates")
        .add_header(
            HeaderName::from_static("origin"),
            HeaderValue::from_static("https://marketing.example.com"),
        )
        .await;
    resp.assert_status_ok();
    assert_eq!(resp.header("access-control-allow-origin"), "*");
    let body = resp.json::<Value>();
    assert_eq!(body[0]["title"], "Contract Management");
}

#[tokio::test]
async fn score_total_sums_question_maxima() {
    let app = spawn().await;
    let body = app
        .server
        .get(&format!("/api/templates/{}/score-total", app.catalog.template.id))
        .await
        .json::<Value>();
    assert_eq!(
        body,
        json!({"templateId": app.catalog.template.id, "skillCount": 2, "totalPoints": 10.0})
    );
}

#[tokio::test]
async fn score_total_of_unknown_template_is_zero() {
    let app = spawn().await;
    let body = app
        .server
        .get("/api/templates/tpl-missing/score-total")
        .await
        .json::<Value>();
    assert_eq!(body["skillCount"], 0);
}

#[tokio::test]
async fn health_checks_database() {
    let app = spawn().await;
    let resp = app.server.get("/health").await;
    resp.assert_status_ok();
    assert_eq!(resp.json::<Value>(), json!({"status": "ok", "remote": false}));
}
