//! End-to-end checks of the public HTTP contract.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use study_buddy::config::{QuizConfig, Settings};
use study_buddy::llm::{LlmConfig, LlmError, StudyAssistant, TextGenerator};
use study_buddy::models::Role;
use study_buddy::ocr::TextExtractor;
use study_buddy::repository::DbContext;
use study_buddy::server::{create_router, AppState};

/// Answers every prompt with the same model output.
struct FixedModel(&'static str);

#[async_trait]
impl TextGenerator for FixedModel {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        Ok(self.0.to_string())
    }

    fn model_name(&self) -> &str {
        "fixed"
    }
}

const MODEL_OUTPUT: &str = r#"Sure! Here is the quiz.

```json
{
  "questions": [
    {"question": "What is the powerhouse of the cell?", "options": ["Nucleus", "Mitochondria", "Golgi body", "Ribosome"], "correctAnswer": "B"},
    {"question": "What carries genetic information?", "options": ["DNA", "ATP", "Lipids", "Glucose"], "correct_answer": "DNA"},
    {"question": "How many chromosomes do humans have?", "options": ["23", "46", "48", "92"], "correctAnswer": 1},
    {"question": "Too few options", "options": ["yes", "no"], "correctAnswer": "yes"},
    {"question": "Answer not offered", "options": ["a", "b", "c", "d"], "correctAnswer": "e"}
  ]
}
```"#;

async fn setup(model: &'static str) -> (Router, DbContext, TempDir) {
    let dir = TempDir::new().unwrap();
    let settings = Settings::with_data_dir(dir.path().to_path_buf());
    settings.ensure_directories().unwrap();

    let ctx = settings.create_db_context();
    ctx.init_schema().await.unwrap();

    let assistant = StudyAssistant::new(
        Arc::new(FixedModel(model)),
        LlmConfig::base_default(),
        QuizConfig::default(),
    );
    let state = AppState::new(&ctx, assistant, TextExtractor::default(), &settings);
    (create_router(state), ctx, dir)
}

async fn post(app: &Router, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Vec<u8>) {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let response = app
        .clone()
        .oneshot(request.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn generated_questions_have_four_options_and_a_listed_answer() {
    let (app, _ctx, _dir) = setup(MODEL_OUTPUT).await;

    let (status, body) = post(
        &app,
        "/generate-quiz",
        None,
        json!({"text": "The mitochondria produces ATP. DNA stores genes. Humans have 46 chromosomes."}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&body).unwrap();
    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 3);

    for q in questions {
        let options = q["options"].as_array().unwrap();
        assert_eq!(options.len(), 4);
        assert!(options.contains(&q["correctAnswer"]), "{}", q);
    }
    assert_eq!(questions[0]["correctAnswer"], "Mitochondria");
    assert_eq!(questions[2]["correctAnswer"], "46");
}

#[tokio::test]
async fn invite_validation_distinguishes_unknown_and_used() {
    let (app, ctx, _dir) = setup("").await;
    let invite = ctx.invites().create("restaurant-7", "manager").await.unwrap();

    let (status, _) = post(&app, "/validate-invite", None, json!({"inviteCode": "unknown-code"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = post(&app, "/validate-invite", None, json!({"inviteCode": invite.code})).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["restaurantId"], "restaurant-7");

    let (status, _) = post(&app, "/mark-invite-used", None, json!({"inviteCode": invite.code})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(&app, "/validate-invite", None, json!({"inviteCode": invite.code})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["error"].as_str().unwrap().contains("already been used"));
}

#[tokio::test]
async fn marking_an_invite_twice_is_not_an_error() {
    let (app, ctx, _dir) = setup("").await;
    let token = ctx
        .tokens()
        .issue("manager", Some("restaurant-1"), Role::Member)
        .await
        .unwrap();

    let (status, body) = post(
        &app,
        "/create-invite",
        Some(&token),
        json!({"restaurantId": "restaurant-1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    let code = body["inviteCode"].as_str().unwrap().to_string();

    let (first, _) = post(&app, "/mark-invite-used", None, json!({"inviteCode": code})).await;
    let (second, text) = post(&app, "/mark-invite-used", None, json!({"inviteCode": code})).await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert!(!String::from_utf8(text).unwrap().is_empty());

    let invite = ctx.invites().get(&code).await.unwrap().unwrap();
    assert!(invite.used);
    assert!(invite.used_at.is_some());
}
