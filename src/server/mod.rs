//! HTTP API server.
//!
//! JSON endpoints for quiz generation, invites, highlights, flashcards,
//! document upload with OCR, and quiz sharing.

mod auth;
mod error;
mod handlers;
mod routes;

pub use error::ApiError;
pub use routes::create_router;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{Config, Settings};
use crate::llm::StudyAssistant;
use crate::ocr::TextExtractor;
use crate::repository::{
    DbContext, DocumentRepository, FlashcardRepository, HighlightRepository, InviteRepository,
    QuizRepository, TokenRepository,
};

/// Shared state for the API server.
#[derive(Clone)]
pub struct AppState {
    pub doc_repo: Arc<DocumentRepository>,
    pub quiz_repo: Arc<QuizRepository>,
    pub highlight_repo: Arc<HighlightRepository>,
    pub flashcard_repo: Arc<FlashcardRepository>,
    pub invite_repo: Arc<InviteRepository>,
    pub token_repo: Arc<TokenRepository>,
    pub assistant: Arc<StudyAssistant>,
    pub extractor: Arc<TextExtractor>,
    pub uploads_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        ctx: &DbContext,
        assistant: StudyAssistant,
        extractor: TextExtractor,
        settings: &Settings,
    ) -> Self {
        Self {
            doc_repo: Arc::new(ctx.documents()),
            quiz_repo: Arc::new(ctx.quizzes()),
            highlight_repo: Arc::new(ctx.highlights()),
            flashcard_repo: Arc::new(ctx.flashcards()),
            invite_repo: Arc::new(ctx.invites()),
            token_repo: Arc::new(ctx.tokens()),
            assistant: Arc::new(assistant),
            extractor: Arc::new(extractor),
            uploads_dir: settings.uploads_dir.clone(),
            max_upload_bytes: settings.max_upload_bytes,
        }
    }
}

/// Start the API server.
pub async fn serve(settings: &Settings, config: &Config, host: &str, port: u16) -> anyhow::Result<()> {
    settings.ensure_directories()?;
    let ctx = settings.create_db_context();
    ctx.init_schema().await?;

    let assistant = StudyAssistant::from_config(config.llm.clone(), config.quiz.clone())?;
    tracing::info!(
        "Using {} model {}",
        config.llm.provider.as_str(),
        assistant.model_name()
    );

    let state = AppState::new(&ctx, assistant, TextExtractor::new(&config.ocr), settings);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tempfile::tempdir;
    use tower::ServiceExt;

    use crate::config::QuizConfig;
    use crate::llm::{LlmConfig, LlmError, TextGenerator};
    use crate::models::Role;

    const QUIZ_RESPONSE: &str = r#"Here is your quiz:
```json
{"questions": [
  {"question": "What do plants turn light into?", "options": ["Chemical energy", "Sound", "Heat only", "Nothing"], "correctAnswer": "A"},
  {"question": "Where does photosynthesis happen?", "options": ["Mitochondria", "Chloroplast", "Nucleus", "Ribosome"], "correctAnswer": "Chloroplast"},
  {"question": "Broken", "options": ["a", "b"], "correctAnswer": "a"}
]}
```"#;

    struct Canned(&'static str);

    #[async_trait]
    impl TextGenerator for Canned {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    struct TestApp {
        router: Router,
        ctx: DbContext,
        _dir: tempfile::TempDir,
    }

    impl TestApp {
        async fn new(response: &'static str) -> Self {
            Self::with_limit(response, 1024 * 1024).await
        }

        async fn with_limit(response: &'static str, max_upload_bytes: usize) -> Self {
            let dir = tempdir().unwrap();
            let mut settings = Settings::with_data_dir(dir.path().to_path_buf());
            settings.max_upload_bytes = max_upload_bytes;
            settings.ensure_directories().unwrap();

            let ctx = settings.create_db_context();
            ctx.init_schema().await.unwrap();

            let assistant = StudyAssistant::new(
                Arc::new(Canned(response)),
                LlmConfig::base_default(),
                QuizConfig::default(),
            );
            let state = AppState::new(&ctx, assistant, TextExtractor::default(), &settings);

            Self {
                router: create_router(state),
                ctx,
                _dir: dir,
            }
        }

        async fn token(&self, user: &str, restaurant: Option<&str>, role: Role) -> String {
            self.ctx.tokens().issue(user, restaurant, role).await.unwrap()
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let value = serde_json::from_slice(&body)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()));
            (status, value)
        }

        async fn json(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Value,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json");
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
            }
            self.send(builder.body(Body::from(body.to_string())).unwrap())
                .await
        }

        async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
            let mut builder = Request::builder().uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
            }
            self.send(builder.body(Body::empty()).unwrap()).await
        }

        async fn upload(&self, token: &str, title: &str, content: &'static [u8]) -> (StatusCode, Value) {
            let request = Request::builder()
                .method("POST")
                .uri(format!("/api/documents?title={}", title))
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "text/plain")
                .body(Body::from(content))
                .unwrap();
            self.send(request).await
        }
    }

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new("").await;
        let (status, body) = app.get("/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["llm"]["model"], "canned");
    }

    #[tokio::test]
    async fn test_generate_quiz_normalizes_questions() {
        let app = TestApp::new(QUIZ_RESPONSE).await;
        let (status, body) = app
            .json(
                "POST",
                "/generate-quiz",
                None,
                json!({"text": "Photosynthesis turns light into chemical energy.", "refinementText": "easy"}),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        let questions = body["questions"].as_array().unwrap();
        assert_eq!(questions.len(), 2);
        for q in questions {
            let options = q["options"].as_array().unwrap();
            assert_eq!(options.len(), 4);
            assert!(options.contains(&q["correctAnswer"]));
        }
        assert_eq!(questions[0]["correctAnswer"], "Chemical energy");
    }

    #[tokio::test]
    async fn test_generate_quiz_errors() {
        let app = TestApp::new(QUIZ_RESPONSE).await;
        let (status, body) = app
            .json("POST", "/generate-quiz", None, json!({"text": "   "}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let app = TestApp::new("Sorry, I can't do that.").await;
        let (status, _) = app
            .json("POST", "/generate-quiz", None, json!({"text": "Cells"}))
            .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_auth_required() {
        let app = TestApp::new("").await;
        let (status, body) = app.get("/api/documents", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Missing credentials");

        let (status, body) = app.get("/api/documents", Some("sb_bogus")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid token");
    }

    #[tokio::test]
    async fn test_invite_lifecycle() {
        let app = TestApp::new("").await;
        let owner = app.token("owner", Some("r1"), Role::Member).await;

        let (status, _) = app
            .json("POST", "/create-invite", Some(&owner), json!({"restaurantId": "r2"}))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .json("POST", "/create-invite", Some(&owner), json!({"restaurantId": "r1"}))
            .await;
        assert_eq!(status, StatusCode::OK);
        let code = body["inviteCode"].as_str().unwrap().to_string();

        let (status, body) = app
            .json("POST", "/validate-invite", None, json!({"inviteCode": code}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["restaurantId"], "r1");

        for _ in 0..2 {
            let (status, body) = app
                .json("POST", "/mark-invite-used", None, json!({"inviteCode": code}))
                .await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.is_string());
        }

        let (status, _) = app
            .json("POST", "/validate-invite", None, json!({"inviteCode": code}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .json("POST", "/validate-invite", None, json!({"inviteCode": "nope"}))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .json("POST", "/validate-invite", None, json!({}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .json("POST", "/mark-invite-used", None, json!({"inviteCode": "nope"}))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_can_invite_anywhere() {
        let app = TestApp::new("").await;
        let admin = app.token("admin", None, Role::Admin).await;
        let (status, body) = app
            .json("POST", "/create-invite", Some(&admin), json!({"restaurantId": "r9"}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["inviteCode"].is_string());
    }

    #[tokio::test]
    async fn test_document_upload_and_highlights() {
        let app = TestApp::new("").await;
        let alice = app.token("alice", None, Role::Member).await;
        let bob = app.token("bob", None, Role::Member).await;

        let (status, doc) = app
            .upload(&alice, "Biology", b"Cells are the basic unit of life.")
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(doc["status"], "extracted");
        assert_eq!(doc["extractionMethod"], "plain");
        assert_eq!(doc["extractedText"], "Cells are the basic unit of life.");
        assert!(doc.get("filePath").is_none());
        let doc_id = doc["id"].as_str().unwrap().to_string();

        // Same bytes again: same document
        let (status, again) = app
            .upload(&alice, "Biology", b"Cells are the basic unit of life.")
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(again["id"], doc["id"]);

        let (status, _) = app.get(&format!("/api/documents/{}", doc_id), Some(&bob)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, list) = app.get("/api/documents", Some(&alice)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert!(list[0].get("extractedText").is_none());

        for (page, text) in [(2, "basic unit"), (1, "Cells"), (2, "of life")] {
            let (status, _) = app
                .json(
                    "POST",
                    "/api/highlights",
                    Some(&alice),
                    json!({"documentId": doc_id, "text": text, "page": page}),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, _) = app
            .json(
                "POST",
                "/api/highlights",
                Some(&bob),
                json!({"documentId": doc_id, "text": "mine now"}),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, page_two) = app
            .get(
                &format!("/api/highlights?documentId={}&page=2", doc_id),
                Some(&alice),
            )
            .await;
        assert_eq!(page_two.as_array().unwrap().len(), 2);

        // Reading highlights requires owning the document
        let (status, _) = app
            .get(&format!("/api/highlights?documentId={}", doc_id), Some(&bob))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = app
            .get(
                &format!("/api/highlights/grouped?documentId={}", doc_id),
                Some(&bob),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = app
            .get("/api/highlights?documentId=does-not-exist", Some(&alice))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app
            .get("/api/highlights/grouped?documentId=does-not-exist", Some(&alice))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, grouped) = app
            .get(
                &format!("/api/highlights/grouped?documentId={}", doc_id),
                Some(&alice),
            )
            .await;
        let pages = grouped["pages"].as_array().unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0]["page"], 1);
        assert_eq!(pages[1]["highlights"].as_array().unwrap().len(), 2);

        let highlight_id = pages[0]["highlights"][0]["id"].as_str().unwrap().to_string();
        let uri = format!("/api/highlights/{}", highlight_id);

        let (status, _) = app
            .json("PATCH", &uri, Some(&bob), json!({"note": "hijack"}))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, updated) = app
            .json("PATCH", &uri, Some(&alice), json!({"note": "Key definition"}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["note"], "Key definition");

        let request = Request::builder()
            .method("DELETE")
            .uri(&uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", alice))
            .body(Body::empty())
            .unwrap();
        let (status, _) = app.send(request).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = app
            .json("PATCH", &uri, Some(&alice), json!({"note": "gone"}))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_document_keeps_shared_file() {
        let app = TestApp::new(r#"[{"front": "Mitosis", "back": "Cell division"}]"#).await;
        let alice = app.token("alice", None, Role::Member).await;
        let bob = app.token("bob", None, Role::Member).await;
        let content: &'static [u8] = b"Mitosis splits one cell into two.";

        let (status, alice_doc) = app.upload(&alice, "Cells", content).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, bob_doc) = app.upload(&bob, "Cells", content).await;
        assert_eq!(status, StatusCode::CREATED);
        let alice_id = alice_doc["id"].as_str().unwrap().to_string();
        let bob_id = bob_doc["id"].as_str().unwrap().to_string();
        assert_ne!(alice_id, bob_id);

        let stored = app.ctx.documents().get(&alice_id).await.unwrap().unwrap();
        assert!(stored.file_path.exists());

        for (token, doc_id) in [(&alice, &alice_id), (&bob, &bob_id)] {
            let (status, _) = app
                .json(
                    "POST",
                    "/api/highlights",
                    Some(token),
                    json!({"documentId": doc_id, "text": "Mitosis", "page": 1}),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
            let (status, _) = app
                .json(
                    "POST",
                    "/api/generate-flashcards",
                    Some(token),
                    json!({"documentId": doc_id}),
                )
                .await;
            assert_eq!(status, StatusCode::OK);
        }

        let delete = |token: &str, id: &str| {
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/documents/{}", id))
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap()
        };

        let (status, _) = app.send(delete(&bob, &alice_id)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app.send(delete(&alice, &alice_id)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(stored.file_path.exists());
        assert!(app.ctx.documents().get(&alice_id).await.unwrap().is_none());
        assert!(app
            .ctx
            .highlights()
            .list(&alice_id, "alice", None)
            .await
            .unwrap()
            .is_empty());
        assert!(app
            .ctx
            .flashcards()
            .list_for_document(&alice_id, "alice")
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            app.ctx.highlights().list(&bob_id, "bob", None).await.unwrap().len(),
            1
        );

        let (status, _) = app.send(delete(&bob, &bob_id)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(!stored.file_path.exists());
        assert!(app
            .ctx
            .flashcards()
            .list_for_document(&bob_id, "bob")
            .await
            .unwrap()
            .is_empty());

        let (status, _) = app.send(delete(&bob, &bob_id)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_rejections() {
        let app = TestApp::with_limit("", 64).await;
        let token = app.token("alice", None, Role::Member).await;

        let request = Request::builder()
            .method("POST")
            .uri("/api/documents")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::from(&b"PK\x03\x04\x14\x00\x00\x00\x08\x00"[..]))
            .unwrap();
        let (status, _) = app.send(request).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let request = Request::builder()
            .method("POST")
            .uri("/api/documents")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from(vec![b'a'; 100]))
            .unwrap();
        let (status, body) = app.send(request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_document_quiz_shared_results() {
        let app = TestApp::new(QUIZ_RESPONSE).await;
        let alice = app.token("alice", None, Role::Member).await;
        let bob = app.token("bob", None, Role::Member).await;

        let (_, doc) = app
            .upload(&alice, "Plants", b"Photosynthesis happens in the chloroplast.")
            .await;
        let doc_id = doc["id"].as_str().unwrap();

        let (status, quiz) = app
            .json(
                "POST",
                &format!("/api/documents/{}/quiz", doc_id),
                Some(&alice),
                json!({}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(quiz["title"], "Plants");
        let quiz_id = quiz["id"].as_str().unwrap().to_string();

        // Shared link works without a token
        let (status, shared) = app.get(&format!("/api/quizzes/{}", quiz_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(shared["questions"].as_array().unwrap().len(), 2);

        let (status, result) = app
            .json(
                "POST",
                "/api/save-shared-quiz-result",
                Some(&bob),
                json!({"quizId": quiz_id, "answers": ["Chemical energy", "Nucleus"], "participantName": "Bob"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(result["score"], 1);
        assert_eq!(result["total"], 2);

        let (status, _) = app
            .get(&format!("/api/quizzes/{}/results", quiz_id), Some(&bob))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, results) = app
            .get(&format!("/api/quizzes/{}/results", quiz_id), Some(&alice))
            .await;
        assert_eq!(results.as_array().unwrap().len(), 1);
        assert_eq!(results[0]["shared"], true);
        assert_eq!(results[0]["participantName"], "Bob");

        let (_, mine) = app.get("/api/quiz-results", Some(&bob)).await;
        assert_eq!(mine.as_array().unwrap().len(), 1);

        let (status, _) = app
            .json(
                "POST",
                "/api/save-shared-quiz-result",
                Some(&bob),
                json!({"quizId": "missing", "answers": []}),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_flashcards_saved_for_document() {
        let app = TestApp::new(
            r#"{"flashcards": [{"front": "Osmosis", "back": "Water diffusion"}, {"front": " ", "back": "dropped"}]}"#,
        )
        .await;
        let alice = app.token("alice", None, Role::Member).await;
        let (_, doc) = app.upload(&alice, "Cells", b"Osmosis moves water.").await;
        let doc_id = doc["id"].as_str().unwrap();

        let (status, body) = app
            .json(
                "POST",
                "/api/generate-flashcards",
                Some(&alice),
                json!({"documentId": doc_id, "count": 5}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["flashcards"].as_array().unwrap().len(), 1);
        assert!(body["setId"].is_string());

        let (_, sets) = app
            .get(&format!("/api/documents/{}/flashcards", doc_id), Some(&alice))
            .await;
        assert_eq!(sets.as_array().unwrap().len(), 1);

        let (status, body) = app
            .json(
                "POST",
                "/api/generate-flashcards",
                Some(&alice),
                json!({"text": "Loose notes"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("setId").is_none());
    }

    #[tokio::test]
    async fn test_save_quiz_validates_questions() {
        let app = TestApp::new("").await;
        let alice = app.token("alice", None, Role::Member).await;

        let (status, _) = app
            .json(
                "POST",
                "/api/quizzes",
                Some(&alice),
                json!({"title": "Bad", "questions": [{"question": "Q", "options": ["a", "b"], "correctAnswer": "a"}]}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .json(
                "POST",
                "/api/quizzes",
                Some(&alice),
                json!({"title": "Good", "questions": [{"question": "Q", "options": ["a", "b", "c", "d"], "correctAnswer": "b"}]}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, quizzes) = app.get("/api/quizzes", Some(&alice)).await;
        assert_eq!(quizzes.as_array().unwrap().len(), 1);
    }
}
