//! Router configuration for the API server.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/health", get(handlers::health))
        // Quiz generation and invites
        .route("/generate-quiz", post(handlers::generate_quiz))
        .route("/create-invite", post(handlers::create_invite))
        .route("/validate-invite", post(handlers::validate_invite))
        .route("/mark-invite-used", post(handlers::mark_invite_used))
        // Highlights
        .route(
            "/api/highlights",
            post(handlers::create_highlight).get(handlers::list_highlights),
        )
        .route("/api/highlights/grouped", get(handlers::grouped_highlights))
        .route(
            "/api/highlights/:id",
            patch(handlers::update_highlight).delete(handlers::delete_highlight),
        )
        // Documents
        .route(
            "/api/documents",
            post(handlers::upload_document).get(handlers::list_documents),
        )
        .route(
            "/api/documents/:id",
            get(handlers::get_document).delete(handlers::delete_document),
        )
        .route(
            "/api/documents/:id/quiz",
            post(handlers::generate_document_quiz),
        )
        .route(
            "/api/documents/:id/flashcards",
            get(handlers::list_flashcard_sets),
        )
        // AI helpers
        .route("/api/generate-flashcards", post(handlers::generate_flashcards))
        .route("/api/refine-text", post(handlers::refine_text))
        // Saved quizzes and results
        .route(
            "/api/quizzes",
            post(handlers::save_quiz).get(handlers::list_quizzes),
        )
        .route("/api/quizzes/:id", get(handlers::get_quiz))
        .route("/api/quizzes/:id/results", get(handlers::quiz_results))
        .route(
            "/api/save-shared-quiz-result",
            post(handlers::save_shared_quiz_result),
        )
        .route("/api/quiz-results", get(handlers::my_results))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
