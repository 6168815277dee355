//! Domain intake and quiz submission

use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::types::{Question, QuizAnswer, SkillLevel};

/// Answers required for a level prediction
pub const REQUIRED_ANSWERS: usize = 10;

#[derive(Debug, Deserialize)]
pub struct DomainInput {
    pub domain: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitDomainResponse {
    pub session_id: String,
    pub quiz_id: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSubmission {
    pub session_id: String,
    pub quiz_id: String,
    pub answers: Vec<QuizAnswer>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelPredictionResponse {
    pub level: SkillLevel,
    pub next_step: &'static str,
}

/// POST /init-domain
///
/// Opens a session and generates its quiz. Question generation never fails;
/// a broken model yields placeholder questions.
pub async fn init_domain(
    State(state): State<Arc<AppState>>,
    Json(input): Json<DomainInput>,
) -> ApiResult<InitDomainResponse> {
    let domain = input.domain.trim();
    if domain.is_empty() {
        return Err(ApiError::bad_request("Domain must not be empty."));
    }

    let session = state.store.lock().create_session(domain)?;

    let questions = state
        .agents
        .generate_questions(domain, state.resume_context.as_deref())
        .await;

    let quiz = state.store.lock().create_quiz(&session.session_id, &questions)?;

    info!(
        "Session {} started for {:?} with {} questions",
        session.session_id,
        domain,
        questions.len()
    );

    Ok(Json(InitDomainResponse {
        session_id: session.session_id,
        quiz_id: quiz.id,
        questions,
    }))
}

/// POST /submit-answer
pub async fn submit_answers(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<QuizSubmission>,
) -> ApiResult<LevelPredictionResponse> {
    let quiz = state
        .store
        .lock()
        .get_quiz(&submission.quiz_id)?
        .filter(|quiz| quiz.session_id == submission.session_id)
        .ok_or_else(|| ApiError::not_found("Quiz not found"))?;

    if submission.answers.len() != REQUIRED_ANSWERS {
        return Err(ApiError::bad_request(format!(
            "Exactly {} answers must be submitted.",
            REQUIRED_ANSWERS
        )));
    }

    state.store.lock().save_answers(&quiz.id, &submission.answers)?;

    let level = state.agents.detect_level(&submission.answers).await;

    state.store.lock().set_level(&quiz.session_id, level)?;
    info!("Session {} classified as {}", quiz.session_id, level);

    Ok(Json(LevelPredictionResponse {
        level,
        next_step: "career-track-recommendation",
    }))
}
