//! Career track recommendation and enrollment

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::types::{CareerTrack, Session, SkillLevel};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollTrackUpdate {
    pub is_enrolled: bool,
}

/// Session that has finished the quiz
pub(super) fn assessed_session(state: &AppState, session_id: &str) -> Result<(Session, SkillLevel), ApiError> {
    let session = state
        .store
        .lock()
        .get_session(session_id)?
        .ok_or_else(|| ApiError::not_found("Session not found"))?;

    let level = session.level.ok_or_else(|| {
        ApiError::bad_request("User level not yet determined. Complete the quiz first.")
    })?;

    Ok((session, level))
}

/// GET /career-tracks/{session_id}
///
/// Recommends tracks, merges them into the session's stored tracks and
/// returns all of them.
pub async fn get_career_tracks(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<Vec<CareerTrack>> {
    let (session, level) = assessed_session(&state, &session_id)?;

    let recommended = state.agents.recommend_tracks(&session.domain, level).await;
    if recommended.is_empty() {
        return Err(ApiError::Generation(
            "Failed to generate any career tracks. Agent returned empty list.".to_string(),
        ));
    }

    let tracks = {
        let store = state.store.lock();
        for track in &recommended {
            store.upsert_track(&session_id, track)?;
        }
        store.list_tracks(&session_id)?
    };

    info!(
        "Session {}: {} tracks recommended, {} stored",
        session_id,
        recommended.len(),
        tracks.len()
    );
    Ok(Json(tracks))
}

/// PATCH /career-tracks/{track_id}/enroll
pub async fn update_enrollment(
    State(state): State<Arc<AppState>>,
    Path(track_id): Path<String>,
    Json(update): Json<EnrollTrackUpdate>,
) -> ApiResult<CareerTrack> {
    let track = state
        .store
        .lock()
        .set_enrollment(&track_id, update.is_enrolled)?
        .ok_or_else(|| ApiError::not_found("Career track not found."))?;

    Ok(Json(track))
}
