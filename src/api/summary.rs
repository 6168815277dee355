//! Session summaries

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::types::{CareerTrack, RoadmapWeek, Session};

/// Track plus its roadmap, if one was generated
#[derive(Debug, Serialize)]
pub struct TrackSummary {
    #[serde(flatten)]
    pub track: CareerTrack,
    pub roadmap: Option<Vec<RoadmapWeek>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    #[serde(flatten)]
    pub session: Session,
    pub career_tracks: Vec<TrackSummary>,
}

/// GET /session-summary/{session_id}
pub async fn get_session_summary(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<SessionSummary> {
    let store = state.store.lock();

    let session = store
        .get_session(&session_id)?
        .ok_or_else(|| ApiError::not_found("Session not found."))?;

    let career_tracks = store
        .list_tracks(&session_id)?
        .into_iter()
        .map(|track| {
            let roadmap = store.get_roadmap_for_track(&track.id)?.map(|r| r.weeks);
            Ok(TrackSummary { track, roadmap })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Json(SessionSummary {
        session,
        career_tracks,
    }))
}

/// GET /session/{session_id}
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<Session> {
    let session = state
        .store
        .lock()
        .get_session(&session_id)?
        .ok_or_else(|| ApiError::not_found("Session not found."))?;
    Ok(Json(session))
}

/// GET /sessions
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Session>> {
    let sessions = state.store.lock().list_sessions()?;
    Ok(Json(sessions))
}
