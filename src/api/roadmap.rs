//! Roadmaps and progress tracking

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::career::assessed_session;
use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::types::{CareerTrack, RoadmapWeek};

#[derive(Debug, Serialize)]
pub struct TrackWithRoadmap {
    pub track: CareerTrack,
    pub roadmap: Vec<RoadmapWeek>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    pub week: u32,
    pub task: String,
    pub status: bool,
    /// Absent or null clears the stored link
    #[serde(default)]
    pub resource_link: Option<String>,
}

/// GET /roadmap/{track_id}
///
/// Returns the stored roadmap, generating and storing one on first request.
pub async fn get_roadmap(
    State(state): State<Arc<AppState>>,
    Path(track_id): Path<String>,
) -> ApiResult<TrackWithRoadmap> {
    let track = state
        .store
        .lock()
        .get_track(&track_id)?
        .ok_or_else(|| ApiError::not_found("Career track not found."))?;

    let (session, level) = assessed_session(&state, &track.session_id).map_err(|e| match e {
        ApiError::NotFound(_) => ApiError::not_found("Session not found for this track."),
        other => other,
    })?;

    let existing = state.store.lock().get_roadmap_for_track(&track_id)?;
    if let Some(roadmap) = existing {
        debug!("Serving stored roadmap {} for track {}", roadmap.id, track_id);
        return Ok(Json(TrackWithRoadmap {
            track,
            roadmap: roadmap.weeks,
        }));
    }

    let planned = state.agents.generate_roadmap(&session.domain, level).await;
    if planned.is_empty() {
        return Err(ApiError::Generation(
            "Failed to generate roadmap. Agent returned empty list or invalid format.".to_string(),
        ));
    }

    let weeks: Vec<RoadmapWeek> = planned.into_iter().map(RoadmapWeek::from).collect();
    state
        .store
        .lock()
        .insert_roadmap(&session.session_id, &track_id, &weeks)?;

    info!("Generated {}-week roadmap for {:?}", weeks.len(), track.title);
    Ok(Json(TrackWithRoadmap {
        track,
        roadmap: weeks,
    }))
}

/// GET /tracker/{session_id}
pub async fn get_tracker(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<Vec<RoadmapWeek>> {
    let roadmap = state
        .store
        .lock()
        .get_roadmap_for_session(&session_id)?
        .ok_or_else(|| ApiError::not_found("No roadmap found for this session."))?;

    Ok(Json(roadmap.weeks))
}

/// PATCH /tracker/{session_id}
///
/// Sets a task's completion and resource link, returning its week.
pub async fn update_tracker(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(update): Json<TaskUpdate>,
) -> ApiResult<RoadmapWeek> {
    let store = state.store.lock();

    let mut roadmap = store
        .get_roadmap_for_session(&session_id)?
        .ok_or_else(|| ApiError::not_found("No roadmap found for this session."))?;

    let week = apply_task_update(&mut roadmap.weeks, &update)
        .ok_or_else(|| ApiError::not_found("Task or week not found in the roadmap."))?;

    store.replace_roadmap_weeks(&roadmap.id, &roadmap.weeks)?;
    Ok(Json(week))
}

/// Update the first task matching week and text; returns a copy of its week
fn apply_task_update(weeks: &mut [RoadmapWeek], update: &TaskUpdate) -> Option<RoadmapWeek> {
    let week = weeks.iter_mut().find(|w| w.week == update.week)?;
    let task = week.tasks.iter_mut().find(|t| t.task == update.task)?;

    task.is_completed = update.status;
    task.resource_link = update.resource_link.clone();

    Some(week.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RoadmapTask;

    fn weeks() -> Vec<RoadmapWeek> {
        vec![RoadmapWeek {
            week: 2,
            tasks: vec![RoadmapTask {
                task: "Docker".to_string(),
                is_completed: false,
                resource_link: Some("https://www.youtube.com/watch?v=old".to_string()),
            }],
        }]
    }

    fn update(week: u32, task: &str, link: Option<&str>) -> TaskUpdate {
        TaskUpdate {
            week,
            task: task.to_string(),
            status: true,
            resource_link: link.map(str::to_string),
        }
    }

    #[test]
    fn test_apply_task_update_sets_and_clears_link() {
        let mut weeks = weeks();

        let week = apply_task_update(&mut weeks, &update(2, "Docker", Some("https://new"))).unwrap();
        assert!(week.tasks[0].is_completed);
        assert_eq!(week.tasks[0].resource_link.as_deref(), Some("https://new"));

        let week = apply_task_update(&mut weeks, &update(2, "Docker", None)).unwrap();
        assert!(week.tasks[0].resource_link.is_none());
        assert_eq!(weeks[0], week);
    }

    #[test]
    fn test_apply_task_update_unknown_target() {
        let mut weeks = weeks();
        assert!(apply_task_update(&mut weeks, &update(3, "Docker", None)).is_none());
        assert!(apply_task_update(&mut weeks, &update(2, "Kubernetes", None)).is_none());
    }
}
