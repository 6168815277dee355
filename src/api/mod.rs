//! Career Pathfinder HTTP API
//!
//! Routes:
//! - GET /                                  - Welcome message
//! - GET /health, /healthz, /readyz         - Health probes
//! - POST /init-domain                      - Start a session and quiz
//! - POST /submit-answer (/submit-answers)  - Submit answers, detect level
//! - GET /career-tracks/{session_id}        - Recommend and list tracks
//! - PATCH /career-tracks/{track_id}/enroll - Set enrollment
//! - GET /roadmap/{track_id}                - Track with its roadmap
//! - GET|PATCH /tracker/{session_id}        - Progress checklist
//! - GET /session-summary/{session_id}      - Session, tracks and roadmaps
//! - GET /session/{session_id}              - Session details
//! - GET /sessions                          - All sessions

pub mod career;
pub mod error;
pub mod health;
pub mod quiz;
pub mod roadmap;
pub mod summary;

use axum::{
    routing::{get, patch, post},
    Router,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

use crate::agent::CareerAgents;
use crate::store::PathfinderStore;

pub use error::{ApiError, ErrorResponse};

/// Application state shared across handlers.
///
/// The store lock is never held across an `.await`; agent calls run
/// without it.
pub struct AppState {
    pub store: Mutex<PathfinderStore>,
    pub agents: CareerAgents,
    /// Resume text offered to the question agent
    pub resume_context: Option<String>,
    pub start_time: Instant,
    pub version: &'static str,
}

impl AppState {
    pub fn new(store: PathfinderStore, agents: CareerAgents, resume_context: Option<String>) -> Self {
        Self {
            store: Mutex::new(store),
            agents,
            resume_context,
            start_time: Instant::now(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// Create the API router
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health::welcome))
        .route("/health", get(health::health_check))
        .route("/healthz", get(health::liveness))
        .route("/readyz", get(health::readiness))
        .route("/init-domain", post(quiz::init_domain))
        .route("/submit-answer", post(quiz::submit_answers))
        .route("/submit-answers", post(quiz::submit_answers))
        .route("/career-tracks/{id}", get(career::get_career_tracks))
        .route("/career-tracks/{id}/enroll", patch(career::update_enrollment))
        .route("/roadmap/{track_id}", get(roadmap::get_roadmap))
        .route(
            "/tracker/{session_id}",
            get(roadmap::get_tracker).patch(roadmap::update_tracker),
        )
        .route("/session-summary/{session_id}", get(summary::get_session_summary))
        .route("/session/{session_id}", get(summary::get_session))
        .route("/sessions", get(summary::list_sessions))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentProfiles, RetryPolicy};
    use crate::model::{InvocationError, ModelInvoker, ModelRequest};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    /// Answers by agent, recognised from the system prompt
    struct CannedModel {
        tracks: &'static str,
    }

    #[async_trait]
    impl ModelInvoker for CannedModel {
        async fn invoke(&self, request: &ModelRequest) -> Result<String, InvocationError> {
            let system = request.system_prompt.as_str();
            if system.contains("classifies") {
                Ok("Intermediate".to_string())
            } else if system.contains("roadmaps") {
                Ok(r#"[{"week":1,"tasks":[{"task":"Learn Python","resourceLink":"https://www.youtube.com/watch?v=py"}]}]"#.to_string())
            } else if system.contains("assessment questions") {
                Ok(r#"[{"id":1,"question":"What is a DataFrame?"}]"#.to_string())
            } else {
                Ok(self.tracks.to_string())
            }
        }
    }

    const TRACKS: &str = r#"[{"title":"Data Analyst","avgSalary":"6-10 LPA","skills":["SQL"],"tools":["Excel"],"growth":"Analytics Manager"}]"#;

    fn test_state(tracks: &'static str) -> Arc<AppState> {
        let agents = CareerAgents::new(
            Arc::new(CannedModel { tracks }),
            AgentProfiles::new("fast", "research"),
            RetryPolicy::new(1, Duration::ZERO),
        );
        let store = PathfinderStore::open_in_memory().unwrap();
        Arc::new(AppState::new(store, agents, None))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn ten_answers() -> Value {
        let answers: Vec<Value> = (1..=10)
            .map(|i| json!({"question": format!("Q{}", i), "answer": "A"}))
            .collect();
        Value::Array(answers)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = api_router(test_state(TRACKS));

        let (status, json) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert!(json["uptime_secs"].is_number());

        let (status, _) = send(&app, "GET", "/readyz", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_full_flow() {
        let app = api_router(test_state(TRACKS));

        let (status, init) = send(&app, "POST", "/init-domain", Some(json!({"domain": "Data Science"}))).await;
        assert_eq!(status, StatusCode::OK);
        let session_id = init["sessionId"].as_str().unwrap().to_string();
        let quiz_id = init["quizId"].as_str().unwrap().to_string();
        assert_eq!(init["questions"][0]["question"], "What is a DataFrame?");

        // Tracks before the quiz is done
        let (status, _) = send(&app, "GET", &format!("/career-tracks/{}", session_id), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, level) = send(
            &app,
            "POST",
            "/submit-answers",
            Some(json!({"sessionId": session_id, "quizId": quiz_id, "answers": ten_answers()})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(level["level"], "Intermediate");
        assert_eq!(level["nextStep"], "career-track-recommendation");

        let (status, tracks) = send(&app, "GET", &format!("/career-tracks/{}", session_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(tracks[0]["title"], "Data Analyst");
        assert_eq!(tracks[0]["isEnrolled"], false);
        let track_id = tracks[0]["_id"].as_str().unwrap().to_string();

        let (status, enrolled) = send(
            &app,
            "PATCH",
            &format!("/career-tracks/{}/enroll", track_id),
            Some(json!({"isEnrolled": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(enrolled["isEnrolled"], true);

        let (status, roadmap) = send(&app, "GET", &format!("/roadmap/{}", track_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(roadmap["track"]["_id"], track_id.as_str());
        assert_eq!(roadmap["roadmap"][0]["tasks"][0]["isCompleted"], false);

        let (status, week) = send(
            &app,
            "PATCH",
            &format!("/tracker/{}", session_id),
            Some(json!({"week": 1, "task": "Learn Python", "status": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(week["tasks"][0]["isCompleted"], true);
        assert!(week["tasks"][0]["resourceLink"].is_null());

        let (status, tracker) = send(&app, "GET", &format!("/tracker/{}", session_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(tracker[0]["tasks"][0]["isCompleted"], true);

        let (status, summary) = send(&app, "GET", &format!("/session-summary/{}", session_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["level"], "Intermediate");
        assert_eq!(summary["careerTracks"][0]["isEnrolled"], true);
        assert_eq!(summary["careerTracks"][0]["roadmap"][0]["week"], 1);

        let (status, sessions) = send(&app, "GET", "/sessions", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sessions.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_requires_ten_answers() {
        let app = api_router(test_state(TRACKS));
        let (_, init) = send(&app, "POST", "/init-domain", Some(json!({"domain": "Web"}))).await;

        let (status, json) = send(
            &app,
            "POST",
            "/submit-answer",
            Some(json!({
                "sessionId": init["sessionId"],
                "quizId": init["quizId"],
                "answers": [{"question": "Q1", "answer": "A"}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "BAD_REQUEST");

        let (status, _) = send(
            &app,
            "POST",
            "/submit-answer",
            Some(json!({"sessionId": "other", "quizId": init["quizId"], "answers": ten_answers()})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_blank_domain_rejected() {
        let app = api_router(test_state(TRACKS));
        let (status, json) = send(&app, "POST", "/init-domain", Some(json!({"domain": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["message"].as_str().unwrap().contains("Domain"));
    }

    #[tokio::test]
    async fn test_empty_tracks_is_server_error() {
        let state = test_state("no tracks today");
        let app = api_router(state.clone());

        let session_id = {
            let store = state.store.lock();
            let session = store.create_session("Design").unwrap();
            store
                .set_level(&session.session_id, crate::types::SkillLevel::Beginner)
                .unwrap();
            session.session_id
        };

        let (status, json) = send(&app, "GET", &format!("/career-tracks/{}", session_id), None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "GENERATION_FAILED");
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let app = api_router(test_state(TRACKS));

        for uri in ["/session/nope", "/session-summary/nope", "/tracker/nope", "/roadmap/nope", "/career-tracks/nope"] {
            let (status, json) = send(&app, "GET", uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
            assert_eq!(json["error"], "NOT_FOUND");
        }

        let (status, _) = send(
            &app,
            "PATCH",
            "/career-tracks/nope/enroll",
            Some(json!({"isEnrolled": true})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
