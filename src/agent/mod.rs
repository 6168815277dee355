//! Career Agents
//!
//! Four agents share one pipeline and differ only in prompt, schema and
//! fallback:
//!
//! ```text
//! generate(params) ──► RetryOrchestrator ──► ModelInvoker::invoke
//!                            │                     │
//!                            │◄── extract ◄── raw text
//!                            │◄── validate
//!                            ▼
//!                   value  or  fallback (after N failed attempts)
//! ```
//!
//! None of the entry points return errors. Total failure is signalled by
//! the fallback value and a `warn` log line per failed attempt.

pub mod extract;
pub mod fallback;
pub mod harness;
pub mod level;
pub mod questions;
pub mod retry;
pub mod roadmap;
pub mod schema;
pub mod tracks;

use std::sync::Arc;

use crate::config::Config;
use crate::model::{ModelInvoker, ModelProfile};
use crate::types::{PlannedWeek, Question, QuizAnswer, SkillLevel, TrackRecommendation};

pub use extract::{extract_json_array, extract_level};
pub use harness::{parse_records, Agent, AgentSpec};
pub use level::LevelSpec;
pub use questions::{QuestionParams, QuestionSpec};
pub use retry::{AttemptFailure, Exhausted, RetryOrchestrator, RetryPolicy};
pub use roadmap::RoadmapSpec;
pub use schema::{validate, FieldKind, FieldSpec, RecordSchema, Schema, Violation};
pub use tracks::TrackSpec;

/// Domain and level, the input to track and roadmap generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnerProfile {
    pub domain: String,
    pub level: SkillLevel,
}

impl LearnerProfile {
    pub fn new(domain: &str, level: SkillLevel) -> Self {
        Self {
            domain: domain.to_string(),
            level,
        }
    }
}

/// Model settings for each agent
#[derive(Debug, Clone, PartialEq)]
pub struct AgentProfiles {
    pub questions: ModelProfile,
    pub level: ModelProfile,
    pub tracks: ModelProfile,
    pub roadmap: ModelProfile,
}

impl AgentProfiles {
    /// Fast model for the quiz, search-enabled research model for tracks and roadmap
    pub fn new(fast_model: &str, research_model: &str) -> Self {
        Self {
            questions: ModelProfile::new(fast_model),
            level: ModelProfile::new(fast_model),
            tracks: ModelProfile::new(research_model).with_search(5),
            roadmap: ModelProfile::new(research_model)
                .with_temperature(0.5)
                .with_max_tokens(4096)
                .with_search(3),
        }
    }
}

/// The four agents behind the career flow
pub struct CareerAgents {
    questions: Agent<QuestionSpec>,
    level: Agent<LevelSpec>,
    tracks: Agent<TrackSpec>,
    roadmap: Agent<RoadmapSpec>,
}

impl CareerAgents {
    pub fn new(model: Arc<dyn ModelInvoker>, profiles: AgentProfiles, policy: RetryPolicy) -> Self {
        Self {
            questions: Agent::new(QuestionSpec, model.clone(), profiles.questions, policy.clone()),
            level: Agent::new(LevelSpec, model.clone(), profiles.level, policy.clone()),
            tracks: Agent::new(TrackSpec, model.clone(), profiles.tracks, policy.clone()),
            roadmap: Agent::new(RoadmapSpec, model, profiles.roadmap, policy),
        }
    }

    /// Create from config
    pub fn from_config(config: &Config, model: Arc<dyn ModelInvoker>) -> Self {
        Self::new(
            model,
            AgentProfiles::new(&config.fast_model, &config.research_model),
            config.retry_policy(),
        )
    }

    /// Assessment questions for a domain, optionally tailored to a resume
    pub async fn generate_questions(&self, domain: &str, resume_context: Option<&str>) -> Vec<Question> {
        let params = QuestionParams {
            domain: domain.to_string(),
            resume_context: resume_context.map(str::to_string),
        };
        self.questions.generate(&params).await
    }

    /// Classify a learner from their answers
    pub async fn detect_level(&self, answers: &[QuizAnswer]) -> SkillLevel {
        self.level.generate(answers).await
    }

    /// Career tracks for a domain and level; empty on total failure
    pub async fn recommend_tracks(&self, domain: &str, level: SkillLevel) -> Vec<TrackRecommendation> {
        self.tracks.generate(&LearnerProfile::new(domain, level)).await
    }

    /// Week-by-week plan for a domain and level; empty on total failure
    pub async fn generate_roadmap(&self, domain: &str, level: SkillLevel) -> Vec<PlannedWeek> {
        self.roadmap.generate(&LearnerProfile::new(domain, level)).await
    }
}
