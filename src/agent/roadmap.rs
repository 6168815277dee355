//! Roadmap Generator Agent
//!
//! Produces a 12-week plan with one tutorial link per task where the model
//! can find one through search.

use super::fallback::no_roadmap;
use super::harness::{parse_records, AgentSpec};
use super::retry::AttemptFailure;
use super::schema::ROADMAP_SCHEMA;
use super::LearnerProfile;
use crate::types::PlannedWeek;

const SYSTEM_PROMPT: &str = r#"You are an AI specialized in creating structured learning roadmaps. For each task, you MUST try to find a relevant, high-quality online resource link. Prioritize finding YouTube video tutorials or playlists for each task. Use the provided search tool to find these resources.
Your final answer MUST be a complete and valid JSON array of objects, where each object has a 'week' (integer) and 'tasks' (array of task objects). Each task object MUST have 'task' (string) and 'resourceLink' (string, or null if no relevant link is found after searching).
Do NOT include any extra text or markdown backticks around the JSON.
Example:
[
    {
        "week": 1,
        "tasks": [
            {"task": "Learn HTML/CSS basics", "resourceLink": "https://www.youtube.com/watch?v=k_lG5k36fB4"},
            {"task": "Build DOM projects", "resourceLink": null}
        ]
    }
]"#;

/// Plan length in weeks
pub const ROADMAP_WEEKS: u32 = 12;

#[derive(Debug, Clone, Default)]
pub struct RoadmapSpec;

impl AgentSpec for RoadmapSpec {
    type Params = LearnerProfile;
    type Output = Vec<PlannedWeek>;

    const NAME: &'static str = "roadmap_generator";

    fn system_prompt(&self) -> String {
        SYSTEM_PROMPT.to_string()
    }

    fn user_prompt(&self, learner: &LearnerProfile) -> String {
        format!(
            "Generate a {weeks}-week learning roadmap for job readiness in 3 months based on the following: \
             Domain: {domain}, Level: {level} learner. \
             For each task, search for and provide one highly relevant YouTube tutorial or playlist link as a resource.",
            weeks = ROADMAP_WEEKS,
            domain = learner.domain,
            level = learner.level
        )
    }

    fn parse(&self, raw: &str) -> Result<Vec<PlannedWeek>, AttemptFailure> {
        parse_records(raw, &ROADMAP_SCHEMA)
    }

    fn fallback(&self, _learner: &LearnerProfile) -> Vec<PlannedWeek> {
        no_roadmap()
    }
}
