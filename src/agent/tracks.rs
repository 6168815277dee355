//! Career Track Recommender Agent

use super::fallback::no_tracks;
use super::harness::{parse_records, AgentSpec};
use super::retry::AttemptFailure;
use super::schema::TRACK_SCHEMA;
use super::LearnerProfile;
use crate::types::TrackRecommendation;

const SYSTEM_PROMPT: &str = "You are an expert career guidance AI. Your goal is to suggest 2-3 career roles \
based on the user's domain and skill level, enriching them with salary, skills, tools, and growth prospects \
using web search tools if necessary. Your final answer MUST be a JSON array of objects as per the example \
provided, without any extra text, preamble, or markdown backticks.";

#[derive(Debug, Clone, Default)]
pub struct TrackSpec;

impl AgentSpec for TrackSpec {
    type Params = LearnerProfile;
    type Output = Vec<TrackRecommendation>;

    const NAME: &'static str = "track_recommender";

    fn system_prompt(&self) -> String {
        SYSTEM_PROMPT.to_string()
    }

    fn user_prompt(&self, learner: &LearnerProfile) -> String {
        format!(
            r#"Suggest 2-3 career roles in the '{domain}' domain for a '{level}' learner.
Provide detailed information for each role, including average salary, key skills required, essential tools used, and potential career growth paths.
Utilize web search tools to gather accurate and up-to-date information.

For each role, provide:
- title: The job title.
- avgSalary: Average salary range (e.g., "8-12 LPA").
- skills: Key skills required.
- tools: Essential tools used in this role.
- growth: Potential career growth path.

Example:
[
    {{
        "title": "React Developer",
        "avgSalary": "8-12 LPA",
        "skills": ["React", "Redux"],
        "tools": ["Vite", "Next.js"],
        "growth": "Can become Frontend Architect"
    }}
]"#,
            domain = learner.domain,
            level = learner.level
        )
    }

    fn parse(&self, raw: &str) -> Result<Vec<TrackRecommendation>, AttemptFailure> {
        parse_records(raw, &TRACK_SCHEMA)
    }

    fn fallback(&self, _learner: &LearnerProfile) -> Vec<TrackRecommendation> {
        no_tracks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SkillLevel;

    #[test]
    fn test_prompt_mentions_domain_and_level() {
        let learner = LearnerProfile::new("Data Science", SkillLevel::Intermediate);
        let prompt = TrackSpec.user_prompt(&learner);
        assert!(prompt.contains("'Data Science' domain for a 'Intermediate' learner"));
    }

    #[test]
    fn test_parse_requires_title() {
        let raw = r#"[{"avgSalary":"8-12 LPA","skills":[],"tools":[],"growth":"Lead"}]"#;
        assert!(matches!(TrackSpec.parse(raw), Err(AttemptFailure::Validation(_))));
    }

    #[test]
    fn test_parse_tracks_in_fence() {
        let raw = "Based on my research:\n```json\n[{\"title\":\"ML Engineer\",\"avgSalary\":\"12-20 LPA\",\"skills\":[\"Python\"],\"tools\":[\"PyTorch\"],\"growth\":\"Staff ML Engineer\"}]\n```";
        let tracks = TrackSpec.parse(raw).unwrap();
        assert_eq!(tracks[0].title, "ML Engineer");
        assert_eq!(tracks[0].tools, vec!["PyTorch".to_string()]);
    }
}
