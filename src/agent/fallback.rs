//! Fallback Values
//!
//! What each agent returns once every attempt has failed. All values pass
//! their agent's schema. Questions and level always come back complete;
//! tracks and roadmaps come back empty so callers can surface the failure
//! instead of presenting invented salaries or study plans.

use crate::types::{PlannedWeek, Question, SkillLevel, TrackRecommendation};

/// Number of placeholder questions, matching a full quiz
pub const FALLBACK_QUESTION_COUNT: u32 = 10;

/// Placeholder quiz naming the domain, so degraded output is recognizable
pub fn placeholder_questions(domain: &str) -> Vec<Question> {
    (1..=FALLBACK_QUESTION_COUNT)
        .map(|id| Question {
            id,
            question: format!("Error-fallback question {} for {}", id, domain),
        })
        .collect()
}

/// Least-overreaching level
pub fn default_level() -> SkillLevel {
    SkillLevel::Beginner
}

pub fn no_tracks() -> Vec<TrackRecommendation> {
    Vec::new()
}

pub fn no_roadmap() -> Vec<PlannedWeek> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::schema::{validate, LEVEL_SCHEMA, QUESTION_SCHEMA, ROADMAP_SCHEMA, TRACK_SCHEMA};

    #[test]
    fn test_placeholder_questions() {
        let questions = placeholder_questions("Data Science");

        assert_eq!(questions.len(), 10);
        for (i, q) in questions.iter().enumerate() {
            assert_eq!(q.id, i as u32 + 1);
            assert!(q.question.contains("Data Science"));
        }
        assert_eq!(questions[0].question, "Error-fallback question 1 for Data Science");
    }

    #[test]
    fn test_fallbacks_pass_their_schemas() {
        let questions = serde_json::to_value(placeholder_questions("Rust")).unwrap();
        assert!(validate(&questions, &QUESTION_SCHEMA));

        let level = serde_json::to_value(default_level()).unwrap();
        assert!(validate(&level, &LEVEL_SCHEMA));

        let tracks = serde_json::to_value(no_tracks()).unwrap();
        assert!(validate(&tracks, &TRACK_SCHEMA));

        let roadmap = serde_json::to_value(no_roadmap()).unwrap();
        assert!(validate(&roadmap, &ROADMAP_SCHEMA));
    }
}
