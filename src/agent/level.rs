//! Level Detector Agent
//!
//! Classifies a learner from their quiz answers. The model answers with a
//! single word, so there is no JSON to extract.

use serde_json::Value;

use super::extract::extract_level;
use super::fallback::default_level;
use super::harness::AgentSpec;
use super::retry::AttemptFailure;
use super::schema::LEVEL_SCHEMA;
use crate::types::{QuizAnswer, SkillLevel};

const SYSTEM_PROMPT: &str =
    "You are an AI that classifies a student's skill level based on their quiz answers.";

#[derive(Debug, Clone, Default)]
pub struct LevelSpec;

impl AgentSpec for LevelSpec {
    type Params = [QuizAnswer];
    type Output = SkillLevel;

    const NAME: &'static str = "level_detector";

    fn system_prompt(&self) -> String {
        SYSTEM_PROMPT.to_string()
    }

    fn user_prompt(&self, answers: &[QuizAnswer]) -> String {
        let qa_pairs = answers
            .iter()
            .map(|qa| format!("Q: {}\nA: {}", qa.question, qa.answer))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Based on these {} QA pairs, classify the user as Beginner / Intermediate / Advanced.\n\
             Your response should be only one word: 'Beginner', 'Intermediate', or 'Advanced'.\n\
             QA Pairs:\n{}",
            answers.len(),
            qa_pairs
        )
    }

    fn parse(&self, raw: &str) -> Result<SkillLevel, AttemptFailure> {
        LEVEL_SCHEMA.check(&Value::String(raw.trim().to_string()))?;
        extract_level(raw).ok_or(AttemptFailure::Extraction)
    }

    fn fallback(&self, _answers: &[QuizAnswer]) -> SkillLevel {
        default_level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_pairs() {
        let answers = vec![
            QuizAnswer {
                question: "What is a closure?".to_string(),
                answer: "A function capturing its environment".to_string(),
            },
            QuizAnswer {
                question: "What is a promise?".to_string(),
                answer: "Not sure".to_string(),
            },
        ];
        let prompt = LevelSpec.user_prompt(&answers);

        assert!(prompt.contains("these 2 QA pairs"));
        assert!(prompt.contains("Q: What is a closure?\nA: A function capturing its environment"));
        assert!(prompt.contains("A: Not sure"));
    }

    #[test]
    fn test_prompt_from_borrowed_slice() {
        let answers = [QuizAnswer {
            question: "What is a lifetime?".to_string(),
            answer: "A scope for borrows".to_string(),
        }];
        let prompt = LevelSpec.user_prompt(&answers[..]);

        assert!(prompt.contains("these 1 QA pairs"));
        assert_eq!(LevelSpec.fallback(&[]), SkillLevel::Beginner);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(LevelSpec.parse("Advanced").unwrap(), SkillLevel::Advanced);
        assert_eq!(LevelSpec.parse("\n Intermediate \n").unwrap(), SkillLevel::Intermediate);
        assert!(matches!(
            LevelSpec.parse("Expert"),
            Err(AttemptFailure::Validation(_))
        ));
        assert!(LevelSpec.parse("beginner").is_err());
        assert!(LevelSpec.parse("The user is Advanced").is_err());
    }
}
