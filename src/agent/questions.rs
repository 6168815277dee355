//! Strategy Question Agent
//!
//! Generates the assessment quiz for a domain.

use super::fallback::placeholder_questions;
use super::harness::{parse_records, AgentSpec};
use super::retry::AttemptFailure;
use super::schema::QUESTION_SCHEMA;
use crate::types::Question;

const SYSTEM_PROMPT: &str = "You are an expert career guidance AI. Your task is to generate assessment questions. \
Provide the output as a JSON array of objects, where each object has an 'id' (integer, starting from 1) \
and 'question' (string). Do NOT include markdown backticks or extra text.";

/// Input for question generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionParams {
    pub domain: String,
    /// Resume text used to tailor the questions
    pub resume_context: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct QuestionSpec;

impl AgentSpec for QuestionSpec {
    type Params = QuestionParams;
    type Output = Vec<Question>;

    const NAME: &'static str = "strategy_questions";

    fn system_prompt(&self) -> String {
        SYSTEM_PROMPT.to_string()
    }

    fn user_prompt(&self, params: &QuestionParams) -> String {
        format!(
            r#"Generate 10 strategy questions to assess a student's depth in {domain}.
Example:
[
    {{"id": 1, "question": "Question 1"}},
    {{"id": 2, "question": "Question 2"}}
]
Domain: {domain}"#,
            domain = params.domain
        )
    }

    fn context(&self, params: &QuestionParams) -> Option<String> {
        params
            .resume_context
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(|text| format!("The student's resume, for tailoring the questions:\n{}", text))
    }

    fn parse(&self, raw: &str) -> Result<Vec<Question>, AttemptFailure> {
        parse_records(raw, &QUESTION_SCHEMA)
    }

    fn fallback(&self, params: &QuestionParams) -> Vec<Question> {
        placeholder_questions(&params.domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(resume: Option<&str>) -> QuestionParams {
        QuestionParams {
            domain: "Frontend Developer".to_string(),
            resume_context: resume.map(str::to_string),
        }
    }

    #[test]
    fn test_prompt_mentions_domain() {
        let prompt = QuestionSpec.user_prompt(&params(None));
        assert!(prompt.contains("depth in Frontend Developer"));
        assert!(prompt.contains(r#"{"id": 1, "question": "Question 1"}"#));
    }

    #[test]
    fn test_context_from_resume() {
        assert!(QuestionSpec.context(&params(None)).is_none());
        assert!(QuestionSpec.context(&params(Some("   "))).is_none());

        let context = QuestionSpec.context(&params(Some("3 years of React"))).unwrap();
        assert!(context.contains("3 years of React"));
    }

    #[test]
    fn test_parse_questions() {
        let raw = r#"Here you go: [{"id":1,"question":"What is the virtual DOM?"},{"id":2,"question":"Explain hooks."}]"#;
        let questions = QuestionSpec.parse(raw).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].id, 2);
    }
}
