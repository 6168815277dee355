//! Domain Types
//!
//! Records shared by the agents, the store and the HTTP API.
//! Field names serialize in camelCase to match the web client.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A generated assessment question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(deserialize_with = "lenient_u32")]
    pub id: u32,
    pub question: String,
}

/// Read an integer the way models tend to write one: `3`, `3.0` or `"3"`
pub fn lenient_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    lenient_integer(&value)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| de::Error::custom(format!("expected a small non-negative integer, got {}", value)))
}

/// A learner's answer to one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAnswer {
    pub question: String,
    pub answer: String,
}

/// Skill level assigned from the quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    pub const ALL: [SkillLevel; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a string that is not one of the three literal levels
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized skill level: {0:?}")]
pub struct UnknownLevel(pub String);

impl FromStr for SkillLevel {
    type Err = UnknownLevel;

    /// Case-sensitive exact match
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| UnknownLevel(s.to_string()))
    }
}

/// Career track as recommended by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecommendation {
    pub title: String,
    pub avg_salary: String,
    pub skills: Vec<String>,
    pub tools: Vec<String>,
    pub growth: String,
}

/// Task inside a generated roadmap week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedTask {
    pub task: String,
    #[serde(default)]
    pub resource_link: Option<String>,
}

/// Generated roadmap week, before progress tracking is attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedWeek {
    #[serde(deserialize_with = "lenient_u32")]
    pub week: u32,
    pub tasks: Vec<PlannedTask>,
}

/// Persisted roadmap task with completion state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapTask {
    pub task: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub resource_link: Option<String>,
}

/// Persisted roadmap week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapWeek {
    pub week: u32,
    pub tasks: Vec<RoadmapTask>,
}

impl From<PlannedWeek> for RoadmapWeek {
    fn from(planned: PlannedWeek) -> Self {
        Self {
            week: planned.week,
            tasks: planned
                .tasks
                .into_iter()
                .map(|t| RoadmapTask {
                    task: t.task,
                    is_completed: false,
                    resource_link: t.resource_link,
                })
                .collect(),
        }
    }
}

/// Stored career track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerTrack {
    #[serde(rename = "_id")]
    pub id: String,
    pub session_id: String,
    pub title: String,
    pub avg_salary: String,
    pub skills: Vec<String>,
    pub tools: Vec<String>,
    pub growth: String,
    pub is_enrolled: bool,
}

/// Stored learner session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub domain: String,
    pub level: Option<SkillLevel>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Stored quiz
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    pub id: String,
    pub session_id: String,
    pub questions: Vec<Question>,
    pub answers: Vec<QuizAnswer>,
}

/// Stored roadmap for one track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roadmap {
    pub id: String,
    pub session_id: String,
    pub track_id: String,
    pub weeks: Vec<RoadmapWeek>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_id_accepts_loose_integers() {
        for raw in [r#"{"id": 3, "question": "Q"}"#, r#"{"id": 3.0, "question": "Q"}"#, r#"{"id": " 3", "question": "Q"}"#] {
            let question: Question = serde_json::from_str(raw).unwrap();
            assert_eq!(question.id, 3);
        }

        assert!(serde_json::from_str::<Question>(r#"{"id": 2.5, "question": "Q"}"#).is_err());
        assert!(serde_json::from_str::<Question>(r#"{"id": "three", "question": "Q"}"#).is_err());
        assert!(serde_json::from_str::<Question>(r#"{"id": -1, "question": "Q"}"#).is_err());
    }

    #[test]
    fn test_level_parse_is_exact() {
        assert_eq!("Advanced".parse::<SkillLevel>(), Ok(SkillLevel::Advanced));
        assert!("advanced".parse::<SkillLevel>().is_err());
        assert!(" Beginner".parse::<SkillLevel>().is_err());
    }

    #[test]
    fn test_level_serializes_as_literal() {
        let json = serde_json::to_string(&SkillLevel::Intermediate).unwrap();
        assert_eq!(json, "\"Intermediate\"");
    }

    #[test]
    fn test_track_uses_camel_case() {
        let raw = r#"{"title":"React Developer","avgSalary":"8-12 LPA","skills":["React"],"tools":["Vite"],"growth":"Architect"}"#;
        let track: TrackRecommendation = serde_json::from_str(raw).unwrap();
        assert_eq!(track.avg_salary, "8-12 LPA");
    }

    #[test]
    fn test_planned_week_into_roadmap_week() {
        let planned = PlannedWeek {
            week: 1,
            tasks: vec![PlannedTask {
                task: "Learn HTML".to_string(),
                resource_link: None,
            }],
        };
        let week = RoadmapWeek::from(planned);
        assert_eq!(week.week, 1);
        assert!(!week.tasks[0].is_completed);
        assert!(week.tasks[0].resource_link.is_none());
    }
}
