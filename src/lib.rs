//! Career Pathfinder
//!
//! Agentic career guidance API built around a tolerant LLM output pipeline.
//!
//! # Features
//!
//! - **Assessment**: domain-specific quiz generation, optionally tailored to a resume
//! - **Level Detection**: Beginner / Intermediate / Advanced from quiz answers
//! - **Career Tracks**: search-backed role recommendations with salary and skills
//! - **Roadmaps**: 12-week plans with tutorial links and progress tracking
//!
//! # Architecture
//!
//! ```text
//! HTTP (axum) ──► CareerAgents ──► RetryOrchestrator ──► GroqClient ──► Groq API
//!      │                │                                   │
//!      │                ├── extract (fenced / bare JSON)    └── web_search ──► Tavily
//!      │                ├── validate (declarative schema)
//!      │                └── fallback (after N failures)
//!      └── PathfinderStore (SQLite)
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod groq;
pub mod model;
pub mod search;
pub mod server;
pub mod store;
pub mod types;

pub use agent::{AgentProfiles, CareerAgents, RetryPolicy};
pub use config::Config;
pub use groq::GroqClient;
pub use model::{InvocationError, ModelInvoker, ModelProfile, ModelRequest};
pub use search::{TavilyClient, WebSearch};
pub use server::PathfinderServer;
pub use store::PathfinderStore;
pub use types::{
    CareerTrack, PlannedTask, PlannedWeek, Question, QuizAnswer, RoadmapTask, RoadmapWeek,
    Session, SkillLevel, TrackRecommendation,
};
