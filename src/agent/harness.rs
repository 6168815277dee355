//! Agent Harness
//!
//! Binds one prompt builder, schema and fallback to the shared retry
//! pipeline. `Agent<S>` holds only static configuration; each `generate`
//! call is independent.

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

use super::extract::{extract_json_array, preview};
use super::retry::{AttemptFailure, RetryOrchestrator, RetryPolicy};
use super::schema::Schema;
use crate::model::{ModelInvoker, ModelProfile, ModelRequest};

/// What distinguishes one agent from another
pub trait AgentSpec: Send + Sync {
    type Params: Send + Sync + ?Sized;
    type Output: Send;

    /// Name used in logs
    const NAME: &'static str;

    fn system_prompt(&self) -> String;

    /// Pure function of the parameters
    fn user_prompt(&self, params: &Self::Params) -> String;

    /// Enrichment context passed alongside the prompts
    fn context(&self, _params: &Self::Params) -> Option<String> {
        None
    }

    /// Extract and validate one raw model answer
    fn parse(&self, raw: &str) -> Result<Self::Output, AttemptFailure>;

    /// Schema-valid value for when every attempt failed
    fn fallback(&self, params: &Self::Params) -> Self::Output;
}

/// An `AgentSpec` wired to a model and retry policy
pub struct Agent<S: AgentSpec> {
    spec: S,
    model: Arc<dyn ModelInvoker>,
    profile: ModelProfile,
    orchestrator: RetryOrchestrator,
}

impl<S: AgentSpec> Agent<S> {
    pub fn new(spec: S, model: Arc<dyn ModelInvoker>, profile: ModelProfile, policy: RetryPolicy) -> Self {
        Self {
            spec,
            model,
            profile,
            orchestrator: RetryOrchestrator::new(policy),
        }
    }

    pub fn spec(&self) -> &S {
        &self.spec
    }

    pub fn profile(&self) -> &ModelProfile {
        &self.profile
    }

    /// Build the model request for `params`
    pub fn request(&self, params: &S::Params) -> ModelRequest {
        ModelRequest {
            system_prompt: self.spec.system_prompt(),
            user_prompt: self.spec.user_prompt(params),
            context: self.spec.context(params),
            profile: self.profile.clone(),
        }
    }

    /// Run the pipeline. Never fails: exhaustion yields the fallback.
    pub async fn generate(&self, params: &S::Params) -> S::Output {
        let request = self.request(params);
        let request = &request;
        let model = &self.model;

        let result = self
            .orchestrator
            .run(S::NAME, move || model.invoke(request), |raw| self.spec.parse(raw))
            .await;

        match result {
            Ok(output) => output,
            Err(exhausted) => {
                warn!("{}; returning fallback", exhausted);
                self.spec.fallback(params)
            }
        }
    }
}

/// Shared parse step for array-shaped answers: extract, validate, decode.
///
/// An empty array is a valid answer; callers decide what "nothing" means.
pub fn parse_records<T: DeserializeOwned>(raw: &str, schema: &Schema) -> Result<Vec<T>, AttemptFailure> {
    let candidate = extract_json_array(raw).ok_or_else(|| {
        debug!("No JSON array in output: {}", preview(raw, 500));
        AttemptFailure::Extraction
    })?;

    schema.check(&candidate)?;

    serde_json::from_value(candidate).map_err(|e| AttemptFailure::Validation(e.to_string()))
}
