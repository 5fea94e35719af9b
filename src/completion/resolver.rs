use tracing::{info, instrument, warn};

use crate::completion::{
    client::CompletionBackend,
    errors::{CompletionError, FailureClass},
    types::{Completion, ModelCandidate},
};
use crate::config::ModelStrategy;

/// Chooses which model to call and runs the generation against it.
#[derive(Debug, Clone)]
pub struct ModelResolver {
    priority: Vec<String>,
    strategy: ModelStrategy,
}

impl ModelResolver {
    pub fn new(priority: Vec<String>, strategy: ModelStrategy) -> Self {
        Self { priority, strategy }
    }

    /// Generate `prompt` with whichever model the strategy settles on.
    ///
    /// Fails with [`CompletionError::ModelUnavailable`] when no model could
    /// be used; any request-level failure is returned as-is.
    #[instrument(skip(self, backend, prompt), fields(strategy = ?self.strategy))]
    pub async fn complete(
        &self,
        backend: &dyn CompletionBackend,
        prompt: &str,
    ) -> Result<Completion, CompletionError> {
        match self.strategy {
            ModelStrategy::Fallback => self.complete_with_fallback(backend, prompt).await,
            ModelStrategy::Discover => {
                let model = self.discover(backend).await?;
                let text = backend.generate(&model, prompt).await?;
                info!(model = %model, chars = text.len(), "completion received");
                Ok(Completion { text, model })
            }
        }
    }

    /// Try each model of the priority list in turn.
    async fn complete_with_fallback(
        &self,
        backend: &dyn CompletionBackend,
        prompt: &str,
    ) -> Result<Completion, CompletionError> {
        let mut last_error = None;

        for model in &self.priority {
            match backend.generate(model, prompt).await {
                Ok(text) => {
                    info!(model = %model, chars = text.len(), "completion received");
                    return Ok(Completion {
                        text,
                        model: model.clone(),
                    });
                }
                Err(err) if err.class() == FailureClass::NextCandidate => {
                    warn!(model = %model, error = %err, "model unavailable, trying next");
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(CompletionError::ModelUnavailable(match last_error {
            Some(err) => format!(
                "none of {} candidate models accepted the request (last error: {err})",
                self.priority.len()
            ),
            None => "the model priority list is empty".to_string(),
        }))
    }

    /// Ask the service which models can generate and pick one of them.
    pub async fn discover(&self, backend: &dyn CompletionBackend) -> Result<String, CompletionError> {
        let available: Vec<ModelCandidate> = backend
            .list_models()
            .await?
            .into_iter()
            .filter(|m| m.supports_completion)
            .collect();

        let model = select(&self.priority, &available).ok_or_else(|| {
            CompletionError::ModelUnavailable(
                "the service lists no model that supports generation".to_string(),
            )
        })?;

        info!(model = %model, available = available.len(), "selected model");
        Ok(model)
    }
}

/// Highest-priority model present in `available`, else the first available.
///
/// A preferred name matches an identifier exactly or as its final path
/// segment (`gemini-pro` matches `tunedModels/gemini-pro`).
pub fn select(priority: &[String], available: &[ModelCandidate]) -> Option<String> {
    priority
        .iter()
        .find_map(|preferred| {
            available.iter().find(|m| {
                m.identifier == *preferred
                    || m.identifier.ends_with(&format!("/{preferred}"))
            })
        })
        .or_else(|| available.first())
        .map(|m| m.identifier.clone())
}
