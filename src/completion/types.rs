use serde::{Deserialize, Serialize};

/// A model advertised by the completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCandidate {
    pub identifier: String,
    pub supports_completion: bool,
}

impl ModelCandidate {
    pub fn new(identifier: impl Into<String>, supports_completion: bool) -> Self {
        Self {
            identifier: identifier.into(),
            supports_completion,
        }
    }
}

/// Text produced by the service, and the model that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub model: String,
}
