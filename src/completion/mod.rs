pub mod client;
pub mod errors;
pub mod resolver;
pub mod types;

pub use client::{CompletionBackend, GeminiClient};
pub use errors::{CompletionError, FailureClass, classify};
pub use resolver::ModelResolver;
pub use types::{Completion, ModelCandidate};
