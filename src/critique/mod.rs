pub mod dtos;
pub mod errors;
pub mod handlers;
pub mod parse;
pub mod pipeline;

pub use dtos::{CritiqueRequest, CritiqueResponse, CritiqueResult, Mode, SourceMeta};
pub use errors::CritiqueError;
pub use pipeline::CritiquePipeline;
