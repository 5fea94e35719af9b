use crate::critique::CritiquePipeline;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<CritiquePipeline>,
}

impl AppState {
    pub fn new(pipeline: CritiquePipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}
