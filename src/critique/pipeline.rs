use std::sync::Arc;
use tracing::{Span, info, instrument, warn};

use crate::completion::{CompletionBackend, GeminiClient, ModelResolver};
use crate::config::CompletionConfig;
use crate::critique::{
    dtos::{CritiqueRequest, CritiqueResponse, Mode, SourceMeta},
    errors::CritiqueError,
    parse,
};
use crate::extractor::{self, Article};
use crate::{fetcher, prompt, text};

/// Extracted titles are headlines; anything longer is page furniture.
const TITLE_MAX_CHARS: usize = 200;

/// Runs one request from input to critique. Holds no per-request state.
pub struct CritiquePipeline {
    backend: Option<Arc<dyn CompletionBackend>>,
    resolver: ModelResolver,
}

impl CritiquePipeline {
    pub fn new(backend: Option<Arc<dyn CompletionBackend>>, resolver: ModelResolver) -> Self {
        Self { backend, resolver }
    }

    /// Build the production pipeline; a missing credential leaves the
    /// pipeline unconfigured rather than failing startup.
    pub fn from_config(config: &CompletionConfig) -> Self {
        let resolver = ModelResolver::new(config.models.clone(), config.strategy);
        let backend: Option<Arc<dyn CompletionBackend>> = match GeminiClient::new(config.clone()) {
            Ok(client) => Some(Arc::new(client)),
            Err(err) => {
                warn!(error = %err, "completion client unavailable; critiques will fail");
                None
            }
        };
        Self::new(backend, resolver)
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    #[instrument(skip_all, fields(mode = ?request.mode(), model = tracing::field::Empty))]
    pub async fn run(&self, request: CritiqueRequest) -> Result<CritiqueResponse, CritiqueError> {
        let backend = self.backend.as_deref().ok_or_else(|| {
            CritiqueError::Configuration("the completion API key is not configured".to_string())
        })?;

        let (article, source) = match request {
            CritiqueRequest::Text { title, body } => {
                let article = Article::new(text::normalize(&title), text::normalize(&body));
                if article.is_empty() {
                    return Err(CritiqueError::InvalidRequest(
                        "title or body is required in text mode".to_string(),
                    ));
                }
                let source = SourceMeta {
                    mode: Mode::Text,
                    url: None,
                    title: None,
                };
                (article, source)
            }
            CritiqueRequest::Url { url } => {
                let page = fetcher::fetch(url.as_str()).await?;
                info!(
                    url = %page.url_final,
                    charset = page.charset.name(),
                    fetched_at = %page.fetched_at,
                    "page fetched"
                );

                let article = normalize_extracted(extractor::extract(&page.body_utf8));
                if article.is_empty() {
                    return Err(CritiqueError::ExtractionFailure(
                        "no title or body could be extracted from the page".to_string(),
                    ));
                }
                let source = SourceMeta {
                    mode: Mode::Url,
                    url: Some(url.to_string()),
                    title: Some(article.title.clone()).filter(|t| !t.is_empty()),
                };
                (article, source)
            }
        };

        let prompt = prompt::build(&article.title, &article.body);
        let completion = self.resolver.complete(backend, &prompt).await?;
        Span::current().record("model", completion.model.as_str());

        let critique = parse::parse_critique(&completion.text)?;

        Ok(CritiqueResponse {
            ok: true,
            critique,
            source,
            used_model: Some(completion.model),
        })
    }
}

fn normalize_extracted(article: Article) -> Article {
    Article {
        title: text::normalize_with_limit(&article.title, TITLE_MAX_CHARS),
        body: text::normalize(&article.body),
    }
}
