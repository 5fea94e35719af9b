use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;
use utoipa::ToSchema;

static HTTP_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://[^\s/$.?#][^\s]*$").expect("Failed to compile url regex")
});

const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Text,
    Url,
}

/// Request body as it arrives; checked by [`CritiqueRequestBody::validate`].
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CritiqueRequestBody {
    /// `"text"` or `"url"`.
    pub mode: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub url: Option<String>,
}

/// A validated request: exactly one input shape per mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CritiqueRequest {
    Text { title: String, body: String },
    Url { url: Url },
}

impl CritiqueRequest {
    pub fn mode(&self) -> Mode {
        match self {
            Self::Text { .. } => Mode::Text,
            Self::Url { .. } => Mode::Url,
        }
    }
}

impl CritiqueRequestBody {
    pub fn validate(self) -> Result<CritiqueRequest, String> {
        match self.mode.as_deref() {
            Some("text") => {
                let title = self.title.unwrap_or_default();
                let body = self.body.unwrap_or_default();
                if title.trim().is_empty() && body.trim().is_empty() {
                    return Err("title or body is required in text mode".to_string());
                }
                Ok(CritiqueRequest::Text { title, body })
            }
            Some("url") => {
                let raw = self.url.unwrap_or_default();
                let raw = raw.trim();
                if raw.is_empty() {
                    return Err("url is required in url mode".to_string());
                }
                if raw.len() > MAX_URL_LENGTH {
                    return Err("url is too long".to_string());
                }
                if !HTTP_URL_REGEX.is_match(raw) {
                    return Err("url must be an absolute http(s) URL".to_string());
                }
                let url = Url::parse(raw).map_err(|e| format!("url is invalid: {e}"))?;
                Ok(CritiqueRequest::Url { url })
            }
            _ => Err("mode must be \"text\" or \"url\"".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TitleFeedback {
    /// Requested as 1-10; null when the model's value wasn't a number.
    pub score: Option<i64>,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FeedbackPoint {
    pub point: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CritiqueResult {
    pub title_feedback: TitleFeedback,
    pub overall_score: Option<i64>,
    pub overall_comment: String,
    /// Title rewrite, experiential specificity, originality, structure, coverage.
    pub feedback_points: Vec<FeedbackPoint>,
}

/// Where the critiqued text came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SourceMeta {
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CritiqueResponse {
    pub ok: bool,
    pub critique: CritiqueResult,
    pub source: SourceMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_model: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(mode: &str) -> CritiqueRequestBody {
        CritiqueRequestBody {
            mode: Some(mode.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_text_request_valid() {
        let request = CritiqueRequestBody {
            title: Some("T".to_string()),
            body: Some("B".to_string()),
            ..body("text")
        };
        assert_eq!(
            request.validate(),
            Ok(CritiqueRequest::Text {
                title: "T".to_string(),
                body: "B".to_string()
            })
        );
    }

    #[test]
    fn test_text_request_needs_content() {
        let request = CritiqueRequestBody {
            title: Some("  ".to_string()),
            ..body("text")
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_text_request_accepts_body_only() {
        let request = CritiqueRequestBody {
            body: Some("Just a body".to_string()),
            ..body("text")
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_url_request_valid() {
        let request = CritiqueRequestBody {
            url: Some(" https://example.com/post?id=1 ".to_string()),
            ..body("url")
        };
        match request.validate() {
            Ok(CritiqueRequest::Url { url }) => {
                assert_eq!(url.as_str(), "https://example.com/post?id=1")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_url_request_rejects_malformed() {
        for raw in ["not-a-url", "ftp://example.com", "http://", "https://exa mple.com", ""] {
            let request = CritiqueRequestBody {
                url: Some(raw.to_string()),
                ..body("url")
            };
            assert!(request.validate().is_err(), "{raw} accepted");
        }
    }

    #[test]
    fn test_url_request_too_long() {
        let request = CritiqueRequestBody {
            url: Some(format!("https://example.com/{}", "a".repeat(2048))),
            ..body("url")
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_unknown_or_missing_mode() {
        assert!(body("pdf").validate().is_err());
        assert!(body(" text ").validate().is_err());
        assert!(body("URL").validate().is_err());
        assert!(CritiqueRequestBody::default().validate().is_err());
    }

    #[test]
    fn test_source_meta_skips_absent_fields() {
        let source = SourceMeta {
            mode: Mode::Text,
            url: None,
            title: None,
        };
        assert_eq!(
            serde_json::to_value(&source).unwrap(),
            serde_json::json!({"mode": "text"})
        );
    }
}
