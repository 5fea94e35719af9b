use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use url::Url;

/// Where the document's character encoding was learned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharsetSource {
    Header,
    MetaTag,
    Sniffed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charset {
    pub encoding: &'static encoding_rs::Encoding,
    pub source: CharsetSource,
}

impl Charset {
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }
}

#[derive(Debug)]
pub struct PageResponse {
    pub url_final: Url,
    pub status: StatusCode,
    pub body_utf8: String,
    pub charset: Charset,
    pub fetched_at: DateTime<Utc>,
}
