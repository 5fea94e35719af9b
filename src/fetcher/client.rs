use crate::fetcher::{errors::FetchError, pipeline::process_response, types::PageResponse};
use bytes::{Bytes, BytesMut};
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, instrument};

const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB
const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

// Many publishers serve a stripped page (or nothing) to obvious bots.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(10))
        .timeout(FETCH_TIMEOUT)
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .default_headers({
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert(
                reqwest::header::ACCEPT,
                reqwest::header::HeaderValue::from_static(
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                ),
            );
            headers
        })
        .build()
        .expect("Failed to build HTTP client")
});

#[instrument(skip_all, fields(url = %url))]
pub async fn fetch(url: &str) -> Result<PageResponse, FetchError> {
    let parsed_url = url::Url::parse(url)?;
    if !matches!(parsed_url.scheme(), "http" | "https") {
        return Err(FetchError::UnsupportedScheme(parsed_url.scheme().to_string()));
    }

    let response = HTTP_CLIENT
        .get(parsed_url.clone())
        .send()
        .await
        .map_err(FetchError::from_reqwest_error)?;

    let final_url = response.url().clone();
    let status = response.status();

    if !status.is_success() {
        return Err(FetchError::Http { status });
    }

    // Check content length before downloading
    if let Some(content_length) = response.content_length()
        && content_length > MAX_BODY_SIZE
    {
        return Err(FetchError::BodyTooLarge(content_length));
    }

    // A missing header is given the benefit of the doubt
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .unwrap_or("text/html")
        .to_string();

    if !is_markup(&content_type) {
        return Err(FetchError::UnsupportedContentType(content_type.clone()));
    }

    let body_bytes = read_capped(response).await?;

    debug!(status = %status, bytes = body_bytes.len(), "fetched page");

    process_response(final_url, status, body_bytes, &content_type)
}

/// Stream the body, giving up as soon as it outgrows `MAX_BODY_SIZE`.
///
/// Covers chunked and compressed responses, where no usable
/// Content-Length is known up front.
async fn read_capped(mut response: reqwest::Response) -> Result<Bytes, FetchError> {
    let mut body = BytesMut::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(FetchError::from_reqwest_error)?
    {
        let size = (body.len() + chunk.len()) as u64;
        if size > MAX_BODY_SIZE {
            return Err(FetchError::BodyTooLarge(size));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

fn is_markup(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.starts_with("text/")
        || content_type.contains("html")
        || content_type.contains("xml")
}
