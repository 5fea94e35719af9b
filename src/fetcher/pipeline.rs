use crate::fetcher::{
    errors::FetchError,
    types::{Charset, CharsetSource, PageResponse},
};
use bytes::Bytes;
use chrono::Utc;
use encoding_rs::Encoding;
use regex::Regex;
use reqwest::StatusCode;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

// How far into the document a <meta> charset declaration is looked for.
const META_SCAN_BYTES: usize = 4096;

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

pub fn process_response(
    url_final: Url,
    status: StatusCode,
    body_bytes: Bytes,
    content_type: &str,
) -> Result<PageResponse, FetchError> {
    let charset = detect_charset(content_type, &body_bytes);
    let body_utf8 = decode_to_utf8(&body_bytes, charset)?;

    Ok(PageResponse {
        url_final,
        status,
        body_utf8,
        charset,
        fetched_at: Utc::now(),
    })
}

fn label_to_encoding(regex: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let label = regex.captures(haystack)?.get(1)?.as_str().to_ascii_lowercase();
    Encoding::for_label(label.as_bytes())
}

/// Content-Type header first, then a `<meta>` declaration near the top of
/// the document (which also covers the `http-equiv` form), then sniffing.
fn detect_charset(content_type: &str, body_bytes: &[u8]) -> Charset {
    if let Some(encoding) = label_to_encoding(&CHARSET_REGEX, content_type) {
        return Charset {
            encoding,
            source: CharsetSource::Header,
        };
    }

    let head = &body_bytes[..body_bytes.len().min(META_SCAN_BYTES)];
    let head_str = String::from_utf8_lossy(head);

    if let Some(encoding) = label_to_encoding(&META_CHARSET_REGEX, &head_str) {
        return Charset {
            encoding,
            source: CharsetSource::MetaTag,
        };
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(head, body_bytes.len() <= META_SCAN_BYTES);
    Charset {
        encoding: detector.guess(None, true),
        source: CharsetSource::Sniffed,
    }
}

fn decode_to_utf8(body_bytes: &[u8], charset: Charset) -> Result<String, FetchError> {
    // A BOM, when present, wins over whatever was declared.
    let (decoded, encoding, had_errors) = charset.encoding.decode(body_bytes);

    if had_errors {
        // Pages routinely lie about their encoding; a fully broken decode
        // is the only thing worth refusing.
        if decoded.trim().is_empty() {
            return Err(FetchError::Charset(format!(
                "could not decode content as {}",
                encoding.name()
            )));
        }
        debug!(encoding = encoding.name(), "replaced malformed sequences while decoding");
    }

    Ok(decoded.into_owned())
}
