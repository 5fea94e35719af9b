pub mod cleaner;
pub mod model;
pub mod reader;

#[cfg(test)]
mod tests;

pub use model::Article;

use scraper::Html;
use tracing::debug;

/// Pull a title and body out of an HTML document.
///
/// Never fails: a page with nothing recognisable yields an empty
/// [`Article`], and it is up to the caller to decide what that means.
pub fn extract(html: &str) -> Article {
    let mut document = Html::parse_document(html);

    // 1. Drop navigation, footers, sidebars and ads before reading any text
    let removed = cleaner::strip_noise(&mut document);

    // 2. Title and body are resolved independently
    let title = reader::extract_title(&document);
    let body = reader::extract_body(&document);

    debug!(
        removed,
        title_chars = title.chars().count(),
        body_chars = body.chars().count(),
        "extracted article"
    );

    Article { title, body }
}
