use std::fs;

use crate::extractor::extract;

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{name}"))
        .expect("Failed to read test fixture")
}

#[test]
fn test_extract_article() {
    let article = extract(&fixture("article.html"));

    assert_eq!(article.title, "Sample Article");
    assert!(article.body.starts_with("Sample Article\n\nBy A. Writer"));
    assert!(article.body.contains("first paragraph"));
    assert!(article.body.contains("second paragraph, with a related link."));

    // Layout noise inside and around the article is gone
    assert!(!article.body.contains("Sponsored"));
    assert!(!article.body.contains("Trending"));
    assert!(!article.body.contains("Advertisement"));
    assert!(!article.body.contains("Copyright"));
    assert!(!article.body.contains("dataLayer"));
}

#[test]
fn test_extract_blog_post_from_paragraphs() {
    let article = extract(&fixture("blog.html"));

    assert_eq!(article.title, "How to Build Better Software - Tech Blog");
    assert_eq!(
        article.body,
        "Building better software starts with understanding the problem.\n\n\
         Key Principles include simplicity, feedback and iteration.\n\n\
         Finally, measure what matters."
    );
}

#[test]
fn test_noise_only_page_is_empty() {
    let article = extract(&fixture("empty.html"));

    assert!(article.is_empty());
}

#[test]
fn test_stripped_noise_never_reaches_title_or_body() {
    let article = extract(
        "<title>Doc</title><nav><h1>Site menu</h1></nav><aside><p>Sidebar noise</p></aside>\
         <p>Real one</p><footer><p>Copyright</p></footer>",
    );

    assert_eq!(article.title, "Doc");
    assert_eq!(article.body, "Real one");
}

#[test]
fn test_article_wins_over_main_and_paragraphs() {
    let html = r#"<html><body>
        <p>Loose paragraph</p>
        <main><p>Main region</p></main>
        <article><p>Article region</p></article>
    </body></html>"#;

    assert_eq!(extract(html).body, "Article region");
}

#[test]
fn test_three_paragraphs_joined_with_blank_lines() {
    let html = "<html><body><p>One</p><div><p>Two</p></div><p>Three</p></body></html>";

    assert_eq!(extract(html).body, "One\n\nTwo\n\nThree");
}

#[test]
fn test_title_and_body_are_independent() {
    let article = extract("<html><head><title>Only a title</title></head><body></body></html>");
    assert_eq!(article.title, "Only a title");
    assert!(article.body.is_empty());
    assert!(!article.is_empty());
}

#[test]
fn test_malformed_html() {
    let html = "<html><head><title>Broken</title><body><p>Unclosed tags<div>More content";

    let article = extract(html);

    // Should handle malformed HTML gracefully
    assert_eq!(article.title, "Broken");
    assert!(article.body.contains("Unclosed tags"));
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_extract_never_panics(html in ".*") {
            let _ = extract(&html);
        }

        #[test]
        fn test_extracted_title_is_single_line(html in "<h1>[^<]{0,40}</h1>") {
            let article = extract(&html);
            prop_assert!(!article.title.contains('\n'));
            prop_assert_eq!(article.title.trim(), article.title.as_str());
        }
    }
}
