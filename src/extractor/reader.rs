use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

static H1_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static OG_TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[property='og:title']").unwrap());
static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());

static ARTICLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article, [role='article']").unwrap());
static MAIN_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("main, [role='main']").unwrap());
static PARAGRAPH_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());

/// Elements whose content starts on its own line when flattened to text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "figure",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "ol", "p", "pre",
    "section", "table", "td", "th", "tr", "ul",
];

// Queries start from the root element: `Html::select` would also visit
// nodes that `strip_noise` has detached.

/// First `<h1>`, then `og:title`, then `<title>`; empty if none has text.
pub fn extract_title(document: &Html) -> String {
    if let Some(h1) = document.root_element().select(&H1_SELECTOR).next() {
        let title = inline_text(h1);
        if !title.is_empty() {
            return title;
        }
    }

    if let Some(meta) = document.root_element().select(&OG_TITLE_SELECTOR).next()
        && let Some(content) = meta.value().attr("content")
    {
        let title = collapse_spaces(content);
        if !title.is_empty() {
            return title;
        }
    }

    if let Some(title) = document.root_element().select(&TITLE_SELECTOR).next() {
        return inline_text(title);
    }

    String::new()
}

/// First `<article>`, then first `<main>`, then every non-empty paragraph.
///
/// Only the first element of each kind is considered, and tiers are never
/// mixed: the first tier yielding text wins outright.
pub fn extract_body(document: &Html) -> String {
    for selector in [&*ARTICLE_SELECTOR, &*MAIN_SELECTOR] {
        if let Some(container) = document.root_element().select(selector).next() {
            let text = block_text(container);
            if !text.is_empty() {
                return text;
            }
        }
    }

    document
        .root_element()
        .select(&PARAGRAPH_SELECTOR)
        .map(block_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn inline_text(element: ElementRef<'_>) -> String {
    collapse_spaces(&element.text().collect::<String>())
}

fn collapse_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Flatten an element to text, keeping a line break around block elements
/// so that adjacent paragraphs don't run together.
fn block_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_text(element, &mut raw);
    tidy_lines(&raw)
}

fn push_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let Some(child_ref) = ElementRef::wrap(child) else {
                    continue;
                };
                let is_block = BLOCK_ELEMENTS.contains(&el.name());
                if is_block {
                    out.push('\n');
                }
                push_text(child_ref, out);
                if is_block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Trim every line and squeeze runs of blank lines into one.
fn tidy_lines(raw: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for line in raw.lines() {
        let line = collapse_spaces(line);
        let previous_blank = lines.last().is_none_or(|l| l.is_empty());
        if line.is_empty() && previous_blank {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_prefers_h1() {
        let document = Html::parse_document(
            r#"<html><head><title>Doc title</title><meta property="og:title" content="OG title"></head>
               <body><h1>  Heading   title </h1></body></html>"#,
        );
        assert_eq!(extract_title(&document), "Heading title");
    }

    #[test]
    fn test_title_falls_back_to_og_then_title() {
        let document = Html::parse_document(
            r#"<html><head><title>Doc title</title><meta property="og:title" content="OG title"></head>
               <body><h1> </h1></body></html>"#,
        );
        assert_eq!(extract_title(&document), "OG title");

        let document = Html::parse_document(
            r#"<html><head><title> Doc title </title></head><body></body></html>"#,
        );
        assert_eq!(extract_title(&document), "Doc title");
    }

    #[test]
    fn test_title_empty_when_missing() {
        let document = Html::parse_document("<html><body><p>text</p></body></html>");
        assert_eq!(extract_title(&document), "");
    }

    #[test]
    fn test_body_prefers_article_over_main() {
        let document = Html::parse_document(
            r#"<html><body>
                <main><p>Main text</p></main>
                <article><p>Article text</p></article>
            </body></html>"#,
        );
        assert_eq!(extract_body(&document), "Article text");
    }

    #[test]
    fn test_body_uses_main_without_article() {
        let document = Html::parse_document(
            r#"<html><body><p>Outside</p><div role="main"><p>Main text</p></div></body></html>"#,
        );
        assert_eq!(extract_body(&document), "Main text");
    }

    #[test]
    fn test_body_joins_paragraphs_in_order() {
        let document = Html::parse_document(
            r#"<html><body>
                <div><p> First </p><p></p><p>Second</p></div>
                <p>Third</p>
            </body></html>"#,
        );
        assert_eq!(extract_body(&document), "First\n\nSecond\n\nThird");
    }

    #[test]
    fn test_empty_article_falls_through() {
        let document = Html::parse_document(
            r#"<html><body><article>   </article><main>Main only</main></body></html>"#,
        );
        assert_eq!(extract_body(&document), "Main only");
    }

    #[test]
    fn test_block_text_separates_blocks() {
        let document = Html::parse_document(
            r#"<html><body><article><h2>Intro</h2><p>One <b>bold</b> line.</p>

            <ul><li>a</li><li>b</li></ul></article></body></html>"#,
        );
        assert_eq!(extract_body(&document), "Intro\n\nOne bold line.\n\na\n\nb");
    }
}
