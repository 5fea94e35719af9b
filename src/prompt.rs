//! The fixed evaluation prompt sent to the completion service.
//!
//! The JSON contract at the bottom of the template is what
//! [`crate::critique::parse`] expects back, so field names and the order of
//! the five feedback points must stay in step with that module.

/// Shown in place of a missing title or body.
pub const NOT_PROVIDED: &str = "(not provided)";

/// Headings of the five feedback points, in the order they are requested.
pub const FEEDBACK_POINTS: [&str; 5] = [
    "Title rewrite",
    "Experiential specificity",
    "Originality and primary data",
    "Structural logic",
    "Coverage and internal linking",
];

const PERSONA: &str = "\
You are a senior web editor and content strategist who has reviewed thousands \
of articles for search visibility and reader value. You give direct, concrete \
feedback that a writer can act on immediately.";

const CONTENT_CRITERIA: &str = "\
Evaluate the article body on these four criteria:
1. Experience: does the writer show first-hand experience with specific episodes, numbers, or observations?
2. Originality: does the article contain primary data, original analysis, or a perspective not found elsewhere?
3. Structure: is the argument logically ordered, with headings and paragraphs that build on each other?
4. Coverage: does it answer the reader's likely follow-up questions, and where would links to related articles help?";

const TITLE_CRITERIA: &str = "\
Evaluate the title on these three criteria:
1. Clarity: can a reader tell exactly what they will get from the article?
2. Search intent: does it contain the words a reader would actually search for?
3. Appeal: is it specific and compelling without being clickbait, and reasonably short?";

const OUTPUT_CONTRACT: &str = r#"Respond with ONLY a single JSON object in exactly this shape. Do not add any text, explanation, or Markdown code fences before or after it.

{
  "title_feedback": {
    "score": <integer 1-10>,
    "comment": "<assessment of the title>"
  },
  "overall_score": <integer 1-10>,
  "overall_comment": "<overall assessment of the article>",
  "feedback_points": [
    {"point": "Title rewrite", "suggestion": "<a concrete improved title and why>"},
    {"point": "Experiential specificity", "suggestion": "<where to add first-hand detail>"},
    {"point": "Originality and primary data", "suggestion": "<what original data or analysis to add>"},
    {"point": "Structural logic", "suggestion": "<how to reorder or restructure>"},
    {"point": "Coverage and internal linking", "suggestion": "<missing topics and related articles to link>"}
  ]
}

Scores are integers from 1 (poor) to 10 (excellent). The feedback_points array must contain exactly these five entries in this order."#;

/// Render the evaluation prompt for an already-normalized title and body.
pub fn build(title: &str, body: &str) -> String {
    let title = or_placeholder(title);
    let body = or_placeholder(body);

    format!(
        "{PERSONA}\n\n\
         {CONTENT_CRITERIA}\n\n\
         {TITLE_CRITERIA}\n\n\
         ### Article\n\
         Title: {title}\n\
         Body:\n\
         {body}\n\
         ### End of article\n\n\
         {OUTPUT_CONTRACT}\n"
    )
}

fn or_placeholder(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_PROVIDED
    } else {
        value
    }
}
