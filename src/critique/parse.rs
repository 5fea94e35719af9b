//! Turning the model's free-form reply into a [`CritiqueResult`].
//!
//! The reply is asked to be bare JSON but often isn't: it may be wrapped in
//! Markdown fences or surrounded by commentary. The object is located
//! first, then read field by field so that one malformed score does not
//! throw away the rest of the critique.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::critique::dtos::{CritiqueResult, FeedbackPoint, TitleFeedback};
use crate::prompt::FEEDBACK_POINTS;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("no JSON object found in the completion text")]
    NoObject,

    #[error("completion text does not contain a valid JSON object: {0}")]
    InvalidJson(String),
}

/// Locate and parse the JSON object embedded in `text`.
///
/// Candidates, in order: first `{` to last `}`; the brace-balanced region
/// starting at the first `{`; first `{` to the first `}` after it. The
/// first candidate that parses as an object wins.
pub fn extract_json(text: &str) -> Result<Map<String, Value>, ParseError> {
    let start = text.find('{').ok_or(ParseError::NoObject)?;
    let mut last_error = None;

    for candidate in [
        greedy_region(text, start),
        balanced_region(text, start),
        lazy_region(text, start),
    ]
    .into_iter()
    .flatten()
    {
        match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(map)) => return Ok(map),
            Ok(_) => {}
            Err(e) => last_error = Some(e.to_string()),
        }
    }

    Err(match last_error {
        Some(message) => ParseError::InvalidJson(message),
        None => ParseError::NoObject,
    })
}

fn greedy_region(text: &str, start: usize) -> Option<&str> {
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn lazy_region(text: &str, start: usize) -> Option<&str> {
    let end = start + text[start..].find('}')?;
    Some(&text[start..=end])
}

/// Walk from the opening brace to its matching close, skipping braces that
/// appear inside string literals.
fn balanced_region(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a completion into a critique, coercing scores rather than failing.
pub fn parse_critique(text: &str) -> Result<CritiqueResult, ParseError> {
    let object = extract_json(text)?;

    let title_feedback = match object.get("title_feedback") {
        Some(Value::Object(feedback)) => TitleFeedback {
            score: feedback.get("score").and_then(coerce_score),
            comment: string_field(feedback.get("comment")),
        },
        _ => TitleFeedback {
            score: None,
            comment: String::new(),
        },
    };

    let feedback_points: Vec<FeedbackPoint> = object
        .get("feedback_points")
        .and_then(Value::as_array)
        .map(|points| {
            points
                .iter()
                .filter_map(Value::as_object)
                .map(|point| FeedbackPoint {
                    point: string_field(point.get("point")),
                    suggestion: string_field(point.get("suggestion")),
                })
                .collect()
        })
        .unwrap_or_default();

    if feedback_points.len() != FEEDBACK_POINTS.len() {
        warn!(
            expected = FEEDBACK_POINTS.len(),
            got = feedback_points.len(),
            "unexpected number of feedback points"
        );
    }

    Ok(CritiqueResult {
        title_feedback,
        overall_score: object.get("overall_score").and_then(coerce_score),
        overall_comment: string_field(object.get("overall_comment")),
        feedback_points,
    })
}

/// Read a score as an integer, the way a lenient `parseInt` would.
///
/// Numbers are truncated toward zero; strings contribute their leading
/// integer (`"8/10"` is 8). Anything else is `None`. The 1-10 range is not
/// enforced: an out-of-range integer is passed through as given.
pub fn coerce_score(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => leading_integer(s),
        _ => None,
    }
}

fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

fn string_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        None | Some(Value::Null) => String::new(),
        Some(other) => other.to_string(),
    }
}
