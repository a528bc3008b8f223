//! JSON embedded in the free-text `output` of list-wrapped replies.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static FENCED_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json|JSON)?[ \t]*\r?\n?(.*?)```").expect("valid regex"));

/// Parses the first fenced code block whose body is valid JSON.
pub(super) fn fenced_json(text: &str) -> Option<Value> {
    FENCED_BLOCK_RE
        .captures_iter(text)
        .filter_map(|cap| cap.get(1))
        .find_map(|body| serde_json::from_str(body.as_str().trim()).ok())
}

/// Parses the substring between the first `{` and the last `}`.
pub(super) fn braced_json(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}
