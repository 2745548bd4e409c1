//! Pull a JSON document out of model text that may be wrapped in a markdown fence.

use serde_json::Value;

use super::ParseError;

const FENCE: &str = "```";

/// Body of the first fenced block: everything after the opening fence line. None when the
/// text has no fence.
fn fence_body(trimmed: &str) -> Option<&str> {
    let start = trimmed.find(FENCE)?;
    let after_fence = &trimmed[start + FENCE.len()..];
    // Skip the info string ("json", "JSON", ...) up to the end of the opening line.
    let content_start = match after_fence.find('\n') {
        Some(nl) if after_fence[..nl].trim().chars().all(|c| c.is_ascii_alphanumeric()) => nl + 1,
        _ => 0,
    };
    Some(&after_fence[content_start..])
}

/// Return the first fenced block (with or without a language tag), which may be embedded in
/// surrounding prose. Text without a fence is returned trimmed.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(body) = fence_body(trimmed) else {
        return trimmed;
    };
    match body.find(FENCE) {
        Some(end) => body[..end].trim(),
        // Opening fence without a closing one: tolerate a truncated wrapper.
        None => body.trim(),
    }
}

/// Parse model output as JSON. Bare JSON is taken as is, even when its strings contain
/// backticks. Otherwise the first fenced block is parsed, then the block up to the last fence
/// (for fences nested inside the JSON). Any syntax error is a hard failure; partial data is
/// never returned.
pub fn parse_json(text: &str) -> Result<Value, ParseError> {
    let trimmed = text.trim();
    let bare: Result<Value, _> = serde_json::from_str(trimmed);
    if bare.is_ok() {
        return bare.map_err(ParseError::InvalidJson);
    }
    let Some(body) = fence_body(trimmed) else {
        log::debug!("gateway: unparsable model output: {}", trimmed);
        return bare.map_err(ParseError::InvalidJson);
    };

    let first = strip_code_fence(trimmed);
    let first_result: Result<Value, _> = serde_json::from_str(first);
    if first_result.is_ok() {
        return first_result.map_err(ParseError::InvalidJson);
    }
    if let Some(end) = body.rfind(FENCE) {
        let widest = body[..end].trim();
        if widest != first {
            if let Ok(value) = serde_json::from_str::<Value>(widest) {
                return Ok(value);
            }
        }
    }
    log::debug!("gateway: unparsable model output: {}", trimmed);
    first_result.map_err(ParseError::InvalidJson)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_and_bare_inputs_parse_the_same() {
        let fenced = parse_json("```json\n{\"a\":1}\n```").unwrap();
        let bare = parse_json("{\"a\":1}").unwrap();
        assert_eq!(fenced, bare);
        assert_eq!(bare, serde_json::json!({ "a": 1 }));
    }

    #[test]
    fn fence_without_language_tag() {
        assert_eq!(strip_code_fence("```\n[1, 2]\n```"), "[1, 2]");
    }

    #[test]
    fn fence_inside_prose() {
        let text = "Here are the bills:\n```json\n[]\n```\nLet me know if you need more.";
        assert_eq!(strip_code_fence(text), "[]");
    }

    #[test]
    fn single_line_fence() {
        assert_eq!(strip_code_fence("```{\"a\":1}```"), "{\"a\":1}");
    }

    #[test]
    fn bare_json_with_backticks_in_strings() {
        let text = "[{\"summary\":\"Amends ```Section 3``` wording\"}]";
        let value = parse_json(text).unwrap();
        assert_eq!(value[0]["summary"], "Amends ```Section 3``` wording");
    }

    #[test]
    fn first_closing_fence_ends_the_block() {
        let text = "```json\n[{\"a\":1}]\n```\nSources: see ```notes``` above.";
        assert_eq!(strip_code_fence(text), "[{\"a\":1}]");
        assert_eq!(parse_json(text).unwrap(), serde_json::json!([{ "a": 1 }]));
    }

    #[test]
    fn fenced_json_with_backticks_in_strings() {
        let text = "```json\n{\"note\":\"see ```x``` here\"}\n```";
        assert_eq!(parse_json(text).unwrap()["note"], "see ```x``` here");
    }

    #[test]
    fn truncated_json_is_a_parse_failure() {
        let err = parse_json("```json\n{\"a\": [1, 2\n```").unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson(_)));
        assert!(parse_json("{\"a\":").is_err());
        assert!(parse_json("").is_err());
        assert!(parse_json("no json here").is_err());
    }
}
