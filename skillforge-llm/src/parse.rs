//! Validation of untrusted generator output.

use serde::Deserialize;
use serde_json::Value;
use skillforge_core::{GenerationError, TaskCategory, TaskDraft, MAX_TASK_XP, MIN_TASK_XP};

/// Remove a surrounding markdown code fence (```` ```json ```` ... ```` ``` ````)
/// and trim. Backticks inside the payload are left alone.
pub fn strip_code_fences(raw: &str) -> String {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // Info string such as `json` or `JSON`.
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        text = &rest[tag_len..];
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim().to_string()
}

/// Shape of one task element before validation. Every field is optional so
/// that missing fields produce a precise error instead of a serde message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTask {
    title: Option<String>,
    description: Option<String>,
    xp: Option<Value>,
    estimated_time: Option<String>,
    category: Option<String>,
}

/// Parse and validate generator output into task drafts.
///
/// Fails when the text is not JSON, not an array, an empty array, or when any
/// element has a missing or blank field, an XP reward outside the allowed
/// range, or an unknown category. Nothing is partially accepted.
pub fn parse_task_list(raw: &str) -> Result<Vec<TaskDraft>, GenerationError> {
    let cleaned = strip_code_fences(raw);

    let value: Value = serde_json::from_str(&cleaned)
        .map_err(|e| malformed(format!("output is not valid JSON: {}", e)))?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(malformed(format!(
                "expected a JSON array of tasks, got {}",
                json_kind(&other)
            )))
        }
    };

    if items.is_empty() {
        return Err(malformed("task list is empty"));
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| validate_task(index, item))
        .collect()
}

fn validate_task(index: usize, item: Value) -> Result<TaskDraft, GenerationError> {
    if !item.is_object() {
        return Err(malformed(format!(
            "task {} is {}, expected an object",
            index,
            json_kind(&item)
        )));
    }

    let raw: RawTask = serde_json::from_value(item)
        .map_err(|e| malformed(format!("task {} has an invalid field: {}", index, e)))?;

    let title = required_text(index, "title", raw.title)?;
    let description = required_text(index, "description", raw.description)?;
    let estimated_time = required_text(index, "estimatedTime", raw.estimated_time)?;
    let category_label = required_text(index, "category", raw.category)?;

    let category: TaskCategory = category_label
        .parse()
        .map_err(|_| malformed(format!("task {} has unknown category '{}'", index, category_label)))?;

    let xp = raw
        .xp
        .as_ref()
        .and_then(Value::as_u64)
        .ok_or_else(|| malformed(format!("task {} is missing a whole-number xp", index)))?;

    if !(u64::from(MIN_TASK_XP)..=u64::from(MAX_TASK_XP)).contains(&xp) {
        return Err(malformed(format!(
            "task {} xp {} is outside {}..={}",
            index, xp, MIN_TASK_XP, MAX_TASK_XP
        )));
    }

    Ok(TaskDraft {
        title,
        description,
        xp: xp as u32,
        estimated_time,
        category,
    })
}

fn required_text(
    index: usize,
    field: &str,
    value: Option<String>,
) -> Result<String, GenerationError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(malformed(format!("task {} is missing '{}'", index, field))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn malformed(reason: impl Into<String>) -> GenerationError {
    GenerationError::MalformedOutput {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TWO_TASKS: &str = r#"[
        {"title": "Setup", "description": "Install the toolchain", "xp": 50, "estimatedTime": "1 day", "category": "Foundation"},
        {"title": "Build a CLI", "description": "Ship a small tool", "xp": 150, "estimatedTime": "1 week", "category": "Implementation"}
    ]"#;

    fn reason(err: GenerationError) -> String {
        match err {
            GenerationError::MalformedOutput { reason } => reason,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parses_plain_array() {
        let tasks = parse_task_list(TWO_TASKS).expect("valid task list");
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "Setup");
        assert_eq!(tasks[1].xp, 150);
        assert_eq!(tasks[1].category, TaskCategory::Implementation);
    }

    #[test]
    fn test_parses_fenced_output() {
        let fenced = format!("```json\n{}\n```", TWO_TASKS);
        assert_eq!(parse_task_list(&fenced).expect("fenced list").len(), 2);
    }

    #[test]
    fn test_inner_backticks_survive_fence_removal() {
        let raw = "```JSON\n[{\"title\": \"Shell\", \"description\": \"Run ```ls``` first\", \"xp\": 60, \"estimatedTime\": \"1 day\", \"category\": \"Foundation\"}]\n```";
        let tasks = parse_task_list(raw).expect("fenced list with inner backticks");
        assert_eq!(tasks[0].description, "Run ```ls``` first");

        assert_eq!(strip_code_fences("```[1, 2]```"), "[1, 2]");
        assert_eq!(strip_code_fences("  [\"a```b\"]  "), "[\"a```b\"]");
    }

    #[test]
    fn test_rejects_non_json() {
        let err = parse_task_list("Sure! Here is your roadmap.").unwrap_err();
        assert!(reason(err).contains("not valid JSON"));
    }

    #[test]
    fn test_rejects_object_and_empty_array() {
        assert!(reason(parse_task_list(r#"{"tasks": []}"#).unwrap_err()).contains("an object"));
        assert!(reason(parse_task_list("[]").unwrap_err()).contains("empty"));
    }

    #[test]
    fn test_rejects_blank_field() {
        let raw = r#"[{"title": "  ", "description": "d", "xp": 60, "estimatedTime": "1 day", "category": "Foundation"}]"#;
        assert!(reason(parse_task_list(raw).unwrap_err()).contains("'title'"));
    }

    #[test]
    fn test_rejects_xp_out_of_range() {
        let raw = r#"[{"title": "t", "description": "d", "xp": 500, "estimatedTime": "1 day", "category": "Advanced"}]"#;
        assert!(reason(parse_task_list(raw).unwrap_err()).contains("outside 50..=200"));

        let fractional = r#"[{"title": "t", "description": "d", "xp": 75.5, "estimatedTime": "1 day", "category": "Advanced"}]"#;
        assert!(parse_task_list(fractional).is_err());
    }

    #[test]
    fn test_rejects_unknown_category() {
        let raw = r#"[{"title": "t", "description": "d", "xp": 100, "estimatedTime": "1 day", "category": "Expert"}]"#;
        assert!(reason(parse_task_list(raw).unwrap_err()).contains("unknown category 'Expert'"));
    }

    #[test]
    fn test_one_bad_element_rejects_whole_list() {
        let raw = r#"[
            {"title": "ok", "description": "d", "xp": 100, "estimatedTime": "1 day", "category": "Foundation"},
            {"title": "bad", "description": "d", "estimatedTime": "1 day", "category": "Foundation"}
        ]"#;
        assert!(reason(parse_task_list(raw).unwrap_err()).contains("task 1"));
    }

    proptest! {
        #[test]
        fn prop_fences_never_change_the_payload(
            body in "[a-zA-Z0-9 \\[\\]{}:,\"]{0,64}",
            lead in "[ \n]{0,3}",
            trail in "[ \n]{0,3}",
        ) {
            let fenced = format!("{lead}```json\n{body}\n```{trail}");
            prop_assert_eq!(strip_code_fences(&fenced), body.trim().to_string());
        }

        #[test]
        fn prop_valid_xp_is_accepted(xp in MIN_TASK_XP..=MAX_TASK_XP) {
            let raw = format!(
                r#"[{{"title": "t", "description": "d", "xp": {xp}, "estimatedTime": "1 day", "category": "Mastery"}}]"#
            );
            let tasks = parse_task_list(&raw).expect("in-range xp");
            prop_assert_eq!(tasks[0].xp, xp);
        }
    }
}
