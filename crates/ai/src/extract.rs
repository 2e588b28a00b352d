/// Slice out the JSON object embedded in free-form model text.
///
/// Returns everything from the first `{` to the last `}` inclusive, after
/// trimming. Code fences and chatter around the object are dropped; nothing
/// inside it is checked. `None` when there is no such span.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    let first = trimmed.find('{')?;
    let last = trimmed.rfind('}')?;
    if last <= first {
        return None;
    }
    Some(&trimmed[first..=last])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_bare_object() {
        assert_eq!(extract_json_object(r#"{"a":1}"#), Some(r#"{"a":1}"#));
    }

    #[test]
    fn strips_code_fences_and_prose() {
        let text = "Sure! Here it is:\n```json\n{\"subject\": \"Hi\", \"body\": \"x\"}\n```\nThanks";
        assert_eq!(
            extract_json_object(text),
            Some("{\"subject\": \"Hi\", \"body\": \"x\"}")
        );
    }

    #[test]
    fn spans_nested_objects_to_last_brace() {
        let text = r#"x {"client": {"name": "A"}, "items": [{"qty": 1}]} y"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"client": {"name": "A"}, "items": [{"qty": 1}]}"#)
        );
    }

    #[test]
    fn none_without_a_brace_pair() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("{ unterminated"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
        assert_eq!(extract_json_object(""), None);
    }

    #[test]
    fn span_may_still_be_invalid_json() {
        // Two objects: the span covers both and will fail to parse later.
        let text = r#"{"a":1} and {"b":2}"#;
        let span = extract_json_object(text).unwrap();
        assert_eq!(span, text);
        assert!(serde_json::from_str::<serde_json::Value>(span).is_err());
    }
}
