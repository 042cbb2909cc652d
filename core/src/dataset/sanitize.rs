use serde_json::{Map, Value};

/// Replaces the markup-significant angle brackets with their entities.
pub fn sanitize_text(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}

/// Returns a copy of `value` with every reachable string passed through
/// [`sanitize_text`]. Object keys, numbers, booleans and null are kept as-is.
pub fn sanitize(value: &Value) -> Value {
    match value {
        Value::String(text) => Value::String(sanitize_text(text)),
        Value::Array(items) => Value::Array(items.iter().map(sanitize).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, item)| (key.clone(), sanitize(item)))
                .collect::<Map<String, Value>>(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn script_tags_lose_their_brackets() {
        let cleaned = sanitize_text("<script>alert(1)</script>");
        assert!(!cleaned.contains('<'));
        assert!(!cleaned.contains('>'));
        assert_eq!(cleaned, "&lt;script&gt;alert(1)&lt;/script&gt;");
    }

    #[test]
    fn sanitizing_is_idempotent() {
        let once = sanitize_text("<b>bold</b> & <i>");
        assert_eq!(sanitize_text(&once), once);
    }

    #[test]
    fn nested_structures_keep_their_shape() {
        let input = json!({
            "name": "<x>",
            "count": 3,
            "flag": true,
            "missing": null,
            "list": ["a<", { "deep": [">"] }],
        });

        let output = sanitize(&input);
        assert_eq!(
            output,
            json!({
                "name": "&lt;x&gt;",
                "count": 3,
                "flag": true,
                "missing": null,
                "list": ["a&lt;", { "deep": ["&gt;"] }],
            })
        );
        // input is untouched
        assert_eq!(input["name"], "<x>");
    }
}
