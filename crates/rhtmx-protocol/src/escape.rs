/// Makes serialized JSON safe to place inside an inline `<script>` element
///
/// `<`, `>` and `&` become `\u003c`, `\u003e` and `\u0026` so that a string
/// value containing `</script>` cannot terminate the element. U+2028 and
/// U+2029 are escaped as well since older engines treat them as line breaks.
/// The output is still valid JSON and parses to the same value.
///
/// # Examples
///
/// ```
/// use rhtmx_protocol::escape_json_for_script;
///
/// let json = r#"{"html":"</script><b>"}"#;
/// assert_eq!(
///     escape_json_for_script(json),
///     r#"{"html":"\u003c/script\u003e\u003cb\u003e"}"#
/// );
/// ```
pub fn escape_json_for_script(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escaped_json_parses_to_same_value() {
        let value = serde_json::json!({"a": "</script>&\u{2028}", "b": [1, "<"]});
        let raw = serde_json::to_string(&value).unwrap();
        let escaped = escape_json_for_script(&raw);

        assert!(!escaped.contains('<'));
        let reparsed: serde_json::Value = serde_json::from_str(&escaped).unwrap();
        assert_eq!(reparsed, value);
    }
}
