/// Unwrap a completion that arrived inside a markdown code fence.
///
/// Handles both bare fences and fences tagged with a language (```` ```json ````).
/// Text without a leading fence is returned trimmed and otherwise unchanged.
#[must_use]
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string up to the end of the opening fence line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_json_is_untouched() {
        assert_eq!(strip_code_fences("  {\"a\":1}\n"), "{\"a\":1}");
    }

    #[test]
    fn json_fence_is_removed() {
        let raw = "```json\n{\"status\": \"success\"}\n```";
        assert_eq!(strip_code_fences(raw), "{\"status\": \"success\"}");
    }

    #[test]
    fn bare_fence_is_removed() {
        assert_eq!(strip_code_fences("```\n[1, 2]\n```\n"), "[1, 2]");
    }

    #[test]
    fn unterminated_fence_keeps_body() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}"), "{\"a\":1}");
    }
}
