//! Caller-supplied handle normalisation.

use std::sync::LazyLock;

use regex::Regex;

static HANDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{1,15}$").expect("valid regex"));

/// Reduce `@Name`, `x.com/Name` or `https://twitter.com/Name?s=20` to the
/// lower-cased handle.
///
/// Returns `None` when what remains is not a valid handle.
#[must_use]
pub fn normalize_handle(raw: &str) -> Option<String> {
    let mut candidate = raw.trim().replacen('@', "", 1);

    if candidate.contains("twitter.com/") || candidate.contains("x.com/") {
        let path = candidate.split(['?', '#']).next().unwrap_or_default();
        candidate = path
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or_default()
            .to_string();
    }

    let handle = candidate
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim()
        .trim_start_matches('@');

    HANDLE_RE
        .is_match(handle)
        .then(|| handle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_at_sign_and_lowercases() {
        assert_eq!(normalize_handle("  @SomeOne "), Some("someone".to_string()));
    }

    #[test]
    fn accepts_profile_urls() {
        for raw in [
            "https://x.com/SomeOne",
            "https://twitter.com/someone/",
            "x.com/someone?s=20",
            "https://mobile.twitter.com/someone?ref_src=twsrc",
        ] {
            assert_eq!(normalize_handle(raw), Some("someone".to_string()), "{raw}");
        }
    }

    #[test]
    fn rejects_invalid_handles() {
        for raw in ["", "   ", "@", "has space", "way_too_long_handle_name", "bad-dash"] {
            assert_eq!(normalize_handle(raw), None, "{raw}");
        }
    }

    #[test]
    fn drops_trailing_query() {
        assert_eq!(normalize_handle("someone?lang=fa"), Some("someone".to_string()));
    }
}
