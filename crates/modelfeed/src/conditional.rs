//! Conditional delivery primitives.
//!
//! The only protocol state is the manifest's current etag. An inbound
//! `If-None-Match` header carries a comma-separated validator list; if
//! any token matches, the server answers 304 and re-asserts the cache
//! headers so downstream caches refresh their freshness window.

/// Fixed cache policy for every manifest-derived endpoint. The numbers
/// are tuning, not correctness, but they must be identical across
/// endpoints so one shared validator stays meaningful for all of them.
pub const CACHE_CONTROL_VALUE: &str =
    "public, max-age=300, s-maxage=3600, stale-while-revalidate=86400, stale-if-error=86400";

/// Reduce a validator token to its comparable core: trim, keep a lone
/// `*` as-is, strip a weak-validator prefix, strip surrounding quotes.
pub fn normalize_validator(token: &str) -> &str {
    let token = token.trim();
    if token == "*" {
        return token;
    }
    let token = token.strip_prefix("W/").unwrap_or(token);
    token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(token)
}

/// Whether an `If-None-Match` header value matches the current etag.
///
/// `header` is the raw header value (possibly a comma-separated list);
/// `None` means the header was absent and never matches.
pub fn if_none_match_matches(header: Option<&str>, current_etag: &str) -> bool {
    let Some(header) = header else {
        return false;
    };
    let current = normalize_validator(current_etag);
    header.split(',').any(|token| {
        // Only the bare `*` token is the wildcard; a quoted `"*"` is an
        // ordinary (if odd) validator and compares literally.
        let token = token.trim();
        token == "*" || normalize_validator(token) == current
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_strips_weak_prefix_and_quotes() {
        assert_eq!(normalize_validator("\"abc\""), "abc");
        assert_eq!(normalize_validator("W/\"abc\""), "abc");
        assert_eq!(normalize_validator("  \"abc\" "), "abc");
        assert_eq!(normalize_validator("abc"), "abc");
        assert_eq!(normalize_validator(" * "), "*");
    }

    #[test]
    fn absent_header_never_matches() {
        assert!(!if_none_match_matches(None, "\"abc\""));
    }

    #[test]
    fn exact_and_weak_matches() {
        assert!(if_none_match_matches(Some("\"abc\""), "\"abc\""));
        assert!(if_none_match_matches(Some("W/\"abc\""), "\"abc\""));
        assert!(!if_none_match_matches(Some("\"def\""), "\"abc\""));
    }

    #[test]
    fn star_matches_any_etag() {
        assert!(if_none_match_matches(Some("*"), "\"whatever\""));
    }

    #[test]
    fn quoted_star_is_not_the_wildcard() {
        assert!(!if_none_match_matches(Some("\"*\""), "\"abc\""));
        assert!(!if_none_match_matches(Some("W/\"*\""), "\"abc\""));
        assert!(if_none_match_matches(Some("\"abc\", *"), "\"abc\""));
    }

    #[test]
    fn list_matches_any_token() {
        assert!(if_none_match_matches(
            Some("\"one\", W/\"two\", \"three\""),
            "\"two\""
        ));
        assert!(!if_none_match_matches(
            Some("\"one\", \"two\""),
            "\"three\""
        ));
    }
}
