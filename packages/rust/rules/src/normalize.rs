//! Candidate normalization into canonical [`DomainToken`]s.

use std::sync::LazyLock;

use regex::Regex;

/// Dotted-quad IPv4 literal, e.g. `0.0.0.0` or `127.0.0.1`.
static IPV4_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+\.\d+$").expect("ipv4 literal pattern"));

/// Reserved hostnames that never belong in a blocklist output.
const RESERVED: [&str; 3] = ["localhost", "broadcasthost", "::1"];

// ---------------------------------------------------------------------------
// DomainToken
// ---------------------------------------------------------------------------

/// A normalized hostname: lower-cased, no trailing root-label dot, never an
/// IPv4 literal, never a reserved hostname, never empty.
///
/// Only [`normalize`] constructs these. No IDN handling and no label-syntax
/// validation happens here — source lists are trusted feeds, and a
/// malformed-but-non-empty string passes through as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainToken(String);

impl DomainToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for DomainToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DomainToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// normalize
// ---------------------------------------------------------------------------

/// Normalize a parsed candidate, or reject it.
///
/// Steps, in order: reject reserved hostnames (matched against the raw
/// candidate), reject IPv4 literals, strip one trailing `.`, lower-case,
/// reject the empty remainder.
pub fn normalize(candidate: &str) -> Option<DomainToken> {
    if RESERVED.contains(&candidate) {
        return None;
    }
    if IPV4_LITERAL.is_match(candidate) {
        return None;
    }
    let stripped = candidate.strip_suffix('.').unwrap_or(candidate);
    let lowered = stripped.to_lowercase();
    if lowered.is_empty() {
        return None;
    }
    Some(DomainToken(lowered))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_case_and_strips_trailing_dot() {
        assert_eq!(normalize("Example.COM.").unwrap().as_str(), "example.com");
        assert_eq!(normalize("plain.example").unwrap().as_str(), "plain.example");
    }

    #[test]
    fn rejects_reserved_hostnames() {
        assert!(normalize("localhost").is_none());
        assert!(normalize("broadcasthost").is_none());
        assert!(normalize("::1").is_none());
    }

    #[test]
    fn rejects_ipv4_literals() {
        assert!(normalize("0.0.0.0").is_none());
        assert!(normalize("127.0.0.1").is_none());
        assert!(normalize("255.255.255.255").is_none());
        // Not a dotted quad; passes through.
        assert!(normalize("1.2.3").is_some());
    }

    #[test]
    fn rejects_empty_remainder() {
        assert!(normalize("").is_none());
        assert!(normalize(".").is_none());
    }

    #[test]
    fn strips_one_trailing_dot_only() {
        assert_eq!(normalize("example.com..").unwrap().as_str(), "example.com.");
    }

    #[test]
    fn garbage_in_garbage_out() {
        // Malformed-but-non-empty strings are tokens; feeds are trusted.
        assert_eq!(normalize("*.wild.example").unwrap().as_str(), "*.wild.example");
        assert_eq!(normalize("under_score").unwrap().as_str(), "under_score");
    }
}
