//! Dialect-specific line parsers.
//!
//! Each parser takes the raw fetched text and yields domain *candidates*
//! lazily, in one pass, borrowing from the input. Lines that don't match a
//! dialect's shape are dropped without logging — at blocklist scale a
//! per-line message would be pure noise.

use std::sync::LazyLock;

use regex::Regex;

use ruleforge_shared::SourceDialect;

/// The one AdGuard rule shape that is extracted: `||<domain>^`.
/// Modifiers, `@@` exceptions, and regex rules never match and are dropped.
static ADGUARD_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|\|(.*)\^$").expect("adguard rule pattern"));

/// Yield domain candidates from `text` according to `dialect`.
pub fn candidates<'a>(
    dialect: SourceDialect,
    text: &'a str,
) -> Box<dyn Iterator<Item = &'a str> + 'a> {
    match dialect {
        SourceDialect::Hosts => Box::new(hosts_candidates(text)),
        SourceDialect::AdguardAdblock => Box::new(adguard_candidates(text)),
        SourceDialect::WildcardDomains => Box::new(wildcard_candidates(text)),
    }
}

/// Hosts-file lines: `0.0.0.0 domain.com`, `127.0.0.1 domain.com # note`,
/// or a bare `domain.com`. The last whitespace-separated field is the
/// candidate.
fn hosts_candidates(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter_map(|line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        // Inline comments: everything from `#` onward.
        let line = line.split('#').next().unwrap_or_default().trim();
        line.split_whitespace().next_back()
    })
}

/// AdGuard adblock lines of the exact shape `||domain^`.
fn adguard_candidates(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter_map(|line| {
        ADGUARD_RULE
            .captures(line.trim())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    })
}

/// HaGeZi wildcard lists: `*.domain`, `.domain`, or a bare domain, with
/// `#` comments. One leading `*.` or one leading `.` is stripped.
fn wildcard_candidates(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter_map(|line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        Some(
            line.strip_prefix("*.")
                .or_else(|| line.strip_prefix('.'))
                .unwrap_or(line),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(dialect: SourceDialect, text: &str) -> Vec<&str> {
        candidates(dialect, text).collect()
    }

    // -----------------------------------------------------------------------
    // Hosts dialect
    // -----------------------------------------------------------------------

    #[test]
    fn hosts_takes_last_field() {
        let text = "127.0.0.1 ads.adobe.com\n0.0.0.0 telemetry.adobe.io\n";
        assert_eq!(
            collect(SourceDialect::Hosts, text),
            vec!["ads.adobe.com", "telemetry.adobe.io"]
        );
    }

    #[test]
    fn hosts_accepts_bare_domains() {
        let text = "tracker.example\n";
        assert_eq!(collect(SourceDialect::Hosts, text), vec!["tracker.example"]);
    }

    #[test]
    fn hosts_skips_comments_and_blanks() {
        let text = "# header\n\n   \n0.0.0.0 a.example # inline note\n  # indented comment\n";
        assert_eq!(collect(SourceDialect::Hosts, text), vec!["a.example"]);
    }

    #[test]
    fn hosts_line_reduced_to_nothing_by_comment() {
        // The candidate itself sits behind the `#`; nothing is extracted.
        let text = "0.0.0.0 #commented.example\n";
        // Last field of "0.0.0.0" is the IP; the normalizer rejects it later.
        assert_eq!(collect(SourceDialect::Hosts, text), vec!["0.0.0.0"]);
    }

    #[test]
    fn hosts_handles_crlf() {
        let text = "0.0.0.0 a.example\r\n0.0.0.0 b.example\r\n";
        assert_eq!(
            collect(SourceDialect::Hosts, text),
            vec!["a.example", "b.example"]
        );
    }

    // -----------------------------------------------------------------------
    // AdGuard dialect
    // -----------------------------------------------------------------------

    #[test]
    fn adguard_extracts_exact_shape_only() {
        let text = concat!(
            "! comment line\n",
            "||ads.example.com^\n",
            "||tracker.example^$third-party\n", // modifier, dropped
            "@@||allowlisted.example^\n",       // exception, dropped
            "/banner[0-9]+/\n",                 // regex rule, dropped
            "||no-caret.example\n",             // missing ^, dropped
            "||wild.*.example^\n",              // matches; '*' handled at emit
        );
        assert_eq!(
            collect(SourceDialect::AdguardAdblock, text),
            vec!["ads.example.com", "wild.*.example"]
        );
    }

    #[test]
    fn adguard_empty_input() {
        assert!(collect(SourceDialect::AdguardAdblock, "").is_empty());
    }

    // -----------------------------------------------------------------------
    // Wildcard dialect
    // -----------------------------------------------------------------------

    #[test]
    fn wildcard_strips_markers() {
        let text = "*.piracy.example\n.tracker.example\nplain.example\n# comment\n";
        assert_eq!(
            collect(SourceDialect::WildcardDomains, text),
            vec!["piracy.example", "tracker.example", "plain.example"]
        );
    }

    #[test]
    fn wildcard_strips_single_marker_only() {
        // Only one leading marker comes off; interior dots stay.
        assert_eq!(
            collect(SourceDialect::WildcardDomains, "*.a.b.example\n"),
            vec!["a.b.example"]
        );
        assert_eq!(
            collect(SourceDialect::WildcardDomains, "..double.example\n"),
            vec![".double.example"]
        );
    }
}
