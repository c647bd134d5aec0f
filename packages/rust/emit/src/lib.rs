//! Target-format rendering and artifact writing.
//!
//! Emitters are pure: the same token set always produces byte-identical
//! output. Dedup keying and ordering are deliberately per-emitter — two
//! targets consuming one token set may emit different-sized files because
//! the wildcard prefix is part of the dedup key.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::warn;

use ruleforge_rules::DomainToken;
use ruleforge_shared::{OutputFormat, Result, RuleForgeError, RuleOrder};

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render one token in the target syntax.
fn render(format: OutputFormat, token: &DomainToken) -> String {
    match format {
        OutputFormat::MihomoDomain => format!("+.{token}"),
        OutputFormat::SurgeDomainSet | OutputFormat::SurgeDomainSetStrict => {
            format!(".{token}")
        }
        OutputFormat::AdguardPassthrough => {
            unreachable!("passthrough feeds are written verbatim, not rendered")
        }
    }
}

/// True for rules the target format cannot carry; caller drops them.
fn invalid_for_target(format: OutputFormat, rule: &str) -> bool {
    matches!(format, OutputFormat::SurgeDomainSetStrict) && rule.contains('*')
}

/// Build the final, deduplicated, ordered rule lines for one list.
pub fn build_rules(
    format: OutputFormat,
    order: RuleOrder,
    tokens: impl IntoIterator<Item = DomainToken>,
) -> Vec<String> {
    let rendered: Vec<String> = match order {
        // Key and sort on the rendered rule string.
        RuleOrder::Rendered => tokens
            .into_iter()
            .map(|t| render(format, &t))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
        // Key on the bare token; collated order of the bare domain.
        RuleOrder::Collated => {
            let unique: BTreeSet<DomainToken> = tokens.into_iter().collect();
            let mut bare: Vec<DomainToken> = unique.into_iter().collect();
            bare.sort_by_cached_key(|t| collation_key(t.as_str()));
            bare.iter().map(|t| render(format, t)).collect()
        }
    };

    rendered
        .into_iter()
        .filter(|rule| {
            if invalid_for_target(format, rule) {
                warn!(rule = %rule, "dropping rule: target format forbids '*'");
                return false;
            }
            true
        })
        .collect()
}

/// Collation key for hosts-derived outputs: non-alphanumerics weigh less
/// than alphanumerics, full string as tie-break. Mirrors the locale-aware
/// ordering the published Adobe lists use.
fn collation_key(domain: &str) -> (String, String) {
    let primary: String = domain.chars().filter(|c| c.is_alphanumeric()).collect();
    (primary, domain.to_string())
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Write rule lines to `path`, one per line, trailing newline included.
pub fn write_rules(path: &Path, rules: &[String]) -> Result<()> {
    let mut text = String::with_capacity(rules.iter().map(|r| r.len() + 1).sum());
    for rule in rules {
        text.push_str(rule);
        text.push('\n');
    }
    std::fs::write(path, text).map_err(|e| RuleForgeError::io(path, e))
}

/// Write passthrough text verbatim.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).map_err(|e| RuleForgeError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruleforge_rules::normalize;

    fn toks(domains: &[&str]) -> Vec<DomainToken> {
        domains.iter().map(|d| normalize(d).unwrap()).collect()
    }

    #[test]
    fn mihomo_prefix_and_rendered_order() {
        let rules = build_rules(
            OutputFormat::MihomoDomain,
            RuleOrder::Rendered,
            toks(&["b.example", "a.example"]),
        );
        assert_eq!(rules, vec!["+.a.example", "+.b.example"]);
    }

    #[test]
    fn equal_tokens_collapse_to_one_line() {
        // Candidates that normalize identically dedup into a single rule.
        let rules = build_rules(
            OutputFormat::MihomoDomain,
            RuleOrder::Rendered,
            toks(&["foo.bar", "foo.bar.", "FOO.bar"]),
        );
        assert_eq!(rules, vec!["+.foo.bar"]);
    }

    #[test]
    fn surge_domain_set_prefix() {
        let rules = build_rules(
            OutputFormat::SurgeDomainSet,
            RuleOrder::Rendered,
            toks(&["ads.example.com"]),
        );
        assert_eq!(rules, vec![".ads.example.com"]);
    }

    #[test]
    fn strict_drops_wildcard_rules() {
        let rules = build_rules(
            OutputFormat::SurgeDomainSetStrict,
            RuleOrder::Rendered,
            toks(&["ads.example.com", "*.wild.example"]),
        );
        assert_eq!(rules, vec![".ads.example.com"]);
    }

    #[test]
    fn non_strict_keeps_wildcard_rules() {
        let rules = build_rules(
            OutputFormat::SurgeDomainSet,
            RuleOrder::Rendered,
            toks(&["*.wild.example"]),
        );
        assert_eq!(rules, vec![".*.wild.example"]);
    }

    #[test]
    fn collated_order_differs_from_rendered() {
        // Lexicographically "a-b.example" < "ab.example" ('-' < 'b'), but
        // collation compares alphanumeric projections first: "abexample"
        // vs "abexample" are equal, then the full-string tie-break applies;
        // against "ac.example" the projection decides.
        let rules = build_rules(
            OutputFormat::SurgeDomainSet,
            RuleOrder::Collated,
            toks(&["ac.example", "a-b.example", "ab.example"]),
        );
        assert_eq!(rules, vec![".a-b.example", ".ab.example", ".ac.example"]);

        let rendered = build_rules(
            OutputFormat::SurgeDomainSet,
            RuleOrder::Rendered,
            toks(&["ac.example", "a-b.example", "ab.example"]),
        );
        assert_eq!(rendered, vec![".a-b.example", ".ab.example", ".ac.example"]);

        // The orders split once the projection beats the hyphen: "b-a" vs "ba".
        let collated = build_rules(
            OutputFormat::SurgeDomainSet,
            RuleOrder::Collated,
            toks(&["baa.example", "b-ab.example"]),
        );
        assert_eq!(collated, vec![".baa.example", ".b-ab.example"]);

        let rendered = build_rules(
            OutputFormat::SurgeDomainSet,
            RuleOrder::Rendered,
            toks(&["baa.example", "b-ab.example"]),
        );
        assert_eq!(rendered, vec![".b-ab.example", ".baa.example"]);
    }

    #[test]
    fn collated_dedup_keys_on_bare_token() {
        let rules = build_rules(
            OutputFormat::MihomoDomain,
            RuleOrder::Collated,
            toks(&["dup.example", "dup.example"]),
        );
        assert_eq!(rules, vec!["+.dup.example"]);
    }

    #[test]
    fn emitting_twice_is_byte_identical() {
        let input = ["z.example", "a.example", "m-m.example"];
        let once = build_rules(OutputFormat::MihomoDomain, RuleOrder::Collated, toks(&input));
        let twice = build_rules(OutputFormat::MihomoDomain, RuleOrder::Collated, toks(&input));
        assert_eq!(once, twice);
    }

    #[test]
    fn write_rules_appends_newlines() {
        let dir = std::env::temp_dir().join(format!("ruleforge-emit-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rules.txt");

        write_rules(&path, &["+.a.example".into(), "+.b.example".into()]).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "+.a.example\n+.b.example\n");

        // Idempotent overwrite.
        write_rules(&path, &["+.a.example".into(), "+.b.example".into()]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), written);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
