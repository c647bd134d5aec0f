//! Core domain types for RuleForge pipelines.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SourceDialect
// ---------------------------------------------------------------------------

/// The rule syntax a fetched list is written in.
///
/// Parsing dispatches on this tag; adding a dialect means adding a variant
/// and its parser, without touching any emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceDialect {
    /// `<ip> <domain>` hosts-file lines (Adobe block lists).
    Hosts,
    /// AdGuard adblock syntax; only `||domain^` rules are extracted.
    AdguardAdblock,
    /// HaGeZi wildcard lists: `*.domain`, `.domain`, or bare domains.
    WildcardDomains,
}

// ---------------------------------------------------------------------------
// OutputFormat
// ---------------------------------------------------------------------------

/// Target syntax a list is emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// `+.domain` per line — mihomo `domain` ruleset text.
    MihomoDomain,
    /// `.domain` per line — Surge DOMAIN-SET.
    SurgeDomainSet,
    /// `.domain` per line; rendered rules still carrying `*` are dropped
    /// with a warning (Surge rejects wildcard entries in a DOMAIN-SET).
    SurgeDomainSetStrict,
    /// Fetched AdGuard rule text written verbatim, for the sing-box
    /// compiler's `--type adguard` input.
    AdguardPassthrough,
}

// ---------------------------------------------------------------------------
// RuleOrder
// ---------------------------------------------------------------------------

/// Ordering (and dedup keying) of the emitted rule lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleOrder {
    /// Key and sort lexicographically on the rendered rule string.
    #[default]
    Rendered,
    /// Key on the bare domain; collated order (hosts-derived feeds).
    Collated,
}

// ---------------------------------------------------------------------------
// ConverterKind
// ---------------------------------------------------------------------------

/// The external compiler that turns a text artifact into a binary ruleset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConverterKind {
    /// `mihomo convert-ruleset domain text <in> <out>` → `.mrs`
    Mihomo,
    /// `sing-box rule-set convert <in> --output <out> --type adguard` → `.srs`
    SingBox,
}

impl ConverterKind {
    /// Executable name looked up when no explicit binary path is given.
    pub fn binary_name(&self) -> &'static str {
        match self {
            Self::Mihomo => "mihomo",
            Self::SingBox => "sing-box",
        }
    }

    /// File extension of the compiled sibling artifact.
    pub fn artifact_extension(&self) -> &'static str {
        match self {
            Self::Mihomo => "mrs",
            Self::SingBox => "srs",
        }
    }
}

impl std::fmt::Display for ConverterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.binary_name())
    }
}

// ---------------------------------------------------------------------------
// slugify
// ---------------------------------------------------------------------------

/// Generate a file-name-safe slug from a human-readable list label.
///
/// `"Adguard Tracking Protection filter"` → `"adguard-tracking-protection-filter"`.
pub fn slugify(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_labels() {
        assert_eq!(
            slugify("Adguard Tracking Protection filter"),
            "adguard-tracking-protection-filter"
        );
        assert_eq!(slugify("Hagezi NSFW Filter"), "hagezi-nsfw-filter");
        assert_eq!(slugify("Adobe  Verification"), "adobe-verification");
        // Already-slugged labels pass through unchanged.
        assert_eq!(slugify("anti-ad"), "anti-ad");
    }

    #[test]
    fn dialect_serde_names() {
        let json = serde_json::to_string(&SourceDialect::AdguardAdblock).unwrap();
        assert_eq!(json, "\"adguard-adblock\"");
        let parsed: SourceDialect = serde_json::from_str("\"wildcard-domains\"").unwrap();
        assert_eq!(parsed, SourceDialect::WildcardDomains);
    }

    #[test]
    fn converter_artifact_extensions() {
        assert_eq!(ConverterKind::Mihomo.artifact_extension(), "mrs");
        assert_eq!(ConverterKind::SingBox.artifact_extension(), "srs");
    }
}
