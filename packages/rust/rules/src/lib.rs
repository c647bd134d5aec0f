//! Rule parsing and domain normalization.
//!
//! This crate turns fetched blocklist text into canonical domain tokens:
//! - [`parse::candidates`] — lazy, dialect-dispatched candidate extraction
//! - [`normalize::normalize`] — canonicalization into [`DomainToken`]

pub mod normalize;
pub mod parse;

pub use normalize::{DomainToken, normalize};
pub use parse::candidates;

#[cfg(test)]
mod tests {
    use super::*;
    use ruleforge_shared::SourceDialect;

    /// Parse and normalize in one pass, the way the pipeline does.
    fn tokens(dialect: SourceDialect, text: &str) -> Vec<String> {
        candidates(dialect, text)
            .filter_map(normalize)
            .map(DomainToken::into_string)
            .collect()
    }

    #[test]
    fn hosts_lines_yield_the_domain() {
        let text = "0.0.0.0 Ads.Example.COM.\n127.0.0.1 localhost\nbare.example\n";
        assert_eq!(
            tokens(SourceDialect::Hosts, text),
            vec!["ads.example.com", "bare.example"]
        );
    }

    #[test]
    fn wildcard_variants_converge() {
        // `*.foo.bar`, `.foo.bar`, and `foo.bar` all normalize identically.
        let text = "*.foo.bar\n.foo.bar\nfoo.bar\n";
        assert_eq!(
            tokens(SourceDialect::WildcardDomains, text),
            vec!["foo.bar", "foo.bar", "foo.bar"]
        );
    }

    #[test]
    fn ip_only_hosts_lines_contribute_nothing() {
        let text = "0.0.0.0\n255.255.255.255 10.0.0.1\n";
        assert!(tokens(SourceDialect::Hosts, text).is_empty());
    }
}
