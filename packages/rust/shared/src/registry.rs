//! The source registry: which lists to fetch, how to parse them, and what
//! to emit.
//!
//! The registry is an explicit, immutable value handed to the pipeline —
//! never a module-level mutable. `Registry::builtin()` carries the
//! published source tables; a TOML file of the same shape can replace it
//! (`--registry <file>`, or `~/.config/ruleforge/registry.toml`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, RuleForgeError};
use crate::types::{ConverterKind, OutputFormat, RuleOrder, SourceDialect, slugify};

/// Default registry file name under the user config directory.
const REGISTRY_FILE_NAME: &str = "registry.toml";

/// Config directory name under the platform config root.
const CONFIG_DIR_NAME: &str = "ruleforge";

// ---------------------------------------------------------------------------
// Registry structs (matching registry.toml schema)
// ---------------------------------------------------------------------------

/// One fetched-and-emitted list: a label, a dialect, and its source URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSpec {
    /// Human-readable label; its slug names the output files.
    pub label: String,
    /// Rule syntax of the source text.
    pub dialect: SourceDialect,
    /// Source URLs, fetched in order. A failed fetch contributes nothing.
    pub sources: Vec<Url>,
}

impl ListSpec {
    /// File-name stem for this list's artifacts.
    pub fn slug(&self) -> String {
        slugify(&self.label)
    }
}

/// One pipeline: a group of lists sharing a target directory, an output
/// format, an ordering, and an optional compiled-artifact converter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSpec {
    /// Pipeline identifier, e.g. `hagezi-mihomo`.
    pub name: String,
    /// Output subdirectory under the run's output root, e.g. `surge`.
    pub target: String,
    /// Emitted rule syntax.
    pub format: OutputFormat,
    /// Dedup keying and ordering of emitted rules.
    #[serde(default)]
    pub order: RuleOrder,
    /// External compiler producing a sibling binary artifact, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converter: Option<ConverterKind>,
    /// Lists processed by this pipeline, in order.
    #[serde(rename = "list")]
    pub lists: Vec<ListSpec>,
}

impl PipelineSpec {
    /// The exact file names this pipeline owns inside its target directory.
    ///
    /// A pipeline may create, overwrite, or delete these and nothing else;
    /// output directories are shared with co-tenant pipelines.
    pub fn owned_files(&self) -> Vec<String> {
        let mut files = Vec::new();
        for list in &self.lists {
            let slug = list.slug();
            files.push(format!("{slug}.txt"));
            if let Some(converter) = self.converter {
                files.push(format!("{slug}.{}", converter.artifact_extension()));
            }
        }
        files
    }
}

/// The full set of configured pipelines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registry {
    #[serde(rename = "pipeline")]
    pub pipelines: Vec<PipelineSpec>,
}

impl Registry {
    /// Pipelines whose target directory matches `target`.
    pub fn for_target<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a PipelineSpec> {
        self.pipelines.iter().filter(move |p| p.target == target)
    }

    /// Look up a pipeline by name.
    pub fn pipeline(&self, name: &str) -> Option<&PipelineSpec> {
        self.pipelines.iter().find(|p| p.name == name)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Path of the user registry file, if a config directory exists.
pub fn registry_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(REGISTRY_FILE_NAME))
}

/// Load a registry from a TOML file.
pub fn load_registry(path: &Path) -> Result<Registry> {
    let text =
        std::fs::read_to_string(path).map_err(|e| RuleForgeError::io(path, e))?;
    let registry: Registry = toml::from_str(&text)
        .map_err(|e| RuleForgeError::registry(format!("{}: {e}", path.display())))?;
    validate(&registry)?;
    Ok(registry)
}

/// Resolve the active registry: explicit path → user registry file → builtin.
pub fn load_or_builtin(explicit: Option<&Path>) -> Result<Registry> {
    if let Some(path) = explicit {
        return load_registry(path);
    }
    if let Some(path) = registry_file_path() {
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading user registry");
            return load_registry(&path);
        }
    }
    Ok(Registry::builtin())
}

fn validate(registry: &Registry) -> Result<()> {
    if registry.pipelines.is_empty() {
        return Err(RuleForgeError::registry("no pipelines configured"));
    }
    for pipeline in &registry.pipelines {
        if pipeline.lists.is_empty() {
            return Err(RuleForgeError::registry(format!(
                "pipeline '{}' has no lists",
                pipeline.name
            )));
        }
        for list in &pipeline.lists {
            if list.sources.is_empty() {
                return Err(RuleForgeError::registry(format!(
                    "list '{}' in pipeline '{}' has no sources",
                    list.label, pipeline.name
                )));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Builtin registry
// ---------------------------------------------------------------------------

const FILTERS_REGISTRY: &str =
    "https://raw.githubusercontent.com/AdguardTeam/FiltersRegistry/master/filters";
const HAGEZI_WILDCARD: &str =
    "https://raw.githubusercontent.com/hagezi/dns-blocklists/main/wildcard";

const ADOBE_SOURCES: [&str; 2] = [
    "https://raw.githubusercontent.com/Ruddernation-Designs/Adobe-URL-Block-List/master/hosts",
    "https://raw.githubusercontent.com/ignaciocastro/a-dove-is-dumb/main/list.txt",
];

impl Registry {
    /// The published source tables: four AdGuard Surge lists, five sing-box
    /// feeds, four HaGeZi Surge lists, three HaGeZi mihomo lists, and the
    /// two Adobe outputs.
    pub fn builtin() -> Self {
        let adguard_lists = |urls: &[(&str, String)]| -> Vec<ListSpec> {
            urls.iter()
                .map(|(label, url)| ListSpec {
                    label: (*label).to_string(),
                    dialect: SourceDialect::AdguardAdblock,
                    sources: vec![parse_builtin_url(url)],
                })
                .collect()
        };

        let hagezi_list = |label: &str, files: &[&str]| ListSpec {
            label: label.to_string(),
            dialect: SourceDialect::WildcardDomains,
            sources: files
                .iter()
                .map(|f| parse_builtin_url(&format!("{HAGEZI_WILDCARD}/{f}-onlydomains.txt")))
                .collect(),
        };

        let adobe_list = |label: &str| ListSpec {
            label: label.to_string(),
            dialect: SourceDialect::Hosts,
            sources: ADOBE_SOURCES
                .iter()
                .map(|u| parse_builtin_url(u))
                .collect(),
        };

        let native_trackers = [
            "native.amazon",
            "native.apple",
            "native.huawei",
            "native.lgwebos",
            "native.oppo-realme",
            "native.roku",
            "native.samsung",
            "native.tiktok",
            "native.tiktok.extended",
            "native.vivo",
            "native.winoffice",
            "native.xiaomi",
        ];

        Self {
            pipelines: vec![
                PipelineSpec {
                    name: "adguard-surge".into(),
                    target: "surge".into(),
                    format: OutputFormat::SurgeDomainSetStrict,
                    order: RuleOrder::Rendered,
                    converter: None,
                    lists: adguard_lists(&[
                        (
                            "Adguard Tracking Protection filter",
                            format!("{FILTERS_REGISTRY}/filter_3_Spyware/filter.txt"),
                        ),
                        (
                            "Adguard Chinese filter",
                            format!("{FILTERS_REGISTRY}/filter_224_Chinese/filter.txt"),
                        ),
                        (
                            "Adguard Base filter",
                            format!("{FILTERS_REGISTRY}/filter_2_Base/filter.txt"),
                        ),
                        (
                            "Adguard DNS filter",
                            format!("{FILTERS_REGISTRY}/filter_15_DnsFilter/filter.txt"),
                        ),
                    ]),
                },
                PipelineSpec {
                    name: "adguard-singbox".into(),
                    target: "sing-box".into(),
                    format: OutputFormat::AdguardPassthrough,
                    order: RuleOrder::Rendered,
                    converter: Some(ConverterKind::SingBox),
                    lists: adguard_lists(&[
                        (
                            "adguard-dns-filter",
                            "https://adguardteam.github.io/AdGuardSDNSFilter/Filters/filter.txt"
                                .to_string(),
                        ),
                        ("anti-ad", "https://anti-ad.net/adguard.txt".to_string()),
                        (
                            "adguard-chinese-filter",
                            format!("{FILTERS_REGISTRY}/filter_224_Chinese/filter.txt"),
                        ),
                        (
                            "adguard-base-filter",
                            format!("{FILTERS_REGISTRY}/filter_2_Base/filter.txt"),
                        ),
                        (
                            "adguard-tracking-protection-filter",
                            format!("{FILTERS_REGISTRY}/filter_3_Spyware/filter.txt"),
                        ),
                    ]),
                },
                PipelineSpec {
                    name: "hagezi-surge".into(),
                    target: "surge".into(),
                    format: OutputFormat::SurgeDomainSet,
                    order: RuleOrder::Rendered,
                    converter: None,
                    lists: vec![
                        hagezi_list("Hagezi Anti-Piracy Filter", &["anti.piracy"]),
                        hagezi_list("Hagezi Native Tracker Filter", &native_trackers),
                        hagezi_list("Hagezi NSFW Filter", &["nsfw"]),
                        hagezi_list("Hagezi Threat Intelligence Feeds", &["tif"]),
                    ],
                },
                PipelineSpec {
                    name: "hagezi-mihomo".into(),
                    target: "mihomo".into(),
                    format: OutputFormat::MihomoDomain,
                    order: RuleOrder::Rendered,
                    converter: Some(ConverterKind::Mihomo),
                    lists: vec![
                        hagezi_list("Hagezi Anti-Piracy Filter", &["anti.piracy"]),
                        hagezi_list("Hagezi Native Tracker Filter", &native_trackers),
                        hagezi_list("Hagezi NSFW Filter", &["nsfw"]),
                    ],
                },
                PipelineSpec {
                    name: "adobe-surge".into(),
                    target: "surge".into(),
                    format: OutputFormat::SurgeDomainSet,
                    order: RuleOrder::Collated,
                    converter: None,
                    lists: vec![adobe_list("Adobe Verification")],
                },
                PipelineSpec {
                    name: "adobe-mihomo".into(),
                    target: "mihomo".into(),
                    format: OutputFormat::MihomoDomain,
                    order: RuleOrder::Collated,
                    converter: Some(ConverterKind::Mihomo),
                    lists: vec![adobe_list("Adobe Filter")],
                },
            ],
        }
    }
}

/// Builtin URLs are compile-time constants; a parse failure is a defect in
/// this file, not a runtime condition.
fn parse_builtin_url(url: &str) -> Url {
    Url::parse(url).unwrap_or_else(|e| panic!("builtin registry URL '{url}': {e}"))
}
