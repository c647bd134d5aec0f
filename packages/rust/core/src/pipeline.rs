//! End-to-end list pipeline: fetch → parse → normalize → dedup → emit →
//! optional compile.
//!
//! One sequential worker: each list runs to completion before the next.
//! Per-source and per-list failures are recorded and skipped; only an
//! error that escapes `run_registry` fails the process.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use ruleforge_convert::{self as convert, RulesetConverter};
use ruleforge_fetcher::Fetcher;
use ruleforge_rules::{DomainToken, candidates, normalize};
use ruleforge_shared::{
    ConverterKind, ListSpec, OutputFormat, PipelineSpec, Result, RuleForgeError,
};

// ---------------------------------------------------------------------------
// Run configuration and results
// ---------------------------------------------------------------------------

/// Configuration for a registry run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Root output directory; each pipeline writes under its target subdir.
    pub out_root: PathBuf,
    /// Explicit mihomo binary, overriding local/PATH lookup.
    pub mihomo_binary: Option<PathBuf>,
    /// Explicit sing-box binary, overriding local/PATH lookup.
    pub sing_box_binary: Option<PathBuf>,
}

impl RunConfig {
    pub fn new(out_root: impl Into<PathBuf>) -> Self {
        Self {
            out_root: out_root.into(),
            mihomo_binary: None,
            sing_box_binary: None,
        }
    }

    fn binary_override(&self, kind: ConverterKind) -> Option<&Path> {
        match kind {
            ConverterKind::Mihomo => self.mihomo_binary.as_deref(),
            ConverterKind::SingBox => self.sing_box_binary.as_deref(),
        }
    }
}

/// Outcome of one emitted list.
#[derive(Debug, Clone)]
pub struct ListOutcome {
    /// Human label from the registry.
    pub label: String,
    /// Written text artifact.
    pub file: PathBuf,
    /// Emitted rule count.
    pub rules: usize,
    /// Sources that contributed text.
    pub sources_fetched: usize,
    /// Sources skipped after a fetch failure.
    pub sources_skipped: usize,
    /// Compiled sibling artifact, when conversion succeeded.
    pub compiled: Option<PathBuf>,
    /// Conversion failure, when it didn't.
    pub compile_error: Option<String>,
}

/// Summary of one completed pipeline.
#[derive(Debug)]
pub struct PipelineReport {
    pub name: String,
    pub outcomes: Vec<ListOutcome>,
    /// (list label, error) pairs for lists that failed or didn't compile.
    pub failures: Vec<(String, String)>,
    pub elapsed: Duration,
}

/// Summary of a whole run.
#[derive(Debug)]
pub struct RunSummary {
    pub reports: Vec<PipelineReport>,
    /// (pipeline name, error) pairs for pipelines that failed outright.
    pub failures: Vec<(String, String)>,
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting run status.
pub trait Progress: Send + Sync {
    /// Called when entering a new phase (pipeline or list).
    fn phase(&self, name: &str);
    /// Called before each source download.
    fn source_fetching(&self, url: &str, current: usize, total: usize);
    /// Called after a list's text artifact is written.
    fn list_written(&self, file: &str, rules: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl Progress for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn source_fetching(&self, _url: &str, _current: usize, _total: usize) {}
    fn list_written(&self, _file: &str, _rules: usize) {}
}

// ---------------------------------------------------------------------------
// Registry run
// ---------------------------------------------------------------------------

/// Run every pipeline in order, constructing the real converters.
///
/// A pipeline failure is logged and recorded; remaining pipelines still run.
pub async fn run_registry(
    pipelines: &[PipelineSpec],
    config: &RunConfig,
    progress: &dyn Progress,
) -> Result<RunSummary> {
    let fetcher = Fetcher::new()?;
    let mut reports = Vec::new();
    let mut failures = Vec::new();

    for spec in pipelines {
        let converter = spec.converter.map(|kind| {
            let binary = convert::resolve_binary(kind, config.binary_override(kind));
            convert::converter_for(kind, binary)
        });

        match run_pipeline(
            spec,
            &config.out_root,
            &fetcher,
            converter.as_deref(),
            progress,
        )
        .await
        {
            Ok(report) => reports.push(report),
            Err(e) => {
                warn!(pipeline = %spec.name, error = %e, "pipeline failed, continuing");
                failures.push((spec.name.clone(), e.to_string()));
            }
        }
    }

    Ok(RunSummary { reports, failures })
}

// ---------------------------------------------------------------------------
// Single pipeline
// ---------------------------------------------------------------------------

/// Run one pipeline: manifest cleanup, then each list in order.
#[instrument(skip_all, fields(pipeline = %spec.name))]
pub async fn run_pipeline(
    spec: &PipelineSpec,
    out_root: &Path,
    fetcher: &Fetcher,
    converter: Option<&dyn RulesetConverter>,
    progress: &dyn Progress,
) -> Result<PipelineReport> {
    let start = Instant::now();

    let target_dir = out_root.join(&spec.target);
    std::fs::create_dir_all(&target_dir).map_err(|e| RuleForgeError::io(&target_dir, e))?;

    // Output directories are shared with co-tenant pipelines: stale cleanup
    // touches exactly the files this pipeline owns, never the directory.
    for name in spec.owned_files() {
        let path = target_dir.join(&name);
        match std::fs::remove_file(&path) {
            Ok(()) => debug!(file = %path.display(), "removed stale artifact"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(RuleForgeError::io(path, e)),
        }
    }

    info!(
        lists = spec.lists.len(),
        target = %target_dir.display(),
        "starting pipeline"
    );

    let mut outcomes: Vec<ListOutcome> = Vec::new();
    let mut failures: Vec<(String, String)> = Vec::new();

    for list in &spec.lists {
        progress.phase(&format!("Processing {}", list.label));

        match run_list(spec, list, &target_dir, fetcher, converter, progress).await {
            Ok(outcome) => {
                if let Some(err) = &outcome.compile_error {
                    failures.push((outcome.label.clone(), err.clone()));
                }
                outcomes.push(outcome);
            }
            Err(e) => {
                warn!(list = %list.label, error = %e, "list failed, continuing");
                failures.push((list.label.clone(), e.to_string()));
            }
        }
    }

    let report = PipelineReport {
        name: spec.name.clone(),
        outcomes,
        failures,
        elapsed: start.elapsed(),
    };

    info!(
        lists_written = report.outcomes.len(),
        failures = report.failures.len(),
        elapsed_ms = report.elapsed.as_millis(),
        "pipeline completed"
    );

    Ok(report)
}

/// Fetch, transform, and emit one list.
async fn run_list(
    spec: &PipelineSpec,
    list: &ListSpec,
    target_dir: &Path,
    fetcher: &Fetcher,
    converter: Option<&dyn RulesetConverter>,
    progress: &dyn Progress,
) -> Result<ListOutcome> {
    let slug = list.slug();
    let txt_path = target_dir.join(format!("{slug}.txt"));

    let mut sources_fetched = 0usize;
    let mut sources_skipped = 0usize;

    // Passthrough keeps the raw rule text; everything else goes through
    // parse → normalize into tokens.
    let mut raw = String::new();
    let mut tokens: Vec<DomainToken> = Vec::new();

    let total = list.sources.len();
    for (i, url) in list.sources.iter().enumerate() {
        progress.source_fetching(url.as_str(), i + 1, total);

        let body = match fetcher.fetch(url).await {
            Ok(body) => body,
            Err(e) => {
                // Source-unreachable: this source contributes nothing.
                warn!(%url, error = %e, "source unreachable, skipping");
                sources_skipped += 1;
                continue;
            }
        };
        sources_fetched += 1;

        if spec.format == OutputFormat::AdguardPassthrough {
            raw.push_str(&body);
            if !body.ends_with('\n') {
                raw.push('\n');
            }
        } else {
            tokens.extend(candidates(list.dialect, &body).filter_map(normalize));
        }
    }

    let rules = if spec.format == OutputFormat::AdguardPassthrough {
        ruleforge_emit::write_text(&txt_path, &raw)?;
        raw.lines().count()
    } else {
        let lines = ruleforge_emit::build_rules(spec.format, spec.order, tokens);
        ruleforge_emit::write_rules(&txt_path, &lines)?;
        lines.len()
    };

    progress.list_written(&format!("{slug}.txt"), rules);
    info!(file = %txt_path.display(), rules, sources_fetched, sources_skipped, "list written");

    let mut compiled = None;
    let mut compile_error = None;

    if let (Some(converter), Some(kind)) = (converter, spec.converter) {
        let out_path = target_dir.join(format!("{slug}.{}", kind.artifact_extension()));
        match converter.convert(&txt_path, &out_path) {
            Ok(()) => compiled = Some(out_path),
            Err(e) => {
                // Converter failure: the compiled artifact is simply absent.
                warn!(file = %txt_path.display(), error = %e, "ruleset compilation failed");
                compile_error = Some(e.to_string());
            }
        }
    }

    Ok(ListOutcome {
        label: list.label.clone(),
        file: txt_path,
        rules,
        sources_fetched,
        sources_skipped,
        compiled,
        compile_error,
    })
}
