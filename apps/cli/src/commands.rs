//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use ruleforge_core::{Progress, RunConfig, RunSummary, run_registry};
use ruleforge_shared::{PipelineSpec, Registry, load_or_builtin};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// RuleForge — turn public blocklists into proxy/DNS rule-sets.
#[derive(Parser)]
#[command(
    name = "ruleforge",
    version,
    about = "Fetch domain-blocklists and re-emit them as Surge, mihomo, and sing-box rule-sets.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch, transform, and emit the configured rule-sets.
    Run {
        /// Only run pipelines emitting into this target (surge, mihomo, sing-box).
        #[arg(short, long)]
        target: Option<String>,

        /// Only run the named pipeline.
        #[arg(short, long)]
        pipeline: Option<String>,

        /// Output root directory.
        #[arg(short, long, default_value = "dist")]
        out: PathBuf,

        /// Registry TOML file (defaults to the user registry, then builtin).
        #[arg(long)]
        registry: Option<PathBuf>,

        /// Explicit mihomo binary path.
        #[arg(long)]
        mihomo_bin: Option<PathBuf>,

        /// Explicit sing-box binary path.
        #[arg(long)]
        sing_box_bin: Option<PathBuf>,
    },

    /// Print the active registry.
    List {
        /// Registry TOML file (defaults to the user registry, then builtin).
        #[arg(long)]
        registry: Option<PathBuf>,

        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "ruleforge=info",
        1 => "ruleforge=debug",
        _ => "ruleforge=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            target,
            pipeline,
            out,
            registry,
            mihomo_bin,
            sing_box_bin,
        } => {
            cmd_run(
                target.as_deref(),
                pipeline.as_deref(),
                out,
                registry.as_deref(),
                mihomo_bin,
                sing_box_bin,
            )
            .await
        }
        Command::List { registry, json } => cmd_list(registry.as_deref(), json),
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

async fn cmd_run(
    target: Option<&str>,
    pipeline: Option<&str>,
    out: PathBuf,
    registry_path: Option<&std::path::Path>,
    mihomo_bin: Option<PathBuf>,
    sing_box_bin: Option<PathBuf>,
) -> Result<()> {
    let registry = load_or_builtin(registry_path)?;
    let pipelines = select_pipelines(&registry, target, pipeline)?;

    info!(
        pipelines = pipelines.len(),
        out = %out.display(),
        "starting run"
    );

    let config = RunConfig {
        out_root: out,
        mihomo_binary: mihomo_bin,
        sing_box_binary: sing_box_bin,
    };

    let reporter = CliProgress::new();
    let summary = run_registry(&pipelines, &config, &reporter).await?;
    reporter.finish();

    print_summary(&summary);
    Ok(())
}

/// Apply `--target` and `--pipeline` filters to the registry.
fn select_pipelines(
    registry: &Registry,
    target: Option<&str>,
    pipeline: Option<&str>,
) -> Result<Vec<PipelineSpec>> {
    if let Some(name) = pipeline {
        let spec = registry
            .pipeline(name)
            .ok_or_else(|| eyre!("no pipeline named '{name}' in the registry"))?;
        return Ok(vec![spec.clone()]);
    }

    let selected: Vec<PipelineSpec> = match target {
        Some(target) => registry.for_target(target).cloned().collect(),
        None => registry.pipelines.clone(),
    };

    if selected.is_empty() {
        return Err(eyre!("no pipelines match the given filters"));
    }
    Ok(selected)
}

fn print_summary(summary: &RunSummary) {
    println!();
    for report in &summary.reports {
        let rules: usize = report.outcomes.iter().map(|o| o.rules).sum();
        println!(
            "  {}: {} lists, {} rules, {:.1}s",
            report.name,
            report.outcomes.len(),
            rules,
            report.elapsed.as_secs_f64()
        );
        for outcome in &report.outcomes {
            let compiled = match &outcome.compiled {
                Some(path) => format!("  → {}", path.display()),
                None => String::new(),
            };
            println!(
                "    {} ({} rules){compiled}",
                outcome.file.display(),
                outcome.rules
            );
        }
        for (label, error) in &report.failures {
            println!("    ! {label}: {error}");
        }
    }
    for (name, error) in &summary.failures {
        println!("  ! {name}: {error}");
    }
    println!();
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn cmd_list(registry_path: Option<&std::path::Path>, json: bool) -> Result<()> {
    let registry = load_or_builtin(registry_path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&registry)?);
        return Ok(());
    }

    for pipeline in &registry.pipelines {
        let converter = pipeline
            .converter
            .map(|c| format!(", converter: {c}"))
            .unwrap_or_default();
        println!(
            "{}  (target: {}{converter})",
            pipeline.name, pipeline.target
        );
        for list in &pipeline.lists {
            println!("  {} — {} source(s)", list.slug(), list.sources.len());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl Progress for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn source_fetching(&self, url: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Fetching [{current}/{total}] {url}"));
    }

    fn list_written(&self, file: &str, rules: usize) {
        self.spinner.println(format!("  wrote {file} ({rules} rules)"));
    }
}
