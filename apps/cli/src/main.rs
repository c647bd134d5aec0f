//! RuleForge CLI — blocklist-to-ruleset transcoding tool.
//!
//! Fetches published domain-blocklists and re-emits them as Surge
//! DOMAIN-SET files, mihomo domain rulesets, and sing-box rule-sets.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
