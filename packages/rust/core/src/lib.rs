//! Pipeline orchestration for RuleForge.
//!
//! This crate wires the fetcher, parsers, emitters, and converters into the
//! run loop: [`run_registry`] over a set of [`PipelineSpec`]s, or
//! [`run_pipeline`] for one pipeline with injected collaborators.

pub mod pipeline;

pub use pipeline::{
    ListOutcome, PipelineReport, Progress, RunConfig, RunSummary, SilentProgress, run_pipeline,
    run_registry,
};
