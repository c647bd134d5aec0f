//! Shared types, error model, and source registry for RuleForge.
//!
//! This crate is the foundation depended on by all other RuleForge crates.
//! It provides:
//! - [`RuleForgeError`] — the unified error type
//! - Domain enums ([`SourceDialect`], [`OutputFormat`], [`RuleOrder`],
//!   [`ConverterKind`]) and [`slugify`]
//! - The source registry ([`Registry`], [`PipelineSpec`], [`ListSpec`],
//!   registry loading)

pub mod error;
pub mod registry;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use error::{Result, RuleForgeError};
pub use registry::{
    ListSpec, PipelineSpec, Registry, load_or_builtin, load_registry, registry_file_path,
};
pub use types::{ConverterKind, OutputFormat, RuleOrder, SourceDialect, slugify};
