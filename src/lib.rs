#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod branding;
pub mod builder;
pub mod config;
pub mod error;
pub mod logger;
pub mod project;
pub mod resolver;
pub mod rewrite;
pub mod selector;
pub mod tokens;

pub use branding::BrandingConstants;
pub use builder::{BuildPlan, BuildPlanner, BundlerConfig};
pub use config::ProjectConfig;
pub use error::ConfigError;
pub use project::ProjectLayout;
pub use resolver::{AliasTable, OutputPlan, ResolvedBuild, resolve_build};
pub use rewrite::{RewriteReport, rewrite_tree};
pub use selector::BuildSelector;
pub use tokens::{TokenRule, TokenBinding, TokenSubstitutor};
