//! Command-line entry point: resolves the build once from the environment and emits the
//! bundler configuration, or mirrors a source tree with branding tokens applied.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use whitelabel_build::{BuildPlanner, BuildSelector, ProjectConfig, logger, rewrite_tree};

#[derive(Debug, Parser)]
#[command(name = "whitelabel-build", version, about)]
struct Cli {
  /// Enable debug logging.
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Only log errors.
  #[arg(short, long, global = true)]
  quiet: bool,

  /// Disable coloured log output.
  #[arg(long, global = true)]
  no_color: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Resolve NODE_ENV, APP and GIT_REPO and print the bundler configuration.
  Plan(PlanArgs),
  /// Copy a source tree, substituting branding tokens.
  Rewrite(RewriteArgs),
}

#[derive(Debug, Args)]
struct ProjectArgs {
  /// Project root.
  #[arg(long, default_value = ".")]
  root: PathBuf,

  /// Explicit configuration file instead of discovery in the root.
  #[arg(long)]
  config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct PlanArgs {
  #[command(flatten)]
  project: ProjectArgs,

  /// Write the configuration here instead of stdout.
  #[arg(long)]
  output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RewriteArgs {
  #[command(flatten)]
  project: ProjectArgs,

  /// Source tree.
  #[arg(long)]
  src: PathBuf,

  /// Destination tree.
  #[arg(long)]
  out: PathBuf,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  logger::init_logger(cli.verbose, cli.quiet, cli.no_color);

  match cli.command {
    Command::Plan(args) => plan(args),
    Command::Rewrite(args) => rewrite(args),
  }
}

fn planner(args: &ProjectArgs) -> Result<BuildPlanner> {
  let root = std::path::absolute(&args.root)
    .with_context(|| format!("failed to resolve {}", args.root.display()))?;
  let config = match &args.config {
    Some(path) => ProjectConfig::from_path(path)?,
    None => ProjectConfig::discover(&root)?,
  };
  Ok(BuildPlanner::new(root, config)?)
}

fn plan(args: PlanArgs) -> Result<()> {
  let planner = planner(&args.project)?;
  let selector = BuildSelector::from_env();
  let plan = planner.plan(&selector)?;

  let json = serde_json::to_string_pretty(&plan.bundler_config)
    .context("failed to serialize bundler configuration")?;
  match args.output {
    Some(path) => write_output(&path, &json)?,
    None => println!("{json}"),
  }
  Ok(())
}

fn write_output(path: &Path, json: &str) -> Result<()> {
  if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
    fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
  }
  fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
  info!(path = %path.display(), "wrote bundler configuration");
  Ok(())
}

fn rewrite(args: RewriteArgs) -> Result<()> {
  let planner = planner(&args.project)?;
  let tokens = planner.token_substitutor()?;
  let report = rewrite_tree(&tokens, &planner.config().rewrite, &args.src, &args.out)?;
  info!(
    rewritten = report.rewritten,
    copied = report.copied,
    "rewrote {}",
    args.out.display()
  );
  Ok(())
}
