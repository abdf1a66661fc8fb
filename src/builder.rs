//! Build planner that turns a selector into the configuration handed to the bundler.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::ProjectConfig;
use crate::error::{ConfigError, Result};
use crate::resolver::{AliasTable, ResolvedBuild, normalize_lexically, resolve_build};
use crate::selector::BuildSelector;
use crate::tokens::{TokenRuleDescriptor, TokenSubstitutor};

/// Everything resolved for one build invocation.
#[derive(Debug, Clone)]
pub struct BuildPlan {
  /// Alias table and output plan.
  pub resolved: ResolvedBuild,
  /// Token rules bound to the project's branding.
  pub tokens: TokenSubstitutor,
  /// Serializable document for the external bundler.
  pub bundler_config: BundlerConfig,
}

/// Configuration document consumed by the external bundler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundlerConfig {
  /// `production` or `development`.
  pub mode: &'static str,
  /// Source map style.
  pub devtool: &'static str,
  /// Named entry modules.
  pub entry: BTreeMap<String, PathBuf>,
  /// Output section.
  pub output: OutputSection,
  /// Module resolution section.
  pub resolve: ResolveSection,
  /// Token substitution stage.
  pub replacements: ReplacementSection,
  /// Compile-time constants.
  pub define: BTreeMap<String, String>,
  /// Development server, absent in production.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub dev_server: Option<DevServerSection>,
}

/// Output settings derived from the output plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSection {
  /// Output directory.
  pub path: PathBuf,
  /// Public base path.
  pub public_path: String,
  /// Filename template.
  pub filename: String,
  /// Empty the output directory before emitting.
  pub clean: bool,
}

/// Module resolution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolveSection {
  /// Search roots for bare imports.
  pub modules: Vec<String>,
  /// Extensions tried during resolution.
  pub extensions: Vec<String>,
  /// Alias table.
  pub alias: AliasTable,
}

/// Where and how token rules are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplacementSection {
  /// Regex source selecting files to rewrite.
  pub test: String,
  /// Directory names excluded from rewriting.
  pub exclude: Vec<String>,
  /// Rules, in order.
  pub rules: Vec<TokenRuleDescriptor>,
}

/// Development server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DevServerSection {
  /// Hosts the server answers for.
  pub allowed_hosts: String,
  /// Serve `index.html` for unknown routes.
  pub history_api_fallback: bool,
  /// Bind address.
  pub host: String,
  /// Listening port.
  pub port: u16,
  /// Directory served as static content.
  pub static_directory: PathBuf,
  /// Path the middleware serves the bundle under.
  pub public_path: String,
}

/// High-level helper for resolving a build against a project root.
#[derive(Debug, Clone)]
pub struct BuildPlanner {
  root: PathBuf,
  config: ProjectConfig,
}

impl BuildPlanner {
  /// Create a planner for the project at `root`.
  ///
  /// A relative root is resolved against the current directory once, here, so every path in
  /// the emitted configuration shares the same absolute, normalized form.
  pub fn new(root: impl AsRef<Path>, config: ProjectConfig) -> Result<Self> {
    let root = root.as_ref();
    let absolute = std::path::absolute(root).map_err(|source| ConfigError::InvalidRoot {
      path: root.to_path_buf(),
      source,
    })?;
    Ok(Self {
      root: normalize_lexically(&absolute),
      config,
    })
  }

  /// Project root.
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Loaded project configuration.
  pub fn config(&self) -> &ProjectConfig {
    &self.config
  }

  /// Build the token rules for this project's branding.
  pub fn token_substitutor(&self) -> Result<TokenSubstitutor> {
    TokenSubstitutor::from_branding(&self.config.branding, &self.config.tokens)
  }

  /// Resolve aliases, output layout and token rules for `selector`.
  ///
  /// All configuration errors surface here, before the bundler sees anything.
  pub fn plan(&self, selector: &BuildSelector) -> Result<BuildPlan> {
    info!("Environment: {}", selector.mode());

    let resolved = resolve_build(&self.root, &self.config.layout, selector)?;
    info!(
      loaded_app = %resolved.aliases.loaded_app().display(),
      app = selector.app_id.as_deref().unwrap_or("default"),
      "resolved application alias"
    );
    for (name, path) in resolved.aliases.iter() {
      debug!(alias = name, path = %path.display(), "alias");
    }

    let tokens = self.token_substitutor()?;
    debug!(rules = tokens.rules().len(), "token rules ready");

    let bundler_config = self.bundler_config(selector, &resolved, &tokens);
    Ok(BuildPlan {
      resolved,
      tokens,
      bundler_config,
    })
  }

  fn bundler_config(
    &self,
    selector: &BuildSelector,
    resolved: &ResolvedBuild,
    tokens: &TokenSubstitutor,
  ) -> BundlerConfig {
    let layout = &self.config.layout;

    let mut entry = BTreeMap::new();
    entry.insert("main".to_string(), self.config.entry_path(&self.root));

    let mut modules = vec![self.root.to_string_lossy().into_owned()];
    modules.extend(layout.resolve_modules.iter().cloned());

    let mut define = BTreeMap::new();
    define.insert(
      "process.env.NODE_ENV".to_string(),
      format!("\"{}\"", selector.node_env()),
    );

    let dev_server = (!selector.is_production).then(|| {
      let server = &self.config.dev_server;
      DevServerSection {
        allowed_hosts: server.allowed_hosts.clone(),
        history_api_fallback: server.history_api_fallback,
        host: server.host.clone(),
        port: server.port,
        static_directory: self.root.join(&layout.dist_dir),
        public_path: layout.default_public_path.clone(),
      }
    });

    BundlerConfig {
      mode: selector.mode(),
      devtool: "source-map",
      entry,
      output: OutputSection {
        path: resolved.output.output_directory.clone(),
        public_path: resolved.output.public_base_path.clone(),
        filename: resolved.output.filename_template.clone(),
        clean: true,
      },
      resolve: ResolveSection {
        modules,
        extensions: layout.resolve_extensions.clone(),
        alias: resolved.aliases.clone(),
      },
      replacements: ReplacementSection {
        test: extension_test(&self.config.rewrite.extensions),
        exclude: self.config.rewrite.excluded_dirs.clone(),
        rules: tokens.descriptors(),
      },
      define,
      dev_server,
    }
  }
}

fn extension_test(extensions: &[String]) -> String {
  let alternatives: Vec<String> = extensions.iter().map(|ext| regex::escape(ext)).collect();
  format!(r"\.({})$", alternatives.join("|"))
}
