//! Environment-derived inputs that pick which variant and mode is being built.

use std::path::PathBuf;

/// Environment variable selecting production output.
pub const NODE_ENV_VAR: &str = "NODE_ENV";
/// Environment variable naming the white-label application.
pub const APP_VAR: &str = "APP";
/// Environment variable pointing at the application's implementation tree.
pub const GIT_REPO_VAR: &str = "GIT_REPO";

/// Inputs read once per build invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSelector {
  /// White-label variant being built. `None` builds the stock application.
  pub app_id: Option<String>,
  /// Alternate implementation tree. Only consulted when `app_id` is set.
  pub source_repo_path: Option<PathBuf>,
  /// Whether `NODE_ENV` selected a production build.
  pub is_production: bool,
}

impl BuildSelector {
  /// Read the selector from the process environment.
  pub fn from_env() -> Self {
    Self::from_lookup(|name| std::env::var(name).ok())
  }

  /// Build a selector from an arbitrary variable lookup.
  ///
  /// Empty values are treated as unset, matching how shell scripts usually export
  /// `APP=` to clear a variant.
  pub fn from_lookup<F>(lookup: F) -> Self
  where
    F: Fn(&str) -> Option<String>,
  {
    let non_empty = |name: &str| {
      lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
    };

    Self {
      app_id: non_empty(APP_VAR),
      source_repo_path: non_empty(GIT_REPO_VAR).map(PathBuf::from),
      is_production: lookup(NODE_ENV_VAR).as_deref() == Some("production"),
    }
  }

  /// Bundler mode string.
  pub fn mode(&self) -> &'static str {
    if self.is_production {
      "production"
    } else {
      "development"
    }
  }

  /// `NODE_ENV` value forwarded to the bundle's define table.
  pub fn node_env(&self) -> &'static str {
    self.mode()
  }
}
