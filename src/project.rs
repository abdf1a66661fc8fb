//! Filesystem layout of a white-label project, relative to its root directory.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Aliases shared by every variant, mapped to root-relative directories.
pub fn default_fixed_aliases() -> BTreeMap<String, String> {
  [
    ("app", "main/components"),
    ("appconstants", "main/constants"),
    ("apphelpers", "main/helpers"),
    ("appactions", "main/actions"),
    ("papabear", "papabear-ui/src/components"),
    ("papabearconstants", "papabear-ui/src/constants"),
    ("papabearactions", "papabear-ui/src/actions"),
    ("papabearhelpers", "papabear-ui/src/helpers"),
    ("papabearpages", "papabear-ui/src/pages"),
    ("gamemaster", "gamemaster/src/components"),
    ("gamemasterconstants", "gamemaster/src/constants"),
  ]
  .into_iter()
  .map(|(name, suffix)| (name.to_string(), suffix.to_string()))
  .collect()
}

/// Directory and naming conventions the resolver composes paths from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectLayout {
  /// Output root, relative to the project root.
  pub dist_dir: String,
  /// Public base path used when no variant is selected.
  pub default_public_path: String,
  /// Suffix appended to the implementation tree for the `loadedapp` alias.
  pub loaded_app_suffix: String,
  /// Selector-independent aliases.
  pub aliases: BTreeMap<String, String>,
  /// Application entry module, relative to the project root.
  pub entry: String,
  /// Directories the bundler searches for bare imports.
  pub resolve_modules: Vec<String>,
  /// Extensions the bundler tries when resolving imports.
  pub resolve_extensions: Vec<String>,
}

impl Default for ProjectLayout {
  fn default() -> Self {
    Self {
      dist_dir: "dist".into(),
      default_public_path: "/arcademap".into(),
      loaded_app_suffix: "main/components".into(),
      aliases: default_fixed_aliases(),
      entry: "src/index.js".into(),
      resolve_modules: ["src", "main", "node_modules"].map(String::from).to_vec(),
      resolve_extensions: ["*", ".js", ".jsx", ".tsx", ".json"].map(String::from).to_vec(),
    }
  }
}
