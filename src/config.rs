//! Project configuration loader for describing variants, branding and layout.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::branding::BrandingConstants;
use crate::error::{ConfigError, Result};
use crate::project::ProjectLayout;
use crate::tokens::{SourceFilter, TokenBinding, default_token_table};

/// File names searched for in the project root, in order.
pub const CONFIG_FILE_CANDIDATES: &[&str] = &[
  "whitelabel.config.json",
  "whitelabel.config.yaml",
  "whitelabel.config.yml",
];

/// Development server settings forwarded to the bundler.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DevServerConfig {
  /// Bind address.
  pub host: String,
  /// Listening port.
  pub port: u16,
  /// Hosts the server answers for.
  pub allowed_hosts: String,
  /// Serve `index.html` for unknown routes.
  pub history_api_fallback: bool,
}

impl Default for DevServerConfig {
  fn default() -> Self {
    Self {
      host: "0.0.0.0".into(),
      port: 3001,
      allowed_hosts: "all".into(),
      history_api_fallback: true,
    }
  }
}

/// Everything a project can override; each section falls back to the stock variant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectConfig {
  /// Directory layout and fixed aliases.
  pub layout: ProjectLayout,
  /// Branding values substituted into sources.
  pub branding: BrandingConstants,
  /// Token table.
  pub tokens: Vec<TokenBinding>,
  /// Files that go through token substitution.
  pub rewrite: SourceFilter,
  /// Development server settings.
  pub dev_server: DevServerConfig,
}

impl Default for ProjectConfig {
  fn default() -> Self {
    Self {
      layout: ProjectLayout::default(),
      branding: BrandingConstants::default(),
      tokens: default_token_table(),
      rewrite: SourceFilter::default(),
      dev_server: DevServerConfig::default(),
    }
  }
}

impl ProjectConfig {
  /// Load the first configuration file found in `root`.
  ///
  /// A project without a configuration file builds the stock variant. A file that exists but
  /// cannot be read or parsed is an error: a half-applied configuration would brand the
  /// build incorrectly.
  pub fn discover(root: &Path) -> Result<Self> {
    for name in CONFIG_FILE_CANDIDATES {
      if let Some(config) = Self::load_if_present(&root.join(name))? {
        return Ok(config);
      }
    }
    Ok(Self::default())
  }

  /// Read configuration from a specific JSON or YAML file.
  pub fn from_path(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::ConfigRead {
      path: path.to_path_buf(),
      source,
    })?;
    Self::parse(path, &content)
  }

  fn load_if_present(path: &Path) -> Result<Option<Self>> {
    match fs::read_to_string(path) {
      Ok(content) => Self::parse(path, &content).map(Some),
      Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
      Err(source) => Err(ConfigError::ConfigRead {
        path: path.to_path_buf(),
        source,
      }),
    }
  }

  fn parse(path: &Path, content: &str) -> Result<Self> {
    let parse_error = |message: String| ConfigError::ConfigParse {
      path: path.to_path_buf(),
      message,
    };

    match path.extension().and_then(|ext| ext.to_str()) {
      Some("json") => serde_json::from_str(content).map_err(|err| parse_error(err.to_string())),
      Some("yaml" | "yml") => {
        serde_yaml::from_str(content).map_err(|err| parse_error(err.to_string()))
      }
      _ => Err(ConfigError::UnsupportedConfigFormat(path.to_path_buf())),
    }
  }
}

impl ProjectConfig {
  /// Absolute entry module for `root`.
  pub fn entry_path(&self, root: &Path) -> PathBuf {
    root.join(&self.layout.entry)
  }
}
