//! Configuration errors raised while resolving a build variant.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used by the configuration layer.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Every defect in the build configuration. All of them are fatal and are raised before
/// any configuration is handed to the bundler.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// `APP` was set without `GIT_REPO`.
  #[error("APP is set to `{app_id}` but GIT_REPO is missing; refusing to fall back to the default implementation")]
  MissingSourceRepo {
    /// Selected application identifier.
    app_id: String,
  },

  /// The application identifier cannot be used as a directory or URL segment.
  #[error("invalid APP value `{0}`: must be a single path segment")]
  InvalidAppId(String),

  /// The fixed alias table tried to claim the variant alias.
  #[error("alias `{0}` is resolved from the build selector and cannot be declared as a fixed alias")]
  DuplicateLoadedAppAlias(String),

  /// A token rule refers to a branding field that does not exist.
  #[error("token `@{token}` refers to unknown branding field `{key}`")]
  UnknownBrandingField {
    /// Token name without the sentinel.
    token: String,
    /// Requested branding field.
    key: String,
  },

  /// The token name is empty or contains characters outside `[A-Za-z0-9_]`.
  #[error("invalid token name `{0}`")]
  InvalidToken(String),

  /// Two rules share a token name.
  #[error("token `@{0}` is declared more than once")]
  DuplicateToken(String),

  /// One token is a prefix of another, so match order would matter.
  #[error("token `@{shorter}` overlaps `@{longer}`")]
  OverlappingTokens {
    /// Token that is a prefix.
    shorter: String,
    /// Token that contains it.
    longer: String,
  },

  /// The project root cannot be made absolute.
  #[error("failed to resolve project root {path}: {source}")]
  InvalidRoot {
    /// Root as given.
    path: PathBuf,
    /// Underlying I/O error.
    source: std::io::Error,
  },

  /// The project configuration file exists but cannot be read.
  #[error("failed to read {path}: {source}")]
  ConfigRead {
    /// Offending file.
    path: PathBuf,
    /// Underlying I/O error.
    source: std::io::Error,
  },

  /// The project configuration file is malformed.
  #[error("failed to parse {path}: {message}")]
  ConfigParse {
    /// Offending file.
    path: PathBuf,
    /// Parser message.
    message: String,
  },

  /// The configuration file extension is not one we can parse.
  #[error("unsupported configuration format: {0}")]
  UnsupportedConfigFormat(PathBuf),
}
