//! Resolve the alias table and output plan for a build selector.
//!
//! Everything here is string and path composition. Nothing touches the filesystem; whether
//! the resolved directories exist is for the bundler to find out.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::{ConfigError, Result};
use crate::project::ProjectLayout;
use crate::selector::BuildSelector;

/// Alias whose target depends on the selected variant.
pub const LOADED_APP_ALIAS: &str = "loadedapp";

/// Output filename for production builds. `[fullhash]` changes with every distinct build.
pub const PRODUCTION_FILENAME_TEMPLATE: &str = "[name].[fullhash].js";

/// Output filename for development builds.
pub const DEVELOPMENT_FILENAME_TEMPLATE: &str = "[name].js";

/// Logical import names mapped to absolute directories.
///
/// The variant alias is held apart from the fixed aliases so it always has exactly one
/// target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
  fixed: BTreeMap<String, PathBuf>,
  loaded_app: PathBuf,
}

impl AliasTable {
  /// Target of an alias.
  pub fn get(&self, name: &str) -> Option<&Path> {
    if name == LOADED_APP_ALIAS {
      return Some(&self.loaded_app);
    }
    self.fixed.get(name).map(PathBuf::as_path)
  }

  /// Target of the variant alias.
  pub fn loaded_app(&self) -> &Path {
    &self.loaded_app
  }

  /// Fixed aliases in name order, followed by the variant alias.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
    self
      .fixed
      .iter()
      .map(|(name, path)| (name.as_str(), path.as_path()))
      .chain(std::iter::once((LOADED_APP_ALIAS, self.loaded_app.as_path())))
  }

  /// Number of aliases, the variant alias included.
  pub fn len(&self) -> usize {
    self.fixed.len() + 1
  }

  /// Always `false`: the variant alias is always present.
  pub fn is_empty(&self) -> bool {
    false
  }
}

impl Serialize for AliasTable {
  fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    let mut map = serializer.serialize_map(Some(self.len()))?;
    for (name, path) in self.iter() {
      map.serialize_entry(name, path)?;
    }
    map.end()
  }
}

/// Where and under which names the bundle is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputPlan {
  /// Absolute output directory.
  pub output_directory: PathBuf,
  /// URL path the bundle is served under.
  pub public_base_path: String,
  /// Bundler filename template.
  pub filename_template: String,
}

/// Alias table and output plan for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBuild {
  /// Import aliases.
  pub aliases: AliasTable,
  /// Output naming.
  pub output: OutputPlan,
}

/// Resolve aliases and output layout for `selector`.
///
/// Selecting a variant without an implementation tree is an error: falling back to the
/// stock components would quietly build the wrong application.
pub fn resolve_build(
  root: &Path,
  layout: &ProjectLayout,
  selector: &BuildSelector,
) -> Result<ResolvedBuild> {
  let root = normalize_lexically(root);

  if layout.aliases.contains_key(LOADED_APP_ALIAS) {
    return Err(ConfigError::DuplicateLoadedAppAlias(
      LOADED_APP_ALIAS.to_string(),
    ));
  }

  let variant = match &selector.app_id {
    Some(app_id) => {
      validate_app_id(app_id)?;
      let repo = selector
        .source_repo_path
        .as_deref()
        .ok_or_else(|| ConfigError::MissingSourceRepo {
          app_id: app_id.clone(),
        })?;
      Some((app_id.as_str(), repo))
    }
    None => None,
  };

  let fixed: BTreeMap<String, PathBuf> = layout
    .aliases
    .iter()
    .map(|(name, suffix)| (name.clone(), normalize_lexically(&root.join(suffix))))
    .collect();

  let loaded_app = match variant {
    Some((_, repo)) => root.join(repo).join(&layout.loaded_app_suffix),
    None => root.join(&layout.loaded_app_suffix),
  };

  let dist_root = normalize_lexically(&root.join(&layout.dist_dir));
  let (output_directory, public_base_path) = match variant {
    Some((app_id, _)) => (dist_root.join(app_id), format!("/{app_id}")),
    None => (dist_root, layout.default_public_path.clone()),
  };

  let filename_template = if selector.is_production {
    PRODUCTION_FILENAME_TEMPLATE
  } else {
    DEVELOPMENT_FILENAME_TEMPLATE
  };

  Ok(ResolvedBuild {
    aliases: AliasTable {
      fixed,
      loaded_app: normalize_lexically(&loaded_app),
    },
    output: OutputPlan {
      output_directory,
      public_base_path,
      filename_template: filename_template.to_string(),
    },
  })
}

fn validate_app_id(app_id: &str) -> Result<()> {
  let invalid = app_id == "."
    || app_id == ".."
    || app_id.contains(['/', '\\'])
    || app_id.chars().any(char::is_whitespace);
  if invalid {
    Err(ConfigError::InvalidAppId(app_id.to_string()))
  } else {
    Ok(())
  }
}

/// Fold `.` and `..` components without consulting the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
  let mut normalized = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => {
        let popped = matches!(
          normalized.components().next_back(),
          Some(Component::Normal(_))
        ) && normalized.pop();
        if !popped && !normalized.has_root() {
          normalized.push("..");
        }
      }
      other => normalized.push(other.as_os_str()),
    }
  }
  normalized
}

#[cfg(test)]
mod tests {
  use super::*;

  fn root() -> PathBuf {
    PathBuf::from("/work/arcademap")
  }

  fn selector(app: Option<&str>, repo: Option<&str>, production: bool) -> BuildSelector {
    BuildSelector {
      app_id: app.map(String::from),
      source_repo_path: repo.map(PathBuf::from),
      is_production: production,
    }
  }

  fn resolve(selector: &BuildSelector) -> Result<ResolvedBuild> {
    resolve_build(&root(), &ProjectLayout::default(), selector)
  }

  #[test]
  fn default_variant_ignores_source_repo() {
    for repo in [None, Some("/repos/other")] {
      let build = resolve(&selector(None, repo, false)).unwrap();
      assert_eq!(
        build.aliases.loaded_app(),
        Path::new("/work/arcademap/main/components")
      );
    }
  }

  #[test]
  fn variant_resolves_into_source_repo() {
    let build = resolve(&selector(Some("foo"), Some("/repos/foo"), false)).unwrap();
    assert_eq!(
      build.aliases.loaded_app(),
      Path::new("/repos/foo/main/components")
    );
  }

  #[test]
  fn relative_source_repo_is_taken_from_root() {
    let build = resolve(&selector(Some("foo"), Some("../foo-app"), false)).unwrap();
    assert_eq!(
      build.aliases.loaded_app(),
      Path::new("/work/foo-app/main/components")
    );
  }

  #[test]
  fn variant_without_source_repo_is_fatal() {
    let err = resolve(&selector(Some("foo"), None, true)).unwrap_err();
    assert!(matches!(err, ConfigError::MissingSourceRepo { ref app_id } if app_id == "foo"));
  }

  #[test]
  fn fixed_aliases_do_not_depend_on_selector() {
    let stock = resolve(&selector(None, None, false)).unwrap();
    let variant = resolve(&selector(Some("foo"), Some("/repos/foo"), true)).unwrap();

    assert_eq!(stock.aliases.len(), 12);
    for (name, path) in stock.aliases.iter() {
      if name != LOADED_APP_ALIAS {
        assert_eq!(variant.aliases.get(name), Some(path));
      }
    }
    assert_eq!(
      stock.aliases.get("papabearpages"),
      Some(Path::new("/work/arcademap/papabear-ui/src/pages"))
    );
  }

  #[test]
  fn default_output_plan() {
    let build = resolve(&selector(None, None, false)).unwrap();
    assert_eq!(build.output, OutputPlan {
      output_directory: PathBuf::from("/work/arcademap/dist"),
      public_base_path: "/arcademap".into(),
      filename_template: "[name].js".into(),
    });
  }

  #[test]
  fn variant_output_plan() {
    let build = resolve(&selector(Some("foo"), Some("/repos/foo"), true)).unwrap();
    assert_eq!(
      build.output.output_directory,
      PathBuf::from("/work/arcademap/dist/foo")
    );
    assert_eq!(build.output.public_base_path, "/foo");
    assert!(build.output.filename_template.contains("[fullhash]"));
  }

  #[test]
  fn development_template_is_stable() {
    let first = resolve(&selector(Some("foo"), Some("/repos/foo"), false)).unwrap();
    let second = resolve(&selector(Some("foo"), Some("/repos/foo"), false)).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.output.filename_template, "[name].js");
  }

  #[test]
  fn rejects_app_ids_that_escape_dist() {
    for app in ["..", "a/b", "a\\b", "my app"] {
      let err = resolve(&selector(Some(app), Some("/repos/foo"), false)).unwrap_err();
      assert!(matches!(err, ConfigError::InvalidAppId(_)), "{app}");
    }
  }

  #[test]
  fn rejects_fixed_loadedapp_alias() {
    let mut layout = ProjectLayout::default();
    layout
      .aliases
      .insert(LOADED_APP_ALIAS.into(), "elsewhere".into());
    let err = resolve_build(&root(), &layout, &selector(None, None, false)).unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateLoadedAppAlias(_)));
  }

  #[test]
  fn serializes_variant_alias_exactly_once() {
    let build = resolve(&selector(Some("foo"), Some("/repos/foo"), false)).unwrap();
    assert_eq!(
      build.aliases.get(LOADED_APP_ALIAS),
      Some(build.aliases.loaded_app())
    );

    let json = serde_json::to_value(&build.aliases).unwrap();
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), build.aliases.len());
    assert_eq!(object["loadedapp"], "/repos/foo/main/components");
    assert_eq!(
      build.aliases.iter().filter(|(name, _)| *name == LOADED_APP_ALIAS).count(),
      1
    );
  }

  #[test]
  fn normalizes_without_filesystem() {
    assert_eq!(
      normalize_lexically(Path::new("/a/./b/../c")),
      PathBuf::from("/a/c")
    );
    assert_eq!(normalize_lexically(Path::new("/..")), PathBuf::from("/"));
    assert_eq!(
      normalize_lexically(Path::new("../x/../y")),
      PathBuf::from("../y")
    );
  }
}
