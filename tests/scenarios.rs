use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::tempdir;
use whitelabel_build::{
  BrandingConstants, BuildPlanner, BuildSelector, ConfigError, ProjectConfig, TokenBinding,
  TokenSubstitutor,
};

fn selector_from(vars: &[(&str, &str)]) -> BuildSelector {
  let vars: HashMap<&str, &str> = vars.iter().copied().collect();
  BuildSelector::from_lookup(|name| vars.get(name).map(|value| value.to_string()))
}

#[test]
fn stock_development_build() {
  let root = PathBuf::from("/srv/arcademap");
  let planner = BuildPlanner::new(&root, ProjectConfig::default()).unwrap();

  let plan = planner.plan(&selector_from(&[])).unwrap();

  assert_eq!(plan.resolved.output.output_directory, root.join("dist"));
  assert_eq!(plan.resolved.output.public_base_path, "/arcademap");
  assert_eq!(plan.resolved.output.filename_template, "[name].js");
  assert_eq!(
    plan.resolved.aliases.loaded_app(),
    Path::new("/srv/arcademap/main/components")
  );
}

#[test]
fn production_variant_build() {
  let root = PathBuf::from("/srv/arcademap");
  let planner = BuildPlanner::new(&root, ProjectConfig::default()).unwrap();

  let plan = planner
    .plan(&selector_from(&[
      ("NODE_ENV", "production"),
      ("APP", "foo"),
      ("GIT_REPO", "/repos/foo"),
    ]))
    .unwrap();

  assert_eq!(plan.resolved.output.output_directory, root.join("dist/foo"));
  assert_eq!(plan.resolved.output.public_base_path, "/foo");
  assert!(plan.resolved.output.filename_template.contains("[fullhash]"));
  assert_eq!(
    plan.resolved.aliases.loaded_app(),
    Path::new("/repos/foo/main/components")
  );
  assert!(plan.bundler_config.dev_server.is_none());
}

#[test]
fn variant_without_repo_produces_no_plan() {
  let planner = BuildPlanner::new("/srv/arcademap", ProjectConfig::default()).unwrap();
  let result = planner.plan(&selector_from(&[("APP", "foo")]));
  assert!(matches!(result, Err(ConfigError::MissingSourceRepo { .. })));
}

#[test]
fn welcome_banner_substitution() {
  let branding = BrandingConstants {
    app_name: "ARCADEMAP".into(),
    ..BrandingConstants::default()
  };
  let tokens =
    TokenSubstitutor::from_branding(&branding, &[TokenBinding::same_name("appName")]).unwrap();
  assert_eq!(
    tokens.apply("Welcome to @appName today"),
    "Welcome to ARCADEMAP today"
  );
}

#[test]
fn project_config_drives_branding_and_rewrite() {
  let temp = tempdir().unwrap();
  let root = temp.path();
  fs::write(
    root.join("whitelabel.config.json"),
    r#"{"branding": {"appName": "FOOMAP", "ourOrgName": "Foo Org"}}"#,
  )
  .unwrap();
  fs::create_dir_all(root.join("src")).unwrap();
  fs::write(root.join("src/index.js"), "document.title = '@APPNAME - @ourOrgName';").unwrap();

  let planner = BuildPlanner::new(root, ProjectConfig::discover(root).unwrap()).unwrap();
  let plan = planner.plan(&selector_from(&[])).unwrap();
  assert_eq!(plan.bundler_config.replacements.rules[1].replacement, "FOOMAP");

  let report = whitelabel_build::rewrite_tree(
    &plan.tokens,
    &planner.config().rewrite,
    &root.join("src"),
    &root.join("staged"),
  )
  .unwrap();
  assert_eq!(report.rewritten, 1);
  assert_eq!(
    fs::read_to_string(root.join("staged/index.js")).unwrap(),
    "document.title = 'FOOMAP - Foo Org';"
  );
}
