//! Branding token rules and the text rewrite that applies them.
//!
//! Source files carry placeholders such as `@appName`. Each placeholder is bound to a
//! [`BrandingConstants`] field when the rule table is built, so a rule that points at a
//! missing field fails while the configuration is assembled instead of halfway through a
//! source tree.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::branding::BrandingConstants;
use crate::error::{ConfigError, Result};

/// Marker that precedes every token in source text.
pub const TOKEN_SENTINEL: char = '@';

/// Declarative rule entry: a token name and the branding field it expands to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenBinding {
  /// Token name without the sentinel.
  pub token: String,
  /// Branding field name.
  pub key: String,
}

impl TokenBinding {
  /// Rule whose token and field share a name.
  pub fn same_name(name: &str) -> Self {
    Self {
      token: name.to_string(),
      key: name.to_string(),
    }
  }
}

/// Tokens substituted by a stock build.
pub fn default_token_table() -> Vec<TokenBinding> {
  [
    "ourOrgName",
    "appName",
    "bundleFileName",
    "publicPath",
    "pagePublisherEmail",
    "appIcon",
  ]
  .into_iter()
  .map(TokenBinding::same_name)
  .collect()
}

/// A compiled token rule with its replacement already resolved.
#[derive(Debug, Clone)]
pub struct TokenRule {
  token: String,
  key: String,
  pattern: Regex,
  replacement: String,
}

/// Serializable view of a rule for the bundler's string-replace stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenRuleDescriptor {
  /// Literal pattern source, sentinel included.
  pub pattern: String,
  /// Regex flags the stage should apply.
  pub flags: &'static str,
  /// Replacement text, inserted verbatim.
  pub replacement: String,
}

impl TokenRule {
  /// Token name without the sentinel.
  pub fn token(&self) -> &str {
    &self.token
  }

  /// Branding field backing this rule.
  pub fn key(&self) -> &str {
    &self.key
  }

  /// Compiled case-insensitive pattern.
  pub fn pattern(&self) -> &Regex {
    &self.pattern
  }

  /// Resolved replacement value.
  pub fn replacement(&self) -> &str {
    &self.replacement
  }

  /// Replacement for a given match. The matched text never influences the result.
  pub fn replacement_for(&self, _matched: &str) -> &str {
    &self.replacement
  }

  /// Descriptor handed to the external text-transform stage.
  pub fn descriptor(&self) -> TokenRuleDescriptor {
    TokenRuleDescriptor {
      pattern: format!("{TOKEN_SENTINEL}{}", self.token),
      flags: "gi",
      replacement: self.replacement.clone(),
    }
  }
}

impl PartialEq for TokenRule {
  fn eq(&self, other: &Self) -> bool {
    self.token == other.token
      && self.key == other.key
      && self.pattern.as_str() == other.pattern.as_str()
      && self.replacement == other.replacement
  }
}

impl Eq for TokenRule {}

/// Ordered, validated set of token rules.
///
/// All rules are matched by one combined pattern, so every token in the input is replaced
/// in a single pass and replacement values are never rescanned.
#[derive(Debug, Clone)]
pub struct TokenSubstitutor {
  rules: Vec<TokenRule>,
  combined: Option<Regex>,
  by_token: BTreeMap<String, usize>,
}

impl PartialEq for TokenSubstitutor {
  fn eq(&self, other: &Self) -> bool {
    self.rules == other.rules
  }
}

impl Eq for TokenSubstitutor {}

impl TokenSubstitutor {
  /// Resolve every binding against the branding constants.
  pub fn from_branding(branding: &BrandingConstants, bindings: &[TokenBinding]) -> Result<Self> {
    let mut seen = BTreeSet::new();
    let mut rules = Vec::with_capacity(bindings.len());

    for binding in bindings {
      validate_token_name(&binding.token)?;
      if !seen.insert(binding.token.to_lowercase()) {
        return Err(ConfigError::DuplicateToken(binding.token.clone()));
      }

      let replacement = branding
        .field(&binding.key)
        .ok_or_else(|| ConfigError::UnknownBrandingField {
          token: binding.token.clone(),
          key: binding.key.clone(),
        })?
        .into_owned();

      let pattern = Regex::new(&format!(
        "(?i){}",
        regex::escape(&format!("{TOKEN_SENTINEL}{}", binding.token))
      ))
      .map_err(|_| ConfigError::InvalidToken(binding.token.clone()))?;

      rules.push(TokenRule {
        token: binding.token.clone(),
        key: binding.key.clone(),
        pattern,
        replacement,
      });
    }

    ensure_disjoint(&rules)?;

    let by_token = rules
      .iter()
      .enumerate()
      .map(|(index, rule)| (rule.token.to_lowercase(), index))
      .collect();
    let combined = combined_pattern(&rules)?;
    Ok(Self {
      rules,
      combined,
      by_token,
    })
  }

  /// Rules in declaration order.
  pub fn rules(&self) -> &[TokenRule] {
    &self.rules
  }

  /// Rewrite every token occurrence in `text`.
  ///
  /// Replacement values are inserted verbatim and are not searched for further tokens, so
  /// the result does not depend on rule order.
  pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
    let Some(combined) = &self.combined else {
      return Cow::Borrowed(text);
    };
    combined.replace_all(text, |caps: &Captures<'_>| {
      self
        .rule_for_match(&caps[0])
        .map(|rule| rule.replacement.clone())
        .unwrap_or_else(|| caps[0].to_string())
    })
  }

  /// Rule whose pattern produced `matched`, compared case-insensitively.
  pub fn rule_for_match(&self, matched: &str) -> Option<&TokenRule> {
    let token = matched.strip_prefix(TOKEN_SENTINEL)?.to_lowercase();
    self.by_token.get(&token).map(|&index| &self.rules[index])
  }

  /// Descriptors for every rule, in order.
  pub fn descriptors(&self) -> Vec<TokenRuleDescriptor> {
    self.rules.iter().map(TokenRule::descriptor).collect()
  }
}

fn combined_pattern(rules: &[TokenRule]) -> Result<Option<Regex>> {
  if rules.is_empty() {
    return Ok(None);
  }

  let alternatives: Vec<String> = rules.iter().map(|rule| regex::escape(&rule.token)).collect();
  let source = format!(
    "(?i){}(?:{})",
    regex::escape(&TOKEN_SENTINEL.to_string()),
    alternatives.join("|")
  );
  Regex::new(&source)
    .map(Some)
    .map_err(|_| ConfigError::InvalidToken(alternatives.join("|")))
}

fn validate_token_name(token: &str) -> Result<()> {
  let valid = !token.is_empty()
    && token
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || c == '_');
  if valid {
    Ok(())
  } else {
    Err(ConfigError::InvalidToken(token.to_string()))
  }
}

fn ensure_disjoint(rules: &[TokenRule]) -> Result<()> {
  for (index, rule) in rules.iter().enumerate() {
    let lower = rule.token.to_lowercase();
    for other in &rules[index + 1..] {
      let other_lower = other.token.to_lowercase();
      if other_lower.starts_with(&lower) {
        return Err(ConfigError::OverlappingTokens {
          shorter: rule.token.clone(),
          longer: other.token.clone(),
        });
      }
      if lower.starts_with(&other_lower) {
        return Err(ConfigError::OverlappingTokens {
          shorter: other.token.clone(),
          longer: rule.token.clone(),
        });
      }
    }
  }
  Ok(())
}

/// Decides which source files go through token substitution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SourceFilter {
  /// File extensions, without the dot.
  pub extensions: Vec<String>,
  /// Directory names whose contents are never rewritten.
  pub excluded_dirs: Vec<String>,
}

impl Default for SourceFilter {
  fn default() -> Self {
    Self {
      extensions: ["js", "jsx", "ts", "tsx"].map(String::from).to_vec(),
      excluded_dirs: vec!["node_modules".into()],
    }
  }
}

impl SourceFilter {
  /// Returns `true` when `path` should have its tokens substituted.
  pub fn applies_to(&self, path: &Path) -> bool {
    let excluded = path.components().any(|component| {
      let name = component.as_os_str().to_string_lossy();
      self.excluded_dirs.iter().any(|dir| *dir == name)
    });
    if excluded {
      return false;
    }

    path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed == ext))
  }
}
