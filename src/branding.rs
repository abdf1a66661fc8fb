//! Display strings baked into a white-label build.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Colour scheme of the classification banner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassificationColor {
  /// Unclassified, for official use only.
  #[default]
  UFouo,
  /// Confidential.
  Conf,
  /// Secret.
  Secret,
  /// Top secret.
  TopSecret,
}

impl ClassificationColor {
  /// CSS class name used by the banner.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::UFouo => "u-fouo",
      Self::Conf => "conf",
      Self::Secret => "secret",
      Self::TopSecret => "top-secret",
    }
  }
}

/// Branding values for one variant. Constructed once and only ever read afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrandingConstants {
  /// Name of the emitted bundle file.
  pub bundle_file_name: String,
  /// Public URL path the application is served from.
  pub public_path: String,
  /// Application display name.
  pub app_name: String,
  /// Icon class shown next to the application name.
  pub app_icon: String,
  /// Owning organisation.
  pub our_org_name: String,
  /// Banner colour.
  pub classification_color: ClassificationColor,
  /// Banner text.
  pub classification_text: String,
  /// Whether the banner may be overridden at runtime.
  pub dynamic_classification: bool,
  /// Content steward name.
  pub content_steward: String,
  /// Content steward contact.
  pub content_steward_email: String,
  /// Page publisher name.
  pub page_publisher: String,
  /// Page publisher contact.
  pub page_publisher_email: String,
  /// Free-form review date.
  pub last_reviewed: String,
}

impl Default for BrandingConstants {
  fn default() -> Self {
    Self {
      bundle_file_name: "arcademap.js".into(),
      public_path: "/arcademap/".into(),
      app_name: "ARCADEMAP".into(),
      app_icon: "fa-cogs".into(),
      our_org_name: "ORG NAME HERE".into(),
      classification_color: ClassificationColor::UFouo,
      classification_text: "UNCLASSIFIED//FOUO".into(),
      dynamic_classification: true,
      content_steward: "content steward here".into(),
      content_steward_email: "content steward email here".into(),
      page_publisher: "page publisher here".into(),
      page_publisher_email: "page publisher email here".into(),
      last_reviewed: "last reviewed here".into(),
    }
  }
}

impl BrandingConstants {
  /// Names accepted by [`BrandingConstants::field`].
  pub const FIELD_NAMES: &'static [&'static str] = &[
    "bundleFileName",
    "publicPath",
    "appName",
    "appIcon",
    "ourOrgName",
    "classificationColor",
    "classificationText",
    "dynamicClassification",
    "contentSteward",
    "contentStewardEmail",
    "pagePublisher",
    "pagePublisherEmail",
    "lastReviewed",
  ];

  /// Look up a field by its camelCase name.
  pub fn field(&self, name: &str) -> Option<Cow<'_, str>> {
    let value = match name {
      "bundleFileName" => &self.bundle_file_name,
      "publicPath" => &self.public_path,
      "appName" => &self.app_name,
      "appIcon" => &self.app_icon,
      "ourOrgName" => &self.our_org_name,
      "classificationText" => &self.classification_text,
      "contentSteward" => &self.content_steward,
      "contentStewardEmail" => &self.content_steward_email,
      "pagePublisher" => &self.page_publisher,
      "pagePublisherEmail" => &self.page_publisher_email,
      "lastReviewed" => &self.last_reviewed,
      "classificationColor" => return Some(Cow::Borrowed(self.classification_color.as_str())),
      "dynamicClassification" => {
        return Some(Cow::Owned(self.dynamic_classification.to_string()));
      }
      _ => return None,
    };
    Some(Cow::Borrowed(value.as_str()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_listed_field_resolves() {
    let branding = BrandingConstants::default();
    for name in BrandingConstants::FIELD_NAMES {
      assert!(branding.field(name).is_some(), "{name} should resolve");
    }
  }

  #[test]
  fn field_lookup_is_case_sensitive() {
    let branding = BrandingConstants::default();
    assert_eq!(branding.field("appName").as_deref(), Some("ARCADEMAP"));
    assert!(branding.field("appname").is_none());
    assert!(branding.field("missing").is_none());
  }

  #[test]
  fn non_string_fields_render_as_text() {
    let branding = BrandingConstants {
      classification_color: ClassificationColor::TopSecret,
      dynamic_classification: false,
      ..BrandingConstants::default()
    };
    assert_eq!(branding.field("classificationColor").as_deref(), Some("top-secret"));
    assert_eq!(branding.field("dynamicClassification").as_deref(), Some("false"));
  }

  #[test]
  fn deserializes_partial_overrides() {
    let branding: BrandingConstants =
      serde_json::from_str(r#"{"appName": "FOO", "classificationColor": "secret"}"#).unwrap();
    assert_eq!(branding.app_name, "FOO");
    assert_eq!(branding.classification_color, ClassificationColor::Secret);
    assert_eq!(branding.bundle_file_name, "arcademap.js");
  }
}
