//! Identifier conventions.
//!
//! Hook points, pluggable bases and links are plain names related by two
//! suffixes. [`NameScheme`] applies the transforms, [`NameClassifier`]
//! decides which kind of query a looked-up name is.

use std::collections::HashSet;

use serde::Serialize;
use velpon_core::config::chain::ChainConfig;

use crate::host::TypeNamespace;

/// The two suffix transforms relating hook points, bases and links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameScheme {
    pluggable_suffix: String,
    link_suffix: String,
}

impl NameScheme {
    /// Creates a scheme from explicit suffixes.
    pub fn new(pluggable_suffix: impl Into<String>, link_suffix: impl Into<String>) -> Self {
        Self {
            pluggable_suffix: pluggable_suffix.into(),
            link_suffix: link_suffix.into(),
        }
    }

    /// Creates a scheme from the `[chain]` configuration section.
    pub fn from_config(config: &ChainConfig) -> Self {
        Self::new(&config.pluggable_suffix, &config.link_suffix)
    }

    /// Suffix of default implementations.
    pub fn pluggable_suffix(&self) -> &str {
        &self.pluggable_suffix
    }

    /// Suffix of link placeholders.
    pub fn link_suffix(&self) -> &str {
        &self.link_suffix
    }

    /// Name of the default implementation of `hook_point`.
    pub fn pluggable_base(&self, hook_point: &str) -> String {
        format!("{hook_point}{}", self.pluggable_suffix)
    }

    /// Name of the placeholder `override_id` delegates through.
    pub fn link_of(&self, override_id: &str) -> String {
        format!("{override_id}{}", self.link_suffix)
    }

    /// Strips the link suffix, returning the override the link belongs to.
    ///
    /// The bare suffix is not a link: the override part must be non-empty.
    pub fn strip_link<'a>(&self, name: &'a str) -> Option<&'a str> {
        name.strip_suffix(self.link_suffix.as_str())
            .filter(|rest| !rest.is_empty())
    }

    /// Returns `true` if `name` carries the link suffix, including the
    /// bare suffix itself.
    pub fn has_link_suffix(&self, name: &str) -> bool {
        name.ends_with(self.link_suffix.as_str())
    }

    /// Returns `true` if `name` carries the pluggable suffix.
    pub fn is_pluggable_base(&self, name: &str) -> bool {
        name.ends_with(self.pluggable_suffix.as_str())
    }
}

impl Default for NameScheme {
    fn default() -> Self {
        Self::from_config(&ChainConfig::default())
    }
}

/// How hook points are recognized.
#[derive(Debug, Clone)]
pub enum HookPointPolicy {
    /// Hook points are an explicit, declared set.
    Declared(HashSet<String>),
    /// A name is a hook point if the host already defines its pluggable base.
    Inferred,
}

impl HookPointPolicy {
    /// Declared when the configuration lists hook points, inferred otherwise.
    pub fn from_config(config: &ChainConfig) -> Self {
        if config.hook_points.is_empty() {
            Self::Inferred
        } else {
            Self::Declared(config.hook_points.iter().cloned().collect())
        }
    }
}

/// The kind of query a looked-up name represents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NameKind {
    /// The name is a hook point; bind it to the top of its chain.
    TopOfChain(String),
    /// The name is the link of the contained override.
    Link(String),
    /// Not a name this system resolves.
    Foreign,
}

/// Classifies names under a scheme and a hook point policy.
#[derive(Debug, Clone)]
pub struct NameClassifier {
    scheme: NameScheme,
    policy: HookPointPolicy,
}

impl NameClassifier {
    /// Creates a classifier.
    pub fn new(scheme: NameScheme, policy: HookPointPolicy) -> Self {
        Self { scheme, policy }
    }

    /// Creates a classifier from the `[chain]` configuration section.
    pub fn from_config(config: &ChainConfig) -> Self {
        Self::new(
            NameScheme::from_config(config),
            HookPointPolicy::from_config(config),
        )
    }

    /// The scheme used for suffix tests.
    pub fn scheme(&self) -> &NameScheme {
        &self.scheme
    }

    /// The hook point policy.
    pub fn policy(&self) -> &HookPointPolicy {
        &self.policy
    }

    /// Classifies `name`.
    ///
    /// Link names always classify as links. The bare link suffix and names
    /// carrying the pluggable suffix are never hook points. `namespace` is only consulted under
    /// [`HookPointPolicy::Inferred`].
    pub fn classify(&self, name: &str, namespace: &dyn TypeNamespace) -> NameKind {
        if let Some(override_id) = self.scheme.strip_link(name) {
            return NameKind::Link(override_id.to_string());
        }

        if self.scheme.has_link_suffix(name) || self.scheme.is_pluggable_base(name) {
            return NameKind::Foreign;
        }

        let is_hook_point = match &self.policy {
            HookPointPolicy::Declared(hook_points) => hook_points.contains(name),
            HookPointPolicy::Inferred => namespace.exists(&self.scheme.pluggable_base(name)),
        };

        if is_hook_point {
            NameKind::TopOfChain(name.to_string())
        } else {
            NameKind::Foreign
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::InMemoryHost;

    #[test]
    fn test_suffix_transforms() {
        let scheme = NameScheme::default();
        assert_eq!(scheme.pluggable_base("Mailer"), "MailerPluggable");
        assert_eq!(scheme.link_of("MailerAudit"), "MailerAuditVelpon");
        assert_eq!(scheme.strip_link("MailerAuditVelpon"), Some("MailerAudit"));
        assert_eq!(scheme.strip_link("Mailer"), None);
        assert_eq!(scheme.strip_link("Velpon"), None);
    }

    #[test]
    fn test_inferred_policy_requires_existing_base() {
        let host = InMemoryHost::new();
        let classifier = NameClassifier::new(NameScheme::default(), HookPointPolicy::Inferred);

        assert_eq!(classifier.classify("Mailer", &host), NameKind::Foreign);

        host.define("MailerPluggable");
        assert_eq!(
            classifier.classify("Mailer", &host),
            NameKind::TopOfChain("Mailer".into())
        );
    }

    #[test]
    fn test_declared_policy_ignores_load_order() {
        let host = InMemoryHost::new();
        let classifier = NameClassifier::new(
            NameScheme::default(),
            HookPointPolicy::Declared(["Mailer".to_string()].into_iter().collect()),
        );

        assert_eq!(
            classifier.classify("Mailer", &host),
            NameKind::TopOfChain("Mailer".into())
        );
        assert_eq!(classifier.classify("Renderer", &host), NameKind::Foreign);
    }

    #[test]
    fn test_link_suffix_wins_over_hook_point() {
        let host = InMemoryHost::new();
        host.define("MailerVelponPluggable");
        let classifier = NameClassifier::new(NameScheme::default(), HookPointPolicy::Inferred);

        assert_eq!(
            classifier.classify("MailerVelpon", &host),
            NameKind::Link("Mailer".into())
        );
    }

    #[test]
    fn test_pluggable_base_is_never_top_of_chain() {
        let host = InMemoryHost::new();
        host.define("MailerPluggablePluggable");
        let classifier = NameClassifier::new(
            NameScheme::default(),
            HookPointPolicy::Declared(["MailerPluggable".to_string()].into_iter().collect()),
        );

        assert_eq!(classifier.classify("MailerPluggable", &host), NameKind::Foreign);
    }

    #[test]
    fn test_bare_link_suffix_is_foreign() {
        let host = InMemoryHost::new();
        host.define("VelponPluggable");
        let inferred = NameClassifier::new(NameScheme::default(), HookPointPolicy::Inferred);
        let declared = NameClassifier::new(
            NameScheme::default(),
            HookPointPolicy::Declared(["Velpon".to_string()].into_iter().collect()),
        );

        assert_eq!(inferred.classify("Velpon", &host), NameKind::Foreign);
        assert_eq!(declared.classify("Velpon", &host), NameKind::Foreign);
    }
}
