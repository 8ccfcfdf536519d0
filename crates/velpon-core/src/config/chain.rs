//! Identifier conventions and resolver settings.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Settings for the override chain resolver.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Suffix appended to a hook point to name its default implementation.
    #[validate(length(min = 1))]
    pub pluggable_suffix: String,
    /// Suffix appended to an override to name its next link.
    #[validate(length(min = 1))]
    pub link_suffix: String,
    /// Explicitly declared hook points.
    ///
    /// When empty, a name is treated as a hook point only if the host
    /// already knows its pluggable base.
    pub hook_points: Vec<String>,
    /// Cache resolved names for the lifetime of one stack.
    pub memoize: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            pluggable_suffix: default_pluggable_suffix(),
            link_suffix: default_link_suffix(),
            hook_points: Vec::new(),
            memoize: true,
        }
    }
}

fn default_pluggable_suffix() -> String {
    "Pluggable".to_string()
}

fn default_link_suffix() -> String {
    "Velpon".to_string()
}
