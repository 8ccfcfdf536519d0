//! Registration stack source.

use serde::{Deserialize, Serialize};

/// Where the registration stack is loaded from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StackConfig {
    /// Path to a `.json` or `.toml` stack file.
    #[serde(default)]
    pub path: Option<String>,
}
