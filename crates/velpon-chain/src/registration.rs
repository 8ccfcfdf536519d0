//! Plugin registrations and the ordered stack they form.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ChainError;
use crate::names::NameScheme;

/// One plugin's overrides: hook point → override id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Plugin name, kept for diagnostics only.
    pub name: String,
    /// Overrides in declaration order.
    #[serde(default)]
    pub overrides: IndexMap<String, String>,
}

impl Registration {
    /// Creates a registration with no overrides.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            overrides: IndexMap::new(),
        }
    }

    /// Adds an override of `hook_point` by `override_id`.
    pub fn with_override(
        mut self,
        hook_point: impl Into<String>,
        override_id: impl Into<String>,
    ) -> Self {
        self.overrides.insert(hook_point.into(), override_id.into());
        self
    }

    /// Returns the override this registration supplies for `hook_point`.
    pub fn override_for(&self, hook_point: &str) -> Option<&str> {
        self.overrides.get(hook_point).map(String::as_str)
    }

    /// Returns the first hook point, in declaration order, that this
    /// registration overrides with `override_id`.
    pub fn hook_point_of(&self, override_id: &str) -> Option<&str> {
        self.overrides
            .iter()
            .find(|(_, id)| id.as_str() == override_id)
            .map(|(hook_point, _)| hook_point.as_str())
    }
}

/// Registrations in the order the host supplied them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stack {
    registrations: Vec<Registration>,
}

impl Stack {
    /// Creates a stack from registrations in registration order.
    pub fn new(registrations: Vec<Registration>) -> Self {
        Self { registrations }
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Returns `true` if no plugin is registered.
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Registrations in registration order.
    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    /// Registrations most-recently-registered first, paired with their
    /// position in registration order.
    pub fn resolution_order(&self) -> impl Iterator<Item = (usize, &Registration)> {
        self.registrations.iter().enumerate().rev()
    }

    /// Non-fatal findings about the stack's shape.
    pub fn diagnostics(&self, scheme: &NameScheme) -> Vec<StackDiagnostic> {
        let mut diagnostics = Vec::new();
        let mut seen_names: HashMap<&str, usize> = HashMap::new();
        let mut claims: IndexMap<&str, Vec<&str>> = IndexMap::new();

        for (index, registration) in self.registrations.iter().enumerate() {
            if let Some(&first) = seen_names.get(registration.name.as_str()) {
                diagnostics.push(StackDiagnostic::DuplicateName {
                    name: registration.name.clone(),
                    first,
                    second: index,
                });
            } else {
                seen_names.insert(registration.name.as_str(), index);
            }

            for (hook_point, override_id) in &registration.overrides {
                if hook_point == override_id {
                    diagnostics.push(StackDiagnostic::SelfOverride {
                        registration: registration.name.clone(),
                        hook_point: hook_point.clone(),
                    });
                }

                let hook_points = claims.entry(override_id.as_str()).or_default();
                if hook_points.contains(&hook_point.as_str()) {
                    diagnostics.push(StackDiagnostic::RepeatedOverride {
                        registration: registration.name.clone(),
                        hook_point: hook_point.clone(),
                        override_id: override_id.clone(),
                    });
                } else {
                    hook_points.push(hook_point.as_str());
                }

                if scheme.is_pluggable_base(override_id) || scheme.strip_link(override_id).is_some()
                {
                    diagnostics.push(StackDiagnostic::ReservedSuffix {
                        registration: registration.name.clone(),
                        hook_point: hook_point.clone(),
                        override_id: override_id.clone(),
                    });
                }
            }
        }

        for (override_id, hook_points) in claims {
            if hook_points.len() > 1 {
                diagnostics.push(StackDiagnostic::SharedOverride {
                    override_id: override_id.to_string(),
                    hook_points: hook_points.into_iter().map(str::to_string).collect(),
                });
            }
        }

        diagnostics
    }
}

impl From<Vec<Registration>> for Stack {
    fn from(registrations: Vec<Registration>) -> Self {
        Self::new(registrations)
    }
}

impl FromIterator<Registration> for Stack {
    fn from_iter<I: IntoIterator<Item = Registration>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A finding reported by [`Stack::diagnostics`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StackDiagnostic {
    /// Two registrations share a name.
    DuplicateName {
        /// The repeated name.
        name: String,
        /// Index of the first registration with it.
        first: usize,
        /// Index of the repeat.
        second: usize,
    },
    /// One override id is claimed for several hook points; its link only
    /// continues the chain of the first hook point found.
    SharedOverride {
        /// The shared override id.
        override_id: String,
        /// Every hook point it is claimed for.
        hook_points: Vec<String>,
    },
    /// An override id is registered again for the same hook point; its
    /// link would delegate to itself.
    RepeatedOverride {
        /// Registration repeating it.
        registration: String,
        /// Hook point it overrides.
        hook_point: String,
        /// The override id.
        override_id: String,
    },
    /// A hook point is overridden by an id equal to itself, so its alias
    /// would point at its own name.
    SelfOverride {
        /// Registration declaring it.
        registration: String,
        /// The hook point, which is also the override id.
        hook_point: String,
    },
    /// An override id carries the pluggable or link suffix.
    ReservedSuffix {
        /// Registration declaring it.
        registration: String,
        /// Hook point it overrides.
        hook_point: String,
        /// The override id.
        override_id: String,
    },
}

impl fmt::Display for StackDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName {
                name,
                first,
                second,
            } => write!(
                f,
                "registration name '{name}' appears at positions {first} and {second}"
            ),
            Self::SharedOverride {
                override_id,
                hook_points,
            } => write!(
                f,
                "override '{override_id}' is claimed for several hook points: {}",
                hook_points.join(", ")
            ),
            Self::RepeatedOverride {
                registration,
                hook_point,
                override_id,
            } => write!(
                f,
                "registration '{registration}' repeats override '{override_id}' for '{hook_point}'"
            ),
            Self::SelfOverride {
                registration,
                hook_point,
            } => write!(
                f,
                "registration '{registration}' overrides '{hook_point}' with itself"
            ),
            Self::ReservedSuffix {
                registration,
                hook_point,
                override_id,
            } => write!(
                f,
                "registration '{registration}' overrides '{hook_point}' with '{override_id}', \
                 which carries a reserved suffix"
            ),
        }
    }
}

/// On-disk stack formats.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum JsonStack {
    /// `[{ "name": ..., "overrides": {...} }, ...]`
    List(Vec<Registration>),
    /// `{ "plugin_name": { "HookPoint": "OverrideId" }, ... }`
    Map(IndexMap<String, IndexMap<String, String>>),
}

#[derive(Debug, Clone, Deserialize)]
struct TomlStack {
    #[serde(default)]
    registration: Vec<Registration>,
}

/// Loader for stack files.
pub struct StackFile;

impl StackFile {
    /// Loads a stack from a `.json` or `.toml` file.
    pub fn load(path: &Path) -> Result<Stack, ChainError> {
        let contents = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let stack = match extension.as_deref() {
            Some("json") => Self::parse_json(&contents),
            Some("toml") => Self::parse_toml(&contents),
            other => Err(format!(
                "unsupported extension {:?}, expected .json or .toml",
                other.unwrap_or("")
            )),
        }
        .map_err(|reason| ChainError::StackFormat {
            path: path.to_path_buf(),
            reason,
        })?;

        debug!(path = %path.display(), registrations = stack.len(), "Stack file loaded");
        Ok(stack)
    }

    /// Parses the JSON list or map form.
    pub fn parse_json(contents: &str) -> Result<Stack, String> {
        let document: JsonStack = serde_json::from_str(contents).map_err(|e| e.to_string())?;
        Ok(match document {
            JsonStack::List(registrations) => Stack::new(registrations),
            JsonStack::Map(entries) => entries
                .into_iter()
                .map(|(name, overrides)| Registration { name, overrides })
                .collect(),
        })
    }

    /// Parses the `[[registration]]` TOML form.
    pub fn parse_toml(contents: &str) -> Result<Stack, String> {
        let document: TomlStack = toml::from_str(contents).map_err(|e| e.to_string())?;
        Ok(Stack::new(document.registration))
    }
}
