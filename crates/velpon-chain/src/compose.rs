//! Eager decorator composition.
//!
//! Instead of binding link names lazily, a [`Composer`] builds a hook
//! point's whole chain once: the pluggable base is constructed first and
//! each override wraps the implementation below it, injected at
//! construction.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;
use velpon_core::AppResult;
use velpon_core::error::AppError;

use crate::error::ChainError;
use crate::resolver::ChainResolver;

type BaseFactory<T> = Arc<dyn Fn() -> Arc<T> + Send + Sync>;
type OverrideFactory<T> = Arc<dyn Fn(Arc<T>) -> Arc<T> + Send + Sync>;

/// Factories for the implementations of one capability `T`, keyed by
/// identifier.
pub struct Composer<T: ?Sized> {
    bases: HashMap<String, BaseFactory<T>>,
    overrides: HashMap<String, OverrideFactory<T>>,
}

impl<T: ?Sized> Composer<T> {
    /// Creates a composer with no factories.
    pub fn new() -> Self {
        Self {
            bases: HashMap::new(),
            overrides: HashMap::new(),
        }
    }

    /// Registers the default implementation named `pluggable_base`.
    pub fn base<F>(mut self, pluggable_base: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        self.bases.insert(pluggable_base.into(), Arc::new(factory));
        self
    }

    /// Registers the override `override_id`; its factory receives the
    /// next implementation in the chain.
    pub fn override_with<F>(mut self, override_id: impl Into<String>, factory: F) -> Self
    where
        F: Fn(Arc<T>) -> Arc<T> + Send + Sync + 'static,
    {
        self.overrides.insert(override_id.into(), Arc::new(factory));
        self
    }

    /// Builds the chain of `hook_point` as resolved by `resolver`.
    pub fn compose(&self, resolver: &ChainResolver, hook_point: &str) -> AppResult<Arc<T>> {
        let chain = resolver.chain(hook_point);
        let missing = |id: &str| ChainError::MissingImplementation {
            hook_point: hook_point.to_string(),
            id: id.to_string(),
        };

        let Some((base_id, overrides)) = chain.split_last() else {
            return Err(AppError::internal(format!(
                "Chain of '{hook_point}' has no pluggable base"
            )));
        };

        let base = self.bases.get(base_id).ok_or_else(|| missing(base_id.as_str()))?;
        let mut current = base();

        for id in overrides.iter().rev() {
            let wrap = self.overrides.get(id).ok_or_else(|| missing(id.as_str()))?;
            current = wrap(current);
        }

        debug!(hook_point = %hook_point, depth = chain.len(), "Chain composed");
        Ok(current)
    }
}

impl<T: ?Sized> Default for Composer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Composer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bases: Vec<&String> = self.bases.keys().collect();
        let mut overrides: Vec<&String> = self.overrides.keys().collect();
        bases.sort();
        overrides.sort();
        f.debug_struct("Composer")
            .field("bases", &bases)
            .field("overrides", &overrides)
            .finish()
    }
}
