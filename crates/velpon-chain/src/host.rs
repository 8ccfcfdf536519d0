//! Interfaces consumed from the host environment, and an in-memory host.
//!
//! The host owns the namespace of implementation names, the primitive
//! that aliases one name to another, and the late-binding hook invoked
//! when a name with no binding is looked up.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ChainError;

/// Maximum alias hops followed before a lookup gives up.
const MAX_ALIAS_DEPTH: usize = 64;

/// Result of offering a name to a lookup handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupOutcome {
    /// The handler bound the name.
    Handled,
    /// The name is not this handler's concern.
    NotHandled,
}

/// The host's namespace of implementation names.
pub trait TypeNamespace: Send + Sync + fmt::Debug {
    /// Returns whether `name` denotes a known implementation.
    ///
    /// May itself trigger late binding, and so re-enter lookup handlers.
    fn exists(&self, name: &str) -> bool;

    /// Makes `name` denote the same implementation as `target` from now on.
    fn bind_alias(&self, name: &str, target: &str) -> Result<(), ChainError>;
}

/// Callback invoked for every name the host cannot otherwise resolve.
pub trait LookupHandler: Send + Sync + fmt::Debug {
    /// Attempts to bind `name`.
    fn handle_lookup(&self, name: &str) -> LookupOutcome;
}

/// Handle of one subscription to a [`LateBindingHook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Registration point for late-binding callbacks.
pub trait LateBindingHook: Send + Sync + fmt::Debug {
    /// Adds `handler` after any existing subscribers.
    fn subscribe(&self, handler: Arc<dyn LookupHandler>) -> SubscriptionId;

    /// Removes a subscription. Returns `false` if it was not present.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

/// One hop of alias resolution.
enum Step {
    Defined,
    Alias(String),
}

/// A self-contained host: defined implementations, an alias table and
/// an ordered list of late-binding subscribers.
///
/// Locks are never held while a subscriber runs, so subscribers may look
/// names up re-entrantly.
#[derive(Default)]
pub struct InMemoryHost {
    /// Defined implementation → the name it delegates to, if any.
    defined: RwLock<HashMap<String, Option<String>>>,
    aliases: RwLock<HashMap<String, String>>,
    subscribers: RwLock<Vec<(SubscriptionId, Arc<dyn LookupHandler>)>>,
    next_subscription: AtomicU64,
}

impl InMemoryHost {
    /// Creates an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a standalone implementation.
    pub fn define(&self, name: impl Into<String>) {
        self.defined.write().insert(name.into(), None);
    }

    /// Defines an implementation that delegates to `next`, as an override
    /// does through its link.
    pub fn define_delegating(&self, name: impl Into<String>, next: impl Into<String>) {
        self.defined.write().insert(name.into(), Some(next.into()));
    }

    /// Resolves `name` to the defined implementation it denotes, running
    /// the late-binding subscribers if it has no binding yet.
    pub fn lookup(&self, name: &str) -> Option<String> {
        self.follow(name, true)
    }

    /// The implementation `name` currently denotes, without running
    /// subscribers.
    pub fn canonical(&self, name: &str) -> Option<String> {
        self.follow(name, false)
    }

    /// Returns the alias target recorded for `name`, if any.
    pub fn alias_of(&self, name: &str) -> Option<String> {
        self.aliases.read().get(name).cloned()
    }

    /// All alias bindings, sorted by name.
    pub fn aliases(&self) -> Vec<(String, String)> {
        let mut aliases: Vec<(String, String)> = self
            .aliases
            .read()
            .iter()
            .map(|(name, target)| (name.clone(), target.clone()))
            .collect();
        aliases.sort();
        aliases
    }

    /// The implementations `name` passes through, outermost first,
    /// following each implementation's delegate.
    pub fn lineage(&self, name: &str) -> Vec<String> {
        let mut lineage = Vec::new();
        let mut current = self.lookup(name);

        while let Some(implementation) = current {
            if lineage.contains(&implementation) {
                warn!(name = %name, implementation = %implementation, "Delegation cycle");
                break;
            }
            let next = self.defined.read().get(&implementation).cloned().flatten();
            lineage.push(implementation);
            current = next.and_then(|next| self.lookup(&next));
        }

        lineage
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Follows aliases from `name`. Unbound names along the way are offered
    /// to the subscribers when `late_bind` is set.
    fn follow(&self, name: &str, late_bind: bool) -> Option<String> {
        let mut current = name.to_string();

        for _ in 0..=MAX_ALIAS_DEPTH {
            if let Some(next) = self.step(&current) {
                current = match next {
                    Step::Defined => return Some(current),
                    Step::Alias(target) => target,
                };
                continue;
            }

            if !late_bind {
                return None;
            }
            self.dispatch(&current);
            current = match self.step(&current)? {
                Step::Defined => return Some(current),
                Step::Alias(target) => target,
            };
        }

        warn!(name = %name, "Alias chain too deep, giving up");
        None
    }

    fn step(&self, name: &str) -> Option<Step> {
        if self.defined.read().contains_key(name) {
            return Some(Step::Defined);
        }
        self.aliases.read().get(name).cloned().map(Step::Alias)
    }

    fn dispatch(&self, name: &str) {
        let handlers: Vec<Arc<dyn LookupHandler>> = self
            .subscribers
            .read()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();

        for handler in handlers {
            if handler.handle_lookup(name) == LookupOutcome::Handled {
                return;
            }
        }
        debug!(name = %name, "No subscriber handled lookup");
    }
}

impl fmt::Debug for InMemoryHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryHost")
            .field("defined", &self.defined.read().len())
            .field("aliases", &self.aliases.read().len())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl TypeNamespace for InMemoryHost {
    fn exists(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    fn bind_alias(&self, name: &str, target: &str) -> Result<(), ChainError> {
        if name == target || self.defined.read().contains_key(name) {
            return Err(ChainError::AliasConflict {
                name: name.to_string(),
                existing: name.to_string(),
                target: target.to_string(),
            });
        }

        let mut aliases = self.aliases.write();
        match aliases.get(name) {
            Some(existing) if existing == target => Ok(()),
            Some(existing) => Err(ChainError::AliasConflict {
                name: name.to_string(),
                existing: existing.clone(),
                target: target.to_string(),
            }),
            None => {
                aliases.insert(name.to_string(), target.to_string());
                Ok(())
            }
        }
    }
}

impl LateBindingHook for InMemoryHost {
    fn subscribe(&self, handler: Arc<dyn LookupHandler>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push((id, handler));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }
}
