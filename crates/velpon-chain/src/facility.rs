//! Resolution facility — owns the active resolver and bridges it to the
//! host's late-binding hook.
//!
//! A facility is an explicit context object: construction hands it the
//! host interfaces, `register` installs a resolver over a stack and
//! subscribes it, `unregister` (or dropping the facility) tears it down.
//! At most one activation is installed at a time.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use velpon_core::config::chain::ChainConfig;
use velpon_core::AppResult;

use crate::error::ChainError;
use crate::host::{LateBindingHook, LookupHandler, LookupOutcome, SubscriptionId, TypeNamespace};
use crate::names::{NameClassifier, NameKind, NameScheme};
use crate::registration::Stack;
use crate::resolver::ChainResolver;

/// Unique identifier of one facility activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ActivationId(Uuid);

impl ActivationId {
    /// Generate a new time-ordered activation identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return a reference to the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ActivationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActivationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resolver installed in a facility, subscribed to the host hook.
#[derive(Debug)]
pub struct Activation {
    id: ActivationId,
    activated_at: DateTime<Utc>,
    resolver: ChainResolver,
    classifier: NameClassifier,
    namespace: Arc<dyn TypeNamespace>,
}

impl Activation {
    /// Activation identifier.
    pub fn id(&self) -> ActivationId {
        self.id
    }

    /// When the activation was installed.
    pub fn activated_at(&self) -> DateTime<Utc> {
        self.activated_at
    }

    /// The resolver answering for this activation.
    pub fn resolver(&self) -> &ChainResolver {
        &self.resolver
    }

    /// Classifies `name` the way lookups are classified.
    pub fn classify(&self, name: &str) -> NameKind {
        self.classifier.classify(name, self.namespace.as_ref())
    }

    fn bind(&self, name: &str, target: &str) -> LookupOutcome {
        match self.namespace.bind_alias(name, target) {
            Ok(()) => {
                debug!(name = %name, target = %target, "Alias bound");
                LookupOutcome::Handled
            }
            Err(e) => {
                warn!(name = %name, target = %target, error = %e, "Alias binding failed");
                LookupOutcome::NotHandled
            }
        }
    }
}

impl LookupHandler for Activation {
    fn handle_lookup(&self, name: &str) -> LookupOutcome {
        match self.classify(name) {
            NameKind::TopOfChain(hook_point) => {
                let target = self.resolver.resolve_top(&hook_point);
                self.bind(name, &target)
            }
            NameKind::Link(_) => match self.resolver.resolve_link(name) {
                Ok(target) => self.bind(name, &target),
                Err(e) => {
                    debug!(name = %name, error = %e, "Link left to the host");
                    LookupOutcome::NotHandled
                }
            },
            NameKind::Foreign => LookupOutcome::NotHandled,
        }
    }
}

/// Snapshot of a facility's state.
#[derive(Debug, Clone, Serialize)]
pub struct FacilityStatus {
    /// Whether an activation is installed.
    pub active: bool,
    /// Identifier of the installed activation.
    pub activation: Option<ActivationId>,
    /// When it was installed.
    pub activated_at: Option<DateTime<Utc>>,
    /// Registrations in its stack.
    pub registrations: usize,
    /// Hook points its stack overrides.
    pub hook_points: Vec<String>,
}

#[derive(Debug)]
struct ActiveSlot {
    activation: Arc<Activation>,
    subscription: SubscriptionId,
}

/// Owns at most one active resolver and its hook subscription.
pub struct ResolutionFacility {
    hook: Arc<dyn LateBindingHook>,
    namespace: Arc<dyn TypeNamespace>,
    config: ChainConfig,
    /// Claimed by `register` before anything is built.
    claimed: AtomicBool,
    active: ArcSwapOption<ActiveSlot>,
}

impl ResolutionFacility {
    /// Creates an inactive facility over the given host interfaces.
    pub fn new(
        hook: Arc<dyn LateBindingHook>,
        namespace: Arc<dyn TypeNamespace>,
        config: ChainConfig,
    ) -> Self {
        Self {
            hook,
            namespace,
            config,
            claimed: AtomicBool::new(false),
            active: ArcSwapOption::empty(),
        }
    }

    /// Creates an inactive facility over a host providing both interfaces.
    pub fn with_host<H>(host: Arc<H>, config: ChainConfig) -> Self
    where
        H: LateBindingHook + TypeNamespace + 'static,
    {
        Self::new(host.clone(), host, config)
    }

    /// Installs a resolver over `stack` and subscribes it to the host hook.
    ///
    /// Fails with a conflict if an activation is already installed; the
    /// installed one is left untouched.
    pub fn register(&self, stack: Stack) -> AppResult<ActivationId> {
        if self
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            let activation = self
                .active
                .load_full()
                .map(|slot| slot.activation.id.to_string())
                .unwrap_or_else(|| "pending".to_string());
            warn!(activation = %activation, "Register rejected, facility already active");
            return Err(ChainError::AlreadyActive { activation }.into());
        }

        let registrations = stack.len();
        let scheme = NameScheme::from_config(&self.config);
        let resolver = if self.config.memoize {
            ChainResolver::memoized(stack, scheme)
        } else {
            ChainResolver::new(stack, scheme)
        };

        let activation = Arc::new(Activation {
            id: ActivationId::new(),
            activated_at: Utc::now(),
            resolver,
            classifier: NameClassifier::from_config(&self.config),
            namespace: self.namespace.clone(),
        });
        let id = activation.id;

        let subscription = self.hook.subscribe(activation.clone());
        self.active.store(Some(Arc::new(ActiveSlot {
            activation,
            subscription,
        })));

        info!(
            activation = %id,
            subscription = %subscription,
            registrations = registrations,
            "Resolution facility registered"
        );

        Ok(id)
    }

    /// Unsubscribes and discards the active resolver.
    ///
    /// Fails with an invalid-state error if nothing is installed.
    pub fn unregister(&self) -> AppResult<ActivationId> {
        let Some(slot) = self.active.swap(None) else {
            debug!("Unregister with no active facility");
            return Err(ChainError::NotActive.into());
        };

        if !self.hook.unsubscribe(slot.subscription) {
            warn!(
                activation = %slot.activation.id,
                subscription = %slot.subscription,
                "Hook subscription was already removed"
            );
        }
        self.claimed.store(false, Ordering::Release);

        info!(activation = %slot.activation.id, "Resolution facility unregistered");
        Ok(slot.activation.id)
    }

    /// Offers `name` to the active resolver.
    pub fn handle_lookup(&self, name: &str) -> LookupOutcome {
        match self.active.load_full() {
            Some(slot) => slot.activation.handle_lookup(name),
            None => LookupOutcome::NotHandled,
        }
    }

    /// Returns whether an activation is installed.
    pub fn is_active(&self) -> bool {
        self.active.load().is_some()
    }

    /// The installed activation, if any.
    pub fn activation(&self) -> Option<Arc<Activation>> {
        self.active.load_full().map(|slot| slot.activation.clone())
    }

    /// Current state.
    pub fn status(&self) -> FacilityStatus {
        match self.activation() {
            Some(activation) => FacilityStatus {
                active: true,
                activation: Some(activation.id),
                activated_at: Some(activation.activated_at),
                registrations: activation.resolver.stack().len(),
                hook_points: activation.resolver.hook_points(),
            },
            None => FacilityStatus {
                active: false,
                activation: None,
                activated_at: None,
                registrations: 0,
                hook_points: Vec::new(),
            },
        }
    }
}

impl fmt::Debug for ResolutionFacility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionFacility")
            .field("active", &self.is_active())
            .field("config", &self.config)
            .finish()
    }
}

impl Drop for ResolutionFacility {
    fn drop(&mut self) {
        if self.is_active() {
            let _ = self.unregister();
        }
    }
}
