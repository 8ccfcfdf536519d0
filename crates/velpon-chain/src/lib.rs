//! # velpon-chain
//!
//! Lets independently authored plugins stack overrides of named hook
//! points into one deterministic delegation chain. Provides:
//!
//! - Name conventions for pluggable bases and links
//! - Registrations, the ordered stack and stack file loading
//! - The override chain resolver
//! - The resolution facility bridging a resolver to a host's
//!   late-binding hook, plus an in-memory host
//! - Eager decorator composition of resolved chains

pub mod compose;
pub mod error;
pub mod facility;
pub mod host;
pub mod names;
pub mod registration;
pub mod resolver;

pub use compose::Composer;
pub use error::ChainError;
pub use facility::{Activation, ActivationId, FacilityStatus, ResolutionFacility};
pub use host::{InMemoryHost, LateBindingHook, LookupHandler, LookupOutcome, TypeNamespace};
pub use names::{HookPointPolicy, NameClassifier, NameKind, NameScheme};
pub use registration::{Registration, Stack, StackDiagnostic, StackFile};
pub use resolver::{ChainEntry, ChainResolver};
