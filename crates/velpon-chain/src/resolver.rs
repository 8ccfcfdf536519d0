//! Override chain resolution.
//!
//! The chain of a hook point is the sequence of its overrides taken
//! most-recently-registered first, each delegating to the next through
//! its link, terminated by the hook point's pluggable base.

use dashmap::DashMap;
use indexmap::IndexSet;
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::ChainError;
use crate::names::NameScheme;
use crate::registration::Stack;

/// Per-name results, valid for the lifetime of one stack.
#[derive(Debug, Default)]
struct Memo {
    tops: DashMap<String, String>,
    links: DashMap<String, String>,
}

/// Answers top-of-chain and link queries against a fixed stack.
#[derive(Debug)]
pub struct ChainResolver {
    stack: Stack,
    scheme: NameScheme,
    memo: Option<Memo>,
}

/// One position in a resolved chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainEntry {
    /// Position, 0 being the outermost implementation.
    pub position: usize,
    /// Identifier bound at this position.
    pub id: String,
    /// Registration that supplied it, `None` for the pluggable base.
    pub registration: Option<String>,
    /// The link this implementation delegates through.
    pub link: Option<String>,
    /// What the link resolves to.
    pub next: Option<String>,
}

impl ChainResolver {
    /// Creates a resolver without memoization.
    pub fn new(stack: Stack, scheme: NameScheme) -> Self {
        Self {
            stack,
            scheme,
            memo: None,
        }
    }

    /// Creates a resolver that caches each answer.
    pub fn memoized(stack: Stack, scheme: NameScheme) -> Self {
        Self {
            stack,
            scheme,
            memo: Some(Memo::default()),
        }
    }

    /// The stack this resolver answers for.
    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// The naming scheme.
    pub fn scheme(&self) -> &NameScheme {
        &self.scheme
    }

    /// Identifier to bind when `hook_point` itself is referenced.
    ///
    /// The most recently registered override wins; with no override the
    /// pluggable base is returned.
    pub fn resolve_top(&self, hook_point: &str) -> String {
        if let Some(hit) = self.memo.as_ref().and_then(|m| cached(&m.tops, hook_point)) {
            return hit;
        }

        let target = self
            .stack
            .resolution_order()
            .find_map(|(_, registration)| registration.override_for(hook_point))
            .map(str::to_string)
            .unwrap_or_else(|| self.scheme.pluggable_base(hook_point));

        debug!(hook_point = %hook_point, target = %target, "Resolved top of chain");

        if let Some(memo) = &self.memo {
            memo.tops.insert(hook_point.to_string(), target.clone());
        }
        target
    }

    /// Identifier the link `link` continues to.
    ///
    /// Finds the most recent registration providing the override, then the
    /// next registration in resolution order overriding the same hook
    /// point. Without one the chain ends at the pluggable base.
    pub fn resolve_link(&self, link: &str) -> Result<String, ChainError> {
        let override_id = self
            .scheme
            .strip_link(link)
            .ok_or_else(|| ChainError::NotALink {
                name: link.to_string(),
                suffix: self.scheme.link_suffix().to_string(),
            })?;

        if let Some(hit) = self.memo.as_ref().and_then(|m| cached(&m.links, link)) {
            return Ok(hit);
        }

        let mut order = self.stack.resolution_order();
        let hook_point = order
            .by_ref()
            .find_map(|(_, registration)| registration.hook_point_of(override_id))
            .ok_or_else(|| ChainError::UndefinedLinkTarget {
                link: link.to_string(),
                override_id: override_id.to_string(),
            })?;

        let target = order
            .find_map(|(_, registration)| registration.override_for(hook_point))
            .map(str::to_string)
            .unwrap_or_else(|| self.scheme.pluggable_base(hook_point));

        debug!(
            link = %link,
            hook_point = %hook_point,
            target = %target,
            "Resolved link"
        );

        if let Some(memo) = &self.memo {
            memo.links.insert(link.to_string(), target.clone());
        }
        Ok(target)
    }

    /// The full delegation chain of `hook_point`, outermost first, ending
    /// with its pluggable base.
    pub fn chain(&self, hook_point: &str) -> Vec<String> {
        let mut chain: Vec<String> = self
            .stack
            .resolution_order()
            .filter_map(|(_, registration)| registration.override_for(hook_point))
            .map(str::to_string)
            .collect();
        chain.push(self.scheme.pluggable_base(hook_point));
        chain
    }

    /// The chain of `hook_point` annotated with links and their targets.
    pub fn describe(&self, hook_point: &str) -> Vec<ChainEntry> {
        let mut entries: Vec<ChainEntry> = self
            .stack
            .resolution_order()
            .filter_map(|(_, registration)| {
                registration
                    .override_for(hook_point)
                    .map(|id| (registration.name.clone(), id.to_string()))
            })
            .enumerate()
            .map(|(position, (registration, id))| {
                let link = self.scheme.link_of(&id);
                let next = self.resolve_link(&link).ok();
                ChainEntry {
                    position,
                    id,
                    registration: Some(registration),
                    link: Some(link),
                    next,
                }
            })
            .collect();

        entries.push(ChainEntry {
            position: entries.len(),
            id: self.scheme.pluggable_base(hook_point),
            registration: None,
            link: None,
            next: None,
        });
        entries
    }

    /// Every hook point overridden anywhere in the stack, in order of
    /// first appearance.
    pub fn hook_points(&self) -> Vec<String> {
        let hook_points: IndexSet<&str> = self
            .stack
            .registrations()
            .iter()
            .flat_map(|registration| registration.overrides.keys().map(String::as_str))
            .collect();
        hook_points.into_iter().map(str::to_string).collect()
    }
}

fn cached(map: &DashMap<String, String>, key: &str) -> Option<String> {
    let hit = map.get(key).map(|entry| entry.value().clone());
    if hit.is_some() {
        trace!(name = %key, "Resolver memo hit");
    }
    hit
}
