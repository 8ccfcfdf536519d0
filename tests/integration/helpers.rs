//! Shared test helpers for integration tests.

use std::sync::Arc;

use velpon_chain::{InMemoryHost, NameScheme, Registration, ResolutionFacility, Stack};
use velpon_core::config::chain::ChainConfig;

/// Hook point used by the exporter scenarios.
pub const HOOK: &str = "Exporter";
/// Override registered by the compression plugin.
pub const COMPRESS: &str = "ExporterCompress";
/// Override registered by the audit plugin.
pub const AUDIT: &str = "ExporterAudit";

/// Test host context
pub struct TestHost {
    /// The in-memory host
    pub host: Arc<InMemoryHost>,
    /// Facility bound to the host
    pub facility: ResolutionFacility,
    /// Naming scheme in use
    pub scheme: NameScheme,
}

impl TestHost {
    /// Create a host defining the exporter's pluggable base and both
    /// overrides, each delegating through its link
    pub fn new() -> Self {
        Self::with_config(ChainConfig::default())
    }

    /// Same as [`TestHost::new`] under a custom chain configuration
    pub fn with_config(config: ChainConfig) -> Self {
        let scheme = NameScheme::from_config(&config);
        let host = Arc::new(InMemoryHost::new());

        host.define(scheme.pluggable_base(HOOK));
        for override_id in [COMPRESS, AUDIT] {
            host.define_delegating(override_id, scheme.link_of(override_id));
        }

        let facility = ResolutionFacility::with_host(host.clone(), config);

        Self {
            host,
            facility,
            scheme,
        }
    }

    /// Stack where compression registers first and audit last
    pub fn full_stack() -> Stack {
        vec![
            Registration::new("compress").with_override(HOOK, COMPRESS),
            Registration::new("audit").with_override(HOOK, AUDIT),
        ]
        .into()
    }

    /// Stack with only the audit plugin
    pub fn half_stack() -> Stack {
        vec![Registration::new("audit").with_override(HOOK, AUDIT)].into()
    }
}
