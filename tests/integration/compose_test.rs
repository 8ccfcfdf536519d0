//! Eager composition over the resolver installed in a facility.

use std::sync::Arc;

use velpon_chain::Composer;

use crate::helpers::{AUDIT, COMPRESS, HOOK, TestHost};

trait Exporter: Send + Sync {
    fn export(&self, payload: &str) -> String;
}

struct PlainExporter;

impl Exporter for PlainExporter {
    fn export(&self, payload: &str) -> String {
        payload.to_string()
    }
}

struct Compressing {
    next: Arc<dyn Exporter>,
}

impl Exporter for Compressing {
    fn export(&self, payload: &str) -> String {
        format!("gz[{}]", self.next.export(payload))
    }
}

struct Auditing {
    next: Arc<dyn Exporter>,
}

impl Exporter for Auditing {
    fn export(&self, payload: &str) -> String {
        format!("audit[{}]", self.next.export(payload))
    }
}

fn exporters() -> Composer<dyn Exporter> {
    Composer::<dyn Exporter>::new()
        .base("ExporterPluggable", || Arc::new(PlainExporter) as Arc<dyn Exporter>)
        .override_with(COMPRESS, |next| Arc::new(Compressing { next }) as Arc<dyn Exporter>)
        .override_with(AUDIT, |next| Arc::new(Auditing { next }) as Arc<dyn Exporter>)
}

#[test]
fn test_composed_chain_matches_late_bound_chain() -> anyhow::Result<()> {
    let ctx = TestHost::new();
    ctx.facility.register(TestHost::full_stack())?;
    let activation = ctx.facility.activation().expect("active");

    let exporter = exporters().compose(activation.resolver(), HOOK)?;
    assert_eq!(exporter.export("data"), "audit[gz[data]]");

    let lineage = ctx.host.lineage(HOOK);
    assert_eq!(lineage, activation.resolver().chain(HOOK));
    Ok(())
}

#[test]
fn test_composed_half_chain() -> anyhow::Result<()> {
    let ctx = TestHost::new();
    ctx.facility.register(TestHost::half_stack())?;
    let activation = ctx.facility.activation().expect("active");

    let exporter = exporters().compose(activation.resolver(), HOOK)?;
    assert_eq!(exporter.export("data"), "audit[data]");
    Ok(())
}
