//! Facility lifecycle and late-binding scenarios against the in-memory host.

use std::sync::atomic::{AtomicUsize, Ordering};

use velpon_chain::{LookupOutcome, Stack};
use velpon_core::config::chain::ChainConfig;
use velpon_core::error::ErrorKind;

use crate::helpers::{AUDIT, COMPRESS, HOOK, TestHost};

#[test]
fn test_full_stack_builds_whole_chain() -> anyhow::Result<()> {
    let ctx = TestHost::new();
    ctx.facility.register(TestHost::full_stack())?;

    assert_eq!(
        ctx.host.lineage(HOOK),
        vec![AUDIT, COMPRESS, "ExporterPluggable"]
    );
    assert_eq!(ctx.host.alias_of(HOOK).as_deref(), Some(AUDIT));
    assert_eq!(
        ctx.host.alias_of(&ctx.scheme.link_of(AUDIT)).as_deref(),
        Some(COMPRESS)
    );
    assert_eq!(
        ctx.host.alias_of(&ctx.scheme.link_of(COMPRESS)).as_deref(),
        Some("ExporterPluggable")
    );

    ctx.facility.unregister()?;
    Ok(())
}

#[test]
fn test_half_stack_skips_unregistered_plugin() -> anyhow::Result<()> {
    let ctx = TestHost::new();
    ctx.facility.register(TestHost::half_stack())?;

    let lineage = ctx.host.lineage(HOOK);
    assert_eq!(lineage, vec![AUDIT, "ExporterPluggable"]);
    assert!(!lineage.contains(&COMPRESS.to_string()));
    assert_eq!(ctx.host.alias_of(&ctx.scheme.link_of(COMPRESS)), None);

    ctx.facility.unregister()?;
    Ok(())
}

#[test]
fn test_no_plugins_binds_pluggable_base() -> anyhow::Result<()> {
    let ctx = TestHost::new();
    ctx.facility.register(Stack::default())?;

    assert_eq!(ctx.host.lineage(HOOK), vec!["ExporterPluggable"]);
    assert_eq!(ctx.host.alias_of(HOOK).as_deref(), Some("ExporterPluggable"));

    ctx.facility.unregister()?;
    Ok(())
}

#[test]
fn test_unknown_names_fall_through() -> anyhow::Result<()> {
    let ctx = TestHost::new();
    ctx.facility.register(TestHost::full_stack())?;

    assert_eq!(ctx.host.lookup("Importer"), None);
    assert_eq!(ctx.host.lookup("GhostVelpon"), None);
    assert_eq!(ctx.facility.handle_lookup("Importer"), LookupOutcome::NotHandled);
    Ok(())
}

#[test]
fn test_lifecycle_can_repeat() -> anyhow::Result<()> {
    let ctx = TestHost::new();

    let first = ctx.facility.register(TestHost::half_stack())?;
    let err = ctx
        .facility
        .register(TestHost::full_stack())
        .expect_err("already active");
    assert!(err.is(ErrorKind::Conflict));
    assert_eq!(ctx.facility.unregister()?, first);
    assert!(ctx.facility.unregister().is_err());

    let second = ctx.facility.register(TestHost::full_stack())?;
    assert_ne!(first, second);
    assert_eq!(ctx.host.subscriber_count(), 1);
    ctx.facility.unregister()?;
    assert_eq!(ctx.host.subscriber_count(), 0);
    Ok(())
}

#[test]
fn test_after_unregister_lookups_are_not_handled() -> anyhow::Result<()> {
    let ctx = TestHost::new();
    ctx.facility.register(TestHost::full_stack())?;
    ctx.facility.unregister()?;

    assert_eq!(ctx.host.lookup(HOOK), None);
    assert_eq!(ctx.facility.handle_lookup(HOOK), LookupOutcome::NotHandled);
    Ok(())
}

#[test]
fn test_declared_hook_points_do_not_need_loaded_base() -> anyhow::Result<()> {
    let config = ChainConfig {
        hook_points: vec![HOOK.to_string(), "Importer".to_string()],
        ..ChainConfig::default()
    };
    let ctx = TestHost::with_config(config);
    ctx.facility.register(TestHost::half_stack())?;

    assert_eq!(ctx.host.lookup("Importer"), None);
    assert_eq!(ctx.host.alias_of("Importer").as_deref(), Some("ImporterPluggable"));

    ctx.host.define("ImporterPluggable");
    assert_eq!(ctx.host.lookup("Importer").as_deref(), Some("ImporterPluggable"));
    Ok(())
}

#[test]
fn test_concurrent_register_has_one_winner() {
    let ctx = TestHost::new();
    let winners = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                if ctx.facility.register(TestHost::full_stack()).is_ok() {
                    winners.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    });

    assert_eq!(winners.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.host.subscriber_count(), 1);
}
