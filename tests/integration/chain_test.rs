//! Resolver scenarios over complete stacks.

use velpon_chain::{ChainResolver, NameScheme, Registration, Stack, StackFile};

#[test]
fn test_concrete_two_plugin_scenario() {
    let stack: Stack = vec![
        Registration::new("two").with_override("X", "X_P2"),
        Registration::new("one").with_override("X", "X_P1"),
    ]
    .into();
    let scheme = NameScheme::new("_Pluggable", "Velpon");
    let resolver = ChainResolver::new(stack, scheme.clone());

    assert_eq!(resolver.resolve_top("X"), "X_P1");
    assert_eq!(
        resolver.resolve_link(&scheme.link_of("X_P1")).expect("link"),
        "X_P2"
    );
    assert_eq!(
        resolver.resolve_link(&scheme.link_of("X_P2")).expect("link"),
        "X_Pluggable"
    );
}

#[test]
fn test_every_link_continues_the_chain() {
    let stack: Stack = vec![
        Registration::new("a").with_override("H", "Ha"),
        Registration::new("b")
            .with_override("H", "Hb")
            .with_override("G", "Gb"),
        Registration::new("c").with_override("G", "Gc"),
        Registration::new("d").with_override("H", "Hd"),
    ]
    .into();
    let scheme = NameScheme::default();
    let resolver = ChainResolver::memoized(stack, scheme.clone());

    for hook_point in ["H", "G"] {
        let chain = resolver.chain(hook_point);
        assert_eq!(resolver.resolve_top(hook_point), chain[0]);
        for pair in chain.windows(2) {
            let next = resolver
                .resolve_link(&scheme.link_of(&pair[0]))
                .expect("link");
            assert_eq!(next, pair[1]);
        }
    }

    assert_eq!(resolver.chain("H"), vec!["Hd", "Hb", "Ha", "HPluggable"]);
    assert_eq!(resolver.chain("G"), vec!["Gc", "Gb", "GPluggable"]);
}

#[test]
fn test_resolve_from_toml_stack_file() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    let path = temp.path().join("plugins.toml");
    std::fs::write(
        &path,
        r#"
[[registration]]
name = "compress"
overrides = { Exporter = "ExporterCompress" }

[[registration]]
name = "audit"
overrides = { Exporter = "ExporterAudit", Importer = "ImporterAudit" }
"#,
    )?;

    let stack = StackFile::load(&path)?;
    let resolver = ChainResolver::new(stack, NameScheme::default());

    assert_eq!(resolver.resolve_top("Exporter"), "ExporterAudit");
    assert_eq!(resolver.resolve_link("ExporterAuditVelpon")?, "ExporterCompress");
    assert_eq!(resolver.resolve_link("ImporterAuditVelpon")?, "ImporterPluggable");
    Ok(())
}
