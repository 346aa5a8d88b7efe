use super::fixtures::{self, create_cache, repo_bytes};
use imagekit_dnfcache::{run_maintenance, ByteSize, DnfCacheConfig};
use tempfile::TempDir;

#[test]
fn maintenance_retires_distros_then_enforces_budget() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("rpmmd");
    let rhel = fixtures::rhel();
    create_cache(&root.join("rhel-8.4"), &rhel);
    create_cache(&root.join("fedora-39"), &fixtures::fake_real());
    create_cache(&root, &fixtures::messy()[1..]);

    let mut config = DnfCacheConfig::new(&root);
    config.max_size = ByteSize(repo_bytes(&rhel, &[fixtures::RHEL_NEW]) + 1024 * 1024);

    let report = run_maintenance(&config, ["rhel-8.4"]).unwrap();

    assert_eq!(report.cleanup.removed_distros, vec![root.join("fedora-39")]);
    assert_eq!(report.cleanup.removed_legacy.len(), 4);
    assert_eq!(report.shrink.evicted.len(), 1);
    assert_eq!(
        report.shrink.evicted[0],
        fixtures::key("rhel-8.4", fixtures::RHEL_OLD)
    );
    assert!(report.shrink.after_bytes < config.max_size.0);
    assert!(root
        .join("rhel-8.4")
        .join(format!("{}.solv", fixtures::RHEL_NEW))
        .is_file());
}

#[test]
fn maintenance_on_missing_root_does_nothing() {
    let tmp = TempDir::new().unwrap();
    let config = DnfCacheConfig::new(tmp.path().join("never-created"));

    let report = run_maintenance(&config, ["fedora-41"]).unwrap();

    assert!(report.cleanup.removed_distros.is_empty());
    assert!(report.shrink.evicted.is_empty());
    assert!(!config.root.exists());
}
