use super::fixtures::{self, create_cache, dir_bytes, repo_bytes, repo_ids};
use imagekit_dnfcache::{scan_cache, RepoCache};
use std::collections::BTreeSet;
use tempfile::TempDir;

#[test]
fn scan_size_counts_repo_files_and_directories() {
    for (name, entries) in fixtures::all_configs() {
        let tmp = TempDir::new().unwrap();
        create_cache(tmp.path(), &entries);

        let cache = RepoCache::new(tmp.path(), 1024 * 1024).unwrap();

        let expected = repo_bytes(&entries, &[]) + dir_bytes(tmp.path());
        assert_eq!(cache.size(), expected, "config={name}");
        assert_eq!(cache.len(), repo_ids(&entries).len(), "config={name}");
        assert_eq!(cache.recency().len(), cache.len(), "config={name}");
    }
}

#[test]
fn scan_tables_hold_the_same_repo_ids() {
    for (name, entries) in fixtures::all_configs() {
        let tmp = TempDir::new().unwrap();
        create_cache(tmp.path(), &entries);

        let scan = scan_cache(tmp.path()).unwrap();
        let in_table: BTreeSet<String> = scan.elements.keys().map(|key| key.to_string()).collect();
        let in_queue: BTreeSet<String> = scan.recency.iter().map(|key| key.to_string()).collect();

        assert_eq!(scan.recency.len(), scan.elements.len(), "config={name}");
        assert_eq!(in_table, in_queue, "config={name}");
        assert_eq!(in_table, repo_ids(&entries), "config={name}");
    }
}

#[test]
fn scan_across_distributions_sorts_by_recency() {
    let tmp = TempDir::new().unwrap();
    let rhel = fixtures::rhel();
    let fake = fixtures::fake_real();
    create_cache(&tmp.path().join("rhel-8.4"), &rhel);
    create_cache(&tmp.path().join("fake-real"), &fake);

    let cache = RepoCache::new(tmp.path(), 1024 * 1024).unwrap();

    let expected = repo_bytes(&rhel, &[]) + repo_bytes(&fake, &[]) + dir_bytes(tmp.path());
    assert_eq!(cache.size(), expected);
    assert_eq!(cache.len(), 5);

    let all: Vec<_> = rhel.iter().chain(fake.iter()).cloned().collect();
    let mtimes: Vec<i64> = cache
        .recency()
        .map(|key| fixtures::mtime_of(&all, key.repo_id.as_str()))
        .collect();
    assert!(
        mtimes.windows(2).all(|pair| pair[0] <= pair[1]),
        "recency not ascending: {mtimes:?}"
    );
    assert_eq!(
        cache.recency().next(),
        Some(&fixtures::key("fake-real", fixtures::FAKE_3))
    );
}

#[test]
fn metadata_directory_is_a_single_member() {
    let tmp = TempDir::new().unwrap();
    let rhel = fixtures::rhel();
    create_cache(tmp.path(), &rhel);

    let scan = scan_cache(tmp.path()).unwrap();
    let element = &scan.elements[&fixtures::key("", fixtures::RHEL_OLD)];

    let names: Vec<String> = element
        .paths()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            format!("{}-33d346d177279673", fixtures::RHEL_OLD),
            format!("{}-filenames.solvx", fixtures::RHEL_OLD),
            format!("{}.solv", fixtures::RHEL_OLD),
        ]
    );
    assert_eq!(element.mtime_millis, 100_000);
    assert!(element.size >= repo_bytes(&rhel, &[fixtures::RHEL_OLD]));
}

#[test]
fn loose_files_are_not_counted() {
    let tmp = TempDir::new().unwrap();
    create_cache(tmp.path(), &fixtures::messy());
    std::fs::create_dir(tmp.path().join("tmp")).unwrap();
    std::fs::File::create(tmp.path().join("tmp/partial.download"))
        .unwrap()
        .set_len(5_000_000)
        .unwrap();

    let scan = scan_cache(tmp.path()).unwrap();

    assert_eq!(scan.loose_files, 2);
    assert_eq!(
        scan.size,
        repo_bytes(&fixtures::messy(), &[]) + dir_bytes(tmp.path())
    );
}

#[test]
fn empty_root_scans_to_nothing() {
    let tmp = TempDir::new().unwrap();
    let cache = RepoCache::new(tmp.path(), 0).unwrap();
    assert!(cache.is_empty());
    assert_eq!(cache.size(), 0);
}
