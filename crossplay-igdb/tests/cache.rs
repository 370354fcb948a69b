use crossplay_core::TitleKey;
use crossplay_igdb::{CacheEntry, CatalogCache};

fn key(s: &str) -> TitleKey {
    s.parse().unwrap()
}

#[test]
fn missing_file_loads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let cache = CatalogCache::load(&dir.path().join("igdb.json"));
    assert!(cache.is_empty());
}

#[test]
fn corrupt_file_loads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("igdb.json");
    std::fs::write(&path, "{ this is not json").unwrap();
    let cache = CatalogCache::load(&path);
    assert!(cache.is_empty());
}

#[test]
fn put_merges_partial_fields() {
    let mut cache = CatalogCache::in_memory();
    let k = key("steam:100");

    cache.put(
        &k,
        CacheEntry {
            igdb_id: Some(42),
            ..Default::default()
        },
    );
    cache.put(
        &k,
        CacheEntry {
            max_players: Some(10),
            ..Default::default()
        },
    );

    let entry = cache.get(&k).unwrap();
    assert_eq!(entry.igdb_id, Some(42));
    assert_eq!(entry.max_players, Some(10));
    assert_eq!(entry.game_modes, None);
    assert!(!entry.is_complete());

    cache.put(
        &k,
        CacheEntry {
            game_modes: Some(vec!["coop".to_string()]),
            ..Default::default()
        },
    );
    assert!(cache.get(&k).unwrap().is_complete());
}

#[test]
fn put_does_not_clear_present_fields() {
    let mut cache = CatalogCache::in_memory();
    let k = key("steam:100");

    cache.put(
        &k,
        CacheEntry {
            igdb_id: Some(42),
            max_players: Some(4),
            game_modes: Some(vec!["multiplayer".to_string()]),
        },
    );
    cache.put(&k, CacheEntry::default());

    let entry = cache.get(&k).unwrap();
    assert_eq!(entry.igdb_id, Some(42));
    assert_eq!(entry.max_players, Some(4));
}

#[test]
fn empty_entry_records_a_miss() {
    let mut cache = CatalogCache::in_memory();
    let k = key("epic:abc");
    assert!(cache.get(&k).is_none());

    cache.put(&k, CacheEntry::default());
    assert!(cache.get(&k).unwrap().is_miss());
}

#[test]
fn evict_discards_entry() {
    let mut cache = CatalogCache::in_memory();
    let k = key("steam:100");
    cache.put(&k, CacheEntry { igdb_id: Some(1), ..Default::default() });
    cache.evict(&k);
    assert!(cache.get(&k).is_none());
}

#[test]
fn flush_and_reload_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("igdb.json");

    let mut cache = CatalogCache::load(&path);
    cache.put(
        &key("steam:100"),
        CacheEntry {
            igdb_id: Some(42),
            max_players: Some(10),
            game_modes: Some(vec!["multiplayer".to_string(), "coop".to_string()]),
        },
    );
    cache.put(&key("gog:200"), CacheEntry::default());
    cache.flush().unwrap();

    let reloaded = CatalogCache::load(&path);
    assert_eq!(reloaded.len(), 2);
    let entry = reloaded.get(&key("steam:100")).unwrap();
    assert_eq!(entry.igdb_id, Some(42));
    assert_eq!(entry.max_players, Some(10));
    assert!(reloaded.get(&key("gog:200")).unwrap().is_miss());
}

#[test]
fn flushed_document_is_keyed_by_lookup_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("igdb.json");

    let mut cache = CatalogCache::load(&path);
    cache.put(&key("steam:100"), CacheEntry { igdb_id: Some(7), ..Default::default() });
    cache.flush().unwrap();

    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc["version"], 1);
    assert_eq!(doc["games"]["steam:100"]["igdb_id"], 7);
    // Unset optional fields are omitted, keeping the format forward-open.
    assert!(doc["games"]["steam:100"].get("max_players").is_none());
}
