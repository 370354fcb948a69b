use std::collections::HashSet;

use crossplay_compare::{ExtractOptions, extract_user_library, merge_libraries};
use crossplay_core::{OwnedTuple, RawLibrary};

const ALICE: u64 = 1001;
const BOB: u64 = 1002;

fn raw(user_id: u64, owned: &[(&str, &str)], installed: &[&str]) -> RawLibrary {
    RawLibrary {
        user_id,
        owned: owned
            .iter()
            .map(|(keys, title)| OwnedTuple {
                release_keys: keys.to_string(),
                title_payload: Some(serde_json::json!({ "title": title }).to_string()),
            })
            .collect(),
        installed: installed.iter().map(|k| k.to_string()).collect(),
    }
}

fn slugs(set: &[&str]) -> HashSet<String> {
    set.iter().map(|s| s.to_string()).collect()
}

#[test]
fn extraction_emits_one_record_per_title() {
    let lib = raw(ALICE, &[("steam_100,gog_200", "Game X")], &[]);
    let extracted = extract_user_library(&lib, &ExtractOptions::default());

    assert_eq!(extracted.records.len(), 1);
    let record = &extracted.records[0];
    assert_eq!(record.key.to_string(), "steam:100");
    assert_eq!(record.aliases.len(), 1);
    assert_eq!(record.slug, "game-x");
}

#[test]
fn extraction_skips_hidden_titles() {
    let lib = raw(
        ALICE,
        &[("steam_100", "Game X"), ("gog_300", "ARK Editor")],
        &[],
    );
    let hidden = slugs(&["ark-editor"]);
    let options = ExtractOptions {
        hidden: Some(&hidden),
        ..Default::default()
    };
    let extracted = extract_user_library(&lib, &options);

    assert_eq!(extracted.records.len(), 1);
    assert_eq!(extracted.records[0].slug, "game-x");
}

#[test]
fn extraction_skips_unparseable_payloads() {
    let mut lib = raw(ALICE, &[("steam_100", "Game X")], &[]);
    lib.owned.push(OwnedTuple {
        release_keys: "gog_300".to_string(),
        title_payload: None,
    });
    lib.owned.push(OwnedTuple {
        release_keys: "gog_400".to_string(),
        title_payload: Some("{ broken".to_string()),
    });

    let extracted = extract_user_library(&lib, &ExtractOptions::default());
    assert_eq!(extracted.records.len(), 1);
}

#[test]
fn extraction_drops_excluded_platforms() {
    let lib = raw(
        ALICE,
        &[("steam_100,gog_200", "Game X"), ("epic_abc", "Epic Only")],
        &[],
    );
    let excluded = slugs(&["epic", "gog"]);
    let options = ExtractOptions {
        exclude_platforms: Some(&excluded),
        ..Default::default()
    };
    let extracted = extract_user_library(&lib, &options);

    // Epic Only loses every identifier and disappears; Game X keeps steam.
    assert_eq!(extracted.records.len(), 1);
    let record = &extracted.records[0];
    assert_eq!(record.key.to_string(), "steam:100");
    assert!(record.aliases.is_empty());
}

#[test]
fn extraction_marks_installed_via_any_alias() {
    let lib = raw(ALICE, &[("steam_100,gog_200", "Game X")], &["gog_200"]);
    let extracted = extract_user_library(&lib, &ExtractOptions::default());
    assert!(extracted.records[0].installed);
}

#[test]
fn merge_shared_title_accumulates_owners() {
    // Two users, one owning the title on two storefronts: a single entry.
    let a = extract_user_library(
        &raw(ALICE, &[("steam_100,gog_200", "Game X")], &[]),
        &ExtractOptions::default(),
    );
    let b = extract_user_library(
        &raw(BOB, &[("steam_100", "Game X")], &[]),
        &ExtractOptions::default(),
    );

    let merged = merge_libraries(&[a, b]);
    assert_eq!(merged.len(), 1);

    let entry = merged.entries().first().unwrap();
    assert_eq!(entry.slug, "game-x");
    assert_eq!(entry.owners.iter().copied().collect::<Vec<_>>(), vec![ALICE, BOB]);
    assert_eq!(entry.platforms, vec!["gog", "steam"]);
    assert_eq!(entry.lookup_key.to_string(), "steam:100");
}

#[test]
fn merge_installed_is_subset_of_owners() {
    let a = extract_user_library(
        &raw(ALICE, &[("steam_100", "Game X"), ("gog_300", "Alpha Quest")], &["steam_100"]),
        &ExtractOptions::default(),
    );
    let b = extract_user_library(
        &raw(BOB, &[("steam_100", "Game X")], &["steam_100"]),
        &ExtractOptions::default(),
    );

    let merged = merge_libraries(&[a, b]);
    for entry in &merged {
        assert!(entry.installed.is_subset(&entry.owners));
    }
}

#[test]
fn installed_key_without_owned_record_is_dropped() {
    // An installed identifier the user never owned must not surface as
    // installed anywhere downstream.
    let lib = raw(ALICE, &[("steam_100", "Game X")], &["gog_999", "steam_100"]);
    let extracted = extract_user_library(&lib, &ExtractOptions::default());

    assert_eq!(extracted.records.len(), 1);
    let merged = merge_libraries(&[extracted]);
    assert_eq!(merged.len(), 1);

    let entry = merged.get(&"steam:100".parse().unwrap()).unwrap();
    assert!(entry.installed.contains(&ALICE));
    assert!(merged.get(&"gog:999".parse().unwrap()).is_none());
    for entry in &merged {
        assert!(entry.installed.is_subset(&entry.owners));
    }
}

#[test]
fn merge_is_idempotent() {
    let libs = vec![
        extract_user_library(
            &raw(ALICE, &[("steam_100,gog_200", "Game X"), ("gog_300", "Alpha Quest")], &["steam_100"]),
            &ExtractOptions::default(),
        ),
        extract_user_library(
            &raw(BOB, &[("steam_100", "Game X")], &[]),
            &ExtractOptions::default(),
        ),
    ];

    let once = merge_libraries(&libs);
    let twice = merge_libraries(&libs);

    assert_eq!(once.len(), twice.len());
    for (a, b) in once.iter().zip(twice.iter()) {
        assert_eq!(a.key, b.key);
        assert_eq!(a.owners, b.owners);
        assert_eq!(a.platforms, b.platforms);
    }
}

#[test]
fn merge_keeps_differing_owner_sets_separate() {
    // Same game, but Alice only has the GOG release and Bob only Steam.
    // Collapsing them would claim both own both.
    let a = extract_user_library(
        &raw(ALICE, &[("gog_200", "Game X")], &[]),
        &ExtractOptions::default(),
    );
    let b = extract_user_library(
        &raw(BOB, &[("steam_100", "Game X")], &[]),
        &ExtractOptions::default(),
    );

    let merged = merge_libraries(&[a, b]);
    assert_eq!(merged.len(), 2);
    for entry in &merged {
        assert_eq!(entry.owners.len(), 1);
    }
}

#[test]
fn merge_consolidates_identical_owner_sets() {
    // One user owning the same title through two separate purchases.
    let a = extract_user_library(
        &raw(ALICE, &[("epic_abc", "Game X"), ("uplay_9", "Game X")], &[]),
        &ExtractOptions::default(),
    );

    let merged = merge_libraries(&[a]);
    assert_eq!(merged.len(), 1);
    let entry = merged.entries().first().unwrap();
    assert_eq!(entry.platforms, vec!["epic", "uplay"]);
}

#[test]
fn merge_orders_by_slug_then_platform_priority() {
    let a = extract_user_library(
        &raw(
            ALICE,
            &[
                ("steam_1", "Zebra Run"),
                ("gog_2", "Alpha Quest"),
                ("epic_x", "Mid Game"),
            ],
            &[],
        ),
        &ExtractOptions::default(),
    );

    let merged = merge_libraries(&[a]);
    let order: Vec<&str> = merged.iter().map(|e| e.slug.as_str()).collect();
    assert_eq!(order, vec!["alpha-quest", "mid-game", "zebra-run"]);
}
