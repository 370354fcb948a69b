use std::path::PathBuf;

use crossplay_db::{GalaxyDb, GalaxyDbError, is_sqlite3};
use rusqlite::{Connection, params};

/// Build a minimal Galaxy database fixture in a temp directory.
///
/// Covers the tables the queries touch: Users, GamePieceTypes, GamePieces,
/// ProductPurchaseDates, Platforms, InstalledExternalProducts,
/// InstalledProducts.
fn fixture_db(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("galaxy-2.0.db");
    let conn = Connection::open(&path).unwrap();

    conn.execute_batch(
        "CREATE TABLE Users (id INTEGER);
         CREATE TABLE GamePieceTypes (id INTEGER PRIMARY KEY, type TEXT);
         CREATE TABLE GamePieces (releaseKey TEXT, gamePieceTypeId INTEGER, value TEXT);
         CREATE TABLE ProductPurchaseDates (gameReleaseKey TEXT);
         CREATE TABLE Platforms (id INTEGER PRIMARY KEY, name TEXT);
         CREATE TABLE InstalledExternalProducts (platformId INTEGER, productId INTEGER);
         CREATE TABLE InstalledProducts (productId INTEGER);",
    )
    .unwrap();

    conn.execute("INSERT INTO Users (id) VALUES (1001)", []).unwrap();

    for (id, name) in [(1, "originalTitle"), (2, "title"), (3, "allGameReleases")] {
        conn.execute(
            "INSERT INTO GamePieceTypes (id, type) VALUES (?1, ?2)",
            params![id, name],
        )
        .unwrap();
    }

    conn.execute("INSERT INTO Platforms (id, name) VALUES (1, 'steam')", [])
        .unwrap();

    // Game X owned on steam and gog, installed via steam.
    add_owned(&conn, "steam_100", "Game X", r#"{"releases":["steam_100","gog_200"]}"#);
    add_owned(&conn, "gog_200", "Game X", r#"{"releases":["steam_100","gog_200"]}"#);
    conn.execute(
        "INSERT INTO InstalledExternalProducts (platformId, productId) VALUES (1, 100)",
        [],
    )
    .unwrap();

    // Alpha Quest owned on gog only, installed through the GOG client itself.
    add_owned(&conn, "gog_300", "Alpha Quest", r#"{"releases":["gog_300"]}"#);
    conn.execute("INSERT INTO InstalledProducts (productId) VALUES (300)", [])
        .unwrap();

    path
}

fn add_owned(conn: &Connection, release_key: &str, title: &str, releases_json: &str) {
    conn.execute(
        "INSERT INTO ProductPurchaseDates (gameReleaseKey) VALUES (?1)",
        params![release_key],
    )
    .unwrap();
    for (type_id, value) in [
        (1, format!(r#"{{"title":"{title}"}}"#)),
        (2, format!(r#"{{"title":"{title}"}}"#)),
        (3, releases_json.to_string()),
    ] {
        conn.execute(
            "INSERT INTO GamePieces (releaseKey, gamePieceTypeId, value) VALUES (?1, ?2, ?3)",
            params![release_key, type_id, value],
        )
        .unwrap();
    }
}

#[test]
fn header_check_recognizes_sqlite() {
    assert!(is_sqlite3(b"SQLite format 3\0extra bytes here"));
    assert!(!is_sqlite3(b"SQLite format 3"));
    assert!(!is_sqlite3(b"<html>not a db</html>"));
}

#[test]
fn open_rejects_non_sqlite_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bogus.db");
    std::fs::write(&path, "definitely not a database").unwrap();
    assert!(matches!(GalaxyDb::open(&path), Err(GalaxyDbError::NotSqlite(_))));
}

#[test]
fn open_rejects_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.db");
    assert!(matches!(GalaxyDb::open(&path), Err(GalaxyDbError::NotFound(_))));
}

#[test]
fn reads_user_id() {
    let dir = tempfile::tempdir().unwrap();
    let db = GalaxyDb::open(&fixture_db(&dir)).unwrap();
    assert_eq!(db.user_id().unwrap(), 1001);
}

#[test]
fn owned_games_groups_platform_aliases() {
    let dir = tempfile::tempdir().unwrap();
    let db = GalaxyDb::open(&fixture_db(&dir)).unwrap();
    let owned = db.owned_games().unwrap();

    assert_eq!(owned.len(), 2);

    // Ordered by title payload; both fixtures have distinct alias lists.
    let game_x = owned
        .iter()
        .find(|t| t.title_payload.as_deref() == Some(r#"{"title":"Game X"}"#))
        .expect("Game X tuple present");
    let mut keys: Vec<&str> = game_x.release_keys.split(',').collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["gog_200", "steam_100"]);

    let alpha = owned
        .iter()
        .find(|t| t.title_payload.as_deref() == Some(r#"{"title":"Alpha Quest"}"#))
        .expect("Alpha Quest tuple present");
    assert_eq!(alpha.release_keys, "gog_300");
}

#[test]
fn installed_keys_cover_external_and_gog_products() {
    let dir = tempfile::tempdir().unwrap();
    let db = GalaxyDb::open(&fixture_db(&dir)).unwrap();
    let mut installed = db.installed_release_keys().unwrap();
    installed.sort_unstable();
    assert_eq!(installed, vec!["gog_300", "steam_100"]);
}

#[test]
fn raw_library_assembles_all_parts() {
    let dir = tempfile::tempdir().unwrap();
    let db = GalaxyDb::open(&fixture_db(&dir)).unwrap();
    let lib = db.raw_library().unwrap();
    assert_eq!(lib.user_id, 1001);
    assert_eq!(lib.owned.len(), 2);
    assert_eq!(lib.installed.len(), 2);
}

#[test]
fn owned_games_is_repeatable_on_one_handle() {
    let dir = tempfile::tempdir().unwrap();
    let db = GalaxyDb::open(&fixture_db(&dir)).unwrap();
    let first = db.owned_games().unwrap();
    let second = db.owned_games().unwrap();
    assert_eq!(first.len(), second.len());
}
