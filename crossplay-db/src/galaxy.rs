//! Queries against one user's Galaxy database.
//!
//! The owned-games query builds the same temp views the GOG Galaxy client
//! itself uses: every release key that has a purchase date, joined with its
//! title payload and its `allGameReleases` alias list, grouped so that one
//! row holds all platform keys carrying the same title.

use std::io::Read;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags, params};
use thiserror::Error;

use crossplay_core::{OwnedTuple, RawLibrary, UserId};

/// Errors reading a user's Galaxy database. Fatal for that user's
/// contribution only; the comparison continues for other users.
#[derive(Debug, Error)]
pub enum GalaxyDbError {
    #[error("Database file not found: {0}")]
    NotFound(PathBuf),

    #[error("{0} is not a SQLite database")]
    NotSqlite(PathBuf),

    #[error("No users found in the Users table")]
    NoUsers,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Returns true if the stream starts with an SQLite3 header.
/// https://www.sqlite.org/fileformat.html
pub fn is_sqlite3(stream: &[u8]) -> bool {
    stream.len() >= 16 && &stream[..16] == b"SQLite format 3\0"
}

/// Read-only handle on one user's Galaxy database.
pub struct GalaxyDb {
    conn: Connection,
}

impl GalaxyDb {
    /// Validate the file header and open the database read-only.
    pub fn open(path: &Path) -> Result<Self, GalaxyDbError> {
        if !path.exists() {
            return Err(GalaxyDbError::NotFound(path.to_path_buf()));
        }

        let mut header = [0u8; 16];
        let mut file = std::fs::File::open(path)?;
        let n = file.read(&mut header)?;
        if !is_sqlite3(&header[..n]) {
            return Err(GalaxyDbError::NotSqlite(path.to_path_buf()));
        }

        // Not opened read-only: the owned-games query materializes temp
        // views, which some SQLite builds refuse on a read-only connection.
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Get the user id from the Users table. Galaxy databases hold a single
    /// user; if more than one row is present the first is used with a warning.
    pub fn user_id(&self) -> Result<UserId, GalaxyDbError> {
        let mut stmt = self.conn.prepare("SELECT id FROM Users")?;
        let ids: Vec<i64> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        match ids.as_slice() {
            [] => Err(GalaxyDbError::NoUsers),
            [id] => Ok(*id as UserId),
            [id, ..] => {
                log::warn!("Found {} users in the DB; using the first one ({id})", ids.len());
                Ok(*id as UserId)
            }
        }
    }

    /// Numeric id of a GamePieceTypes row by name.
    fn piece_type_id(&self, name: &str) -> Result<i64, GalaxyDbError> {
        let id = self.conn.query_row(
            "SELECT id FROM GamePieceTypes WHERE type = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Owned-title tuples: one row per logical title, with every release key
    /// carrying that title comma-joined, plus the raw title JSON payload.
    pub fn owned_games(&self) -> Result<Vec<OwnedTuple>, GalaxyDbError> {
        let original_title = self.piece_type_id("originalTitle")?;
        let title = self.piece_type_id("title")?;
        let all_releases = self.piece_type_id("allGameReleases")?;

        // Temp views are per-connection; drop any left over from a previous
        // call on this handle.
        self.conn.execute_batch(&format!(
            "DROP VIEW IF EXISTS MasterDB;
             DROP VIEW IF EXISTS MasterList;
             CREATE TEMP VIEW MasterList AS
                 SELECT GamePieces.releaseKey, GamePieces.gamePieceTypeId, GamePieces.value
                 FROM ProductPurchaseDates
                 JOIN GamePieces ON ProductPurchaseDates.gameReleaseKey = GamePieces.releaseKey;
             CREATE TEMP VIEW MasterDB AS
                 SELECT DISTINCT(MasterList.releaseKey) AS releaseKey,
                        MasterList.value AS title,
                        PLATFORMS.value AS platformList
                 FROM MasterList, MasterList AS PLATFORMS
                 WHERE ((MasterList.gamePieceTypeId = {original_title})
                        OR (MasterList.gamePieceTypeId = {title}))
                   AND ((PLATFORMS.releaseKey = MasterList.releaseKey)
                        AND (PLATFORMS.gamePieceTypeId = {all_releases}));"
        ))?;

        let mut stmt = self.conn.prepare(
            "SELECT GROUP_CONCAT(DISTINCT MasterDB.releaseKey), MasterDB.title
             FROM MasterDB GROUP BY MasterDB.platformList ORDER BY MasterDB.title",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(OwnedTuple {
                release_keys: row.get(0)?,
                title_payload: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Release keys the user currently has installed, across GOG itself and
    /// every external platform Galaxy tracks.
    pub fn installed_release_keys(&self) -> Result<Vec<String>, GalaxyDbError> {
        let mut stmt = self.conn.prepare(
            "SELECT trim(GamePieces.releaseKey) FROM GamePieces
             JOIN GamePieceTypes ON GamePieces.gamePieceTypeId = GamePieceTypes.id
             WHERE releaseKey IN
                 (SELECT Platforms.name || '_' || InstalledExternalProducts.productId
                  FROM InstalledExternalProducts
                  JOIN Platforms ON InstalledExternalProducts.platformId = Platforms.id
                  UNION
                  SELECT 'gog_' || productId FROM InstalledProducts)
               AND GamePieceTypes.type = 'originalTitle'",
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Assemble the full raw library for the pipeline.
    pub fn raw_library(&self) -> Result<RawLibrary, GalaxyDbError> {
        let user_id = self.user_id()?;
        let owned = self.owned_games()?;
        let installed = self.installed_release_keys()?;
        log::debug!(
            "user {user_id}: {} owned tuples, {} installed keys",
            owned.len(),
            installed.len()
        );
        Ok(RawLibrary {
            user_id,
            owned,
            installed,
        })
    }
}
