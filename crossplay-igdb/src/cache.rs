//! Persistent store of IGDB lookups, keyed by lookup key.
//!
//! The on-disk format is a JSON document with the entries nested under a
//! `games` map; new fields are only ever added as optionals, so older
//! files stay readable. A corrupt or missing file loads as an empty cache:
//! enrichment is a performance optimization, not a correctness dependency.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crossplay_core::TitleKey;

use crate::error::CatalogError;

/// Cached catalog data for one lookup key. All fields optional: an entry
/// may be partial, and `put` fills in missing fields without discarding
/// present ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Resolved IGDB game id. An entry present with no id records a prior
    /// definitive miss, which is not retried unless a refresh is forced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub igdb_id: Option<u64>,

    /// Max players per IGDB. `Some(0)` means the lookup succeeded but IGDB
    /// carries no player count for the game; `None` means not fetched yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_players: Option<u32>,

    /// Game-mode tags. `Some(vec![])` means fetched with no modes listed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_modes: Option<Vec<String>>,
}

impl CacheEntry {
    /// A recorded miss: we asked IGDB and it had nothing.
    pub fn is_miss(&self) -> bool {
        self.igdb_id.is_none()
    }

    /// Fully populated; nothing left to fetch.
    pub fn is_complete(&self) -> bool {
        self.igdb_id.is_some() && self.max_players.is_some() && self.game_modes.is_some()
    }

    /// Merge another entry's non-empty fields into this one.
    fn merge(&mut self, other: CacheEntry) {
        if other.igdb_id.is_some() {
            self.igdb_id = other.igdb_id;
        }
        if other.max_players.is_some() {
            self.max_players = other.max_players;
        }
        if other.game_modes.is_some() {
            self.game_modes = other.game_modes;
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheDoc {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    last_updated: Option<String>,
    #[serde(default)]
    games: BTreeMap<String, CacheEntry>,
}

impl Default for CacheDoc {
    fn default() -> Self {
        Self {
            version: default_version(),
            last_updated: None,
            games: BTreeMap::new(),
        }
    }
}

fn default_version() -> u32 {
    1
}

/// The persistent catalog cache. Single writer: only the enrichment pass
/// mutates it, the comparison path reads it.
#[derive(Debug)]
pub struct CatalogCache {
    path: Option<PathBuf>,
    doc: CacheDoc,
    dirty: bool,
}

impl CatalogCache {
    /// An unpersisted cache; `flush` is a no-op.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            doc: CacheDoc::default(),
            dirty: false,
        }
    }

    /// Load a cache file. A missing, unreadable, or corrupt file yields an
    /// empty cache with a warning, never an error.
    pub fn load(path: &Path) -> Self {
        let doc = match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<CacheDoc>(&contents) {
                Ok(doc) => doc,
                Err(e) => {
                    log::warn!(
                        "Cache file {} is corrupt ({e}); starting with an empty cache",
                        path.display()
                    );
                    CacheDoc::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("Cache file {} does not exist yet", path.display());
                CacheDoc::default()
            }
            Err(e) => {
                log::warn!(
                    "Cannot read cache file {} ({e}); starting with an empty cache",
                    path.display()
                );
                CacheDoc::default()
            }
        };

        Self {
            path: Some(path.to_path_buf()),
            doc,
            dirty: false,
        }
    }

    pub fn get(&self, key: &TitleKey) -> Option<&CacheEntry> {
        self.doc.games.get(&key.to_string())
    }

    /// Merge the non-empty fields of `partial` into the entry for `key`,
    /// creating it if absent.
    pub fn put(&mut self, key: &TitleKey, partial: CacheEntry) {
        self.doc
            .games
            .entry(key.to_string())
            .or_default()
            .merge(partial);
        self.dirty = true;
    }

    /// Discard an entry so a forced refresh re-fetches it from scratch.
    pub fn evict(&mut self, key: &TitleKey) {
        if self.doc.games.remove(&key.to_string()).is_some() {
            self.dirty = true;
        }
    }

    pub fn len(&self) -> usize {
        self.doc.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc.games.is_empty()
    }

    /// Persist to disk if anything changed. Writes to a temp file and
    /// renames over the target so an interrupted write can't corrupt the
    /// previous cache.
    pub fn flush(&mut self) -> Result<(), CatalogError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        self.doc.last_updated = Some(chrono::Utc::now().to_rfc3339());
        let json = serde_json::to_string_pretty(&self.doc)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;

        self.dirty = false;
        log::debug!("Flushed {} cache entries to {}", self.doc.games.len(), path.display());
        Ok(())
    }
}
