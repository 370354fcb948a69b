//! YAML configuration for a comparison deployment.
//!
//! The config file names the users and their Galaxy database files, the
//! cache location, IGDB credentials, and manual per-title metadata. Hidden
//! titles, forced-single-player titles, and metadata keys are written as
//! display titles in the file and normalized to slugs at load time.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::slug::slugify;
use crate::types::{MaxPlayers, UserId};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("YAML parse error in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yml::Error,
    },

    #[error("User {0} is not defined in the config file")]
    UnknownUser(UserId),

    #[error("User {0} has no database file configured")]
    MissingDb(UserId),
}

/// One user stanza: display name and the Galaxy database filename relative
/// to `db_path`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    pub username: Option<String>,
    pub db: Option<String>,
}

/// Manual metadata override for one title, keyed by slug after load.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleMetadata {
    #[serde(default)]
    pub max_players: MaxPlayers,
    pub comment: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory holding the per-user Galaxy database files.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Path of the persisted enrichment cache.
    pub cache: Option<PathBuf>,

    pub igdb_client_id: Option<String>,
    pub igdb_client_secret: Option<String>,

    #[serde(default)]
    pub users: BTreeMap<UserId, UserConfig>,

    /// Titles to drop entirely during extraction (DLC, editors, bundles).
    #[serde(default)]
    pub hidden: HashSet<String>,

    /// Titles to force-classify as single player regardless of catalog data.
    #[serde(default)]
    pub single_player: HashSet<String>,

    /// Manual per-title metadata, keyed by display title in the file.
    #[serde(default)]
    pub metadata: BTreeMap<String, TitleMetadata>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from(".")
}

impl Config {
    /// Load and normalize a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&contents).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Parse config YAML and slug-normalize the title-keyed sections.
    pub fn from_yaml(contents: &str) -> Result<Self, serde_yml::Error> {
        let mut config: Config = serde_yml::from_str(contents)?;

        config.hidden = config.hidden.iter().map(|t| slugify(t)).collect();
        config.single_player = config.single_player.iter().map(|t| slugify(t)).collect();
        config.metadata = std::mem::take(&mut config.metadata)
            .into_iter()
            .map(|(title, meta)| (slugify(&title), meta))
            .collect();

        Ok(config)
    }

    /// Full path of a user's Galaxy database file.
    pub fn db_file(&self, user_id: UserId) -> Result<PathBuf, ConfigError> {
        let user = self
            .users
            .get(&user_id)
            .ok_or(ConfigError::UnknownUser(user_id))?;
        let db = user.db.as_ref().ok_or(ConfigError::MissingDb(user_id))?;
        Ok(self.db_path.join(db))
    }

    /// Display name for a user, falling back to the numeric id.
    pub fn username(&self, user_id: UserId) -> String {
        self.users
            .get(&user_id)
            .and_then(|u| u.username.clone())
            .unwrap_or_else(|| user_id.to_string())
    }
}
