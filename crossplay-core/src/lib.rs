//! Shared types for the crossplay comparison pipeline.
//!
//! Everything that flows between the extraction, merge, enrichment and
//! filter stages lives here: platform-qualified title keys, per-user
//! ownership records, the merged `TitleEntry` aggregate, and the YAML
//! configuration file.

pub mod config;
pub mod key;
pub mod slug;
pub mod types;

pub use config::{Config, ConfigError, TitleMetadata, UserConfig};
pub use key::TitleKey;
pub use slug::slugify;
pub use types::{
    GameCollection, MaxPlayers, OwnedTuple, OwnershipRecord, RawLibrary, TitleEntry, UserId,
};
