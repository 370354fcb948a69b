//! IGDB enrichment: external catalog client and persistent lookup cache.
//!
//! Resolves each title's lookup key to an IGDB game id, fetches multiplayer
//! metadata, and records everything in a JSON cache that survives restarts.
//! The client owns its token and rate-limit state; nothing here is a
//! process-wide singleton.

pub mod cache;
pub mod client;
pub mod credentials;
pub mod enrich;
pub mod error;
pub mod types;

pub use cache::{CacheEntry, CatalogCache};
pub use client::IgdbClient;
pub use credentials::IgdbCredentials;
pub use enrich::{EnrichOptions, EnrichSummary, enrich_collection};
pub use error::CatalogError;
pub use types::{MULTIPLAYER_TAGS, SINGLEPLAYER_TAG, external_category, game_mode_tag};
