//! The enrichment pass: resolve and fetch catalog data for every entry in
//! a merged collection, writing results into the cache.
//!
//! The scan is strictly sequential (the rate limit makes parallelism
//! pointless) and abortable between titles. Each title's cache entry is
//! independently valid, so interrupting mid-pass loses nothing that was
//! already written.

use std::sync::atomic::{AtomicBool, Ordering};

use crossplay_core::GameCollection;

use crate::cache::{CacheEntry, CatalogCache};
use crate::client::IgdbClient;
use crate::error::CatalogError;
use crate::types::{external_category, game_mode_tag};

/// Options for an enrichment pass.
#[derive(Debug, Clone, Default)]
pub struct EnrichOptions {
    /// Discard existing cache entries and re-fetch everything.
    pub force_refresh: bool,
}

/// Outcome counts for one enrichment pass.
#[derive(Debug, Default)]
pub struct EnrichSummary {
    /// Titles resolved and fetched from the API this pass.
    pub fetched: usize,
    /// Titles already fully cached.
    pub cached: usize,
    /// Titles IGDB has no record of (including previously recorded misses).
    pub misses: usize,
    /// Titles skipped due to transient errors; retried next run.
    pub errors: usize,
    /// True if the pass stopped early on the cancel flag.
    pub cancelled: bool,
}

/// Enrich every entry of `collection`, writing into `cache`.
///
/// Per-title failures are logged and counted, never fatal. The only errors
/// that abort the pass are credential/configuration failures, which the
/// caller reports once and then proceeds without enrichment.
pub async fn enrich_collection(
    client: &IgdbClient,
    cache: &mut CatalogCache,
    collection: &GameCollection,
    options: &EnrichOptions,
    cancel: &AtomicBool,
) -> Result<EnrichSummary, CatalogError> {
    let mut summary = EnrichSummary::default();

    for entry in collection {
        if cancel.load(Ordering::Relaxed) {
            log::info!("Enrichment cancelled after {} titles", summary.fetched);
            summary.cancelled = true;
            break;
        }

        let key = &entry.lookup_key;

        if options.force_refresh {
            cache.evict(key);
        }

        if let Some(cached) = cache.get(key) {
            if cached.is_miss() {
                log::debug!("{key}: previously recorded miss, skipping");
                summary.misses += 1;
                continue;
            }
            if cached.is_complete() {
                summary.cached += 1;
                continue;
            }
            // Partial entry: fall through and fill the gaps.
        }

        match enrich_one(client, cache, key, &entry.slug).await {
            Ok(true) => summary.fetched += 1,
            Ok(false) => summary.misses += 1,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                // Transient failure: don't record a miss, retry next run.
                log::warn!("{key}: enrichment failed ({e}); continuing");
                summary.errors += 1;
            }
        }
    }

    Ok(summary)
}

/// Resolve and fetch one title. Returns false for a definitive miss.
async fn enrich_one(
    client: &IgdbClient,
    cache: &mut CatalogCache,
    key: &crossplay_core::TitleKey,
    slug: &str,
) -> Result<bool, CatalogError> {
    let existing_id = cache.get(key).and_then(|e| e.igdb_id);

    let igdb_id = match existing_id {
        Some(id) => Some(id),
        None => {
            // Exact lookup by platform uid where the mapping works, then
            // fall back to the slug.
            let mut id = match external_category(key.platform()) {
                Some(category) => client.external_game(category, key.native_id()).await?,
                None => None,
            };
            if id.is_none() {
                id = client.game_by_slug(slug).await?;
            }
            id
        }
    };

    let Some(igdb_id) = igdb_id else {
        log::debug!("{key}: no IGDB match, recording miss");
        cache.put(key, CacheEntry::default());
        return Ok(false);
    };

    let modes = client.game_modes(igdb_id).await?;
    let tags: Vec<String> = modes
        .into_iter()
        .filter_map(game_mode_tag)
        .map(str::to_string)
        .collect();
    let max_players = client.max_players(igdb_id).await?;

    log::debug!(
        "{key}: IGDB {igdb_id}, max players {:?}, modes {:?}",
        max_players,
        tags
    );

    cache.put(
        key,
        CacheEntry {
            igdb_id: Some(igdb_id),
            // 0 marks "fetched, IGDB has no count" so the entry counts as
            // complete and isn't re-fetched every run.
            max_players: Some(max_players.unwrap_or(0)),
            game_modes: Some(tags),
        },
    );
    Ok(true)
}
