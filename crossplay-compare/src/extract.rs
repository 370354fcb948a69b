//! Per-user library extraction.
//!
//! Turns one user's raw Galaxy rows into normalized ownership records. A
//! pure transform: malformed rows are skipped with a log line, never
//! fatal.

use std::collections::HashSet;

use crossplay_core::key::KNOWN_PLATFORMS;
use crossplay_core::{OwnershipRecord, RawLibrary, TitleKey, UserId, slugify};

/// Caller-supplied extraction criteria.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions<'a> {
    /// Slugs to drop entirely (DLC, editors, soundtracks).
    pub hidden: Option<&'a HashSet<String>>,
    /// Platforms whose identifiers are dropped. A title whose identifiers
    /// are all excluded is skipped for this user.
    pub exclude_platforms: Option<&'a HashSet<String>>,
}

impl ExtractOptions<'_> {
    fn is_hidden(&self, slug: &str) -> bool {
        self.hidden.is_some_and(|h| h.contains(slug))
    }

    fn is_excluded(&self, platform: &str) -> bool {
        self.exclude_platforms.is_some_and(|p| p.contains(platform))
    }
}

/// One user's extracted records, ready for merging.
#[derive(Debug, Clone)]
pub struct UserLibrary {
    pub user_id: UserId,
    pub records: Vec<OwnershipRecord>,
}

/// Extract one user's ownership records from their raw library data.
pub fn extract_user_library(lib: &RawLibrary, options: &ExtractOptions) -> UserLibrary {
    let installed: HashSet<TitleKey> = lib
        .installed
        .iter()
        .map(|k| TitleKey::from_release_key(k))
        .collect();

    // Every owned key before any filtering, for the installed-consistency
    // check at the end.
    let mut all_owned: HashSet<TitleKey> = HashSet::new();
    let mut records = Vec::new();

    for tuple in &lib.owned {
        let keys: Vec<TitleKey> = tuple
            .release_keys
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(TitleKey::from_release_key)
            .collect();
        all_owned.extend(keys.iter().cloned());

        let Some(title) = parse_title(tuple.title_payload.as_deref()) else {
            log::warn!(
                "user {}: skipping '{}': missing or unparseable title payload",
                lib.user_id,
                tuple.release_keys
            );
            continue;
        };

        let slug = slugify(&title);
        if options.is_hidden(&slug) {
            log::debug!("user {}: skipping hidden title {title}", lib.user_id);
            continue;
        }

        let surviving: Vec<TitleKey> = keys
            .into_iter()
            .filter(|k| {
                if options.is_excluded(k.platform()) {
                    log::debug!("user {}: dropping {k} (platform excluded)", lib.user_id);
                    false
                } else {
                    true
                }
            })
            .collect();

        if surviving.is_empty() {
            log::debug!(
                "user {}: skipping {title}: every platform excluded",
                lib.user_id
            );
            continue;
        }

        for key in &surviving {
            if !KNOWN_PLATFORMS.contains(&key.platform()) {
                log::warn!("user {}: unknown platform {} for {title}", lib.user_id, key.platform());
            }
        }

        let title_installed = surviving.iter().any(|k| installed.contains(k));
        let (key, aliases) = split_primary(surviving);
        records.push(OwnershipRecord {
            key,
            title,
            slug,
            aliases,
            installed: title_installed,
        });
    }

    // An installed identifier the user doesn't own is a data error: drop
    // it with a warning rather than inventing ownership.
    for key in &installed {
        if !all_owned.contains(key) {
            log::warn!(
                "user {}: installed key {key} has no owned record; dropping",
                lib.user_id
            );
        }
    }

    UserLibrary {
        user_id: lib.user_id,
        records,
    }
}

/// Pick the record's primary key from a title's surviving identifiers,
/// preferring steam, then gog, then tuple order. The same title owned by
/// different users then lands on the same key during merging.
fn split_primary(mut keys: Vec<TitleKey>) -> (TitleKey, Vec<TitleKey>) {
    let idx = keys
        .iter()
        .position(TitleKey::is_steam)
        .or_else(|| keys.iter().position(TitleKey::is_gog))
        .unwrap_or(0);
    let primary = keys.remove(idx);
    (primary, keys)
}

/// Pull the display title out of a Galaxy title payload
/// (`{"title": "..."}`). Returns `None` for absent, null, or malformed
/// payloads.
fn parse_title(payload: Option<&str>) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(payload?).ok()?;
    value.get("title")?.as_str().map(str::to_string)
}
