//! Multiplayer classification.
//!
//! Each entry is run through an ordered list of resolvers; the first one
//! with an opinion wins. Manual configuration always beats cached catalog
//! data.

use std::collections::{BTreeMap, HashSet};

use crossplay_core::{GameCollection, MaxPlayers, TitleEntry, TitleMetadata};
use crossplay_igdb::{CatalogCache, MULTIPLAYER_TAGS, SINGLEPLAYER_TAG};

/// A resolver's verdict for one title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub multiplayer: bool,
    pub max_players: MaxPlayers,
}

/// Read-only inputs the resolvers consult.
pub struct ClassifyContext<'a> {
    /// Per-title manual overrides, keyed by slug.
    pub metadata: &'a BTreeMap<String, TitleMetadata>,
    /// Slugs forced to single-player regardless of catalog data.
    pub single_player: &'a HashSet<String>,
    pub cache: &'a CatalogCache,
}

type Resolver = fn(&TitleEntry, &ClassifyContext) -> Option<Classification>;

/// Resolvers in priority order. First hit wins.
const RESOLVERS: &[(&str, Resolver)] = &[
    ("manual override", manual_override),
    ("forced single player", forced_single_player),
    ("cached max players", cached_max_players),
    ("cached game modes", cached_game_modes),
];

fn manual_override(entry: &TitleEntry, ctx: &ClassifyContext) -> Option<Classification> {
    let meta = ctx.metadata.get(&entry.slug)?;
    let multiplayer = meta.max_players.implies_multiplayer()?;
    Some(Classification {
        multiplayer,
        max_players: meta.max_players,
    })
}

fn forced_single_player(entry: &TitleEntry, ctx: &ClassifyContext) -> Option<Classification> {
    if ctx.single_player.contains(&entry.slug) {
        Some(Classification {
            multiplayer: false,
            max_players: MaxPlayers::Limit(1),
        })
    } else {
        None
    }
}

fn cached_max_players(entry: &TitleEntry, ctx: &ClassifyContext) -> Option<Classification> {
    let cached = ctx.cache.get(&entry.lookup_key)?;
    match cached.max_players {
        // 0 means the catalog had no count; defer to the next resolver.
        Some(n) if n > 0 => Some(Classification {
            multiplayer: n > 1,
            max_players: MaxPlayers::Limit(n),
        }),
        _ => None,
    }
}

fn cached_game_modes(entry: &TitleEntry, ctx: &ClassifyContext) -> Option<Classification> {
    let cached = ctx.cache.get(&entry.lookup_key)?;
    let modes = cached.game_modes.as_deref()?;
    if modes.iter().any(|m| MULTIPLAYER_TAGS.contains(&m.as_str())) {
        return Some(Classification {
            multiplayer: true,
            max_players: MaxPlayers::Unknown,
        });
    }
    if modes.iter().any(|m| m == SINGLEPLAYER_TAG) {
        return Some(Classification {
            multiplayer: false,
            max_players: MaxPlayers::Limit(1),
        });
    }
    None
}

/// Classify one entry. Titles no resolver has an opinion on default to
/// single-player with an unknown count, so they drop out of
/// multiplayer-only views rather than cluttering them.
pub fn classify_entry(entry: &TitleEntry, ctx: &ClassifyContext) -> Classification {
    for (name, resolver) in RESOLVERS {
        if let Some(c) = resolver(entry, ctx) {
            log::debug!("{}: classified by {name}: {c:?}", entry.slug);
            return c;
        }
    }
    Classification {
        multiplayer: false,
        max_players: MaxPlayers::Unknown,
    }
}

/// Classify every entry in place, also attaching any configured comment
/// and URL (those apply even when a cached resolver wins).
pub fn classify_collection(collection: &mut GameCollection, ctx: &ClassifyContext) {
    for entry in collection.iter_mut() {
        let c = classify_entry(entry, ctx);
        entry.multiplayer = Some(c.multiplayer);
        entry.max_players = c.max_players;
        if let Some(meta) = ctx.metadata.get(&entry.slug) {
            entry.comment = meta.comment.clone();
            entry.url = meta.url.clone();
        }
    }
}
