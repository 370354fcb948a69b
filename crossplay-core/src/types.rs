//! Pipeline data types: raw per-user records, ownership records, and the
//! merged title collection.

use std::collections::BTreeSet;
use std::fmt;

use crate::key::TitleKey;

/// A GOG Galaxy user id.
pub type UserId = u64;

/// One owned-title tuple as read from a user's Galaxy database: a
/// comma-joined list of release keys sharing one title, plus the raw title
/// payload (a JSON document with a `title` field, possibly missing).
#[derive(Debug, Clone)]
pub struct OwnedTuple {
    pub release_keys: String,
    pub title_payload: Option<String>,
}

/// One user's raw library data, as supplied by the database layer.
#[derive(Debug, Clone)]
pub struct RawLibrary {
    pub user_id: UserId,
    pub owned: Vec<OwnedTuple>,
    /// Flat list of raw release keys the user has installed.
    pub installed: Vec<String>,
}

/// One title as seen in one user's library: a single platform identifier
/// plus the sibling identifiers that carry the identical title. Created by
/// the extractor, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct OwnershipRecord {
    pub key: TitleKey,
    pub title: String,
    pub slug: String,
    /// Other surviving platform identifiers for the same title.
    pub aliases: Vec<TitleKey>,
    pub installed: bool,
}

impl OwnershipRecord {
    /// Pick the key to query the external catalog with. Steam identifiers
    /// match most reliably, GOG about half the time, everything else
    /// essentially never, so the preference order is steam, gog, then the
    /// record's own key.
    pub fn lookup_key(&self) -> TitleKey {
        let candidates = std::iter::once(&self.key).chain(self.aliases.iter());
        if let Some(steam) = candidates.clone().find(|k| k.is_steam()) {
            return steam.clone();
        }
        if let Some(gog) = candidates.clone().find(|k| k.is_gog()) {
            return gog.clone();
        }
        self.key.clone()
    }
}

/// How many players a title supports.
///
/// `Unknown` and `Unlimited` are distinct variants rather than sharing a
/// numeric sentinel, so an unbounded player count can never be mistaken
/// for missing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaxPlayers {
    /// No player-count data from any source.
    #[default]
    Unknown,
    /// Explicitly marked as having no player limit.
    Unlimited,
    /// A concrete maximum.
    Limit(u32),
}

impl MaxPlayers {
    /// Whether this count implies multiplayer. `None` when unknown.
    pub fn implies_multiplayer(self) -> Option<bool> {
        match self {
            MaxPlayers::Unknown => None,
            MaxPlayers::Unlimited => Some(true),
            MaxPlayers::Limit(n) => Some(n > 1),
        }
    }

    pub fn count(self) -> Option<u32> {
        match self {
            MaxPlayers::Limit(n) => Some(n),
            _ => None,
        }
    }
}

impl fmt::Display for MaxPlayers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxPlayers::Unknown => write!(f, "unknown"),
            MaxPlayers::Unlimited => write!(f, "no limit"),
            MaxPlayers::Limit(n) => write!(f, "{n}"),
        }
    }
}

impl<'de> serde::Deserialize<'de> for MaxPlayers {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Visitor;

        impl serde::de::Visitor<'_> for Visitor {
            type Value = MaxPlayers;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a player count or the string \"unlimited\"")
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<MaxPlayers, E> {
                if v == 0 {
                    Ok(MaxPlayers::Unknown)
                } else {
                    Ok(MaxPlayers::Limit(v.min(u32::MAX as u64) as u32))
                }
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<MaxPlayers, E> {
                if v < 0 {
                    Ok(MaxPlayers::Unlimited)
                } else {
                    self.visit_u64(v as u64)
                }
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<MaxPlayers, E> {
                match v {
                    "unlimited" | "no limit" | "no_limit" => Ok(MaxPlayers::Unlimited),
                    other => Err(E::custom(format!(
                        "unrecognized max_players value '{other}'"
                    ))),
                }
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}

/// The core aggregate: one logical title across all compared users,
/// indexed by its canonical platform key.
///
/// Created by the merger; the classifier fills in `multiplayer` and
/// `max_players`; the filter engine reads it.
#[derive(Debug, Clone)]
pub struct TitleEntry {
    /// Canonical key the entry is indexed under in the merged collection.
    pub key: TitleKey,
    pub title: String,
    pub slug: String,
    /// Platform names the title is available on, sorted.
    pub platforms: Vec<String>,
    pub owners: BTreeSet<UserId>,
    /// Users with the title installed. Always a subset of `owners`.
    pub installed: BTreeSet<UserId>,
    /// Key chosen for external catalog enrichment.
    pub lookup_key: TitleKey,
    /// `None` until the classifier has run.
    pub multiplayer: Option<bool>,
    pub max_players: MaxPlayers,
    pub comment: Option<String>,
    pub url: Option<String>,
}

impl TitleEntry {
    /// Seed a new entry from the first ownership record seen for this key.
    pub fn from_record(record: &OwnershipRecord) -> Self {
        Self {
            key: record.key.clone(),
            title: record.title.clone(),
            slug: record.slug.clone(),
            platforms: vec![record.key.platform().to_string()],
            owners: BTreeSet::new(),
            installed: BTreeSet::new(),
            lookup_key: record.lookup_key(),
            multiplayer: None,
            max_players: MaxPlayers::Unknown,
            comment: None,
            url: None,
        }
    }

    pub fn add_platform(&mut self, platform: &str) {
        if !self.platforms.iter().any(|p| p == platform) {
            self.platforms.push(platform.to_string());
            self.platforms.sort();
        }
    }
}

/// An ordered collection of merged title entries.
///
/// Order is slug-lexicographic with platform priority breaking ties, fixed
/// by the merger; the filter engine preserves it.
#[derive(Debug, Clone, Default)]
pub struct GameCollection {
    entries: Vec<TitleEntry>,
}

impl GameCollection {
    /// Build a collection from entries already in final order.
    pub fn from_ordered(entries: Vec<TitleEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TitleEntry> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, TitleEntry> {
        self.entries.iter_mut()
    }

    pub fn get(&self, key: &TitleKey) -> Option<&TitleEntry> {
        self.entries.iter().find(|e| &e.key == key)
    }

    pub fn entries(&self) -> &[TitleEntry] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a GameCollection {
    type Item = &'a TitleEntry;
    type IntoIter = std::slice::Iter<'a, TitleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for GameCollection {
    type Item = TitleEntry;
    type IntoIter = std::vec::IntoIter<TitleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
