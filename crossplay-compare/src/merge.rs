//! Cross-user merge: fold every user's ownership records into one ordered
//! collection of title entries.

use std::collections::HashMap;

use crossplay_core::{GameCollection, TitleEntry, TitleKey};

use crate::extract::UserLibrary;

/// First-seen platform ranks, with steam and gog pinned to the front so
/// ties between a title's storefronts break the same way every run.
struct PlatformOrder {
    ranks: HashMap<String, usize>,
}

impl PlatformOrder {
    fn new() -> Self {
        let mut ranks = HashMap::new();
        ranks.insert("steam".to_string(), 0);
        ranks.insert("gog".to_string(), 1);
        Self { ranks }
    }

    fn observe(&mut self, platform: &str) {
        if !self.ranks.contains_key(platform) {
            self.ranks.insert(platform.to_string(), self.ranks.len());
        }
    }

    fn rank(&self, platform: &str) -> usize {
        self.ranks.get(platform).copied().unwrap_or(usize::MAX)
    }
}

/// Merge extracted libraries into one collection.
///
/// Entries are keyed by platform identifier, so the same title owned by
/// several users accumulates owners rather than duplicating. After the
/// keyed fold, entries sharing a slug are consolidated into one row, but
/// only when their owner sets are identical: if one user owns the Steam
/// release and another the GOG release, those remain separate rows, since
/// collapsing them would fabricate ownership.
pub fn merge_libraries(libraries: &[UserLibrary]) -> GameCollection {
    let mut entries: HashMap<TitleKey, TitleEntry> = HashMap::new();
    let mut order = PlatformOrder::new();

    for lib in libraries {
        for record in &lib.records {
            order.observe(record.key.platform());
            let entry = entries
                .entry(record.key.clone())
                .or_insert_with(|| TitleEntry::from_record(record));
            for alias in &record.aliases {
                entry.add_platform(alias.platform());
            }
            entry.owners.insert(lib.user_id);
            if record.installed {
                entry.installed.insert(lib.user_id);
            }
        }
    }

    let mut sorted: Vec<TitleEntry> = entries.into_values().collect();
    sorted.sort_by(|a, b| {
        (a.slug.as_str(), order.rank(a.key.platform()), &a.key)
            .cmp(&(b.slug.as_str(), order.rank(b.key.platform()), &b.key))
    });

    let mut consolidated: Vec<TitleEntry> = Vec::with_capacity(sorted.len());
    for entry in sorted {
        let target = consolidated
            .iter_mut()
            .rev()
            .take_while(|p| p.slug == entry.slug)
            .find(|p| p.owners == entry.owners);
        match target {
            Some(prev) => {
                for platform in &entry.platforms {
                    prev.add_platform(platform);
                }
                prev.installed.extend(entry.installed.iter().copied());
            }
            None => consolidated.push(entry),
        }
    }

    GameCollection::from_ordered(consolidated)
}
