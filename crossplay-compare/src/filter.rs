//! The filter engine: select titles from a classified collection by
//! ownership, installation, multiplayer status and platform.

use std::collections::{BTreeSet, HashSet};

use crossplay_core::{GameCollection, TitleEntry, UserId};
use rand::seq::SliceRandom;

/// How selected users must relate to a title's owner set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnershipMode {
    /// Keep titles owned by at least one selected user.
    AnySelected,
    /// Keep titles owned by every selected user.
    #[default]
    CommonToAll,
}

/// One filter request.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    /// Users the comparison is about.
    pub users: BTreeSet<UserId>,
    pub exclude_platforms: HashSet<String>,
    pub include_single_player: bool,
    pub ownership: OwnershipMode,
    /// Require every selected user to have the title installed.
    pub installed_only: bool,
    /// Drop titles any unselected user also owns.
    pub exclusive: bool,
    /// Reduce the result to one uniformly chosen title.
    pub randomize: bool,
}

/// A filter result: surviving titles in collection order, plus a caption
/// describing the result size.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub games: GameCollection,
    pub caption: String,
}

fn survives(entry: &TitleEntry, criteria: &FilterCriteria) -> bool {
    if entry.owners.is_disjoint(&criteria.users) {
        return false;
    }
    if criteria.ownership == OwnershipMode::CommonToAll
        && !criteria.users.is_subset(&entry.owners)
    {
        return false;
    }
    if criteria.exclusive && entry.owners.difference(&criteria.users).next().is_some() {
        return false;
    }
    if !criteria.include_single_player && entry.multiplayer == Some(false) {
        return false;
    }
    if criteria.installed_only && !criteria.users.is_subset(&entry.installed) {
        return false;
    }
    if entry
        .platforms
        .iter()
        .any(|p| criteria.exclude_platforms.contains(p))
    {
        return false;
    }
    true
}

/// Apply `criteria` to a classified collection. The input order is
/// preserved; randomize picks one survivor uniformly after all other
/// predicates have run.
pub fn filter_collection(collection: &GameCollection, criteria: &FilterCriteria) -> FilterOutcome {
    let survivors: Vec<TitleEntry> = collection
        .iter()
        .filter(|e| survives(e, criteria))
        .cloned()
        .collect();

    if criteria.randomize {
        let picked: Vec<TitleEntry> = survivors
            .choose(&mut rand::thread_rng())
            .cloned()
            .into_iter()
            .collect();
        let caption = if picked.is_empty() {
            "0 games found".to_string()
        } else {
            "Random game selected".to_string()
        };
        return FilterOutcome {
            games: GameCollection::from_ordered(picked),
            caption,
        };
    }

    let caption = match survivors.len() {
        1 => "1 game found".to_string(),
        n => format!("{n} games found"),
    };
    FilterOutcome {
        games: GameCollection::from_ordered(survivors),
        caption,
    }
}
