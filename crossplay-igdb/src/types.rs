//! IGDB wire types and enum mappings.

use serde::Deserialize;

/// Twitch OAuth token response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

/// One row from `/external_games`: a per-platform uid mapped to a game id.
#[derive(Debug, Deserialize)]
pub struct ExternalGame {
    pub game: u64,
}

/// One row from `/games`.
#[derive(Debug, Deserialize)]
pub struct GameRecord {
    pub id: u64,
    #[serde(default)]
    pub game_modes: Vec<u64>,
}

/// One row from `/multiplayer_modes`. A game can have several (one per
/// platform); the effective max-player count is the maximum across all of
/// them.
#[derive(Debug, Default, Deserialize)]
pub struct MultiplayerMode {
    #[serde(default)]
    pub offlinecoopmax: Option<u32>,
    #[serde(default)]
    pub offlinemax: Option<u32>,
    #[serde(default)]
    pub onlinecoopmax: Option<u32>,
    #[serde(default)]
    pub onlinemax: Option<u32>,
}

impl MultiplayerMode {
    /// Largest of the four count fields, if any is present.
    pub fn max_players(&self) -> Option<u32> {
        [
            self.offlinecoopmax,
            self.offlinemax,
            self.onlinecoopmax,
            self.onlinemax,
        ]
        .into_iter()
        .flatten()
        .max()
    }
}

/// Game-mode tag recorded for pure single-player titles.
pub const SINGLEPLAYER_TAG: &str = "singleplayer";

/// Game-mode tags that imply multiplayer support.
pub const MULTIPLAYER_TAGS: &[&str] =
    &["multiplayer", "coop", "splitscreen", "mmo", "battleroyale"];

/// Map an IGDB game-mode enum value to its cache tag.
/// https://api-docs.igdb.com/#game-mode
pub fn game_mode_tag(id: u64) -> Option<&'static str> {
    match id {
        1 => Some(SINGLEPLAYER_TAG),
        2 => Some("multiplayer"),
        3 => Some("coop"),
        4 => Some("splitscreen"),
        5 => Some("mmo"),
        6 => Some("battleroyale"),
        _ => None,
    }
}

/// IGDB `external_games` category for a platform's native id, where the
/// mapping is usable. Only Steam uids reliably match; the other platforms'
/// ids don't line up with what IGDB stores, so they fall back to a slug
/// lookup.
/// https://api-docs.igdb.com/#external-game-enums
pub fn external_category(platform: &str) -> Option<u32> {
    match platform {
        "steam" => Some(1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_players_takes_largest_field() {
        let mode = MultiplayerMode {
            offlinecoopmax: Some(2),
            offlinemax: None,
            onlinecoopmax: Some(4),
            onlinemax: Some(10),
        };
        assert_eq!(mode.max_players(), Some(10));
    }

    #[test]
    fn test_max_players_empty_mode() {
        assert_eq!(MultiplayerMode::default().max_players(), None);
    }

    #[test]
    fn test_game_mode_tags() {
        assert_eq!(game_mode_tag(1), Some("singleplayer"));
        assert_eq!(game_mode_tag(6), Some("battleroyale"));
        assert_eq!(game_mode_tag(99), None);
    }

    #[test]
    fn test_only_steam_has_external_category() {
        assert_eq!(external_category("steam"), Some(1));
        assert_eq!(external_category("gog"), None);
        assert_eq!(external_category("epic"), None);
    }
}
