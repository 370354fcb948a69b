//! Platform-qualified title keys.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;

/// Distribution platforms GOG Galaxy is known to track. Anything else is
/// accepted but logged as unknown during extraction.
pub const KNOWN_PLATFORMS: &[&str] = &["epic", "gog", "origin", "steam", "uplay", "xboxone"];

/// A platform-qualified identifier for one title on one distribution
/// platform, e.g. `steam:377160`.
///
/// Galaxy release keys use an underscore separator (`steam_377160`); the
/// canonical display and serialized form uses a colon. Immutable once
/// created.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TitleKey {
    platform: String,
    id: String,
}

impl TitleKey {
    pub fn new(platform: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            id: id.into(),
        }
    }

    /// Parse a raw Galaxy release key (`steam_377160`). The platform is
    /// everything before the first underscore; keys with no underscore get
    /// the platform `unknown`.
    pub fn from_release_key(raw: &str) -> Self {
        match raw.trim().split_once('_') {
            Some((platform, id)) if !platform.is_empty() && !id.is_empty() => {
                Self::new(platform, id)
            }
            _ => Self::new("unknown", raw.trim()),
        }
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn native_id(&self) -> &str {
        &self.id
    }

    /// True for plain Steam keys. Galaxy sometimes carries a `steam_steam_1234`
    /// alias next to `steam_1234`; the doubled form is never a usable Steam
    /// app id, so it doesn't count.
    pub fn is_steam(&self) -> bool {
        self.platform == "steam" && !self.id.starts_with("steam_")
    }

    pub fn is_gog(&self) -> bool {
        self.platform == "gog"
    }
}

impl fmt::Display for TitleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.platform, self.id)
    }
}

impl FromStr for TitleKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((platform, id)) if !platform.is_empty() && !id.is_empty() => {
                Ok(Self::new(platform, id))
            }
            _ => Err(ParseKeyError(s.to_string())),
        }
    }
}

/// Error parsing a `platform:id` key string.
#[derive(Debug, thiserror::Error)]
#[error("invalid title key '{0}': expected platform:id")]
pub struct ParseKeyError(pub String);

impl serde::Serialize for TitleKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for TitleKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
