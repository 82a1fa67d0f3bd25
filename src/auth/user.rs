//! Discord user record
//!
//! Decoded from `GET /users/@me`. Only the fields the profile page needs
//! are kept; anything else Discord sends is dropped.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discord CDN root for avatar images
pub const DISCORD_CDN_BASE: &str = "https://cdn.discordapp.com";

/// Path token used when Discord sent `"avatar": null`
const MISSING_AVATAR_TOKEN: &str = "null";

/// Identity returned by a successful authorization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Discord snowflake, stable per account
    pub id: String,
    pub username: String,
    /// Display name chosen by the user, if any
    #[serde(default)]
    pub global_name: Option<String>,
    /// Avatar hash; `null` for accounts using a default avatar
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub premium_type: Option<PremiumTier>,
}

impl UserRecord {
    /// Name used in greetings: `global_name` when set, else `username`
    pub fn display_name(&self) -> &str {
        self.global_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(self.username.as_str())
    }

    /// Avatar image URL on the Discord CDN
    ///
    /// Always `avatars/{id}/{token}.png`. Accounts without a custom avatar
    /// keep their id in the path; see [`Self::default_avatar_url`] for the
    /// image to show when that path does not resolve.
    pub fn avatar_url(&self) -> String {
        let token = self
            .avatar
            .as_deref()
            .filter(|hash| !hash.is_empty())
            .unwrap_or(MISSING_AVATAR_TOKEN);
        format!("{DISCORD_CDN_BASE}/avatars/{}/{token}.png", self.id)
    }

    /// Whether Discord sent a custom avatar token
    pub fn has_custom_avatar(&self) -> bool {
        self.avatar.as_deref().is_some_and(|hash| !hash.is_empty())
    }

    /// Discord's built-in avatar for this account
    pub fn default_avatar_url(&self) -> String {
        let index = self.id.parse::<u64>().map(|id| (id >> 22) % 6).unwrap_or(0);
        format!("{DISCORD_CDN_BASE}/embed/avatars/{index}.png")
    }
}

/// Nitro subscription tier (`premium_type`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum PremiumTier {
    None,
    NitroClassic,
    Nitro,
    NitroBasic,
    Unknown(u8),
}

impl From<u8> for PremiumTier {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::None,
            1 => Self::NitroClassic,
            2 => Self::Nitro,
            3 => Self::NitroBasic,
            other => Self::Unknown(other),
        }
    }
}

impl From<PremiumTier> for u8 {
    fn from(tier: PremiumTier) -> Self {
        match tier {
            PremiumTier::None => 0,
            PremiumTier::NitroClassic => 1,
            PremiumTier::Nitro => 2,
            PremiumTier::NitroBasic => 3,
            PremiumTier::Unknown(other) => other,
        }
    }
}

impl fmt::Display for PremiumTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::NitroClassic => f.write_str("Nitro Classic"),
            Self::Nitro => f.write_str("Nitro"),
            Self::NitroBasic => f.write_str("Nitro Basic"),
            Self::Unknown(value) => write!(f, "Unknown ({value})"),
        }
    }
}
