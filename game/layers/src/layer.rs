use serde::{Deserialize, Serialize};

use crate::faction::faction_tag;

/// One side of a layer's faction pairing, as the server reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamInfo {
    pub faction: String,
}

/// A single playable layer of the map pool.
///
/// Identity is the `id` (e.g. `Gorodok_RAAS_v03`); everything else is
/// display/filter data derived from the server's layer list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerInfo {
    pub id: String,
    /// the plain map name without mode or version, e.g. `Gorodok`
    pub map_name: String,
    /// game mode tag, e.g. `RAAS`, `AAS`, `INVASION`, `SEED`
    pub game_mode: String,
    /// version tag including the leading `v`, e.g. `v03`
    pub version: String,
    pub teams: [TeamInfo; 2],
}

impl LayerInfo {
    /// Case-insensitive mode check, the server is not consistent about
    /// the casing of mode tags.
    pub fn is_mode(&self, mode: &str) -> bool {
        self.game_mode.eq_ignore_ascii_case(mode)
    }

    /// Whether the layer id starts with any of the given prefixes,
    /// case-insensitive.
    pub fn has_blacklisted_prefix(&self, prefixes: &[String]) -> bool {
        let id = self.id.to_ascii_lowercase();
        prefixes
            .iter()
            .any(|prefix| id.starts_with(&prefix.to_ascii_lowercase()))
    }

    /// Player-facing name: the id with underscores turned into spaces
    /// and a trailing `v<digits>` version token removed.
    pub fn display_name(&self) -> String {
        let words: Vec<&str> = self
            .id
            .split('_')
            .filter(|word| !is_version_token(word))
            .collect();
        words.join(" ")
    }

    /// Short `USA-RUS` style label of the faction pairing.
    pub fn faction_label(&self) -> String {
        format!(
            "{}-{}",
            faction_tag(&self.teams[0].faction),
            faction_tag(&self.teams[1].faction)
        )
    }
}

fn is_version_token(word: &str) -> bool {
    let Some(digits) = word.strip_prefix(['v', 'V']) else {
        return false;
    };
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}
