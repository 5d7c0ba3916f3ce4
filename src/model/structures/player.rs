use serde::{Deserialize, Serialize};

use crate::utils::serde_utils::lenient_i64;

fn default_level() -> i64 {
    1
}

/// A ranked member of a country, as cached locally and exported.
///
/// The serialized field names are the ones used by JSON backups, so older
/// backups keep importing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Game user id. Empty ids are replaced by `<country>_<username>` when saved.
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "name")]
    pub username: String,
    #[serde(default = "default_level", deserialize_with = "lenient_i64")]
    pub level: i64,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub weekly_damage: i64,
    /// Position in the global weekly damage ranking
    #[serde(rename = "weeklyRankingPosition", default, deserialize_with = "lenient_i64")]
    pub global_rank: i64,
    /// Position among the players of the same country, 1-based
    #[serde(rename = "countryRankingPosition", default, deserialize_with = "lenient_i64")]
    pub country_rank: i64
}

impl Player {
    pub fn username_key(&self) -> String {
        self.username.to_lowercase()
    }
}
