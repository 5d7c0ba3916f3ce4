use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::structures::country::CountrySummary;

/// One element of a tRPC batch response
#[derive(Debug, Deserialize)]
pub struct TrpcResponse<T> {
    pub result: Option<TrpcResult<T>>,
    pub error: Option<Value>
}

#[derive(Debug, Deserialize)]
pub struct TrpcResult<T> {
    pub data: T
}

/// A cursor-paginated list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Opaque; sent back untouched to fetch the following page
    pub next_cursor: Option<Value>
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankingEntry {
    /// User id
    pub user: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub rank: i64
}

impl RankingEntry {
    pub fn damage(&self) -> i64 {
        self.value.round() as i64
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountryUser {
    #[serde(rename = "_id")]
    pub id: Option<String>
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Leveling {
    #[serde(default)]
    pub level: i64
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserLite {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: Option<String>,
    pub leveling: Option<Leveling>,
    pub avatar_url: Option<String>
}

impl UserLite {
    pub fn level(&self) -> i64 {
        self.leveling.as_ref().map(|l| l.level).unwrap_or(1)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RankingValue {
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub rank: i64
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryRankings {
    #[serde(default)]
    pub weekly_country_damages: RankingValue,
    #[serde(default)]
    pub country_active_population: RankingValue
}

/// Entry of the public countries listing
#[derive(Debug, Clone, Deserialize)]
pub struct CountryDTO {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rankings: CountryRankings
}

impl From<CountryDTO> for CountrySummary {
    fn from(dto: CountryDTO) -> Self {
        let damages = &dto.rankings.weekly_country_damages;
        let population = &dto.rankings.country_active_population;

        CountrySummary {
            id: dto.id.clone().unwrap_or_default(),
            name: dto.name.clone(),
            weekly_damage: damages.value.round() as i64,
            weekly_rank: damages.rank,
            active_population: population.value.round() as i64,
            population_rank: population.rank
        }
    }
}
