use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{battalion::Battalion, medal_type::MedalType, player::Player};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryInfo {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String
}

/// Country-level figures as reported by the countries endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountrySummary {
    pub id: String,
    pub name: String,
    pub weekly_damage: i64,
    pub weekly_rank: i64,
    pub active_population: i64,
    pub population_rank: i64
}

impl CountrySummary {
    /// Countries are cached under their lowercase name.
    pub fn cache_key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// Freshly fetched ranking data for a single country.
#[derive(Debug, Clone, PartialEq)]
pub struct CountrySnapshot {
    pub country_info: CountryInfo,
    /// Sorted by weekly damage, highest first
    pub users: Vec<Player>,
    pub country_weekly_damage: i64,
    /// Falls back to the number of users when unknown
    pub active_population: Option<i64>,
    pub current_week: String,
    pub last_updated: DateTime<Utc>
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Week identifier -> medal awarded that week
    #[serde(default)]
    pub medals: BTreeMap<String, MedalType>
}

/// Everything cached for a country: players, battalion assignments and medals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryData {
    /// Sorted by weekly damage, highest first
    pub users: Vec<Player>,
    pub country_weekly_damage: i64,
    pub active_population: i64,
    pub country_info: CountryInfo,
    /// Lowercase username -> battalion. Unassigned players are omitted.
    pub assignments: BTreeMap<String, Battalion>,
    /// Lowercase username -> medals
    pub user_data: BTreeMap<String, UserRecord>,
    pub current_week: String,
    pub last_updated: DateTime<Utc>
}

impl CountryData {
    pub fn medals_of(&self, username: &str) -> Option<&BTreeMap<String, MedalType>> {
        self.user_data.get(&username.to_lowercase()).map(|record| &record.medals)
    }
}
