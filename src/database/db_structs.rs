use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::model::structures::{battalion::Battalion, player::Player};

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CountryRow {
    /// Lowercase country name
    pub id: String,
    pub name: String,
    pub weekly_damage: i64,
    pub active_population: i64,
    pub last_updated: DateTime<Utc>
}

#[derive(Debug, Clone, FromRow)]
pub struct PlayerRow {
    pub id: String,
    pub username: String,
    pub level: i64,
    pub avatar_url: Option<String>,
    pub weekly_damage: i64,
    pub global_rank: i64,
    pub country_rank: i64,
    pub battalion: String
}

impl PlayerRow {
    pub fn battalion(&self) -> Battalion {
        Battalion::from_stored(&self.battalion)
    }
}

impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Self {
        Player {
            id: row.id,
            username: row.username,
            level: row.level,
            avatar_url: row.avatar_url.unwrap_or_default(),
            weekly_damage: row.weekly_damage,
            global_rank: row.global_rank,
            country_rank: row.country_rank
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MedalRow {
    pub player_username: String,
    pub medal_type: String,
    pub week_identifier: String
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattalionStats {
    pub battalion: Battalion,
    pub soldier_count: i64,
    pub total_damage: i64,
    pub average_damage: f64
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseInfo {
    pub countries: i64,
    pub players: i64,
    pub medals: i64,
    pub database_url: String
}
