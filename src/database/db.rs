use std::{collections::BTreeMap, fs, str::FromStr};

use chrono::Utc;
use sqlx::{
    migrate::MigrateError,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Sqlite, Transaction
};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::db_structs::{BattalionStats, CountryRow, DatabaseInfo, MedalRow, PlayerRow};
use crate::model::{
    constants::TOKEN_NAME,
    structures::{
        battalion::Battalion,
        country::{CountryData, CountryInfo, CountrySnapshot, CountrySummary, UserRecord},
        medal_type::MedalType,
        player::Player
    },
    week::current_week
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to apply database schema: {0}")]
    Migration(#[from] MigrateError),

    #[error("Failed to create database directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Player '{player}' not found in {country}")]
    PlayerNotFound { country: String, player: String }
}

/// Countries and everything belonging to them are stored under their lowercase name.
fn country_key(country_name: &str) -> String {
    country_name.trim().to_lowercase()
}

/// SQLite's `LOWER` only folds ASCII, so name lookups go through a key lowercased here.
fn username_key(username: &str) -> String {
    username.trim().to_lowercase()
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new()
    }
}

#[derive(Clone)]
pub struct DbClient {
    pool: SqlitePool,
    url: String
}

impl DbClient {
    /// Opens (creating if missing) the SQLite database at `url` and applies the schema.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let filename = options.clone().get_filename();
        if let Some(parent) = filename.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let pool = SqlitePoolOptions::new().max_connections(4).connect_with(options).await?;
        Self::from_pool(pool, url).await
    }

    /// A private in-memory database, gone once the client is dropped.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::from_pool(pool, "sqlite::memory:").await
    }

    async fn from_pool(pool: SqlitePool, url: &str) -> Result<Self, StoreError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        debug!("Database schema is up to date");

        Ok(DbClient {
            pool,
            url: url.to_string()
        })
    }

    /// Caches a country from the countries listing
    pub async fn save_country(&self, country: &CountrySummary) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        Self::upsert_country(
            &mut tx,
            &country.cache_key(),
            &country.name,
            country.weekly_damage,
            country.active_population
        )
        .await?;
        tx.commit().await?;

        Ok(())
    }

    async fn upsert_country(
        tx: &mut Transaction<'_, Sqlite>,
        id: &str,
        name: &str,
        weekly_damage: i64,
        active_population: i64
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO countries (id, name, weekly_damage, active_population, last_updated) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
                name = excluded.name, \
                weekly_damage = excluded.weekly_damage, \
                active_population = excluded.active_population, \
                last_updated = excluded.last_updated"
        )
        .bind(id)
        .bind(name)
        .bind(weekly_damage)
        .bind(active_population)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn get_countries(&self) -> Result<Vec<CountryRow>, StoreError> {
        let rows = sqlx::query_as::<_, CountryRow>(
            "SELECT id, name, weekly_damage, active_population, last_updated FROM countries ORDER BY name"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Saves a fetched country and its players in one transaction.
    ///
    /// Players are upserted, so battalion assignments and medals survive a refresh.
    /// Country ranks follow the order of `snapshot.users`.
    pub async fn save_country_snapshot(&self, country_name: &str, snapshot: &CountrySnapshot) -> Result<(), StoreError> {
        let country_id = country_key(country_name);
        let name = if snapshot.country_info.name.is_empty() {
            capitalize(&country_id)
        } else {
            snapshot.country_info.name.clone()
        };
        let active_population = snapshot
            .active_population
            .unwrap_or(snapshot.users.len() as i64);

        let mut tx = self.pool.begin().await?;
        Self::upsert_country(
            &mut tx,
            &country_id,
            &name,
            snapshot.country_weekly_damage,
            active_population
        )
        .await?;

        for (i, user) in snapshot.users.iter().enumerate() {
            Self::upsert_player(&mut tx, &country_id, user, i as i64 + 1).await?;
        }

        tx.commit().await?;
        info!("Saved {} players for {}", snapshot.users.len(), name);

        Ok(())
    }

    async fn upsert_player(
        tx: &mut Transaction<'_, Sqlite>,
        country_id: &str,
        player: &Player,
        country_rank: i64
    ) -> Result<(), StoreError> {
        let id = if player.id.is_empty() {
            format!("{}_{}", country_id, player.username)
        } else {
            player.id.clone()
        };

        sqlx::query(
            "INSERT INTO players (id, username, username_key, level, avatar_url, country_id, weekly_damage, \
             global_rank, country_rank, last_updated) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
                username = excluded.username, \
                username_key = excluded.username_key, \
                level = excluded.level, \
                avatar_url = excluded.avatar_url, \
                country_id = excluded.country_id, \
                weekly_damage = excluded.weekly_damage, \
                global_rank = excluded.global_rank, \
                country_rank = excluded.country_rank, \
                last_updated = excluded.last_updated"
        )
        .bind(&id)
        .bind(&player.username)
        .bind(username_key(&player.username))
        .bind(player.level)
        .bind(&player.avatar_url)
        .bind(country_id)
        .bind(player.weekly_damage)
        .bind(player.global_rank)
        .bind(country_rank)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Everything cached for a country, or `None` when it was never saved.
    pub async fn load_country_data(&self, country_name: &str) -> Result<Option<CountryData>, StoreError> {
        let country_id = country_key(country_name);

        let Some(country) = sqlx::query_as::<_, CountryRow>(
            "SELECT id, name, weekly_damage, active_population, last_updated FROM countries WHERE id = ?"
        )
        .bind(&country_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let players = self.get_player_rows(&country_id).await?;

        let assignments: BTreeMap<String, Battalion> = players
            .iter()
            .filter(|p| p.battalion().is_assigned())
            .map(|p| (p.username.to_lowercase(), p.battalion()))
            .collect();

        let user_data = self.get_user_medals(&country_id).await?;

        Ok(Some(CountryData {
            users: players.into_iter().map(Player::from).collect(),
            country_weekly_damage: country.weekly_damage,
            active_population: country.active_population,
            country_info: CountryInfo {
                id: country.id,
                name: country.name
            },
            assignments,
            user_data,
            current_week: current_week(),
            last_updated: country.last_updated
        }))
    }

    async fn get_player_rows(&self, country_id: &str) -> Result<Vec<PlayerRow>, StoreError> {
        let rows = sqlx::query_as::<_, PlayerRow>(
            "SELECT id, username, level, avatar_url, weekly_damage, global_rank, country_rank, battalion \
             FROM players WHERE country_id = ? \
             ORDER BY weekly_damage DESC, country_rank ASC"
        )
        .bind(country_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn get_user_medals(&self, country_id: &str) -> Result<BTreeMap<String, UserRecord>, StoreError> {
        let rows = sqlx::query_as::<_, MedalRow>(
            "SELECT player_username, medal_type, week_identifier FROM medals WHERE country_id = ?"
        )
        .bind(country_id)
        .fetch_all(&self.pool)
        .await?;

        let mut user_data: BTreeMap<String, UserRecord> = BTreeMap::new();
        for row in rows {
            let Ok(medal) = MedalType::from_str(&row.medal_type) else {
                warn!("Ignoring unknown medal type '{}'", row.medal_type);
                continue;
            };

            user_data
                .entry(row.player_username.to_lowercase())
                .or_default()
                .medals
                .insert(row.week_identifier, medal);
        }

        Ok(user_data)
    }

    /// Lowercase username -> battalion, unassigned players omitted
    pub async fn get_assignments(&self, country_name: &str) -> Result<BTreeMap<String, Battalion>, StoreError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT username, battalion FROM players WHERE country_id = ? AND battalion != 'UNASSIGNED'"
        )
        .bind(country_key(country_name))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(username, battalion)| (username.to_lowercase(), Battalion::from_stored(&battalion)))
            .filter(|(_, battalion)| battalion.is_assigned())
            .collect())
    }

    /// Applies assignments keyed by username (matched case-insensitively).
    /// Returns the number of players updated; unknown usernames are ignored.
    pub async fn save_assignments(
        &self,
        country_name: &str,
        assignments: &BTreeMap<String, Battalion>
    ) -> Result<u64, StoreError> {
        let country_id = country_key(country_name);
        let mut updated = 0;
        let mut tx = self.pool.begin().await?;

        for (username, battalion) in assignments {
            let result = sqlx::query(
                "UPDATE players SET battalion = ?, last_updated = ? \
                 WHERE country_id = ? AND username_key = ?"
            )
            .bind(battalion.as_ref())
            .bind(Utc::now())
            .bind(&country_id)
            .bind(username_key(username))
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                warn!("No player named '{}' in {}", username, country_id);
            }
            updated += result.rows_affected();
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Awards `medal` to a player for `week`, replacing any medal already awarded that week.
    pub async fn assign_medal(
        &self,
        country_name: &str,
        player_name: &str,
        medal: MedalType,
        week: &str
    ) -> Result<(), StoreError> {
        let country_id = country_key(country_name);

        let (player_id, username): (String, String) =
            sqlx::query_as("SELECT id, username FROM players WHERE country_id = ? AND username_key = ?")
                .bind(&country_id)
                .bind(username_key(player_name))
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| StoreError::PlayerNotFound {
                    country: country_id.clone(),
                    player: player_name.to_string()
                })?;

        sqlx::query(
            "INSERT OR REPLACE INTO medals \
             (player_id, player_username, medal_type, week_identifier, country_id, awarded_at) \
             VALUES (?, ?, ?, ?, ?, ?)"
        )
        .bind(&player_id)
        .bind(&username)
        .bind(medal.as_ref())
        .bind(week)
        .bind(&country_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!("Awarded {} medal to {} for {}", medal, username, week);
        Ok(())
    }

    /// Week identifier -> medal for one player
    pub async fn get_player_medals(
        &self,
        country_name: &str,
        player_name: &str
    ) -> Result<BTreeMap<String, MedalType>, StoreError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT m.medal_type, m.week_identifier FROM medals m \
             JOIN players p ON p.id = m.player_id \
             WHERE p.country_id = ? AND p.username_key = ?"
        )
        .bind(country_key(country_name))
        .bind(username_key(player_name))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(medal, week)| MedalType::from_str(&medal).ok().map(|m| (week, m)))
            .collect())
    }

    /// Soldier count and damage per battalion, highest total damage first
    pub async fn get_battalion_stats(&self, country_name: &str) -> Result<Vec<BattalionStats>, StoreError> {
        let rows: Vec<(String, i64, i64, f64)> = sqlx::query_as(
            "SELECT battalion, COUNT(*), COALESCE(SUM(weekly_damage), 0), COALESCE(AVG(weekly_damage), 0.0) \
             FROM players WHERE country_id = ? \
             GROUP BY battalion \
             ORDER BY 3 DESC"
        )
        .bind(country_key(country_name))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(battalion, soldier_count, total_damage, average_damage)| BattalionStats {
                battalion: Battalion::from_stored(&battalion),
                soldier_count,
                total_damage,
                average_damage
            })
            .collect())
    }

    /// Removes the country together with its players and medals.
    /// Returns whether anything was cached for it.
    pub async fn clear_cache(&self, country_name: &str) -> Result<bool, StoreError> {
        let country_id = country_key(country_name);
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM medals WHERE country_id = ? \
             OR player_id IN (SELECT id FROM players WHERE country_id = ?)"
        )
        .bind(&country_id)
        .bind(&country_id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM players WHERE country_id = ?")
            .bind(&country_id)
            .execute(&mut *tx)
            .await?;
        let removed = sqlx::query("DELETE FROM countries WHERE id = ?")
            .bind(&country_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        info!("Cleared cached data for {}", country_id);

        Ok(removed > 0)
    }

    pub async fn get_database_info(&self) -> Result<DatabaseInfo, StoreError> {
        let (countries, players, medals): (i64, i64, i64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM countries), (SELECT COUNT(*) FROM players), (SELECT COUNT(*) FROM medals)"
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DatabaseInfo {
            countries,
            players,
            medals,
            database_url: self.url.clone()
        })
    }

    pub async fn vacuum(&self) -> Result<(), StoreError> {
        sqlx::query("VACUUM").execute(&self.pool).await?;
        info!("Database vacuumed");

        Ok(())
    }

    pub async fn save_token(&self, token: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO tokens (name, token, last_updated) VALUES (?, ?, ?) \
             ON CONFLICT(name) DO UPDATE SET token = excluded.token, last_updated = excluded.last_updated"
        )
        .bind(TOKEN_NAME)
        .bind(token)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_token(&self) -> Result<Option<String>, StoreError> {
        let token: Option<(String,)> = sqlx::query_as("SELECT token FROM tokens WHERE name = ?")
            .bind(TOKEN_NAME)
            .fetch_optional(&self.pool)
            .await?;

        Ok(token.map(|(t,)| t))
    }

    /// Closes every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
