use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
    str::FromStr
};

use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    database::db::{DbClient, StoreError},
    model::{
        structures::{
            battalion::Battalion,
            country::{CountryData, CountryInfo, CountrySnapshot},
            medal_type::MedalType,
            player::Player
        },
        week::current_week
    },
    utils::serde_utils::{lenient_i64, lenient_opt_i64}
};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No cached data for {0}")]
    NoData(String),

    #[error("Backup has no country name")]
    MissingCountry,

    #[error("Failed to access backup file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backup is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError)
}

/// JSON backup of a country: the cached data plus where and when it came from.
#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    pub country: &'a str,
    pub export_timestamp: String,
    #[serde(flatten)]
    pub data: &'a CountryData
}

#[derive(Debug, Default, Deserialize)]
struct ImportedCountryInfo {
    #[serde(rename = "_id", default)]
    id: String,
    #[serde(default)]
    name: String
}

#[derive(Debug, Default, Deserialize)]
struct ImportedUserRecord {
    #[serde(default)]
    medals: BTreeMap<String, String>
}

/// Backups are read leniently: only `country` is required.
#[derive(Debug, Deserialize)]
struct ImportDocument {
    country: Option<String>,
    #[serde(default)]
    users: Vec<Player>,
    #[serde(default, deserialize_with = "lenient_i64")]
    country_weekly_damage: i64,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    active_population: Option<i64>,
    #[serde(default)]
    country_info: ImportedCountryInfo,
    #[serde(default)]
    assignments: BTreeMap<String, String>,
    #[serde(default)]
    user_data: BTreeMap<String, ImportedUserRecord>
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub country: String,
    pub players: usize,
    pub assignments: u64,
    pub medals: usize
}

/// Writes the cached data of `country` to `path` as pretty-printed JSON.
pub async fn export_country(store: &DbClient, country: &str, path: &Path) -> Result<(), ExportError> {
    let data = store
        .load_country_data(country)
        .await?
        .ok_or_else(|| ExportError::NoData(country.to_string()))?;

    let document = ExportDocument {
        country,
        export_timestamp: Local::now().to_rfc3339(),
        data: &data
    };

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &document)?;
    writer.flush()?;

    info!("Exported {} players of {} to {}", data.users.len(), country, path.display());
    Ok(())
}

/// Restores a backup written by [`export_country`]: players first, then
/// battalion assignments, then medals.
pub async fn import_country(store: &DbClient, path: &Path) -> Result<ImportSummary, ExportError> {
    let document: ImportDocument = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    let country = document
        .country
        .filter(|c| !c.trim().is_empty())
        .ok_or(ExportError::MissingCountry)?;

    let snapshot = CountrySnapshot {
        country_info: CountryInfo {
            id: document.country_info.id,
            name: document.country_info.name
        },
        active_population: document.active_population,
        country_weekly_damage: document.country_weekly_damage,
        users: document.users,
        current_week: current_week(),
        last_updated: Utc::now()
    };
    store.save_country_snapshot(&country, &snapshot).await?;

    let assignments = parse_assignments(&document.assignments);
    let assigned = store.save_assignments(&country, &assignments).await?;

    let mut medals = 0;
    for (username, record) in &document.user_data {
        for (week, medal) in &record.medals {
            let Ok(medal) = MedalType::from_str(medal) else {
                warn!("Skipping unknown medal '{}' of {}", medal, username);
                continue;
            };

            match store.assign_medal(&country, username, medal, week).await {
                Ok(()) => medals += 1,
                Err(StoreError::PlayerNotFound { .. }) => {
                    warn!("Skipping medal of {}: player not in backup", username)
                }
                Err(e) => return Err(e.into())
            }
        }
    }

    let summary = ImportSummary {
        country,
        players: snapshot.users.len(),
        assignments: assigned,
        medals
    };
    info!(
        "Imported {} players, {} assignments and {} medals for {}",
        summary.players, summary.assignments, summary.medals, summary.country
    );

    Ok(summary)
}

fn parse_assignments(raw: &BTreeMap<String, String>) -> BTreeMap<String, Battalion> {
    raw.iter()
        .filter_map(|(username, battalion)| match Battalion::from_str(battalion) {
            Ok(b) if b.is_assigned() => Some((username.to_lowercase(), b)),
            Ok(_) => None,
            Err(_) => {
                warn!("Skipping unknown battalion '{}' of {}", battalion, username);
                None
            }
        })
        .collect()
}
