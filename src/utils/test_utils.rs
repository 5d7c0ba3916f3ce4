use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};

use crate::model::structures::{
    country::{CountryData, CountryInfo, CountrySnapshot},
    player::Player
};

pub fn fixed_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 4, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

pub fn generate_player(id: &str, username: &str, weekly_damage: i64) -> Player {
    Player {
        id: id.to_string(),
        username: username.to_string(),
        level: 1,
        avatar_url: String::new(),
        weekly_damage,
        global_rank: 0,
        country_rank: 0
    }
}

/// Cached data for "Argentina" holding `users`, with no assignments or medals.
pub fn generate_country_data(users: Vec<Player>) -> CountryData {
    let total: i64 = users.iter().map(|p| p.weekly_damage).sum();

    CountryData {
        active_population: users.len() as i64,
        users,
        country_weekly_damage: total,
        country_info: CountryInfo {
            id: "argentina".to_string(),
            name: "Argentina".to_string()
        },
        assignments: BTreeMap::new(),
        user_data: BTreeMap::new(),
        current_week: "week_2025_23".to_string(),
        last_updated: fixed_timestamp()
    }
}

/// Snapshot of `country_name` whose players get ids `<country>-<n>`, ranks and
/// descending damage.
pub fn generate_snapshot(country_name: &str, usernames: &[&str], country_weekly_damage: i64) -> CountrySnapshot {
    let users = usernames
        .iter()
        .enumerate()
        .map(|(i, name)| Player {
            id: format!("{}-{}", country_name.to_lowercase(), i + 1),
            username: name.to_string(),
            level: 10 + i as i64,
            avatar_url: format!("https://img.example/{}.png", i + 1),
            weekly_damage: 1000 * (usernames.len() - i) as i64,
            global_rank: 5 * (i as i64 + 1),
            country_rank: i as i64 + 1
        })
        .collect();

    CountrySnapshot {
        country_info: CountryInfo {
            id: format!("id-{}", country_name.to_lowercase()),
            name: country_name.to_string()
        },
        users,
        country_weekly_damage,
        active_population: Some(usernames.len() as i64 * 2),
        current_week: "week_2025_23".to_string(),
        last_updated: fixed_timestamp()
    }
}
