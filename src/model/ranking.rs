use std::collections::{HashMap, HashSet};

use crate::{
    api::api_structs::{RankingEntry, UserLite},
    model::{
        assignments::resolve_battalion,
        constants::MAX_TOTAL_SOLDIERS,
        medals::medal_display,
        structures::{battalion::Battalion, country::CountryData, player::Player}
    }
};

/// Sorts players by weekly damage (highest first) and assigns 1-based country ranks.
///
/// The sort is stable, so players with equal damage keep their relative order.
pub fn rank_country_players(players: &mut [Player]) {
    players.sort_by(|a, b| b.weekly_damage.cmp(&a.weekly_damage));

    for (i, player) in players.iter_mut().enumerate() {
        player.country_rank = i as i64 + 1;
    }
}

/// Entries of the global ranking that belong to the country's users, in ranking order.
pub fn select_country_entries<'a>(ranking: &'a [RankingEntry], country_user_ids: &HashSet<String>) -> Vec<&'a RankingEntry> {
    ranking
        .iter()
        .filter(|entry| country_user_ids.contains(&entry.user))
        .collect()
}

/// Joins ranking entries with user details into ranked players.
///
/// Entries without details are dropped. At most [`MAX_TOTAL_SOLDIERS`] players
/// are kept, and the survivors receive their country rank.
pub fn build_country_players(entries: &[&RankingEntry], details: &HashMap<String, UserLite>) -> Vec<Player> {
    let mut players: Vec<Player> = entries
        .iter()
        .filter_map(|entry| {
            let user = details.get(&entry.user)?;
            Some(Player {
                id: entry.user.clone(),
                username: user.username.clone().unwrap_or_else(|| "Unknown".to_string()),
                level: user.level(),
                avatar_url: user.avatar_url.clone().unwrap_or_default(),
                weekly_damage: entry.damage(),
                global_rank: entry.rank,
                country_rank: 0
            })
        })
        .collect();

    rank_country_players(&mut players);
    players.truncate(MAX_TOTAL_SOLDIERS);
    players
}

/// A player row of the personnel listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerListing<'a> {
    pub player: &'a Player,
    pub battalion: Battalion,
    pub medals: String
}

/// Players whose username contains `needle` (case-insensitive), in cached order.
/// An empty needle matches everyone.
pub fn filter_players<'a>(data: &'a CountryData, needle: &str) -> Vec<PlayerListing<'a>> {
    let needle = needle.trim().to_lowercase();

    data.users
        .iter()
        .filter(|p| needle.is_empty() || p.username_key().contains(&needle))
        .map(|player| PlayerListing {
            player,
            battalion: resolve_battalion(&player.username, &data.assignments),
            medals: medal_display(data.medals_of(&player.username))
        })
        .collect()
}
