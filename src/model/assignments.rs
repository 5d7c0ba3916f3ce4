use std::collections::BTreeMap;

use crate::model::structures::{battalion::Battalion, player::Player};

/// Battalion of `username` according to `assignments` (keyed by lowercase username).
///
/// Only the three real battalions count; anything else is unassigned.
pub fn resolve_battalion(username: &str, assignments: &BTreeMap<String, Battalion>) -> Battalion {
    match assignments.get(&username.to_lowercase()) {
        Some(battalion) if battalion.is_assigned() => *battalion,
        _ => Battalion::Unassigned
    }
}

/// Players of `battalion`, highest weekly damage first.
pub fn battalion_members<'a>(
    users: &'a [Player],
    assignments: &BTreeMap<String, Battalion>,
    battalion: Battalion
) -> Vec<&'a Player> {
    let mut members: Vec<&Player> = users
        .iter()
        .filter(|p| resolve_battalion(&p.username, assignments) == battalion)
        .collect();

    members.sort_by(|a, b| b.weekly_damage.cmp(&a.weekly_damage));
    members
}

/// Builds the assignment map for `battalion` from a list of usernames.
///
/// Keys are lowercased; duplicates collapse into one entry.
pub fn assignments_for(usernames: &[String], battalion: Battalion) -> BTreeMap<String, Battalion> {
    usernames
        .iter()
        .map(|name| (name.trim().to_lowercase(), battalion))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}
