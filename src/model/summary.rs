use itertools::Itertools;

use crate::model::{
    assignments::{battalion_members, resolve_battalion},
    medals::medal_display,
    structures::{battalion::Battalion, country::CountryData, player::Player}
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Battalion(Battalion),
    Unassigned,
    Total
}

impl RowKind {
    pub fn label(&self) -> &str {
        match self {
            RowKind::Battalion(b) => b.as_ref(),
            RowKind::Unassigned => "UNASSIGNED",
            RowKind::Total => "TOTAL"
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            RowKind::Battalion(b) => b.icon(),
            RowKind::Unassigned => Battalion::Unassigned.icon(),
            RowKind::Total => "🏴"
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub kind: RowKind,
    pub soldiers: i64,
    pub total_damage: i64,
    /// Share of the country's weekly damage, 0..=100
    pub percentage: f64,
    pub average_damage: i64
}

/// Strategic overview of how the country's weekly damage splits across battalions.
#[derive(Debug, Clone, PartialEq)]
pub struct BattalionSummary {
    /// Non-empty battalions in priority order
    pub rows: Vec<SummaryRow>,
    /// Damage not attributed to any battalion, present only when positive
    pub unassigned: Option<SummaryRow>,
    pub total: SummaryRow
}

fn percentage(part: i64, whole: i64) -> f64 {
    if whole > 0 {
        part as f64 / whole as f64 * 100.0
    } else {
        0.0
    }
}

fn average(total: i64, count: i64) -> i64 {
    if count > 0 {
        total / count
    } else {
        0
    }
}

pub fn battalion_summary(data: &CountryData) -> BattalionSummary {
    let country_total = data.country_weekly_damage;
    let by_battalion = data
        .users
        .iter()
        .into_group_map_by(|p| resolve_battalion(&p.username, &data.assignments));

    let rows: Vec<SummaryRow> = Battalion::RANKED
        .iter()
        .filter_map(|battalion| {
            let members = by_battalion.get(battalion)?;
            let soldiers = members.len() as i64;
            let total_damage: i64 = members.iter().map(|p| p.weekly_damage).sum();

            Some(SummaryRow {
                kind: RowKind::Battalion(*battalion),
                soldiers,
                total_damage,
                percentage: percentage(total_damage, country_total),
                average_damage: average(total_damage, soldiers)
            })
        })
        .collect();

    let assigned_soldiers: i64 = rows.iter().map(|r| r.soldiers).sum();
    let assigned_damage: i64 = rows.iter().map(|r| r.total_damage).sum();
    let unassigned_damage = country_total - assigned_damage;

    let unassigned = (unassigned_damage > 0).then(|| {
        let soldiers = (data.active_population - assigned_soldiers).max(0);
        SummaryRow {
            kind: RowKind::Unassigned,
            soldiers,
            total_damage: unassigned_damage,
            percentage: percentage(unassigned_damage, country_total),
            average_damage: average(unassigned_damage, soldiers)
        }
    });

    let total = SummaryRow {
        kind: RowKind::Total,
        soldiers: data.active_population,
        total_damage: country_total,
        percentage: 100.0,
        average_damage: average(country_total, data.active_population)
    };

    BattalionSummary { rows, unassigned, total }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry<'a> {
    /// 1-based position inside the battalion
    pub rank: usize,
    pub player: &'a Player,
    pub medals: String
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RosterStats {
    pub soldiers: i64,
    pub average_level: i64,
    pub total_damage: i64,
    pub average_damage: i64
}

#[derive(Debug, Clone, PartialEq)]
pub struct BattalionRoster<'a> {
    pub battalion: Battalion,
    pub entries: Vec<RosterEntry<'a>>,
    /// Computed over every member, even when `entries` is truncated
    pub stats: RosterStats
}

impl BattalionRoster<'_> {
    pub fn is_empty(&self) -> bool {
        self.stats.soldiers == 0
    }
}

/// Members of `battalion` by weekly damage, showing at most `limit` of them.
pub fn battalion_roster(data: &CountryData, battalion: Battalion, limit: Option<usize>) -> BattalionRoster<'_> {
    let members = battalion_members(&data.users, &data.assignments, battalion);

    let soldiers = members.len() as i64;
    let total_damage: i64 = members.iter().map(|p| p.weekly_damage).sum();
    let total_level: i64 = members.iter().map(|p| p.level).sum();

    let stats = RosterStats {
        soldiers,
        average_level: average(total_level, soldiers),
        total_damage,
        average_damage: average(total_damage, soldiers)
    };

    let entries = members
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .enumerate()
        .map(|(i, player)| RosterEntry {
            rank: i + 1,
            player,
            medals: medal_display(data.medals_of(&player.username))
        })
        .collect();

    BattalionRoster {
        battalion,
        entries,
        stats
    }
}
