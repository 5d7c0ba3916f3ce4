use askama::Template;

use crate::model::{
    format::format_damage,
    structures::battalion::Battalion,
    summary::{BattalionRoster, BattalionSummary, RowKind, SummaryRow}
};

struct SummaryLine<'a> {
    label: &'a str,
    icon: &'static str,
    soldiers: String,
    total_damage: String,
    percentage: String,
    average_damage: String,
    total: bool
}

impl<'a> From<&'a SummaryRow> for SummaryLine<'a> {
    fn from(row: &'a SummaryRow) -> Self {
        SummaryLine {
            label: row.kind.label(),
            icon: row.kind.icon(),
            soldiers: format_damage(row.soldiers),
            total_damage: format_damage(row.total_damage),
            percentage: format!("{:.1}%", row.percentage),
            average_damage: format_damage(row.average_damage),
            total: row.kind == RowKind::Total
        }
    }
}

#[derive(Template)]
#[template(path = "summary_report.html")]
struct SummaryReport<'a> {
    title: String,
    country: &'a str,
    week: &'a str,
    lines: Vec<SummaryLine<'a>>
}

struct RosterLine<'a> {
    rank: usize,
    username: &'a str,
    level: i64,
    weekly_damage: String,
    global_rank: i64,
    medals: &'a str
}

#[derive(Template)]
#[template(path = "battalion_report.html")]
struct BattalionReport<'a> {
    title: String,
    battalion: Battalion,
    icon: &'static str,
    regiment: &'static str,
    week: &'a str,
    lines: Vec<RosterLine<'a>>,
    /// Members left out of `lines` by the roster limit
    hidden: usize,
    soldiers: i64,
    average_level: i64,
    total_damage: String,
    average_damage: String
}

pub fn render_summary(country: &str, week: &str, summary: &BattalionSummary) -> askama::Result<String> {
    let lines = summary
        .rows
        .iter()
        .chain(summary.unassigned.as_ref())
        .chain(std::iter::once(&summary.total))
        .map(SummaryLine::from)
        .collect();

    SummaryReport {
        title: format!("{} battalion summary - {}", country, week),
        country,
        week,
        lines
    }
    .render()
}

pub fn render_battalion(week: &str, roster: &BattalionRoster<'_>) -> askama::Result<String> {
    let battalion = roster.battalion;
    let stats = &roster.stats;

    let lines = roster
        .entries
        .iter()
        .map(|entry| RosterLine {
            rank: entry.rank,
            username: &entry.player.username,
            level: entry.player.level,
            weekly_damage: format_damage(entry.player.weekly_damage),
            global_rank: entry.player.global_rank,
            medals: &entry.medals
        })
        .collect();

    BattalionReport {
        title: format!("{} battalion report - {}", battalion, week),
        battalion,
        icon: battalion.icon(),
        regiment: battalion.display_name(),
        week,
        lines,
        hidden: (stats.soldiers as usize).saturating_sub(roster.entries.len()),
        soldiers: stats.soldiers,
        average_level: stats.average_level,
        total_damage: format_damage(stats.total_damage),
        average_damage: format_damage(stats.average_damage)
    }
    .render()
}
