use std::fmt::{self, Display, Formatter};

use crate::model::{
    format::format_damage,
    ranking::PlayerListing,
    summary::{BattalionRoster, BattalionSummary, SummaryRow}
};

const RULE_WIDTH: usize = 78;

fn rule(f: &mut Formatter<'_>, c: char) -> fmt::Result {
    writeln!(f, "{}", c.to_string().repeat(RULE_WIDTH))
}

fn summary_row(f: &mut Formatter<'_>, row: &SummaryRow) -> fmt::Result {
    writeln!(
        f,
        "{:<12} {:<4} {:>10} {:>16} {:>10} {:>16}",
        row.kind.label(),
        row.kind.icon(),
        format_damage(row.soldiers),
        format_damage(row.total_damage),
        format!("{:.1}%", row.percentage),
        format_damage(row.average_damage)
    )
}

struct SummaryText<'a> {
    country: &'a str,
    week: &'a str,
    summary: &'a BattalionSummary
}

impl Display for SummaryText<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        rule(f, '=')?;
        writeln!(f, "STRATEGIC OVERVIEW - {} - {}", self.country.to_uppercase(), self.week)?;
        rule(f, '=')?;
        writeln!(
            f,
            "{:<12} {:<4} {:>10} {:>16} {:>10} {:>16}",
            "Battalion", "Icon", "Soldiers", "Total Damage", "Percentage", "Avg/Soldier"
        )?;
        rule(f, '-')?;

        for row in self.summary.rows.iter().chain(self.summary.unassigned.as_ref()) {
            summary_row(f, row)?;
        }

        rule(f, '-')?;
        summary_row(f, &self.summary.total)
    }
}

struct RosterText<'a> {
    week: &'a str,
    roster: &'a BattalionRoster<'a>
}

impl Display for RosterText<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let battalion = self.roster.battalion;

        rule(f, '=')?;
        writeln!(f, "{} BATTALION REPORT - {}", battalion, self.week)?;
        writeln!(f, "{} {}", battalion.icon(), battalion.display_name())?;
        rule(f, '=')?;
        writeln!(
            f,
            "{:<6} {:<24} {:>6} {:>14} {:>12}  {}",
            "Rank", "Soldier", "Level", "Weekly Damage", "Global Rank", "Medals"
        )?;
        rule(f, '-')?;

        for entry in &self.roster.entries {
            writeln!(
                f,
                "{:<6} {:<24} {:>6} {:>14} {:>12}  {}",
                format!("#{}", entry.rank),
                entry.player.username,
                entry.player.level,
                format_damage(entry.player.weekly_damage),
                format!("#{}", entry.player.global_rank),
                entry.medals
            )?;
        }

        let stats = &self.roster.stats;
        let shown = self.roster.entries.len();
        if shown < stats.soldiers as usize {
            writeln!(f, "... {} more", stats.soldiers as usize - shown)?;
        }

        rule(f, '-')?;
        writeln!(
            f,
            "{:<6} {:<24} {:>6} {:>14} {:>12}",
            "STATS",
            format!("{} soldiers", stats.soldiers),
            format!("Avg: {}", stats.average_level),
            format_damage(stats.total_damage),
            format!("Avg: {}", format_damage(stats.average_damage))
        )
    }
}

struct PlayersText<'a>(&'a [PlayerListing<'a>]);

impl Display for PlayersText<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<6} {:<24} {:>6} {:>14} {:>12}  {:<11} {}",
            "Rank", "Soldier", "Level", "Weekly Damage", "Global Rank", "Battalion", "Medals"
        )?;
        rule(f, '-')?;

        for listing in self.0 {
            let player = listing.player;
            writeln!(
                f,
                "{:<6} {:<24} {:>6} {:>14} {:>12}  {:<11} {}",
                format!("#{}", player.country_rank),
                player.username,
                player.level,
                format_damage(player.weekly_damage),
                format!("#{}", player.global_rank),
                listing.battalion.as_ref(),
                listing.medals
            )?;
        }

        Ok(())
    }
}

/// Plain text battalion summary, one line per battalion plus the unassigned and total lines.
pub fn render_summary(country: &str, week: &str, summary: &BattalionSummary) -> String {
    SummaryText { country, week, summary }.to_string()
}

/// Plain text roster of a battalion with its stats footer.
pub fn render_battalion(week: &str, roster: &BattalionRoster<'_>) -> String {
    RosterText { week, roster }.to_string()
}

/// Personnel listing: every player with rank, battalion and medals.
pub fn render_players(players: &[PlayerListing<'_>]) -> String {
    PlayersText(players).to_string()
}
