use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    api::{config::ApiConfig, ApiError, WarEraClient},
    args::{Args, Command, ReportKind},
    database::db::{DbClient, StoreError},
    export::{export_country, import_country, ExportError},
    model::{
        assignments::assignments_for,
        format::format_damage,
        ranking::filter_players,
        structures::{battalion::Battalion, country::CountryData, medal_type::MedalType},
        summary::{battalion_roster, battalion_summary},
        week::current_week
    },
    report::{text, write_battalion_report, write_summary_report, ReportError, ReportFormat}
};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("No API token configured; run `set-token` or pass --token")]
    Unauthorized,

    #[error("Token must not be empty")]
    EmptyToken,

    #[error("No cached data for {0}; run `refresh` first")]
    NoCachedData(String)
}

/// Opens the store named by `args` and runs the requested command against it.
pub async fn run(args: Args) -> Result<(), CommandError> {
    let store = DbClient::connect(&args.database_url).await?;
    let result = execute(&store, &args.country, args.token.as_deref(), args.command).await;
    store.close().await;

    result
}

pub async fn execute(
    store: &DbClient,
    country: &str,
    token: Option<&str>,
    command: Command
) -> Result<(), CommandError> {
    match command {
        Command::Countries => countries(store).await,
        Command::Refresh => refresh(store, country, token).await,
        Command::Show { battalion, limit } => show(store, country, battalion, limit as usize).await,
        Command::Players { filter } => players(store, country, filter.as_deref().unwrap_or_default()).await,
        Command::Summary => summary(store, country).await,
        Command::Assign { battalion, players } => assign(store, country, battalion, &players).await,
        Command::Medal {
            medal: kind,
            player,
            week
        } => medal(store, country, kind, &player, week).await,
        Command::Export { file } => Ok(export_country(store, country, &file).await?),
        Command::Import { file } => {
            let imported = import_country(store, &file).await?;
            println!(
                "Imported {}: {} players, {} assignments, {} medals",
                imported.country, imported.players, imported.assignments, imported.medals
            );
            Ok(())
        }
        Command::ClearCache => clear_cache(store, country).await,
        Command::SetToken { token } => set_token(store, &token).await,
        Command::Report {
            kind,
            format,
            output_dir
        } => report(store, country, kind, format, &output_dir).await,
        Command::Status => status(store, country).await,
        Command::Vacuum => Ok(store.vacuum().await?)
    }
}

async fn cached(store: &DbClient, country: &str) -> Result<CountryData, CommandError> {
    store
        .load_country_data(country)
        .await?
        .ok_or_else(|| CommandError::NoCachedData(country.to_string()))
}

/// Token given on the command line (or environment), else the stored one.
pub async fn resolve_token(store: &DbClient, token: Option<&str>) -> Result<Option<String>, CommandError> {
    match token.map(str::trim).filter(|t| !t.is_empty()) {
        Some(token) => Ok(Some(token.to_string())),
        None => Ok(store.get_token().await?)
    }
}

async fn countries(store: &DbClient) -> Result<(), CommandError> {
    let client = WarEraClient::new(ApiConfig::from_env())?;

    let mut rows: Vec<(String, i64, i64)> = match client.get_countries().await {
        Ok(countries) => {
            for country in &countries {
                store.save_country(country).await?;
            }
            countries
                .into_iter()
                .map(|c| (c.name, c.weekly_damage, c.active_population))
                .collect()
        }
        Err(e) => {
            let cached = store.get_countries().await?;
            if cached.is_empty() {
                return Err(e.into());
            }

            warn!("Could not fetch countries ({}), showing cached data", e);
            cached
                .into_iter()
                .map(|c| (c.name, c.weekly_damage, c.active_population))
                .collect()
        }
    };

    rows.sort_by(|a, b| b.1.cmp(&a.1));

    println!("{:<24} {:>16} {:>12}", "Country", "Weekly Damage", "Population");
    for (name, damage, population) in rows {
        println!("{:<24} {:>16} {:>12}", name, format_damage(damage), format_damage(population));
    }

    Ok(())
}

async fn refresh(store: &DbClient, country: &str, token: Option<&str>) -> Result<(), CommandError> {
    let token = resolve_token(store, token).await?.ok_or(CommandError::Unauthorized)?;
    let client = WarEraClient::new(ApiConfig::from_env().with_token(Some(token)))?;

    let snapshot = client.fetch_country_snapshot(country).await?;
    store.save_country_snapshot(country, &snapshot).await?;

    let data = cached(store, country).await?;
    info!("{} players cached for {}", data.users.len(), data.country_info.name);
    print!(
        "{}",
        text::render_summary(&data.country_info.name, &data.current_week, &battalion_summary(&data))
    );

    Ok(())
}

async fn show(store: &DbClient, country: &str, battalion: Battalion, limit: usize) -> Result<(), CommandError> {
    let data = cached(store, country).await?;
    let roster = battalion_roster(&data, battalion, Some(limit));

    if roster.is_empty() {
        println!("No soldiers in {}", battalion.display_name());
    } else {
        print!("{}", text::render_battalion(&data.current_week, &roster));
    }

    Ok(())
}

async fn players(store: &DbClient, country: &str, filter: &str) -> Result<(), CommandError> {
    let data = cached(store, country).await?;
    let listing = filter_players(&data, filter);

    if listing.is_empty() {
        println!("No players match '{}'", filter);
    } else {
        print!("{}", text::render_players(&listing));
        println!("{} of {} players", listing.len(), data.users.len());
    }

    Ok(())
}

async fn summary(store: &DbClient, country: &str) -> Result<(), CommandError> {
    let data = cached(store, country).await?;
    print!(
        "{}",
        text::render_summary(&data.country_info.name, &data.current_week, &battalion_summary(&data))
    );

    Ok(())
}

async fn assign(store: &DbClient, country: &str, battalion: Battalion, players: &[String]) -> Result<(), CommandError> {
    let assignments = assignments_for(players, battalion);
    let updated = store.save_assignments(country, &assignments).await?;

    if (updated as usize) < assignments.len() {
        warn!(
            "{} of {} players were not found in {}",
            assignments.len() - updated as usize,
            assignments.len(),
            country
        );
    }
    println!("{} players moved to {}", updated, battalion.display_name());

    Ok(())
}

async fn medal(
    store: &DbClient,
    country: &str,
    medal: MedalType,
    player: &str,
    week: Option<String>
) -> Result<(), CommandError> {
    let week = week.unwrap_or_else(current_week);
    store.assign_medal(country, player, medal, &week).await?;
    println!("{} {} medal awarded to {} for {}", medal.icon(), medal, player, week);

    Ok(())
}

async fn clear_cache(store: &DbClient, country: &str) -> Result<(), CommandError> {
    if store.clear_cache(country).await? {
        println!("Cleared cached data for {}", country);
    } else {
        println!("Nothing cached for {}", country);
    }

    Ok(())
}

async fn set_token(store: &DbClient, token: &str) -> Result<(), CommandError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(CommandError::EmptyToken);
    }

    store.save_token(token).await?;
    println!("API token saved");

    Ok(())
}

async fn report(
    store: &DbClient,
    country: &str,
    kind: ReportKind,
    format: ReportFormat,
    output_dir: &Path
) -> Result<(), CommandError> {
    let data = cached(store, country).await?;

    let path = match kind {
        ReportKind::Summary => write_summary_report(&data, output_dir, format)?,
        ReportKind::Battalion { battalion } => write_battalion_report(&data, battalion, output_dir, format)?
    };
    println!("Report exported to {}", path.display());

    Ok(())
}

async fn status(store: &DbClient, country: &str) -> Result<(), CommandError> {
    let info = store.get_database_info().await?;

    println!("Database:  {}", info.database_url);
    println!("Countries: {}", info.countries);
    println!("Players:   {}", info.players);
    println!("Medals:    {}", info.medals);

    let stats = store.get_battalion_stats(country).await?;
    if stats.is_empty() {
        return Ok(());
    }

    println!();
    println!("{:<12} {:>8} {:>16} {:>14}", "Battalion", "Soldiers", "Total Damage", "Avg Damage");
    for row in stats {
        println!(
            "{:<12} {:>8} {:>16} {:>14}",
            row.battalion.as_ref(),
            row.soldier_count,
            format_damage(row.total_damage),
            format_damage(row.average_damage.round() as i64)
        );
    }

    Ok(())
}
