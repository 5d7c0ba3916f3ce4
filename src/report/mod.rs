pub mod html;
pub mod text;

use std::{
    fs,
    path::{Path, PathBuf}
};

use clap::ValueEnum;
use thiserror::Error;
use tracing::info;

use crate::model::{
    structures::{battalion::Battalion, country::CountryData},
    summary::{battalion_roster, battalion_summary}
};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("No soldiers assigned to battalion {0}")]
    EmptyBattalion(Battalion),

    #[error("{0} is not a battalion")]
    NotABattalion(Battalion),

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to render report: {0}")]
    Template(#[from] askama::Error)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Html,
    Text
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Text => "txt"
        }
    }
}

pub fn summary_file_name(country: &str, week: &str, format: ReportFormat) -> String {
    format!("{}_{}_summary_report.{}", country, week, format.extension())
}

pub fn battalion_file_name(country: &str, week: &str, battalion: Battalion, format: ReportFormat) -> String {
    format!(
        "{}_{}_{}_report.{}",
        country,
        week,
        battalion.as_ref().to_lowercase(),
        format.extension()
    )
}

fn write_report(dir: &Path, file_name: String, contents: String) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(dir)?;

    let path = dir.join(file_name);
    fs::write(&path, contents)?;
    info!("Report written to {}", path.display());

    Ok(path)
}

/// Writes the battalion summary of `data` into `dir` and returns the file path.
pub fn write_summary_report(data: &CountryData, dir: &Path, format: ReportFormat) -> Result<PathBuf, ReportError> {
    let summary = battalion_summary(data);
    let title = &data.country_info.name;

    let contents = match format {
        ReportFormat::Text => text::render_summary(title, &data.current_week, &summary),
        ReportFormat::Html => html::render_summary(title, &data.current_week, &summary)?
    };

    write_report(
        dir,
        summary_file_name(&data.country_info.id, &data.current_week, format),
        contents
    )
}

/// Writes the full roster of one battalion into `dir` and returns the file path.
pub fn write_battalion_report(
    data: &CountryData,
    battalion: Battalion,
    dir: &Path,
    format: ReportFormat
) -> Result<PathBuf, ReportError> {
    if !battalion.is_assigned() {
        return Err(ReportError::NotABattalion(battalion));
    }

    let roster = battalion_roster(data, battalion, None);
    if roster.is_empty() {
        return Err(ReportError::EmptyBattalion(battalion));
    }

    let contents = match format {
        ReportFormat::Text => text::render_battalion(&data.current_week, &roster),
        ReportFormat::Html => html::render_battalion(&data.current_week, &roster)?
    };

    write_report(
        dir,
        battalion_file_name(&data.country_info.id, &data.current_week, battalion, format),
        contents
    )
}
