use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

#[derive(
    Serialize,
    Deserialize,
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    EnumString,
    Display,
    AsRefStr
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Battalion {
    Condor,
    Yaguarete,
    Carpincho,
    #[default]
    Unassigned
}

impl Battalion {
    /// The real battalions in reporting priority order.
    pub const RANKED: [Battalion; 3] = [Battalion::Condor, Battalion::Yaguarete, Battalion::Carpincho];

    pub fn is_assigned(&self) -> bool {
        !matches!(self, Battalion::Unassigned)
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Battalion::Condor => "🦅",
            Battalion::Yaguarete => "🐆",
            Battalion::Carpincho => "🦫",
            Battalion::Unassigned => "❓"
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Battalion::Condor => "CONDOR SQUADRON",
            Battalion::Yaguarete => "YAGUARETE DIVISION",
            Battalion::Carpincho => "CARPINCHO REGIMENT",
            Battalion::Unassigned => "UNASSIGNED SOLDIERS"
        }
    }

    /// Reads a stored battalion value. Anything unrecognised counts as unassigned.
    pub fn from_stored(value: &str) -> Battalion {
        Battalion::from_str(value.trim()).unwrap_or(Battalion::Unassigned)
    }
}
