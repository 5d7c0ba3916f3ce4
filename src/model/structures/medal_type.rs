use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MedalType {
    Gold,
    Silver,
    Bronze
}

impl MedalType {
    pub fn icon(&self) -> &'static str {
        match self {
            MedalType::Gold => "🥇",
            MedalType::Silver => "🥈",
            MedalType::Bronze => "🥉"
        }
    }
}
