use std::collections::BTreeMap;

use strum::IntoEnumIterator;

use crate::model::structures::medal_type::MedalType;

/// Number of medals of each type, gold first. Types never awarded are omitted.
pub fn medal_counts(medals: &BTreeMap<String, MedalType>) -> Vec<(MedalType, usize)> {
    MedalType::iter()
        .map(|kind| (kind, medals.values().filter(|m| **m == kind).count()))
        .filter(|(_, count)| *count > 0)
        .collect()
}

/// Compact medal summary such as `🥇x2 🥉`.
pub fn medal_display(medals: Option<&BTreeMap<String, MedalType>>) -> String {
    let Some(medals) = medals else {
        return String::new();
    };

    medal_counts(medals)
        .into_iter()
        .map(|(kind, count)| {
            if count > 1 {
                format!("{}x{}", kind.icon(), count)
            } else {
                kind.icon().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
