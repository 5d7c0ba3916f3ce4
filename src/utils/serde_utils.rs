use serde::{Deserialize, Deserializer};

/// Counters arrive either as integers or as floats (the game reports damage
/// with decimals), so both are accepted and floats are rounded.
#[derive(Deserialize)]
#[serde(untagged)]
enum Number {
    Integer(i64),
    Float(f64)
}

impl Number {
    fn rounded(self) -> i64 {
        match self {
            Number::Integer(value) => value,
            Number::Float(value) => value.round() as i64
        }
    }
}

/// Integer or float, rounded to `i64`. `null` reads as 0.
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>
{
    Ok(Option::<Number>::deserialize(deserializer)?
        .map(Number::rounded)
        .unwrap_or_default())
}

pub fn lenient_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>
{
    Ok(Option::<Number>::deserialize(deserializer)?.map(Number::rounded))
}
