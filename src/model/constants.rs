/// Number of users whose details are requested per batched call
pub const DETAIL_BATCH_SIZE: usize = 10;

/// Upper bound on the players kept for a single country
pub const MAX_TOTAL_SOLDIERS: usize = 150;

pub const DEFAULT_COUNTRY: &str = "argentina";

pub const DEFAULT_ROSTER_LIMIT: u16 = 10;
pub const MAX_ROSTER_LIMIT: u16 = 30;

/// Name under which the API token is persisted
pub const TOKEN_NAME: &str = "default";
