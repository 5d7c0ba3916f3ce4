pub mod battalion;
pub mod country;
pub mod medal_type;
pub mod player;
