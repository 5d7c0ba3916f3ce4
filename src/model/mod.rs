pub mod assignments;
pub mod constants;
pub mod format;
pub mod medals;
pub mod ranking;
pub mod structures;
pub mod summary;
pub mod week;
