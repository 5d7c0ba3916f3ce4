pub mod api;
pub mod args;
pub mod commands;
pub mod database;
pub mod export;
pub mod model;
pub mod report;
pub mod utils;
