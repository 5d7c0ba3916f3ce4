pub mod progress_utils;
pub mod serde_utils;
pub mod test_utils;
