mod api_tests;
mod export_tests;
