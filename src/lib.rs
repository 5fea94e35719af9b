pub mod app;
pub mod app_state;
pub mod completion;
pub mod config;
pub mod critique;
pub mod extractor;
pub mod fetcher;
pub mod health;
pub mod prompt;
pub mod text;
