mod app;
pub mod commands;
pub mod config;
pub mod logging;
pub mod render;

pub use app::run_app;
