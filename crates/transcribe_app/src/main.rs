mod platform;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let config = platform::config::AppConfig::parse();
    platform::run_app(config)
}
