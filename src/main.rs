use anyhow::Result;
use reward_console::{config::Config, console};

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    tracing::info!("Loaded configuration: {:?}", config);
    console::launch(config)?;

    Ok(())
}
