//! Monster game client binary.
//!
//! Composition root: reads configuration from the environment (and `.env`),
//! loads the content directory and plays a scripted tour headless.
//!
//! # Examples
//!
//! ```bash
//! MONSTER_SEED=7 cargo run -p monster-client
//! MONSTER_TOUR="walk 2 5; walk 2 8" RUST_LOG=debug cargo run -p monster-client
//! ```

use anyhow::Result;
use monster_client::{Client, Tour};
use monster_runtime::RuntimeConfig;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = RuntimeConfig::from_env();
    let tour = match std::env::var("MONSTER_TOUR") {
        Ok(script) => Tour::parse(&script)?,
        Err(_) => Tour::parse(Tour::DEFAULT)?,
    };

    tracing::info!("Starting monster client");
    tracing::info!("Content: {}", config.content_dir.display());
    tracing::info!("Seed: {:?}", config.seed);

    let mut client = Client::new(config)?;
    client.run(&tour)
}
