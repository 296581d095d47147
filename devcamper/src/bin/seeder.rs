use std::path::PathBuf;

use clap::Parser;
use devcamper::config::StoreBackend;
use devcamper::seed::{self, SeedData};
use devcamper::{AppConfig, Store};
use devcamper_core::{init_tracing, DevConfig};

/// Load or remove the sample data set in the configured store.
#[derive(Parser, Debug)]
#[command(name = "seeder", version)]
struct Cli {
    /// Import every file in the data directory.
    #[arg(short, long, conflicts_with = "destroy", required_unless_present = "destroy")]
    import: bool,

    /// Delete every bootcamp, course, review and user.
    #[arg(short, long)]
    destroy: bool,

    /// Directory holding users.json, bootcamps.json, courses.json and reviews.json.
    #[arg(long, default_value = "_data")]
    data: PathBuf,

    /// Configuration profile.
    #[arg(long, default_value = "dev")]
    profile: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    let config = DevConfig::load(&cli.profile)?.with_typed::<AppConfig>()?;
    if config.store_backend == StoreBackend::Memory {
        tracing::warn!("store.backend is memory; seeded data is dropped when the seeder exits");
    }
    let store = Store::connect(config.typed()).await?;

    if cli.import {
        let data = SeedData::load(&cli.data).await?;
        let summary = seed::import(&store, data).await?;
        println!("Data imported: {summary:?}");
    } else {
        let summary = seed::destroy(&store).await?;
        println!("Data destroyed: {summary:?}");
    }
    Ok(())
}
