//! citymap - geocode cities and plot them on a clustered web map
//!
//! Reads the place list, resolves every place through the location cache and
//! the ArcGIS geocoder, and writes a Leaflet map with one marker per place.

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use citymap::app;
use citymap::cli::{Cli, RunConfig};
use citymap::data::ArcGisClient;
use citymap::resolver::Interrupt;

/// Sets up stderr logging; RUST_LOG wins over the configured level
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = RunConfig::from_cli(&cli)?;

    init_logging(&config.log_level);

    let geocoder = ArcGisClient::new(config.timeout)?.with_base_url(config.geocoder_url.clone());
    info!(url = geocoder.base_url(), timeout = ?config.timeout, "Using geocoder");

    let interrupt = Interrupt::new();
    interrupt.listen_for_ctrl_c();

    let summary = app::run(&config, &geocoder, &interrupt).await?;

    if let Some(reason) = &summary.report.stopped {
        println!("{}.", reason);
    }
    println!("{}", summary.report);
    println!(
        "Wrote {} markers to {}",
        summary.markers,
        config.output_path.display()
    );

    Ok(())
}
