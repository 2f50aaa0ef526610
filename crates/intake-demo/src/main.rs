//! Reservation Intake Demo
//!
//! Mounts one intake session backed by in-memory adapters, submits a record,
//! and prints the resulting state.
//!
//! # Usage
//!
//! ```bash
//! intake-demo --record booking.json
//! intake-demo --config intake.json --fields fields.json --record booking.json
//! RUST_LOG=debug intake-demo --record booking.json
//! ```

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod host;

#[derive(Parser)]
#[command(name = "intake-demo")]
#[command(version)]
#[command(about = "Run one reservation intake session", long_about = None)]
struct Cli {
    /// Session configuration (JSON)
    #[arg(long, env = "INTAKE_CONFIG")]
    config: Option<PathBuf>,

    /// Field definitions to seed the field store with (JSON array).
    /// Without it the store is empty and the defaults apply.
    #[arg(long)]
    fields: Option<PathBuf>,

    /// Record to submit (JSON object)
    #[arg(long)]
    record: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Reservation Intake demo v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let config = host::load_config(cli.config.as_deref());
    let fields = cli.fields.as_deref().map(host::read_fields).transpose()?;
    let record = host::read_record(&cli.record)?;

    let report = host::run(config, fields, record).await?;
    println!("{}", serde_json::to_string_pretty(&report.state)?);
    if let Some(confirmation) = &report.confirmation {
        println!("{}", confirmation.status_line());
        println!("QR payload: {}", confirmation.qr_payload());
    }

    Ok(())
}
