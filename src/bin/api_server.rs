//! REST API Server for the fulfillment dashboard
//!
//! Usage:
//!   ./target/release/api_server [--port PORT] [--max-upload-mb MB]
//!
//! REST endpoints:
//!   GET  /api/v1/health      - Health check
//!   POST /api/v1/upload      - Upload the orders CSV (request body)
//!   GET  /api/v1/options     - Filter options of the current upload
//!   GET  /api/v1/dashboard   - KPIs and chart tables
//!        ?regions=a,b&warehouses=..&categories=..&dates=YYYY-MM-DD,YYYY-MM-DD

use anyhow::Result;
use clap::Parser;
use fulfillment_dashboard::api::{create_router, DashboardService};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "api_server")]
#[command(about = "Serve the fulfillment dashboard over HTTP")]
struct Args {
    /// Port to listen on
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Largest accepted upload, in megabytes
    #[arg(long, default_value = "64")]
    max_upload_mb: usize,
}

fn print_banner(port: u16) {
    println!("============================================================");
    println!("         FULFILLMENT DASHBOARD API SERVER");
    println!("============================================================");
    println!();
    println!("  Port:     {}", port);
    println!("  REST:     http://localhost:{}/api/v1/", port);
    println!();
    println!("REST Endpoints:");
    println!("  GET  /api/v1/health         Health check");
    println!("  POST /api/v1/upload         Upload orders CSV");
    println!("  GET  /api/v1/options        Filter options");
    println!("  GET  /api/v1/dashboard      KPIs + charts");
    println!();
    println!("============================================================");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    let args = Args::parse();
    print_banner(args.port);

    let service = Arc::new(DashboardService::new());
    let app = create_router(service, args.max_upload_mb * 1024 * 1024);

    let addr: SocketAddr = format!("0.0.0.0:{}", args.port).parse()?;
    tracing::info!("Starting REST server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
