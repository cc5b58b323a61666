//! Location Services Gateway
//!
//! ```text
//!     Browser ──POST JSON──▶ ┌──────────────────────────────────────────────┐
//!                            │  http (CORS, method dispatch, body limit)     │
//!                            │      │                                        │
//!                            │      ▼                                        │
//!                            │  gateway (validate → build query → call       │
//!                            │           provider → normalize envelope)      │ ──▶ Provider
//!                            │                                               │
//!                            │  config · observability · lifecycle           │
//!                            └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "location-gateway")]
#[command(about = "HTTP gateway for geocoding and place lookups", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults plus environment overrides when omitted.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = location_gateway::lifecycle::startup::run(args.config).await {
        eprintln!("location-gateway: {e}");
        std::process::exit(1);
    }
}
