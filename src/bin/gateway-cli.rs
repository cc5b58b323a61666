use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Command-line client for the Location Services Gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest places for partial input
    Autocomplete {
        input: String,
        #[arg(long)]
        types: Option<String>,
        #[arg(long)]
        country: Option<String>,
    },
    /// Look up one place by ID
    Details {
        place_id: String,
        /// Fields to request; repeat or comma-separate
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },
    /// Resolve an address to coordinates
    Geocode {
        address: String,
        #[arg(long)]
        components: Option<String>,
    },
    /// Resolve coordinates to addresses
    ReverseGeocode {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lng: f64,
    },
}

impl Commands {
    fn path(&self) -> &'static str {
        match self {
            Commands::Autocomplete { .. } => "autocomplete",
            Commands::Details { .. } => "details",
            Commands::Geocode { .. } => "geocode",
            Commands::ReverseGeocode { .. } => "reverse-geocode",
        }
    }

    fn body(&self) -> Value {
        match self {
            Commands::Autocomplete { input, types, country } => {
                let mut body = json!({ "input": input });
                if let Some(types) = types {
                    body["types"] = json!(types);
                }
                if let Some(country) = country {
                    body["componentRestrictions"] = json!({ "country": country });
                }
                body
            }
            Commands::Details { place_id, fields } if fields.is_empty() => {
                json!({ "place_id": place_id })
            }
            Commands::Details { place_id, fields } => json!({ "place_id": place_id, "fields": fields }),
            Commands::Geocode { address, components } => match components {
                Some(components) => json!({ "address": address, "components": components }),
                None => json!({ "address": address }),
            },
            Commands::ReverseGeocode { lat, lng } => json!({ "lat": lat, "lng": lng }),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/{}", cli.url.trim_end_matches('/'), cli.command.path()))
        .json(&cli.command.body())
        .send()
        .await?;

    if !print_response(res).await? {
        std::process::exit(1);
    }
    Ok(())
}

/// Print the gateway's reply; returns whether it was a success.
async fn print_response(res: reqwest::Response) -> Result<bool, Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    let pretty = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|json| serde_json::to_string_pretty(&json).ok())
        .unwrap_or(text);

    if status.is_success() {
        println!("{}", pretty);
        Ok(true)
    } else {
        eprintln!("Error: gateway returned status {}", status);
        eprintln!("{}", pretty);
        Ok(false)
    }
}
