use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "alertmux-cli")]
#[command(about = "Management CLI for the alertmux service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:9094")]
    url: String,

    #[arg(short, long, default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service status
    Status,
    /// Show a tenant's effective configuration
    Get {
        tenant: String,
        /// Mask receiver secrets in the output
        #[arg(long)]
        redact: bool,
    },
    /// Save an extra configuration from a JSON file
    Save {
        tenant: String,
        /// Path to the extra configuration JSON document
        file: std::path::PathBuf,
    },
    /// Delete an extra configuration by identifier
    Delete { tenant: String, identifier: String },
    /// Route a label set against a tenant's running instance
    Test {
        tenant: String,
        /// Labels as key=value pairs
        labels: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    match cli.command {
        Commands::Status => {
            let res = client
                .get(format!("{}/api/v1/status", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Get { tenant, redact } => {
            let res = client
                .get(format!(
                    "{}/api/v1/tenants/{}/configuration?redact={}",
                    cli.url, tenant, redact
                ))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Save { tenant, file } => {
            let body: Value = serde_json::from_str(&std::fs::read_to_string(&file)?)?;
            let res = client
                .post(format!(
                    "{}/api/v1/tenants/{}/extra-configuration",
                    cli.url, tenant
                ))
                .headers(headers)
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Delete { tenant, identifier } => {
            let res = client
                .delete(format!(
                    "{}/api/v1/tenants/{}/extra-configuration/{}",
                    cli.url, tenant, identifier
                ))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Test { tenant, labels } => {
            let mut label_map = serde_json::Map::new();
            for pair in labels {
                let Some((name, value)) = pair.split_once('=') else {
                    eprintln!("Ignoring malformed label (expected key=value): {pair}");
                    continue;
                };
                label_map.insert(name.to_string(), Value::String(value.to_string()));
            }
            let res = client
                .post(format!("{}/api/v1/tenants/{}/route-test", cli.url, tenant))
                .headers(headers)
                .json(&Value::Object(label_map))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let text = res.text().await?;
    if text.is_empty() {
        println!("OK");
        return Ok(());
    }
    let json: Value = serde_json::from_str(&text)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
