use clap::{Parser, Subcommand, ValueEnum};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "watcher-cli")]
#[command(about = "Management CLI for the pool watcher", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:9191")]
    url: String,

    #[arg(short, long, env = "WATCHER_ADMIN_KEY")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version, uptime and maintenance flag
    Status,
    /// Dump the current window, pool and alert state
    State,
    /// Turn maintenance mode on or off
    Maintenance {
        #[arg(value_enum)]
        mode: Toggle,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
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

    let res = match cli.command {
        Commands::Status => {
            client.get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::State => {
            client.get(format!("{}/admin/state", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Maintenance { mode } => {
            let enabled = matches!(mode, Toggle::On);
            client.put(format!("{}/admin/maintenance", cli.url))
                .headers(headers)
                .json(&json!({ "enabled": enabled }))
                .send()
                .await?
        }
    };
    print_response(res).await?;

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
