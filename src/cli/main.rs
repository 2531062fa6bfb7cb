use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use lead_tracker::analytics::{
    AggregationEngine, BucketZone, ExportFormat, MetricsExporter, TimelineBucketer,
    DEFAULT_DATE_FORMAT,
};
use lead_tracker::models::{LeadRecord, LeadStatus};
use reqwest::{Client, RequestBuilder};
use serde_json::json;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lead-tracker-cli")]
#[command(about = "Lead Tracker CLI", version, long_about = None)]
struct Cli {
    #[arg(short, long, env = "LEAD_TRACKER_ENDPOINT", default_value = "http://localhost:10000")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server health
    Health,

    /// Check the admin password
    Login {
        #[arg(short, long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// List leads, newest first
    List,

    /// Submit a lead as the contact form would
    Create {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, default_value = "")]
        message: String,
    },

    /// Set a lead's status and notes
    Update {
        #[arg(value_name = "LEAD_ID")]
        id: u64,

        /// New, Contacted or Converted
        #[arg(short, long)]
        status: LeadStatus,

        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// Delete a lead
    Delete {
        #[arg(value_name = "LEAD_ID")]
        id: u64,
    },

    /// Fetch dashboard metrics from the server
    Metrics,

    /// Aggregate a JSON snapshot of lead records offline
    Aggregate {
        /// File holding a JSON array of lead records
        #[arg(short, long)]
        file: PathBuf,

        /// local, utc or an IANA zone name
        #[arg(short = 'z', long, default_value = "local")]
        time_zone: BucketZone,

        #[arg(long, default_value = DEFAULT_DATE_FORMAT)]
        date_format: String,

        /// json or csv
        #[arg(short = 'F', long, default_value = "json")]
        format: ExportFormat,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Health => {
            send(client.get(format!("{}/health", cli.endpoint))).await?;
        }

        Commands::Login { password } => {
            send(
                client
                    .post(format!("{}/api/login", cli.endpoint))
                    .json(&json!({ "password": password })),
            )
            .await?;
        }

        Commands::List => {
            send(client.get(format!("{}/api/leads", cli.endpoint))).await?;
        }

        Commands::Create {
            name,
            email,
            message,
        } => {
            send(
                client
                    .post(format!("{}/api/leads", cli.endpoint))
                    .json(&json!({
                        "name": name,
                        "email": email,
                        "message": message,
                    })),
            )
            .await?;
        }

        Commands::Update { id, status, notes } => {
            send(
                client
                    .put(format!("{}/api/leads/{}", cli.endpoint, id))
                    .json(&json!({
                        "status": status,
                        "notes": notes,
                    })),
            )
            .await?;
        }

        Commands::Delete { id } => {
            send(client.delete(format!("{}/api/leads/{}", cli.endpoint, id))).await?;
        }

        Commands::Metrics => {
            send(client.get(format!("{}/api/leads/metrics", cli.endpoint))).await?;
        }

        Commands::Aggregate {
            file,
            time_zone,
            date_format,
            format,
        } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read snapshot {}", file.display()))?;
            let records: Vec<LeadRecord> = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse snapshot {}", file.display()))?;

            let engine = AggregationEngine::new(TimelineBucketer::new(time_zone, date_format)?);
            let metrics = engine.aggregate(&records)?;
            let output = MetricsExporter::export(&metrics, format)?;

            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&output)?;
            writeln!(stdout)?;
            eprintln!("{}", metrics.summary());
        }
    }

    Ok(())
}

/// Print the JSON body of a request, failing on non-success statuses
async fn send(request: RequestBuilder) -> Result<()> {
    let response = request.send().await.context("Failed to reach server")?;
    let status = response.status();
    let body: serde_json::Value = response
        .json()
        .await
        .context("Server returned a non-JSON body")?;

    println!("{}", serde_json::to_string_pretty(&body)?);

    if !status.is_success() {
        bail!("Request failed with status {}", status);
    }
    Ok(())
}
