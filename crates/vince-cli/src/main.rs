mod output;
mod telemetry;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "vince-cli",
    version,
    about = "Check a Vince service and validate API keys against it",
    after_help = "Environment: VINCE_CLIENT_ID, VINCE_CLIENT_SECRET, VINCE_BASE_URL (all required)."
)]
struct Cli {
    /// API key to validate. Without it only the connection check runs.
    api_key: Option<String>,

    /// Print the validation result as JSON instead of a summary.
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON lines on stderr.
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    telemetry::init(cli.log_json);

    let human = !cli.json;
    if human {
        println!("{}", output::BANNER);
        println!("{}", "=".repeat(40));
        println!("Testing connection...");
    }

    if !vince_client::test_connection().await {
        if human {
            println!("✗ Service is not reachable");
        } else {
            error!("service is not reachable");
        }
        return Ok(ExitCode::FAILURE);
    }
    if human {
        println!("✓ Service is reachable");
    }

    let Some(api_key) = cli.api_key else {
        if human {
            print!("{}", output::USAGE);
        }
        return Ok(ExitCode::SUCCESS);
    };

    info!(key = %output::mask_key(&api_key), "validating key");
    let result = vince_client::validate_key(&api_key).await;

    if human {
        println!("\nValidating key: {}", output::mask_key(&api_key));
        print!("{}", output::summary(&result));
    } else {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    Ok(ExitCode::SUCCESS)
}
