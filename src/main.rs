use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use campus_portal::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus_portal=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => cli::commands::init().await,
        Commands::Serve { host, port, config } => cli::commands::serve(host, port, config).await,
        Commands::HashPassword { password, cost } => {
            cli::commands::hash_password(password, cost).await
        }
        Commands::VerifyToken { token, config } => {
            cli::commands::verify_token(&token, config).await
        }
    }
}
