//! CLI interface for the campus portal

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "campus-portal")]
#[command(author = "Krakaw")]
#[command(version)]
#[command(about = "University portal API with token-based authentication", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default campus.toml in the current directory
    Init,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides server.host)
        #[arg(long, env = "CAMPUS_HOST")]
        host: Option<String>,

        /// Port to listen on (overrides server.port)
        #[arg(short, long, env = "CAMPUS_PORT")]
        port: Option<u16>,

        /// Configuration file to use instead of searching for campus.toml
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Hash a password for an `[[auth.admins]]` entry
    HashPassword {
        /// Plaintext password
        password: String,

        /// bcrypt cost (defaults to auth.bcrypt_cost, or 10 without a config)
        #[arg(long)]
        cost: Option<u32>,
    },

    /// Check a bearer token against the configured secret
    VerifyToken {
        /// The token to check
        token: String,

        /// Configuration file to use instead of searching for campus.toml
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
