//! Roster CLI - query the backend and check route guard decisions.
//!
//! # Usage
//!
//! ```bash
//! # List every profile
//! roster users
//!
//! # Show one profile
//! roster user 64f0c2a1
//!
//! # List gallery albums
//! roster albums
//!
//! # Backend server info
//! roster server-info
//!
//! # Ask the backend whether an address may sign up
//! roster check-email ada@example.com
//!
//! # Would the guard let this request through?
//! roster guard /people/3 --authenticated
//! ```
//!
//! The backend is read from `ROSTER_API_URL` (default
//! `http://localhost:8000`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "roster")]
#[command(author, version, about = "Roster CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every user profile
    Users,
    /// Show one user profile
    User {
        /// Profile ID
        id: String,
    },
    /// List gallery albums
    Albums,
    /// Show backend server info
    ServerInfo,
    /// Check whether an email address is authorized
    CheckEmail {
        /// Address to check
        email: String,
    },
    /// Evaluate the route guard for a path
    Guard {
        /// Request path, optionally with a query string
        path: String,

        /// Treat the caller as signed in
        #[arg(long)]
        authenticated: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roster_cli=info,roster_web=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Users => commands::backend::users().await,
        Commands::User { id } => commands::backend::user(&id).await,
        Commands::Albums => commands::backend::albums().await,
        Commands::ServerInfo => commands::backend::server_info().await,
        Commands::CheckEmail { email } => commands::backend::check_email(&email).await,
        Commands::Guard {
            path,
            authenticated,
        } => commands::guard::evaluate(&path, authenticated),
    }
}
