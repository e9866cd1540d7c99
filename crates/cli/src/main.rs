//! Bookshelf CLI - operator tools for the bookstore engines.
//!
//! # Usage
//!
//! ```bash
//! # Hash a password the way registration does
//! bookshelf hash-password 'correct horse battery staple'
//!
//! # Issue and inspect bearer tokens (needs BOOKSHELF_TOKEN_SECRET)
//! bookshelf issue-token --user-id u1 --email ada@example.com --admin
//! bookshelf verify-token eyJhbGciOi...
//!
//! # Check a saved payment webhook body
//! bookshelf webhook event.json --signature 't=1700000000,v1=...'
//!
//! # Run register -> order -> pay -> download against in-memory adapters
//! bookshelf demo
//! ```
//!
//! # Commands
//!
//! - `hash-password` - Print an Argon2id PHC hash
//! - `issue-token` - Print a signed token for a user
//! - `verify-token` - Verify a token and print its claims
//! - `webhook` - Parse a payment event and print the order it completes
//! - `demo` - Exercise both engines end to end

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use bookshelf_engine::telemetry::{self, LogFormat};

mod commands;

#[derive(Parser)]
#[command(name = "bookshelf")]
#[command(author, version, about = "Bookshelf CLI tools")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash a password with Argon2id
    HashPassword {
        /// Plaintext password
        password: String,
    },
    /// Issue a signed token
    IssueToken {
        /// User ID to put in the `sub` claim
        #[arg(short, long)]
        user_id: String,

        /// User email
        #[arg(short, long)]
        email: String,

        /// Issue an administrator token
        #[arg(long)]
        admin: bool,
    },
    /// Verify a token and print its claims
    VerifyToken {
        /// Token to verify
        token: String,
    },
    /// Parse a payment webhook body
    Webhook {
        /// File holding the raw event body
        file: PathBuf,

        /// Signature header to verify against `BOOKSHELF_WEBHOOK_SECRET`
        #[arg(short, long)]
        signature: Option<String>,
    },
    /// Run the full purchase flow over in-memory adapters
    Demo {
        /// Price of the demo book in minor units
        #[arg(long, default_value_t = 1999)]
        price: i64,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    if let Err(e) = telemetry::init(format) {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("Failed to initialize logging: {e}");
        }
    }

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::HashPassword { password } => {
            commands::password::hash(&password).await?;
        }
        Commands::IssueToken {
            user_id,
            email,
            admin,
        } => commands::tokens::issue(&user_id, &email, admin)?,
        Commands::VerifyToken { token } => commands::tokens::verify(&token)?,
        Commands::Webhook { file, signature } => {
            commands::webhook::inspect(&file, signature.as_deref())?;
        }
        Commands::Demo { price } => commands::demo::run(price).await?,
    }
    Ok(())
}
