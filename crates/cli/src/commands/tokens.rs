//! Token commands.
//!
//! # Environment Variables
//!
//! - `BOOKSHELF_TOKEN_SECRET` - Signing secret
//! - `BOOKSHELF_TOKEN_TTL_SECS` - Token lifetime (default: 86400)

use thiserror::Error;

use bookshelf_core::{Email, EmailError, Role, UserId};
use bookshelf_engine::adapters::HmacTokenIssuer;
use bookshelf_engine::config::{BookshelfConfig, ConfigError};
use bookshelf_engine::models::User;
use bookshelf_engine::providers::{TokenError, TokenIssuer};

/// Errors that can occur during token commands.
#[derive(Debug, Error)]
pub enum TokenCommandError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Invalid user ID.
    #[error("Invalid user ID: {0}")]
    InvalidUserId(String),

    /// Signing or verification failed.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Claims could not be printed.
    #[error("Failed to encode claims: {0}")]
    Encode(#[from] serde_json::Error),
}

fn issuer() -> Result<HmacTokenIssuer, TokenCommandError> {
    let config = BookshelfConfig::from_env()?;
    Ok(HmacTokenIssuer::from_config(&config.token))
}

/// Issue a token for the given identity and print it.
pub fn issue(user_id: &str, email: &str, admin: bool) -> Result<(), TokenCommandError> {
    let id = UserId::parse(user_id).map_err(|_| TokenCommandError::InvalidUserId(user_id.to_owned()))?;
    let user = User {
        id,
        first_name: String::new(),
        last_name: String::new(),
        email: Email::parse(email)?,
        password: String::new(),
        role: if admin { Role::Admin } else { Role::Customer },
    };

    let token = issuer()?.issue_for(&user)?;
    tracing::info!(user_id = %user.id, role = %user.role, "Token issued");

    #[allow(clippy::print_stdout)]
    {
        println!("{token}");
    }
    Ok(())
}

/// Verify a token and print its claims as JSON.
pub fn verify(token: &str) -> Result<(), TokenCommandError> {
    let claims = issuer()?.verify(token)?;
    let json = serde_json::to_string_pretty(&claims)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{json}");
    }
    Ok(())
}
