//! Webhook inspection command.
//!
//! # Environment Variables
//!
//! - `BOOKSHELF_WEBHOOK_SECRET` - Required when `--signature` is given

use std::path::Path;

use secrecy::ExposeSecret;
use thiserror::Error;

use bookshelf_engine::config::{self, ConfigError};
use bookshelf_engine::webhook::{PaymentEvent, SignatureVerifier, WebhookError};

/// Errors that can occur while inspecting a webhook.
#[derive(Debug, Error)]
pub enum WebhookCommandError {
    /// The body file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A signature was given but no secret is configured.
    #[error("Missing environment variable: BOOKSHELF_WEBHOOK_SECRET")]
    MissingSecret,

    /// Parsing or verification failed.
    #[error(transparent)]
    Webhook(#[from] WebhookError),
}

/// Parse (and optionally verify) a webhook body and report the order it
/// would complete.
pub fn inspect(file: &Path, signature: Option<&str>) -> Result<(), WebhookCommandError> {
    let body = std::fs::read(file).map_err(|source| WebhookCommandError::Read {
        path: file.display().to_string(),
        source,
    })?;

    if let Some(header) = signature {
        let secret = config::webhook_secret_from_env()?.ok_or(WebhookCommandError::MissingSecret)?;
        SignatureVerifier::new(secret.expose_secret().as_bytes()).verify(
            &body,
            header,
            chrono::Utc::now().timestamp(),
        )?;
        tracing::info!("Signature verified");
    }

    let event = PaymentEvent::from_slice(&body)?;
    let outcome = match event.completed_order_id()? {
        Some(order_id) => format!("completes order {order_id}"),
        None => format!("ignored ({})", event.event_type),
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{outcome}");
    }
    Ok(())
}
