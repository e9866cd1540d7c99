//! Bookshelf configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BOOKSHELF_TOKEN_SECRET` - Token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `BOOKSHELF_TOKEN_TTL_SECS` - Token lifetime in seconds (default: 86400)
//! - `BOOKSHELF_RESET_PASSWORD_LENGTH` - Length of generated reset passwords (default: 12, min: 8)
//! - `BOOKSHELF_WEBHOOK_SECRET` - Payment webhook signing secret
//!
//! ## Optional group: SMTP
//! When `BOOKSHELF_SMTP_HOST` is set, the rest of the group is required.
//! - `BOOKSHELF_SMTP_HOST` - SMTP relay host
//! - `BOOKSHELF_SMTP_PORT` - SMTP port (default: 587)
//! - `BOOKSHELF_SMTP_USERNAME` - SMTP username
//! - `BOOKSHELF_SMTP_PASSWORD` - SMTP password
//! - `BOOKSHELF_EMAIL_FROM` - Sender address for password reset emails

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const MIN_RESET_PASSWORD_LENGTH: usize = 8;
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default token lifetime: one day.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 86_400;

/// Default length of generated reset passwords.
pub const DEFAULT_RESET_PASSWORD_LENGTH: usize = 12;

/// Fragments that mark a secret as copied from a template (case-insensitive).
const PLACEHOLDERS: &[&str] = &[
    "changeme",
    "placeholder",
    "example",
    "secret",
    "password",
    "your-",
    "replace",
    "todo",
    "xxx",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(String),
    #[error("Invalid environment variable {key}: {reason}")]
    Invalid { key: String, reason: String },
    #[error("Insecure secret in {key}: {reason}")]
    InsecureSecret { key: String, reason: String },
}

/// Bookshelf configuration.
#[derive(Debug, Clone)]
pub struct BookshelfConfig {
    /// Token signing configuration
    pub token: TokenConfig,
    /// Length of generated reset passwords
    pub reset_password_length: usize,
    /// Payment webhook signing secret
    pub webhook_secret: Option<SecretString>,
    /// SMTP configuration; reset emails are only logged without it
    pub email: Option<EmailConfig>,
}

/// Token signing configuration.
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC signing secret
    pub secret: SecretString,
    /// Token lifetime in seconds
    pub ttl_secs: u64,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

/// SMTP settings for password reset emails.
#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: SecretString,
    /// `From:` header of reset emails
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl BookshelfConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(lookup);

        let token = TokenConfig {
            secret: vars.secret("BOOKSHELF_TOKEN_SECRET", MIN_TOKEN_SECRET_LENGTH)?,
            ttl_secs: vars.parsed_or("BOOKSHELF_TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS)?,
        };
        if token.ttl_secs == 0 {
            return Err(Vars::invalid("BOOKSHELF_TOKEN_TTL_SECS", "must be positive"));
        }

        let reset_password_length =
            vars.parsed_or("BOOKSHELF_RESET_PASSWORD_LENGTH", DEFAULT_RESET_PASSWORD_LENGTH)?;
        if reset_password_length < MIN_RESET_PASSWORD_LENGTH {
            return Err(Vars::invalid(
                "BOOKSHELF_RESET_PASSWORD_LENGTH",
                format!("must be at least {MIN_RESET_PASSWORD_LENGTH}"),
            ));
        }

        let webhook_secret = vars.webhook_secret()?;

        let email = match vars.get("BOOKSHELF_SMTP_HOST") {
            Some(smtp_host) => Some(EmailConfig {
                smtp_host,
                smtp_port: vars.parsed_or("BOOKSHELF_SMTP_PORT", DEFAULT_SMTP_PORT)?,
                smtp_username: vars.required("BOOKSHELF_SMTP_USERNAME")?,
                smtp_password: SecretString::from(vars.required("BOOKSHELF_SMTP_PASSWORD")?),
                from_address: vars.required("BOOKSHELF_EMAIL_FROM")?,
            }),
            None => None,
        };

        Ok(Self {
            token,
            reset_password_length,
            webhook_secret,
            email,
        })
    }
}

/// Webhook signing secret alone, for tools that only verify payment events.
///
/// Unlike [`BookshelfConfig::from_env`], this does not require a token
/// secret.
///
/// # Errors
///
/// Returns `ConfigError::InsecureSecret` if the secret is set but weak.
pub fn webhook_secret_from_env() -> Result<Option<SecretString>, ConfigError> {
    let _ = dotenvy::dotenv();
    webhook_secret_from_lookup(&|key| std::env::var(key).ok())
}

/// [`webhook_secret_from_env`] over an arbitrary variable source.
///
/// # Errors
///
/// Same as [`webhook_secret_from_env`].
pub fn webhook_secret_from_lookup(
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<Option<SecretString>, ConfigError> {
    Vars(lookup).webhook_secret()
}

/// Variable source, `std::env::var` in production.
struct Vars<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Vars<'_> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn webhook_secret(&self) -> Result<Option<SecretString>, ConfigError> {
        if self.is_set("BOOKSHELF_WEBHOOK_SECRET") {
            self.secret("BOOKSHELF_WEBHOOK_SECRET", 0).map(Some)
        } else {
            Ok(None)
        }
    }

    fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::Invalid {
            key: key.to_owned(),
            reason: reason.into(),
        }
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::Missing(key.to_owned()))
    }

    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| Self::invalid(key, e.to_string())),
            None => Ok(default),
        }
    }

    /// Required secret of at least `min_len` bytes that passes
    /// [`check_secret_strength`].
    fn secret(&self, key: &str, min_len: usize) -> Result<SecretString, ConfigError> {
        let value = SecretString::from(self.required(key)?);
        let exposed = value.expose_secret();
        if exposed.len() < min_len {
            return Err(ConfigError::InsecureSecret {
                key: key.to_owned(),
                reason: format!("must be at least {min_len} characters (got {})", exposed.len()),
            });
        }
        check_secret_strength(exposed).map_err(|reason| ConfigError::InsecureSecret {
            key: key.to_owned(),
            reason,
        })?;
        Ok(value)
    }
}

/// Reject template placeholders and low-entropy strings.
fn check_secret_strength(secret: &str) -> Result<(), String> {
    let lower = secret.to_lowercase();
    if let Some(fragment) = PLACEHOLDERS.iter().find(|p| lower.contains(*p)) {
        return Err(format!("looks like a placeholder (contains '{fragment}')"));
    }

    let bits = entropy_bits_per_byte(secret.as_bytes());
    if bits < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(format!(
            "entropy too low ({bits:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}); generate it randomly"
        ));
    }
    Ok(())
}

/// Shannon entropy of a byte string in bits per byte.
#[allow(clippy::cast_precision_loss)] // secrets are far shorter than 2^52 bytes
fn entropy_bits_per_byte(bytes: &[u8]) -> f64 {
    let mut counts = [0usize; 256];
    for &b in bytes {
        if let Some(count) = counts.get_mut(usize::from(b)) {
            *count += 1;
        }
    }

    let len = bytes.len() as f64;
    counts
        .iter()
        .filter(|&&n| n > 0)
        .map(|&n| {
            let p = n as f64 / len;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const STRONG: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%";

    fn load(pairs: &[(&str, &str)]) -> Result<BookshelfConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        BookshelfConfig::from_lookup(&|key| vars.get(key).cloned())
    }

    #[test]
    fn test_entropy() {
        assert!(entropy_bits_per_byte(b"").abs() < f64::EPSILON);
        assert!(entropy_bits_per_byte(b"aaaaaaa").abs() < f64::EPSILON);
        assert!((entropy_bits_per_byte(b"ab") - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_secret_strength() {
        assert!(check_secret_strength("your-signing-key-here").is_err());
        assert!(check_secret_strength(&"a".repeat(40)).is_err());
        assert!(check_secret_strength(STRONG).is_ok());
    }

    #[test]
    fn test_placeholder_token_secret_rejected() {
        assert!(matches!(
            load(&[("BOOKSHELF_TOKEN_SECRET", "changeme-changeme-changeme-changeme")]),
            Err(ConfigError::InsecureSecret { key, .. }) if key == "BOOKSHELF_TOKEN_SECRET"
        ));
    }

    #[test]
    fn test_webhook_secret_without_token_secret() {
        let vars: HashMap<&str, &str> = HashMap::from([("BOOKSHELF_WEBHOOK_SECRET", "whk_Q4m!Zr8#Lp2$")]);
        let secret = webhook_secret_from_lookup(&|key| vars.get(key).map(|v| (*v).to_string()))
            .unwrap()
            .unwrap();
        assert_eq!(secret.expose_secret(), "whk_Q4m!Zr8#Lp2$");

        assert!(webhook_secret_from_lookup(&|_| None).unwrap().is_none());
        assert!(matches!(
            webhook_secret_from_lookup(&|_| Some("xxxxxxxx".to_string())),
            Err(ConfigError::InsecureSecret { .. })
        ));
    }

    #[test]
    fn test_webhook_secret_is_validated_when_set() {
        assert!(matches!(
            load(&[
                ("BOOKSHELF_TOKEN_SECRET", STRONG),
                ("BOOKSHELF_WEBHOOK_SECRET", "xxxxxxxx"),
            ]),
            Err(ConfigError::InsecureSecret { key, .. }) if key == "BOOKSHELF_WEBHOOK_SECRET"
        ));

        let config = load(&[
            ("BOOKSHELF_TOKEN_SECRET", STRONG),
            ("BOOKSHELF_WEBHOOK_SECRET", "whk_Q4m!Zr8#Lp2$"),
        ])
        .unwrap();
        assert!(config.webhook_secret.is_some());
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = load(&[("BOOKSHELF_TOKEN_SECRET", STRONG)]).unwrap();
        assert_eq!(config.token.ttl_secs, DEFAULT_TOKEN_TTL_SECS);
        assert_eq!(config.reset_password_length, DEFAULT_RESET_PASSWORD_LENGTH);
        assert!(config.webhook_secret.is_none());
        assert!(config.email.is_none());
    }

    #[test]
    fn test_missing_token_secret() {
        assert!(matches!(
            load(&[]),
            Err(ConfigError::Missing(key)) if key == "BOOKSHELF_TOKEN_SECRET"
        ));
    }

    #[test]
    fn test_short_token_secret() {
        assert!(matches!(
            load(&[("BOOKSHELF_TOKEN_SECRET", "aB3$xY9!mK2@nL5#")]),
            Err(ConfigError::InsecureSecret { .. })
        ));
    }

    #[test]
    fn test_invalid_ttl() {
        assert!(matches!(
            load(&[
                ("BOOKSHELF_TOKEN_SECRET", STRONG),
                ("BOOKSHELF_TOKEN_TTL_SECS", "soon"),
            ]),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            load(&[
                ("BOOKSHELF_TOKEN_SECRET", STRONG),
                ("BOOKSHELF_TOKEN_TTL_SECS", "0"),
            ]),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_reset_password_length_minimum() {
        assert!(matches!(
            load(&[
                ("BOOKSHELF_TOKEN_SECRET", STRONG),
                ("BOOKSHELF_RESET_PASSWORD_LENGTH", "4"),
            ]),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_smtp_group_requires_all_fields() {
        let result = load(&[
            ("BOOKSHELF_TOKEN_SECRET", STRONG),
            ("BOOKSHELF_SMTP_HOST", "smtp.mailhost.test"),
        ]);
        assert!(matches!(
            result,
            Err(ConfigError::Missing(key)) if key == "BOOKSHELF_SMTP_USERNAME"
        ));
    }

    #[test]
    fn test_smtp_group() {
        let config = load(&[
            ("BOOKSHELF_TOKEN_SECRET", STRONG),
            ("BOOKSHELF_SMTP_HOST", "smtp.mailhost.test"),
            ("BOOKSHELF_SMTP_USERNAME", "bookshelf"),
            ("BOOKSHELF_SMTP_PASSWORD", "hunter22"),
            ("BOOKSHELF_EMAIL_FROM", "Bookshelf <noreply@bookshelf.test>"),
        ])
        .unwrap();
        let email = config.email.unwrap();
        assert_eq!(email.smtp_port, 587);
        assert_eq!(email.smtp_password.expose_secret(), "hunter22");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = load(&[
            ("BOOKSHELF_TOKEN_SECRET", STRONG),
            ("BOOKSHELF_SMTP_HOST", "smtp.mailhost.test"),
            ("BOOKSHELF_SMTP_USERNAME", "bookshelf"),
            ("BOOKSHELF_SMTP_PASSWORD", "hunter22"),
            ("BOOKSHELF_EMAIL_FROM", "noreply@bookshelf.test"),
        ])
        .unwrap();

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("smtp.mailhost.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains(STRONG));
        assert!(!debug_output.contains("hunter22"));
    }
}
