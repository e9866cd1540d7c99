//! Password hashing, token signing and generators.

use std::time::Duration;

use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use bookshelf_core::UserId;

use crate::config::TokenConfig;
use crate::models::User;
use crate::providers::{HashError, IdGenerator, PasswordGenerator, PasswordHasher, TokenError, TokenIssuer};

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// Argon2
// =============================================================================

/// Argon2id password hasher producing PHC strings.
///
/// Hashing is CPU-bound, so both operations run on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    /// Create a hasher with the default Argon2id parameters.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PasswordHasher for Argon2Hasher {
    async fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        let plaintext = plaintext.to_owned();
        tokio::task::spawn_blocking(move || hash_password(&plaintext))
            .await
            .map_err(|e| HashError::Internal(e.to_string()))?
    }

    async fn compare(&self, hash: &str, plaintext: &str) -> Result<(), HashError> {
        let hash = hash.to_owned();
        let plaintext = plaintext.to_owned();
        tokio::task::spawn_blocking(move || verify_password(&plaintext, &hash))
            .await
            .map_err(|e| HashError::Internal(e.to_string()))?
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| HashError::Internal(e.to_string()))
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), HashError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| HashError::Internal(e.to_string()))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|e| match e {
            password_hash::Error::Password => HashError::Mismatch,
            other => HashError::Internal(other.to_string()),
        })
}

// =============================================================================
// Tokens
// =============================================================================

/// Claims carried by an issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: UserId,
    /// User email at issuance.
    pub email: String,
    /// Whether the user is an administrator.
    pub admin: bool,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expires at (unix seconds).
    pub exp: i64,
}

#[derive(Serialize, Deserialize)]
struct Header<'a> {
    alg: &'a str,
    typ: &'a str,
}

const HEADER: Header<'static> = Header {
    alg: "HS256",
    typ: "JWT",
};

/// HS256 JWT issuer and verifier.
pub struct HmacTokenIssuer {
    secret: SecretString,
    ttl: Duration,
}

impl std::fmt::Debug for HmacTokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacTokenIssuer")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl HmacTokenIssuer {
    /// Create an issuer signing with `secret`; tokens live for `ttl`.
    #[must_use]
    pub const fn new(secret: SecretString, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    /// Create an issuer from loaded configuration.
    #[must_use]
    pub fn from_config(config: &TokenConfig) -> Self {
        Self::new(config.secret.clone(), Duration::from_secs(config.ttl_secs))
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Issue a token for `user` as of `now` (unix seconds).
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if the claims cannot be encoded or
    /// signed.
    pub fn issue_at(&self, user: &User, now: i64) -> Result<String, TokenError> {
        let ttl = i64::try_from(self.ttl.as_secs()).map_err(|e| TokenError::Signing(e.to_string()))?;
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.to_string(),
            admin: user.is_admin(),
            iat: now,
            exp: now.saturating_add(ttl),
        };

        let header = serde_json::to_vec(&HEADER).map_err(|e| TokenError::Signing(e.to_string()))?;
        let payload = serde_json::to_vec(&claims).map_err(|e| TokenError::Signing(e.to_string()))?;
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        );

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature}"))
    }

    /// Verify a token's signature and expiry as of now.
    ///
    /// # Errors
    ///
    /// See [`verify_at`](Self::verify_at).
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, chrono::Utc::now().timestamp())
    }

    /// Verify a token's signature and expiry as of `now` (unix seconds).
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Malformed` if the token is not a three-part
    /// HS256 JWT, `TokenError::InvalidSignature` if the signature does not
    /// match and `TokenError::Expired` if `exp` is not after `now`.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let header_bytes = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|_| TokenError::Malformed)?;
        let decoded: Header<'_> =
            serde_json::from_slice(&header_bytes).map_err(|_| TokenError::Malformed)?;
        if decoded.alg != HEADER.alg {
            return Err(TokenError::Malformed);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac()?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;
        if claims.exp <= now {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

impl TokenIssuer for HmacTokenIssuer {
    fn issue_for(&self, user: &User) -> Result<String, TokenError> {
        self.issue_at(user, chrono::Utc::now().timestamp())
    }
}

// =============================================================================
// Generators
// =============================================================================

/// Generates alphanumeric reset passwords.
#[derive(Debug, Clone, Copy)]
pub struct RandomPasswordGenerator {
    length: usize,
}

impl RandomPasswordGenerator {
    /// Create a generator producing passwords of `length` characters.
    #[must_use]
    pub const fn new(length: usize) -> Self {
        Self { length }
    }
}

impl PasswordGenerator for RandomPasswordGenerator {
    fn generate(&self) -> String {
        rand::rng()
            .sample_iter(rand::distr::Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}

/// Generates UUID v4 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bookshelf_core::{Email, Role};

    use super::*;

    const SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%";
    const NOW: i64 = 1_700_000_000;

    fn user(role: Role) -> User {
        User {
            id: UserId::new("u1"),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: Email::parse("ada@example.com").unwrap(),
            password: String::new(),
            role,
        }
    }

    fn issuer() -> HmacTokenIssuer {
        HmacTokenIssuer::new(SecretString::from(SECRET), Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn test_hash_and_compare() {
        let hasher = Argon2Hasher::new();
        let hash = hasher.hash("correct horse").await.unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(hasher.compare(&hash, "correct horse").await.is_ok());
        assert!(matches!(
            hasher.compare(&hash, "battery staple").await,
            Err(HashError::Mismatch)
        ));
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let hasher = Argon2Hasher::new();
        let first = hasher.hash("pw").await.unwrap();
        let second = hasher.hash("pw").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_compare_rejects_garbage_hash() {
        assert!(matches!(
            Argon2Hasher::new().compare("not-a-phc-string", "pw").await,
            Err(HashError::Internal(_))
        ));
    }

    #[test]
    fn test_token_roundtrip() {
        let token = issuer().issue_at(&user(Role::Admin), NOW).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let claims = issuer().verify_at(&token, NOW + 10).unwrap();
        assert_eq!(claims.sub, UserId::new("u1"));
        assert_eq!(claims.email, "ada@example.com");
        assert!(claims.admin);
        assert_eq!(claims.iat, NOW);
        assert_eq!(claims.exp, NOW + 3600);
    }

    #[test]
    fn test_token_expired() {
        let token = issuer().issue_at(&user(Role::Customer), NOW).unwrap();
        assert!(matches!(
            issuer().verify_at(&token, NOW + 3600),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_token_wrong_secret() {
        let token = issuer().issue_at(&user(Role::Customer), NOW).unwrap();
        let other = HmacTokenIssuer::new(
            SecretString::from("zC6%uW4^rT0*pQ7&nL5#mK2@xY9!aB3$"),
            Duration::from_secs(3600),
        );
        assert!(matches!(
            other.verify_at(&token, NOW),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_token_tampered_claims() {
        let token = issuer().issue_at(&user(Role::Customer), NOW).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let forged_claims = URL_SAFE_NO_PAD.encode(
            br#"{"sub":"u1","email":"ada@example.com","admin":true,"iat":1700000000,"exp":1700003600}"#,
        );
        let forged = format!("{}.{}.{}", parts[0], forged_claims, parts[2]);
        assert!(matches!(
            issuer().verify_at(&forged, NOW),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_token_malformed() {
        for token in ["", "abc", "a.b", "a.b.c.d", "!!.??.**"] {
            assert!(
                matches!(issuer().verify_at(token, NOW), Err(TokenError::Malformed)),
                "token {token:?}"
            );
        }
    }

    #[test]
    fn test_random_password_length_and_charset() {
        let password = RandomPasswordGenerator::new(16).generate();
        assert_eq!(password.len(), 16);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(password, RandomPasswordGenerator::new(16).generate());
    }

    #[test]
    fn test_uuid_ids_are_unique() {
        let first = UuidGenerator.new_id();
        assert!(Uuid::parse_str(&first).is_ok());
        assert_ne!(first, UuidGenerator.new_id());
    }
}
