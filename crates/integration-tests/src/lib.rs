//! End-to-end tests for Bookshelf.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bookshelf-integration-tests
//! ```
//!
//! Every test builds a fresh [`TestApp`]: both engines wired to the real
//! Argon2 hasher, HMAC token issuer and generators, with in-memory stores,
//! catalog and payment processor. Reset emails are captured instead of sent
//! so tests can log in with the generated password.
//!
//! # Test Categories
//!
//! - `auth_flow` - registration, login and password reset
//! - `order_flow` - ordering, payment webhooks and downloads
//! - `concurrency` - engines shared across tasks

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use bookshelf_core::{BookId, Email, Money};
use bookshelf_engine::adapters::{
    Argon2Hasher, Claims, HmacTokenIssuer, MemoryCatalog, MemoryCredentialStore, MemoryOrderStore,
    MemoryPaymentProcessor, RandomPasswordGenerator, UuidGenerator,
};
use bookshelf_engine::models::Book;
use bookshelf_engine::services::auth::{AuthCollaborators, RegisterRequest};
use bookshelf_engine::testing::{Call, CallLog, FakeNotificationSender};
use bookshelf_engine::{AuthError, Authenticator, Context, Incomplete, OrderWorkflow};

/// Signing secret shared by every test app.
pub const TOKEN_SECRET: &str = "Zq8#vN2!rL5@tY9$wB4%eH7^kD1&mC6*";

/// Password used by [`TestApp::register`].
pub const PASSWORD: &str = "difference-engine";

/// Both engines over in-memory collaborators.
pub struct TestApp {
    pub authenticator: Authenticator,
    pub workflow: OrderWorkflow,
    pub users: Arc<MemoryCredentialStore>,
    pub orders: Arc<MemoryOrderStore>,
    pub catalog: Arc<MemoryCatalog>,
    pub payments: Arc<MemoryPaymentProcessor>,
    pub tokens: Arc<HmacTokenIssuer>,
    /// Captured reset notifications.
    pub outbox: CallLog,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Wire a fresh app.
    #[must_use]
    pub fn new() -> Self {
        let users = Arc::new(MemoryCredentialStore::new());
        let orders = Arc::new(MemoryOrderStore::new());
        let catalog = Arc::new(MemoryCatalog::with_chunk_size(8));
        let payments = Arc::new(MemoryPaymentProcessor::new());
        let tokens = Arc::new(HmacTokenIssuer::new(
            SecretString::from(TOKEN_SECRET),
            Duration::from_secs(3600),
        ));
        let outbox = CallLog::new();

        let authenticator = Authenticator::new(AuthCollaborators {
            users: users.clone(),
            hasher: Arc::new(Argon2Hasher::new()),
            tokens: tokens.clone(),
            passwords: Arc::new(RandomPasswordGenerator::new(12)),
            ids: Arc::new(UuidGenerator),
            notifier: Arc::new(FakeNotificationSender::new(outbox.clone())),
        });
        let workflow = OrderWorkflow::new(orders.clone(), catalog.clone(), payments.clone());

        Self {
            authenticator,
            workflow,
            users,
            orders,
            catalog,
            payments,
            tokens,
            outbox,
        }
    }

    /// Registration form for `email` with [`PASSWORD`].
    ///
    /// # Panics
    ///
    /// Panics if `email` is not a valid address.
    #[must_use]
    pub fn registration(email: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: Email::parse(email).unwrap_or_else(|e| panic!("bad test email {email}: {e}")),
            password: PASSWORD.to_string(),
            password_confirmation: PASSWORD.to_string(),
        }
    }

    /// Register a customer and decode their token.
    ///
    /// # Errors
    ///
    /// Returns the registration error.
    ///
    /// # Panics
    ///
    /// Panics if the issued token does not verify.
    pub async fn register(&self, email: &str) -> Result<Claims, Incomplete<AuthError>> {
        let credentials = self
            .authenticator
            .register(&Context::new(), Self::registration(email))
            .await?;
        Ok(self
            .tokens
            .verify(&credentials.token)
            .unwrap_or_else(|e| panic!("issued token failed verification: {e}")))
    }

    /// Add a book to the catalog.
    pub async fn add_book(&self, id: &str, price: i64, content: &str) -> Book {
        let book = Book {
            id: BookId::new(id),
            title: format!("Book {id}"),
            price: Money::from_minor(price),
        };
        self.catalog.add_book(book.clone(), content).await;
        book
    }

    /// Plaintext passwords delivered by reset notifications, oldest first.
    #[must_use]
    pub fn reset_passwords(&self) -> Vec<String> {
        self.outbox
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SendPasswordReset { password, .. } => Some(password),
                _ => None,
            })
            .collect()
    }
}
