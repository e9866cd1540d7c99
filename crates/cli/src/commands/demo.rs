//! End-to-end demo over in-memory adapters.
//!
//! Registers a customer, places an order, shows that the download is refused
//! until the payment webhook arrives, then downloads the book and resets the
//! customer's password. Nothing leaves the process: reset emails are only
//! logged.

use std::sync::Arc;
use std::time::Duration;

use futures::TryStreamExt;
use secrecy::SecretString;
use thiserror::Error;

use bookshelf_core::{BookId, Email, EmailError, Money, OrderId};
use bookshelf_engine::adapters::{
    Argon2Hasher, HmacTokenIssuer, LogNotificationSender, MemoryCatalog, MemoryCredentialStore,
    MemoryOrderStore, MemoryPaymentProcessor, RandomPasswordGenerator, UuidGenerator,
};
use bookshelf_engine::models::{Book, Order, OrderQuery};
use bookshelf_engine::providers::{CatalogError, IdGenerator, PasswordGenerator, PaymentError, TokenError};
use bookshelf_engine::services::auth::{
    AuthCollaborators, LoginRequest, PasswordResetRequest, RegisterRequest,
};
use bookshelf_engine::webhook::{PaymentEvent, WebhookError};
use bookshelf_engine::{Actor, AuthError, Authenticator, Context, Incomplete, OrderError, OrderWorkflow};

const DEMO_PASSWORD: &str = "analytical-engine";
const DEMO_CONTENT: &str = "Notes by the translator.\n\nThe Analytical Engine weaves algebraic patterns.\n";

/// Errors that can occur during the demo.
#[derive(Debug, Error)]
pub enum DemoError {
    #[error(transparent)]
    Email(#[from] EmailError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Webhook(#[from] WebhookError),
    #[error("unexpected demo outcome: {0}")]
    Unexpected(&'static str),
}

impl<E: Into<Self>> From<Incomplete<E>> for DemoError {
    fn from(incomplete: Incomplete<E>) -> Self {
        for effect in &incomplete.effects {
            tracing::warn!(%effect, "Left behind by failed step");
        }
        incomplete.into_error().into()
    }
}

/// Run the demo, printing a summary line per step.
pub async fn run(price: i64) -> Result<(), DemoError> {
    let users = Arc::new(MemoryCredentialStore::new());
    let orders = Arc::new(MemoryOrderStore::new());
    let catalog = Arc::new(MemoryCatalog::with_chunk_size(16));
    let payments = Arc::new(MemoryPaymentProcessor::new());

    // Throwaway signing key; demo tokens are never verified elsewhere.
    let secret = SecretString::from(RandomPasswordGenerator::new(48).generate());
    let tokens = Arc::new(HmacTokenIssuer::new(secret, Duration::from_secs(3600)));

    let authenticator = Authenticator::new(AuthCollaborators {
        users,
        hasher: Arc::new(Argon2Hasher::new()),
        tokens: tokens.clone(),
        passwords: Arc::new(RandomPasswordGenerator::new(12)),
        ids: Arc::new(UuidGenerator),
        notifier: Arc::new(LogNotificationSender),
    });
    let workflow = OrderWorkflow::new(orders, catalog.clone(), payments.clone());

    let book = Book {
        id: BookId::new("analytical-engine"),
        title: "Sketch of the Analytical Engine".to_string(),
        price: Money::from_minor(price),
    };
    catalog.add_book(book.clone(), DEMO_CONTENT).await;

    let email = Email::parse("ada@example.com")?;
    let request = RegisterRequest {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: email.clone(),
        password: DEMO_PASSWORD.to_string(),
        password_confirmation: DEMO_PASSWORD.to_string(),
    };
    request.validate().map_err(AuthError::from)?;

    let ctx = Context::new();
    let credentials = authenticator.register(&ctx, request).await?;
    let claims = tokens.verify(&credentials.token)?;
    report(format!("registered {email} as {}", claims.sub));

    authenticator
        .login(
            &ctx,
            LoginRequest {
                email: email.clone(),
                password: DEMO_PASSWORD.to_string(),
            },
        )
        .await?;
    report("logged in with the chosen password");

    let actor = Actor::new(claims.sub.clone(), bookshelf_core::Role::Customer);
    let ctx = Context::new()
        .with_actor(actor.clone())
        .with_timeout(Duration::from_secs(30));

    let order_id = OrderId::new(UuidGenerator.new_id());
    let order = workflow
        .create_order(&ctx, Order::new(order_id.clone(), claims.sub, book.id.clone()))
        .await?;
    report(format!(
        "ordered \"{}\" for {} (order {order_id})",
        book.title, order.total
    ));

    match workflow.download_order(&ctx, &order_id).await {
        Err(OrderError::NotPaid(_)) => report("download refused before payment"),
        Err(e) => return Err(e.into()),
        Ok(_) => return Err(DemoError::Unexpected("unpaid order was downloadable")),
    }

    let body = payments.succeeded_event(&order_id).await?;
    let event = PaymentEvent::from_slice(&body)?;
    let completed = workflow
        .handle_payment_event(&ctx, &event)
        .await?
        .ok_or(DemoError::Unexpected("success event completed nothing"))?;
    report(format!("payment webhook marked order {} {}", completed.id, completed.status));

    let chunks: Vec<Vec<u8>> = workflow
        .download_order(&ctx, &order_id)
        .await?
        .try_collect()
        .await?;
    let bytes: usize = chunks.iter().map(Vec::len).sum();
    report(format!("downloaded {bytes} bytes in {} chunks", chunks.len()));

    let mine = workflow
        .find_orders(&ctx, &OrderQuery::default().scoped_for(&actor))
        .await?;
    report(format!("customer sees {} order(s)", mine.total_orders));

    authenticator
        .reset_password(&ctx, PasswordResetRequest { email: email.clone() })
        .await?;
    match authenticator
        .login(
            &ctx,
            LoginRequest {
                email,
                password: DEMO_PASSWORD.to_string(),
            },
        )
        .await
    {
        Err(AuthError::WrongPassword) => report("old password rejected after reset"),
        Err(e) => return Err(e.into()),
        Ok(_) => return Err(DemoError::Unexpected("old password still accepted")),
    }

    Ok(())
}

fn report(line: impl std::fmt::Display) {
    #[allow(clippy::print_stdout)]
    {
        println!("- {line}");
    }
}
