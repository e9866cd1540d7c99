//! End-to-end tests for ordering, payment webhooks and downloads.
//!
//! Run with: cargo test -p bookshelf-integration-tests

#![allow(clippy::unwrap_used)]

use futures::TryStreamExt;

use bookshelf_core::{BookId, Money, OrderId, OrderStatus, Role, UserId};
use bookshelf_engine::models::{Order, OrderQuery};
use bookshelf_engine::providers::OrderStore;
use bookshelf_engine::webhook::{PaymentEvent, SignatureVerifier, WebhookError};
use bookshelf_engine::{Actor, Classify, Context, Effect, ErrorKind, OrderError};
use bookshelf_integration_tests::TestApp;

const CONTENT: &str = "The Analytical Engine weaves algebraic patterns.";

fn customer(id: &str) -> Actor {
    Actor::new(UserId::new(id), Role::Customer)
}

async fn place(app: &TestApp, order_id: &str, user: &str, book: &str) -> Order {
    app.workflow
        .create_order(
            &Context::new(),
            Order::new(OrderId::new(order_id), UserId::new(user), BookId::new(book)),
        )
        .await
        .unwrap()
}

async fn pay(app: &TestApp, order_id: &str) -> Option<Order> {
    let body = app
        .payments
        .succeeded_event(&OrderId::new(order_id))
        .await
        .unwrap();
    let event = PaymentEvent::from_slice(&body).unwrap();
    app.workflow
        .handle_payment_event(&Context::new(), &event)
        .await
        .unwrap()
}

async fn download(app: &TestApp, order_id: &str) -> Result<Vec<u8>, OrderError> {
    let chunks: Vec<Vec<u8>> = app
        .workflow
        .download_order(&Context::new(), &OrderId::new(order_id))
        .await?
        .try_collect()
        .await
        .map_err(OrderError::from)?;
    Ok(chunks.concat())
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_order_takes_book_price_and_opens_intent() {
    let app = TestApp::new();
    app.add_book("b1", 1999, CONTENT).await;

    let order = place(&app, "o1", "u1", "b1").await;

    assert_eq!(order.total, Money::from_minor(1999));
    assert_eq!(order.status, OrderStatus::Pending);

    let intent = app.payments.intent_for(&OrderId::new("o1")).await.unwrap();
    assert_eq!(order.payment_intent_id.as_deref(), Some(intent.id.as_str()));
    assert_eq!(order.client_secret.as_deref(), Some(intent.client_secret.as_str()));

    let stored = app.orders.find_by_id(&Context::new(), &OrderId::new("o1")).await.unwrap();
    assert_eq!(stored, order);
}

#[tokio::test]
async fn test_create_order_for_unknown_book_opens_nothing() {
    let app = TestApp::new();

    let err = app
        .workflow
        .create_order(
            &Context::new(),
            Order::new(OrderId::new("o1"), UserId::new("u1"), BookId::new("missing")),
        )
        .await
        .unwrap_err();

    assert!(err.is_clean());
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(app.payments.intent_count().await, 0);
}

#[tokio::test]
async fn test_duplicate_order_id_reports_open_intent() {
    let app = TestApp::new();
    app.add_book("b1", 1999, CONTENT).await;
    place(&app, "o1", "u1", "b1").await;

    let err = app
        .workflow
        .create_order(
            &Context::new(),
            Order::new(OrderId::new("o1"), UserId::new("u1"), BookId::new("b1")),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
    assert!(matches!(
        err.effects.as_slice(),
        [Effect::PaymentIntentOpened { order_id, .. }] if order_id.as_str() == "o1"
    ));
}

// ============================================================================
// Pay and download
// ============================================================================

#[tokio::test]
async fn test_download_refused_until_webhook_completes_order() {
    let app = TestApp::new();
    app.add_book("b1", 1999, CONTENT).await;
    place(&app, "o1", "u1", "b1").await;

    let refused = download(&app, "o1").await.unwrap_err();
    assert!(matches!(refused, OrderError::NotPaid(_)));
    assert_eq!(refused.kind(), ErrorKind::OrderNotPaid);

    let completed = pay(&app, "o1").await.unwrap();
    assert_eq!(completed.status, OrderStatus::Paid);

    let bytes = download(&app, "o1").await.unwrap();
    assert_eq!(bytes, CONTENT.as_bytes());
}

#[tokio::test]
async fn test_repeated_webhook_leaves_order_paid() {
    let app = TestApp::new();
    app.add_book("b1", 1999, CONTENT).await;
    place(&app, "o1", "u1", "b1").await;

    pay(&app, "o1").await.unwrap();
    let again = pay(&app, "o1").await.unwrap();

    assert_eq!(again.status, OrderStatus::Paid);
    assert_eq!(again.total, Money::from_minor(1999));
}

#[tokio::test]
async fn test_other_events_are_ignored() {
    let app = TestApp::new();
    app.add_book("b1", 1999, CONTENT).await;
    place(&app, "o1", "u1", "b1").await;

    let body = br#"{"type":"payment_intent.created","data":{"object":{"metadata":{"orderID":"o1"}}}}"#;
    let event = PaymentEvent::from_slice(body).unwrap();
    let outcome = app
        .workflow
        .handle_payment_event(&Context::new(), &event)
        .await
        .unwrap();

    assert!(outcome.is_none());
    let order = app.workflow.find_order_by_id(&Context::new(), &OrderId::new("o1")).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_success_event_without_order_id_is_rejected() {
    let app = TestApp::new();

    let body = br#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_1"}}}"#;
    let event = PaymentEvent::from_slice(body).unwrap();
    let err = app
        .workflow
        .handle_payment_event(&Context::new(), &event)
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::Webhook(WebhookError::MissingOrderId)));
    assert_eq!(err.kind(), ErrorKind::ValidationFailure);
}

#[tokio::test]
async fn test_signed_webhook_body_verifies_before_completion() {
    let app = TestApp::new();
    app.add_book("b1", 1999, CONTENT).await;
    place(&app, "o1", "u1", "b1").await;

    let verifier = SignatureVerifier::new("whsec_integration");
    let body = app.payments.succeeded_event(&OrderId::new("o1")).await.unwrap();
    let header = verifier.sign(&body, 1_700_000_000).unwrap();

    verifier.verify(&body, &header, 1_700_000_010).unwrap();
    assert!(matches!(
        verifier.verify(b"{}", &header, 1_700_000_010),
        Err(WebhookError::InvalidSignature)
    ));

    let event = PaymentEvent::from_slice(&body).unwrap();
    let completed = app
        .workflow
        .handle_payment_event(&Context::new(), &event)
        .await
        .unwrap()
        .unwrap();
    assert!(completed.is_paid());
}

#[tokio::test]
async fn test_complete_unknown_order_is_not_found() {
    let app = TestApp::new();

    let err = app
        .workflow
        .complete_order(&Context::new(), &OrderId::new("missing"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_customer_query_is_scoped_to_own_orders() {
    let app = TestApp::new();
    app.add_book("b1", 1999, CONTENT).await;
    place(&app, "o1", "u1", "b1").await;
    place(&app, "o2", "u2", "b1").await;
    place(&app, "o3", "u1", "b1").await;

    let query = OrderQuery {
        user_id: Some(UserId::new("u2")),
        ..OrderQuery::default()
    }
    .scoped_for(&customer("u1"));
    let page = app.workflow.find_orders(&Context::new(), &query).await.unwrap();

    assert_eq!(page.total_orders, 2);
    assert!(page.orders.iter().all(|o| o.user_id == UserId::new("u1")));

    let admin = Actor::new(UserId::new("root"), Role::Admin);
    let everything = app
        .workflow
        .find_orders(&Context::new(), &OrderQuery::default().scoped_for(&admin))
        .await
        .unwrap();
    assert_eq!(everything.total_orders, 3);
}

#[tokio::test]
async fn test_pagination_window_and_status_filter() {
    let app = TestApp::new();
    app.add_book("b1", 1999, CONTENT).await;
    for id in ["o1", "o2", "o3", "o4", "o5"] {
        place(&app, id, "u1", "b1").await;
    }
    pay(&app, "o2").await.unwrap();
    pay(&app, "o4").await.unwrap();

    let page = app
        .workflow
        .find_orders(
            &Context::new(),
            &OrderQuery {
                limit: 2,
                offset: 1,
                ..OrderQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(page.orders.len(), 2);
    assert_eq!(page.total_orders, 5);
    assert_eq!((page.limit, page.offset), (2, 1));

    let paid = app
        .workflow
        .find_orders(
            &Context::new(),
            &OrderQuery {
                status: Some(OrderStatus::Paid),
                ..OrderQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(paid.total_orders, 2);
    let mut ids: Vec<&str> = paid.orders.iter().map(|o| o.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, ["o2", "o4"]);
}

#[tokio::test]
async fn test_update_order_replaces_stored_copy() {
    let app = TestApp::new();
    app.add_book("b1", 1999, CONTENT).await;
    let mut order = place(&app, "o1", "u1", "b1").await;

    order.client_secret = None;
    app.workflow.update_order(&Context::new(), &order).await.unwrap();

    let stored = app.workflow.find_order_by_id(&Context::new(), &OrderId::new("o1")).await.unwrap();
    assert_eq!(stored.client_secret, None);
    assert!(stored.payment_intent_id.is_some());
}
