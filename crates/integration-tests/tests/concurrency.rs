//! Engines shared across tasks.
//!
//! Run with: cargo test -p bookshelf-integration-tests

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use bookshelf_core::{BookId, OrderId, UserId};
use bookshelf_engine::models::{Order, OrderQuery};
use bookshelf_engine::providers::StoreError;
use bookshelf_engine::webhook::PaymentEvent;
use bookshelf_engine::{AuthError, Context};
use bookshelf_integration_tests::TestApp;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_orders_are_all_stored() {
    let app = Arc::new(TestApp::new());
    app.add_book("b1", 500, "content").await;

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let app = Arc::clone(&app);
            tokio::spawn(async move {
                app.workflow
                    .create_order(
                        &Context::new(),
                        Order::new(
                            OrderId::new(format!("o{i}")),
                            UserId::new(format!("u{}", i % 4)),
                            BookId::new("b1"),
                        ),
                    )
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let page = app
        .workflow
        .find_orders(&Context::new(), &OrderQuery::default())
        .await
        .unwrap();
    assert_eq!(page.total_orders, 16);
    assert_eq!(app.payments.intent_count().await, 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_webhook_deliveries_leave_order_paid() {
    let app = Arc::new(TestApp::new());
    app.add_book("b1", 500, "content").await;
    app.workflow
        .create_order(
            &Context::new(),
            Order::new(OrderId::new("o1"), UserId::new("u1"), BookId::new("b1")),
        )
        .await
        .unwrap();
    let body = app.payments.succeeded_event(&OrderId::new("o1")).await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let app = Arc::clone(&app);
            let event = PaymentEvent::from_slice(&body).unwrap();
            tokio::spawn(async move {
                app.workflow
                    .handle_payment_event(&Context::new(), &event)
                    .await
            })
        })
        .collect();
    for handle in handles {
        let order = handle.await.unwrap().unwrap().unwrap();
        assert!(order.is_paid());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_registrations_admit_one_account() {
    let app = Arc::new(TestApp::new());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let app = Arc::clone(&app);
            tokio::spawn(async move { app.register("ada@example.com").await })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(err) => assert!(matches!(err.error, AuthError::Store(StoreError::Conflict(_)))),
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(app.users.len().await, 1);
}
