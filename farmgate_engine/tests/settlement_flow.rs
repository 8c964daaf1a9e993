//! Payment settlement tests against a real SQLite store.
mod support;

use farmgate_engine::{
    db_types::{CartItem, OrderStatusType, PaymentMethod, PaymentStatusType},
    traits::{SettlementDecision, SettlementError},
};
use fg_common::Money;
use support::{api_with, prepare_test_env, stock_of};

#[tokio::test]
async fn a_successful_settlement_completes_payment_and_advances_the_order() {
    let env = prepare_test_env().await;
    let api = api_with(&env.db, SettlementDecision::Approved);

    let cart = vec![CartItem { product_id: env.tomatoes, quantity: 3 }];
    let order = api.place_order(&env.buyer, cart).await.expect("Order should be placed");
    assert_eq!(stock_of(&env.db, env.tomatoes).await, 2);

    let outcome = api.process_payment(&env.buyer, order.id, PaymentMethod::Card).await.expect("Settlement recorded");
    assert!(outcome.success);
    assert_eq!(outcome.payment.status, PaymentStatusType::Completed);
    assert_eq!(outcome.payment.amount, Money::from_cents(600));
    assert!(outcome.payment.paid_at.is_some());
    assert!(outcome.payment.transaction_id.starts_with("txn-"));

    let fetched = api.order_for_user(&env.buyer, order.id).await.expect("Order should exist");
    assert_eq!(fetched.status, OrderStatusType::Processing);
    // Draw-down happened at placement; settlement must not decrement again
    assert_eq!(stock_of(&env.db, env.tomatoes).await, 2);
}

#[tokio::test]
async fn a_completed_payment_cannot_be_settled_again() {
    let env = prepare_test_env().await;
    let api = api_with(&env.db, SettlementDecision::Approved);

    let cart = vec![CartItem { product_id: env.eggs, quantity: 2 }];
    let order = api.place_order(&env.buyer, cart).await.expect("Order should be placed");
    let first = api.process_payment(&env.buyer, order.id, PaymentMethod::Card).await.expect("Settlement recorded");

    let err = api
        .process_payment(&env.buyer, order.id, PaymentMethod::Cash)
        .await
        .expect_err("Second settlement must be rejected");
    assert!(matches!(err, SettlementError::AlreadyPaid(id) if id == order.id));

    // The existing record is untouched by the rejected attempt
    let payment = api.payment_for_order(&env.buyer, order.id).await.expect("Payment should exist");
    assert_eq!(payment.transaction_id, first.payment.transaction_id);
    assert_eq!(payment.method, PaymentMethod::Card);
    assert_eq!(payment.status, PaymentStatusType::Completed);
}

#[tokio::test]
async fn a_declined_settlement_leaves_the_order_pending_and_permits_retry() {
    let env = prepare_test_env().await;
    let declined = api_with(&env.db, SettlementDecision::Declined);

    let cart = vec![CartItem { product_id: env.eggs, quantity: 1 }];
    let order = declined.place_order(&env.buyer, cart).await.expect("Order should be placed");

    let outcome =
        declined.process_payment(&env.buyer, order.id, PaymentMethod::MobileMoney).await.expect("Attempt recorded");
    assert!(!outcome.success);
    assert_eq!(outcome.payment.status, PaymentStatusType::Failed);
    assert!(outcome.payment.paid_at.is_none());

    let still_pending = declined.order_for_user(&env.buyer, order.id).await.expect("Order should exist");
    assert_eq!(still_pending.status, OrderStatusType::Pending);

    // The retry overwrites the same payment slot rather than creating a second record
    let approved = api_with(&env.db, SettlementDecision::Approved);
    let retry = approved.process_payment(&env.buyer, order.id, PaymentMethod::Card).await.expect("Retry recorded");
    assert!(retry.success);
    assert_eq!(retry.payment.id, outcome.payment.id);
    assert_ne!(retry.payment.transaction_id, outcome.payment.transaction_id);
    assert_eq!(support::payment_count(&env.db).await, 1);

    let now_processing = approved.order_for_user(&env.buyer, order.id).await.expect("Order should exist");
    assert_eq!(now_processing.status, OrderStatusType::Processing);
}

#[tokio::test]
async fn settling_a_foreign_or_missing_order_fails_with_not_found() {
    let env = prepare_test_env().await;
    let api = api_with(&env.db, SettlementDecision::Approved);
    let other = support::seed_user(&env.db, "other-buyer@example.com", farmgate_engine::db_types::Role::Buyer).await;

    let cart = vec![CartItem { product_id: env.carrots, quantity: 1 }];
    let order = api.place_order(&env.buyer, cart).await.expect("Order should be placed");

    let err = api.process_payment(&other, order.id, PaymentMethod::Card).await.expect_err("Foreign order");
    assert!(matches!(err, SettlementError::OrderNotFound(_)));
    let err = api.process_payment(&env.buyer, 555_555, PaymentMethod::Card).await.expect_err("Missing order");
    assert!(matches!(err, SettlementError::OrderNotFound(555_555)));
}

#[tokio::test]
async fn payment_lookup_is_scoped_and_reports_absence() {
    let env = prepare_test_env().await;
    let api = api_with(&env.db, SettlementDecision::Approved);
    let other = support::seed_user(&env.db, "nosy@example.com", farmgate_engine::db_types::Role::Buyer).await;

    let cart = vec![CartItem { product_id: env.carrots, quantity: 2 }];
    let order = api.place_order(&env.buyer, cart).await.expect("Order should be placed");

    let err = api.payment_for_order(&env.buyer, order.id).await.expect_err("No payment yet");
    assert!(matches!(err, SettlementError::PaymentNotFound(_)));

    api.process_payment(&env.buyer, order.id, PaymentMethod::BankTransfer).await.expect("Settlement recorded");
    let payment = api.payment_for_order(&env.buyer, order.id).await.expect("Payment should exist");
    assert_eq!(payment.method, PaymentMethod::BankTransfer);

    let err = api.payment_for_order(&other, order.id).await.expect_err("Foreign payment must be invisible");
    assert!(matches!(err, SettlementError::PaymentNotFound(_)));
}

#[tokio::test]
async fn farm_payment_listing_is_owner_only() {
    let env = prepare_test_env().await;
    let api = api_with(&env.db, SettlementDecision::Approved);

    // One order against Meadow Lane produce, one against Hilltop produce; only the first settles
    let cart = vec![CartItem { product_id: env.tomatoes, quantity: 2 }, CartItem { product_id: env.eggs, quantity: 1 }];
    let order = api.place_order(&env.buyer, cart).await.expect("Order should be placed");
    api.process_payment(&env.buyer, order.id, PaymentMethod::Card).await.expect("Settlement recorded");
    let cart = vec![CartItem { product_id: env.carrots, quantity: 4 }];
    api.place_order(&env.buyer, cart).await.expect("Order should be placed");

    let payments = api.payments_for_farm(&env.farmer, env.farm_id).await.expect("Owner may list");
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].payment.amount, Money::from_cents(750));
    assert_eq!(payments[0].buyer_id, env.buyer.id);
    assert_eq!(payments[0].order_total, Money::from_cents(750));

    // An unsettled farm has nothing to show its owner
    let payments = api.payments_for_farm(&env.rival_farmer, env.rival_farm_id).await.expect("Owner may list");
    assert!(payments.is_empty());

    let err = api.payments_for_farm(&env.rival_farmer, env.farm_id).await.expect_err("Foreign farm");
    assert!(matches!(err, SettlementError::Forbidden(_)));
    let err = api.payments_for_farm(&env.buyer, env.farm_id).await.expect_err("Buyers may not list");
    assert!(matches!(err, SettlementError::Forbidden(_)));
    let err = api.payments_for_farm(&env.farmer, 31_337).await.expect_err("Missing farm");
    assert!(matches!(err, SettlementError::FarmNotFound(31_337)));
}

/// The walkthrough: order 3 of a $2.00 product with stock 5, pay, then try to over-order the remainder.
#[tokio::test]
async fn the_full_buyer_journey() {
    let env = prepare_test_env().await;
    let api = api_with(&env.db, SettlementDecision::Approved);

    let order = api
        .place_order(&env.buyer, vec![CartItem { product_id: env.tomatoes, quantity: 3 }])
        .await
        .expect("Order should be placed");
    assert_eq!(order.total, Money::from_cents(600));
    assert_eq!(order.status, OrderStatusType::Pending);
    assert_eq!(stock_of(&env.db, env.tomatoes).await, 2);

    let outcome = api.process_payment(&env.buyer, order.id, PaymentMethod::Card).await.expect("Settlement recorded");
    assert!(outcome.success);
    let paid = api.order_for_user(&env.buyer, order.id).await.expect("Order should exist");
    assert_eq!(paid.status, OrderStatusType::Processing);
    assert_eq!(stock_of(&env.db, env.tomatoes).await, 2, "No double draw-down on settlement");

    let err = api
        .place_order(&env.buyer, vec![CartItem { product_id: env.tomatoes, quantity: 10 }])
        .await
        .expect_err("Only 2 remain");
    assert!(matches!(err, SettlementError::InsufficientStock { available: 2, requested: 10, .. }));
}
