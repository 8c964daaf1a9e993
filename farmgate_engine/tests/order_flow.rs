//! Order placement and lifecycle tests against a real SQLite store.
mod support;

use std::sync::Arc;

use farmgate_engine::{
    db_types::{CartItem, OrderStatusType},
    order_objects::Pagination,
    traits::{SettlementDecision, SettlementError},
};
use fg_common::Money;
use support::{api_with, order_count, payment_count, prepare_test_env, stock_of};

#[tokio::test]
async fn placing_an_order_reserves_stock_and_snapshots_prices() {
    let env = prepare_test_env().await;
    let api = api_with(&env.db, SettlementDecision::Approved);

    let cart = vec![CartItem { product_id: env.tomatoes, quantity: 3 }];
    let order = api.place_order(&env.buyer, cart).await.expect("Order should be placed");

    assert_eq!(order.total, Money::from_cents(600));
    assert_eq!(order.status, OrderStatusType::Pending);
    assert_eq!(order.user_id, env.buyer.id);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].product_name, "Tomatoes");
    assert_eq!(order.items[0].unit_price, Money::from_cents(200));
    assert_eq!(stock_of(&env.db, env.tomatoes).await, 2);
}

#[tokio::test]
async fn ordering_more_than_available_fails_and_mutates_nothing() {
    let env = prepare_test_env().await;
    let api = api_with(&env.db, SettlementDecision::Approved);

    let cart = vec![CartItem { product_id: env.tomatoes, quantity: 10 }];
    let err = api.place_order(&env.buyer, cart).await.expect_err("Order should be rejected");

    match err {
        SettlementError::InsufficientStock { product_id, requested, available, .. } => {
            assert_eq!(product_id, env.tomatoes);
            assert_eq!(requested, 10);
            assert_eq!(available, 5);
        },
        e => panic!("Expected InsufficientStock, got {e:?}"),
    }
    assert_eq!(stock_of(&env.db, env.tomatoes).await, 5);
    assert_eq!(order_count(&env.db).await, 0);
    assert_eq!(payment_count(&env.db).await, 0);
}

#[tokio::test]
async fn ordering_a_nonexistent_product_fails_with_not_found() {
    let env = prepare_test_env().await;
    let api = api_with(&env.db, SettlementDecision::Approved);

    let cart = vec![CartItem { product_id: 99_999, quantity: 1 }];
    let err = api.place_order(&env.buyer, cart).await.expect_err("Order should be rejected");
    assert!(matches!(err, SettlementError::ProductNotFound(99_999)));
    assert_eq!(order_count(&env.db).await, 0);
}

#[tokio::test]
async fn a_bad_line_rejects_the_whole_cart() {
    let env = prepare_test_env().await;
    let api = api_with(&env.db, SettlementDecision::Approved);

    let cart = vec![
        CartItem { product_id: env.tomatoes, quantity: 2 },
        CartItem { product_id: env.eggs, quantity: 100 },
    ];
    let err = api.place_order(&env.buyer, cart).await.expect_err("Order should be rejected");
    assert!(matches!(err, SettlementError::InsufficientStock { .. }));
    // The passing first line must not leave any trace behind
    assert_eq!(stock_of(&env.db, env.tomatoes).await, 5);
    assert_eq!(stock_of(&env.db, env.eggs).await, 12);
    assert_eq!(order_count(&env.db).await, 0);
}

#[tokio::test]
async fn empty_and_non_positive_carts_are_invalid() {
    let env = prepare_test_env().await;
    let api = api_with(&env.db, SettlementDecision::Approved);

    let err = api.place_order(&env.buyer, vec![]).await.expect_err("Empty cart should be rejected");
    assert!(matches!(err, SettlementError::InvalidOrder(_)));

    let cart = vec![CartItem { product_id: env.tomatoes, quantity: 0 }];
    let err = api.place_order(&env.buyer, cart).await.expect_err("Zero quantity should be rejected");
    assert!(matches!(err, SettlementError::InvalidOrder(_)));
    assert_eq!(stock_of(&env.db, env.tomatoes).await, 5);
}

#[tokio::test]
async fn concurrent_orders_cannot_oversell() {
    let env = prepare_test_env().await;
    let api = Arc::new(api_with(&env.db, SettlementDecision::Approved));
    let buyer = env.buyer;
    let tomatoes = env.tomatoes;

    // Stock is 5; each order individually fits, together they do not.
    let a = {
        let api = Arc::clone(&api);
        tokio::spawn(
            async move { api.place_order(&buyer, vec![CartItem { product_id: tomatoes, quantity: 3 }]).await },
        )
    };
    let b = {
        let api = Arc::clone(&api);
        tokio::spawn(
            async move { api.place_order(&buyer, vec![CartItem { product_id: tomatoes, quantity: 3 }]).await },
        )
    };
    let results = [a.await.unwrap(), b.await.unwrap()];

    let placed = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(placed, 1, "Exactly one of the two racing orders may succeed");
    let failure = results.iter().find(|r| r.is_err()).unwrap().as_ref().unwrap_err();
    assert!(matches!(failure, SettlementError::InsufficientStock { .. }));
    assert_eq!(stock_of(&env.db, tomatoes).await, 2);
    assert_eq!(order_count(&env.db).await, 1);
}

#[tokio::test]
async fn order_totals_survive_catalog_price_changes() {
    let env = prepare_test_env().await;
    let api = api_with(&env.db, SettlementDecision::Approved);

    let cart = vec![CartItem { product_id: env.tomatoes, quantity: 3 }];
    let order = api.place_order(&env.buyer, cart).await.expect("Order should be placed");

    support::set_price(&env.db, env.tomatoes, Money::from_cents(975)).await;

    let fetched = api.order_for_user(&env.buyer, order.id).await.expect("Order should exist");
    assert_eq!(fetched.total, Money::from_cents(600));
    assert_eq!(fetched.items[0].unit_price, Money::from_cents(200));
}

#[tokio::test]
async fn buyers_only_see_their_own_orders() {
    let env = prepare_test_env().await;
    let api = api_with(&env.db, SettlementDecision::Approved);
    let other = support::seed_user(&env.db, "other-buyer@example.com", farmgate_engine::db_types::Role::Buyer).await;

    let cart = vec![CartItem { product_id: env.tomatoes, quantity: 1 }];
    let order = api.place_order(&env.buyer, cart).await.expect("Order should be placed");

    let err = api.order_for_user(&other, order.id).await.expect_err("Foreign order must be invisible");
    assert!(matches!(err, SettlementError::OrderNotFound(_)));
}

#[tokio::test]
async fn order_listing_is_paginated_newest_first() {
    let env = prepare_test_env().await;
    let api = api_with(&env.db, SettlementDecision::Approved);

    for _ in 0..5 {
        let cart = vec![CartItem { product_id: env.carrots, quantity: 1 }];
        api.place_order(&env.buyer, cart).await.expect("Order should be placed");
    }

    let page = api.orders_for_user(&env.buyer, Pagination::new(1, 2)).await.expect("Listing should succeed");
    assert_eq!(page.orders.len(), 2);
    assert_eq!(page.pagination.total, 5);
    assert_eq!(page.pagination.pages, 3);
    assert!(page.orders[0].id > page.orders[1].id, "Newest order comes first");

    let tail = api.orders_for_user(&env.buyer, Pagination::new(4, 2)).await.expect("Listing should succeed");
    assert!(tail.orders.is_empty());
    assert_eq!(tail.pagination.total, 5);

    let err = api.orders_for_user(&env.buyer, Pagination::new(0, 2)).await.expect_err("page 0 is invalid");
    assert!(matches!(err, SettlementError::InvalidPagination(_)));
}

#[tokio::test]
async fn only_a_supplying_farmer_may_move_an_order() {
    let env = prepare_test_env().await;
    let api = api_with(&env.db, SettlementDecision::Approved);

    let cart = vec![CartItem { product_id: env.tomatoes, quantity: 2 }];
    let order = api.place_order(&env.buyer, cart).await.expect("Order should be placed");

    // Buyers cannot transition status at all
    let err = api
        .update_order_status(&env.buyer, order.id, OrderStatusType::Shipped)
        .await
        .expect_err("Buyer must not update status");
    assert!(matches!(err, SettlementError::Forbidden(_)));

    // A farmer with no products in the order cannot either
    let err = api
        .update_order_status(&env.rival_farmer, order.id, OrderStatusType::Shipped)
        .await
        .expect_err("Foreign farmer must not update status");
    assert!(matches!(err, SettlementError::Forbidden(_)));

    let updated = api
        .update_order_status(&env.farmer, order.id, OrderStatusType::Shipped)
        .await
        .expect("Supplying farmer may update status");
    assert_eq!(updated.status, OrderStatusType::Shipped);
}

#[tokio::test]
async fn terminal_orders_accept_no_further_transitions() {
    let env = prepare_test_env().await;
    let api = api_with(&env.db, SettlementDecision::Approved);

    let cart = vec![CartItem { product_id: env.tomatoes, quantity: 1 }];
    let order = api.place_order(&env.buyer, cart).await.expect("Order should be placed");

    api.update_order_status(&env.farmer, order.id, OrderStatusType::Delivered).await.expect("Transition allowed");
    let err = api
        .update_order_status(&env.farmer, order.id, OrderStatusType::Shipped)
        .await
        .expect_err("Delivered is terminal");
    assert!(matches!(err, SettlementError::OrderAlreadyFinal { status: OrderStatusType::Delivered, .. }));

    let cart = vec![CartItem { product_id: env.tomatoes, quantity: 1 }];
    let order = api.place_order(&env.buyer, cart).await.expect("Order should be placed");
    api.update_order_status(&env.farmer, order.id, OrderStatusType::Cancelled).await.expect("Transition allowed");
    let err = api
        .update_order_status(&env.farmer, order.id, OrderStatusType::Processing)
        .await
        .expect_err("Cancelled is terminal");
    assert!(matches!(err, SettlementError::OrderAlreadyFinal { status: OrderStatusType::Cancelled, .. }));
}

#[tokio::test]
async fn transitioning_a_missing_order_fails_with_not_found() {
    let env = prepare_test_env().await;
    let api = api_with(&env.db, SettlementDecision::Approved);
    let err = api
        .update_order_status(&env.farmer, 424_242, OrderStatusType::Shipped)
        .await
        .expect_err("Missing order must 404");
    assert!(matches!(err, SettlementError::OrderNotFound(424_242)));
}
