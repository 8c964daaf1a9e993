use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use farmgate_engine::{db_types::OrderStatusType, traits::{SettlementDecision, SettlementError}};
use serde_json::json;

use super::helpers::{api_over, identity_headers, sample_order, sample_view, send_request, with_identity};
use crate::{
    endpoint_tests::mocks::MockSettlementDb,
    routes::{my_orders, order_by_id, place_order, update_order_status},
};

fn order_routes(cfg: &mut ServiceConfig, mock: MockSettlementDb) {
    let api = api_over(mock, SettlementDecision::Approved);
    cfg.app_data(web::Data::new(api))
        .service(
            web::resource("/api/orders")
                .route(web::post().to(place_order::<MockSettlementDb>))
                .route(web::get().to(my_orders::<MockSettlementDb>)),
        )
        .service(web::resource("/api/orders/{id}").route(web::get().to(order_by_id::<MockSettlementDb>)))
        .service(
            web::resource("/api/orders/{id}/status")
                .route(web::patch().to(update_order_status::<MockSettlementDb>)),
        );
}

fn order_body() -> serde_json::Value {
    json!({ "items": [{ "product_id": 1, "quantity": 3 }] })
}

#[actix_web::test]
async fn place_order_happy_path() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        let mut mock = MockSettlementDb::new();
        mock.expect_place_order().returning(|order| Ok(sample_order(10, order.user_id, OrderStatusType::Pending)));
        mock.expect_fetch_order_view().returning(|id| Ok(Some(sample_view(id, 42, OrderStatusType::Pending))));
        order_routes(cfg, mock);
    }
    let req = with_identity(TestRequest::post().uri("/api/orders").set_json(order_body()), 42, "BUYER");
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.contains("\"total\":600"), "body was {body}");
    assert!(body.contains("\"status\":\"PENDING\""), "body was {body}");
    assert!(body.contains("Tomatoes"), "body was {body}");
}

#[actix_web::test]
async fn place_order_requires_identity_headers() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        order_routes(cfg, MockSettlementDb::new());
    }
    let req = TestRequest::post().uri("/api/orders").set_json(order_body());
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("Identity headers missing"), "body was {body}");
}

#[actix_web::test]
async fn place_order_rejects_a_tampered_signature() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        order_routes(cfg, MockSettlementDb::new());
    }
    let mut req = TestRequest::post().uri("/api/orders").set_json(order_body());
    for (name, value) in identity_headers(42, "BUYER") {
        // Pretend to be user 43 with user 42's signature
        let value = if name == "fg-user-id" { "43".to_string() } else { value };
        req = req.insert_header((name, value));
    }
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("signature is invalid"), "body was {body}");
}

#[actix_web::test]
async fn place_order_rejects_an_unknown_role() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        order_routes(cfg, MockSettlementDb::new());
    }
    let req = with_identity(TestRequest::post().uri("/api/orders").set_json(order_body()), 42, "ADMIN");
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("invalid role"), "body was {body}");
}

#[actix_web::test]
async fn insufficient_stock_is_a_client_error_naming_the_product() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        let mut mock = MockSettlementDb::new();
        mock.expect_place_order().returning(|_| {
            Err(SettlementError::InsufficientStock {
                product_id: 1,
                name: "Tomatoes".to_string(),
                requested: 10,
                available: 2,
            })
        });
        order_routes(cfg, mock);
    }
    let req = with_identity(TestRequest::post().uri("/api/orders").set_json(order_body()), 42, "BUYER");
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Insufficient stock for product 1 - Tomatoes"), "body was {body}");
}

#[actix_web::test]
async fn fetch_my_order_by_id() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        let mut mock = MockSettlementDb::new();
        mock.expect_fetch_order_for_user()
            .returning(|id, user_id| Ok(Some(sample_order(id, user_id, OrderStatusType::Pending))));
        mock.expect_fetch_order_view().returning(|id| Ok(Some(sample_view(id, 42, OrderStatusType::Pending))));
        order_routes(cfg, mock);
    }
    let req = with_identity(TestRequest::get().uri("/api/orders/10"), 42, "BUYER");
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"id\":10"), "body was {body}");
}

#[actix_web::test]
async fn a_foreign_order_is_not_found() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        let mut mock = MockSettlementDb::new();
        mock.expect_fetch_order_for_user().returning(|_, _| Ok(None));
        order_routes(cfg, mock);
    }
    let req = with_identity(TestRequest::get().uri("/api/orders/10"), 42, "BUYER");
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Order 10 not found"), "body was {body}");
}

#[actix_web::test]
async fn order_listing_reports_page_counts() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        let mut mock = MockSettlementDb::new();
        mock.expect_fetch_orders_for_user()
            .returning(|user_id, _| Ok((vec![sample_view(10, user_id, OrderStatusType::Pending)], 5)));
        order_routes(cfg, mock);
    }
    let req = with_identity(TestRequest::get().uri("/api/orders?page=1&limit=2"), 42, "BUYER");
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"total\":5"), "body was {body}");
    assert!(body.contains("\"pages\":3"), "body was {body}");
}

#[actix_web::test]
async fn order_listing_rejects_page_zero() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        order_routes(cfg, MockSettlementDb::new());
    }
    let req = with_identity(TestRequest::get().uri("/api/orders?page=0&limit=2"), 42, "BUYER");
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("page must be at least 1"), "body was {body}");
}

#[actix_web::test]
async fn buyers_cannot_update_order_status() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        order_routes(cfg, MockSettlementDb::new());
    }
    let body = json!({ "status": "SHIPPED" });
    let req = with_identity(TestRequest::patch().uri("/api/orders/10/status").set_json(body), 42, "BUYER");
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("Only farmers"), "body was {body}");
}

#[actix_web::test]
async fn a_malformed_status_is_rejected_before_any_lookup() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        order_routes(cfg, MockSettlementDb::new());
    }
    let body = json!({ "status": "TELEPORTED" });
    let req = with_identity(TestRequest::patch().uri("/api/orders/10/status").set_json(body), 7, "FARMER");
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Invalid order status: TELEPORTED"), "body was {body}");
}

#[actix_web::test]
async fn a_non_supplying_farmer_is_forbidden() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        let mut mock = MockSettlementDb::new();
        mock.expect_fetch_order().returning(|id| Ok(Some(sample_order(id, 42, OrderStatusType::Pending))));
        mock.expect_farmer_supplies_order().returning(|_, _| Ok(false));
        order_routes(cfg, mock);
    }
    let body = json!({ "status": "SHIPPED" });
    let req = with_identity(TestRequest::patch().uri("/api/orders/10/status").set_json(body), 7, "FARMER");
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("Not authorized to update this order"), "body was {body}");
}

#[actix_web::test]
async fn terminal_orders_conflict_on_further_updates() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        let mut mock = MockSettlementDb::new();
        mock.expect_fetch_order().returning(|id| Ok(Some(sample_order(id, 42, OrderStatusType::Delivered))));
        order_routes(cfg, mock);
    }
    let body = json!({ "status": "SHIPPED" });
    let req = with_identity(TestRequest::patch().uri("/api/orders/10/status").set_json(body), 7, "FARMER");
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("already DELIVERED"), "body was {body}");
}

#[actix_web::test]
async fn a_supplying_farmer_updates_status() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        let mut mock = MockSettlementDb::new();
        mock.expect_fetch_order().returning(|id| Ok(Some(sample_order(id, 42, OrderStatusType::Processing))));
        mock.expect_farmer_supplies_order().returning(|_, _| Ok(true));
        mock.expect_update_order_status()
            .returning(|id, status| Ok(sample_order(id, 42, status)));
        order_routes(cfg, mock);
    }
    let body = json!({ "status": "SHIPPED" });
    let req = with_identity(TestRequest::patch().uri("/api/orders/10/status").set_json(body), 7, "FARMER");
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"status\":\"SHIPPED\""), "body was {body}");
}
