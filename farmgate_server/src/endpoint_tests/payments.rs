use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use farmgate_engine::{
    db_types::{Farm, OrderStatusType, PaymentStatusType},
    payment_objects::FarmPayment,
    traits::SettlementDecision,
};
use fg_common::Money;
use serde_json::json;

use super::helpers::{api_over, sample_order, sample_payment, send_request, test_time, with_identity};
use crate::{
    endpoint_tests::mocks::MockSettlementDb,
    routes::{farm_payments, payment_for_order, process_payment},
};

fn payment_routes(cfg: &mut ServiceConfig, mock: MockSettlementDb, decision: SettlementDecision) {
    let api = api_over(mock, decision);
    cfg.app_data(web::Data::new(api))
        .service(web::resource("/api/payments").route(web::post().to(process_payment::<MockSettlementDb>)))
        .service(
            web::resource("/api/payments/{order_id}")
                .route(web::get().to(payment_for_order::<MockSettlementDb>)),
        )
        .service(
            web::resource("/api/farms/{farm_id}/payments")
                .route(web::get().to(farm_payments::<MockSettlementDb>)),
        );
}

#[actix_web::test]
async fn a_settlement_is_recorded_and_reported() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        let mut mock = MockSettlementDb::new();
        mock.expect_fetch_order_for_user()
            .returning(|id, user_id| Ok(Some(sample_order(id, user_id, OrderStatusType::Pending))));
        mock.expect_fetch_payment_for_user().returning(|_, _| Ok(None));
        mock.expect_record_settlement().returning(|order_id, attempt| {
            assert!(attempt.approved);
            assert!(attempt.transaction_id.starts_with("txn-"));
            Ok(sample_payment(order_id, PaymentStatusType::Completed))
        });
        payment_routes(cfg, mock, SettlementDecision::Approved);
    }
    let body = json!({ "order_id": 10, "method": "CARD" });
    let req = with_identity(TestRequest::post().uri("/api/payments").set_json(body), 42, "BUYER");
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"success\":true"), "body was {body}");
    assert!(body.contains("Payment processed successfully"), "body was {body}");
}

#[actix_web::test]
async fn a_declined_settlement_reports_failure() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        let mut mock = MockSettlementDb::new();
        mock.expect_fetch_order_for_user()
            .returning(|id, user_id| Ok(Some(sample_order(id, user_id, OrderStatusType::Pending))));
        mock.expect_fetch_payment_for_user()
            .returning(|order_id, _| Ok(Some(sample_payment(order_id, PaymentStatusType::Failed))));
        mock.expect_record_settlement().returning(|order_id, attempt| {
            assert!(!attempt.approved);
            Ok(sample_payment(order_id, PaymentStatusType::Failed))
        });
        payment_routes(cfg, mock, SettlementDecision::Declined);
    }
    let body = json!({ "order_id": 10, "method": "CARD" });
    let req = with_identity(TestRequest::post().uri("/api/payments").set_json(body), 42, "BUYER");
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"success\":false"), "body was {body}");
    assert!(body.contains("Payment failed. Please try again."), "body was {body}");
}

#[actix_web::test]
async fn paying_twice_is_a_conflict() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        let mut mock = MockSettlementDb::new();
        mock.expect_fetch_order_for_user()
            .returning(|id, user_id| Ok(Some(sample_order(id, user_id, OrderStatusType::Processing))));
        mock.expect_fetch_payment_for_user()
            .returning(|order_id, _| Ok(Some(sample_payment(order_id, PaymentStatusType::Completed))));
        payment_routes(cfg, mock, SettlementDecision::Approved);
    }
    let body = json!({ "order_id": 10, "method": "CARD" });
    let req = with_identity(TestRequest::post().uri("/api/payments").set_json(body), 42, "BUYER");
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("already been paid"), "body was {body}");
}

#[actix_web::test]
async fn an_unknown_payment_method_is_rejected() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        payment_routes(cfg, MockSettlementDb::new(), SettlementDecision::Approved);
    }
    let body = json!({ "order_id": 10, "method": "BARTER" });
    let req = with_identity(TestRequest::post().uri("/api/payments").set_json(body), 42, "BUYER");
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Invalid payment method: BARTER"), "body was {body}");
}

#[actix_web::test]
async fn payment_details_for_an_unpaid_order_are_not_found() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        let mut mock = MockSettlementDb::new();
        mock.expect_fetch_payment_for_user().returning(|_, _| Ok(None));
        payment_routes(cfg, mock, SettlementDecision::Approved);
    }
    let req = with_identity(TestRequest::get().uri("/api/payments/10"), 42, "BUYER");
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("No payment found for order 10"), "body was {body}");
}

#[actix_web::test]
async fn payment_details_are_returned_to_the_order_owner() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        let mut mock = MockSettlementDb::new();
        mock.expect_fetch_payment_for_user()
            .returning(|order_id, _| Ok(Some(sample_payment(order_id, PaymentStatusType::Completed))));
        payment_routes(cfg, mock, SettlementDecision::Approved);
    }
    let req = with_identity(TestRequest::get().uri("/api/payments/10"), 42, "BUYER");
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"status\":\"COMPLETED\""), "body was {body}");
    assert!(body.contains("\"order_id\":10"), "body was {body}");
}

#[actix_web::test]
async fn buyers_may_not_list_farm_payments() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        payment_routes(cfg, MockSettlementDb::new(), SettlementDecision::Approved);
    }
    let req = with_identity(TestRequest::get().uri("/api/farms/3/payments"), 42, "BUYER");
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("Only farmers"), "body was {body}");
}

#[actix_web::test]
async fn a_missing_farm_is_not_found() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        let mut mock = MockSettlementDb::new();
        mock.expect_fetch_farm().returning(|_| Ok(None));
        payment_routes(cfg, mock, SettlementDecision::Approved);
    }
    let req = with_identity(TestRequest::get().uri("/api/farms/3/payments"), 7, "FARMER");
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Farm 3 not found"), "body was {body}");
}

#[actix_web::test]
async fn only_the_owner_sees_a_farms_payments() {
    let _ = env_logger::try_init().ok();
    fn farm(farmer_id: i64) -> Farm {
        Farm { id: 3, name: "Meadow Lane Farm".to_string(), farmer_id, created_at: test_time() }
    }
    fn configure(cfg: &mut ServiceConfig) {
        let mut mock = MockSettlementDb::new();
        mock.expect_fetch_farm().returning(|_| Ok(Some(farm(8))));
        payment_routes(cfg, mock, SettlementDecision::Approved);
    }
    let req = with_identity(TestRequest::get().uri("/api/farms/3/payments"), 7, "FARMER");
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("Not authorized to view this farm's payments"), "body was {body}");
}

#[actix_web::test]
async fn the_owner_lists_farm_payments() {
    let _ = env_logger::try_init().ok();
    fn configure(cfg: &mut ServiceConfig) {
        let mut mock = MockSettlementDb::new();
        mock.expect_fetch_farm().returning(|id| {
            Ok(Some(Farm { id, name: "Meadow Lane Farm".to_string(), farmer_id: 7, created_at: test_time() }))
        });
        mock.expect_fetch_payments_for_farm().returning(|_| {
            Ok(vec![FarmPayment {
                payment: sample_payment(10, PaymentStatusType::Completed),
                buyer_id: 42,
                order_total: Money::from_cents(600),
            }])
        });
        payment_routes(cfg, mock, SettlementDecision::Approved);
    }
    let req = with_identity(TestRequest::get().uri("/api/farms/3/payments"), 7, "FARMER");
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"buyer_id\":42"), "body was {body}");
    assert!(body.contains("\"order_total\":600"), "body was {body}");
}
