use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::{DateTime, TimeZone, Utc};
use farmgate_engine::{
    db_types::{Order, OrderStatusType, Payment, PaymentMethod, PaymentStatusType},
    order_objects::{OrderItemView, OrderView},
    traits::{FixedSettlementGateway, SettlementDecision},
    OrderFlowApi,
};
use fg_common::Money;

use crate::{
    auth::{sign_identity, ROLE_HEADER, SIGNATURE_HEADER, USER_ID_HEADER},
    config::AuthConfig,
    endpoint_tests::mocks::MockSettlementDb,
};

// The secret shared with the make-believe upstream gateway. DO NOT re-use outside of tests.
pub const TEST_SECRET: &str = "farmgate-endpoint-test-secret";

pub fn test_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// Signs identity headers the way the upstream gateway would.
pub fn identity_headers(user_id: i64, role: &str) -> Vec<(&'static str, String)> {
    let id = user_id.to_string();
    let signature = sign_identity(TEST_SECRET, &id, role);
    vec![(USER_ID_HEADER, id), (ROLE_HEADER, role.to_string()), (SIGNATURE_HEADER, signature)]
}

pub fn with_identity(mut req: TestRequest, user_id: i64, role: &str) -> TestRequest {
    for (name, value) in identity_headers(user_id, role) {
        req = req.insert_header((name, value));
    }
    req
}

/// Builds an app around the configured routes and mock, sends the request, and returns status and body. Errors
/// surfaced before a handler runs (e.g. extractor rejections) are rendered the same way the live server would
/// render them.
pub async fn send_request(req: TestRequest, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    let app = App::new().app_data(web::Data::new(AuthConfig::new(TEST_SECRET))).configure(configure);
    let service = test::init_service(app).await;
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let (_, res) = res.into_parts();
            let status = res.status();
            let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
            (status, body)
        },
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
            (status, body)
        },
    }
}

pub fn api_over(mock: MockSettlementDb, decision: SettlementDecision) -> OrderFlowApi<MockSettlementDb> {
    OrderFlowApi::new(mock, Arc::new(FixedSettlementGateway(decision)))
}

pub fn sample_order(id: i64, user_id: i64, status: OrderStatusType) -> Order {
    Order {
        id,
        user_id,
        total: Money::from_cents(600),
        status,
        created_at: test_time(),
        updated_at: test_time(),
    }
}

pub fn sample_view(id: i64, user_id: i64, status: OrderStatusType) -> OrderView {
    OrderView {
        id,
        user_id,
        total: Money::from_cents(600),
        status,
        created_at: test_time(),
        updated_at: test_time(),
        items: vec![OrderItemView {
            product_id: 1,
            product_name: "Tomatoes".to_string(),
            quantity: 3,
            unit_price: Money::from_cents(200),
        }],
    }
}

pub fn sample_payment(order_id: i64, status: PaymentStatusType) -> Payment {
    Payment {
        id: 1,
        order_id,
        amount: Money::from_cents(600),
        method: PaymentMethod::Card,
        status,
        transaction_id: "txn-fixedfixedfixedfixedfixe".to_string(),
        paid_at: (status == PaymentStatusType::Completed).then(test_time),
        created_at: test_time(),
        updated_at: test_time(),
    }
}
