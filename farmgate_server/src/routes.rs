//! Request handler definitions
//!
//! Define each route and its handler here. Handlers are thin: they extract the verified actor, deserialize the
//! payload, and delegate straight to the engine's [`OrderFlowApi`]. Every authorization decision happens inside
//! the engine, before anything mutates.
//!
//! Handlers are generic over the backend so that endpoint tests can run them against a mock database; the server
//! registers them with the concrete [`farmgate_engine::SqliteDatabase`].
use actix_web::{get, web, HttpResponse, Responder};
use farmgate_engine::{
    db_types::{OrderStatusType, PaymentMethod},
    traits::{SettlementDatabase, SettlementError},
    OrderFlowApi,
};
use log::*;

use crate::{
    auth::AuthenticatedActor,
    data_objects::{OrderListParams, PaymentRequest, PlaceOrderRequest, UpdateStatusRequest},
    errors::ServerError,
};

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

// ----------------------------------------------   Orders  ----------------------------------------------------
pub async fn place_order<B: SettlementDatabase>(
    actor: AuthenticatedActor,
    body: web::Json<PlaceOrderRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST order for user #{}", actor.0.id);
    let order = api.place_order(&actor.0, body.into_inner().items).await?;
    Ok(HttpResponse::Created().json(order))
}

pub async fn my_orders<B: SettlementDatabase>(
    actor: AuthenticatedActor,
    params: web::Query<OrderListParams>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET orders for user #{}", actor.0.id);
    let result = api.orders_for_user(&actor.0, params.into_inner().into()).await?;
    Ok(HttpResponse::Ok().json(result))
}

pub async fn order_by_id<B: SettlementDatabase>(
    actor: AuthenticatedActor,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order #{order_id} for user #{}", actor.0.id);
    let order = api.order_for_user(&actor.0, order_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

pub async fn update_order_status<B: SettlementDatabase>(
    actor: AuthenticatedActor,
    path: web::Path<i64>,
    body: web::Json<UpdateStatusRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    let requested = body.into_inner().status;
    let status = requested
        .parse::<OrderStatusType>()
        .map_err(|_| SettlementError::InvalidOrderStatus(requested.clone()))?;
    debug!("💻️ PATCH order #{order_id} to {status} by user #{}", actor.0.id);
    let order = api.update_order_status(&actor.0, order_id, status).await?;
    Ok(HttpResponse::Ok().json(order))
}

// ----------------------------------------------  Payments ----------------------------------------------------
pub async fn process_payment<B: SettlementDatabase>(
    actor: AuthenticatedActor,
    body: web::Json<PaymentRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    let method = request
        .method
        .parse::<PaymentMethod>()
        .map_err(|_| SettlementError::InvalidPaymentMethod(request.method.clone()))?;
    debug!("💻️ POST payment for order #{} by user #{}", request.order_id, actor.0.id);
    let outcome = api.process_payment(&actor.0, request.order_id, method).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

pub async fn payment_for_order<B: SettlementDatabase>(
    actor: AuthenticatedActor,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET payment for order #{order_id} by user #{}", actor.0.id);
    let payment = api.payment_for_order(&actor.0, order_id).await?;
    Ok(HttpResponse::Ok().json(payment))
}

pub async fn farm_payments<B: SettlementDatabase>(
    actor: AuthenticatedActor,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let farm_id = path.into_inner();
    debug!("💻️ GET payments for farm #{farm_id} by user #{}", actor.0.id);
    let payments = api.payments_for_farm(&actor.0, farm_id).await?;
    Ok(HttpResponse::Ok().json(payments))
}
