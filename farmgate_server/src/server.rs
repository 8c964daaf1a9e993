use std::{sync::Arc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use farmgate_engine::{traits::RandomSettlementGateway, OrderFlowApi, SqliteDatabase};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    routes::{
        farm_payments, health, my_orders, order_by_id, payment_for_order, place_order, process_payment,
        update_order_status,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let auth_config = config.auth.clone();
    let success_rate = config.settlement_success_rate;
    let srv = HttpServer::new(move || {
        let gateway = Arc::new(RandomSettlementGateway::new(success_rate));
        let orders_api = OrderFlowApi::new(db.clone(), gateway);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("fgs::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(auth_config.clone()))
            .service(health)
            .service(
                web::scope("/api")
                    .service(
                        web::resource("/orders")
                            .route(web::post().to(place_order::<SqliteDatabase>))
                            .route(web::get().to(my_orders::<SqliteDatabase>)),
                    )
                    .service(web::resource("/orders/{id}").route(web::get().to(order_by_id::<SqliteDatabase>)))
                    .service(
                        web::resource("/orders/{id}/status")
                            .route(web::patch().to(update_order_status::<SqliteDatabase>)),
                    )
                    .service(web::resource("/payments").route(web::post().to(process_payment::<SqliteDatabase>)))
                    .service(
                        web::resource("/payments/{order_id}")
                            .route(web::get().to(payment_for_order::<SqliteDatabase>)),
                    )
                    .service(
                        web::resource("/farms/{farm_id}/payments")
                            .route(web::get().to(farm_payments::<SqliteDatabase>)),
                    ),
            )
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
