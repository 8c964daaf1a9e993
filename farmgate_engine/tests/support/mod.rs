//! Shared scaffolding for the engine integration tests: a throwaway SQLite database with migrations applied and
//! a small seeded catalog (two farmers, two farms, a buyer, and a handful of products).
#![allow(dead_code)]

use std::{env, sync::Arc};

use farmgate_engine::{
    db_types::{Actor, Role},
    traits::{FixedSettlementGateway, SettlementDatabase, SettlementDecision},
    OrderFlowApi, SqliteDatabase,
};
use fg_common::Money;
use log::*;
use sqlx::{migrate, migrate::MigrateDatabase, Sqlite};

pub struct TestEnv {
    pub db: SqliteDatabase,
    pub buyer: Actor,
    pub farmer: Actor,
    pub rival_farmer: Actor,
    pub farm_id: i64,
    pub rival_farm_id: i64,
    /// 5 in stock at $2.00, owned by `farm_id`
    pub tomatoes: i64,
    /// 12 in stock at $3.50, owned by `farm_id`
    pub eggs: i64,
    /// 40 in stock at $1.25, owned by `rival_farm_id`
    pub carrots: i64,
}

pub async fn prepare_test_env() -> TestEnv {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let url = random_db_path();
    create_database(&url).await;
    let db = run_migrations(&url).await;
    seed_catalog(db).await
}

pub fn random_db_path() -> String {
    format!("sqlite://{}/farmgate_test_{}.db", env::temp_dir().display(), rand::random::<u64>())
}

async fn create_database(url: &str) {
    if let Err(e) = Sqlite::drop_database(url).await {
        warn!("Error dropping database {url}: {e:?}");
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    info!("Created Sqlite database {url}");
}

async fn run_migrations(url: &str) -> SqliteDatabase {
    let db = SqliteDatabase::new_with_url(url, 8).await.expect("Error creating connection to database");
    migrate!("./src/sqlite/migrations").run(db.pool()).await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
    db
}

pub fn api_with(db: &SqliteDatabase, decision: SettlementDecision) -> OrderFlowApi<SqliteDatabase> {
    OrderFlowApi::new(db.clone(), Arc::new(FixedSettlementGateway(decision)))
}

async fn seed_catalog(db: SqliteDatabase) -> TestEnv {
    let buyer = seed_user(&db, "buyer@example.com", Role::Buyer).await;
    let farmer = seed_user(&db, "meadows@example.com", Role::Farmer).await;
    let rival_farmer = seed_user(&db, "hilltop@example.com", Role::Farmer).await;
    let farm_id = seed_farm(&db, "Meadow Lane Farm", farmer.id).await;
    let rival_farm_id = seed_farm(&db, "Hilltop Organics", rival_farmer.id).await;
    let tomatoes = seed_product(&db, "Tomatoes", Money::from_cents(200), 5, farm_id).await;
    let eggs = seed_product(&db, "Free-range eggs (doz)", Money::from_cents(350), 12, farm_id).await;
    let carrots = seed_product(&db, "Carrots", Money::from_cents(125), 40, rival_farm_id).await;
    TestEnv { db, buyer, farmer, rival_farmer, farm_id, rival_farm_id, tomatoes, eggs, carrots }
}

pub async fn seed_user(db: &SqliteDatabase, email: &str, role: Role) -> Actor {
    let id: i64 = sqlx::query_scalar("INSERT INTO users (email, role) VALUES ($1, $2) RETURNING id")
        .bind(email)
        .bind(role)
        .fetch_one(db.pool())
        .await
        .expect("Error seeding user");
    Actor::new(id, role)
}

pub async fn seed_farm(db: &SqliteDatabase, name: &str, farmer_id: i64) -> i64 {
    sqlx::query_scalar("INSERT INTO farms (name, farmer_id) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(farmer_id)
        .fetch_one(db.pool())
        .await
        .expect("Error seeding farm")
}

pub async fn seed_product(db: &SqliteDatabase, name: &str, price: Money, quantity: i64, farm_id: i64) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO products (name, price, quantity_available, farm_id) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(name)
    .bind(price)
    .bind(quantity)
    .bind(farm_id)
    .fetch_one(db.pool())
    .await
    .expect("Error seeding product")
}

pub async fn stock_of(db: &SqliteDatabase, product_id: i64) -> i64 {
    db.fetch_product(product_id)
        .await
        .expect("Error reading product")
        .expect("Product should exist")
        .quantity_available
}

pub async fn set_price(db: &SqliteDatabase, product_id: i64, price: Money) {
    sqlx::query("UPDATE products SET price = $1 WHERE id = $2")
        .bind(price)
        .bind(product_id)
        .execute(db.pool())
        .await
        .expect("Error updating price");
}

pub async fn order_count(db: &SqliteDatabase) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders").fetch_one(db.pool()).await.expect("Error counting orders")
}

pub async fn payment_count(db: &SqliteDatabase) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM payments").fetch_one(db.pool()).await.expect("Error counting payments")
}
