use farmgate_engine::{
    db_types::{Farm, NewOrder, Order, OrderStatusType, Payment, Product},
    order_objects::{OrderView, Pagination},
    payment_objects::FarmPayment,
    traits::{SettlementAttempt, SettlementDatabase, SettlementError},
};
use mockall::mock;

mock! {
    pub SettlementDb {}
    impl SettlementDatabase for SettlementDb {
        fn url(&self) -> &str;
        async fn place_order(&self, order: NewOrder) -> Result<Order, SettlementError>;
        async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, SettlementError>;
        async fn fetch_order_for_user(&self, order_id: i64, user_id: i64) -> Result<Option<Order>, SettlementError>;
        async fn fetch_order_view(&self, order_id: i64) -> Result<Option<OrderView>, SettlementError>;
        async fn fetch_orders_for_user(&self, user_id: i64, pagination: &Pagination) -> Result<(Vec<OrderView>, i64), SettlementError>;
        async fn update_order_status(&self, order_id: i64, status: OrderStatusType) -> Result<Order, SettlementError>;
        async fn farmer_supplies_order(&self, order_id: i64, farmer_id: i64) -> Result<bool, SettlementError>;
        async fn record_settlement(&self, order_id: i64, attempt: SettlementAttempt) -> Result<Payment, SettlementError>;
        async fn fetch_payment_for_user(&self, order_id: i64, user_id: i64) -> Result<Option<Payment>, SettlementError>;
        async fn fetch_farm(&self, farm_id: i64) -> Result<Option<Farm>, SettlementError>;
        async fn fetch_payments_for_farm(&self, farm_id: i64) -> Result<Vec<FarmPayment>, SettlementError>;
        async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, SettlementError>;
    }
}
