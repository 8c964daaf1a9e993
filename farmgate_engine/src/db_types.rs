use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use fg_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConversionError(String);

//--------------------------------------        Role          ---------------------------------------------------------
/// The role attached to an authenticated marketplace user. Farmers sell produce through their farms; buyers place
/// and pay for orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Farmer,
    Buyer,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Farmer => write!(f, "FARMER"),
            Role::Buyer => write!(f, "BUYER"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FARMER" => Ok(Self::Farmer),
            "BUYER" => Ok(Self::Buyer),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------       Actor          ---------------------------------------------------------
/// An authenticated caller, as resolved by the upstream authentication service. The engine never sees credentials;
/// it only ever acts on behalf of an `Actor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub role: Role,
}

impl Actor {
    pub fn new(id: i64, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_farmer(&self) -> bool {
        self.role == Role::Farmer
    }
}

//--------------------------------------   OrderStatusType    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatusType {
    /// The order has been created and stock reserved, but payment has not been settled.
    Pending,
    /// Payment has settled and the order is being prepared.
    Processing,
    /// The order has left the farm.
    Shipped,
    /// The order has arrived. Terminal.
    Delivered,
    /// The order was cancelled. Terminal.
    Cancelled,
}

impl OrderStatusType {
    /// A terminal order accepts no further status changes.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatusType::Delivered | OrderStatusType::Cancelled)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "PENDING"),
            OrderStatusType::Processing => write!(f, "PROCESSING"),
            OrderStatusType::Shipped => write!(f, "SHIPPED"),
            OrderStatusType::Delivered => write!(f, "DELIVERED"),
            OrderStatusType::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "PROCESSING" => Ok(Self::Processing),
            "SHIPPED" => Ok(Self::Shipped),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELLED" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------  PaymentStatusType   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatusType {
    Pending,
    Completed,
    Failed,
}

impl Display for PaymentStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatusType::Pending => write!(f, "PENDING"),
            PaymentStatusType::Completed => write!(f, "COMPLETED"),
            PaymentStatusType::Failed => write!(f, "FAILED"),
        }
    }
}

//--------------------------------------    PaymentMethod     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Card,
    BankTransfer,
    MobileMoney,
    Cash,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Card => write!(f, "CARD"),
            PaymentMethod::BankTransfer => write!(f, "BANK_TRANSFER"),
            PaymentMethod::MobileMoney => write!(f, "MOBILE_MONEY"),
            PaymentMethod::Cash => write!(f, "CASH"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CARD" => Ok(Self::Card),
            "BANK_TRANSFER" => Ok(Self::BankTransfer),
            "MOBILE_MONEY" => Ok(Self::MobileMoney),
            "CASH" => Ok(Self::Cash),
            s => Err(ConversionError(format!("Invalid payment method: {s}"))),
        }
    }
}

//--------------------------------------       Product        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    /// Stock on hand. Never negative; only mutated through the guarded reservation update.
    pub quantity_available: i64,
    pub farm_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------        Farm          ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Farm {
    pub id: i64,
    pub name: String,
    pub farmer_id: i64,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------        Order         ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    /// Sum of `unit_price × quantity` over the order's items, captured at placement. Never recomputed.
    pub total: Money,
    pub status: OrderStatusType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      OrderItem       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// The product price at the time the order was placed. Later catalog price changes do not affect this.
    pub unit_price: Money,
}

//--------------------------------------      CartItem        ---------------------------------------------------------
/// One requested line of a new order, as submitted by a buyer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: i64,
    pub quantity: i64,
}

//--------------------------------------      NewOrder        ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: i64,
    pub items: Vec<CartItem>,
}

impl NewOrder {
    pub fn new(user_id: i64, items: Vec<CartItem>) -> Self {
        Self { user_id, items }
    }
}

//--------------------------------------       Payment        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    /// Each order carries at most one payment record, created lazily on the first settlement attempt.
    pub order_id: i64,
    pub amount: Money,
    pub method: PaymentMethod,
    pub status: PaymentStatusType,
    /// Opaque identity generated afresh for every settlement attempt.
    pub transaction_id: String,
    /// Set only when the payment completed.
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
