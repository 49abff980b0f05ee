//! Row types shared by queries and route handlers.
//!
//! Prices and totals are integer minor units; arithmetic on them is exact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User role, stored as TEXT
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Role {
    Customer,
    Staff,
    Admin,
}

/// Order lifecycle, stored as TEXT
///
/// PENDING -> CONFIRMED -> PREPARING -> DELIVERING -> COMPLETED, forward
/// only; PENDING/CONFIRMED/PREPARING may also go to CANCELLED. COMPLETED
/// and CANCELLED are terminal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Delivering,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_final(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Confirmed, Preparing)
                | (Preparing, Delivering)
                | (Delivering, Completed)
                | (Pending | Confirmed | Preparing, Cancelled)
        )
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Role,
    pub enabled: bool,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One active session; deleting the row revokes the token
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub id: i64,
    pub user_id: Uuid,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub category_id: Option<i64>,
    pub image_url: Option<String>,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Cart {
    pub id: i64,
    pub user_id: Uuid,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartLine {
    pub id: i64,
    pub cart_id: i64,
    pub menu_item_id: i64,
    pub quantity: i64,
}

/// Cart line joined with its menu item for display
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartLineDetail {
    pub menu_item_id: i64,
    pub name: String,
    pub price: i64,
    pub quantity: i64,
}

impl CartLineDetail {
    pub fn subtotal(&self) -> i64 {
        self.price * self.quantity
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_number: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub delivery_address: String,
    pub notes: Option<String>,
    pub status: OrderStatus,
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
}

/// Order line; `price_at_order` is a permanent snapshot taken at checkout
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderLine {
    pub id: i64,
    pub order_id: Uuid,
    pub menu_item_id: i64,
    pub quantity: i64,
    pub price_at_order: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_forward_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Preparing));
        assert!(OrderStatus::Preparing.can_transition_to(OrderStatus::Delivering));
        assert!(OrderStatus::Delivering.can_transition_to(OrderStatus::Completed));
    }

    #[test]
    fn test_status_cancellation() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Preparing.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivering.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_final_statuses_are_terminal() {
        for next in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::Delivering,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert!(!OrderStatus::Completed.can_transition_to(next));
            assert!(!OrderStatus::Cancelled.can_transition_to(next));
        }
        assert!(OrderStatus::Completed.is_final());
        assert!(OrderStatus::Cancelled.is_final());
        assert!(!OrderStatus::Pending.is_final());
    }

    #[test]
    fn test_no_backward_or_skipping_transitions() {
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Delivering));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Completed));
    }

    #[test]
    fn test_role_string_round_trip() {
        use std::str::FromStr;
        assert_eq!(Role::Admin.to_string(), "ADMIN");
        assert_eq!(Role::from_str("CUSTOMER").unwrap(), Role::Customer);
        assert_eq!(OrderStatus::Pending.to_string(), "PENDING");
    }
}
