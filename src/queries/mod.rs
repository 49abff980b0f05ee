//! Plain-sqlx persistence functions, grouped per aggregate.

pub mod cart;
pub mod category;
pub mod menu;
pub mod order;
pub mod session;
pub mod user;
