pub mod catalog;
pub mod coupon;
pub mod errors;
pub mod inbox;
pub mod money;
pub mod notification;
pub mod order;
pub mod paging;
pub mod password;
pub mod payment;
pub mod ports;
pub mod rbac;
pub mod shopping;
pub mod templates;
pub mod user;
