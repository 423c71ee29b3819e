pub mod auth_service;
pub mod cache;
pub mod catalog_service;
pub mod checkout_service;
pub mod coupon_service;
pub mod inbox_service;
pub mod notification_dispatcher;
pub mod order_status_service;
pub mod payment_service;
pub mod shopping_service;
