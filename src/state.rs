use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::catalog_service::CatalogService;
use crate::application::checkout_service::CheckoutService;
use crate::application::coupon_service::CouponService;
use crate::application::inbox_service::InboxService;
use crate::application::notification_dispatcher::NotificationDispatcher;
use crate::application::order_status_service::OrderStatusService;
use crate::application::payment_service::PaymentService;
use crate::application::shopping_service::ShoppingService;
use crate::config::Config;
use crate::db::DbPool;
use crate::domain::ports::Clock;
use crate::domain::templates::TemplateContext;
use crate::infrastructure::cart_repo::DieselCartRepository;
use crate::infrastructure::catalog_repo::DieselCatalogRepository;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::coupon_repo::DieselCouponRepository;
use crate::infrastructure::inbox_repo::DieselInboxRepository;
use crate::infrastructure::jwt::JwtTokenIssuer;
use crate::infrastructure::notifiers::{LogEmailSender, LogPushSender};
use crate::infrastructure::order_repo::DieselOrderRepository;
use crate::infrastructure::outbox_repo::DieselOutboxRepository;
use crate::infrastructure::password_hasher::Argon2Hasher;
use crate::infrastructure::payment_gateways::{CashOnDelivery, Razorpay, Stripe};
use crate::infrastructure::user_repo::DieselUserRepository;

/// Services shared by every worker; handlers receive it as `web::Data<AppState>`.
pub struct AppState {
    pub auth: AuthService,
    pub checkout: CheckoutService,
    pub order_status: OrderStatusService,
    pub payments: PaymentService,
    pub catalog: CatalogService,
    pub shopping: ShoppingService,
    pub coupons: CouponService,
    pub inbox: InboxService,
    pub notifications: NotificationDispatcher,
}

impl AppState {
    /// Wires every service over Postgres with the real clock and adapters.
    pub fn from_config(pool: DbPool, config: &Config) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let orders = Arc::new(DieselOrderRepository::new(pool.clone()));
        let users = Arc::new(DieselUserRepository::new(pool.clone()));
        let coupons = Arc::new(DieselCouponRepository::new(pool.clone()));
        let templates = TemplateContext {
            brand: config.store_brand,
            base_url: config.app_base_url.clone(),
        };
        let tokens = Arc::new(JwtTokenIssuer::new(
            &config.jwt_secret,
            config.access_token_ttl,
            clock.clone(),
        ));

        AppState {
            auth: AuthService::new(
                users.clone(),
                Arc::new(Argon2Hasher::default()),
                tokens,
                clock.clone(),
            ),
            checkout: CheckoutService::new(
                orders.clone(),
                users.clone(),
                coupons.clone(),
                clock.clone(),
                templates.clone(),
            ),
            order_status: OrderStatusService::new(orders.clone(), users, clock.clone(), templates),
            payments: PaymentService::new(
                Arc::new(CashOnDelivery),
                Arc::new(Razorpay::new(config.razorpay.clone())),
                Arc::new(Stripe::new(config.stripe_secret_key.clone())),
                orders,
                clock.clone(),
            ),
            catalog: CatalogService::new(
                Arc::new(DieselCatalogRepository::new(pool.clone())),
                config.catalog_cache_ttl,
                config.catalog_cache_max_entries,
                clock.clone(),
            ),
            shopping: ShoppingService::new(Arc::new(DieselCartRepository::new(pool.clone()))),
            coupons: CouponService::new(coupons, clock.clone()),
            inbox: InboxService::new(Arc::new(DieselInboxRepository::new(pool.clone()))),
            notifications: NotificationDispatcher::new(
                Arc::new(DieselOutboxRepository::new(pool)),
                Arc::new(LogEmailSender),
                Arc::new(LogPushSender),
                clock,
                config.outbox_max_attempts,
            ),
        }
    }
}
