pub mod admin_orders;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod coupons;
pub mod notifications;
pub mod orders;
pub mod payment;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Marketplace service", description = "Storefront, checkout and back-office API"),
    paths(
        auth::register,
        auth::login,
        orders::create_order,
        orders::list_my_orders,
        orders::get_my_order,
        payment::gateway_status,
        payment::process_payment,
        payment::verify_payment,
        catalog::list_products,
        catalog::get_product,
        catalog::list_categories,
        catalog::list_artisans,
        catalog::list_banners,
        catalog::create_product,
        catalog::update_product,
        catalog::delete_product,
        catalog::create_category,
        catalog::update_category,
        catalog::delete_category,
        catalog::create_artisan,
        catalog::update_artisan,
        catalog::delete_artisan,
        catalog::create_banner,
        catalog::update_banner,
        catalog::delete_banner,
        admin_orders::list_orders,
        admin_orders::get_order,
        admin_orders::update_order,
        cart::get_cart,
        cart::add_to_cart,
        cart::update_cart,
        cart::remove_from_cart,
        cart::cart_count,
        cart::clear_cart,
        cart::get_wishlist,
        cart::add_to_wishlist,
        cart::remove_from_wishlist,
        cart::wishlist_count,
        cart::clear_wishlist,
        coupons::list_coupons,
        coupons::apply_coupon,
        coupons::create_coupon,
        notifications::list_notifications,
        notifications::create_notification,
        notifications::mark_notifications,
        notifications::mark_all_read,
        notifications::delete_notifications,
    ),
    components(schemas(
        auth::RegisterRequest,
        auth::LoginRequest,
        auth::UserResponse,
        orders::CreateOrderRequest,
        orders::CartItemRequest,
        orders::CartProduct,
        orders::AddressRequest,
        orders::OrderSummary,
        orders::OrderResponse,
        orders::OrderItemResponse,
        payment::PaymentRequest,
        payment::VerifyPaymentRequest,
        admin_orders::ListOrdersResponse,
        admin_orders::UpdateOrderRequest,
        crate::domain::catalog::Localized,
        crate::domain::catalog::Product,
        crate::domain::catalog::ProductPage,
        crate::domain::catalog::NewProduct,
        crate::domain::catalog::ProductPatch,
        crate::domain::catalog::Category,
        crate::domain::catalog::CategoryInput,
        crate::domain::catalog::Artisan,
        crate::domain::catalog::ArtisanInput,
        crate::domain::catalog::Banner,
        crate::domain::catalog::BannerInput,
        cart::CartLineRequest,
        cart::ProductRefRequest,
        coupons::ApplyCouponRequest,
        notifications::MarkReadRequest,
        notifications::DeleteNotificationsRequest,
        notifications::CreateNotificationRequest,
        crate::domain::shopping::CartItem,
        crate::domain::shopping::WishlistItem,
        crate::domain::coupon::Coupon,
        crate::domain::coupon::CouponKind,
        crate::domain::coupon::NewCoupon,
        crate::domain::inbox::InboxNotification,
        crate::domain::order::OrderStatus,
        crate::domain::order::PaymentStatus,
        crate::domain::order::PaymentMethod,
        crate::domain::user::Role,
        crate::domain::user::Language,
    )),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "orders", description = "Checkout and order history"),
        (name = "payment", description = "Gateway charges and verification"),
        (name = "catalog", description = "Public storefront catalog"),
        (name = "cart", description = "Saved cart and wishlist"),
        (name = "coupons", description = "Coupon lookup and quotes"),
        (name = "notifications", description = "In-app notification inbox"),
        (name = "admin", description = "Back office"),
    )
)]
pub struct ApiDoc;
