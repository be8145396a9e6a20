use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::users::list_users,
        crate::handlers::users::register,
        crate::handlers::users::login,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::users::forgot_password,
        crate::handlers::users::reset_password,
        crate::handlers::categories::list_categories,
        crate::handlers::categories::get_category,
        crate::handlers::categories::create_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,
        crate::handlers::posters::list_posters,
        crate::handlers::posters::get_poster,
        crate::handlers::posters::create_poster,
        crate::handlers::posters::update_poster,
        crate::handlers::posters::delete_poster,
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_order,
        crate::handlers::orders::list_orders,
        crate::handlers::orders::list_orders_by_user,
        crate::handlers::orders::update_order,
        crate::handlers::orders::delete_order,
        crate::handlers::payments::stripe_payment,
        crate::handlers::payments::midtrans_payment,
        crate::handlers::payments::midtrans_status,
    ),
    components(schemas(
        crate::handlers::users::RegisterRequest,
        crate::handlers::users::LoginRequest,
        crate::handlers::users::UpdateUserRequest,
        crate::handlers::users::ForgotPasswordRequest,
        crate::handlers::users::ResetPasswordRequest,
        crate::handlers::users::UserResponse,
        crate::handlers::categories::CategoryRequest,
        crate::handlers::categories::CategoryResponse,
        crate::handlers::posters::PosterRequest,
        crate::handlers::posters::PosterResponse,
        crate::handlers::products::ProductRequest,
        crate::handlers::products::ProductResponse,
        crate::handlers::orders::OrderItemRequest,
        crate::handlers::orders::CreateOrderRequest,
        crate::handlers::orders::UpdateOrderRequest,
        crate::handlers::orders::CreateOrderResponse,
        crate::handlers::orders::OrderItemResponse,
        crate::handlers::orders::OrderResponse,
        crate::handlers::orders::ListOrdersResponse,
        crate::handlers::payments::StripePaymentRequest,
        crate::handlers::payments::MidtransPaymentRequest,
        crate::handlers::payments::MidtransStatusRequest,
    )),
    tags(
        (name = "users", description = "User accounts and authentication"),
        (name = "categories", description = "Product categories"),
        (name = "posters", description = "Promotional posters"),
        (name = "products", description = "Product catalog and stock"),
        (name = "orders", description = "Order lifecycle"),
        (name = "payments", description = "Payment provider pass-throughs"),
    )
)]
pub struct ApiDoc;
