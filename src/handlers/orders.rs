use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::order::{LineItemInput, NewOrderInput, OrderView};
use crate::errors::AppError;
use crate::AppWorkflow;

use super::responses::{ok, ok_message};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub user_id: Option<Uuid>,
    pub order_status: Option<String>,
    pub items: Option<Vec<OrderItemRequest>>,
    /// Decimal total as a string, e.g. "39.96"
    pub total_price: Option<String>,
    #[schema(value_type = Object)]
    pub shipping_address: Option<Value>,
    pub payment_method: Option<String>,
    pub coupon_code: Option<String>,
    #[schema(value_type = Object)]
    pub order_total: Option<Value>,
    pub tracking_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub order_status: Option<String>,
    pub tracking_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub total_price: String,
    #[schema(value_type = Object)]
    pub order_total: Value,
    #[schema(value_type = Object)]
    pub shipping_address: Value,
    pub payment_method: String,
    pub coupon_code: Option<String>,
    pub tracking_url: Option<String>,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            status: order.status,
            total_price: order.total_price.to_string(),
            order_total: order.order_total,
            shipping_address: order.shipping_address,
            payment_method: order.payment_method,
            coupon_code: order.coupon_code,
            tracking_url: order.tracking_url,
            created_at: order.created_at.to_rfc3339(),
            items: order
                .items
                .into_iter()
                .map(|i| OrderItemResponse {
                    id: i.id,
                    product_id: i.product_id,
                    quantity: i.quantity,
                    unit_price: i.unit_price.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

fn parse_decimal(raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw)
        .map_err(|e| AppError::Validation(format!("Invalid price '{raw}': {e}")))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Creates the order and reserves stock for every line item. Both sides are
/// all-or-nothing: an insufficient or unknown product fails the request
/// without leaving a partial order or partial stock decrement behind.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created", body = CreateOrderResponse),
        (status = 400, description = "Missing required field or insufficient stock"),
        (status = 404, description = "Referenced product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    workflow: web::Data<AppWorkflow>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let (
        Some(user_id),
        Some(items),
        Some(total_price),
        Some(shipping_address),
        Some(payment_method),
        Some(order_total),
    ) = (
        body.user_id,
        body.items,
        body.total_price,
        body.shipping_address,
        body.payment_method,
        body.order_total,
    )
    else {
        return Err(AppError::Validation(
            "user_id, items, total_price, shipping_address, payment_method, and order_total are required."
                .to_string(),
        ));
    };

    let line_items: Result<Vec<LineItemInput>, AppError> = items
        .iter()
        .map(|i| {
            Ok(LineItemInput {
                product_id: i.product_id,
                quantity: i.quantity,
                unit_price: parse_decimal(&i.price)?,
            })
        })
        .collect();

    let input = NewOrderInput {
        user_id,
        status: body.order_status,
        items: line_items?,
        total_price: parse_decimal(&total_price)?,
        order_total,
        shipping_address,
        payment_method,
        coupon_code: body.coupon_code,
        tracking_url: body.tracking_url,
    };

    let order_id = web::block(move || workflow.create_order(input))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)?;

    Ok(ok(
        "Order created successfully.",
        CreateOrderResponse { id: order_id },
    ))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    workflow: web::Data<AppWorkflow>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || workflow.get_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)?;

    match order {
        Some(order) => Ok(ok(
            "Order retrieved successfully.",
            OrderResponse::from(order),
        )),
        None => Err(AppError::NotFound("Order not found.".to_string())),
    }
}

/// GET /orders
///
/// Paginated list of orders, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    workflow: web::Data<AppWorkflow>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);

    let result = web::block(move || workflow.list_orders(page, limit))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)?;

    Ok(ok(
        "Orders retrieved successfully.",
        ListOrdersResponse {
            items: result.items.into_iter().map(OrderResponse::from).collect(),
            total: result.total,
            page,
            limit,
        },
    ))
}

/// GET /orders/by-user/{user_id}
#[utoipa::path(
    get,
    path = "/orders/by-user/{user_id}",
    params(("user_id" = Uuid, Path, description = "User UUID")),
    responses(
        (status = 200, description = "The user's orders"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders_by_user(
    workflow: web::Data<AppWorkflow>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    let orders = web::block(move || workflow.list_orders_by_user(user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)?;

    let data: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(ok("Orders retrieved successfully.", data))
}

/// PUT /orders/{id}
///
/// Updates status and tracking URL. Transitioning into `cancelled` releases
/// the order's stock; repeating the cancellation does not release again.
#[utoipa::path(
    put,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 400, description = "Missing order status"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_order(
    workflow: web::Data<AppWorkflow>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let body = body.into_inner();
    let Some(status) = body.order_status else {
        return Err(AppError::Validation("Order status is required.".to_string()));
    };

    let order = web::block(move || {
        workflow.update_status(order_id, &status, body.tracking_url.as_deref())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?
    .map_err(AppError::from)?;

    Ok(ok("Order updated successfully.", OrderResponse::from(order)))
}

/// DELETE /orders/{id}
///
/// Removes the order and hands its line items back to the inventory ledger.
#[utoipa::path(
    delete,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order deleted"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn delete_order(
    workflow: web::Data<AppWorkflow>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    web::block(move || workflow.delete_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)?;

    Ok(ok_message("Order deleted successfully."))
}
