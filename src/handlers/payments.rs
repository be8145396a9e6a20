use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::payments::{MidtransClient, StripeClient};

use super::responses::ok;

#[derive(Debug, Deserialize, ToSchema)]
pub struct StripePaymentRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    #[schema(value_type = Object)]
    pub address: Option<Value>,
    /// Amount in the currency's smallest unit (e.g. cents).
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MidtransPaymentRequest {
    pub amount: Option<i64>,
    pub email: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MidtransStatusRequest {
    pub order_id: Option<String>,
}

/// POST /payments/stripe
///
/// Opaque pass-through: creates a customer, an ephemeral key and a payment
/// intent, and reports the resulting secrets back to the caller. No payment
/// state is kept here.
#[utoipa::path(
    post,
    path = "/payments/stripe",
    request_body = StripePaymentRequest,
    responses(
        (status = 200, description = "Payment intent created"),
        (status = 400, description = "Missing required field"),
        (status = 500, description = "Provider error"),
    ),
    tag = "payments"
)]
pub async fn stripe_payment(
    stripe: web::Data<StripeClient>,
    body: web::Json<StripePaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let (Some(email), Some(name), Some(amount), Some(currency)) =
        (body.email, body.name, body.amount, body.currency)
    else {
        return Err(AppError::Validation(
            "Email, name, amount, and currency are required.".to_string(),
        ));
    };
    let description = body.description.unwrap_or_default();

    let customer = stripe
        .create_customer(&email, &name, body.address.as_ref())
        .await?;
    let customer_id = customer["id"]
        .as_str()
        .ok_or_else(|| AppError::Internal("Unexpected Stripe customer response.".to_string()))?
        .to_string();

    let ephemeral_key = stripe.create_ephemeral_key(&customer_id).await?;
    let intent = stripe
        .create_payment_intent(amount, &currency, &customer_id, &description)
        .await?;

    Ok(ok(
        "Payment intent created successfully.",
        json!({
            "payment_intent": intent["client_secret"],
            "ephemeral_key": ephemeral_key["secret"],
            "customer": customer_id,
            "publishable_key": stripe.publishable_key,
        }),
    ))
}

/// POST /payments/midtrans
///
/// Creates a Snap transaction under a generated numeric reference and
/// returns the provider token and redirect URL.
#[utoipa::path(
    post,
    path = "/payments/midtrans",
    request_body = MidtransPaymentRequest,
    responses(
        (status = 200, description = "Transaction created"),
        (status = 400, description = "Missing required field"),
        (status = 500, description = "Provider error"),
    ),
    tag = "payments"
)]
pub async fn midtrans_payment(
    midtrans: web::Data<MidtransClient>,
    body: web::Json<MidtransPaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let (Some(amount), Some(email)) = (body.amount, body.email) else {
        return Err(AppError::Validation(
            "Amount and email are required.".to_string(),
        ));
    };
    let description = body.description.unwrap_or_default();

    let reference = MidtransClient::generate_reference();
    let transaction = midtrans
        .create_transaction(&reference, amount, &email, &description)
        .await?;

    Ok(ok(
        "Transaction created successfully.",
        json!({
            "order_id": reference,
            "token": transaction["token"],
            "redirect_url": transaction["redirect_url"],
        }),
    ))
}

/// POST /payments/midtrans/check-status
#[utoipa::path(
    post,
    path = "/payments/midtrans/check-status",
    request_body = MidtransStatusRequest,
    responses(
        (status = 200, description = "Transaction status"),
        (status = 400, description = "Missing order id"),
        (status = 404, description = "Transaction does not exist"),
        (status = 500, description = "Provider error"),
    ),
    tag = "payments"
)]
pub async fn midtrans_status(
    midtrans: web::Data<MidtransClient>,
    body: web::Json<MidtransStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let Some(order_id) = body.into_inner().order_id else {
        return Err(AppError::Validation("Order ID is required.".to_string()));
    };

    log::info!("checking Midtrans status for order_id {order_id}");
    let transaction = midtrans.transaction_status(&order_id).await?;

    // Midtrans reports unknown transactions as a 200 body with
    // status_code "404".
    if transaction["status_code"].as_str() == Some("404") {
        return Err(AppError::NotFound("Transaction doesn't exist.".to_string()));
    }

    Ok(ok(
        "Transaction status retrieved successfully.",
        json!({ "status": transaction["transaction_status"] }),
    ))
}
