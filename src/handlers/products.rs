use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::errors::AppError;
use crate::infrastructure::models::{NewProductRow, ProductChangeset, ProductRow};
use crate::schema::products;

use super::responses::{ok, ok_message};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i32>,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: Option<String>,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub price: String,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ProductRow> for ProductResponse {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            quantity: row.quantity,
            price: row.price.to_string(),
            category_id: row.category_id,
            image_url: row.image_url,
            created_at: row.created_at,
        }
    }
}

fn parse_price(raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw)
        .map_err(|e| AppError::Validation(format!("Invalid price '{raw}': {e}")))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /products
#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "All products"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn list_products(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let rows = web::block(move || {
        let mut conn = pool.get()?;
        Ok::<_, AppError>(
            products::table
                .select(ProductRow::as_select())
                .order(products::created_at.desc())
                .load(&mut conn)?,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let data: Vec<ProductResponse> = rows.into_iter().map(ProductResponse::from).collect();
    Ok(ok("Products retrieved successfully.", data))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product found"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn get_product(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();

    let product = web::block(move || {
        let mut conn = pool.get()?;
        Ok::<_, AppError>(
            products::table
                .find(product_id)
                .select(ProductRow::as_select())
                .first(&mut conn)
                .optional()?,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match product {
        Some(row) => Ok(ok(
            "Product retrieved successfully.",
            ProductResponse::from(row),
        )),
        None => Err(AppError::NotFound("Product not found.".to_string())),
    }
}

/// POST /products
#[utoipa::path(
    post,
    path = "/products",
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product created"),
        (status = 400, description = "Missing or invalid field"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn create_product(
    pool: web::Data<DbPool>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let (Some(name), Some(quantity), Some(price)) = (body.name, body.quantity, body.price) else {
        return Err(AppError::Validation(
            "Name, quantity, and price are required.".to_string(),
        ));
    };
    if quantity < 0 {
        return Err(AppError::Validation(
            "Quantity must not be negative.".to_string(),
        ));
    }
    let price = parse_price(&price)?;

    let created = web::block(move || {
        let mut conn = pool.get()?;
        let row = NewProductRow {
            id: Uuid::new_v4(),
            name,
            description: body.description,
            quantity,
            price,
            category_id: body.category_id,
            image_url: body.image_url,
        };
        Ok::<_, AppError>(
            diesel::insert_into(products::table)
                .values(&row)
                .returning(ProductRow::as_returning())
                .get_result(&mut conn)?,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(ok(
        "Product created successfully.",
        ProductResponse::from(created),
    ))
}

/// PUT /products/{id}
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product updated"),
        (status = 400, description = "Missing or invalid field"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn update_product(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let body = body.into_inner();
    let (Some(name), Some(quantity), Some(price)) = (body.name, body.quantity, body.price) else {
        return Err(AppError::Validation(
            "Name, quantity, and price are required.".to_string(),
        ));
    };
    if quantity < 0 {
        return Err(AppError::Validation(
            "Quantity must not be negative.".to_string(),
        ));
    }
    let price = parse_price(&price)?;

    let updated = web::block(move || {
        let mut conn = pool.get()?;
        Ok::<_, AppError>(
            diesel::update(products::table.find(product_id))
                .set(&ProductChangeset {
                    name: Some(name),
                    description: Some(body.description),
                    quantity: Some(quantity),
                    price: Some(price),
                    category_id: Some(body.category_id),
                    image_url: Some(body.image_url),
                    updated_at: Utc::now(),
                })
                .returning(ProductRow::as_returning())
                .get_result(&mut conn)
                .optional()?,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match updated {
        Some(row) => Ok(ok(
            "Product updated successfully.",
            ProductResponse::from(row),
        )),
        None => Err(AppError::NotFound("Product not found.".to_string())),
    }
}

/// DELETE /products/{id}
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn delete_product(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();

    let deleted = web::block(move || {
        let mut conn = pool.get()?;
        Ok::<_, AppError>(diesel::delete(products::table.find(product_id)).execute(&mut conn)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    if deleted == 0 {
        return Err(AppError::NotFound("Product not found.".to_string()));
    }
    Ok(ok_message("Product deleted successfully."))
}
