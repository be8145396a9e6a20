use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::errors::AppError;
use crate::infrastructure::models::{CategoryRow, NewCategoryRow};
use crate::schema::{categories, products};

use super::responses::{ok, ok_message};

/// Placeholder stored when a category is created without an image.
const NO_IMAGE_URL: &str = "no_url";

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryRequest {
    pub name: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<CategoryRow> for CategoryResponse {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            image_url: row.image_url,
            created_at: row.created_at,
        }
    }
}

/// GET /categories
#[utoipa::path(
    get,
    path = "/categories",
    responses(
        (status = 200, description = "All categories"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "categories"
)]
pub async fn list_categories(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let rows = web::block(move || {
        let mut conn = pool.get()?;
        Ok::<_, AppError>(
            categories::table
                .select(CategoryRow::as_select())
                .load(&mut conn)?,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let data: Vec<CategoryResponse> = rows.into_iter().map(CategoryResponse::from).collect();
    Ok(ok("Categories retrieved successfully.", data))
}

/// GET /categories/{id}
#[utoipa::path(
    get,
    path = "/categories/{id}",
    params(("id" = Uuid, Path, description = "Category UUID")),
    responses(
        (status = 200, description = "Category found"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "categories"
)]
pub async fn get_category(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let category_id = path.into_inner();

    let category = web::block(move || {
        let mut conn = pool.get()?;
        Ok::<_, AppError>(
            categories::table
                .find(category_id)
                .select(CategoryRow::as_select())
                .first(&mut conn)
                .optional()?,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match category {
        Some(row) => Ok(ok(
            "Category retrieved successfully.",
            CategoryResponse::from(row),
        )),
        None => Err(AppError::NotFound("Category not found.".to_string())),
    }
}

/// POST /categories
#[utoipa::path(
    post,
    path = "/categories",
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category created"),
        (status = 400, description = "Missing required field"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "categories"
)]
pub async fn create_category(
    pool: web::Data<DbPool>,
    body: web::Json<CategoryRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let Some(name) = body.name else {
        return Err(AppError::Validation("Name is required.".to_string()));
    };
    let image_url = body.image_url.unwrap_or_else(|| NO_IMAGE_URL.to_string());

    web::block(move || {
        let mut conn = pool.get()?;
        diesel::insert_into(categories::table)
            .values(&NewCategoryRow {
                id: Uuid::new_v4(),
                name,
                image_url,
            })
            .execute(&mut conn)?;
        Ok::<_, AppError>(())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(ok_message("Category created successfully."))
}

/// PUT /categories/{id}
#[utoipa::path(
    put,
    path = "/categories/{id}",
    params(("id" = Uuid, Path, description = "Category UUID")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category updated"),
        (status = 400, description = "Missing required field"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "categories"
)]
pub async fn update_category(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<CategoryRequest>,
) -> Result<HttpResponse, AppError> {
    let category_id = path.into_inner();
    let body = body.into_inner();
    let (Some(name), Some(image_url)) = (body.name, body.image_url) else {
        return Err(AppError::Validation(
            "Name and image are required.".to_string(),
        ));
    };

    let updated = web::block(move || {
        let mut conn = pool.get()?;
        Ok::<_, AppError>(
            diesel::update(categories::table.find(category_id))
                .set((
                    categories::name.eq(name),
                    categories::image_url.eq(image_url),
                    categories::updated_at.eq(diesel::dsl::now),
                ))
                .execute(&mut conn)?,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    if updated == 0 {
        return Err(AppError::NotFound("Category not found.".to_string()));
    }
    Ok(ok_message("Category updated successfully."))
}

/// DELETE /categories/{id}
///
/// Refused while any product still references the category.
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    params(("id" = Uuid, Path, description = "Category UUID")),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 400, description = "Products still reference the category"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "categories"
)]
pub async fn delete_category(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let category_id = path.into_inner();

    web::block(move || {
        let mut conn = pool.get()?;

        let referencing: i64 = products::table
            .filter(products::category_id.eq(category_id))
            .count()
            .get_result(&mut conn)?;
        if referencing > 0 {
            return Err(AppError::Validation(
                "Cannot delete category. Products are referencing it.".to_string(),
            ));
        }

        let deleted = diesel::delete(categories::table.find(category_id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(AppError::NotFound("Category not found.".to_string()));
        }
        Ok(())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(ok_message("Category deleted successfully."))
}
