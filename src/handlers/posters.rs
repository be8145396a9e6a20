use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::errors::AppError;
use crate::infrastructure::models::{NewPosterRow, PosterRow};
use crate::schema::posters;

use super::responses::{ok, ok_message};

const NO_IMAGE_URL: &str = "no_url";

#[derive(Debug, Deserialize, ToSchema)]
pub struct PosterRequest {
    pub name: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PosterResponse {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<PosterRow> for PosterResponse {
    fn from(row: PosterRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            image_url: row.image_url,
            created_at: row.created_at,
        }
    }
}

/// GET /posters
#[utoipa::path(
    get,
    path = "/posters",
    responses(
        (status = 200, description = "All posters"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "posters"
)]
pub async fn list_posters(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let rows = web::block(move || {
        let mut conn = pool.get()?;
        Ok::<_, AppError>(
            posters::table
                .select(PosterRow::as_select())
                .load(&mut conn)?,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let data: Vec<PosterResponse> = rows.into_iter().map(PosterResponse::from).collect();
    Ok(ok("Posters retrieved successfully.", data))
}

/// GET /posters/{id}
#[utoipa::path(
    get,
    path = "/posters/{id}",
    params(("id" = Uuid, Path, description = "Poster UUID")),
    responses(
        (status = 200, description = "Poster found"),
        (status = 404, description = "Poster not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "posters"
)]
pub async fn get_poster(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let poster_id = path.into_inner();

    let poster = web::block(move || {
        let mut conn = pool.get()?;
        Ok::<_, AppError>(
            posters::table
                .find(poster_id)
                .select(PosterRow::as_select())
                .first(&mut conn)
                .optional()?,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match poster {
        Some(row) => Ok(ok("Poster retrieved successfully.", PosterResponse::from(row))),
        None => Err(AppError::NotFound("Poster not found.".to_string())),
    }
}

/// POST /posters
#[utoipa::path(
    post,
    path = "/posters",
    request_body = PosterRequest,
    responses(
        (status = 200, description = "Poster created"),
        (status = 400, description = "Missing required field"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "posters"
)]
pub async fn create_poster(
    pool: web::Data<DbPool>,
    body: web::Json<PosterRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let Some(name) = body.name else {
        return Err(AppError::Validation("Name is required.".to_string()));
    };
    let image_url = body.image_url.unwrap_or_else(|| NO_IMAGE_URL.to_string());

    let created = web::block(move || {
        let mut conn = pool.get()?;
        let row = NewPosterRow {
            id: Uuid::new_v4(),
            name,
            image_url,
        };
        Ok::<_, AppError>(
            diesel::insert_into(posters::table)
                .values(&row)
                .returning(PosterRow::as_returning())
                .get_result(&mut conn)?,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(ok(
        "Poster created successfully.",
        PosterResponse::from(created),
    ))
}

/// PUT /posters/{id}
#[utoipa::path(
    put,
    path = "/posters/{id}",
    params(("id" = Uuid, Path, description = "Poster UUID")),
    request_body = PosterRequest,
    responses(
        (status = 200, description = "Poster updated"),
        (status = 400, description = "Missing required field"),
        (status = 404, description = "Poster not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "posters"
)]
pub async fn update_poster(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<PosterRequest>,
) -> Result<HttpResponse, AppError> {
    let poster_id = path.into_inner();
    let body = body.into_inner();
    let (Some(name), Some(image_url)) = (body.name, body.image_url) else {
        return Err(AppError::Validation(
            "Name and image are required.".to_string(),
        ));
    };

    let updated = web::block(move || {
        let mut conn = pool.get()?;
        Ok::<_, AppError>(
            diesel::update(posters::table.find(poster_id))
                .set((
                    posters::name.eq(name),
                    posters::image_url.eq(image_url),
                    posters::updated_at.eq(diesel::dsl::now),
                ))
                .execute(&mut conn)?,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    if updated == 0 {
        return Err(AppError::NotFound("Poster not found.".to_string()));
    }
    Ok(ok_message("Poster updated successfully."))
}

/// DELETE /posters/{id}
#[utoipa::path(
    delete,
    path = "/posters/{id}",
    params(("id" = Uuid, Path, description = "Poster UUID")),
    responses(
        (status = 200, description = "Poster deleted"),
        (status = 404, description = "Poster not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "posters"
)]
pub async fn delete_poster(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let poster_id = path.into_inner();

    let deleted = web::block(move || {
        let mut conn = pool.get()?;
        Ok::<_, AppError>(diesel::delete(posters::table.find(poster_id)).execute(&mut conn)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    if deleted == 0 {
        return Err(AppError::NotFound("Poster not found.".to_string()));
    }
    Ok(ok_message("Poster deleted successfully."))
}
