use actix_web::{web, HttpResponse};
use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth;
use crate::db::DbPool;
use crate::domain::ports::Mailer;
use crate::errors::AppError;
use crate::infrastructure::models::{NewUserRow, UserChangeset, UserRow};
use crate::schema::users;

use super::responses::{ok, ok_message};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub new_password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /users
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn list_users(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let rows = web::block(move || {
        let mut conn = pool.get()?;
        Ok::<_, AppError>(
            users::table
                .select(UserRow::as_select())
                .load(&mut conn)?,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let data: Vec<UserResponse> = rows.into_iter().map(UserResponse::from).collect();
    Ok(ok("Users retrieved successfully.", data))
}

/// POST /users/register
#[utoipa::path(
    post,
    path = "/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User created"),
        (status = 400, description = "Missing required field"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn register(
    pool: web::Data<DbPool>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let (Some(name), Some(email), Some(password)) = (body.name, body.email, body.password) else {
        return Err(AppError::Validation(
            "Name, password, and email are required.".to_string(),
        ));
    };

    web::block(move || {
        let password_hash = auth::hash_password(&password)?;
        let mut conn = pool.get()?;
        diesel::insert_into(users::table)
            .values(&NewUserRow {
                id: Uuid::new_v4(),
                name: name.to_lowercase(),
                email: email.to_lowercase(),
                password_hash,
            })
            .execute(&mut conn)?;
        Ok::<_, AppError>(())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(ok_message("User created successfully."))
}

/// POST /users/login
#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful"),
        (status = 401, description = "Invalid name or password"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn login(
    pool: web::Data<DbPool>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let (Some(name), Some(password)) = (body.name, body.password) else {
        return Err(AppError::Validation(
            "Name and password are required.".to_string(),
        ));
    };

    let user = web::block(move || {
        let mut conn = pool.get()?;
        let user = users::table
            .filter(users::name.eq(name.to_lowercase()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(user) = user else {
            return Err(AppError::Unauthorized(
                "Invalid name or password.".to_string(),
            ));
        };
        if !auth::verify_password(&password, &user.password_hash) {
            return Err(AppError::Unauthorized(
                "Invalid name or password.".to_string(),
            ));
        }
        Ok(user)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(ok("Login successful.", UserResponse::from(user)))
}

/// GET /users/{id}
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User UUID")),
    responses(
        (status = 200, description = "User found"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn get_user(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    let user = web::block(move || {
        let mut conn = pool.get()?;
        Ok::<_, AppError>(
            users::table
                .find(user_id)
                .select(UserRow::as_select())
                .first(&mut conn)
                .optional()?,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match user {
        Some(user) => Ok(ok("User retrieved successfully.", UserResponse::from(user))),
        None => Err(AppError::NotFound("User not found.".to_string())),
    }
}

/// PUT /users/{id}
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User UUID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated"),
        (status = 400, description = "Missing required field"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn update_user(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let body = body.into_inner();
    let (Some(name), Some(password)) = (body.name, body.password) else {
        return Err(AppError::Validation(
            "Name and password are required.".to_string(),
        ));
    };

    let updated = web::block(move || {
        let password_hash = auth::hash_password(&password)?;
        let mut conn = pool.get()?;
        Ok::<_, AppError>(
            diesel::update(users::table.find(user_id))
                .set(&UserChangeset {
                    name: Some(name.to_lowercase()),
                    password_hash: Some(password_hash),
                    reset_token: None,
                    reset_token_expires: None,
                    updated_at: Utc::now(),
                })
                .returning(UserRow::as_returning())
                .get_result(&mut conn)
                .optional()?,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match updated {
        Some(user) => Ok(ok("User updated successfully.", UserResponse::from(user))),
        None => Err(AppError::NotFound("User not found.".to_string())),
    }
}

/// DELETE /users/{id}
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User UUID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn delete_user(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    let deleted = web::block(move || {
        let mut conn = pool.get()?;
        Ok::<_, AppError>(diesel::delete(users::table.find(user_id)).execute(&mut conn)?)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    if deleted == 0 {
        return Err(AppError::NotFound("User not found.".to_string()));
    }
    Ok(ok_message("User deleted successfully."))
}

/// POST /users/forgot-password
///
/// Stores a short numeric reset token with a one hour expiry and hands the
/// notification off to the mailer.
#[utoipa::path(
    post,
    path = "/users/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset mail sent"),
        (status = 400, description = "Missing email"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn forgot_password(
    pool: web::Data<DbPool>,
    mailer: web::Data<dyn Mailer>,
    body: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let Some(email) = body.into_inner().email else {
        return Err(AppError::Validation("Email is required.".to_string()));
    };

    let token: String = rand::thread_rng().gen_range(10_000..100_000u32).to_string();
    let stored_token = token.clone();

    let user = web::block(move || {
        let mut conn = pool.get()?;
        let user = users::table
            .filter(users::email.eq(email.to_lowercase()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(user) = user else {
            return Err(AppError::NotFound("User not found.".to_string()));
        };

        diesel::update(users::table.find(user.id))
            .set(&UserChangeset {
                name: None,
                password_hash: None,
                reset_token: Some(Some(stored_token)),
                reset_token_expires: Some(Some(Utc::now() + Duration::hours(1))),
                updated_at: Utc::now(),
            })
            .execute(&mut conn)?;
        Ok(user)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    mailer
        .send(
            &user.email,
            "Password Reset",
            &format!(
                "You are receiving this because a password reset was requested for \
                 your account.\n\nYour password reset token is: {token}\n\nIf you did \
                 not request this, ignore this email and your password will remain \
                 unchanged.\n"
            ),
        )
        .map_err(AppError::from)?;

    Ok(ok_message("Password reset email sent."))
}

/// POST /users/reset-password/{token}
#[utoipa::path(
    post,
    path = "/users/reset-password/{token}",
    params(("token" = String, Path, description = "Reset token from the email")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset"),
        (status = 400, description = "Missing password, or invalid/expired token"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn reset_password(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
    body: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let token = path.into_inner();
    let Some(new_password) = body.into_inner().new_password else {
        return Err(AppError::Validation("New password is required.".to_string()));
    };

    web::block(move || {
        let mut conn = pool.get()?;
        let user = users::table
            .filter(users::reset_token.eq(&token))
            .filter(users::reset_token_expires.gt(Utc::now()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(user) = user else {
            return Err(AppError::Validation(
                "Password reset token is invalid or has expired.".to_string(),
            ));
        };

        let password_hash = auth::hash_password(&new_password)?;
        diesel::update(users::table.find(user.id))
            .set(&UserChangeset {
                name: None,
                password_hash: Some(password_hash),
                reset_token: Some(None),
                reset_token_expires: Some(None),
                updated_at: Utc::now(),
            })
            .execute(&mut conn)?;
        Ok(())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(ok_message("Password has been reset."))
}
