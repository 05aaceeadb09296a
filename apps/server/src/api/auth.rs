//! Login, profile and logout endpoints.

use actix_web::{HttpResponse, Resource, get, post, web};
use tracing::info;

use crate::auth::{self, InstructorAuth};
use crate::config::AuthSettings;
use crate::db::{DbPool, instructors};
use crate::error::{AppError, AppResult};
use crate::models::{InstructorResponse, LoginRequest, LoginResponse, MessageResponse};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(profile).service(logout);
}

/// Login is registered on its own so the server can wrap it in the per-IP throttle.
pub fn login_resource() -> Resource {
    web::resource("/auth/login").route(web::post().to(login))
}

/// Exchange email and password for an access token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid email or password"),
        (status = 429, description = "Too many login attempts from this address")
    )
)]
pub async fn login(
    pool: web::Data<DbPool>,
    settings: web::Data<AuthSettings>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::InvalidInput(
            "email and password are required".to_string(),
        ));
    }

    let response = auth::authenticate(
        pool.connection(),
        settings.get_ref(),
        body.email.trim(),
        &body.password,
    )
    .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Profile of the authenticated instructor.
#[utoipa::path(
    get,
    path = "/api/v1/auth/profile",
    tag = "Auth",
    responses(
        (status = 200, description = "Current instructor", body = InstructorResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Instructor no longer exists")
    ),
    security(("bearer" = []))
)]
#[get("/auth/profile")]
pub async fn profile(auth: InstructorAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let instructor = instructors::get(pool.connection(), &auth.caller.instructor_id).await?;
    Ok(HttpResponse::Ok().json(InstructorResponse::from(instructor)))
}

/// Tokens are stateless; logout only acknowledges so clients can drop theirs.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = []))
)]
#[post("/auth/logout")]
pub async fn logout(auth: InstructorAuth) -> HttpResponse {
    info!("Instructor {} logged out", auth.caller.instructor_id);
    HttpResponse::Ok().json(MessageResponse::new("Logged out"))
}
