//! Instructor endpoints.

use actix_web::{HttpResponse, delete, get, post, put, web};
use tracing::info;

use crate::auth::{AdminAuth, InstructorAuth, hash_password};
use crate::config::AuthSettings;
use crate::db::{DbPool, cascade, instructors};
use crate::error::AppResult;
use crate::models::{
    CreateInstructorRequest, InstructorDeletionResponse, InstructorResponse,
    UpdateInstructorRequest,
};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_instructors)
        .service(create_instructor)
        .service(get_instructor)
        .service(update_instructor)
        .service(delete_instructor);
}

/// bcrypt is CPU bound; keep it off the async workers.
async fn hash_off_thread(password: String, cost: u32) -> AppResult<String> {
    web::block(move || hash_password(&password, cost)).await?
}

#[utoipa::path(
    get,
    path = "/api/v1/instructors",
    tag = "Instructors",
    responses((status = 200, description = "All instructors", body = Vec<InstructorResponse>)),
    security(("bearer" = []))
)]
#[get("/instructors")]
pub async fn list_instructors(_auth: InstructorAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let rows = instructors::list(pool.connection()).await?;
    let body: Vec<InstructorResponse> = rows.into_iter().map(InstructorResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Create an instructor.
///
/// Authorization: admin bearer token or X-Admin-Key (bootstrap)
#[utoipa::path(
    post,
    path = "/api/v1/instructors",
    tag = "Instructors",
    request_body = CreateInstructorRequest,
    responses(
        (status = 201, description = "Instructor created", body = InstructorResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "Id or email already registered")
    ),
    security(("bearer" = []), ("admin_key" = []))
)]
#[post("/instructors")]
pub async fn create_instructor(
    auth: AdminAuth,
    pool: web::Data<DbPool>,
    settings: web::Data<AuthSettings>,
    body: web::Json<CreateInstructorRequest>,
) -> AppResult<HttpResponse> {
    body.validate()?;
    let password_hash = hash_off_thread(body.password.clone(), settings.bcrypt_cost).await?;
    let instructor = instructors::insert(pool.connection(), &body, password_hash).await?;

    info!(
        "Instructor {} created by {}",
        instructor.id, auth.caller.instructor_id
    );
    Ok(HttpResponse::Created().json(InstructorResponse::from(instructor)))
}

#[utoipa::path(
    get,
    path = "/api/v1/instructors/{id}",
    tag = "Instructors",
    params(("id" = String, Path, description = "Instructor id")),
    responses(
        (status = 200, description = "Instructor", body = InstructorResponse),
        (status = 404, description = "Instructor not found")
    ),
    security(("bearer" = []))
)]
#[get("/instructors/{id}")]
pub async fn get_instructor(
    _auth: InstructorAuth,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let instructor = instructors::get(pool.connection(), &path).await?;
    Ok(HttpResponse::Ok().json(InstructorResponse::from(instructor)))
}

#[utoipa::path(
    put,
    path = "/api/v1/instructors/{id}",
    tag = "Instructors",
    params(("id" = String, Path, description = "Instructor id")),
    request_body = UpdateInstructorRequest,
    responses(
        (status = 200, description = "Instructor updated", body = InstructorResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Instructor not found"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer" = []), ("admin_key" = []))
)]
#[put("/instructors/{id}")]
pub async fn update_instructor(
    _auth: AdminAuth,
    pool: web::Data<DbPool>,
    settings: web::Data<AuthSettings>,
    path: web::Path<String>,
    body: web::Json<UpdateInstructorRequest>,
) -> AppResult<HttpResponse> {
    body.validate()?;
    let password_hash = match body.password.clone() {
        Some(password) => Some(hash_off_thread(password, settings.bcrypt_cost).await?),
        None => None,
    };
    let instructor = instructors::update(pool.connection(), &path, &body, password_hash).await?;

    info!("Updated instructor {}", instructor.id);
    Ok(HttpResponse::Ok().json(InstructorResponse::from(instructor)))
}

/// Delete an instructor and every class section they teach, with the
/// sections' recaps, attendance records and enrollments.
#[utoipa::path(
    delete,
    path = "/api/v1/instructors/{id}",
    tag = "Instructors",
    params(("id" = String, Path, description = "Instructor id")),
    responses(
        (status = 200, description = "Instructor and dependents deleted", body = InstructorDeletionResponse),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Instructor not found")
    ),
    security(("bearer" = []), ("admin_key" = []))
)]
#[delete("/instructors/{id}")]
pub async fn delete_instructor(
    _auth: AdminAuth,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let deletion = cascade::delete_instructor(pool.connection(), &path).await?;
    Ok(HttpResponse::Ok().json(InstructorDeletionResponse::from(deletion)))
}
