//! Recap and attendance endpoints.

use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::auth::InstructorAuth;
use crate::db::{DbPool, cascade, recaps};
use crate::error::AppResult;
use crate::models::{
    AttendanceUpdateResponse, CreateRecapRequest, CreateRecapResponse, RecapDeletionResponse,
    StudentAttendanceResponse, UpdateAttendanceRequest,
};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_recap)
        .service(get_attendance)
        .service(update_attendance)
        .service(delete_recap);
}

/// Record one attendance session.
///
/// Unknown student ids do not fail the request; they are returned in `skipped`.
#[utoipa::path(
    post,
    path = "/api/v1/recaps",
    tag = "Recaps",
    request_body = CreateRecapRequest,
    responses(
        (status = 201, description = "Recap created", body = CreateRecapResponse),
        (status = 400, description = "Missing class section id or invalid session"),
        (status = 404, description = "Class section not found"),
        (status = 409, description = "No free recap id could be allocated")
    ),
    security(("bearer" = []))
)]
#[post("/recaps")]
pub async fn create_recap(
    _auth: InstructorAuth,
    pool: web::Data<DbPool>,
    body: web::Json<CreateRecapRequest>,
) -> AppResult<HttpResponse> {
    let created = recaps::create_recap(pool.connection(), &body).await?;
    Ok(HttpResponse::Created().json(CreateRecapResponse::from(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/recaps/{id}/attendance",
    tag = "Recaps",
    params(("id" = String, Path, description = "Recap id")),
    responses(
        (status = 200, description = "Attendance with student names", body = Vec<StudentAttendanceResponse>),
        (status = 404, description = "Recap not found")
    ),
    security(("bearer" = []))
)]
#[get("/recaps/{id}/attendance")]
pub async fn get_attendance(
    _auth: InstructorAuth,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let rows = recaps::attendance_with_names(pool.connection(), &path).await?;
    let body: Vec<StudentAttendanceResponse> = rows.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    put,
    path = "/api/v1/recaps/{id}/attendance",
    tag = "Recaps",
    params(("id" = String, Path, description = "Recap id")),
    request_body = UpdateAttendanceRequest,
    responses(
        (status = 200, description = "Presence flags updated", body = AttendanceUpdateResponse),
        (status = 404, description = "Recap not found")
    ),
    security(("bearer" = []))
)]
#[put("/recaps/{id}/attendance")]
pub async fn update_attendance(
    _auth: InstructorAuth,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
    body: web::Json<UpdateAttendanceRequest>,
) -> AppResult<HttpResponse> {
    let recap_id = path.into_inner();
    let outcome = recaps::update_attendance(pool.connection(), &recap_id, &body.attendance).await?;

    Ok(HttpResponse::Ok().json(AttendanceUpdateResponse {
        recap_id,
        updated: outcome.updated,
        skipped: outcome.skipped,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/recaps/{id}",
    tag = "Recaps",
    params(("id" = String, Path, description = "Recap id")),
    responses(
        (status = 200, description = "Recap and attendance deleted", body = RecapDeletionResponse),
        (status = 404, description = "Recap not found")
    ),
    security(("bearer" = []))
)]
#[delete("/recaps/{id}")]
pub async fn delete_recap(
    _auth: InstructorAuth,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let deletion = cascade::delete_recap(pool.connection(), &path).await?;
    Ok(HttpResponse::Ok().json(RecapDeletionResponse::from(deletion)))
}
