//! Course endpoints.

use actix_web::{HttpResponse, get, post, put, web};
use tracing::info;

use crate::auth::InstructorAuth;
use crate::db::{DbPool, courses};
use crate::error::AppResult;
use crate::models::{CourseResponse, CreateCourseRequest, UpdateCourseRequest};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_courses)
        .service(create_course)
        .service(get_course)
        .service(update_course);
}

#[utoipa::path(
    get,
    path = "/api/v1/courses",
    tag = "Courses",
    responses((status = 200, description = "All courses", body = Vec<CourseResponse>)),
    security(("bearer" = []))
)]
#[get("/courses")]
pub async fn list_courses(_auth: InstructorAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let rows = courses::list(pool.connection()).await?;
    let body: Vec<CourseResponse> = rows.into_iter().map(CourseResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses",
    tag = "Courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Course code already exists")
    ),
    security(("bearer" = []))
)]
#[post("/courses")]
pub async fn create_course(
    _auth: InstructorAuth,
    pool: web::Data<DbPool>,
    body: web::Json<CreateCourseRequest>,
) -> AppResult<HttpResponse> {
    body.validate()?;
    let course = courses::insert(pool.connection(), &body).await?;
    info!("Created course {}", course.id);
    Ok(HttpResponse::Created().json(CourseResponse::from(course)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    tag = "Courses",
    params(("id" = String, Path, description = "Course code")),
    responses(
        (status = 200, description = "Course", body = CourseResponse),
        (status = 404, description = "Course not found")
    ),
    security(("bearer" = []))
)]
#[get("/courses/{id}")]
pub async fn get_course(
    _auth: InstructorAuth,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let course = courses::get(pool.connection(), &path).await?;
    Ok(HttpResponse::Ok().json(CourseResponse::from(course)))
}

#[utoipa::path(
    put,
    path = "/api/v1/courses/{id}",
    tag = "Courses",
    params(("id" = String, Path, description = "Course code")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Course not found")
    ),
    security(("bearer" = []))
)]
#[put("/courses/{id}")]
pub async fn update_course(
    _auth: InstructorAuth,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
    body: web::Json<UpdateCourseRequest>,
) -> AppResult<HttpResponse> {
    body.validate()?;
    let course = courses::update(pool.connection(), &path, &body).await?;
    info!("Updated course {}", course.id);
    Ok(HttpResponse::Ok().json(CourseResponse::from(course)))
}
