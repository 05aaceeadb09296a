//! Class section endpoints: sections, enrollments, recognition models and recap listings.

use actix_web::http::header::{ContentDisposition, ContentType, DispositionParam, DispositionType};
use actix_web::{HttpResponse, delete, get, post, put, web};
use tracing::info;

use crate::auth::{AdminAuth, InstructorAuth};
use crate::db::class_sections::{self, NewClassSection};
use crate::db::{DbPool, cascade, enrollments, recaps};
use crate::entity::{class_section, course};
use crate::error::{AppError, AppResult};
use crate::models::{
    AdminCreateClassSectionRequest, ClassSectionDeletionResponse, ClassSectionResponse,
    CreateClassSectionRequest, EnrollStudentRequest, EnrollmentResponse, MessageResponse,
    RecapResponse, StudentResponse, UpdateClassSectionRequest,
};
use crate::services::storage::class_model_key;
use crate::services::{BlobStore, MergeOutcome, RecognitionService};

/// Register routes. `/classes/mine` must precede `/classes/{id}`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_my_classes)
        .service(list_classes)
        .service(create_class)
        .service(admin_create_class)
        .service(get_class)
        .service(update_class)
        .service(delete_class)
        .service(list_class_students)
        .service(enroll_student)
        .service(unenroll_student)
        .service(merge_model)
        .service(download_model)
        .service(list_class_recaps);
}

fn with_course(rows: Vec<(class_section::Model, Option<course::Model>)>) -> Vec<ClassSectionResponse> {
    rows.into_iter()
        .map(|(section, course)| {
            ClassSectionResponse::from(section).with_course_name(course.map(|c| c.name))
        })
        .collect()
}

async fn section_response(
    pool: &DbPool,
    section: class_section::Model,
) -> AppResult<ClassSectionResponse> {
    let name = class_sections::course_name(pool.connection(), &section.course_id).await?;
    Ok(ClassSectionResponse::from(section).with_course_name(name))
}

/// Load a section the caller may modify.
async fn managed_section(
    pool: &DbPool,
    auth: &InstructorAuth,
    id: &str,
) -> AppResult<class_section::Model> {
    let section = class_sections::get(pool.connection(), id).await?;
    if !auth.caller.can_manage(&section.instructor_id) {
        return Err(AppError::Forbidden(format!(
            "Class section {} belongs to another instructor",
            id
        )));
    }
    Ok(section)
}

#[utoipa::path(
    get,
    path = "/api/v1/classes",
    tag = "Classes",
    responses((status = 200, description = "All class sections", body = Vec<ClassSectionResponse>)),
    security(("bearer" = []))
)]
#[get("/classes")]
pub async fn list_classes(_auth: InstructorAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let rows = class_sections::list_with_course(pool.connection()).await?;
    Ok(HttpResponse::Ok().json(with_course(rows)))
}

/// Class sections taught by the caller.
#[utoipa::path(
    get,
    path = "/api/v1/classes/mine",
    tag = "Classes",
    responses((status = 200, description = "Caller's class sections", body = Vec<ClassSectionResponse>)),
    security(("bearer" = []))
)]
#[get("/classes/mine")]
pub async fn list_my_classes(auth: InstructorAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let rows =
        class_sections::list_for_instructor(pool.connection(), &auth.caller.instructor_id).await?;
    Ok(HttpResponse::Ok().json(with_course(rows)))
}

/// Create a class section taught by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/classes",
    tag = "Classes",
    request_body = CreateClassSectionRequest,
    responses(
        (status = 201, description = "Class section created", body = ClassSectionResponse),
        (status = 400, description = "Missing or unknown course"),
        (status = 409, description = "No free class section id could be allocated")
    ),
    security(("bearer" = []))
)]
#[post("/classes")]
pub async fn create_class(
    auth: InstructorAuth,
    pool: web::Data<DbPool>,
    body: web::Json<CreateClassSectionRequest>,
) -> AppResult<HttpResponse> {
    body.validate()?;
    let body = body.into_inner();

    let section = class_sections::create(
        pool.connection(),
        NewClassSection {
            course_id: body.course_id,
            instructor_id: auth.caller.instructor_id,
            schedule: body.schedule,
            room: body.room,
        },
    )
    .await?;

    Ok(HttpResponse::Created().json(section_response(&pool, section).await?))
}

/// Create a class section for any instructor.
#[utoipa::path(
    post,
    path = "/api/v1/admin/classes",
    tag = "Classes",
    request_body = AdminCreateClassSectionRequest,
    responses(
        (status = 201, description = "Class section created", body = ClassSectionResponse),
        (status = 400, description = "Missing or unknown course or instructor"),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "No free class section id could be allocated")
    ),
    security(("bearer" = []), ("admin_key" = []))
)]
#[post("/admin/classes")]
pub async fn admin_create_class(
    _auth: AdminAuth,
    pool: web::Data<DbPool>,
    body: web::Json<AdminCreateClassSectionRequest>,
) -> AppResult<HttpResponse> {
    body.validate()?;
    let body = body.into_inner();

    let section = class_sections::create(
        pool.connection(),
        NewClassSection {
            course_id: body.course_id,
            instructor_id: body.instructor_id,
            schedule: body.schedule,
            room: body.room,
        },
    )
    .await?;

    Ok(HttpResponse::Created().json(section_response(&pool, section).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/classes/{id}",
    tag = "Classes",
    params(("id" = String, Path, description = "Class section id")),
    responses(
        (status = 200, description = "Class section", body = ClassSectionResponse),
        (status = 404, description = "Class section not found")
    ),
    security(("bearer" = []))
)]
#[get("/classes/{id}")]
pub async fn get_class(
    _auth: InstructorAuth,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let section = class_sections::get(pool.connection(), &path).await?;
    Ok(HttpResponse::Ok().json(section_response(&pool, section).await?))
}

/// Update a class section. Owners may edit; only admins may reassign.
#[utoipa::path(
    put,
    path = "/api/v1/classes/{id}",
    tag = "Classes",
    params(("id" = String, Path, description = "Class section id")),
    request_body = UpdateClassSectionRequest,
    responses(
        (status = 200, description = "Class section updated", body = ClassSectionResponse),
        (status = 400, description = "Unknown course or instructor"),
        (status = 403, description = "Not the owner, or reassignment without admin role"),
        (status = 404, description = "Class section not found")
    ),
    security(("bearer" = []))
)]
#[put("/classes/{id}")]
pub async fn update_class(
    auth: InstructorAuth,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
    body: web::Json<UpdateClassSectionRequest>,
) -> AppResult<HttpResponse> {
    body.validate()?;
    managed_section(&pool, &auth, &path).await?;

    let section =
        class_sections::update(pool.connection(), &path, &body, auth.caller.is_admin()).await?;
    info!("Updated class section {}", section.id);
    Ok(HttpResponse::Ok().json(section_response(&pool, section).await?))
}

/// Delete a class section with its recaps, attendance and enrollments.
#[utoipa::path(
    delete,
    path = "/api/v1/classes/{id}",
    tag = "Classes",
    params(("id" = String, Path, description = "Class section id")),
    responses(
        (status = 200, description = "Class section deleted", body = ClassSectionDeletionResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Class section not found")
    ),
    security(("bearer" = []))
)]
#[delete("/classes/{id}")]
pub async fn delete_class(
    auth: InstructorAuth,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    managed_section(&pool, &auth, &path).await?;
    let deletion = cascade::delete_class_section(pool.connection(), &path).await?;
    Ok(HttpResponse::Ok().json(ClassSectionDeletionResponse::from(deletion)))
}

#[utoipa::path(
    get,
    path = "/api/v1/classes/{id}/students",
    tag = "Classes",
    params(("id" = String, Path, description = "Class section id")),
    responses(
        (status = 200, description = "Enrolled students", body = Vec<StudentResponse>),
        (status = 404, description = "Class section not found")
    ),
    security(("bearer" = []))
)]
#[get("/classes/{id}/students")]
pub async fn list_class_students(
    _auth: InstructorAuth,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let section = class_sections::get(pool.connection(), &path).await?;
    let students = enrollments::list_students(pool.connection(), &section.id).await?;
    let body: Vec<StudentResponse> = students.into_iter().map(StudentResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    post,
    path = "/api/v1/classes/{id}/students",
    tag = "Classes",
    params(("id" = String, Path, description = "Class section id")),
    request_body = EnrollStudentRequest,
    responses(
        (status = 201, description = "Student enrolled", body = EnrollmentResponse),
        (status = 404, description = "Class section or student not found"),
        (status = 409, description = "Student already enrolled")
    ),
    security(("bearer" = []))
)]
#[post("/classes/{id}/students")]
pub async fn enroll_student(
    _auth: InstructorAuth,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
    body: web::Json<EnrollStudentRequest>,
) -> AppResult<HttpResponse> {
    body.validate()?;
    let enrollment =
        enrollments::enroll(pool.connection(), &path, body.student_id.trim()).await?;
    Ok(HttpResponse::Created().json(EnrollmentResponse::from(enrollment)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/classes/{id}/students/{student_id}",
    tag = "Classes",
    params(
        ("id" = String, Path, description = "Class section id"),
        ("student_id" = String, Path, description = "Student id")
    ),
    responses(
        (status = 200, description = "Enrollment removed", body = MessageResponse),
        (status = 404, description = "Enrollment not found")
    ),
    security(("bearer" = []))
)]
#[delete("/classes/{id}/students/{student_id}")]
pub async fn unenroll_student(
    _auth: InstructorAuth,
    pool: web::Data<DbPool>,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let (class_section_id, student_id) = path.into_inner();
    enrollments::unenroll(pool.connection(), &class_section_id, &student_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new(format!(
        "Student {} removed from {}",
        student_id, class_section_id
    ))))
}

/// Merge the face encodings of every enrolled student into the class model.
#[utoipa::path(
    post,
    path = "/api/v1/classes/{id}/model",
    tag = "Classes",
    params(("id" = String, Path, description = "Class section id")),
    responses(
        (status = 200, description = "Model merged", body = MergeOutcome),
        (status = 404, description = "Class section not found or nobody enrolled"),
        (status = 502, description = "Recognition service failed")
    ),
    security(("bearer" = []))
)]
#[post("/classes/{id}/model")]
pub async fn merge_model(
    _auth: InstructorAuth,
    pool: web::Data<DbPool>,
    recognition: web::Data<dyn RecognitionService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let section = class_sections::get(pool.connection(), &path).await?;
    let student_ids = enrollments::student_ids(pool.connection(), &section.id).await?;
    if student_ids.is_empty() {
        return Err(AppError::NotFound(format!(
            "Enrolled students of class section {}",
            section.id
        )));
    }

    let outcome = recognition.merge_encodings(&section.id, &student_ids).await?;
    info!(
        "Merged model for {}: {} processed, {} failed",
        section.id,
        outcome.students_processed.len(),
        outcome.students_failed.len()
    );
    Ok(HttpResponse::Ok().json(outcome))
}

/// Download the merged recognition model of a class section.
#[utoipa::path(
    get,
    path = "/api/v1/classes/{id}/model",
    tag = "Classes",
    params(("id" = String, Path, description = "Class section id")),
    responses(
        (status = 200, description = "Model file", content_type = "application/octet-stream"),
        (status = 404, description = "Class section or model not found")
    ),
    security(("bearer" = []))
)]
#[get("/classes/{id}/model")]
pub async fn download_model(
    _auth: InstructorAuth,
    pool: web::Data<DbPool>,
    blobs: web::Data<dyn BlobStore>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let section = class_sections::get(pool.connection(), &path).await?;
    let (data, _) = blobs.download(&class_model_key(&section.id)).await?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::octet_stream())
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(format!("{}.dat", section.id))],
        })
        .body(data))
}

#[utoipa::path(
    get,
    path = "/api/v1/classes/{id}/recaps",
    tag = "Classes",
    params(("id" = String, Path, description = "Class section id")),
    responses(
        (status = 200, description = "Recaps ordered by session", body = Vec<RecapResponse>),
        (status = 404, description = "Class section not found")
    ),
    security(("bearer" = []))
)]
#[get("/classes/{id}/recaps")]
pub async fn list_class_recaps(
    _auth: InstructorAuth,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let rows = recaps::list_for_class(pool.connection(), &path).await?;
    let body: Vec<RecapResponse> = rows.into_iter().map(RecapResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}
