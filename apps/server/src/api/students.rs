//! Student endpoints: CRUD, photo storage and face encoding.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, post, put, web};
use futures_util::StreamExt;
use tracing::{info, warn};

use super::UploadLimits;
use crate::auth::InstructorAuth;
use crate::db::{DbPool, cascade, students};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateStudentRequest, DeletePhotoRequest, MessageResponse, StudentDeletionResponse,
    StudentDetailResponse, StudentFileResponse, StudentResponse, UpdateStudentRequest,
};
use crate::services::storage::{
    FOLDER_PLACEHOLDER, content_type_for_extension, sanitize_filename, student_folder,
    student_photo_key,
};
use crate::services::{BlobStore, EncodeOutcome, RecognitionService};

/// Register routes. `/students/photos` must precede `/students/{id}`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(delete_photo)
        .service(list_students)
        .service(create_student)
        .service(get_student)
        .service(update_student)
        .service(delete_student)
        .service(upload_photos)
        .service(encode_student);
}

#[utoipa::path(
    get,
    path = "/api/v1/students",
    tag = "Students",
    responses((status = 200, description = "All students", body = Vec<StudentResponse>)),
    security(("bearer" = []))
)]
#[get("/students")]
pub async fn list_students(_auth: InstructorAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let rows = students::list(pool.connection()).await?;
    let body: Vec<StudentResponse> = rows.into_iter().map(StudentResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Create a student and their photo folder.
#[utoipa::path(
    post,
    path = "/api/v1/students",
    tag = "Students",
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student created", body = StudentResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Student already exists"),
        (status = 500, description = "Folder could not be created; nothing was stored")
    ),
    security(("bearer" = []))
)]
#[post("/students")]
pub async fn create_student(
    _auth: InstructorAuth,
    pool: web::Data<DbPool>,
    blobs: web::Data<dyn BlobStore>,
    body: web::Json<CreateStudentRequest>,
) -> AppResult<HttpResponse> {
    body.validate()?;

    if students::find_by_id(pool.connection(), &body.id).await?.is_some() {
        return Err(AppError::Conflict(format!("Student {} already exists", body.id)));
    }

    // Folder first: a failed upload must not leave a row pointing at nothing
    let folder = student_folder(&body.id);
    let placeholder = format!("{}{}", folder, FOLDER_PLACEHOLDER);
    blobs
        .upload(&placeholder, b"folder initialized".to_vec(), Some("text/plain"))
        .await?;

    let student = match students::insert(pool.connection(), &body, folder.clone()).await {
        Ok(student) => student,
        Err(e) => {
            if let Err(cleanup) = blobs.remove(&placeholder).await {
                warn!("Failed to remove placeholder {}: {}", placeholder, cleanup);
            }
            return Err(e);
        }
    };

    info!("Created student {} (folder={})", student.id, folder);
    Ok(HttpResponse::Created().json(StudentResponse::from(student)))
}

/// Student with the files in their storage folder.
#[utoipa::path(
    get,
    path = "/api/v1/students/{id}",
    tag = "Students",
    params(("id" = String, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student and files", body = StudentDetailResponse),
        (status = 404, description = "Student not found")
    ),
    security(("bearer" = []))
)]
#[get("/students/{id}")]
pub async fn get_student(
    _auth: InstructorAuth,
    pool: web::Data<DbPool>,
    blobs: web::Data<dyn BlobStore>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let student = students::get(pool.connection(), &path).await?;

    let files = blobs
        .list(&student.storage_folder)
        .await?
        .into_iter()
        .filter(|object| object.file_name() != FOLDER_PLACEHOLDER)
        .map(|object| StudentFileResponse {
            name: object.file_name().to_string(),
            url: blobs.public_url(&object.key),
            size: Some(object.size),
            content_type: None,
            path: object.key,
        })
        .collect();

    Ok(HttpResponse::Ok().json(StudentDetailResponse {
        student: student.into(),
        files,
    }))
}

#[utoipa::path(
    put,
    path = "/api/v1/students/{id}",
    tag = "Students",
    params(("id" = String, Path, description = "Student id")),
    request_body = UpdateStudentRequest,
    responses(
        (status = 200, description = "Student updated", body = StudentResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Student not found")
    ),
    security(("bearer" = []))
)]
#[put("/students/{id}")]
pub async fn update_student(
    _auth: InstructorAuth,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
    body: web::Json<UpdateStudentRequest>,
) -> AppResult<HttpResponse> {
    body.validate()?;
    let student = students::update(pool.connection(), &path, &body).await?;
    info!("Updated student {}", student.id);
    Ok(HttpResponse::Ok().json(StudentResponse::from(student)))
}

/// Delete a student with their enrollments and attendance records. Stored
/// photos are left in the blob store.
#[utoipa::path(
    delete,
    path = "/api/v1/students/{id}",
    tag = "Students",
    params(("id" = String, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student deleted", body = StudentDeletionResponse),
        (status = 404, description = "Student not found")
    ),
    security(("bearer" = []))
)]
#[delete("/students/{id}")]
pub async fn delete_student(
    _auth: InstructorAuth,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let deletion = cascade::delete_student(pool.connection(), &path).await?;
    Ok(HttpResponse::Ok().json(StudentDeletionResponse::from(deletion)))
}

/// Upload one or more photos (multipart, any field name).
#[utoipa::path(
    post,
    path = "/api/v1/students/{id}/photos",
    tag = "Students",
    params(("id" = String, Path, description = "Student id")),
    request_body(content_type = "multipart/form-data", description = "One or more image files"),
    responses(
        (status = 201, description = "Photos stored", body = Vec<StudentFileResponse>),
        (status = 400, description = "No files, bad file name or upload too large"),
        (status = 404, description = "Student not found")
    ),
    security(("bearer" = []))
)]
#[post("/students/{id}/photos")]
pub async fn upload_photos(
    _auth: InstructorAuth,
    pool: web::Data<DbPool>,
    blobs: web::Data<dyn BlobStore>,
    limits: web::Data<UploadLimits>,
    path: web::Path<String>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let student = students::get(pool.connection(), &path).await?;
    let mut received = 0usize;
    let mut stored = Vec::new();

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?;

        let Some(raw_name) = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string)
        else {
            // Plain form fields carry no file
            continue;
        };
        let filename = sanitize_filename(&raw_name)
            .ok_or_else(|| AppError::InvalidInput(format!("Invalid file name '{}'", raw_name)))?;

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
            received += chunk.len();
            if received > limits.max_upload_size {
                warn!(
                    "Photo upload for student {} exceeds {} bytes",
                    student.id, limits.max_upload_size
                );
                return Err(AppError::InvalidInput(format!(
                    "Upload exceeds the limit of {} bytes",
                    limits.max_upload_size
                )));
            }
            data.extend_from_slice(&chunk);
        }

        let content_type = field
            .content_type()
            .map(|mime| mime.essence_str().to_string())
            .filter(|mime| mime != "application/octet-stream")
            .unwrap_or_else(|| {
                let ext = filename.rsplit('.').next().unwrap_or_default();
                content_type_for_extension(ext).to_string()
            });

        let key = student_photo_key(&student.id, &filename);
        let size = data.len() as u64;
        blobs.upload(&key, data, Some(&content_type)).await?;

        stored.push(StudentFileResponse {
            name: filename,
            url: blobs.public_url(&key),
            path: key,
            content_type: Some(content_type),
            size: Some(size),
        });
    }

    if stored.is_empty() {
        return Err(AppError::InvalidInput("No files were uploaded".to_string()));
    }

    info!("Stored {} photo(s) for student {}", stored.len(), student.id);
    Ok(HttpResponse::Created().json(stored))
}

/// Remove one stored photo, identified by its path or public URL.
#[utoipa::path(
    delete,
    path = "/api/v1/students/photos",
    tag = "Students",
    request_body = DeletePhotoRequest,
    responses(
        (status = 200, description = "Photo removed", body = MessageResponse),
        (status = 400, description = "Path is not inside a student folder"),
        (status = 404, description = "Photo not found")
    ),
    security(("bearer" = []))
)]
#[delete("/students/photos")]
pub async fn delete_photo(
    _auth: InstructorAuth,
    blobs: web::Data<dyn BlobStore>,
    body: web::Json<DeletePhotoRequest>,
) -> AppResult<HttpResponse> {
    let key = blobs.key_from_reference(body.path.trim());
    if !key.starts_with("students/") || key.ends_with('/') || key.contains("..") {
        return Err(AppError::InvalidInput(format!(
            "'{}' is not a student photo",
            body.path
        )));
    }

    blobs.remove(&key).await?;
    info!("Removed photo {}", key);
    Ok(HttpResponse::Ok().json(MessageResponse::new(format!("Deleted {}", key))))
}

/// Build face encodings from the student's stored photos.
#[utoipa::path(
    post,
    path = "/api/v1/students/{id}/encode",
    tag = "Students",
    params(("id" = String, Path, description = "Student id")),
    responses(
        (status = 200, description = "Encoding finished", body = EncodeOutcome),
        (status = 404, description = "Student not found"),
        (status = 502, description = "Recognition service failed")
    ),
    security(("bearer" = []))
)]
#[post("/students/{id}/encode")]
pub async fn encode_student(
    _auth: InstructorAuth,
    pool: web::Data<DbPool>,
    recognition: web::Data<dyn RecognitionService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let student = students::get(pool.connection(), &path).await?;
    let outcome = recognition.encode(&student.id).await?;

    info!(
        "Encoded {} face(s) for student {}",
        outcome.encoded_faces, student.id
    );
    Ok(HttpResponse::Ok().json(outcome))
}
