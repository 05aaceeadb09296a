//! Shared test helpers for API E2E tests.

use std::sync::Arc;

use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{App, dev::ServiceResponse, test, web};
use async_trait::async_trait;
use attendance_server::api::{self, UploadLimits};
use attendance_server::auth::{AdminKey, create_access_token, hash_password};
use attendance_server::config::AuthSettings;
use attendance_server::db::class_sections::{self, NewClassSection};
use attendance_server::db::{DbPool, courses, enrollments, instructors, recaps, students};
use attendance_server::error::{AppError, AppResult};
use attendance_server::middleware::RequestLogger;
use attendance_server::models::{
    AttendanceEntry, CreateCourseRequest, CreateInstructorRequest, CreateRecapRequest,
    CreateStudentRequest, Role,
};
use attendance_server::services::{
    BlobObject, BlobStore, EncodeOutcome, MemoryBlobStore, MergeOutcome, RecognitionService,
};
use attendance_server::services::storage::student_folder;
use sea_orm::{ConnectOptions, Database, EntityTrait, PaginatorTrait};
use secrecy::SecretString;
use serde_json::Value;

/// Admin key used in tests.
pub const TEST_ADMIN_KEY: &str = "test-admin-key-for-api-e2e";

/// Instructor id that is granted the admin role.
pub const ADMIN_ID: &str = "00000";

/// Password of every seeded instructor.
pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub const PUBLIC_BASE_URL: &str = "http://blobs.test/attendance";

/// Client address attached to login requests; the throttle keys on it.
pub const CLIENT_ADDR: &str = "203.0.113.7:40000";

pub fn auth_settings() -> AuthSettings {
    AuthSettings {
        jwt_secret: SecretString::from("api-e2e-secret"),
        token_ttl_secs: 600,
        admin_instructor_id: ADMIN_ID.to_string(),
        admin_key: Some(TEST_ADMIN_KEY.to_string()),
        bcrypt_cost: 4,
    }
}

/// Fresh migrated in-memory database. One connection keeps it alive.
pub async fn create_test_pool() -> DbPool {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let conn = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");

    let pool = DbPool::from_connection(conn);
    pool.run_migrations().await.expect("Failed to run migrations");
    pool
}

pub async fn count<E: EntityTrait>(pool: &DbPool) -> u64
where
    E::Model: Sync,
{
    E::find()
        .count(pool.connection())
        .await
        .expect("Failed to count rows")
}

/// Recognition service that answers without any network.
pub struct StubRecognition {
    pub fail: bool,
}

#[async_trait]
impl RecognitionService for StubRecognition {
    async fn encode(&self, student_id: &str) -> AppResult<EncodeOutcome> {
        if self.fail {
            return Err(AppError::Recognition("no face found".to_string()));
        }
        Ok(EncodeOutcome {
            student_id: student_id.to_string(),
            message: "encoded".to_string(),
            encoded_faces: 3,
            uploaded: true,
            output_path: Some(format!("encodings/{}.pkl", student_id)),
        })
    }

    async fn merge_encodings(
        &self,
        class_section_id: &str,
        student_ids: &[String],
    ) -> AppResult<MergeOutcome> {
        if self.fail {
            return Err(AppError::Recognition("merge failed".to_string()));
        }
        Ok(MergeOutcome {
            class_section_id: class_section_id.to_string(),
            message: "merged".to_string(),
            total_encoded_faces: student_ids.len() as u32 * 3,
            students_processed: student_ids.to_vec(),
            students_failed: Vec::new(),
            uploaded: true,
            model_path: Some(format!("models/{}", class_section_id)),
        })
    }
}

/// Blob store whose every call fails, as an unreachable bucket would.
pub struct UnavailableBlobStore;

#[async_trait]
impl BlobStore for UnavailableBlobStore {
    async fn upload(&self, key: &str, _data: Vec<u8>, _content_type: Option<&str>) -> AppResult<()> {
        Err(AppError::Storage(format!("Failed to upload {}: bucket unreachable", key)))
    }

    async fn download(&self, key: &str) -> AppResult<(Vec<u8>, Option<String>)> {
        Err(AppError::Storage(format!("Failed to get {}: bucket unreachable", key)))
    }

    async fn list(&self, prefix: &str) -> AppResult<Vec<BlobObject>> {
        Err(AppError::Storage(format!("Failed to list {}: bucket unreachable", prefix)))
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        Err(AppError::Storage(format!("Failed to delete {}: bucket unreachable", key)))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", PUBLIC_BASE_URL, key)
    }
}

/// Everything a test app shares with the test body.
pub struct TestContext {
    pub pool: DbPool,
    pub blobs: Arc<MemoryBlobStore>,
    pub recognition_fails: bool,
    /// Serve `UnavailableBlobStore` instead of `blobs`
    pub storage_fails: bool,
    /// Back-to-back logins one address may make
    pub login_burst: u32,
}

impl TestContext {
    pub async fn new() -> Self {
        Self {
            pool: create_test_pool().await,
            blobs: Arc::new(MemoryBlobStore::new(PUBLIC_BASE_URL)),
            recognition_fails: false,
            storage_fails: false,
            login_burst: 5,
        }
    }
}

/// Create the full app under `/api/v1`.
pub async fn create_test_app(
    ctx: &TestContext,
) -> impl actix_web::dev::Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> + use<>
{
    let blobs: Arc<dyn BlobStore> = if ctx.storage_fails {
        Arc::new(UnavailableBlobStore)
    } else {
        ctx.blobs.clone()
    };
    let recognition: Arc<dyn RecognitionService> = Arc::new(StubRecognition {
        fail: ctx.recognition_fails,
    });
    let login_governor = GovernorConfigBuilder::default()
        .seconds_per_request(3600)
        .burst_size(ctx.login_burst)
        .finish()
        .expect("Failed to build login throttle");

    test::init_service(
        App::new()
            .wrap(RequestLogger)
            .app_data(web::Data::new(ctx.pool.clone()))
            .app_data(web::Data::new(auth_settings()))
            .app_data(web::Data::new(AdminKey::new(Some(TEST_ADMIN_KEY.to_string()))))
            .app_data(web::Data::from(blobs))
            .app_data(web::Data::from(recognition))
            .app_data(web::Data::new(UploadLimits {
                max_upload_size: 1024,
            }))
            .service(
                web::scope("/api/v1")
                    .service(api::auth::login_resource().wrap(Governor::new(&login_governor)))
                    .configure(api::configure_routes),
            ),
    )
    .await
}

/// `Authorization` header value for an instructor.
pub fn bearer(instructor_id: &str) -> (&'static str, String) {
    let role = Role::for_instructor(instructor_id, ADMIN_ID);
    let token = create_access_token(instructor_id, role, &auth_settings())
        .expect("Failed to sign test token");
    ("Authorization", format!("Bearer {}", token))
}

/// Send a request and return the status with the JSON body (Null when empty).
pub async fn send<S>(app: &S, req: test::TestRequest) -> (u16, Value)
where
    S: actix_web::dev::Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status().as_u16();
    let body = test::read_body(resp).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, value)
}

pub async fn seed_instructor(pool: &DbPool, id: &str) {
    if instructors::find_by_id(pool.connection(), id)
        .await
        .expect("Failed to look up instructor")
        .is_some()
    {
        return;
    }
    let req = CreateInstructorRequest {
        id: id.to_string(),
        name: format!("Instructor {}", id),
        email: format!("{}@campus.test", id),
        password: TEST_PASSWORD.to_string(),
        photo_url: None,
        functional_position: None,
        program: None,
        competence: None,
    };
    let hash = hash_password(TEST_PASSWORD, 4).expect("Failed to hash password");
    instructors::insert(pool.connection(), &req, hash)
        .await
        .expect("Failed to seed instructor");
}

pub async fn seed_course(pool: &DbPool, id: &str) {
    if courses::find_by_id(pool.connection(), id)
        .await
        .expect("Failed to look up course")
        .is_some()
    {
        return;
    }
    let req = CreateCourseRequest {
        id: id.to_string(),
        name: format!("Course {}", id),
        credits: 3,
    };
    courses::insert(pool.connection(), &req)
        .await
        .expect("Failed to seed course");
}

pub async fn seed_student(pool: &DbPool, id: &str) {
    let req = CreateStudentRequest {
        id: id.to_string(),
        name: format!("Student {}", id),
        program: "Informatika".to_string(),
    };
    students::insert(pool.connection(), &req, student_folder(id))
        .await
        .expect("Failed to seed student");
}

/// Class section with a fixed id under course IF101.
pub async fn seed_class(pool: &DbPool, id: &str, instructor_id: &str) {
    seed_instructor(pool, instructor_id).await;
    seed_course(pool, "IF101").await;
    let new = NewClassSection {
        course_id: "IF101".to_string(),
        instructor_id: instructor_id.to_string(),
        schedule: Some("Mon 08:00".to_string()),
        room: Some("R101".to_string()),
    };
    class_sections::create_with(pool.connection(), new, || id.to_string())
        .await
        .expect("Failed to seed class section");
}

pub async fn seed_enrollment(pool: &DbPool, class_section_id: &str, student_id: &str) {
    enrollments::enroll(pool.connection(), class_section_id, student_id)
        .await
        .expect("Failed to seed enrollment");
}

/// Recap with a fixed id; every listed student is marked present.
pub async fn seed_recap(pool: &DbPool, id: &str, class_section_id: &str, student_ids: &[&str]) {
    let req = recap_request(class_section_id, student_ids);
    recaps::create_recap_with(pool.connection(), &req, || id.to_string())
        .await
        .expect("Failed to seed recap");
}

pub fn recap_request(class_section_id: &str, student_ids: &[&str]) -> CreateRecapRequest {
    CreateRecapRequest {
        class_section_id: class_section_id.to_string(),
        session_index: 1,
        duration_minutes: 100,
        attendance: student_ids
            .iter()
            .map(|id| AttendanceEntry {
                student_id: id.to_string(),
                present: true,
            })
            .collect(),
    }
}

/// Two classes of one instructor, each with students, enrollments and recaps.
///
/// CLS00001: S1, S2 enrolled, recaps RECAAAA1 (S1, S2) and RECAAAA2 (S1)
/// CLS00002: S2, S3 enrolled, recap RECBBBB1 (S2, S3)
pub async fn seed_two_class_fixture(pool: &DbPool, instructor_id: &str) {
    seed_class(pool, "CLS00001", instructor_id).await;
    seed_class(pool, "CLS00002", instructor_id).await;
    for student in ["S1", "S2", "S3"] {
        seed_student(pool, student).await;
    }
    seed_enrollment(pool, "CLS00001", "S1").await;
    seed_enrollment(pool, "CLS00001", "S2").await;
    seed_enrollment(pool, "CLS00002", "S2").await;
    seed_enrollment(pool, "CLS00002", "S3").await;
    seed_recap(pool, "RECAAAA1", "CLS00001", &["S1", "S2"]).await;
    seed_recap(pool, "RECAAAA2", "CLS00001", &["S1"]).await;
    seed_recap(pool, "RECBBBB1", "CLS00002", &["S2", "S3"]).await;
}
