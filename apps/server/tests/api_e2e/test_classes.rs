//! E2E tests: class sections, enrollments and recognition models.

use actix_web::test;
use attendance_server::services::BlobStore;
use serde_json::json;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_create_class_for_self_and_list_mine() {
    let ctx = TestContext::new().await;
    seed_instructor(&ctx.pool, "00001").await;
    seed_class(&ctx.pool, "CLSOTHER", "00002").await;
    let app = create_test_app(&ctx).await;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/classes")
            .insert_header(bearer("00001"))
            .set_json(json!({"course_id": "IF101", "schedule": "Tue 10:00", "room": "B2"})),
    )
    .await;
    assert_eq!(status, 201, "{}", body);
    assert_eq!(body["instructor_id"], "00001");
    assert_eq!(body["course_name"], "Course IF101");
    let id = body["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 8);

    let (status, body) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/classes/mine")
            .insert_header(bearer("00001")),
    )
    .await;
    assert_eq!(status, 200);
    let mine = body.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["id"], id.as_str());

    let (status, body) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/classes")
            .insert_header(bearer("00001")),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/classes/{}", id))
            .insert_header(bearer("00002")),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["room"], "B2");
}

#[actix_rt::test]
async fn test_create_class_with_unknown_course_is_invalid() {
    let ctx = TestContext::new().await;
    seed_instructor(&ctx.pool, "00001").await;
    let app = create_test_app(&ctx).await;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/classes")
            .insert_header(bearer("00001"))
            .set_json(json!({"course_id": "NOPE"})),
    )
    .await;
    assert_eq!(status, 400, "{}", body);
}

#[actix_rt::test]
async fn test_admin_creates_class_for_other_instructor() {
    let ctx = TestContext::new().await;
    seed_instructor(&ctx.pool, "00001").await;
    seed_course(&ctx.pool, "IF101").await;
    let app = create_test_app(&ctx).await;

    let payload = json!({"instructor_id": "00001", "course_id": "IF101"});

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/admin/classes")
            .insert_header(bearer("00001"))
            .set_json(payload.clone()),
    )
    .await;
    assert_eq!(status, 403);

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/admin/classes")
            .insert_header(bearer(ADMIN_ID))
            .set_json(payload),
    )
    .await;
    assert_eq!(status, 201, "{}", body);
    assert_eq!(body["instructor_id"], "00001");
}

#[actix_rt::test]
async fn test_update_class_ownership_rules() {
    let ctx = TestContext::new().await;
    seed_class(&ctx.pool, "CLS00001", "00001").await;
    seed_instructor(&ctx.pool, "00002").await;
    let app = create_test_app(&ctx).await;

    let (status, _) = send(
        &app,
        test::TestRequest::put()
            .uri("/api/v1/classes/CLS00001")
            .insert_header(bearer("00002"))
            .set_json(json!({"room": "C3"})),
    )
    .await;
    assert_eq!(status, 403, "non-owners cannot edit");

    let (status, _) = send(
        &app,
        test::TestRequest::put()
            .uri("/api/v1/classes/CLS00001")
            .insert_header(bearer("00001"))
            .set_json(json!({"instructor_id": "00002"})),
    )
    .await;
    assert_eq!(status, 403, "owners cannot hand a class away");

    let (status, body) = send(
        &app,
        test::TestRequest::put()
            .uri("/api/v1/classes/CLS00001")
            .insert_header(bearer("00001"))
            .set_json(json!({"room": "C3"})),
    )
    .await;
    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["room"], "C3");

    let (status, body) = send(
        &app,
        test::TestRequest::put()
            .uri("/api/v1/classes/CLS00001")
            .insert_header(bearer(ADMIN_ID))
            .set_json(json!({"instructor_id": "00002"})),
    )
    .await;
    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["instructor_id"], "00002");
}

#[actix_rt::test]
async fn test_enrollment_lifecycle() {
    let ctx = TestContext::new().await;
    seed_class(&ctx.pool, "CLS00001", "00001").await;
    seed_student(&ctx.pool, "S1").await;
    let app = create_test_app(&ctx).await;

    let enroll = |student: &str| {
        test::TestRequest::post()
            .uri("/api/v1/classes/CLS00001/students")
            .insert_header(bearer("00001"))
            .set_json(json!({"student_id": student}))
    };

    let (status, body) = send(&app, enroll("S1")).await;
    assert_eq!(status, 201, "{}", body);
    assert_eq!(body["student_id"], "S1");

    let (status, _) = send(&app, enroll("S1")).await;
    assert_eq!(status, 409);

    let (status, _) = send(&app, enroll("GHOST")).await;
    assert_eq!(status, 404);

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/classes/NOPE0000/students")
            .insert_header(bearer("00001"))
            .set_json(json!({"student_id": "S1"})),
    )
    .await;
    assert_eq!(status, 404);

    let (status, body) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/classes/CLS00001/students")
            .insert_header(bearer("00001")),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body[0]["id"], "S1");

    let unenroll = || {
        test::TestRequest::delete()
            .uri("/api/v1/classes/CLS00001/students/S1")
            .insert_header(bearer("00001"))
    };
    let (status, _) = send(&app, unenroll()).await;
    assert_eq!(status, 200);
    let (status, _) = send(&app, unenroll()).await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_merge_model_requires_enrolled_students() {
    let ctx = TestContext::new().await;
    seed_class(&ctx.pool, "CLS00001", "00001").await;
    seed_student(&ctx.pool, "S1").await;
    seed_student(&ctx.pool, "S2").await;
    let app = create_test_app(&ctx).await;

    let merge = || {
        test::TestRequest::post()
            .uri("/api/v1/classes/CLS00001/model")
            .insert_header(bearer("00001"))
    };

    let (status, _) = send(&app, merge()).await;
    assert_eq!(status, 404);

    seed_enrollment(&ctx.pool, "CLS00001", "S1").await;
    seed_enrollment(&ctx.pool, "CLS00001", "S2").await;

    let (status, body) = send(&app, merge()).await;
    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["students_processed"], json!(["S1", "S2"]));
    assert_eq!(body["total_encoded_faces"], 6);
}

#[actix_rt::test]
async fn test_recognition_failure_is_bad_gateway() {
    let mut ctx = TestContext::new().await;
    ctx.recognition_fails = true;
    seed_class(&ctx.pool, "CLS00001", "00001").await;
    seed_student(&ctx.pool, "S1").await;
    seed_enrollment(&ctx.pool, "CLS00001", "S1").await;
    let app = create_test_app(&ctx).await;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/classes/CLS00001/model")
            .insert_header(bearer("00001")),
    )
    .await;
    assert_eq!(status, 502, "{}", body);
    assert_eq!(body["error"], "RECOGNITION_ERROR");
}

#[actix_rt::test]
async fn test_download_model() {
    let ctx = TestContext::new().await;
    seed_class(&ctx.pool, "CLS00001", "00001").await;
    let app = create_test_app(&ctx).await;

    let download = || {
        test::TestRequest::get()
            .uri("/api/v1/classes/CLS00001/model")
            .insert_header(bearer("00001"))
    };

    let (status, _) = send(&app, download()).await;
    assert_eq!(status, 404);

    ctx.blobs
        .upload("models/CLS00001", b"model-bytes".to_vec(), None)
        .await
        .unwrap();

    let resp = test::call_service(&app, download().to_request()).await;
    assert_eq!(resp.status().as_u16(), 200);
    let disposition = resp
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.contains("CLS00001.dat"), "{}", disposition);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"model-bytes");
}
