//! E2E tests: cascade deletes of class sections, instructors, students and recaps.

use actix_web::test;
use attendance_server::db::cascade;
use attendance_server::entity::{
    attendance_record, class_enrollment, class_section, instructor, recap, student,
};
use attendance_server::error::AppError;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};

use super::test_helpers::*;

/// Deleting a class removes its recaps, their attendance and its enrollments,
/// and nothing belonging to other classes.
#[actix_rt::test]
async fn test_delete_class_section_removes_dependents_only() {
    let ctx = TestContext::new().await;
    seed_two_class_fixture(&ctx.pool, "00001").await;

    let deletion = cascade::delete_class_section(ctx.pool.connection(), "CLS00001")
        .await
        .expect("delete should succeed");

    assert_eq!(deletion.recaps_deleted, 2);
    assert_eq!(deletion.attendance_records_deleted, 3);
    assert_eq!(deletion.enrollments_deleted, 2);

    assert_eq!(count::<class_section::Entity>(&ctx.pool).await, 1);
    assert_eq!(count::<recap::Entity>(&ctx.pool).await, 1);
    assert_eq!(count::<attendance_record::Entity>(&ctx.pool).await, 2);
    assert_eq!(count::<class_enrollment::Entity>(&ctx.pool).await, 2);
    // Students and the instructor are not part of a class closure
    assert_eq!(count::<student::Entity>(&ctx.pool).await, 3);
    assert_eq!(count::<instructor::Entity>(&ctx.pool).await, 1);

    let leftover = attendance_record::Entity::find()
        .filter(attendance_record::Column::RecapId.is_in(["RECAAAA1", "RECAAAA2"]))
        .count(ctx.pool.connection())
        .await
        .unwrap();
    assert_eq!(leftover, 0);
}

/// A second delete of the same class is NotFound, never a second success.
#[actix_rt::test]
async fn test_delete_class_section_twice_is_not_found() {
    let ctx = TestContext::new().await;
    seed_two_class_fixture(&ctx.pool, "00001").await;

    cascade::delete_class_section(ctx.pool.connection(), "CLS00002")
        .await
        .unwrap();
    let second = cascade::delete_class_section(ctx.pool.connection(), "CLS00002").await;

    assert!(matches!(second, Err(AppError::NotFound(_))), "{:?}", second);
}

/// A failure on the last step leaves every row of the closure in place.
#[actix_rt::test]
async fn test_failed_class_delete_rolls_back_everything() {
    let ctx = TestContext::new().await;
    seed_two_class_fixture(&ctx.pool, "00001").await;

    ctx.pool
        .connection()
        .execute_unprepared(
            "CREATE TRIGGER block_class_delete BEFORE DELETE ON class_sections \
             BEGIN SELECT RAISE(ABORT, 'class delete blocked'); END;",
        )
        .await
        .unwrap();

    let result = cascade::delete_class_section(ctx.pool.connection(), "CLS00001").await;
    assert!(matches!(result, Err(AppError::Database(_))), "{:?}", result);

    assert_eq!(count::<class_section::Entity>(&ctx.pool).await, 2);
    assert_eq!(count::<recap::Entity>(&ctx.pool).await, 3);
    assert_eq!(count::<attendance_record::Entity>(&ctx.pool).await, 5);
    assert_eq!(count::<class_enrollment::Entity>(&ctx.pool).await, 4);
}

/// Deleting an instructor removes every class they teach with its closure.
#[actix_rt::test]
async fn test_delete_instructor_removes_all_their_classes() {
    let ctx = TestContext::new().await;
    seed_two_class_fixture(&ctx.pool, "00001").await;
    seed_class(&ctx.pool, "CLS00003", "00002").await;
    seed_enrollment(&ctx.pool, "CLS00003", "S1").await;
    seed_recap(&ctx.pool, "RECCCCC1", "CLS00003", &["S1"]).await;

    let deletion = cascade::delete_instructor(ctx.pool.connection(), "00001")
        .await
        .expect("delete should succeed");

    let mut classes = deletion.class_sections_deleted.clone();
    classes.sort();
    assert_eq!(classes, vec!["CLS00001", "CLS00002"]);
    assert_eq!(deletion.recaps_deleted, 3);
    assert_eq!(deletion.attendance_records_deleted, 5);
    assert_eq!(deletion.enrollments_deleted, 4);

    // The other instructor's class is untouched
    assert_eq!(count::<instructor::Entity>(&ctx.pool).await, 1);
    assert_eq!(count::<class_section::Entity>(&ctx.pool).await, 1);
    assert_eq!(count::<recap::Entity>(&ctx.pool).await, 1);
    assert_eq!(count::<attendance_record::Entity>(&ctx.pool).await, 1);
    assert_eq!(count::<class_enrollment::Entity>(&ctx.pool).await, 1);
}

#[actix_rt::test]
async fn test_failed_instructor_delete_keeps_classes() {
    let ctx = TestContext::new().await;
    seed_two_class_fixture(&ctx.pool, "00001").await;

    ctx.pool
        .connection()
        .execute_unprepared(
            "CREATE TRIGGER block_instructor_delete BEFORE DELETE ON instructors \
             BEGIN SELECT RAISE(ABORT, 'instructor delete blocked'); END;",
        )
        .await
        .unwrap();

    assert!(
        cascade::delete_instructor(ctx.pool.connection(), "00001")
            .await
            .is_err()
    );
    assert_eq!(count::<class_section::Entity>(&ctx.pool).await, 2);
    assert_eq!(count::<recap::Entity>(&ctx.pool).await, 3);
    assert_eq!(count::<attendance_record::Entity>(&ctx.pool).await, 5);
}

/// Deleting a student removes their attendance and enrollments only.
#[actix_rt::test]
async fn test_delete_student_removes_attendance_and_enrollments() {
    let ctx = TestContext::new().await;
    seed_two_class_fixture(&ctx.pool, "00001").await;

    let deletion = cascade::delete_student(ctx.pool.connection(), "S2")
        .await
        .expect("delete should succeed");

    assert_eq!(deletion.attendance_records_deleted, 2);
    assert_eq!(deletion.enrollments_deleted, 2);
    assert_eq!(count::<student::Entity>(&ctx.pool).await, 2);
    // Recaps survive even when they lose an attendee
    assert_eq!(count::<recap::Entity>(&ctx.pool).await, 3);
    assert_eq!(count::<attendance_record::Entity>(&ctx.pool).await, 3);

    let second = cascade::delete_student(ctx.pool.connection(), "S2").await;
    assert!(matches!(second, Err(AppError::NotFound(_))));
}

/// The schema itself refuses to orphan rows.
#[actix_rt::test]
async fn test_foreign_keys_reject_out_of_order_delete() {
    let ctx = TestContext::new().await;
    seed_two_class_fixture(&ctx.pool, "00001").await;

    let result = class_section::Entity::delete_by_id("CLS00001")
        .exec(ctx.pool.connection())
        .await;

    assert!(result.is_err(), "deleting a referenced class must fail");
    assert_eq!(count::<class_section::Entity>(&ctx.pool).await, 2);
}

#[actix_rt::test]
async fn test_delete_class_api_requires_owner() {
    let ctx = TestContext::new().await;
    seed_two_class_fixture(&ctx.pool, "00001").await;
    seed_instructor(&ctx.pool, "00002").await;
    let app = create_test_app(&ctx).await;

    let (status, body) = send(
        &app,
        test::TestRequest::delete()
            .uri("/api/v1/classes/CLS00001")
            .insert_header(bearer("00002")),
    )
    .await;
    assert_eq!(status, 403, "{}", body);
    assert_eq!(body["error"], "FORBIDDEN");
    assert_eq!(count::<class_section::Entity>(&ctx.pool).await, 2);

    let (status, body) = send(
        &app,
        test::TestRequest::delete()
            .uri("/api/v1/classes/CLS00001")
            .insert_header(bearer("00001")),
    )
    .await;
    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["class_section_id"], "CLS00001");
    assert_eq!(body["recaps_deleted"], 2);
    assert_eq!(body["attendance_records_deleted"], 3);
    assert_eq!(body["enrollments_deleted"], 2);

    let (status, body) = send(
        &app,
        test::TestRequest::delete()
            .uri("/api/v1/classes/CLS00001")
            .insert_header(bearer("00001")),
    )
    .await;
    assert_eq!(status, 404, "{}", body);
}

#[actix_rt::test]
async fn test_admin_deletes_any_class() {
    let ctx = TestContext::new().await;
    seed_two_class_fixture(&ctx.pool, "00001").await;
    let app = create_test_app(&ctx).await;

    let (status, _) = send(
        &app,
        test::TestRequest::delete()
            .uri("/api/v1/classes/CLS00002")
            .insert_header(bearer(ADMIN_ID)),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(count::<class_section::Entity>(&ctx.pool).await, 1);
}

#[actix_rt::test]
async fn test_delete_instructor_api() {
    let ctx = TestContext::new().await;
    seed_two_class_fixture(&ctx.pool, "00001").await;
    let app = create_test_app(&ctx).await;

    let (status, _) = send(
        &app,
        test::TestRequest::delete()
            .uri("/api/v1/instructors/00001")
            .insert_header(bearer("00001")),
    )
    .await;
    assert_eq!(status, 403, "only admins delete instructors");

    let (status, body) = send(
        &app,
        test::TestRequest::delete()
            .uri("/api/v1/instructors/00001")
            .insert_header(("X-Admin-Key", TEST_ADMIN_KEY)),
    )
    .await;
    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["instructor_id"], "00001");
    assert_eq!(body["class_sections_deleted"].as_array().unwrap().len(), 2);
    assert_eq!(body["recaps_deleted"], 3);
    assert_eq!(count::<class_section::Entity>(&ctx.pool).await, 0);
    assert_eq!(count::<attendance_record::Entity>(&ctx.pool).await, 0);

    let (status, _) = send(
        &app,
        test::TestRequest::delete()
            .uri("/api/v1/instructors/00001")
            .insert_header(("X-Admin-Key", TEST_ADMIN_KEY)),
    )
    .await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_delete_recap_keeps_class() {
    let ctx = TestContext::new().await;
    seed_two_class_fixture(&ctx.pool, "00001").await;
    let app = create_test_app(&ctx).await;

    let (status, body) = send(
        &app,
        test::TestRequest::delete()
            .uri("/api/v1/recaps/RECAAAA1")
            .insert_header(bearer("00001")),
    )
    .await;
    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["attendance_records_deleted"], 2);
    assert_eq!(count::<recap::Entity>(&ctx.pool).await, 2);
    assert_eq!(count::<class_section::Entity>(&ctx.pool).await, 2);
    assert_eq!(count::<class_enrollment::Entity>(&ctx.pool).await, 4);
}
