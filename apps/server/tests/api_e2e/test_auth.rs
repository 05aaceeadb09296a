//! E2E tests: login, bearer tokens and the bootstrap admin key.

use actix_web::test;
use serde_json::json;

use super::test_helpers::*;

fn login_request(email: &str, password: &str) -> test::TestRequest {
    login_request_from(CLIENT_ADDR, email, password)
}

fn login_request_from(addr: &str, email: &str, password: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .peer_addr(addr.parse().expect("valid socket address"))
        .set_json(json!({"email": email, "password": password}))
}

#[actix_rt::test]
async fn test_login_issues_token_usable_for_profile() {
    let ctx = TestContext::new().await;
    seed_instructor(&ctx.pool, "00001").await;
    let app = create_test_app(&ctx).await;

    let (status, body) = send(&app, login_request("00001@campus.test", TEST_PASSWORD)).await;
    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["instructor_id"], "00001");
    assert_eq!(body["role"], "instructor");
    assert_eq!(body["expires_in"], 600);

    let token = body["access_token"].as_str().unwrap();
    let (status, body) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/auth/profile")
            .insert_header(("Authorization", format!("Bearer {}", token))),
    )
    .await;
    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["email"], "00001@campus.test");
    assert!(body.get("password_hash").is_none());
}

#[actix_rt::test]
async fn test_admin_instructor_gets_admin_role() {
    let ctx = TestContext::new().await;
    seed_instructor(&ctx.pool, ADMIN_ID).await;
    let app = create_test_app(&ctx).await;

    let (status, body) = send(
        &app,
        login_request(&format!("{}@campus.test", ADMIN_ID), TEST_PASSWORD),
    )
    .await;
    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["role"], "admin");
}

/// Wrong password and unknown email look the same to the caller.
#[actix_rt::test]
async fn test_login_failures_are_indistinguishable() {
    let ctx = TestContext::new().await;
    seed_instructor(&ctx.pool, "00001").await;
    let app = create_test_app(&ctx).await;

    let (wrong_status, wrong_body) =
        send(&app, login_request("00001@campus.test", "not-the-password")).await;
    let (unknown_status, unknown_body) =
        send(&app, login_request("nobody@campus.test", TEST_PASSWORD)).await;

    assert_eq!(wrong_status, 401);
    assert_eq!(unknown_status, 401);
    assert_eq!(wrong_body["message"], unknown_body["message"]);

    let (status, _) = send(&app, login_request("", "")).await;
    assert_eq!(status, 400);
}

/// Each address gets a small burst of attempts, then 429 until it refills.
#[actix_rt::test]
async fn test_login_attempts_are_throttled_per_address() {
    let mut ctx = TestContext::new().await;
    ctx.login_burst = 2;
    seed_instructor(&ctx.pool, "00001").await;
    let app = create_test_app(&ctx).await;

    let (status, _) = send(&app, login_request("00001@campus.test", "guess-one")).await;
    assert_eq!(status, 401);
    let (status, _) = send(&app, login_request("00001@campus.test", "guess-two")).await;
    assert_eq!(status, 401);

    // Even the right password is refused once the burst is spent
    let resp = test::call_service(
        &app,
        login_request("00001@campus.test", TEST_PASSWORD).to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 429);

    // Another address still has its own allowance
    let (status, body) = send(
        &app,
        login_request_from("198.51.100.20:51000", "00001@campus.test", TEST_PASSWORD),
    )
    .await;
    assert_eq!(status, 200, "{}", body);

    // Other routes are not throttled
    for _ in 0..3 {
        let (status, _) = send(&app, test::TestRequest::get().uri("/api/v1/health")).await;
        assert_eq!(status, 200);
    }
}

#[actix_rt::test]
async fn test_protected_routes_require_token() {
    let ctx = TestContext::new().await;
    let app = create_test_app(&ctx).await;

    let (status, body) = send(&app, test::TestRequest::get().uri("/api/v1/classes")).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "UNAUTHORIZED");

    let (status, _) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/classes")
            .insert_header(("Authorization", "Bearer not.a.jwt")),
    )
    .await;
    assert_eq!(status, 401);

    let (status, _) = send(&app, test::TestRequest::get().uri("/api/v1/health")).await;
    assert_eq!(status, 200);
}

/// The bootstrap key creates the first instructor; plain instructors cannot.
#[actix_rt::test]
async fn test_admin_key_bootstraps_instructors() {
    let ctx = TestContext::new().await;
    seed_instructor(&ctx.pool, "00001").await;
    let app = create_test_app(&ctx).await;

    let new_instructor = json!({
        "id": "00002",
        "name": "Dewi",
        "email": "dewi@campus.test",
        "password": "s3cret-pass"
    });

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/instructors")
            .set_json(new_instructor.clone()),
    )
    .await;
    assert_eq!(status, 401);

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/instructors")
            .insert_header(bearer("00001"))
            .set_json(new_instructor.clone()),
    )
    .await;
    assert_eq!(status, 403, "{}", body);

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/instructors")
            .insert_header(("X-Admin-Key", "wrong-key"))
            .set_json(new_instructor.clone()),
    )
    .await;
    assert_eq!(status, 401);

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/instructors")
            .insert_header(("X-Admin-Key", TEST_ADMIN_KEY))
            .set_json(new_instructor.clone()),
    )
    .await;
    assert_eq!(status, 201, "{}", body);
    assert_eq!(body["id"], "00002");

    // The new instructor can log in with the password they were given
    let (status, _) = send(&app, login_request("dewi@campus.test", "s3cret-pass")).await;
    assert_eq!(status, 200);

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/instructors")
            .insert_header(bearer(ADMIN_ID))
            .set_json(new_instructor),
    )
    .await;
    assert_eq!(status, 409, "{}", body);
    assert_eq!(body["error"], "CONFLICT");
}
