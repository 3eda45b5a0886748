use actix_web::test;
use serde_json::json;

use filmxane_backend::db;
use filmxane_backend::models::SettingsUpdate;

mod common;
use common::{bearer, send, setup_test_app, unique_email};

#[actix_web::test]
async fn test_register_and_login() {
    let (app, _state) = setup_test_app().await;
    // Generate a unique email to avoid conflicts
    let email = unique_email();

    // Register a new account
    let (status, register_json) = send(
        &app,
        test::TestRequest::post().uri("/api/auth/register").set_json(json!({
            "email": email,
            "password": "password123",
            "firstName": "Rojda",
            "lastName": "Aydin"
        })),
    )
    .await;

    // Assert that registration was successful
    assert_eq!(status, 201);
    assert_eq!(register_json["success"], true);
    assert!(register_json.get("token").is_some());
    assert_eq!(register_json["user"]["role"], "user");
    assert_eq!(register_json["user"]["firstName"], "Rojda");
    // the hash never leaves the server
    assert!(register_json["user"].get("password").is_none());
    let user_id = register_json["user"]["id"].as_i64().unwrap();

    // Log in with the same email in another case
    let (status, login_json) = send(
        &app,
        test::TestRequest::post().uri("/api/auth/login").set_json(json!({
            "email": email.to_uppercase(),
            "password": "password123"
        })),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(login_json["user"]["id"].as_i64().unwrap(), user_id);
    assert!(login_json["user"]["lastLoginAt"].is_string());

    // Login with an incorrect password
    let (status, wrong_password) = send(
        &app,
        test::TestRequest::post().uri("/api/auth/login").set_json(json!({
            "email": email,
            "password": "wrong_password"
        })),
    )
    .await;
    assert_eq!(status, 401);
    assert_eq!(wrong_password["success"], false);
    assert_eq!(wrong_password["message"], "Invalid credentials");

    // Login with an email nobody registered
    let (status, unknown_user) = send(
        &app,
        test::TestRequest::post().uri("/api/auth/login").set_json(json!({
            "email": "nobody@example.com",
            "password": "password123"
        })),
    )
    .await;
    assert_eq!(status, 401);
    assert_eq!(unknown_user["message"], "Invalid credentials");
}

#[actix_web::test]
async fn test_duplicate_registration_is_a_conflict() {
    let (app, state) = setup_test_app().await;
    let email = unique_email();
    let body = json!({ "email": email, "password": "password123" });

    let (status, _) = send(&app, test::TestRequest::post().uri("/api/auth/register").set_json(&body)).await;
    assert_eq!(status, 201);

    // Try to register the same email again
    let (status, duplicate) = send(&app, test::TestRequest::post().uri("/api/auth/register").set_json(&body)).await;
    assert_eq!(status, 409);
    assert_eq!(duplicate["error"], "CONFLICT");

    // Only one row exists for the email
    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(&email)
        .fetch_one(&state.db_pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[actix_web::test]
async fn test_registration_validation() {
    let (app, _state) = setup_test_app().await;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "email": "not-an-email", "password": "password123" })),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "email": unique_email(), "password": "123" })),
    )
    .await;
    assert_eq!(status, 400);
}

#[actix_web::test]
async fn test_registration_can_be_disabled() {
    let (app, state) = setup_test_app().await;
    // Turn registration off
    db::settings::update_settings(
        &state.db_pool,
        &SettingsUpdate {
            registration_enabled: Some(false),
            ..SettingsUpdate::default()
        },
    )
    .await
    .unwrap();

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "email": unique_email(), "password": "password123" })),
    )
    .await;
    assert_eq!(status, 403);
}

#[actix_web::test]
async fn test_profile_and_password_change() {
    let (app, _state) = setup_test_app().await;
    let (user_id, token) = common::register_test_user(&app).await;

    // Fetch the current user
    let (status, me) = send(&app, test::TestRequest::get().uri("/api/auth/me").insert_header(bearer(&token))).await;
    assert_eq!(status, 200);
    assert_eq!(me["user"]["id"].as_i64().unwrap(), user_id);

    // Only the first name changes
    let (status, updated) = send(
        &app,
        test::TestRequest::put()
            .uri("/api/auth/profile")
            .insert_header(bearer(&token))
            .set_json(json!({ "firstName": "Dilan" })),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(updated["user"]["firstName"], "Dilan");
    assert_eq!(updated["user"]["lastName"], "User");

    // Wrong current password
    let (status, _) = send(
        &app,
        test::TestRequest::put()
            .uri("/api/auth/password")
            .insert_header(bearer(&token))
            .set_json(json!({ "currentPassword": "wrong", "newPassword": "newpassword" })),
    )
    .await;
    assert_eq!(status, 401);

    let (status, _) = send(
        &app,
        test::TestRequest::put()
            .uri("/api/auth/password")
            .insert_header(bearer(&token))
            .set_json(json!({ "currentPassword": "password123", "newPassword": "newpassword" })),
    )
    .await;
    assert_eq!(status, 200);

    // The new password works for login
    let email = me["user"]["email"].as_str().unwrap().to_string();
    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": email, "password": "newpassword" })),
    )
    .await;
    assert_eq!(status, 200);
}

#[actix_web::test]
async fn test_protected_routes_require_a_valid_token() {
    let (app, _state) = setup_test_app().await;

    // No Authorization header at all
    let (status, body) = send(&app, test::TestRequest::get().uri("/api/auth/me")).await;
    assert_eq!(status, 401);
    assert_eq!(body["success"], false);

    // A token that does not decode
    let (status, _) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(bearer("not.a.jwt")),
    )
    .await;
    assert_eq!(status, 401);
}

#[actix_web::test]
async fn test_deactivated_accounts_are_locked_out() {
    let (app, state) = setup_test_app().await;
    let (user_id, token) = common::register_test_user(&app).await;

    // Deactivate the account behind a still-valid token
    db::users::set_active(&state.db_pool, user_id, false).await.unwrap();

    let (status, _) = send(&app, test::TestRequest::get().uri("/api/auth/me").insert_header(bearer(&token))).await;
    assert_eq!(status, 403);
}

#[actix_web::test]
async fn test_status_endpoints() {
    let (app, _state) = setup_test_app().await;

    let (status, body) = send(&app, test::TestRequest::get().uri("/api/status")).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "running");

    let (status, body) = send(&app, test::TestRequest::get().uri("/api/health")).await;
    assert_eq!(status, 200);
    assert_eq!(body["database"], "ok");
}

#[actix_web::test]
async fn test_malformed_body_gets_json_error() {
    let (app, _) = setup_test_app().await;

    // Email sent as a number instead of a string
    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "email": 5, "password": "password123", "firstName": "A", "lastName": "B" })),
    )
    .await;

    // Assert that the client can parse the error body
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "BAD_REQUEST");
    assert!(body["message"].as_str().unwrap().starts_with("Invalid request body"));
}
