#![allow(dead_code)]

use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use serde_json::{json, Value};
use uuid::Uuid;

use filmxane_backend::config::Config;
use filmxane_backend::models::{Role, Video, VideoInput, VideoType};
use filmxane_backend::{db, handlers, services, AppState};

pub async fn setup_test_app() -> (
    impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    web::Data<AppState>,
) {
    let db_pool = services::init_test_pool()
        .await
        .expect("in-memory database should start");

    let config = Config {
        bcrypt_cost: filmxane_backend::config::MIN_BCRYPT_COST,
        ..Config::default()
    };

    let state = web::Data::new(AppState { db_pool, config });

    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(handlers::configure_routes),
    )
    .await;

    (app, state)
}

pub fn unique_email() -> String {
    let unique_id = Uuid::new_v4().to_string();
    format!("test_{}@example.com", &unique_id[..8])
}

pub async fn send(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    req: test::TestRequest,
) -> (u16, Value) {
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status().as_u16();
    let body = test::read_body(resp).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Registers a fresh account and returns its id and token.
pub async fn register_test_user(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
) -> (i64, String) {
    let req = test::TestRequest::post().uri("/api/auth/register").set_json(json!({
        "email": unique_email(),
        "password": "password123",
        "firstName": "Test",
        "lastName": "User"
    }));
    let (status, body) = send(app, req).await;
    assert_eq!(status, 201, "registration failed: {}", body);

    let user_id = body["user"]["id"].as_i64().unwrap();
    let token = body["token"].as_str().unwrap().to_string();
    (user_id, token)
}

/// Registers a user and promotes it straight in the database.
pub async fn register_with_role(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    state: &AppState,
    role: Role,
) -> (i64, String) {
    let (user_id, token) = register_test_user(app).await;
    db::users::set_role(&state.db_pool, user_id, role)
        .await
        .unwrap()
        .unwrap();
    (user_id, token)
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

pub async fn insert_video(
    state: &AppState,
    title: &str,
    video_type: VideoType,
    genres: &[&str],
    year: i32,
    rating: f64,
) -> Video {
    let input = VideoInput {
        title: Some(title.to_string()),
        description: Some(format!("{} description", title)),
        genre: Some(genres.iter().map(|g| g.to_string()).collect()),
        year: Some(year),
        duration: Some(5400),
        rating: Some(rating),
        is_new: Some(false),
        ..VideoInput::default()
    };
    db::videos::create_video(&state.db_pool, &input, video_type)
        .await
        .unwrap()
}
