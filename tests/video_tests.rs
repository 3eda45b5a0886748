use actix_web::test;
use serde_json::json;

use filmxane_backend::db;
use filmxane_backend::models::{Role, VideoFlagsRequest, VideoType};

mod common;
use common::{bearer, insert_video, register_test_user, register_with_role, send, setup_test_app};

#[actix_web::test]
async fn test_get_video_counts_views() {
    let (app, state) = setup_test_app().await;
    let video = insert_video(&state, "Jiyan", VideoType::Movie, &["Drama"], 2014, 7.2).await;

    let uri = format!("/api/videos/{}", video.id);
    // First lookup counts one view
    let (status, first) = send(&app, test::TestRequest::get().uri(&uri)).await;
    assert_eq!(status, 200);
    assert_eq!(first["views"], 1);
    assert_eq!(first["type"], "movie");
    assert_eq!(first["genre"], json!(["Drama"]));

    // Each lookup adds another
    let (_, second) = send(&app, test::TestRequest::get().uri(&uri)).await;
    assert_eq!(second["views"], 2);

    // Unknown id
    let (status, missing) = send(&app, test::TestRequest::get().uri("/api/videos/999999")).await;
    assert_eq!(status, 404);
    assert_eq!(missing["error"], "NOT_FOUND");
}

#[actix_web::test]
async fn test_hidden_videos_leave_listings_but_not_direct_lookup() {
    let (app, state) = setup_test_app().await;
    let visible = insert_video(&state, "Dîyar", VideoType::Movie, &[], 2018, 6.0).await;
    let hidden = insert_video(&state, "Veşartî", VideoType::Movie, &[], 2018, 6.0).await;
    db::videos::set_flags(
        &state.db_pool,
        hidden.id,
        &VideoFlagsRequest {
            is_hidden: Some(true),
            is_featured: Some(true),
            ..VideoFlagsRequest::default()
        },
    )
    .await
    .unwrap();

    // Assert that the hidden video is gone from every listing
    let (_, listing) = send(&app, test::TestRequest::get().uri("/api/videos")).await;
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["items"][0]["id"].as_i64().unwrap(), visible.id);

    let (_, by_type) = send(&app, test::TestRequest::get().uri("/api/videos/type/movie")).await;
    assert_eq!(by_type["total"], 1);

    let (_, featured) = send(&app, test::TestRequest::get().uri("/api/videos/featured")).await;
    assert_eq!(featured["total"], 0);

    let (_, search) = send(&app, test::TestRequest::get().uri("/api/videos/search?q=Ve%C5%9Fart%C3%AE")).await;
    assert_eq!(search["total"], 0);

    // Direct lookup still returns it
    let (status, direct) = send(&app, test::TestRequest::get().uri(&format!("/api/videos/{}", hidden.id))).await;
    assert_eq!(status, 200);
    assert_eq!(direct["isHidden"], true);
}

#[actix_web::test]
async fn test_videos_by_type() {
    let (app, state) = setup_test_app().await;
    insert_video(&state, "Fîlm", VideoType::Movie, &[], 2020, 5.0).await;
    insert_video(&state, "Rêzefîlm", VideoType::Series, &[], 2020, 5.0).await;

    let (status, series) = send(&app, test::TestRequest::get().uri("/api/videos/type/series")).await;
    assert_eq!(status, 200);
    assert_eq!(series["total"], 1);
    assert_eq!(series["items"][0]["type"], "series");

    // Unknown type
    let (status, _) = send(&app, test::TestRequest::get().uri("/api/videos/type/podcast")).await;
    assert_eq!(status, 400);
}

#[actix_web::test]
async fn test_featured_and_new_listings() {
    let (app, state) = setup_test_app().await;
    let a = insert_video(&state, "A", VideoType::Movie, &[], 2020, 5.0).await;
    let b = insert_video(&state, "B", VideoType::Series, &[], 2021, 5.0).await;
    db::videos::set_flags(&state.db_pool, a.id, &VideoFlagsRequest { is_featured: Some(true), ..Default::default() })
        .await
        .unwrap();
    db::videos::set_flags(&state.db_pool, b.id, &VideoFlagsRequest { is_new: Some(true), ..Default::default() })
        .await
        .unwrap();

    let (_, featured) = send(&app, test::TestRequest::get().uri("/api/videos/featured")).await;
    assert_eq!(featured["total"], 1);
    assert_eq!(featured["items"][0]["id"].as_i64().unwrap(), a.id);

    let (_, new) = send(&app, test::TestRequest::get().uri("/api/videos/new")).await;
    assert_eq!(new["total"], 1);
    assert_eq!(new["items"][0]["id"].as_i64().unwrap(), b.id);
}

#[actix_web::test]
async fn test_content_catalog_sections() {
    let (app, state) = setup_test_app().await;
    let movie = insert_video(&state, "Fîlm", VideoType::Movie, &[], 2020, 5.0).await;
    let series = insert_video(&state, "Rêzefîlm", VideoType::Series, &[], 2020, 5.0).await;
    let hidden = insert_video(&state, "Veşartî", VideoType::Movie, &[], 2020, 5.0).await;
    db::videos::set_flags(&state.db_pool, series.id, &VideoFlagsRequest { is_featured: Some(true), ..Default::default() })
        .await
        .unwrap();
    db::videos::set_flags(&state.db_pool, hidden.id, &VideoFlagsRequest { is_hidden: Some(true), ..Default::default() })
        .await
        .unwrap();

    // Fetch the aggregated catalog
    let (status, catalog) = send(&app, test::TestRequest::get().uri("/api/content")).await;
    assert_eq!(status, 200);
    assert_eq!(catalog["movies"].as_array().unwrap().len(), 1);
    assert_eq!(catalog["movies"][0]["id"].as_i64().unwrap(), movie.id);
    assert_eq!(catalog["series"][0]["id"].as_i64().unwrap(), series.id);
    assert_eq!(catalog["featured"][0]["id"].as_i64().unwrap(), series.id);
    assert!(catalog["newReleases"].as_array().unwrap().is_empty());
    assert!(catalog["categories"].is_array());
}

#[actix_web::test]
async fn test_admin_video_crud() {
    let (app, state) = setup_test_app().await;
    let (_, token) = register_with_role(&app, &state, Role::Moderator).await;

    // Create a video as a moderator
    let (status, created) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/admin/videos")
            .insert_header(bearer(&token))
            .set_json(json!({
                "title": "Dengbêj",
                "description": "Belgefîlmek li ser dengbêjan",
                "genre": ["Belgefîlm", "Muzîk"],
                "year": 2016,
                "duration": 4200,
                "rating": 8.3,
                "type": "movie"
            })),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(created["isNew"], true);
    let id = created["id"].as_i64().unwrap();

    // Partial update keeps untouched fields
    let (status, updated) = send(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/admin/videos/{}", id))
            .insert_header(bearer(&token))
            .set_json(json!({ "rating": 8.7, "type": "series" })),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(updated["rating"], 8.7);
    assert_eq!(updated["type"], "series");
    assert_eq!(updated["title"], "Dengbêj");

    // Hide it through the flags endpoint
    let (status, flagged) = send(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/admin/videos/{}/flags", id))
            .insert_header(bearer(&token))
            .set_json(json!({ "isHidden": true })),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(flagged["isHidden"], true);

    // admin listing still sees hidden rows
    let (_, admin_listing) = send(&app, test::TestRequest::get().uri("/api/admin/videos").insert_header(bearer(&token))).await;
    assert_eq!(admin_listing["total"], 1);

    // Delete it for good
    let (status, _) = send(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/admin/videos/{}", id))
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(status, 200);

    // Deleted rows are not found anymore
    let (status, _) = send(&app, test::TestRequest::get().uri(&format!("/api/videos/{}", id))).await;
    assert_eq!(status, 404);

    let (status, _) = send(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/admin/videos/{}", id))
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(status, 404);
}

#[actix_web::test]
async fn test_video_validation() {
    let (app, state) = setup_test_app().await;
    let (_, token) = register_with_role(&app, &state, Role::Admin).await;

    // Each body breaks one rule
    for body in [
        json!({ "description": "no title" }),
        json!({ "title": "   " }),
        json!({ "title": "Bad rating", "rating": 11 }),
        json!({ "title": "Bad year", "year": 1500 }),
        json!({ "title": "Bad type", "type": "podcast" }),
        json!({ "title": "Bad duration", "duration": -5 }),
    ] {
        let (status, resp) = send(
            &app,
            test::TestRequest::post()
                .uri("/api/admin/videos")
                .insert_header(bearer(&token))
                .set_json(&body),
        )
        .await;
        assert_eq!(status, 400, "expected rejection for {} got {}", body, resp);
    }
}

#[actix_web::test]
async fn test_content_management_requires_staff() {
    let (app, _state) = setup_test_app().await;
    let (_, token) = register_test_user(&app).await;

    // Plain users are forbidden
    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/admin/videos")
            .insert_header(bearer(&token))
            .set_json(json!({ "title": "Nope" })),
    )
    .await;
    assert_eq!(status, 403);

    // Anonymous callers are unauthorized
    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/admin/videos")
            .set_json(json!({ "title": "Nope" })),
    )
    .await;
    assert_eq!(status, 401);
}

#[actix_web::test]
async fn test_genre_update_is_searchable() {
    let (app, state) = setup_test_app().await;
    let (_, token) = register_with_role(&app, &state, Role::Admin).await;
    let video = insert_video(&state, "Gundê Min", VideoType::Movie, &["Drama"], 2019, 6.8).await;

    // Replace the genre list with a duplicate spelling in another case
    let (status, updated) = send(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/admin/videos/{}", video.id))
            .insert_header(bearer(&token))
            .set_json(json!({ "genre": ["Şer", "ŞER", " Dîrokî "] })),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(updated["genre"], json!(["Şer", "Dîrokî"]));

    // The new genre is found in either case, the old one is gone
    let (_, body) = send(&app, test::TestRequest::get().uri("/api/videos?genre=%C5%9Fer")).await;
    assert_eq!(body["total"], 1);
    let (_, body) = send(&app, test::TestRequest::get().uri("/api/videos?genre=drama")).await;
    assert_eq!(body["total"], 0);
}
