use axum::{
    body::{Body, to_bytes},
    http::{Request, header},
};
use chrono::{Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;
use vigil_services::AuthService;

use crate::fixtures::{
    seed::utc,
    test_app::{TestApp, unreachable_router},
};

#[tokio::test]
async fn non_admin_is_denied_and_sent_home() {
    let app = TestApp::spawn().await;
    let member = app.register_member("plain@church.test", "Plain Member").await;

    let resp = app
        .auth_get("/api/admin/attendance", &member.access_token)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 403);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["message"], "You don't have admin access");
    assert_eq!(json["redirect"], "/");
}

#[tokio::test]
async fn unverified_identity_is_never_admin() {
    let app = TestApp::spawn_unverified().await;
    let guest = app.join_guest("guest@church.test", "Guest").await;

    let resp = app
        .auth_get("/api/admin/attendance", &guest.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn admin_lists_recent_attendance_with_member_details() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin().await;
    let member = app.register_member("lydia@church.test", "Lydia").await;

    app.insert_attendance(&member, utc(2024, 1, 5, 10, 0), "Sunday Service")
        .await;
    app.insert_attendance(&member, utc(2024, 1, 10, 10, 0), "Sunday Service")
        .await;

    let resp = app
        .auth_get("/api/admin/attendance", &admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();

    let records = json["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    // Newest first
    assert!(records[0]["join_time"].as_str().unwrap().starts_with("2024-01-10"));
    assert_eq!(records[0]["full_name"], "Lydia");
    assert_eq!(records[0]["email"], "lydia@church.test");
    assert_eq!(json["stats"]["total_records"], 2);
    assert_eq!(json["stats"]["today_count"], 0);
}

#[tokio::test]
async fn filter_by_single_day_returns_that_day_only() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin().await;
    let member = app.register_member("silas@church.test", "Silas").await;

    let first = app
        .insert_attendance(&member, utc(2024, 1, 5, 9, 30), "Sunday Service")
        .await;
    app.insert_attendance(&member, utc(2024, 1, 10, 9, 30), "Sunday Service")
        .await;

    let resp = app
        .auth_get(
            "/api/admin/attendance?start=2024-01-05&end=2024-01-05",
            &admin.access_token,
        )
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();

    let records = json["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], first.to_hex());
    assert_eq!(json["stats"]["filtered_count"], 1);
    assert_eq!(json["stats"]["total_records"], 2);
}

#[tokio::test]
async fn end_date_includes_the_whole_day() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin().await;
    let member = app.register_member("late@church.test", "Late Night").await;

    app.insert_attendance(&member, utc(2024, 3, 3, 23, 59), "Vigil")
        .await;
    app.insert_attendance(&member, utc(2024, 3, 4, 0, 0), "Morning")
        .await;

    let resp = app
        .auth_get("/api/admin/attendance?end=2024-03-03", &admin.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    let records = json["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["stream_title"], "Vigil");
}

#[tokio::test]
async fn blank_filter_values_mean_no_bound() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin().await;
    let member = app.register_member("open@church.test", "Open").await;
    app.insert_attendance(&member, utc(2023, 12, 24, 18, 0), "Carols")
        .await;

    let resp = app
        .auth_get("/api/admin/attendance?start=&end=", &admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["records"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn inverted_range_is_rejected() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin().await;

    let resp = app
        .auth_get(
            "/api/admin/attendance?start=2024-02-01&end=2024-01-01",
            &admin.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    let resp = app
        .auth_get("/api/admin/attendance?start=01/02/2024", &admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn today_count_covers_todays_check_ins() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin().await;
    let member = app.register_member("today@church.test", "Today").await;

    app.auth_post("/api/attendance/check-in", &member.access_token)
        .send()
        .await
        .unwrap();
    app.insert_attendance(&member, Utc::now() - Duration::days(3), "Earlier")
        .await;

    let resp = app
        .auth_get("/api/admin/attendance", &admin.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["stats"]["total_records"], 2);
    assert_eq!(json["stats"]["today_count"], 1);
}

#[tokio::test]
async fn listing_is_capped_at_list_limit() {
    let app = TestApp::spawn_with_settings(|s| s.attendance.list_limit = 3).await;
    let admin = app.seed_admin().await;
    let member = app.register_member("many@church.test", "Many").await;

    for day in 1..=5 {
        app.insert_attendance(&member, utc(2024, 5, day, 10, 0), "Service")
            .await;
    }

    let resp = app
        .auth_get("/api/admin/attendance", &admin.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    let records = json["records"].as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert!(records[2]["join_time"].as_str().unwrap().starts_with("2024-05-03"));
}

/// A role lookup that errors must look exactly like a missing role.
#[tokio::test]
async fn failed_role_lookup_is_treated_as_denial() {
    let (router, settings) = unreachable_router().await;

    let auth = AuthService::new(settings.jwt.clone());
    let tokens = auth
        .generate_tokens(bson::oid::ObjectId::new(), "admin@church.test", "Admin")
        .unwrap();

    let resp = router
        .clone()
        .oneshot(
            Request::get("/api/admin/attendance")
                .header(header::AUTHORIZATION, format!("Bearer {}", tokens.access_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 403);
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["message"], "You don't have admin access");
    assert_eq!(json["redirect"], "/");

    // The viewer page still gets the default stream when config lookup fails
    let resp = router
        .oneshot(
            Request::get("/api/stream")
                .header(header::AUTHORIZATION, format!("Bearer {}", tokens.access_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        json["embed_url"],
        "https://www.youtube.com/embed/live_stream?channel=UCR4c-NsIGhMqV8W-E-Q5N6A&autoplay=0"
    );
}
