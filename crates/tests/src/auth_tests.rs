use crate::fixtures::test_app::TestApp;
use serde_json::Value;

#[tokio::test]
async fn register_creates_member_and_returns_tokens() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&serde_json::json!({
            "email": "Grace@Church.test",
            "full_name": "Grace Hopper",
            "password": "Password123!",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 201);
    assert!(resp.headers().get("set-cookie").is_some());

    let json: Value = resp.json().await.unwrap();
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["member"]["email"], "grace@church.test");
    assert_eq!(json["member"]["full_name"], "Grace Hopper");
}

#[tokio::test]
async fn register_duplicate_email_conflicts() {
    let app = TestApp::spawn().await;
    app.register_member("dup@church.test", "First").await;

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&serde_json::json!({
            "email": "dup@church.test",
            "full_name": "Second",
            "password": "Password123!",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 409);
}

#[tokio::test]
async fn register_rejects_invalid_email() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&serde_json::json!({
            "email": "not-an-email",
            "full_name": "Someone",
            "password": "Password123!",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn login_with_wrong_password_fails() {
    let app = TestApp::spawn().await;
    app.register_member("login@church.test", "Login User").await;

    let resp = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&serde_json::json!({
            "email": "login@church.test",
            "password": "wrong-password",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 401);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["redirect"], "/auth");
}

#[tokio::test]
async fn login_then_session_resolves_verified_identity() {
    let app = TestApp::spawn().await;
    app.register_member("member@church.test", "Member One").await;

    let resp = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&serde_json::json!({
            "email": "member@church.test",
            "password": "Password123!",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    let token = json["access_token"].as_str().unwrap();

    let resp = app.auth_get("/api/auth/session", token).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let session: Value = resp.json().await.unwrap();
    assert_eq!(session["kind"], "verified");
    assert_eq!(session["email"], "member@church.test");
    assert_eq!(session["is_admin"], false);
}

#[tokio::test]
async fn session_without_token_redirects_to_entry() {
    let app = TestApp::spawn().await;

    // Fresh client: no cookie from any earlier sign-in
    let resp = reqwest::Client::new()
        .get(app.url("/api/auth/session"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 401);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "unauthorized");
    assert_eq!(json["redirect"], "/auth");
}

#[tokio::test]
async fn session_reports_admin_role() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin().await;

    let resp = app
        .auth_get("/api/auth/session", &admin.access_token)
        .send()
        .await
        .unwrap();
    let session: Value = resp.json().await.unwrap();
    assert_eq!(session["is_admin"], true);
}

#[tokio::test]
async fn configured_admin_email_gets_role_on_register() {
    let app = TestApp::spawn_with_settings(|s| {
        s.auth.admin_emails = vec!["Elder@Church.test".to_string()];
    })
    .await;

    let elder = app.register_member("elder@church.test", "Elder").await;
    let resp = app
        .auth_get("/api/admin/attendance", &elder.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn logout_revokes_session() {
    let app = TestApp::spawn().await;
    let member = app.register_member("bye@church.test", "Leaving Soon").await;

    let resp = app
        .auth_post("/api/auth/logout", &member.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);

    let resp = app
        .auth_get("/api/auth/me", &member.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);

    // The refresh token belongs to the same session
    let resp = app
        .client
        .post(app.url("/api/auth/refresh"))
        .json(&serde_json::json!({ "refresh_token": member.refresh_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn refresh_issues_new_access_token() {
    let app = TestApp::spawn().await;
    let member = app.register_member("fresh@church.test", "Fresh").await;

    let resp = app
        .client
        .post(app.url("/api/auth/refresh"))
        .json(&serde_json::json!({ "refresh_token": member.refresh_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    let token = json["access_token"].as_str().unwrap();

    let resp = app.auth_get("/api/auth/me", token).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let me: Value = resp.json().await.unwrap();
    assert_eq!(me["email"], "fresh@church.test");
}

#[tokio::test]
async fn refresh_token_cannot_authenticate_requests() {
    let app = TestApp::spawn().await;
    let member = app.register_member("rt@church.test", "Refresh Only").await;

    let resp = app
        .auth_get("/api/auth/me", &member.refresh_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn join_is_disabled_in_verified_mode() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/auth/join"))
        .json(&serde_json::json!({ "email": "guest@church.test", "full_name": "Guest" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn unverified_mode_join_resolves_local_profile() {
    let app = TestApp::spawn_unverified().await;
    let guest = app.join_guest("Visitor@Church.test", "First Visitor").await;
    assert_eq!(guest.email, "visitor@church.test");

    let resp = app
        .auth_get("/api/auth/session", &guest.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let session: Value = resp.json().await.unwrap();
    assert_eq!(session["kind"], "unverified");
    assert_eq!(session["full_name"], "First Visitor");
    assert!(session["joined_at"].is_string());

    // No member record is created for an entry-form identity
    let members = app
        .db
        .collection::<bson::Document>("members")
        .count_documents(bson::doc! {})
        .await
        .unwrap();
    assert_eq!(members, 0);
}

#[tokio::test]
async fn unverified_mode_rejects_register() {
    let app = TestApp::spawn_unverified().await;

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&serde_json::json!({
            "email": "acct@church.test",
            "full_name": "Account",
            "password": "Password123!",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn guest_logout_revokes_guest_token() {
    let app = TestApp::spawn_unverified().await;
    let guest = app.join_guest("short@church.test", "Short Stay").await;

    let resp = app
        .auth_post("/api/auth/logout", &guest.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);

    let resp = app
        .auth_get("/api/auth/session", &guest.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}
