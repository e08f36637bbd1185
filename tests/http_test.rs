//! Router tests: pages, form posts and the auth hand-off

mod helpers;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use serde_json::Value;
use serial_test::serial;
use tower::ServiceExt;
use uuid::Uuid;

use helpers::*;

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("sb-access-token={}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, token: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

#[tokio::test]
async fn test_pages_redirect_without_session() {
    let ctx = TestContext::new();
    for uri in ["/", "/events", "/resources", "/settings", "/admin/events"] {
        let response = ctx.router().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&response), "/auth");
    }
}

#[tokio::test]
async fn test_admin_pages_redirect_members_home() {
    let ctx = TestContext::new();
    let response = ctx
        .router()
        .oneshot(get("/admin/users", Some(MEMBER_TOKEN)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_home_page() {
    let ctx = TestContext::new();
    ctx.backend.seed("resources", vec![resource_row(Uuid::new_v4(), "Handbook", true)]);

    let response = ctx.router().oneshot(get("/", Some(MEMBER_TOKEN))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let page = json_body(response).await;
    assert_eq!(page["greeting"], "Welcome to SSA, Max.");
    assert_eq!(page["pinned_resources"][0]["name"], "Handbook");
    assert_eq!(page["events_empty"]["title"], "No upcoming events");
    let groups = page["sidebar"]["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["label"], "User Actions");
}

#[tokio::test]
async fn test_admin_sidebar_lists_admin_actions() {
    let ctx = TestContext::new();
    let response = ctx.router().oneshot(get("/admin", Some(ADMIN_TOKEN))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let page = json_body(response).await;
    assert_eq!(page["sidebar"]["groups"][1]["label"], "Admin Actions");
    assert_eq!(page["sections"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_form_post_creates_and_revalidates() {
    let ctx = TestContext::new();

    let response = ctx
        .router()
        .oneshot(get("/admin/tags", Some(ADMIN_TOKEN)))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["count_label"], "0 tags total");

    let response = ctx
        .router()
        .oneshot(post_form("/admin/tags", MEMBER_TOKEN, "name=Theory&display_order=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let result = json_body(response).await;
    assert_eq!(result["success"], false);
    assert_eq!(result["error"], "Unauthorized");

    let response = ctx
        .router()
        .oneshot(post_form("/admin/tags", ADMIN_TOKEN, "name=Theory&display_order=1"))
        .await
        .unwrap();
    assert_eq!(json_body(response).await, serde_json::json!({ "success": true }));

    let response = ctx
        .router()
        .oneshot(get("/admin/tags", Some(ADMIN_TOKEN)))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["count_label"], "1 tag total");
}

#[tokio::test]
async fn test_resources_page_tag_selection() {
    let ctx = TestContext::new();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let (r1, r2) = (Uuid::new_v4(), Uuid::new_v4());
    ctx.backend.seed("tags", vec![tag_row(a, "A", 0), tag_row(b, "B", 1)]);
    ctx.backend.seed("resources", vec![resource_row(r1, "R1", false), resource_row(r2, "R2", false)]);
    ctx.backend.seed("resource_tags", vec![link_row(r1, a), link_row(r2, b)]);

    let uri = format!("/resources?tag={}", b);
    let response = ctx.router().oneshot(get(&uri, Some(MEMBER_TOKEN))).await.unwrap();
    let page = json_body(response).await;
    let names: Vec<&str> = page["resources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["R2"]);
    assert_eq!(page["tabs"][0]["value"], "all");
    assert_eq!(page["tabs"][2]["selected"], true);

    // Switching tabs reads the cached list
    let reads = ctx.backend.read_count();
    let response = ctx.router().oneshot(get("/resources?tag=all", Some(MEMBER_TOKEN))).await.unwrap();
    assert_eq!(json_body(response).await["resources"].as_array().unwrap().len(), 2);
    let page_reads = ctx.backend.read_count() - reads;
    assert!(page_reads <= 3, "expected only session lookups, got {} reads", page_reads);
}

#[tokio::test]
async fn test_settings_profile_post() {
    let ctx = TestContext::new();
    let response = ctx
        .router()
        .oneshot(post_form(
            "/settings/profile",
            MEMBER_TOKEN,
            "preferred_name=Maxi&major=Music&graduation_year=2027&instrument=",
        ))
        .await
        .unwrap();
    let state = json_body(response).await;
    assert_eq!(state["success"], "Profile updated successfully");

    let response = ctx.router().oneshot(get("/settings", Some(MEMBER_TOKEN))).await.unwrap();
    let page = json_body(response).await;
    assert_eq!(page["form"]["preferred_name"], "Maxi");
    assert_eq!(page["sidebar"]["display_name"], "Maxi");
}

#[tokio::test]
async fn test_profile_update_refreshes_admin_user_list() {
    let ctx = TestContext::new();
    let admin_users = |page: &Value| -> Vec<(String, Value)> {
        page["users"]
            .as_array()
            .unwrap()
            .iter()
            .map(|u| (u["name"].as_str().unwrap().to_string(), u["major"].clone()))
            .collect()
    };

    // warm the cached list
    let response = ctx.router().oneshot(get("/admin/users", Some(ADMIN_TOKEN))).await.unwrap();
    let before = admin_users(&json_body(response).await);
    assert!(!before.iter().any(|(name, _)| name == "Maxi"));

    let response = ctx
        .router()
        .oneshot(post_form(
            "/settings/profile",
            MEMBER_TOKEN,
            "preferred_name=Maxi&major=Jazz&graduation_year=2027",
        ))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["success"], "Profile updated successfully");

    let response = ctx.router().oneshot(get("/admin/users", Some(ADMIN_TOKEN))).await.unwrap();
    let after = admin_users(&json_body(response).await);
    assert!(after.contains(&("Maxi".to_string(), Value::from("Jazz"))));
}

#[tokio::test]
async fn test_sign_in_sets_verifier_cookie() {
    let ctx = TestContext::new();
    let response = ctx.router().oneshot(get("/auth", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("sb-code-verifier="));

    let page = json_body(response).await;
    assert!(page["sign_in_url"]
        .as_str()
        .unwrap()
        .contains("/auth/v1/authorize?provider=google"));
}

#[tokio::test]
async fn test_auth_callback() {
    let ctx = TestContext::new();
    ctx.backend.add_auth_code("good-code", MEMBER_TOKEN);

    let response = ctx
        .router()
        .oneshot(get("/auth/callback?code=good-code&next=/events", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "http://localhost:3000/events");
    let cookies: Vec<&str> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap())
        .collect();
    assert!(cookies.iter().any(|c| c.starts_with("sb-access-token=member-token")));

    let response = ctx
        .router()
        .oneshot(get("/auth/callback?code=bad-code&next=//evil.example", None))
        .await
        .unwrap();
    assert_eq!(location(&response), "/auth/auth-code-error");
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let ctx = TestContext::new();
    let request = Request::builder()
        .method("POST")
        .uri("/auth/logout")
        .header(header::COOKIE, format!("sb-access-token={}", MEMBER_TOKEN))
        .body(Body::empty())
        .unwrap();
    let response = ctx.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth");
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("sb-access-token="));
}

#[tokio::test]
#[serial]
async fn test_post_rate_limit() {
    let mut settings = test_settings();
    settings.features.rate_limit_per_minute = 2;
    let ctx = TestContext::with_settings(settings);
    let router = ctx.router();

    // a rotating x-forwarded-for does not buy a fresh quota
    let mut statuses = Vec::new();
    for i in 0..4 {
        let mut request = post_form("/admin/tags", MEMBER_TOKEN, "name=x");
        request.headers_mut().insert(
            "x-forwarded-for",
            format!("198.51.100.{}", i).parse().unwrap(),
        );
        statuses.push(router.clone().oneshot(request).await.unwrap().status());
    }
    assert_eq!(
        statuses,
        vec![
            StatusCode::OK,
            StatusCode::OK,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::TOO_MANY_REQUESTS
        ]
    );

    // Page loads are not limited
    let response = router.oneshot(get("/", Some(MEMBER_TOKEN))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new();
    let response = ctx.router().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let status = json_body(response).await;
    assert_eq!(status["backend"], "memory");
    assert_eq!(status["cache"], "memory");
}
