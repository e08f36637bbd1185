//! `RestBackend` tests against a mock hosted backend

mod helpers;

use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use helpers::*;
use SsaDashboard::backend::{Backend, BackendHandle, Session};
use SsaDashboard::database::DatabaseService;
use SsaDashboard::models::{Resource, ResourceWithTags, TagInput};
use SsaDashboard::utils::errors::BackendError;

fn database(mock: &BackendMockServer, token: &str) -> DatabaseService {
    DatabaseService::new(BackendHandle::new(
        std::sync::Arc::new(mock.backend()),
        Session::with_token(token),
    ))
}

#[tokio::test]
async fn test_get_user_sends_bearer_token() {
    let mock = BackendMockServer::new().await;
    let user_id = Uuid::new_v4();
    mock.mock_user("session-token", user_id).await;

    let user = database(&mock, "session-token").current_user().await.unwrap();
    assert_eq!(user.id, user_id);
}

#[tokio::test]
async fn test_get_user_without_session_makes_no_request() {
    let mock = BackendMockServer::new().await;
    let result = mock.backend().get_user(&Session::anonymous()).await;
    assert_matches!(result, Err(BackendError::NoSession));
    assert!(mock.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_pinned_select_query_params() {
    let mock = BackendMockServer::new().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/resources"))
        .and(query_param("select", "*"))
        .and(query_param("is_pinned", "eq.true"))
        .and(query_param("order", "name.asc"))
        .and(header("authorization", "Bearer session-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": Uuid::new_v4(),
                "name": "Audition Guide",
                "link": "https://example.com/audition",
                "description": null,
                "is_pinned": true,
                "created_at": "2025-01-15T18:00:00+00:00"
            }
        ])))
        .expect(1)
        .mount(&mock.server)
        .await;

    let resources: Vec<Resource> = database(&mock, "session-token")
        .resources
        .list_pinned()
        .await
        .unwrap();
    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0].name, "Audition Guide");
}

#[tokio::test]
async fn test_embedded_tags_are_flattened_and_sorted() {
    let mock = BackendMockServer::new().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/resources"))
        .and(query_param("select", "*,resource_tags(tags(id,name,display_order))"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": Uuid::new_v4(),
                "name": "Real Book",
                "link": "https://example.com/real-book",
                "is_pinned": false,
                "resource_tags": [
                    { "tags": { "id": Uuid::new_v4(), "name": "Theory", "display_order": 2 } },
                    { "tags": { "id": Uuid::new_v4(), "name": "Charts", "display_order": 1 } },
                    { "tags": null }
                ]
            }
        ])))
        .mount(&mock.server)
        .await;

    let resources: Vec<ResourceWithTags> = database(&mock, "session-token")
        .resources
        .list_with_tags()
        .await
        .unwrap();
    let names: Vec<&str> = resources[0].tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Charts", "Theory"]);
}

#[tokio::test]
async fn test_insert_body_and_error_passthrough() {
    let mock = BackendMockServer::new().await;
    let id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path("/rest/v1/tags"))
        .and(header("prefer", "return=minimal"))
        .and(body_json(json!([{ "id": id, "name": "Theory", "display_order": 1 }])))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "details": null,
            "hint": null,
            "message": "duplicate key value violates unique constraint \"tags_name_key\""
        })))
        .mount(&mock.server)
        .await;

    let result = database(&mock, "session-token")
        .tags
        .create(
            id,
            TagInput {
                name: "Theory".to_string(),
                display_order: 1,
            },
        )
        .await;

    let error = result.unwrap_err();
    assert_eq!(
        error.to_string(),
        "duplicate key value violates unique constraint \"tags_name_key\""
    );
    assert_matches!(error, BackendError::Api { status: 409, code: Some(ref code), .. } if code == "23505");
}

#[tokio::test]
async fn test_delete_filters_by_id() {
    let mock = BackendMockServer::new().await;
    let id = Uuid::new_v4();
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/events"))
        .and(query_param("id", format!("eq.{}", id).as_str()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock.server)
        .await;

    database(&mock, "session-token").events.delete(id).await.unwrap();
}

#[tokio::test]
async fn test_single_row_errors_on_empty_result() {
    let mock = BackendMockServer::new().await;
    mock.mock_select("profiles", json!([])).await;

    let result = database(&mock, "session-token")
        .profiles
        .find_role(Uuid::new_v4())
        .await;
    assert_matches!(result, Err(BackendError::Api { code: Some(ref code), .. }) if code == "PGRST116");
}

#[tokio::test]
async fn test_code_exchange() {
    let mock = BackendMockServer::new().await;
    mock.mock_token_exchange("fresh-token").await;

    let session = mock
        .backend()
        .exchange_code_for_session("auth-code", Some("verifier"))
        .await
        .unwrap();
    assert_eq!(session.access_token, "fresh-token");
    assert_eq!(session.expires_in, Some(3600));
}

#[tokio::test]
async fn test_auth_error_message() {
    let mock = BackendMockServer::new().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": 401,
            "error_code": "bad_jwt",
            "msg": "invalid JWT: unable to parse or verify signature"
        })))
        .mount(&mock.server)
        .await;

    let error = mock
        .backend()
        .get_user(&Session::with_token("expired"))
        .await
        .unwrap_err();
    assert_matches!(error, BackendError::Api { status: 401, code: Some(ref code), .. } if code == "bad_jwt");
    assert!(error.to_string().starts_with("invalid JWT"));
}
