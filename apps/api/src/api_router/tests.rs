use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::api_services::build_in_memory_app_state;
use crate::middleware::{EMAIL_HEADER, SUBJECT_HEADER};

use super::build_router;

const HOOK_TOKEN: &str = "0123456789abcdef0123456789abcdef";

fn test_app() -> Router {
    build_router(
        build_in_memory_app_state(HOOK_TOKEN.to_owned()),
        "http://localhost:3000",
    )
    .unwrap_or_else(|_| unreachable!())
}

struct Caller<'a> {
    subject: &'a str,
    email: &'a str,
}

const OWNER: Caller<'static> = Caller {
    subject: "u1",
    email: "owner@x.com",
};
const MEMBER: Caller<'static> = Caller {
    subject: "u2",
    email: "a@x.com",
};

fn request(method: Method, uri: &str, caller: Option<&Caller<'_>>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(caller) = caller {
        builder = builder
            .header(SUBJECT_HEADER, caller.subject)
            .header(EMAIL_HEADER, caller.email);
    }

    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    builder.body(body).unwrap_or_else(|_| unreachable!())
}

fn sign_in_request(token: Option<&str>, email: &str, user_id: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/internal/sign-ins")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    builder
        .body(Body::from(
            json!({ "email": email, "userId": user_id }).to_string(),
        ))
        .unwrap_or_else(|_| unreachable!())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|_| unreachable!());
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, body)
}

async fn register_project(app: &Router) -> String {
    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/api/projects",
            Some(&OWNER),
            Some(json!({ "name": "P1" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    body["projectId"].as_str().unwrap_or_default().to_owned()
}

async fn can(app: &Router, project_id: &str, caller: &Caller<'_>, capability: &str) -> bool {
    let (status, body) = send(
        app,
        request(
            Method::GET,
            &format!("/api/projects/{project_id}/access/{capability}"),
            Some(caller),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    body["allowed"].as_bool().unwrap_or_default()
}

#[tokio::test]
async fn health_is_public() {
    let app = test_app();

    let (status, body) = send(&app, request(Method::GET, "/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn project_routes_require_identity_headers() {
    let app = test_app();

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/projects",
            None,
            Some(json!({ "name": "P1" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn invited_editor_is_bound_on_sign_in_and_downgraded() {
    let app = test_app();
    let project_id = register_project(&app).await;

    let (status, invited) = send(
        &app,
        request(
            Method::POST,
            &format!("/api/projects/{project_id}/members"),
            Some(&OWNER),
            Some(json!({ "email": "a@x.com", "role": "Editor" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(invited["state"], "invited");
    assert_eq!(invited["userId"], Value::Null);
    let membership_id = invited["membershipId"].as_str().unwrap_or_default().to_owned();

    let (status, signed_in) = send(&app, sign_in_request(Some(HOOK_TOKEN), "a@x.com", "u2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(signed_in["bound"].as_array().map(Vec::len), Some(1));
    assert_eq!(signed_in["bound"][0]["state"], "active");

    assert!(can(&app, &project_id, &MEMBER, "canCreateDocuments").await);
    assert!(!can(&app, &project_id, &MEMBER, "canManageTeam").await);

    let (status, reassigned) = send(
        &app,
        request(
            Method::PUT,
            &format!("/api/projects/{project_id}/members/{membership_id}/role"),
            Some(&OWNER),
            Some(json!({ "role": "Viewer" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reassigned["role"], "Viewer");

    assert!(!can(&app, &project_id, &MEMBER, "canCreateDocuments").await);
}

#[tokio::test]
async fn owner_access_reports_bypass() {
    let app = test_app();
    let project_id = register_project(&app).await;

    let (status, body) = send(
        &app,
        request(
            Method::GET,
            &format!("/api/projects/{project_id}/access"),
            Some(&OWNER),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "owner");
    assert_eq!(body["permissions"]["canManageRoles"], true);
}

#[tokio::test]
async fn role_catalogue_lists_defaults_and_rejects_reserved_names() {
    let app = test_app();
    let project_id = register_project(&app).await;

    let (status, rejected) = send(
        &app,
        request(
            Method::POST,
            &format!("/api/projects/{project_id}/roles"),
            Some(&OWNER),
            Some(json!({ "name": "Editor", "permissions": { "canViewNotes": true } })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(rejected["message"].is_string());

    let (status, created) = send(
        &app,
        request(
            Method::POST,
            &format!("/api/projects/{project_id}/roles"),
            Some(&OWNER),
            Some(json!({ "name": "Note Taker", "permissions": { "canViewNotes": true } })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["isDefault"], false);
    assert_eq!(created["permissions"]["canViewNotes"], true);
    assert_eq!(created["permissions"]["canEditNotes"], false);

    let (status, roles) = send(
        &app,
        request(
            Method::GET,
            &format!("/api/projects/{project_id}/roles"),
            Some(&OWNER),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = roles
        .as_array()
        .map(|roles| roles.iter().filter_map(|role| role["name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, vec!["Owner", "Editor", "Viewer", "Note Taker"]);

    let (status, _) = send(
        &app,
        request(
            Method::DELETE,
            &format!("/api/projects/{project_id}/roles/Editor"),
            Some(&OWNER),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stranger_cannot_invite() {
    let app = test_app();
    let project_id = register_project(&app).await;

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            &format!("/api/projects/{project_id}/members"),
            Some(&MEMBER),
            Some(json!({ "email": "b@x.com", "role": "Viewer" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn sign_in_hook_requires_bearer_token() {
    let app = test_app();

    let (missing, _) = send(&app, sign_in_request(None, "a@x.com", "u2")).await;
    let (wrong, _) = send(
        &app,
        sign_in_request(Some("fedcba9876543210fedcba9876543210"), "a@x.com", "u2"),
    )
    .await;

    assert_eq!(missing, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_and_unknown_identifiers_are_rejected() {
    let app = test_app();
    let project_id = register_project(&app).await;

    let (malformed, _) = send(
        &app,
        request(Method::GET, "/api/projects/not-a-uuid", Some(&OWNER), None),
    )
    .await;
    let (unknown, _) = send(
        &app,
        request(
            Method::GET,
            "/api/projects/00000000-0000-4000-8000-000000000000",
            Some(&OWNER),
            None,
        ),
    )
    .await;
    let (capability, _) = send(
        &app,
        request(
            Method::GET,
            &format!("/api/projects/{project_id}/access/canFly"),
            Some(&OWNER),
            None,
        ),
    )
    .await;

    assert_eq!(malformed, StatusCode::BAD_REQUEST);
    assert_eq!(unknown, StatusCode::NOT_FOUND);
    assert_eq!(capability, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn member_leaves_project() {
    let app = test_app();
    let project_id = register_project(&app).await;
    let (status, _) = send(
        &app,
        request(
            Method::POST,
            &format!("/api/projects/{project_id}/members"),
            Some(&OWNER),
            Some(json!({ "email": "a@x.com", "role": "Viewer" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (owner_leave, _) = send(
        &app,
        request(
            Method::POST,
            &format!("/api/projects/{project_id}/leave"),
            Some(&OWNER),
            None,
        ),
    )
    .await;
    let (member_leave, _) = send(
        &app,
        request(
            Method::POST,
            &format!("/api/projects/{project_id}/leave"),
            Some(&MEMBER),
            None,
        ),
    )
    .await;
    let (_, members) = send(
        &app,
        request(
            Method::GET,
            &format!("/api/projects/{project_id}/members"),
            Some(&OWNER),
            None,
        ),
    )
    .await;

    assert_eq!(owner_leave, StatusCode::BAD_REQUEST);
    assert_eq!(member_leave, StatusCode::NO_CONTENT);
    assert_eq!(members.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn only_owner_deletes_project() {
    let app = test_app();
    let project_id = register_project(&app).await;
    let uri = format!("/api/projects/{project_id}");

    let (stranger, _) = send(&app, request(Method::DELETE, &uri, Some(&MEMBER), None)).await;
    let (owner, _) = send(&app, request(Method::DELETE, &uri, Some(&OWNER), None)).await;
    let (after, _) = send(&app, request(Method::GET, &uri, Some(&OWNER), None)).await;

    assert_eq!(stranger, StatusCode::FORBIDDEN);
    assert_eq!(owner, StatusCode::NO_CONTENT);
    assert_eq!(after, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn role_bodies_with_unknown_capabilities_are_rejected() {
    let app = test_app();
    let project_id = register_project(&app).await;
    let roles_uri = format!("/api/projects/{project_id}/roles");

    let (misspelled, body) = send(
        &app,
        request(
            Method::POST,
            &roles_uri,
            Some(&OWNER),
            Some(json!({ "name": "Lead", "permissions": { "canManageTeem": true } })),
        ),
    )
    .await;
    assert_eq!(misspelled, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().is_some_and(|message| message.contains("canManageTeem")));

    let (_, roles) = send(&app, request(Method::GET, &roles_uri, Some(&OWNER), None)).await;
    assert_eq!(roles.as_array().map(Vec::len), Some(3));

    let (status, created) = send(
        &app,
        request(
            Method::POST,
            &roles_uri,
            Some(&OWNER),
            Some(json!({ "name": "Lead", "permissions": { "canManageTeam": true } })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let role_ref = created["roleRef"].as_str().unwrap_or_default().to_owned();

    let (update, _) = send(
        &app,
        request(
            Method::PUT,
            &format!("{roles_uri}/{role_ref}"),
            Some(&OWNER),
            Some(json!({ "permissions": { "canViewNote": true } })),
        ),
    )
    .await;
    assert_eq!(update, StatusCode::BAD_REQUEST);
}
