//! `GitlabClient` against a local fake of the GitLab REST API.

use std::collections::HashMap;
use std::path::Path as FsPath;

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;
use tokio::net::TcpListener;

use rolegraph::core::RolegraphError;
use rolegraph::gitlab::{GitlabClient, ProjectHost};
use rolegraph::inventory::{EntityId, InventoryBuilder};
use rolegraph::test_utils::test_settings;

const TOKEN: &str = "glpat-test";

fn project(id: u64, name: &str, path: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "path_with_namespace": path,
        "default_branch": "main",
        "ssh_url_to_repo": format!("git@gitlab.example.com:{path}.git"),
        "web_url": format!("https://gitlab.example.com/{path}"),
        "archived": false,
        "visibility": "internal"
    })
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"message": "404 Not Found"}))).into_response()
}

async fn user(headers: HeaderMap) -> Response {
    if headers.get("private-token").and_then(|v| v.to_str().ok()) == Some(TOKEN) {
        Json(json!({"id": 1, "username": "inventory"})).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"message": "401 Unauthorized"}))).into_response()
    }
}

async fn projects(Query(query): Query<HashMap<String, String>>) -> Response {
    assert_eq!(query.get("visibility").map(String::as_str), Some("internal"));
    assert_eq!(query.get("per_page").map(String::as_str), Some("100"));

    match query.get("page").map(String::as_str).unwrap_or("1") {
        "1" => (
            [("x-next-page", "2")],
            Json(json!([project(12, "webserver", "infra/webserver")])),
        )
            .into_response(),
        _ => (
            [("x-next-page", "")],
            Json(json!([
                project(5, "site", "ops/site"),
                project(99, "broken", "infra/broken")
            ])),
        )
            .into_response(),
    }
}

async fn project_by_id(Path(id): Path<u64>) -> Response {
    match id {
        12 => Json(project(12, "webserver", "infra/webserver")).into_response(),
        5 => Json(project(5, "site", "ops/site")).into_response(),
        99 => Json(project(99, "broken", "infra/broken")).into_response(),
        _ => not_found(),
    }
}

async fn tree(Path(id): Path<u64>, Query(query): Query<HashMap<String, String>>) -> Response {
    assert_eq!(query.get("ref").map(String::as_str), Some("main"));
    let path = query.get("path").cloned().unwrap_or_default();

    let file = |name: &str| {
        json!({
            "id": format!("{id}-{path}-{name}"),
            "name": name,
            "type": "blob",
            "path": format!("{path}/{name}"),
            "mode": "100644"
        })
    };

    match (id, path.as_str()) {
        (12, "meta") => Json(json!([file("main.yml")])).into_response(),
        (5, "roles") => Json(json!([file("requirements.yml"), file("README.md")])).into_response(),
        (99, _) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => not_found(),
    }
}

async fn blob(Path((id, sha)): Path<(u64, String)>) -> Response {
    let content = match sha.as_str() {
        "12-meta-main.yml" => "galaxy_info:\n  description: Installs nginx\n  platforms:\n    - name: Ubuntu\n      versions: [22.04]\n",
        "5-roles-requirements.yml" => "- src: git@gitlab.example.com:infra/webserver.git\n  name: webserver\n",
        _ => return not_found(),
    };
    Json(json!({
        "content": STANDARD.encode(content),
        "encoding": "base64",
        "size": content.len(),
        "sha": sha,
        "project": id
    }))
    .into_response()
}

async fn tags(Path(id): Path<u64>) -> Response {
    match id {
        12 => Json(json!([{"name": "v1.1.0"}, {"name": "v1.0.0"}])).into_response(),
        _ => Json(json!([])).into_response(),
    }
}

async fn spawn_fake_gitlab() -> String {
    let router = Router::new()
        .route("/api/v4/user", get(user))
        .route("/api/v4/projects", get(projects))
        .route("/api/v4/projects/{id}", get(project_by_id))
        .route("/api/v4/projects/{id}/repository/tree", get(tree))
        .route("/api/v4/projects/{id}/repository/blobs/{sha}", get(blob))
        .route("/api/v4/projects/{id}/repository/tags", get(tags));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/")
}

#[tokio::test]
async fn test_authenticate_with_token() {
    let base = spawn_fake_gitlab().await;

    let client = GitlabClient::new(&base, Some(TOKEN.to_string())).unwrap();
    client.authenticate().await.unwrap();

    let client = GitlabClient::new(&base, Some("wrong".to_string())).unwrap();
    let err = client.authenticate().await.unwrap_err();
    assert!(matches!(err, RolegraphError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn test_project_listing_follows_pages() {
    let base = spawn_fake_gitlab().await;
    let client = GitlabClient::new(&base, Some(TOKEN.to_string())).unwrap();

    let projects = client.list_projects("internal").await.unwrap();

    let paths: Vec<&str> = projects.iter().map(|p| p.path_with_namespace.as_str()).collect();
    assert_eq!(paths, vec!["infra/webserver", "ops/site", "infra/broken"]);
}

#[tokio::test]
async fn test_missing_tree_is_none() {
    let base = spawn_fake_gitlab().await;
    let client = GitlabClient::new(&base, Some(TOKEN.to_string())).unwrap();

    assert!(client.list_tree(12, "roles", "main").await.unwrap().is_none());
    let entries = client.list_tree(12, "meta", "main").await.unwrap().unwrap();
    assert_eq!(entries[0].name, "main.yml");

    let err = client.list_tree(99, "meta", "main").await.unwrap_err();
    assert!(matches!(err, RolegraphError::Api { status: 500, .. }));
}

#[tokio::test]
async fn test_inventory_over_http() {
    let base = spawn_fake_gitlab().await;
    let client = GitlabClient::new(&base, Some(TOKEN.to_string())).unwrap();
    let settings = test_settings(&["infra/web", "ops/"], FsPath::new("."));

    let inventory = InventoryBuilder::new(&client, &settings).build().await.unwrap();

    let webserver = inventory.get("webserver-12").unwrap();
    assert_eq!(webserver.used_by, vec![EntityId::from("site-5")]);
    assert_eq!(webserver.repository().unwrap().git_tags, vec!["v1.1.0", "v1.0.0"]);
    assert_eq!(webserver.web_url(), "https://gitlab.example.com/infra/webserver");
    assert!(inventory.get("site-5").is_some());
    assert_eq!(inventory.placeholders, 0);
}

#[tokio::test]
async fn test_listing_failure_aborts_inventory() {
    let base = spawn_fake_gitlab().await;
    let client = GitlabClient::new(&base, Some(TOKEN.to_string())).unwrap();
    let settings = test_settings(&["infra/broken"], FsPath::new("."));

    let err = InventoryBuilder::new(&client, &settings).build().await.unwrap_err();

    assert!(matches!(err, RolegraphError::TreeListingFailed { ref project, .. } if project == "infra/broken"));
    assert_eq!(err.exit_code(), 255);
}
