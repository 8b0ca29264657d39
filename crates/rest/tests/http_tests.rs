//! End-to-end tests of the HTTP surface over the in-memory store.

mod common;

use async_trait::async_trait;
use axum::body::Bytes;
use serde_json::{Value, json};

use common::assertions::{assert_error_body, assert_status, column};
use common::fixtures::{BOOKS, grid_body};
use common::harness::{GridTestHarness, server_for};
use docgrid_engine::{Document, DocumentStore, FindQuery, StoreError, StoreResult};
use docgrid_rest::ServerConfig;

/// A store whose every call fails as if the server were down.
struct UnreachableStore;

fn down() -> StoreError {
    StoreError::Unavailable {
        backend_name: "unreachable".to_string(),
        message: "connection refused".to_string(),
    }
}

#[async_trait]
impl DocumentStore for UnreachableStore {
    fn backend_name(&self) -> &'static str {
        "unreachable"
    }

    async fn count(&self, _collection: &str, _filter: &Value) -> StoreResult<u64> {
        Err(down())
    }

    async fn find(&self, _collection: &str, _query: &FindQuery) -> StoreResult<Vec<Document>> {
        Err(down())
    }

    async fn find_one(&self, _collection: &str, _filter: &Value) -> StoreResult<Option<Document>> {
        Err(down())
    }

    async fn insert_one(&self, _collection: &str, _document: Document) -> StoreResult<Value> {
        Err(down())
    }

    async fn update_one(
        &self,
        _collection: &str,
        _filter: &Value,
        _update: &Value,
    ) -> StoreResult<u64> {
        Err(down())
    }

    async fn delete_one(&self, _collection: &str, _filter: &Value) -> StoreResult<u64> {
        Err(down())
    }

    async fn has_text_index(&self, _collection: &str) -> StoreResult<bool> {
        Err(down())
    }
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_reports_backend() {
    let harness = GridTestHarness::new();
    let response = harness.get("/health").await;

    assert_status(&response, 200);
    let body: Value = response.json();
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["backend"], json!("memory"));
}

#[tokio::test]
async fn test_readiness_touches_store() {
    let harness = GridTestHarness::new();
    assert_status(&harness.get("/_readiness").await, 200);
    assert_status(&harness.get("/_liveness").await, 200);

    let server = server_for(UnreachableStore);
    let response = server.get("/_readiness").await;
    assert_status(&response, 503);
    assert_error_body(&response, "store unavailable");
}

// ============================================================================
// Grid
// ============================================================================

#[tokio::test]
async fn test_grid_pages_and_counts() {
    let harness = GridTestHarness::new();
    let response = harness.grid(BOOKS, grid_body("Pages:>100", 0, 2)).await;

    assert_status(&response, 200);
    let body: Value = response.json();
    assert_eq!(body["draw"], json!(1));
    assert_eq!(body["recordsTotal"], json!(5));
    assert_eq!(body["recordsFiltered"], json!(4));
    assert_eq!(column(&body, "Title"), vec!["Brave New World", "Kindred"]);
    assert!(body.get("queryStats").is_none());
}

#[tokio::test]
async fn test_grid_free_text_and_alias_column() {
    let harness = GridTestHarness::new();
    let response = harness.grid(BOOKS, grid_body("orwell", 0, 10)).await;

    let body: Value = response.json();
    assert_eq!(body["recordsFiltered"], json!(2));
    assert_eq!(column(&body, "Title"), vec!["Animal Farm", "Nineteen Eighty-Four"]);
    assert_eq!(column(&body, "City"), vec!["London", "London"]);
    assert_eq!(body["data"][0]["DT_RowId"], json!("65a1b2c3d4e5f60718293a02"));
}

#[tokio::test]
async fn test_grid_unknown_collection_is_empty() {
    let harness = GridTestHarness::new();
    let response = harness.grid("magazines", grid_body("", 0, 10)).await;

    assert_status(&response, 200);
    let body: Value = response.json();
    assert_eq!(body["recordsTotal"], json!(0));
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_grid_diagnostics_from_config() {
    let config = ServerConfig {
        diagnostics: true,
        ..ServerConfig::for_testing()
    };
    let harness = GridTestHarness::with_config(config);
    let response = harness.grid(BOOKS, grid_body("Pages:101-300", 0, 10)).await;

    let body: Value = response.json();
    let stats = &body["queryStats"];
    assert_eq!(stats["usedIndexPath"], json!(false));
    assert_eq!(
        stats["realizedFilter"],
        json!({"Pages": {"$gte": 101, "$lte": 300}})
    );
}

#[tokio::test]
async fn test_grid_max_page_size_caps_unbounded_length() {
    let config = ServerConfig {
        max_page_size: Some(2),
        ..ServerConfig::for_testing()
    };
    let harness = GridTestHarness::with_config(config);
    let response = harness.grid(BOOKS, grid_body("", 0, -1)).await;

    let body: Value = response.json();
    assert_eq!(body["recordsFiltered"], json!(5));
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_grid_malformed_body_is_bad_request() {
    let harness = GridTestHarness::new();

    let response = harness
        .server
        .post("/grid/books")
        .bytes(Bytes::from_static(b"{\"draw\":"))
        .content_type("application/json")
        .await;
    assert_status(&response, 400);
    assert_error_body(&response, "malformed request");

    let response = harness.grid(BOOKS, json!({"columns": "Title"})).await;
    assert_status(&response, 400);
    assert_error_body(&response, "malformed request");
}

#[tokio::test]
async fn test_grid_rejects_reserved_collection() {
    let harness = GridTestHarness::new();
    let response = harness.grid("system.books", grid_body("", 0, 10)).await;

    assert_status(&response, 400);
    assert_error_body(&response, "invalid collection name");
}

#[tokio::test]
async fn test_grid_store_failure_is_unavailable() {
    let server = server_for(UnreachableStore);
    let response = server.post("/grid/books").json(&grid_body("", 0, 10)).await;

    assert_status(&response, 503);
    assert_error_body(&response, "store unavailable");
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let config = ServerConfig {
        enable_request_id: true,
        ..ServerConfig::for_testing()
    };
    let harness = GridTestHarness::with_config(config);
    let response = harness.get("/health").await;
    assert!(response.headers().contains_key("x-request-id"));

    let harness = GridTestHarness::new();
    let response = harness.get("/health").await;
    assert!(!response.headers().contains_key("x-request-id"));
}

// ============================================================================
// Editor
// ============================================================================

#[tokio::test]
async fn test_editor_create_then_search() {
    let harness = GridTestHarness::new();
    let response = harness
        .edit(
            BOOKS,
            json!({
                "action": "create",
                "data": {"0": {"Title": "Dawn", "Author": "Octavia E. Butler", "Pages": "248", "City": "Lagos"}}
            }),
        )
        .await;

    assert_status(&response, 200);
    let body: Value = response.json();
    assert!(body.get("error").is_none());
    let row = &body["data"][0];
    assert_eq!(row["Pages"], json!(248));
    assert_eq!(row["address"], json!({"city": "Lagos"}));
    assert_eq!(row["DT_RowId"].as_str().unwrap().len(), 24);
    assert_eq!(harness.store.snapshot(BOOKS).len(), 6);

    let response = harness.grid(BOOKS, grid_body("Pages:248", 0, 10)).await;
    let body: Value = response.json();
    assert_eq!(column(&body, "City"), vec!["Lagos"]);
}

#[tokio::test]
async fn test_editor_edit_with_query_ids() {
    let harness = GridTestHarness::new();
    let response = harness
        .edit_with_ids(
            BOOKS,
            "65a1b2c3d4e5f60718293a03",
            json!({
                "action": "edit",
                "data": {"65a1b2c3d4e5f60718293a03": {"Pages": "102"}}
            }),
        )
        .await;

    let body: Value = response.json();
    assert_eq!(body["outcomes"][0]["status"], json!("applied"));
    assert_eq!(body["data"][0]["Pages"], json!(102));
    assert_eq!(body["data"][0]["address"], json!({"city": "Godalming"}));
}

#[tokio::test]
async fn test_editor_remove_with_query_ids() {
    let harness = GridTestHarness::new();
    let response = harness
        .edit_with_ids(
            BOOKS,
            "65a1b2c3d4e5f60718293a01, 65a1b2c3d4e5f60718293a02",
            json!({"action": "remove"}),
        )
        .await;

    assert_status(&response, 200);
    let body: Value = response.json();
    assert_eq!(body["outcomes"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"], json!([]));
    assert_eq!(harness.store.snapshot(BOOKS).len(), 3);
}

#[tokio::test]
async fn test_editor_partial_failure_is_still_ok() {
    let harness = GridTestHarness::new();
    let response = harness
        .edit(
            BOOKS,
            json!({
                "action": "remove",
                "ids": ["65a1b2c3d4e5f60718293a05", "missing-row"]
            }),
        )
        .await;

    assert_status(&response, 200);
    let body: Value = response.json();
    assert_eq!(body["outcomes"][0]["status"], json!("applied"));
    assert_eq!(body["outcomes"][1]["status"], json!("failed"));
    assert!(body["error"].as_str().unwrap().contains("missing-row"));
}

#[tokio::test]
async fn test_editor_rejects_malformed_requests() {
    let harness = GridTestHarness::new();

    let response = harness.edit(BOOKS, json!({"data": {}})).await;
    assert_status(&response, 400);
    assert_error_body(&response, "missing required field: action");

    let response = harness.edit(BOOKS, json!({"action": "upsert"})).await;
    assert_status(&response, 400);
    assert_error_body(&response, "unsupported action: upsert");

    let response = harness.edit(BOOKS, json!({"action": "edit"})).await;
    assert_status(&response, 400);
    assert_error_body(&response, "document id is required for edit");

    assert_eq!(harness.store.snapshot(BOOKS).len(), 5);
}

#[tokio::test]
async fn test_editor_store_failure_is_per_target() {
    let server = server_for(UnreachableStore);
    let response = server
        .post("/editor/books")
        .json(&json!({"action": "remove", "ids": "a,b"}))
        .await;

    assert_status(&response, 200);
    let body: Value = response.json();
    let outcomes = body["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o["status"] == json!("failed")));
}
