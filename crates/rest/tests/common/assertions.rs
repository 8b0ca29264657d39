//! HTTP response assertions.

use axum_test::TestResponse;
use serde_json::Value;

/// Asserts that the response has the expected status code.
pub fn assert_status(response: &TestResponse, expected: u16) {
    let actual = response.status_code().as_u16();
    assert_eq!(
        actual, expected,
        "Expected status {}, got {}",
        expected, actual
    );
}

/// Asserts that the response is a protocol error whose message contains `needle`.
pub fn assert_error_body(response: &TestResponse, needle: &str) {
    let body: Value = response.json();
    let message = body["error"]
        .as_str()
        .unwrap_or_else(|| panic!("Expected an error message, got {}", body));
    assert!(
        message.contains(needle),
        "Expected error containing '{}', got '{}'",
        needle,
        message
    );
}

/// Collects one column of a response's rows as strings.
pub fn column(body: &Value, key: &str) -> Vec<String> {
    body["data"]
        .as_array()
        .map(|rows| {
            rows.iter()
                .map(|row| match &row[key] {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}
