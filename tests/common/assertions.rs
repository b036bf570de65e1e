//! Assertion macros for API error bodies

/// Assert a `{ "msg": ..., "status": ... }` error response
#[macro_export]
macro_rules! assert_error_msg {
    ($response:expr, $status:expr, $msg:expr) => {{
        let response = &$response;
        response.assert_status($status);
        let body: serde_json::Value = response.json();
        pretty_assertions::assert_eq!(body["msg"], $msg);
        pretty_assertions::assert_eq!(body["status"], $status.as_u16());
    }};
}

/// Assert a validation response listing errors for exactly these params
#[macro_export]
macro_rules! assert_field_errors {
    ($response:expr, $status:expr, [$($param:expr),* $(,)?]) => {{
        let response = &$response;
        response.assert_status($status);
        let body: serde_json::Value = response.json();
        let mut params: Vec<String> = body["errors"]
            .as_array()
            .expect("errors array")
            .iter()
            .map(|e| e["param"].as_str().expect("param").to_string())
            .collect();
        params.sort();
        params.dedup();
        let mut expected: Vec<String> = vec![$($param.to_string()),*];
        expected.sort();
        pretty_assertions::assert_eq!(params, expected);
    }};
}
