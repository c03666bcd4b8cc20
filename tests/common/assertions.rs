//! Custom assertions for integration tests

use serde_json::Value;

/// Assert that output is valid JSON and return parsed value
pub fn assert_valid_json(output: &str, context: &str) -> Value {
    serde_json::from_str(output).unwrap_or_else(|e| {
        panic!(
            "Expected valid JSON ({}): {}\nOutput:\n{}",
            context, e, output
        )
    })
}

/// Assert that JSON output has expected type
pub fn assert_json_type(json: &Value, expected_type: &str) {
    let actual_type = json["_type"]
        .as_str()
        .unwrap_or_else(|| panic!("JSON missing '_type' field"));
    assert_eq!(
        actual_type, expected_type,
        "Expected JSON type '{}' but got '{}'",
        expected_type, actual_type
    );
}

/// Assert that output contains a string
pub fn assert_contains(output: &str, needle: &str, context: &str) {
    assert!(
        output.contains(needle),
        "Expected output to contain '{}' ({})\nOutput:\n{}",
        needle,
        context,
        output
    );
}

/// Paths of all file matches in a search result document
pub fn result_paths(json: &Value) -> Vec<String> {
    json["results"]
        .as_array()
        .map(|results| {
            results
                .iter()
                .filter_map(|r| r["path"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

/// Sorted repository names in one of the aggregate's status lists
pub fn aggregate_names(json: &Value, list: &str) -> Vec<String> {
    let mut names: Vec<String> = json["aggregate"][list]
        .as_array()
        .map(|repos| {
            repos
                .iter()
                .filter_map(|r| r["name"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

/// Symbol names across all file matches
pub fn symbol_names(json: &Value) -> Vec<String> {
    let mut names = Vec::new();
    if let Some(results) = json["results"].as_array() {
        for result in results {
            if let Some(symbols) = result["symbols"].as_array() {
                names.extend(
                    symbols
                        .iter()
                        .filter_map(|s| s["name"].as_str().map(String::from)),
                );
            }
        }
    }
    names.sort();
    names
}
