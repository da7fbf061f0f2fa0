// Content-addressed identity of test results

use crate::model::{Parameter, TestResult};
use md5::{Digest, Md5};
use std::cmp::Ordering;

/// Hex-encoded md5 digest of a string
pub fn md5(data: &str) -> String {
    hex::encode(Md5::digest(data.as_bytes()))
}

/// Test case id: the hash of the full name, if there is one
pub fn test_case_id(result: &TestResult) -> Option<String> {
    result.full_name.as_deref().map(md5)
}

/// History id used to match the same test across runs.
///
/// An explicitly set history id is returned untouched. Otherwise the base id is the
/// test case id (or the hash of the full name) combined with a hash of the
/// non-excluded parameters, which are sorted first so call order does not matter.
/// Returns `None` when the test has neither a test case id nor a full name.
pub fn history_id(result: &TestResult) -> Option<String> {
    if let Some(history_id) = &result.history_id {
        return Some(history_id.clone());
    }

    let base = result
        .test_case_id
        .clone()
        .or_else(|| result.full_name.as_deref().map(md5))?;

    Some(format!(
        "{}:{}",
        base,
        md5(&canonical_parameters(&result.parameters))
    ))
}

fn canonical_parameters(parameters: &[Parameter]) -> String {
    let mut included: Vec<&Parameter> = parameters.iter().filter(|p| !p.is_excluded()).collect();
    included.sort_by(|a, b| {
        compare_text(&a.name, &b.name).then_with(|| compare_text(&a.value, &b.value))
    });

    included
        .iter()
        .map(|p| format!("{}:{}", p.name, p.value))
        .collect::<Vec<_>>()
        .join(",")
}

// Case-insensitive first so "b" sorts before "C", then exact order as a tie-break.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
