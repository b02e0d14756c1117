//! Raw error text to user-facing messages

use dashboard::error_translator::{translate, ErrorCategory};
use rstest::rstest;

#[rstest]
#[case("connect ECONNREFUSED 127.0.0.1:8096", "Cannot connect to this service")]
#[case("container exited with code 137", "This service ran out of memory")]
#[case("container exited with code 1", "This service stopped unexpectedly")]
#[case("Error: something nobody anticipated", "Something went wrong")]
#[case("", "Something went wrong")]
fn test_required_mappings(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(translate(raw).message, expected);
}

#[rstest]
#[case("econnrefused")]
#[case("Connection Refused by peer")]
fn test_matching_ignores_case(#[case] raw: &str) {
    assert_eq!(translate(raw).rule_index, Some(0));
}

#[rstest]
#[case("Request to /services timed out")]
#[case("bind: address already in use")]
#[case("write /data: no space left on device")]
#[case("GET /services returned HTTP 503: unavailable")]
fn test_known_failures_are_not_fallback(#[case] raw: &str) {
    let friendly = translate(raw);
    assert!(!friendly.is_fallback(), "{} fell through", raw);
    assert!(!friendly.suggestion.is_empty());
}

#[test]
fn test_first_matching_rule_wins() {
    // Mentions both a refused connection and an OOM exit
    let friendly = translate("ECONNREFUSED after container exited with code 137");
    assert_eq!(friendly.rule_index, Some(0));
    assert_eq!(translate("x").category, ErrorCategory::Unknown);
}
