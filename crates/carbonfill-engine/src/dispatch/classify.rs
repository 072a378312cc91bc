//! Failure classification for service error bodies.

use carbonfill_types::Outcome;
use serde_json::Value;

/// Classify a non-success response body.
///
/// A JSON body whose `error_code` is one of `no_match_codes` is a domain
/// error; anything else is a transport error carrying the raw body.
#[must_use]
pub fn classify_failure(status: u16, body: String, no_match_codes: &[String]) -> Outcome {
    if let Ok(parsed) = serde_json::from_str::<Value>(&body) {
        if let Some(outcome) = domain_error(&parsed, no_match_codes) {
            return outcome;
        }
    }
    Outcome::TransportError { status, body }
}

/// Domain error for a parsed error object, if its code is a no-match code.
#[must_use]
pub fn domain_error(error: &Value, no_match_codes: &[String]) -> Option<Outcome> {
    let code = error.get("error_code").and_then(Value::as_str)?;
    if !no_match_codes.iter().any(|c| c == code) {
        return None;
    }
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some(Outcome::DomainError {
        code: code.to_string(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbonfill_types::FailureMarker;

    fn codes() -> Vec<String> {
        vec!["no_emission_factors_found".to_string()]
    }

    #[test]
    fn test_no_match_code_is_domain_error() {
        let body = r#"{"error":"bad_request","error_code":"no_emission_factors_found","message":"Nothing matched"}"#;
        let outcome = classify_failure(400, body.to_string(), &codes());
        assert_eq!(
            outcome,
            Outcome::DomainError {
                code: "no_emission_factors_found".into(),
                message: "Nothing matched".into(),
            }
        );
        assert_eq!(outcome.failure_marker(), Some(FailureMarker::NoMatchFound));
    }

    #[test]
    fn test_other_code_is_transport_error() {
        let body = r#"{"error_code":"invalid_request","message":"bad"}"#;
        let outcome = classify_failure(400, body.to_string(), &codes());
        assert_eq!(outcome.failure_marker(), Some(FailureMarker::ApiError));
        assert_eq!(outcome.service_message().as_deref(), Some("bad"));
    }

    #[test]
    fn test_non_json_body_is_transport_error() {
        let outcome = classify_failure(502, "Bad Gateway".to_string(), &codes());
        assert_eq!(
            outcome,
            Outcome::TransportError {
                status: 502,
                body: "Bad Gateway".into(),
            }
        );
    }

    #[test]
    fn test_missing_code_is_transport_error() {
        let outcome = classify_failure(404, r#"{"message":"Not found"}"#.to_string(), &codes());
        assert!(matches!(outcome, Outcome::TransportError { status: 404, .. }));
    }
}
