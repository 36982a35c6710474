//! Result presenter
//!
//! Turns an extraction outcome into the text handed back to the agent.

use scrapezy_core::domain::ExtractionOutcome;

/// Renders an outcome as agent-readable text
///
/// Success payloads are pretty-printed JSON whatever their shape; failures
/// become a single line naming the requested URL.
pub fn render(url: &str, outcome: &ExtractionOutcome) -> String {
    match outcome {
        ExtractionOutcome::Success { data } => {
            serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
        }
        ExtractionOutcome::Failure(failure) => {
            format!("Failed to extract data from {}: {}", url, failure.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrapezy_core::domain::FailureKind;
    use serde_json::json;

    #[test]
    fn test_render_success_pretty_prints() {
        let outcome = ExtractionOutcome::success(json!({"links": [1]}));
        let text = render("https://example.com", &outcome);
        assert_eq!(text, "{\n  \"links\": [\n    1\n  ]\n}");
    }

    #[test]
    fn test_render_scalar_payload() {
        let outcome = ExtractionOutcome::success(json!("plain text"));
        assert_eq!(render("https://example.com", &outcome), "\"plain text\"");
    }

    #[test]
    fn test_render_failure_names_url() {
        let outcome = ExtractionOutcome::failure(FailureKind::Timeout, "Extraction job timed out");
        assert_eq!(
            render("https://example.com/a", &outcome),
            "Failed to extract data from https://example.com/a: Extraction job timed out"
        );
    }

    #[test]
    fn test_render_is_idempotent() {
        let outcomes = [
            ExtractionOutcome::success(json!({"b": 2, "a": [true, null]})),
            ExtractionOutcome::failure(FailureKind::Job, "Unknown error"),
        ];
        for outcome in &outcomes {
            assert_eq!(
                render("https://example.com", outcome),
                render("https://example.com", outcome)
            );
        }
    }
}
