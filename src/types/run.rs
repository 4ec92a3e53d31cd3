//! Request and result shapes for a run.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Body of `POST /run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RunRequest {
    /// The natural-language query to execute.
    #[schemars(length(min = 1))]
    pub query: String,

    /// Tool identifiers the agent may use, in order. Omit to allow every
    /// registered tool.
    #[serde(default)]
    pub tools: Option<Vec<String>>,
}

/// Final output of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RunOutput {
    /// The answer produced by the agent.
    pub value: String,
    /// Natural-language summary of how the answer was reached.
    pub summary: String,
}

/// Body returned by `POST /run`.
///
/// Exactly one of `result` and `error` is set, matching `success`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunResult {
    /// Whether the execution was successful.
    pub success: bool,
    /// The result of the execution.
    pub result: Option<RunOutput>,
    /// Error message if execution failed.
    pub error: Option<String>,
    /// Execution time in seconds.
    pub execution_time: f64,
}

impl RunResult {
    pub fn succeeded(output: RunOutput, elapsed: Duration) -> Self {
        Self {
            success: true,
            result: Some(output),
            error: None,
            execution_time: elapsed.as_secs_f64(),
        }
    }

    pub fn failed(error: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
            execution_time: elapsed.as_secs_f64(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_tools_optional() {
        let req: RunRequest = serde_json::from_str(r#"{"query":"What is 2+2?"}"#).unwrap();
        assert_eq!(req.query, "What is 2+2?");
        assert!(req.tools.is_none());

        let req: RunRequest =
            serde_json::from_str(r#"{"query":"q","tools":["calculator_tool","search_tool"]}"#)
                .unwrap();
        assert_eq!(
            req.tools.unwrap(),
            vec!["calculator_tool".to_string(), "search_tool".to_string()]
        );
    }

    #[test]
    fn test_request_rejects_unknown_fields() {
        let err = serde_json::from_str::<RunRequest>(r#"{"query":"q","tool":["x"]}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_failed_result_serializes_null_result() {
        let result = RunResult::failed("Test error message", Duration::from_millis(1200));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["result"].is_null());
        assert_eq!(json["error"], "Test error message");
        assert_eq!(json["execution_time"], 1.2);
    }

    #[test]
    fn test_succeeded_result_serializes_null_error() {
        let output = RunOutput {
            value: "4.0".into(),
            summary: "2+2 evaluated to 4.0".into(),
        };
        let result = RunResult::succeeded(output, Duration::from_millis(2500));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["result"]["value"], "4.0");
        assert!(json.get("error").is_some());
        assert!(json["error"].is_null());
        assert_eq!(json["execution_time"], 2.5);
    }
}
