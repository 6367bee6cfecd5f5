//! Outcome envelope returned across the runner boundary

use crate::{Stage, StageFailure};
use serde::{Deserialize, Serialize};

/// Result of one pipeline run
///
/// This is the only value that leaves the runner: either the final payload
/// or the failure of the first stage that did not complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OutcomeEnvelope<T> {
    Success { result: T },
    Failure(StageFailure),
}

impl<T> OutcomeEnvelope<T> {
    pub fn success(result: T) -> Self {
        Self::Success { result }
    }

    pub fn failure(failure: StageFailure) -> Self {
        Self::Failure(failure)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Stage that failed, if any
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            Self::Success { .. } => None,
            Self::Failure(failure) => Some(failure.stage),
        }
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            Self::Success { result } => Some(result),
            Self::Failure(_) => None,
        }
    }

    pub fn into_result(self) -> Result<T, StageFailure> {
        match self {
            Self::Success { result } => Ok(result),
            Self::Failure(failure) => Err(failure),
        }
    }
}

impl<T> From<Result<T, StageFailure>> for OutcomeEnvelope<T> {
    fn from(result: Result<T, StageFailure>) -> Self {
        match result {
            Ok(value) => Self::success(value),
            Err(failure) => Self::failure(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accessors() {
        let ok: OutcomeEnvelope<u32> = OutcomeEnvelope::success(7);
        assert!(ok.is_success());
        assert_eq!(ok.result(), Some(&7));
        assert_eq!(ok.failed_stage(), None);

        let failed: OutcomeEnvelope<u32> =
            OutcomeEnvelope::failure(StageFailure::new(Stage::Parse, "no ticker"));
        assert!(!failed.is_success());
        assert_eq!(failed.failed_stage(), Some(Stage::Parse));
        assert!(failed.result().is_none());
        assert_eq!(failed.into_result().unwrap_err().message, "no ticker");
    }

    #[test]
    fn test_serialized_shape() {
        let ok: OutcomeEnvelope<u32> = OutcomeEnvelope::success(7);
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"outcome": "success", "result": 7})
        );

        let failed: OutcomeEnvelope<u32> =
            OutcomeEnvelope::failure(StageFailure::new(Stage::Execute, "No data returned"));
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"outcome": "failure", "stage": "execute", "message": "No data returned"})
        );
    }

    #[test]
    fn test_from_result() {
        let envelope: OutcomeEnvelope<&str> = Ok("done").into();
        assert_eq!(envelope, OutcomeEnvelope::success("done"));
    }
}
