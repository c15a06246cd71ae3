use hireflow_core::FlowError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// How positions are processed.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStrategy {
    /// One browser session, positions strictly in order.
    #[default]
    Standard,
    /// Reserved for fanning positions out over several sessions.
    Parallel,
}

impl ExecutionStrategy {
    /// The strategy a run actually uses.
    pub fn effective(self) -> Self {
        match self {
            ExecutionStrategy::Parallel => {
                warn!("parallel execution is not available yet, falling back to standard");
                ExecutionStrategy::Standard
            }
            other => other,
        }
    }
}

impl FromStr for ExecutionStrategy {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(ExecutionStrategy::Standard),
            "parallel" => Ok(ExecutionStrategy::Parallel),
            other => Err(FlowError::configuration(format!(
                "Unsupported strategy: {} (expected standard or parallel)",
                other
            ))),
        }
    }
}
