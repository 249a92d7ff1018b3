//! Contract-evaluation backend interface
use async_trait::async_trait;
use clarigen_core::ClarigenError;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to spawn {bin}: {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("`{command}` exited with {status}: {stderr}")]
    Exit {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("Invalid JSON from `{command}`: {source}")]
    InvalidJson {
        command: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("`{command}` reported an error: {message}")]
    Reported { command: String, message: String },
}

impl From<ProviderError> for ClarigenError {
    fn from(err: ProviderError) -> Self {
        ClarigenError::Provider(err.to_string())
    }
}

/// Result of evaluating an expression against a deployed contract
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EvalReceipt {
    #[serde(alias = "output_serialized")]
    pub result_raw: String,
}

/// Result of executing a public function
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExecuteReceipt {
    pub success: bool,
    #[serde(alias = "output_serialized")]
    pub result_raw: String,
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Copy)]
pub struct ExecuteRequest<'a> {
    pub contract_id: &'a str,
    pub sender: &'a str,
    pub function: &'a str,
    pub args: &'a [String],
}

/// Build the expression `(function arg1 arg2 …)`
pub fn call_expression(function: &str, args: &[String]) -> String {
    if args.is_empty() {
        format!("({})", function)
    } else {
        format!("({} {})", function, args.join(" "))
    }
}

/// A process (or stand-in) able to deploy and run Clarity contracts.
///
/// Arguments are Clarity literal strings, not serialized bytes. Implementations
/// must not overlap round trips against the same VM state.
#[async_trait]
pub trait ClarityBackend: Send + Sync {
    async fn launch(&self, contract_id: &str, contract_file: &Path) -> Result<(), ProviderError>;

    async fn eval_raw(&self, contract_id: &str, code: &str) -> Result<EvalReceipt, ProviderError>;

    async fn execute(&self, request: ExecuteRequest<'_>) -> Result<ExecuteReceipt, ProviderError>;

    /// Evaluate a read-only call in the context of `contract_id`
    async fn evaluate(
        &self,
        contract_id: &str,
        function: &str,
        args: &[String],
    ) -> Result<EvalReceipt, ProviderError> {
        self.eval_raw(contract_id, &call_expression(function, args)).await
    }
}
