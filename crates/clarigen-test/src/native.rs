//! `clarity-cli` process provider.
//!
//! Every operation spawns the binary against one VM state database and reads a
//! single JSON object from stdout. Round trips are serialized through an async
//! mutex so concurrent callers never interleave writes to the database.
//!
//! No timeout is applied: a hung `clarity-cli` hangs the awaiting caller.

use crate::backend::{ClarityBackend, EvalReceipt, ExecuteReceipt, ExecuteRequest, ProviderError};
use crate::config::ClarityBinConfig;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub struct NativeClarityBin {
    bin_path: PathBuf,
    db_path: PathBuf,
    // keeps the scratch database alive for the provider's lifetime
    _scratch: TempDir,
    lock: Mutex<()>,
}

impl NativeClarityBin {
    /// Create a fresh VM database, seeded with the configured allocations
    pub async fn create(config: &ClarityBinConfig) -> Result<Self, ProviderError> {
        let scratch = tempfile::Builder::new().prefix("clarigen-").tempdir()?;
        let db_path = config
            .db_path
            .clone()
            .unwrap_or_else(|| scratch.path().join("vm-state.db"));

        let allocations_path = scratch.path().join("allocations.json");
        let allocations = serde_json::to_vec(&config.allocations).map_err(|source| {
            ProviderError::InvalidJson {
                command: "initialize".to_string(),
                source,
            }
        })?;
        tokio::fs::write(&allocations_path, allocations).await?;

        let provider = Self {
            bin_path: config.bin_path.clone(),
            db_path,
            _scratch: scratch,
            lock: Mutex::new(()),
        };

        provider
            .run_command::<Value>(
                vec![
                    "initialize".to_string(),
                    path_arg(&allocations_path),
                    path_arg(&provider.db_path),
                ],
                None,
            )
            .await?;

        info!(
            db = %provider.db_path.display(),
            allocations = config.allocations.len(),
            "Clarity VM database initialized"
        );

        Ok(provider)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    async fn run_command<T: DeserializeOwned>(
        &self,
        args: Vec<String>,
        stdin: Option<&str>,
    ) -> Result<T, ProviderError> {
        let command = args.first().cloned().unwrap_or_default();
        let _guard = self.lock.lock().await;

        debug!(bin = %self.bin_path.display(), args = ?args, "Running clarity-cli");

        let mut child = Command::new(&self.bin_path)
            .args(&args)
            .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProviderError::Spawn {
                bin: self.bin_path.display().to_string(),
                source,
            })?;

        if let (Some(input), Some(mut handle)) = (stdin, child.stdin.take()) {
            handle.write_all(input.as_bytes()).await?;
            // dropping the handle closes stdin so the program is read to EOF
            drop(handle);
        }

        let output = child.wait_with_output().await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let parsed: Result<Value, _> = serde_json::from_str(stdout.trim());

        if let Ok(Value::Object(ref body)) = parsed {
            if let Some(error) = body.get("error") {
                return Err(ProviderError::Reported {
                    command,
                    message: error.to_string(),
                });
            }
        }

        if !output.status.success() {
            return Err(ProviderError::Exit {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let value = parsed.map_err(|source| ProviderError::InvalidJson {
            command: command.clone(),
            source,
        })?;
        serde_json::from_value(value).map_err(|source| ProviderError::InvalidJson { command, source })
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[async_trait]
impl ClarityBackend for NativeClarityBin {
    async fn launch(&self, contract_id: &str, contract_file: &Path) -> Result<(), ProviderError> {
        self.run_command::<Value>(
            vec![
                "launch".to_string(),
                contract_id.to_string(),
                path_arg(contract_file),
                path_arg(&self.db_path),
            ],
            None,
        )
        .await?;
        Ok(())
    }

    async fn eval_raw(&self, contract_id: &str, code: &str) -> Result<EvalReceipt, ProviderError> {
        let body: Value = self
            .run_command(
                vec![
                    "eval_raw".to_string(),
                    contract_id.to_string(),
                    path_arg(&self.db_path),
                ],
                Some(code),
            )
            .await?;

        if body.get("success").and_then(Value::as_bool) == Some(false) {
            return Err(ProviderError::Reported {
                command: "eval_raw".to_string(),
                message: body
                    .get("output")
                    .map(|o| o.to_string())
                    .unwrap_or_else(|| body.to_string()),
            });
        }

        serde_json::from_value(body).map_err(|source| ProviderError::InvalidJson {
            command: "eval_raw".to_string(),
            source,
        })
    }

    async fn execute(&self, request: ExecuteRequest<'_>) -> Result<ExecuteReceipt, ProviderError> {
        let mut args = vec![
            "execute".to_string(),
            path_arg(&self.db_path),
            request.contract_id.to_string(),
            request.function.to_string(),
            request.sender.to_string(),
        ];
        args.extend(request.args.iter().cloned());
        self.run_command(args, None).await
    }
}

/// Provision a native provider for the given configuration
pub async fn create_clarity_bin(config: &ClarityBinConfig) -> Result<Arc<NativeClarityBin>, ProviderError> {
    Ok(Arc::new(NativeClarityBin::create(config).await?))
}
