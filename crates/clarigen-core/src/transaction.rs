//! Deferred state-changing calls.
//!
//! A [`Transaction`] moves `created -> submitted`, exactly once, through
//! [`Transaction::submit`]. Submission yields a [`Receipt`]; results are only
//! reachable from the receipt, so reading a result before submitting cannot be
//! expressed. Resolving a receipt decodes the raw bytes the backend returned and
//! never talks to the backend again.

use crate::codec::decode_hex;
use crate::error::{ClarigenError, Result};
use crate::value::ClarityValue;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default)]
pub struct SubmitOptions {
    pub sender: Option<String>,
}

impl SubmitOptions {
    pub fn sender(sender: impl Into<String>) -> Self {
        Self {
            sender: Some(sender.into()),
        }
    }
}

/// Executes a prepared call on behalf of a sender
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, sender: &str) -> Result<Receipt>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Created,
    Submitted,
}

enum TxState {
    Unsubmitted(Box<dyn Submitter>),
    Submitted,
}

pub struct Transaction {
    state: TxState,
}

impl Transaction {
    pub fn new(submitter: impl Submitter + 'static) -> Self {
        Self {
            state: TxState::Unsubmitted(Box::new(submitter)),
        }
    }

    pub fn status(&self) -> TxStatus {
        match self.state {
            TxState::Unsubmitted(_) => TxStatus::Created,
            TxState::Submitted => TxStatus::Submitted,
        }
    }

    /// Submit the call as `options.sender`.
    ///
    /// Fails with [`ClarigenError::MissingSender`] without side effects when no
    /// sender is given, and with [`ClarigenError::DoubleSubmit`] on any call
    /// after the first accepted one. A backend failure still consumes the
    /// transaction.
    pub async fn submit(&mut self, options: SubmitOptions) -> Result<Receipt> {
        if matches!(self.state, TxState::Submitted) {
            return Err(ClarigenError::DoubleSubmit);
        }

        let sender = match options.sender.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => return Err(ClarigenError::MissingSender),
        };

        match std::mem::replace(&mut self.state, TxState::Submitted) {
            TxState::Unsubmitted(submitter) => submitter.submit(&sender).await,
            TxState::Submitted => Err(ClarigenError::DoubleSubmit),
        }
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("status", &self.status())
            .finish()
    }
}

/// Outcome of a resolved transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionResult {
    pub is_ok: bool,
    /// `value` wrapped as `(ok …)` or `(err …)`
    pub response: ClarityValue,
    pub value: ClarityValue,
}

/// Execution receipt: success flag plus the raw serialized result
#[derive(Debug)]
pub struct Receipt {
    success: bool,
    result_raw: String,
    events: Vec<serde_json::Value>,
    resolved: OnceLock<TransactionResult>,
}

impl Receipt {
    pub fn new(success: bool, result_raw: impl Into<String>) -> Self {
        Self {
            success,
            result_raw: result_raw.into(),
            events: Vec::new(),
            resolved: OnceLock::new(),
        }
    }

    pub fn with_events(mut self, events: Vec<serde_json::Value>) -> Self {
        self.events = events;
        self
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn result_raw(&self) -> &str {
        &self.result_raw
    }

    pub fn events(&self) -> &[serde_json::Value] {
        &self.events
    }

    /// Decode the result. A failed execution resolves to `is_ok: false`
    /// rather than an error; only undecodable bytes fail.
    pub fn get_result(&self) -> Result<TransactionResult> {
        if let Some(resolved) = self.resolved.get() {
            return Ok(resolved.clone());
        }

        let value = decode_hex(&self.result_raw)?;
        let response = if self.success {
            ClarityValue::wrap_ok(value.clone())
        } else {
            ClarityValue::wrap_err(value.clone())
        };
        let result = TransactionResult {
            is_ok: self.success,
            response,
            value,
        };
        Ok(self.resolved.get_or_init(|| result).clone())
    }
}
