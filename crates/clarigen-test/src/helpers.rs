//! Submit-and-resolve shortcuts for tests
use clarigen_core::{ClarigenError, Result, SubmitOptions, Transaction, TransactionResult};

/// Submit as `sender` and resolve the result
pub async fn tx(mut transaction: Transaction, sender: &str) -> Result<TransactionResult> {
    let receipt = transaction.submit(SubmitOptions::sender(sender)).await?;
    receipt.get_result()
}

/// Like [`tx`], failing unless the call returned `(ok …)`
pub async fn tx_ok(transaction: Transaction, sender: &str) -> Result<TransactionResult> {
    let result = tx(transaction, sender).await?;
    if !result.is_ok {
        return Err(ClarigenError::UnexpectedOutcome {
            expected: "ok",
            actual: result.response.render(),
        });
    }
    Ok(result)
}

/// Like [`tx`], failing unless the call returned `(err …)`
pub async fn tx_err(transaction: Transaction, sender: &str) -> Result<TransactionResult> {
    let result = tx(transaction, sender).await?;
    if result.is_ok {
        return Err(ClarigenError::UnexpectedOutcome {
            expected: "error",
            actual: result.response.render(),
        });
    }
    Ok(result)
}
