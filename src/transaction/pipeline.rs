//! Sign → stage → poll pipeline.
//!
//! # Responsibilities
//! - Obtain an unsigned transaction for an action payload
//! - Sign it with the active account and stage it
//! - Poll `transactionResult` until a terminal status or the time budget runs out
//!
//! The timeout is checked between polls only; a poll already in flight is
//! allowed to finish.

use tokio::time::{sleep, Instant};

use crate::account::{Account, AccountError};
use crate::graphql::{queries, GraphqlError, GraphqlTransport};
use crate::observability::metrics;
use crate::transaction::types::{
    PipelineConfig, PipelineResult, PlainValue, TransactionError, TransactionResult, TxId, TxStatus,
};

/// Sign and stage the transaction for `plain_value`, returning its id.
///
/// Stage is only reached with a non-empty unsigned transaction and a
/// non-empty signature.
pub async fn execute_transaction<T: GraphqlTransport>(
    transport: &T,
    account: &Account,
    plain_value: &PlainValue,
) -> PipelineResult<TxId> {
    if !account.is_connected() {
        return Err(TransactionError::AccountNotConnected);
    }
    let address = account.address().map_err(|e| match e {
        AccountError::NotConnected => TransactionError::AccountNotConnected,
        other => other.into(),
    })?;

    let unsigned = queries::unsigned_transaction(transport, address, plain_value)
        .await?
        .ok_or(TransactionError::UnsignedTransactionUnavailable)?;

    let message = unsigned.to_bytes()?;
    let signature = account.sign(&message).await?;
    if signature.is_empty() {
        return Err(AccountError::SigningFailed("empty signature".to_string()).into());
    }

    let tx_id = match queries::stage_transaction(transport, &unsigned, &signature).await {
        Ok(Some(tx_id)) => tx_id,
        Ok(None) => {
            metrics::record_transaction("stage_failed");
            return Err(TransactionError::StageFailed(
                "node returned no transaction id".to_string(),
            ));
        }
        Err(GraphqlError::Response(message)) => {
            metrics::record_transaction("stage_failed");
            return Err(TransactionError::StageFailed(message));
        }
        Err(GraphqlError::Status { status, body }) => {
            metrics::record_transaction("stage_failed");
            return Err(TransactionError::StageFailed(format!("HTTP {status}: {body}")));
        }
        Err(e) => return Err(e.into()),
    };

    metrics::record_transaction("staged");
    tracing::info!(tx_id = %tx_id, address = %address, "Transaction staged");
    Ok(tx_id)
}

/// Poll until `tx_id` succeeds, fails, turns invalid, or `config.timeout` elapses.
pub async fn wait_for_transaction<T: GraphqlTransport>(
    transport: &T,
    tx_id: &TxId,
    config: PipelineConfig,
) -> PipelineResult<TransactionResult> {
    let started = Instant::now();

    while started.elapsed() < config.timeout {
        metrics::record_poll();
        let result = queries::transaction_result(transport, tx_id)
            .await?
            .ok_or_else(|| TransactionError::ResultUnavailable(tx_id.clone()))?;

        match result.status {
            TxStatus::Success => {
                metrics::record_transaction(TxStatus::Success.as_str());
                metrics::record_wait(started.elapsed());
                tracing::info!(tx_id = %tx_id, block_index = ?result.block_index, "Transaction succeeded");
                return Ok(result);
            }
            TxStatus::Failure => {
                metrics::record_transaction(TxStatus::Failure.as_str());
                let reason = if result.exception_names.is_empty() {
                    "transaction execution failed".to_string()
                } else {
                    result.exception_names.join(", ")
                };
                tracing::warn!(tx_id = %tx_id, reason = %reason, "Transaction failed");
                return Err(TransactionError::TransactionFailed {
                    tx_id: tx_id.clone(),
                    reason,
                });
            }
            TxStatus::Invalid => {
                metrics::record_transaction(TxStatus::Invalid.as_str());
                tracing::warn!(tx_id = %tx_id, "Transaction invalid");
                return Err(TransactionError::TransactionInvalid(tx_id.clone()));
            }
            status @ (TxStatus::Staging | TxStatus::Included) => {
                tracing::debug!(tx_id = %tx_id, status = status.as_str(), "Transaction pending");
            }
        }

        sleep(config.poll_interval).await;
    }

    metrics::record_transaction("timeout");
    Err(TransactionError::Timeout {
        tx_id: tx_id.clone(),
        elapsed_ms: started.elapsed().as_millis(),
    })
}

/// [`execute_transaction`] followed by [`wait_for_transaction`].
pub async fn execute_and_wait<T: GraphqlTransport>(
    transport: &T,
    account: &Account,
    plain_value: &PlainValue,
    config: PipelineConfig,
) -> PipelineResult<(TxId, TransactionResult)> {
    let tx_id = execute_transaction(transport, account, plain_value).await?;
    let result = wait_for_transaction(transport, &tx_id, config).await?;
    Ok((tx_id, result))
}
