//! Request scoped units of work.
//!
//! The transport adapter begins one transaction per call through a
//! [`TransactionProvider`] and hands it to the handler explicitly. Handlers run
//! their store operation inside a nested transaction, and the adapter commits
//! or rolls back the outer transaction once the handler returns.

use std::fmt::Debug;

use async_trait::async_trait;
use tracing::warn;

use crate::error::{StoreError, StoreResult};

/// Unit of work bound to a single call.
#[async_trait]
pub trait Transaction: Debug + Send {
    /// Begins a nested transaction.
    ///
    /// Changes made until the matching [`Self::release_nested`] or
    /// [`Self::rollback_nested`] can be undone without affecting earlier work.
    ///
    /// # Errors
    ///
    /// Returns an error if no further nesting is possible.
    async fn begin_nested(&mut self) -> StoreResult<()>;

    /// Keeps the changes of the innermost nested transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoNestedTransaction`] if none is open.
    async fn release_nested(&mut self) -> StoreResult<()>;

    /// Discards the changes of the innermost nested transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoNestedTransaction`] if none is open.
    async fn rollback_nested(&mut self) -> StoreResult<()>;
}

/// Source of request transactions.
#[async_trait]
pub trait TransactionProvider: Debug + Send + Sync {
    type Transaction: Transaction;

    /// # Errors
    ///
    /// Returns an error if the store cannot start a transaction.
    async fn begin(&self) -> StoreResult<Self::Transaction>;

    /// # Errors
    ///
    /// Returns an error if the changes cannot be persisted.
    async fn commit(&self, transaction: Self::Transaction) -> StoreResult<()>;

    /// # Errors
    ///
    /// Returns an error if the rollback fails.
    async fn rollback(&self, transaction: Self::Transaction) -> StoreResult<()>;
}

/// Ends the innermost nested transaction of `transaction`.
///
/// Releases it when `result` is ok and rolls it back otherwise. The error of
/// `result` takes precedence over a failed rollback.
///
/// # Errors
///
/// Returns the error of `result`, or the release error.
pub async fn finish_nested<X, T>(transaction: &mut X, result: StoreResult<T>) -> StoreResult<T>
where
    X: Transaction,
    T: Send,
{
    match result {
        Ok(value) => {
            transaction.release_nested().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = transaction.rollback_nested().await {
                warn!("failed to roll back nested transaction: {}", rollback_err);
            }
            Err(err)
        }
    }
}
