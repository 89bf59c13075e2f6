use bomboni_request::error::RequestError;
use itertools::Itertools;
use thiserror::Error;
use tonic::{Code, Status, transport};
use tracing::error;

/// Application error types.
///
/// Represents all possible errors that can occur in the example app service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Internal application error.
    ///
    /// Represents unexpected internal errors that occur during service operation.
    #[error("internal error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),

    /// Request validation error.
    ///
    /// Carries the violating field paths of the request.
    #[error("request error: {0}")]
    Request(#[from] RequestError),

    /// Error reported by the entity store, passed through unchanged.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The handler was called without a transaction.
    #[error("no transaction")]
    NoTransaction,

    /// A nested transaction could not be started.
    #[error("failed to begin nested transaction: {0}")]
    TransactionBegin(StoreError),

    /// The requested resource is not visible to the caller.
    #[error("{0}")]
    NotFound(&'static str),
}

/// Application result type.
///
/// Type alias for Result with `AppError` as the error type.
/// Used throughout the application for consistent error handling.
pub type AppResult<T> = Result<T, AppError>;

/// Errors reported by book stores and their transactions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No record matched the identifier and scope of the query.
    #[error("record not found")]
    RecordNotFound,

    /// A record with the same primary key exists.
    #[error("record `{0}` already exists")]
    DuplicateId(String),

    /// The primary key of the record is empty.
    #[error("primary key is empty")]
    EmptyId,

    /// Release or rollback without a matching nested begin.
    #[error("no nested transaction in progress")]
    NoNestedTransaction,

    /// Too many nested transactions are open.
    #[error("nested transactions are limited to {0} levels")]
    NestingLimit(usize),
}

pub type StoreResult<T> = Result<T, StoreError>;

macro_rules! impl_internal_errors {
    ( $( $type:ty ),* $(,)? ) => {
        $(
        impl From<$type> for AppError {
            fn from(err: $type) -> Self {
                AppError::Internal(Box::new(err))
            }
        }
        )*
    };
}
impl_internal_errors!(
    config::ConfigError,
    transport::Error,
    tonic_reflection::server::Error,
);

impl From<StoreError> for Status {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RecordNotFound => Self::not_found(err.to_string()),
            StoreError::DuplicateId(_) => Self::already_exists(err.to_string()),
            StoreError::EmptyId => Self::invalid_argument(err.to_string()),
            StoreError::NoNestedTransaction | StoreError::NestingLimit(_) => {
                Self::internal(err.to_string())
            }
        }
    }
}

impl From<AppError> for Status {
    /// Converts application errors to gRPC status codes.
    ///
    /// Maps internal errors to appropriate gRPC status codes for client responses.
    fn from(err: AppError) -> Self {
        match err {
            AppError::Request(err) => request_status(&err),
            AppError::Store(err) => err.into(),
            AppError::NotFound(message) => Self::not_found(message),
            AppError::NoTransaction | AppError::TransactionBegin(_) => {
                error!("transaction error: {}", err);
                Self::internal(err.to_string())
            }
            AppError::Internal(_) => {
                error!("internal service error: {}", err);
                Self::internal(Code::Internal.description())
            }
        }
    }
}

fn request_status(err: &RequestError) -> Status {
    match err {
        RequestError::BadRequest { violations, .. } => Status::invalid_argument(format!(
            "{err}: {}",
            violations
                .iter()
                .map(|violation| format!("{}: {}", violation.field, violation.error))
                .join(", ")
        )),
        err => Status::invalid_argument(err.to_string()),
    }
}
