//! Book management module.
//!
//! Provides the create, read, delete and list operations for books:
//! - gRPC adapter owning the request transaction
//! - Request handlers running inside nested transactions
//! - Repository abstraction for data persistence

/// gRPC service adapter for books.
pub mod adapter;

/// Book request handlers.
pub mod handler;

/// Book repository abstraction and implementations.
pub mod repository;
