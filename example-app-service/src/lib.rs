//! Example app gRPC service.
//!
//! Create, read, delete and list operations over books, plus a version
//! endpoint. Every call runs in a request transaction owned by the adapter.

pub mod book;
pub mod config;
pub mod error;
pub mod response;
pub mod tracing;
pub mod transaction;
pub mod version;

use std::sync::Arc;

use bomboni_common::id::worker::WorkerIdGenerator;
use tokio::sync::Mutex;

use crate::{
    book::{adapter::BookAdapter, handler::BookHandler, repository::memory::MemoryBookRepository},
    config::{AppConfig, DatabaseConfig},
};

/// Book adapter backed by the in-memory store.
pub type MemoryBookAdapter = BookAdapter<MemoryBookRepository, MemoryBookRepository>;

/// Builds the book adapter for the configured database.
pub fn create_book_adapter(config: &AppConfig) -> MemoryBookAdapter {
    let book_repository = match config.database {
        DatabaseConfig::Memory => Arc::new(MemoryBookRepository::new()),
    };
    let id_generator = Arc::new(Mutex::new(WorkerIdGenerator::new(
        config.node.worker_number,
    )));

    let mut book_handler = BookHandler::new(Arc::clone(&book_repository), id_generator);
    if let Some(max_page_size) = config.query.max_page_size {
        book_handler = book_handler.with_max_page_size(max_page_size);
    }

    BookAdapter::new(book_repository, book_handler)
}
