//! Model definitions for the example app service.
//!
//! This module contains the book model, request parsing for every service
//! operation and the metadata keys shared by server and client.

/// Book model definitions and utilities.
pub mod book;
/// Book service request structures.
pub mod book_service;
/// Field selection for book responses.
pub mod field_mask;
/// Response metadata keys.
pub mod metadata;
/// Offset based paging.
pub mod paging;
