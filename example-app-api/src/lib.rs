//! Example App API.
//!
//! Protocol definitions and domain models shared by the book service and its
//! clients:
//!
//! - Generated `exampleapp.v1` messages and gRPC stubs
//! - Book model, identifiers and the query schema used for filtering and ordering
//! - Request parsing and validation
//! - Client abstraction over the remote service
//!
//! # Features
//!
//! - `server`: Generates the gRPC server trait
//! - `client`: Enables client functionality for connecting to remote services

#[cfg(feature = "client")]
pub mod client;
pub mod model;

#[allow(
    unused_qualifications,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::invalid_html_tags
)]
pub mod v1 {
    tonic::include_proto!("exampleapp.v1");

    pub use prost_types::{FieldMask, Timestamp};

    pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("example_app_v1");
}
