use std::fmt::Debug;
use std::sync::Arc;
use tonic::metadata::MetadataMap;
use tonic::{Response, Status};

use crate::v1::{
    CreateBookRequest, CreateBookResponse, DeleteBookRequest, DeleteBookResponse,
    ListBookRequest, ListBookResponse, ReadBookRequest, ReadBookResponse, VersionResponse,
};

pub mod remote;

#[async_trait::async_trait]
pub trait BookClient: Debug {
    async fn get_version(&self, metadata: MetadataMap) -> Result<Response<VersionResponse>, Status>;

    async fn create(
        &self,
        request: CreateBookRequest,
        metadata: MetadataMap,
    ) -> Result<Response<CreateBookResponse>, Status>;

    async fn read(
        &self,
        request: ReadBookRequest,
        metadata: MetadataMap,
    ) -> Result<Response<ReadBookResponse>, Status>;

    async fn delete(
        &self,
        request: DeleteBookRequest,
        metadata: MetadataMap,
    ) -> Result<Response<DeleteBookResponse>, Status>;

    async fn list(
        &self,
        request: ListBookRequest,
        metadata: MetadataMap,
    ) -> Result<Response<ListBookResponse>, Status>;
}

pub type BookClientArc = Arc<dyn BookClient + Send + Sync>;
