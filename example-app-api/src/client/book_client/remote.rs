use std::fmt;
use std::fmt::{Debug, Formatter};

use tonic::{
    Request, Response, Status,
    metadata::MetadataMap,
    transport::{self, Channel},
};

use crate::client::book_client::BookClient;
use crate::v1::{
    CreateBookRequest, CreateBookResponse, DeleteBookRequest, DeleteBookResponse,
    ListBookRequest, ListBookResponse, ReadBookRequest, ReadBookResponse, VersionResponse,
    example_app_client::ExampleAppClient,
};

#[derive(Clone)]
pub struct RemoteBookClient {
    client: ExampleAppClient<Channel>,
}

impl RemoteBookClient {
    pub async fn connect(address: String) -> Result<Self, transport::Error> {
        Ok(RemoteBookClient {
            client: ExampleAppClient::connect(address).await?,
        })
    }
}

fn with_metadata<T>(message: T, metadata: MetadataMap) -> Request<T> {
    let mut request = Request::new(message);
    *request.metadata_mut() = metadata;
    request
}

#[async_trait::async_trait]
impl BookClient for RemoteBookClient {
    async fn get_version(&self, metadata: MetadataMap) -> Result<Response<VersionResponse>, Status> {
        let mut client = self.client.clone();
        client.get_version(with_metadata((), metadata)).await
    }

    async fn create(
        &self,
        request: CreateBookRequest,
        metadata: MetadataMap,
    ) -> Result<Response<CreateBookResponse>, Status> {
        let mut client = self.client.clone();
        client.create(with_metadata(request, metadata)).await
    }

    async fn read(
        &self,
        request: ReadBookRequest,
        metadata: MetadataMap,
    ) -> Result<Response<ReadBookResponse>, Status> {
        let mut client = self.client.clone();
        client.read(with_metadata(request, metadata)).await
    }

    async fn delete(
        &self,
        request: DeleteBookRequest,
        metadata: MetadataMap,
    ) -> Result<Response<DeleteBookResponse>, Status> {
        let mut client = self.client.clone();
        client.delete(with_metadata(request, metadata)).await
    }

    async fn list(
        &self,
        request: ListBookRequest,
        metadata: MetadataMap,
    ) -> Result<Response<ListBookResponse>, Status> {
        let mut client = self.client.clone();
        client.list(with_metadata(request, metadata)).await
    }
}

impl Debug for RemoteBookClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteBookClient").finish()
    }
}
