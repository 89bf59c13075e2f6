use std::sync::Arc;

use tonic::transport;

use crate::client::book_client::{BookClientArc, remote::RemoteBookClient};

pub mod book_client;

#[derive(Debug, Clone)]
pub struct AppClient {
    pub book: BookClientArc,
}

impl AppClient {
    pub fn new(book: BookClientArc) -> Self {
        AppClient { book }
    }

    pub async fn connect(address: &str) -> Result<Self, transport::Error> {
        let book = RemoteBookClient::connect(address.into()).await?;
        Ok(AppClient {
            book: Arc::new(book),
        })
    }
}
