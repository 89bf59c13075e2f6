use std::sync::Arc;

use bomboni_request::parse::RequestParse;
use example_app_api::{
    model::book_service::{
        ParsedCreateBookRequest, ParsedDeleteBookRequest, ParsedListBookRequest,
        ParsedReadBookRequest,
    },
    v1::{
        CreateBookRequest, CreateBookResponse, DeleteBookRequest, DeleteBookResponse,
        ListBookRequest, ListBookResponse, ReadBookRequest, ReadBookResponse, VersionResponse,
        example_app_server::ExampleApp,
    },
};
use tonic::{Request, Response, Status};
use tracing::{debug, warn};

use super::{handler::BookHandler, repository::BookRepository};
use crate::{
    error::{AppError, AppResult},
    transaction::TransactionProvider,
    version::VERSION,
};

/// gRPC adapter for the example app service.
///
/// Owns the request transaction: it is begun before the handler runs,
/// committed when the handler succeeds and rolled back otherwise.
#[derive(Debug)]
pub struct BookAdapter<P, R>
where
    P: TransactionProvider,
    R: BookRepository<Transaction = P::Transaction>,
{
    transaction_provider: Arc<P>,
    book_handler: BookHandler<R>,
}

impl<P, R> BookAdapter<P, R>
where
    P: TransactionProvider,
    R: BookRepository<Transaction = P::Transaction>,
{
    pub fn new(transaction_provider: Arc<P>, book_handler: BookHandler<R>) -> Self {
        Self {
            transaction_provider,
            book_handler,
        }
    }

    async fn begin(&self) -> Result<P::Transaction, Status> {
        Ok(self.transaction_provider.begin().await?)
    }

    async fn finish<T>(
        &self,
        transaction: P::Transaction,
        result: AppResult<T>,
    ) -> Result<T, Status> {
        match result {
            Ok(value) => {
                self.transaction_provider.commit(transaction).await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.transaction_provider.rollback(transaction).await {
                    warn!("failed to roll back transaction: {}", rollback_err);
                }
                Err(err.into())
            }
        }
    }
}

#[tonic::async_trait]
impl<P, R> ExampleApp for BookAdapter<P, R>
where
    P: TransactionProvider + 'static,
    R: BookRepository<Transaction = P::Transaction> + 'static,
{
    async fn get_version(&self, _request: Request<()>) -> Result<Response<VersionResponse>, Status> {
        Ok(Response::new(VersionResponse {
            version: VERSION.into(),
        }))
    }

    async fn create(
        &self,
        request: Request<CreateBookRequest>,
    ) -> Result<Response<CreateBookResponse>, Status> {
        let request =
            ParsedCreateBookRequest::parse(request.into_inner()).map_err(AppError::from)?;

        let mut transaction = self.begin().await?;
        let result = self
            .book_handler
            .create(Some(&mut transaction), request)
            .await;
        let book = self.finish(transaction, result).await?;

        Ok(Response::new(CreateBookResponse {
            id: book.id.to_string(),
        }))
    }

    async fn read(
        &self,
        request: Request<ReadBookRequest>,
    ) -> Result<Response<ReadBookResponse>, Status> {
        let request =
            ParsedReadBookRequest::parse(request.into_inner()).map_err(AppError::from)?;

        let mut transaction = self.begin().await?;
        let result = self.book_handler.read(Some(&mut transaction), request).await;
        let book = self.finish(transaction, result).await?;

        Ok(Response::new(ReadBookResponse {
            result: Some(book.into()),
        }))
    }

    async fn delete(
        &self,
        request: Request<DeleteBookRequest>,
    ) -> Result<Response<DeleteBookResponse>, Status> {
        let request =
            ParsedDeleteBookRequest::parse(request.into_inner()).map_err(AppError::from)?;

        let mut transaction = self.begin().await?;
        let result = self
            .book_handler
            .delete(Some(&mut transaction), request)
            .await;
        let response = self.finish(transaction, result).await?;

        debug!(status = ?response.status, "Delete finished");
        Ok(response.map(|()| DeleteBookResponse {}).into_response())
    }

    async fn list(
        &self,
        request: Request<ListBookRequest>,
    ) -> Result<Response<ListBookResponse>, Status> {
        let request =
            ParsedListBookRequest::parse(request.into_inner()).map_err(AppError::from)?;

        let mut transaction = self.begin().await?;
        let result = self.book_handler.list(Some(&mut transaction), request).await;
        let list = self.finish(transaction, result).await?;

        Ok(Response::new(ListBookResponse {
            results: list.books.into_iter().map(Into::into).collect(),
            page: list.next_page.map(Into::into),
        }))
    }
}
