use std::sync::Arc;

use bomboni_common::{date_time::UtcDateTime, id::worker::WorkerIdGenerator};
use bomboni_request::{
    filter::{Filter, FilterComparator},
    value::Value,
};
use example_app_api::model::{
    book::{BookId, BookModel},
    book_service::{
        ParsedCreateBookRequest, ParsedDeleteBookRequest, ParsedListBookRequest,
        ParsedReadBookRequest,
    },
    paging::{NextPage, Paging},
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    book::repository::{BookRecordInsert, BookRepository},
    error::{AppError, AppResult, StoreError},
    response::{HandlerResponse, ResponseStatus},
    transaction::{Transaction, finish_nested},
};

/// Message of the not found error reported by [`BookHandler::read`].
pub const BOOK_NOT_FOUND: &str = "book not found";

/// Book request handlers.
///
/// Each operation runs inside a nested transaction of the request
/// transaction handed in by the caller. The caller owns the request
/// transaction and decides whether to commit it.
#[derive(Debug)]
pub struct BookHandler<R: BookRepository> {
    book_repository: Arc<R>,
    id_generator: Arc<Mutex<WorkerIdGenerator>>,
    max_page_size: Option<i32>,
}

/// Page of books returned by [`BookHandler::list`].
#[derive(Debug, Clone, PartialEq)]
pub struct BookList {
    pub books: Vec<BookModel>,
    /// Present when more rows follow this page.
    pub next_page: Option<NextPage>,
}

impl<R: BookRepository> BookHandler<R> {
    pub fn new(book_repository: Arc<R>, id_generator: Arc<Mutex<WorkerIdGenerator>>) -> Self {
        Self {
            book_repository,
            id_generator,
            max_page_size: None,
        }
    }

    /// Limits the number of books returned by a single list call.
    #[must_use]
    pub fn with_max_page_size(mut self, max_page_size: i32) -> Self {
        self.max_page_size = Some(max_page_size).filter(|size| *size > 0);
        self
    }

    /// Creates a book and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NoTransaction`] without a transaction, or the store error.
    #[tracing::instrument(skip(self, transaction))]
    pub async fn create(
        &self,
        transaction: Option<&mut R::Transaction>,
        request: ParsedCreateBookRequest,
    ) -> AppResult<BookModel> {
        let transaction = begin(transaction).await?;

        let id = BookId::new(self.id_generator.lock().await.generate());
        info!(book_id = %id, display_name = %request.display_name, "Creating book");

        let result = self
            .book_repository
            .create(
                transaction,
                BookRecordInsert {
                    id,
                    create_time: UtcDateTime::now(),
                    display_name: request.display_name,
                    author: request.author,
                    isbn: request.isbn,
                    description: request.description,
                    price_cents: request.price_cents,
                    page_count: request.page_count,
                    amount: request.amount,
                },
            )
            .await;
        Ok(finish_nested(transaction, result).await?)
    }

    /// Reads a visible book.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no visible book has the id.
    #[tracing::instrument(skip(self, transaction))]
    pub async fn read(
        &self,
        transaction: Option<&mut R::Transaction>,
        request: ParsedReadBookRequest,
    ) -> AppResult<BookModel> {
        let transaction = begin(transaction).await?;

        let result = self
            .book_repository
            .read_by_id(
                transaction,
                &request.id,
                &visible(Filter::default()),
                &request.fields,
            )
            .await;
        finish_nested(transaction, result)
            .await
            .map_err(|err| match err {
                StoreError::RecordNotFound => AppError::NotFound(BOOK_NOT_FOUND),
                err => err.into(),
            })
    }

    /// Deletes a book.
    ///
    /// The response carries [`ResponseStatus::Deleted`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NoTransaction`] without a transaction, or the store error.
    #[tracing::instrument(skip(self, transaction))]
    pub async fn delete(
        &self,
        transaction: Option<&mut R::Transaction>,
        request: ParsedDeleteBookRequest,
    ) -> AppResult<HandlerResponse<()>> {
        let transaction = begin(transaction).await?;

        let result = self
            .book_repository
            .delete_by_id(transaction, &request.id)
            .await;
        finish_nested(transaction, result).await?;

        debug!(book_id = %request.id, "Deleted book");
        Ok(HandlerResponse::new(()).with_status(ResponseStatus::Deleted))
    }

    /// Lists visible books.
    ///
    /// A paged request fetches one row past the requested limit. If that row
    /// exists it is dropped and the next page offset is reported.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NoTransaction`] without a transaction, or the store error.
    #[tracing::instrument(skip(self, transaction))]
    pub async fn list(
        &self,
        transaction: Option<&mut R::Transaction>,
        request: ParsedListBookRequest,
    ) -> AppResult<BookList> {
        let transaction = begin(transaction).await?;

        let paging = self.clamp(request.paging);
        let paged = paging.is_paged();
        let probe = if paged {
            Paging::new(paging.offset, paging.limit.saturating_add(1))
        } else {
            paging
        };

        let result = self
            .book_repository
            .list(
                transaction,
                &visible(request.filter),
                &request.ordering,
                &probe,
                &request.fields,
            )
            .await;
        let mut books = finish_nested(transaction, result).await?;

        let probe_found =
            paged && usize::try_from(probe.limit).is_ok_and(|limit| books.len() == limit);
        let next_page = if probe_found {
            books.truncate(usize::try_from(paging.limit).unwrap_or_default());
            Some(NextPage {
                offset: paging.offset.saturating_add(paging.limit),
            })
        } else {
            None
        };

        debug!(
            count = books.len(),
            next_offset = ?next_page.map(|page| page.offset),
            "Listed books"
        );
        Ok(BookList { books, next_page })
    }

    fn clamp(&self, paging: Paging) -> Paging {
        match self.max_page_size {
            Some(max_page_size) if paging.limit > max_page_size => {
                Paging::new(paging.offset, max_page_size)
            }
            _ => paging,
        }
    }
}

/// Checks that a transaction is present and begins a nested one on it.
async fn begin<X: Transaction>(transaction: Option<&mut X>) -> AppResult<&mut X> {
    let transaction = transaction.ok_or(AppError::NoTransaction)?;
    transaction
        .begin_nested()
        .await
        .map_err(AppError::TransactionBegin)?;
    Ok(transaction)
}

/// Restricts `filter` to books in stock.
fn visible(mut filter: Filter) -> Filter {
    filter.add_conjunction(Filter::Restriction(
        Box::new(Filter::Name(BookModel::AMOUNT_FIELD.into())),
        FilterComparator::Greater,
        Box::new(Filter::Value(Value::Integer(0))),
    ));
    filter
}

#[cfg(test)]
mod tests {
    use bomboni_request::ordering::Ordering;
    use example_app_api::model::field_mask::BookFieldMask;

    use super::*;
    use crate::{
        book::repository::{
            BookRecordOwned,
            memory::{MemoryBookRepository, MemoryTransaction},
        },
        transaction::TransactionProvider,
    };

    fn record(id: u64, amount: i64) -> BookRecordOwned {
        BookRecordOwned {
            id: BookId::new(id),
            create_time: UtcDateTime::now(),
            display_name: format!("Book {id}"),
            author: "Frank Herbert".into(),
            isbn: String::new(),
            description: String::new(),
            price_cents: 1000,
            page_count: 100,
            amount,
        }
    }

    fn handler(repository: &Arc<MemoryBookRepository>) -> BookHandler<MemoryBookRepository> {
        BookHandler::new(
            Arc::clone(repository),
            Arc::new(Mutex::new(WorkerIdGenerator::new(1))),
        )
    }

    fn list_request(offset: i32, limit: i32) -> ParsedListBookRequest {
        ParsedListBookRequest {
            filter: Filter::default(),
            ordering: Ordering::default(),
            paging: Paging::new(offset, limit),
            fields: BookFieldMask::all(),
        }
    }

    fn create_request(amount: i64) -> ParsedCreateBookRequest {
        ParsedCreateBookRequest {
            display_name: "Dune".into(),
            author: "Frank Herbert".into(),
            isbn: "9780441013593".into(),
            description: String::new(),
            price_cents: 1299,
            page_count: 412,
            amount,
        }
    }

    #[tokio::test]
    async fn list_probe() {
        let repository = Arc::new(MemoryBookRepository::with_data(vec![
            record(1, 1),
            record(2, 1),
            record(3, 1),
        ]));
        let handler = handler(&repository);
        let mut transaction = MemoryTransaction::new();

        let list = handler
            .list(Some(&mut transaction), list_request(0, 2))
            .await
            .unwrap();
        assert_eq!(list.books.len(), 2);
        assert_eq!(list.next_page, Some(NextPage { offset: 2 }));

        let list = handler
            .list(Some(&mut transaction), list_request(2, 2))
            .await
            .unwrap();
        assert_eq!(list.books.len(), 1);
        assert_eq!(list.books[0].id, BookId::new(3u64));
        assert_eq!(list.next_page, None);

        let list = handler
            .list(Some(&mut transaction), list_request(0, 3))
            .await
            .unwrap();
        assert_eq!(list.books.len(), 3);
        assert_eq!(list.next_page, None);

        let list = handler
            .list(Some(&mut transaction), list_request(0, 0))
            .await
            .unwrap();
        assert_eq!(list.books.len(), 3);
        assert_eq!(list.next_page, None);
        assert_eq!(transaction.depth(), 0);
    }

    #[tokio::test]
    async fn list_exact_page() {
        let repository = Arc::new(MemoryBookRepository::with_data(vec![
            record(1, 1),
            record(2, 1),
        ]));
        let handler = handler(&repository);
        let mut transaction = MemoryTransaction::new();

        let list = handler
            .list(Some(&mut transaction), list_request(0, 2))
            .await
            .unwrap();
        assert_eq!(list.books.len(), 2);
        assert_eq!(list.next_page, None);
    }

    #[tokio::test]
    async fn list_max_page_size() {
        let repository = Arc::new(MemoryBookRepository::with_data(
            (1..=5).map(|id| record(id, 1)).collect(),
        ));
        let handler = handler(&repository).with_max_page_size(2);
        let mut transaction = MemoryTransaction::new();

        let list = handler
            .list(Some(&mut transaction), list_request(1, 50))
            .await
            .unwrap();
        assert_eq!(list.books.len(), 2);
        assert_eq!(list.next_page, Some(NextPage { offset: 3 }));
    }

    #[tokio::test]
    async fn visibility() {
        let repository = Arc::new(MemoryBookRepository::with_data(vec![
            record(1, 1),
            record(2, 0),
            record(3, -1),
            record(4, 8),
        ]));
        let handler = handler(&repository);
        let mut transaction = MemoryTransaction::new();

        let list = handler
            .list(Some(&mut transaction), list_request(0, 0))
            .await
            .unwrap();
        assert_eq!(
            list.books.iter().map(|book| book.id).collect::<Vec<_>>(),
            vec![BookId::new(1u64), BookId::new(4u64)]
        );

        let mut request = list_request(0, 0);
        request.filter = Filter::parse("amount < 5 OR amount > 6").unwrap();
        let list = handler
            .list(Some(&mut transaction), request)
            .await
            .unwrap();
        assert_eq!(list.books.len(), 2);

        for id in [2u64, 3] {
            let err = handler
                .read(
                    Some(&mut transaction),
                    ParsedReadBookRequest {
                        id: BookId::new(id),
                        fields: BookFieldMask::all(),
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::NotFound(BOOK_NOT_FOUND)));
        }

        let book = handler
            .read(
                Some(&mut transaction),
                ParsedReadBookRequest {
                    id: BookId::new(4u64),
                    fields: BookFieldMask::all(),
                },
            )
            .await
            .unwrap();
        assert_eq!(book.amount, 8);
        assert_eq!(transaction.depth(), 0);
    }

    #[tokio::test]
    async fn no_transaction() {
        let repository = Arc::new(MemoryBookRepository::new());
        let handler = handler(&repository);

        assert!(matches!(
            handler.create(None, create_request(1)).await,
            Err(AppError::NoTransaction)
        ));
        assert!(matches!(
            handler
                .delete(
                    None,
                    ParsedDeleteBookRequest {
                        id: BookId::new(1u64)
                    }
                )
                .await,
            Err(AppError::NoTransaction)
        ));
        assert!(matches!(
            handler
                .read(
                    None,
                    ParsedReadBookRequest {
                        id: BookId::new(1u64),
                        fields: BookFieldMask::all(),
                    }
                )
                .await,
            Err(AppError::NoTransaction)
        ));
        assert!(matches!(
            handler.list(None, list_request(0, 1)).await,
            Err(AppError::NoTransaction)
        ));
        assert!(repository.is_empty().await);
    }

    #[tokio::test]
    async fn transaction_begin_failure() {
        let repository = Arc::new(MemoryBookRepository::new());
        let handler = handler(&repository);
        let mut transaction = MemoryTransaction::new();
        for _ in 0..MemoryTransaction::MAX_NESTING {
            transaction.begin_nested().await.unwrap();
        }

        assert!(matches!(
            handler.create(Some(&mut transaction), create_request(1)).await,
            Err(AppError::TransactionBegin(StoreError::NestingLimit(_)))
        ));
        assert_eq!(transaction.depth(), MemoryTransaction::MAX_NESTING);
    }

    #[tokio::test]
    async fn create_and_delete() {
        let repository = Arc::new(MemoryBookRepository::new());
        let handler = handler(&repository);

        let mut transaction = repository.begin().await.unwrap();
        let book = handler
            .create(Some(&mut transaction), create_request(2))
            .await
            .unwrap();
        assert_ne!(book.id, BookId::default());
        assert!(book.create_time.is_some());
        assert_eq!(book.display_name, "Dune");
        assert_eq!(transaction.depth(), 0);
        repository.commit(transaction).await.unwrap();
        assert_eq!(repository.len().await, 1);

        let mut transaction = repository.begin().await.unwrap();
        let response = handler
            .delete(
                Some(&mut transaction),
                ParsedDeleteBookRequest { id: book.id },
            )
            .await
            .unwrap();
        assert_eq!(response.status, Some(ResponseStatus::Deleted));
        repository.commit(transaction).await.unwrap();
        assert!(repository.is_empty().await);

        let mut transaction = repository.begin().await.unwrap();
        let err = handler
            .delete(
                Some(&mut transaction),
                ParsedDeleteBookRequest {
                    id: BookId::default(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Store(StoreError::EmptyId)));
        assert_eq!(transaction.depth(), 0);
    }
}
