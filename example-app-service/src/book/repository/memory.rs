use std::{cmp, collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use bomboni_request::{filter::Filter, ordering::Ordering};
use example_app_api::model::{
    book::{BookId, BookModel},
    field_mask::BookFieldMask,
    paging::Paging,
};
use itertools::Itertools;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    book::repository::{BookRecordInsert, BookRecordOwned, BookRepository},
    error::{StoreError, StoreResult},
    transaction::{Transaction, TransactionProvider},
};

type BookTable = BTreeMap<BookId, BookRecordOwned>;

/// Staged writes keyed by id. `None` marks a deleted row.
type BookWrites = BTreeMap<BookId, Option<BookRecordOwned>>;

/// In-memory implementation of the book repository.
///
/// Writes are staged in a [`MemoryTransaction`] and become visible to other
/// transactions on commit.
#[derive(Debug, Clone)]
pub struct MemoryBookRepository {
    books: Arc<RwLock<BookTable>>,
}

/// Transaction over a [`MemoryBookRepository`].
#[derive(Debug, Default)]
pub struct MemoryTransaction {
    writes: BookWrites,
    savepoints: Vec<BookWrites>,
}

impl MemoryTransaction {
    /// Maximum depth of nested transactions.
    pub const MAX_NESTING: usize = 16;

    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nested transactions currently open.
    pub fn depth(&self) -> usize {
        self.savepoints.len()
    }

    fn stage(&mut self, id: BookId, record: Option<BookRecordOwned>) {
        self.writes.insert(id, record);
    }
}

impl Default for MemoryBookRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBookRepository {
    /// Creates a new empty memory book repository.
    pub fn new() -> Self {
        Self {
            books: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Creates a new memory book repository with initial data.
    ///
    /// # Arguments
    ///
    /// * `books` - Initial books to populate the repository with
    pub fn with_data(books: Vec<BookRecordOwned>) -> Self {
        Self {
            books: Arc::new(RwLock::new(
                books.into_iter().map(|book| (book.id, book)).collect(),
            )),
        }
    }

    /// Number of committed books.
    pub async fn len(&self) -> usize {
        self.books.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.books.read().await.is_empty()
    }

    /// Rows as seen from inside `transaction`.
    async fn snapshot(&self, transaction: &MemoryTransaction) -> BookTable {
        let mut books = self.books.read().await.clone();
        for (id, write) in &transaction.writes {
            match write {
                Some(record) => {
                    books.insert(*id, record.clone());
                }
                None => {
                    books.remove(id);
                }
            }
        }
        books
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn begin_nested(&mut self) -> StoreResult<()> {
        if self.savepoints.len() >= Self::MAX_NESTING {
            return Err(StoreError::NestingLimit(Self::MAX_NESTING));
        }
        self.savepoints.push(self.writes.clone());
        Ok(())
    }

    async fn release_nested(&mut self) -> StoreResult<()> {
        self.savepoints
            .pop()
            .map(|_| ())
            .ok_or(StoreError::NoNestedTransaction)
    }

    async fn rollback_nested(&mut self) -> StoreResult<()> {
        self.writes = self
            .savepoints
            .pop()
            .ok_or(StoreError::NoNestedTransaction)?;
        Ok(())
    }
}

#[async_trait]
impl TransactionProvider for MemoryBookRepository {
    type Transaction = MemoryTransaction;

    async fn begin(&self) -> StoreResult<MemoryTransaction> {
        Ok(MemoryTransaction::new())
    }

    async fn commit(&self, transaction: MemoryTransaction) -> StoreResult<()> {
        if transaction.writes.is_empty() {
            return Ok(());
        }
        let mut books = self.books.write().await;
        debug!(writes = transaction.writes.len(), "Committing transaction");
        for (id, write) in transaction.writes {
            match write {
                Some(record) => {
                    books.insert(id, record);
                }
                None => {
                    books.remove(&id);
                }
            }
        }
        Ok(())
    }

    async fn rollback(&self, transaction: MemoryTransaction) -> StoreResult<()> {
        debug!(
            writes = transaction.writes.len(),
            "Rolling back transaction"
        );
        Ok(())
    }
}

#[async_trait]
impl BookRepository for MemoryBookRepository {
    type Transaction = MemoryTransaction;

    async fn create(
        &self,
        transaction: &mut MemoryTransaction,
        record: BookRecordInsert,
    ) -> StoreResult<BookModel> {
        if record.id == BookId::default() {
            return Err(StoreError::EmptyId);
        }
        if self.snapshot(transaction).await.contains_key(&record.id) {
            return Err(StoreError::DuplicateId(record.id.to_string()));
        }
        let record = BookRecordOwned::from(record);
        let book = BookModel::from(record.clone());
        transaction.stage(record.id, Some(record));
        Ok(book)
    }

    async fn read_by_id(
        &self,
        transaction: &mut MemoryTransaction,
        id: &BookId,
        filter: &Filter,
        fields: &BookFieldMask,
    ) -> StoreResult<BookModel> {
        self.snapshot(transaction)
            .await
            .get(id)
            .filter(|record| record.matches(filter))
            .map(|record| record.project(fields))
            .ok_or(StoreError::RecordNotFound)
    }

    async fn delete_by_id(
        &self,
        transaction: &mut MemoryTransaction,
        id: &BookId,
    ) -> StoreResult<()> {
        if *id == BookId::default() {
            return Err(StoreError::EmptyId);
        }
        if self.snapshot(transaction).await.contains_key(id) {
            transaction.stage(*id, None);
        }
        Ok(())
    }

    async fn list(
        &self,
        transaction: &mut MemoryTransaction,
        filter: &Filter,
        ordering: &Ordering,
        paging: &Paging,
        fields: &BookFieldMask,
    ) -> StoreResult<Vec<BookModel>> {
        let books = self.snapshot(transaction).await;
        let offset = usize::try_from(paging.offset).unwrap_or_default();
        let limit = usize::try_from(paging.limit)
            .ok()
            .filter(|limit| *limit > 0)
            .unwrap_or(usize::MAX);

        Ok(books
            .values()
            .filter(|book| book.matches(filter))
            .sorted_by(|a, b| {
                ordering
                    .evaluate(*a, *b)
                    .unwrap_or(cmp::Ordering::Equal)
                    .then_with(|| a.id.cmp(&b.id))
            })
            .skip(offset)
            .take(limit)
            .map(|book| book.project(fields))
            .collect())
    }
}
