use std::fmt::Debug;

use async_trait::async_trait;
use bomboni_common::date_time::UtcDateTime;
use bomboni_request::{filter::Filter, ordering::Ordering, schema::SchemaMapped, value::Value};
use example_app_api::model::{
    book::{BookId, BookModel},
    field_mask::BookFieldMask,
    paging::Paging,
};

use crate::{error::StoreResult, transaction::Transaction};

/// In-memory repository implementation.
pub mod memory;

/// Book record for insertion operations.
///
/// Contains all required fields for creating a new book record.
#[derive(Debug, Clone)]
pub struct BookRecordInsert {
    /// Unique identifier for the book
    pub id: BookId,
    /// Timestamp when the book was created
    pub create_time: UtcDateTime,
    /// Display name of the book
    pub display_name: String,
    /// Author of the book
    pub author: String,
    /// International Standard Book Number
    pub isbn: String,
    /// Description of the book
    pub description: String,
    /// Price in cents
    pub price_cents: i64,
    /// Number of pages in the book
    pub page_count: i32,
    /// Number of available copies
    pub amount: i64,
}

/// Complete book record as stored by a repository.
#[derive(Debug, Clone, PartialEq)]
pub struct BookRecordOwned {
    pub id: BookId,
    pub create_time: UtcDateTime,
    pub display_name: String,
    pub author: String,
    pub isbn: String,
    pub description: String,
    pub price_cents: i64,
    pub page_count: i32,
    pub amount: i64,
}

/// Generic book store.
///
/// Every operation runs inside the transaction handed in by the caller.
/// Filters, orderings and field masks are applied by the store as given.
#[async_trait]
pub trait BookRepository: Debug + Send + Sync {
    type Transaction: Transaction;

    /// Inserts a new book record and returns the stored book.
    ///
    /// # Errors
    ///
    /// Returns an error if a book with the same id exists.
    async fn create(
        &self,
        transaction: &mut Self::Transaction,
        record: BookRecordInsert,
    ) -> StoreResult<BookModel>;

    /// Selects a book by id within the scope of `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RecordNotFound`](crate::error::StoreError::RecordNotFound)
    /// if no book with the id matches the filter.
    async fn read_by_id(
        &self,
        transaction: &mut Self::Transaction,
        id: &BookId,
        filter: &Filter,
        fields: &BookFieldMask,
    ) -> StoreResult<BookModel>;

    /// Deletes a book by id. Deleting an unknown id has no effect.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty.
    async fn delete_by_id(&self, transaction: &mut Self::Transaction, id: &BookId)
    -> StoreResult<()>;

    /// Selects the window of books matching `filter`, sorted by `ordering`.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection fails.
    async fn list(
        &self,
        transaction: &mut Self::Transaction,
        filter: &Filter,
        ordering: &Ordering,
        paging: &Paging,
        fields: &BookFieldMask,
    ) -> StoreResult<Vec<BookModel>>;
}

impl BookRecordOwned {
    /// Converts the record into a model holding only the fields selected by `fields`.
    pub fn project(&self, fields: &BookFieldMask) -> BookModel {
        fields.apply(BookModel::from(self.clone()))
    }

    /// Checks if the record satisfies `filter`. An empty filter matches everything.
    pub fn matches(&self, filter: &Filter) -> bool {
        filter.is_empty() || matches!(filter.evaluate(self), Some(Value::Boolean(true)))
    }
}

impl SchemaMapped for BookRecordOwned {
    fn get_field(&self, name: &str) -> Value {
        match name {
            BookModel::ID_FIELD => self.id.to_string().into(),
            BookModel::CREATE_TIME_FIELD => self.create_time.into(),
            BookModel::DISPLAY_NAME_FIELD => self.display_name.clone().into(),
            BookModel::AUTHOR_FIELD => self.author.clone().into(),
            BookModel::ISBN_FIELD => self.isbn.clone().into(),
            BookModel::DESCRIPTION_FIELD => self.description.clone().into(),
            BookModel::PRICE_CENTS_FIELD => self.price_cents.into(),
            BookModel::PAGE_COUNT_FIELD => self.page_count.into(),
            BookModel::AMOUNT_FIELD => self.amount.into(),
            _ => unimplemented!("SchemaMapped for BookRecordOwned::{}", name),
        }
    }
}

impl From<BookRecordInsert> for BookRecordOwned {
    fn from(record: BookRecordInsert) -> Self {
        Self {
            id: record.id,
            create_time: record.create_time,
            display_name: record.display_name,
            author: record.author,
            isbn: record.isbn,
            description: record.description,
            price_cents: record.price_cents,
            page_count: record.page_count,
            amount: record.amount,
        }
    }
}

impl From<BookRecordOwned> for BookModel {
    fn from(record: BookRecordOwned) -> Self {
        Self {
            id: record.id,
            create_time: Some(record.create_time),
            display_name: record.display_name,
            author: record.author,
            isbn: record.isbn,
            description: record.description,
            price_cents: record.price_cents,
            page_count: record.page_count,
            amount: record.amount,
        }
    }
}
