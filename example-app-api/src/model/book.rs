use std::fmt::{self, Display, Formatter};

use bomboni_common::{date_time::UtcDateTime, id::Id};
use bomboni_macros::btree_map_into;
use bomboni_request::{
    schema::{FieldMemberSchema, Schema, SchemaMapped, ValueType},
    value::Value,
};
use time::OffsetDateTime;

use crate::v1::{Book, Timestamp};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookModel {
    pub id: BookId,
    pub create_time: Option<UtcDateTime>,
    pub display_name: String,
    pub author: String,
    pub isbn: String,
    pub description: String,
    pub price_cents: i64,
    pub page_count: i32,
    pub amount: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BookId(pub Id);

impl BookModel {
    pub const ID_FIELD: &str = "id";
    pub const CREATE_TIME_FIELD: &str = "create_time";
    pub const DISPLAY_NAME_FIELD: &str = "display_name";
    pub const AUTHOR_FIELD: &str = "author";
    pub const ISBN_FIELD: &str = "isbn";
    pub const DESCRIPTION_FIELD: &str = "description";
    pub const PRICE_CENTS_FIELD: &str = "price_cents";
    pub const PAGE_COUNT_FIELD: &str = "page_count";
    pub const AMOUNT_FIELD: &str = "amount";

    pub const FIELDS: [&str; 9] = [
        Self::ID_FIELD,
        Self::CREATE_TIME_FIELD,
        Self::DISPLAY_NAME_FIELD,
        Self::AUTHOR_FIELD,
        Self::ISBN_FIELD,
        Self::DESCRIPTION_FIELD,
        Self::PRICE_CENTS_FIELD,
        Self::PAGE_COUNT_FIELD,
        Self::AMOUNT_FIELD,
    ];

    pub fn get_schema() -> Schema {
        Schema {
            members: btree_map_into! {
                Self::ID_FIELD => FieldMemberSchema::new_ordered(ValueType::String),
                Self::CREATE_TIME_FIELD => FieldMemberSchema::new_ordered(ValueType::Timestamp),
                Self::DISPLAY_NAME_FIELD => FieldMemberSchema::new_ordered(ValueType::String),
                Self::AUTHOR_FIELD => FieldMemberSchema::new_ordered(ValueType::String),
                Self::ISBN_FIELD => FieldMemberSchema::new_ordered(ValueType::String),
                Self::DESCRIPTION_FIELD => FieldMemberSchema::new(ValueType::String),
                Self::PRICE_CENTS_FIELD => FieldMemberSchema::new_ordered(ValueType::Integer),
                Self::PAGE_COUNT_FIELD => FieldMemberSchema::new_ordered(ValueType::Integer),
                Self::AMOUNT_FIELD => FieldMemberSchema::new_ordered(ValueType::Integer),
            },
        }
    }

    /// Checks if `name` is a member of the book schema.
    pub fn is_field(name: &str) -> bool {
        Self::FIELDS.contains(&name)
    }
}

impl SchemaMapped for BookModel {
    fn get_field(&self, name: &str) -> Value {
        match name {
            Self::ID_FIELD => self.id.to_string().into(),
            Self::CREATE_TIME_FIELD => self.create_time.map_or(Value::Any, Value::from),
            Self::DISPLAY_NAME_FIELD => self.display_name.clone().into(),
            Self::AUTHOR_FIELD => self.author.clone().into(),
            Self::ISBN_FIELD => self.isbn.clone().into(),
            Self::DESCRIPTION_FIELD => self.description.clone().into(),
            Self::PRICE_CENTS_FIELD => self.price_cents.into(),
            Self::PAGE_COUNT_FIELD => self.page_count.into(),
            Self::AMOUNT_FIELD => self.amount.into(),
            _ => unimplemented!("SchemaMapped for BookModel::{name}"),
        }
    }
}

impl From<BookModel> for Book {
    fn from(model: BookModel) -> Self {
        Self {
            id: book_id_convert::write(model.id),
            create_time: model.create_time.map(timestamp_from_date_time),
            display_name: model.display_name,
            author: model.author,
            isbn: model.isbn,
            description: model.description,
            price_cents: model.price_cents,
            page_count: model.page_count,
            amount: model.amount,
        }
    }
}

fn timestamp_from_date_time(date_time: UtcDateTime) -> Timestamp {
    let date_time = OffsetDateTime::from(date_time);
    Timestamp {
        seconds: date_time.unix_timestamp(),
        nanos: date_time.nanosecond() as i32,
    }
}

impl BookId {
    pub fn new<T: Into<Id>>(id: T) -> Self {
        Self(id.into())
    }

    pub fn parse<S: AsRef<str>>(id: S) -> Option<Self> {
        id.as_ref().parse::<Id>().ok().map(Self)
    }
}

impl Display for BookId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

pub mod book_id_convert {
    use bomboni_request::error::{CommonError, RequestResult};

    use crate::model::book::BookId;

    pub fn parse<S: AsRef<str>>(id: S) -> RequestResult<BookId> {
        let id = id.as_ref();
        if id.is_empty() {
            return Err(CommonError::RequiredFieldMissing.into());
        }
        BookId::parse(id).ok_or_else(|| CommonError::InvalidId.into())
    }

    pub fn write(id: BookId) -> String {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id() {
        let id = BookId::new(Id::generate());
        assert_eq!(
            book_id_convert::parse(book_id_convert::write(id)).unwrap(),
            id
        );
        assert_eq!(
            book_id_convert::parse("books/1").unwrap_err().to_string(),
            "invalid ID format"
        );
        assert_eq!(
            book_id_convert::parse("").unwrap_err().to_string(),
            "no value provided for required field"
        );
    }

    #[test]
    fn convert_book() {
        let id = BookId::new(Id::generate());
        let book = Book::from(BookModel {
            id,
            create_time: Some(UtcDateTime::from(
                OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
            )),
            display_name: "Dune".into(),
            author: "Frank Herbert".into(),
            price_cents: 1299,
            amount: 3,
            ..Default::default()
        });
        assert_eq!(book.id, id.to_string());
        assert_eq!(book.create_time.as_ref().unwrap().seconds, 1_700_000_000);
        assert_eq!(book.display_name, "Dune");
        assert_eq!(book.price_cents, 1299);
        assert_eq!(book.amount, 3);

        let book = Book::from(BookModel::default());
        assert!(book.create_time.is_none());
    }

    #[test]
    fn schema_fields() {
        let schema = BookModel::get_schema();
        for field in BookModel::FIELDS {
            assert!(schema.members.contains_key(field));
        }
        assert!(!BookModel::is_field("title"));
        assert_eq!(
            BookModel {
                amount: 2,
                ..Default::default()
            }
            .get_field(BookModel::AMOUNT_FIELD),
            Value::Integer(2)
        );
    }
}
