use bomboni_request::{
    error::{CommonError, RequestError, RequestResult},
    filter::Filter,
    ordering::Ordering,
    parse::RequestParse,
    query::utility::{parse_query_filter, parse_query_ordering},
};
use prost::Name;

use crate::{
    model::{
        book::{BookId, BookModel, book_id_convert},
        field_mask::BookFieldMask,
        paging::Paging,
    },
    v1::{CreateBookRequest, DeleteBookRequest, ListBookRequest, ReadBookRequest},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCreateBookRequest {
    pub display_name: String,
    pub author: String,
    pub isbn: String,
    pub description: String,
    pub price_cents: i64,
    pub page_count: i32,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReadBookRequest {
    pub id: BookId,
    pub fields: BookFieldMask,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDeleteBookRequest {
    pub id: BookId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedListBookRequest {
    pub filter: Filter,
    pub ordering: Ordering,
    pub paging: Paging,
    pub fields: BookFieldMask,
}

impl ParsedCreateBookRequest {
    pub const PAYLOAD_FIELD: &str = "payload";
}

impl ParsedReadBookRequest {
    pub const ID_FIELD: &str = "id";
    pub const FIELDS_FIELD: &str = "fields";
}

impl ParsedDeleteBookRequest {
    pub const ID_FIELD: &str = "id";
}

impl ParsedListBookRequest {
    pub const PAGING_FIELD: &str = "paging";
    pub const FIELDS_FIELD: &str = "fields";
}

impl RequestParse<CreateBookRequest> for ParsedCreateBookRequest {
    type Error = RequestError;

    /// Parses the create payload.
    /// The payload identifier and creation time are assigned by the server and ignored here.
    fn parse(request: CreateBookRequest) -> RequestResult<Self> {
        (|| -> RequestResult<Self> {
            let payload = request.payload.ok_or_else(|| {
                RequestError::field(Self::PAYLOAD_FIELD, CommonError::RequiredFieldMissing)
            })?;
            Ok(Self {
                display_name: payload.display_name,
                author: payload.author,
                isbn: payload.isbn,
                description: payload.description,
                price_cents: payload.price_cents,
                page_count: payload.page_count,
                amount: payload.amount,
            })
        })()
        .map_err(|err| err.wrap_request(CreateBookRequest::NAME))
    }
}

impl RequestParse<ReadBookRequest> for ParsedReadBookRequest {
    type Error = RequestError;

    fn parse(request: ReadBookRequest) -> RequestResult<Self> {
        (|| -> RequestResult<Self> {
            Ok(Self {
                id: book_id_convert::parse(&request.id)
                    .map_err(|err| err.wrap(Self::ID_FIELD))?,
                fields: BookFieldMask::parse(request.fields)
                    .map_err(|err| err.wrap(Self::FIELDS_FIELD))?,
            })
        })()
        .map_err(|err| err.wrap_request(ReadBookRequest::NAME))
    }
}

impl RequestParse<DeleteBookRequest> for ParsedDeleteBookRequest {
    type Error = RequestError;

    fn parse(request: DeleteBookRequest) -> RequestResult<Self> {
        book_id_convert::parse(&request.id)
            .map(|id| Self { id })
            .map_err(|err| {
                err.wrap(Self::ID_FIELD)
                    .wrap_request(DeleteBookRequest::NAME)
            })
    }
}

impl RequestParse<ListBookRequest> for ParsedListBookRequest {
    type Error = RequestError;

    /// Parses the list query and validates filter and ordering against the book schema.
    fn parse(request: ListBookRequest) -> RequestResult<Self> {
        (|| -> RequestResult<Self> {
            let schema = BookModel::get_schema();
            Ok(Self {
                filter: parse_query_filter(Some(request.filter.trim()), &schema, None)?,
                ordering: parse_query_ordering(Some(request.order_by.trim()), &schema, None)?,
                paging: Paging::parse(request.paging)
                    .map_err(|err| err.wrap(Self::PAGING_FIELD))?,
                fields: BookFieldMask::parse(request.fields)
                    .map_err(|err| err.wrap(Self::FIELDS_FIELD))?,
            })
        })()
        .map_err(|err| err.wrap_request(ListBookRequest::NAME))
    }
}

#[cfg(test)]
mod tests {
    use bomboni_common::id::Id;

    use crate::v1::{Book, FieldMask, Pagination};

    use super::*;

    fn violation(err: RequestError) -> (String, String, String) {
        let RequestError::BadRequest { name, violations } = err else {
            panic!("expected bad request, got {err:?}");
        };
        assert_eq!(violations.len(), 1);
        let violation = &violations[0];
        (name, violation.field.clone(), violation.error.to_string())
    }

    fn list_filter_error(filter: &str) -> (String, String, String) {
        violation(
            ParsedListBookRequest::parse(ListBookRequest {
                filter: filter.into(),
                ..Default::default()
            })
            .unwrap_err(),
        )
    }

    #[test]
    fn parse_create() {
        let request = ParsedCreateBookRequest::parse(CreateBookRequest {
            payload: Some(Book {
                id: "ignored".into(),
                display_name: "Dune".into(),
                amount: 2,
                ..Default::default()
            }),
        })
        .unwrap();
        assert_eq!(request.display_name, "Dune");
        assert_eq!(request.amount, 2);

        let err = ParsedCreateBookRequest::parse(CreateBookRequest { payload: None }).unwrap_err();
        let (name, field, _) = violation(err);
        assert_eq!(name, "CreateBookRequest");
        assert_eq!(field, "payload");
    }

    #[test]
    fn parse_read() {
        let id = BookId::new(Id::generate());
        let request = ParsedReadBookRequest::parse(ReadBookRequest {
            id: id.to_string(),
            fields: Some(FieldMask {
                paths: vec!["amount".into()],
            }),
        })
        .unwrap();
        assert_eq!(request.id, id);
        assert!(request.fields.masks("amount"));
        assert!(!request.fields.masks("isbn"));

        assert_eq!(
            violation(
                ParsedReadBookRequest::parse(ReadBookRequest {
                    id: id.to_string(),
                    fields: Some(FieldMask {
                        paths: vec!["title".into()],
                    }),
                })
                .unwrap_err()
            )
            .1,
            "fields.paths"
        );

        let err = ParsedDeleteBookRequest::parse(DeleteBookRequest { id: "42x".into() }).unwrap_err();
        assert_eq!(
            violation(err),
            (
                "DeleteBookRequest".into(),
                "id".into(),
                "invalid ID format".into()
            )
        );
        let err = ParsedDeleteBookRequest::parse(DeleteBookRequest::default()).unwrap_err();
        assert_eq!(violation(err).2, "no value provided for required field");
    }

    #[test]
    fn parse_list() {
        let request = ParsedListBookRequest::parse(ListBookRequest {
            filter: r#"author = "Frank Herbert" AND price_cents < 2000"#.into(),
            order_by: "price_cents desc, display_name".into(),
            paging: Some(Pagination {
                offset: 10,
                limit: 5,
            }),
            fields: None,
        })
        .unwrap();
        assert!(!request.filter.is_empty());
        assert_eq!(request.ordering.terms.len(), 2);
        assert_eq!(request.paging, Paging::new(10, 5));

        let request = ParsedListBookRequest::parse(ListBookRequest::default()).unwrap();
        assert!(request.filter.is_empty());
        assert!(request.ordering.terms.is_empty());
        assert!(!request.paging.is_paged());
    }

    #[test]
    fn parse_list_errors() {
        let (name, field, _) = list_filter_error(r#"title = "Dune""#);
        assert_eq!(name, "ListBookRequest");
        assert_eq!(field, "filter");

        assert_eq!(list_filter_error("amount >").1, "filter");

        let (_, field, _) = violation(
            ParsedListBookRequest::parse(ListBookRequest {
                order_by: "description".into(),
                ..Default::default()
            })
            .unwrap_err(),
        );
        assert_eq!(field, "order_by");

        let (_, field, _) = violation(
            ParsedListBookRequest::parse(ListBookRequest {
                paging: Some(Pagination {
                    offset: -1,
                    limit: 5,
                }),
                ..Default::default()
            })
            .unwrap_err(),
        );
        assert_eq!(field, "paging.offset");
    }

    #[test]
    fn filter_value_types() {
        for filter in [r#"amount = "three""#, "price_cents < 1000.5", "Dune"] {
            assert_eq!(list_filter_error(filter).1, "filter", "{filter}");
        }

        assert!(
            ParsedListBookRequest::parse(ListBookRequest {
                filter: r#"amount >= 2 AND NOT (display_name = "Dune")"#.into(),
                ..Default::default()
            })
            .is_ok()
        );
    }
}
