use std::collections::BTreeSet;

use bomboni_request::error::{CommonError, RequestError, RequestResult};

use crate::{model::book::BookModel, v1::FieldMask};

/// Selection of book fields returned to the caller.
///
/// An absent or empty mask selects every field. The identifier is always selected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookFieldMask {
    paths: Option<BTreeSet<String>>,
}

impl BookFieldMask {
    pub const PATHS_FIELD: &str = "paths";

    pub fn parse(mask: Option<FieldMask>) -> RequestResult<Self> {
        let Some(mask) = mask.filter(|mask| !mask.paths.is_empty()) else {
            return Ok(Self::default());
        };
        let mut paths = BTreeSet::new();
        for path in mask.paths {
            if !BookModel::is_field(&path) {
                return Err(RequestError::field(
                    Self::PATHS_FIELD,
                    CommonError::InvalidName {
                        expected_format: BookModel::FIELDS.join(" | "),
                        name: path,
                    },
                ));
            }
            paths.insert(path);
        }
        Ok(Self { paths: Some(paths) })
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn masks(&self, field: &str) -> bool {
        field == BookModel::ID_FIELD
            || self
                .paths
                .as_ref()
                .is_none_or(|paths| paths.contains(field))
    }

    /// Clears every field not selected by this mask.
    pub fn apply(&self, book: BookModel) -> BookModel {
        if self.paths.is_none() {
            return book;
        }
        macro_rules! masked {
            ($($field:ident => $name:expr),* $(,)?) => {
                BookModel {
                    id: book.id,
                    $(
                        $field: if self.masks($name) {
                            book.$field
                        } else {
                            Default::default()
                        },
                    )*
                }
            };
        }
        masked! {
            create_time => BookModel::CREATE_TIME_FIELD,
            display_name => BookModel::DISPLAY_NAME_FIELD,
            author => BookModel::AUTHOR_FIELD,
            isbn => BookModel::ISBN_FIELD,
            description => BookModel::DESCRIPTION_FIELD,
            price_cents => BookModel::PRICE_CENTS_FIELD,
            page_count => BookModel::PAGE_COUNT_FIELD,
            amount => BookModel::AMOUNT_FIELD,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::book::BookId;

    use super::*;

    fn mask(paths: &[&str]) -> Option<FieldMask> {
        Some(FieldMask {
            paths: paths.iter().map(ToString::to_string).collect(),
        })
    }

    #[test]
    fn parse() {
        assert_eq!(BookFieldMask::parse(None).unwrap(), BookFieldMask::all());
        assert_eq!(BookFieldMask::parse(mask(&[])).unwrap(), BookFieldMask::all());
        let err = BookFieldMask::parse(mask(&["amount", "title"])).unwrap_err();
        let RequestError::Field(error) = err else {
            panic!("expected field error, got {err:?}");
        };
        assert_eq!(error.field, "paths");
        assert!(error.error.to_string().ends_with("but got `title`."));
    }

    #[test]
    fn apply() {
        let book = BookModel {
            id: BookId::new(7u64),
            display_name: "Dune".into(),
            author: "Frank Herbert".into(),
            amount: 3,
            ..Default::default()
        };

        assert_eq!(BookFieldMask::all().apply(book.clone()), book);

        let masked = BookFieldMask::parse(mask(&["display_name"]))
            .unwrap()
            .apply(book.clone());
        assert_eq!(masked.id, book.id);
        assert_eq!(masked.display_name, "Dune");
        assert!(masked.author.is_empty());
        assert_eq!(masked.amount, 0);
    }
}
