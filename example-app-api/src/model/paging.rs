use bomboni_request::error::{CommonError, RequestError, RequestResult};

use crate::v1::{PageInfo, Pagination};

/// Requested result window.
///
/// A zero limit requests every remaining row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Paging {
    pub offset: i32,
    pub limit: i32,
}

impl Paging {
    pub const OFFSET_FIELD: &str = "offset";
    pub const LIMIT_FIELD: &str = "limit";

    pub const fn new(offset: i32, limit: i32) -> Self {
        Self { offset, limit }
    }

    pub fn parse(pagination: Option<Pagination>) -> RequestResult<Self> {
        let Some(pagination) = pagination else {
            return Ok(Self::default());
        };
        if pagination.offset < 0 {
            return Err(RequestError::field(
                Self::OFFSET_FIELD,
                CommonError::NumericOutOfRange,
            ));
        }
        if pagination.limit < 0 {
            return Err(RequestError::field(
                Self::LIMIT_FIELD,
                CommonError::NumericOutOfRange,
            ));
        }
        Ok(Self::new(pagination.offset, pagination.limit))
    }

    pub const fn is_paged(&self) -> bool {
        self.limit >= 1
    }
}

/// Offset of the first row of the next page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextPage {
    pub offset: i32,
}

impl From<NextPage> for PageInfo {
    fn from(page: NextPage) -> Self {
        Self {
            offset: page.offset,
        }
    }
}
