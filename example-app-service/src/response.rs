//! Handler output with an optional out-of-band status.

use example_app_api::model::metadata::{STATUS_CODE_KEY, STATUS_MESSAGE_KEY};
use tonic::{Response, metadata::MetadataValue};

/// Status reported next to a successful response message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    /// The addressed resource was deleted.
    Deleted,
}

/// Response message produced by a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse<T> {
    pub message: T,
    pub status: Option<ResponseStatus>,
}

impl ResponseStatus {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Deleted => "DELETED",
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::Deleted => "Deleted",
        }
    }
}

impl<T> HandlerResponse<T> {
    pub const fn new(message: T) -> Self {
        Self {
            message,
            status: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: ResponseStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn map<U, F>(self, f: F) -> HandlerResponse<U>
    where
        F: FnOnce(T) -> U,
    {
        HandlerResponse {
            message: f(self.message),
            status: self.status,
        }
    }

    /// Converts into a gRPC response, writing the status into the response metadata.
    pub fn into_response(self) -> Response<T> {
        let mut response = Response::new(self.message);
        if let Some(status) = self.status {
            let metadata = response.metadata_mut();
            metadata.insert(STATUS_CODE_KEY, MetadataValue::from_static(status.code()));
            metadata.insert(
                STATUS_MESSAGE_KEY,
                MetadataValue::from_static(status.message()),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_response() {
        let response = HandlerResponse::new(()).into_response();
        assert!(response.metadata().get(STATUS_CODE_KEY).is_none());

        let response = HandlerResponse::new(())
            .with_status(ResponseStatus::Deleted)
            .into_response();
        let metadata = response.metadata();
        assert_eq!(
            metadata.get(STATUS_CODE_KEY).unwrap().to_str().unwrap(),
            "DELETED"
        );
        assert_eq!(
            metadata.get(STATUS_MESSAGE_KEY).unwrap().to_str().unwrap(),
            "Deleted"
        );
    }
}
