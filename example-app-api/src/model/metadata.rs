/// Metadata key carrying the status code of a successful call.
pub const STATUS_CODE_KEY: &str = "status-code";

/// Metadata key carrying the status message of a successful call.
pub const STATUS_MESSAGE_KEY: &str = "status-message";
