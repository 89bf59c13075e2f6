/// Version reported by the `GetVersion` call.
pub const VERSION: &str = "0.0.1";
