//! Tracing and observability module.
//!
//! Provides distributed tracing capabilities for the example app service.

/// Tracer configuration and initialization.
pub mod tracer;
