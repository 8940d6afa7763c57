//! Observability setup for Vitrina: structured logging with optional
//! OpenTelemetry span export.

pub mod tracing_setup;
