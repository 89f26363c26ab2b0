pub mod metrics;
pub mod security_headers;
pub mod shared_secret;
pub mod tracing;
