//! Transport layer for ClickHouse HTTP communication.
//!
//! The transport layer is organized into:
//! - `http` - the blocking HTTP transport and its builder
//! - `cursor` - lazy decoding of the response stream into typed rows
//! - `settings` - the per-session settings map sent with every request

pub mod cursor;
pub mod http;
pub mod settings;

// Re-export commonly used types
pub use cursor::{Column, RowCursor, RowSet};
pub use http::{HttpRowSet, HttpTransport, TransportBuilder, FORMAT_DIRECTIVE};
pub use settings::Settings;
