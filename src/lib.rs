//! # clickhouse-http
//!
//! Blocking HTTP wire client for ClickHouse with typed decoding of the
//! `TabSeparatedWithNamesAndTypes` response format.
//!
//! A query is POSTed over a persistent HTTP session together with the
//! per-session settings; the response streams back as two header lines
//! (column names, declared types) followed by data lines. Each column's
//! declared type, including parameterized and nested forms such as
//! `Nullable(T)`, `Decimal(P, S)` and `DateTime64(p)`, resolves once to a
//! converter, and rows are decoded lazily, one line per pull, without ever
//! buffering the whole result.
//!
//! ## Example
//!
//! ```no_run
//! use clickhouse_http::{generate_session_id, HttpTransport, Settings};
//!
//! # fn main() -> clickhouse_http::Result<()> {
//! let settings = Settings::new()
//!     .session_id(generate_session_id(10))
//!     .session_timeout(300);
//!
//! let mut transport = HttpTransport::builder()
//!     .url("http://localhost:8123")
//!     .database("default")
//!     .username("default")
//!     .settings(settings)
//!     .build()?;
//!
//! if let Some(set) = transport.execute("SELECT number, toString(number) FROM system.numbers LIMIT 10")? {
//!     println!("columns: {:?}", set.names());
//!     for row in set {
//!         println!("{:?}", row?);
//!     }
//! }
//!
//! transport.close();
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod error;
pub mod session;
pub mod transport;
pub mod tsv;
pub mod types;

// Re-export public API
pub use error::{ConvertError, DatabaseError, Result, TransportError};
pub use session::{generate_session_id, DEFAULT_SESSION_ID_LENGTH};
pub use transport::{
    Column, HttpRowSet, HttpTransport, RowCursor, RowSet, Settings, TransportBuilder,
};
pub use tsv::DecodePolicy;
pub use types::{Converter, TypeDescriptor, Value};
