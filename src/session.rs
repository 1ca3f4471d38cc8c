//! Session identity tokens.
//!
//! Every transport pins its server-side session (temporary tables, session
//! timeout window) by sending a `session_id` setting with each request.
//! The token only needs to be unique among concurrent sessions, not secret;
//! it is drawn from the thread-local CSPRNG all the same.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Conventional session id length.
pub const DEFAULT_SESSION_ID_LENGTH: usize = 10;

/// Generate a random alphanumeric session token of the given length.
///
/// ```
/// use clickhouse_http::session::{generate_session_id, DEFAULT_SESSION_ID_LENGTH};
///
/// let id = generate_session_id(DEFAULT_SESSION_ID_LENGTH);
/// assert_eq!(id.len(), 10);
/// ```
pub fn generate_session_id(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
