//! Blocking HTTP transport for query execution.
//!
//! One [`HttpTransport`] owns one reusable HTTP client and represents one
//! logical database connection: fixed base URL, credentials, timeout pair,
//! TLS mode, extra headers, and session settings. It is not internally
//! synchronized: callers that share a transport across threads must
//! serialize access themselves; the intended shape is one transport per
//! worker.
//!
//! # Example
//!
//! ```no_run
//! use clickhouse_http::HttpTransport;
//!
//! # fn main() -> clickhouse_http::Result<()> {
//! let mut transport = HttpTransport::builder()
//!     .url("http://localhost:8123")
//!     .database("default")
//!     .build()?;
//!
//! if let Some(set) = transport.execute("SELECT 1 AS x")? {
//!     for row in set {
//!         println!("{:?}", row?);
//!     }
//! }
//! transport.close();
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::io::BufReader;
use std::time::Duration;

use log::debug;
use reqwest::blocking::{Client, Response};
use reqwest::header::HeaderMap;
use reqwest::{Identity, StatusCode};

use crate::error::{Result, TransportError};
use crate::transport::cursor::RowSet;
use crate::transport::settings::Settings;
use crate::tsv::DecodePolicy;

/// Format directive appended to queries when the server has no
/// `default_format` session default.
pub const FORMAT_DIRECTIVE: &str = "FORMAT TabSeparatedWithNamesAndTypes";

/// Result set produced by [`HttpTransport::execute`].
pub type HttpRowSet = RowSet<BufReader<Response>>;

/// Blocking HTTP transport bound to one logical connection.
pub struct HttpTransport {
    url: String,
    database: String,
    username: String,
    password: String,
    settings: Settings,
    headers: HeaderMap,
    policy: DecodePolicy,
    append_format: bool,
    client: Option<Client>,
}

impl HttpTransport {
    /// Start building a transport.
    pub fn builder() -> TransportBuilder {
        TransportBuilder::new()
    }

    /// Execute a query and decode the typed result stream.
    ///
    /// Returns `Ok(None)` for statements that produce no result set (for
    /// example DDL); otherwise the [`HttpRowSet`] holds the column header
    /// and the lazy row cursor. Exactly one full traversal of the rows is
    /// possible per call.
    pub fn execute(&self, query: &str) -> Result<Option<HttpRowSet>> {
        self.execute_with_params(query, &[])
    }

    /// [`execute`](Self::execute) with extra per-call query parameters.
    ///
    /// Caller parameters are merged with the transport's settings and the
    /// target database; settings win on key collisions.
    pub fn execute_with_params(
        &self,
        query: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<HttpRowSet>> {
        let sql = normalize_query(query);
        let body = if self.append_format {
            format!("{}\n{}", sql, FORMAT_DIRECTIVE)
        } else {
            sql.to_string()
        };

        let response = self.send(body, params)?;
        RowSet::from_reader(BufReader::new(response), self.policy)
    }

    /// Execute a statement and return the whole response body as text,
    /// without header or row interpretation.
    pub fn raw(&self, query: &str) -> Result<String> {
        self.raw_with_params(query, &[])
    }

    /// [`raw`](Self::raw) with extra per-call query parameters.
    pub fn raw_with_params(&self, query: &str, params: &[(&str, &str)]) -> Result<String> {
        let response = self.send(query.to_string(), params)?;
        response
            .text()
            .map_err(|e| TransportError::Request(e).into())
    }

    /// Execute a statement and return the streaming response body.
    ///
    /// The streaming counterpart of [`raw`](Self::raw): the body is read
    /// from the socket as the returned reader is consumed.
    pub fn raw_reader(
        &self,
        query: &str,
        params: &[(&str, &str)],
    ) -> Result<impl std::io::Read> {
        Ok(self.send(query.to_string(), params)?)
    }

    /// Session settings this transport sends with every request.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Release the underlying HTTP client. Safe to call multiple times;
    /// any later query fails with a closed-transport error.
    pub fn close(&mut self) {
        self.client = None;
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.client.is_none()
    }

    fn send(
        &self,
        body: String,
        params: &[(&str, &str)],
    ) -> std::result::Result<Response, TransportError> {
        let client = self.client.as_ref().ok_or(TransportError::Closed)?;

        // Merge order: caller params, then the database, then settings.
        let mut query: BTreeMap<&str, &str> = params.iter().copied().collect();
        query.insert("database", &self.database);
        for (key, value) in self.settings.iter() {
            query.insert(key, value);
        }
        let pairs: Vec<(&str, &str)> = query.into_iter().collect();

        debug!(
            "POST {} ({} byte body, {} query parameters)",
            self.url,
            body.len(),
            pairs.len()
        );

        let response = client
            .post(&self.url)
            .query(&pairs)
            .headers(self.headers.clone())
            .basic_auth(&self.username, Some(&self.password))
            .body(body)
            .send()?;

        let status = response.status();
        if status != StatusCode::OK {
            let code = status.as_u16();
            let body = response.text().unwrap_or_default();
            debug!("server rejected request: HTTP {}", code);
            return Err(TransportError::Http { code, body });
        }
        Ok(response)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("url", &self.url)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("settings", &self.settings)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Strip trailing statement terminators and whitespace.
///
/// The wire format may append its own directive after the query text, and
/// a dangling `;` or newline would corrupt it.
fn normalize_query(query: &str) -> &str {
    query.trim_end_matches(|c| matches!(c, ';' | ' ' | '\r' | '\n'))
}

/// Builder for [`HttpTransport`] with validation at `build` time.
#[derive(Default)]
pub struct TransportBuilder {
    url: Option<String>,
    database: Option<String>,
    username: Option<String>,
    password: Option<String>,
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
    settings: Settings,
    headers: HeaderMap,
    verify_tls: Option<bool>,
    identity: Option<Identity>,
    ddl_timeout: Option<u64>,
    policy: DecodePolicy,
    append_format: bool,
    client: Option<Client>,
}

impl std::fmt::Debug for TransportBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportBuilder")
            .field("url", &self.url)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("settings", &self.settings)
            .field("append_format", &self.append_format)
            .finish_non_exhaustive()
    }
}

impl TransportBuilder {
    /// Create a builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Base URL of the HTTP endpoint, e.g. `http://localhost:8123`.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Target database name, sent as the `database` query parameter.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Username for basic auth. Defaults to `default`.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Password for basic auth. Defaults to empty.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Connect and read timeouts, fixed for every request of the
    /// transport. Defaults: 10 seconds connect, 300 seconds read.
    pub fn timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = Some(connect);
        self.read_timeout = Some(read);
        self
    }

    /// Replace the session settings map.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Insert a single session setting.
    pub fn setting(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.settings.set(key, value);
        self
    }

    /// Extra headers sent with every request.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Enable or disable TLS certificate verification. Defaults to on.
    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = Some(verify);
        self
    }

    /// Client certificate presented during the TLS handshake.
    pub fn identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Inject `distributed_ddl_task_timeout` into the settings, in seconds.
    pub fn ddl_timeout(mut self, seconds: u64) -> Self {
        self.ddl_timeout = Some(seconds);
        self
    }

    /// Policy for undecodable bytes in response fields.
    pub fn decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Append `FORMAT TabSeparatedWithNamesAndTypes` to every `execute`
    /// query, for servers without a `default_format` session default.
    pub fn append_format_directive(mut self, append: bool) -> Self {
        self.append_format = append;
        self
    }

    /// Use a caller-supplied HTTP client instead of building one. The
    /// timeout and TLS options above are ignored in that case.
    pub fn http_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Validate the configuration and build the transport.
    pub fn build(self) -> std::result::Result<HttpTransport, TransportError> {
        let url = self
            .url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| TransportError::Config("base URL is required".to_string()))?;
        let database = self
            .database
            .filter(|d| !d.is_empty())
            .ok_or_else(|| TransportError::Config("database name is required".to_string()))?;

        let mut settings = self.settings;
        if let Some(seconds) = self.ddl_timeout {
            settings.set("distributed_ddl_task_timeout", seconds);
        }

        let client = match self.client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder()
                    .connect_timeout(self.connect_timeout.unwrap_or(Duration::from_secs(10)))
                    .timeout(self.read_timeout.unwrap_or(Duration::from_secs(300)))
                    .danger_accept_invalid_certs(!self.verify_tls.unwrap_or(true));
                if let Some(identity) = self.identity {
                    builder = builder.identity(identity);
                }
                builder.build()?
            }
        };

        Ok(HttpTransport {
            url,
            database,
            username: self.username.unwrap_or_else(|| "default".to_string()),
            password: self.password.unwrap_or_default(),
            settings,
            headers: self.headers,
            policy: self.policy,
            append_format: self.append_format,
            client: Some(client),
        })
    }
}
