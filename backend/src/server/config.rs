//! HTTP server configuration object and helpers.

use std::env;
use std::net::SocketAddr;

use tracing::warn;

const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8080);

/// Configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) database_url: Option<String>,
}

impl ServerConfig {
    /// Construct a server configuration from explicit values.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, database_url: Option<String>) -> Self {
        Self {
            bind_addr,
            database_url,
        }
    }

    /// Read configuration from the environment.
    ///
    /// `BIND_ADDR` selects the listen address (default `0.0.0.0:8080`;
    /// unparseable values fall back with a warning). `DATABASE_URL` selects
    /// the PostgreSQL gateway; when absent the in-memory gateway is used.
    #[must_use]
    pub fn from_env() -> Self {
        let bind_addr = match env::var("BIND_ADDR") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                warn!(value = %raw, error = %e, "ignoring unparseable BIND_ADDR");
                SocketAddr::from(DEFAULT_BIND_ADDR)
            }),
            Err(_) => SocketAddr::from(DEFAULT_BIND_ADDR),
        };

        Self {
            bind_addr,
            database_url: env::var("DATABASE_URL").ok(),
        }
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
