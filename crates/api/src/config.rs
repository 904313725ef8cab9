//! Server configuration loaded from environment variables.

use sandesh_core::locking::{validate_lock_ttl, DEFAULT_LOCK_TTL_MINS};

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Campaign lock time-to-live in minutes (default: `30`).
    pub lock_ttl_mins: i64,
    /// Base URL of the external send worker.
    pub send_worker_url: String,
    /// Per-request timeout for send-worker calls in seconds (default: `10`).
    pub send_worker_timeout_secs: u64,
    /// Upper bound for a `GET /jobs/{id}?wait=true` long poll in seconds
    /// (default: `25`, kept under the request timeout).
    pub status_wait_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                 |
    /// |----------------------------|-------------------------|
    /// | `HOST`                     | `0.0.0.0`               |
    /// | `PORT`                     | `3000`                  |
    /// | `CORS_ORIGINS`             | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                    |
    /// | `LOCK_TTL_MINS`            | `30`                    |
    /// | `SEND_WORKER_URL`          | `http://localhost:9100` |
    /// | `SEND_WORKER_TIMEOUT_SECS` | `10`                    |
    /// | `STATUS_WAIT_SECS`         | `25`                    |
    ///
    /// Panics on malformed values; misconfiguration should fail fast at
    /// startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let lock_ttl_mins: i64 = std::env::var("LOCK_TTL_MINS")
            .unwrap_or_else(|_| DEFAULT_LOCK_TTL_MINS.to_string())
            .parse()
            .expect("LOCK_TTL_MINS must be a valid i64");
        validate_lock_ttl(lock_ttl_mins).expect("LOCK_TTL_MINS out of range");

        let send_worker_url =
            std::env::var("SEND_WORKER_URL").unwrap_or_else(|_| "http://localhost:9100".into());

        let send_worker_timeout_secs: u64 = std::env::var("SEND_WORKER_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("SEND_WORKER_TIMEOUT_SECS must be a valid u64");

        let status_wait_secs: u64 = std::env::var("STATUS_WAIT_SECS")
            .unwrap_or_else(|_| "25".into())
            .parse()
            .expect("STATUS_WAIT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            lock_ttl_mins,
            send_worker_url,
            send_worker_timeout_secs,
            status_wait_secs,
        }
    }
}
