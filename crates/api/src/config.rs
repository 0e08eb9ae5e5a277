use std::path::PathBuf;
use std::str::FromStr;

use pdfshield_sanitizer::CallbackUrls;

/// Path of the success callback, relative to `public_base_url`.
pub const SUCCESS_CALLBACK_PATH: &str = "/api/callback/success";

/// Path of the failure callback, relative to `public_base_url`.
pub const FAILURE_CALLBACK_PATH: &str = "/api/callback/failure";

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
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Grace period for background tasks after the listener stops (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Externally reachable base URL of this server, used to build the
    /// callback URLs handed to the sanitizer.
    pub public_base_url: String,
    /// Sanitizer submission endpoint.
    pub sanitizer_url: String,
    /// Upper bound on a single sanitizer handoff in seconds (default: `20`).
    pub sanitizer_timeout_secs: u64,
    /// Directory holding sanitized artifacts.
    pub upload_dir: PathBuf,
    /// Largest accepted request body in bytes (uploads and callbacks).
    pub max_upload_bytes: usize,
    /// Per-subscriber event queue capacity.
    pub subscriber_queue_capacity: usize,
    /// Age after which terminal jobs are evicted. `None` keeps them forever.
    pub job_retention_hours: Option<i64>,
    /// How often the retention sweeper runs, in seconds.
    pub job_retention_interval_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                                |
    /// |-------------------------------|----------------------------------------|
    /// | `HOST`                        | `0.0.0.0`                              |
    /// | `PORT`                        | `3000`                                 |
    /// | `CORS_ORIGINS`                | `http://localhost:3000`                |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                                   |
    /// | `SHUTDOWN_TIMEOUT_SECS`       | `30`                                   |
    /// | `PUBLIC_BASE_URL`             | `http://localhost:3000`                |
    /// | `SANITIZER_URL`               | `http://localhost:8000/sanitise/pdf`   |
    /// | `SANITIZER_TIMEOUT_SECS`      | `20`                                   |
    /// | `UPLOAD_DIR`                  | `uploads`                              |
    /// | `MAX_UPLOAD_BYTES`            | `52428800` (50 MiB)                    |
    /// | `SUBSCRIBER_QUEUE_CAPACITY`   | `64`                                   |
    /// | `JOB_RETENTION_HOURS`         | unset (no eviction)                    |
    /// | `JOB_RETENTION_INTERVAL_SECS` | `3600`                                 |
    ///
    /// Panics on unparsable values so misconfiguration fails at startup.
    /// `SANITIZER_TIMEOUT_SECS` must be shorter than `REQUEST_TIMEOUT_SECS`
    /// so an upload can report a dispatch failure before the request expires.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = env_parse("PORT", 3000u16);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"));
        let sanitizer_url = std::env::var("SANITIZER_URL")
            .unwrap_or_else(|_| "http://localhost:8000/sanitise/pdf".into());
        let upload_dir = std::env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploads"));

        let job_retention_hours = std::env::var("JOB_RETENTION_HOURS")
            .ok()
            .map(|v| parse_retention_hours(&v).unwrap_or_else(|e| panic!("JOB_RETENTION_HOURS {e}")));

        let request_timeout_secs = env_parse("REQUEST_TIMEOUT_SECS", 30);
        let sanitizer_timeout_secs = env_parse("SANITIZER_TIMEOUT_SECS", 20);
        check_timeouts(request_timeout_secs, sanitizer_timeout_secs)
            .unwrap_or_else(|e| panic!("{e}"));

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs: env_parse("SHUTDOWN_TIMEOUT_SECS", 30),
            public_base_url,
            sanitizer_url,
            sanitizer_timeout_secs,
            upload_dir,
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", 50 * 1024 * 1024),
            subscriber_queue_capacity: env_parse("SUBSCRIBER_QUEUE_CAPACITY", 64),
            job_retention_hours,
            job_retention_interval_secs: env_parse("JOB_RETENTION_INTERVAL_SECS", 3600),
        }
    }

    /// Retention window for finished jobs, if eviction is enabled.
    pub fn job_retention(&self) -> Option<chrono::Duration> {
        self.job_retention_hours.and_then(chrono::Duration::try_hours)
    }

    /// Callback URLs embedded in every sanitizer submission.
    pub fn callback_urls(&self) -> CallbackUrls {
        let base = self.public_base_url.trim_end_matches('/');
        CallbackUrls {
            success: format!("{base}{SUCCESS_CALLBACK_PATH}"),
            failure: format!("{base}{FAILURE_CALLBACK_PATH}"),
        }
    }
}

/// Read `key` and parse it, falling back to `default` when unset.
fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} must be a valid {}: {e}", std::any::type_name::<T>())),
        Err(_) => default,
    }
}

/// Largest accepted `JOB_RETENTION_HOURS` (100 years).
const MAX_RETENTION_HOURS: i64 = 100 * 366 * 24;

/// Parse a retention window in hours: a positive integer no larger than
/// [`MAX_RETENTION_HOURS`].
fn parse_retention_hours(raw: &str) -> Result<i64, String> {
    let hours: i64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("must be a whole number of hours: {e}"))?;
    if !(1..=MAX_RETENTION_HOURS).contains(&hours) {
        return Err(format!("must be between 1 and {MAX_RETENTION_HOURS}, got {hours}"));
    }
    Ok(hours)
}

/// The sanitizer handoff has to finish inside the request that waits on it.
fn check_timeouts(request_timeout_secs: u64, sanitizer_timeout_secs: u64) -> Result<(), String> {
    if sanitizer_timeout_secs >= request_timeout_secs {
        return Err(format!(
            "SANITIZER_TIMEOUT_SECS ({sanitizer_timeout_secs}) must be less than \
             REQUEST_TIMEOUT_SECS ({request_timeout_secs})"
        ));
    }
    Ok(())
}
