use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::upstream::UpstreamConfig;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Upstream API base url, without the `/api/v1` prefix
    pub upstream_url: String,

    pub upstream_client_id: String,

    pub upstream_client_secret: String,

    /// Client-credentials token endpoint
    pub upstream_auth_url: String,

    /// Timeout for every upstream HTTP request
    /// Default: 30 seconds
    pub upstream_timeout: Duration,

    /// Maximum payload size for all requests (in bytes)
    /// Default: 10MB (10 * 1024 * 1024)
    pub max_payload_size: usize,

    /// Directory for the rotated log files
    pub log_dir: String,

    /// Values put into every job payload that the request does not carry
    pub job_defaults: JobDefaults,
}

/// Job payload fields that cannot be derived from the create request
#[derive(Clone, Debug, PartialEq)]
pub struct JobDefaults {
    pub priority: String,
    pub action: String,
    pub department_id: i64,
    pub role_id: i64,
    pub location_id: i64,
    pub assignee_employee_id: i64,
    pub assignee_username: String,
    pub auto_assign: bool,
    pub due_in_hours: i64,
}

impl Default for JobDefaults {
    fn default() -> Self {
        Self {
            priority: "highest".to_string(),
            action: "deliver".to_string(),
            department_id: 7,
            role_id: 10,
            location_id: 10,
            assignee_employee_id: 1,
            assignee_username: "test".to_string(),
            auto_assign: false,
            due_in_hours: 24,
        }
    }
}

/// Longest due window accepted for `JOB_DUE_IN_HOURS`, one year
pub const MAX_DUE_IN_HOURS: i64 = 24 * 365;

impl JobDefaults {
    /// Defaults overridden by any `JOB_*` environment variable that is set
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();
        Ok(Self {
            priority: env::var("JOB_PRIORITY").unwrap_or(defaults.priority),
            action: env::var("JOB_ACTION").unwrap_or(defaults.action),
            department_id: parse_or("JOB_DEPARTMENT_ID", defaults.department_id),
            role_id: parse_or("JOB_ROLE_ID", defaults.role_id),
            location_id: parse_or("JOB_LOCATION_ID", defaults.location_id),
            assignee_employee_id: parse_or("JOB_ASSIGNEE_EMPLOYEE_ID", defaults.assignee_employee_id),
            assignee_username: env::var("JOB_ASSIGNEE_USERNAME")
                .unwrap_or(defaults.assignee_username),
            auto_assign: parse_or("JOB_AUTO_ASSIGN", defaults.auto_assign),
            due_in_hours: due_in_hours(parse_or("JOB_DUE_IN_HOURS", defaults.due_in_hours))?,
        })
    }
}

fn due_in_hours(hours: i64) -> Result<i64, String> {
    if (1..=MAX_DUE_IN_HOURS).contains(&hours) {
        Ok(hours)
    } else {
        Err(format!(
            "JOB_DUE_IN_HOURS must be between 1 and {MAX_DUE_IN_HOURS}, got {hours}"
        ))
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Required environment variables:
    /// - UPSTREAM_URL, UPSTREAM_CLIENT_ID, UPSTREAM_CLIENT_SECRET, UPSTREAM_AUTH_URL
    ///
    /// Optional environment variables:
    /// - UPSTREAM_TIMEOUT_SECS: Upstream request timeout (default: 30)
    /// - MAX_PAYLOAD_SIZE: Maximum request payload size in bytes (default: 10485760 = 10MB)
    /// - LOG_DIR: Log file directory (default: logs)
    /// - JOB_*: Job payload defaults, see [`JobDefaults`]
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        Ok(Config {
            upstream_url: required("UPSTREAM_URL")?,
            upstream_client_id: required("UPSTREAM_CLIENT_ID")?,
            upstream_client_secret: required("UPSTREAM_CLIENT_SECRET")?,
            upstream_auth_url: required("UPSTREAM_AUTH_URL")?,
            upstream_timeout: Duration::from_secs(parse_or("UPSTREAM_TIMEOUT_SECS", 30)),
            max_payload_size: parse_or("MAX_PAYLOAD_SIZE", 10 * 1024 * 1024),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            job_defaults: JobDefaults::from_env()?,
        })
    }

    pub fn upstream(&self) -> UpstreamConfig {
        UpstreamConfig {
            base_url: self.upstream_url.clone(),
            auth_url: self.upstream_auth_url.clone(),
            client_id: self.upstream_client_id.clone(),
            client_secret: self.upstream_client_secret.clone(),
            timeout: self.upstream_timeout,
        }
    }
}

fn required(name: &str) -> Result<String, String> {
    env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| format!("{name} must be set in .env file or environment"))
}

fn parse_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
