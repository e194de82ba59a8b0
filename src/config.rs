//! Start-up configuration for the insights aggregator.
//!
//! Every value is read once when the process starts (flags, environment and an
//! optional `.env` file) and then shared read-only with every fetcher. Nothing
//! in this module is mutated after [`Settings::validate`] succeeds.

use std::{fmt, time::Duration};

use clap::Args;
use http::Uri;

use crate::error::Error;

/// Base URL of the public GitHub REST API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
/// Delay before the single commit-frequency retry.
const DEFAULT_STATS_RETRY_DELAY_MS: u64 = 2000;
const DEFAULT_COMMITS_PER_PAGE: u32 = 5;
const DEFAULT_CONTRIBUTORS_PER_PAGE: u32 = 10;
const DEFAULT_OPEN_ISSUES_COUNT: u32 = 5;
const DEFAULT_LOG_FILTER: &str = "info";

/// Immutable settings consumed by the upstream client and fetchers.
///
/// # Examples
///
/// ```
/// use repo_insights::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.github_token().is_none());
/// assert_eq!(settings.api_base_url, "https://api.github.com");
/// settings.validate().expect("defaults are valid");
/// ```
#[derive(Clone, Args,)]
pub struct Settings
{
    /// Personal access token used as a bearer credential. Optional; without
    /// it requests are unauthenticated and subject to lower rate limits.
    #[arg(long = "github-token", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String,>,

    /// Base URL of the GitHub REST API.
    #[arg(long = "api-base-url", env = "GITHUB_API_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Read timeout applied to every outbound request, in seconds.
    #[arg(long = "request-timeout-secs", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Connect timeout applied to every outbound request, in seconds.
    #[arg(long = "connect-timeout-secs", default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS)]
    pub connect_timeout_secs: u64,

    /// Delay before re-polling commit statistics that are still being
    /// computed, in milliseconds.
    #[arg(long = "stats-retry-delay-ms", default_value_t = DEFAULT_STATS_RETRY_DELAY_MS)]
    pub stats_retry_delay_ms: u64,

    /// Number of recent commits to report.
    #[arg(long = "commits-per-page", default_value_t = DEFAULT_COMMITS_PER_PAGE)]
    pub commits_per_page: u32,

    /// Number of top contributors to report.
    #[arg(long = "contributors-per-page", default_value_t = DEFAULT_CONTRIBUTORS_PER_PAGE)]
    pub contributors_per_page: u32,

    /// Number of recent open issues to report.
    #[arg(long = "open-issues-count", default_value_t = DEFAULT_OPEN_ISSUES_COUNT)]
    pub open_issues_count: u32,

    /// Fallback tracing filter used when `RUST_LOG` is not set.
    #[arg(long = "log-filter", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
}

impl Default for Settings
{
    fn default() -> Self
    {
        Self {
            github_token:          None,
            api_base_url:          DEFAULT_API_BASE_URL.to_owned(),
            request_timeout_secs:  DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout_secs:  DEFAULT_CONNECT_TIMEOUT_SECS,
            stats_retry_delay_ms:  DEFAULT_STATS_RETRY_DELAY_MS,
            commits_per_page:      DEFAULT_COMMITS_PER_PAGE,
            contributors_per_page: DEFAULT_CONTRIBUTORS_PER_PAGE,
            open_issues_count:     DEFAULT_OPEN_ISSUES_COUNT,
            log_filter:            DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl fmt::Debug for Settings
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        f.debug_struct("Settings",)
            .field("github_token", &self.github_token().map(|_| "<redacted>",),)
            .field("api_base_url", &self.api_base_url,)
            .field("request_timeout_secs", &self.request_timeout_secs,)
            .field("connect_timeout_secs", &self.connect_timeout_secs,)
            .field("stats_retry_delay_ms", &self.stats_retry_delay_ms,)
            .field("commits_per_page", &self.commits_per_page,)
            .field("contributors_per_page", &self.contributors_per_page,)
            .field("open_issues_count", &self.open_issues_count,)
            .field("log_filter", &self.log_filter,)
            .finish()
    }
}

impl Settings
{
    /// Returns the configured token, treating blank values as absent.
    pub fn github_token(&self,) -> Option<&str,>
    {
        self.github_token.as_deref().map(str::trim,).filter(|token| !token.is_empty(),)
    }

    /// Read timeout for outbound requests.
    pub fn request_timeout(&self,) -> Duration
    {
        Duration::from_secs(self.request_timeout_secs,)
    }

    /// Connect timeout for outbound requests.
    pub fn connect_timeout(&self,) -> Duration
    {
        Duration::from_secs(self.connect_timeout_secs,)
    }

    /// Delay before the single commit-frequency retry.
    pub fn stats_retry_delay(&self,) -> Duration
    {
        Duration::from_millis(self.stats_retry_delay_ms,)
    }

    /// Checks invariants that the upstream client relies upon.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the base URL is not an absolute
    /// `http`/`https` URL, a timeout is zero, or a page size is zero.
    pub fn validate(&self,) -> Result<(), Error,>
    {
        let uri: Uri = self.api_base_url.parse().map_err(|error| {
            Error::config(format!("api base url '{}' is invalid: {error}", self.api_base_url),)
        },)?;

        match uri.scheme_str() {
            Some("http" | "https",) if uri.authority().is_some() => {}
            _ => {
                return Err(Error::config(format!(
                    "api base url '{}' must be an absolute http(s) URL",
                    self.api_base_url
                ),),);
            }
        }

        if self.request_timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(Error::config("outbound timeouts must be greater than zero",),);
        }

        if self.commits_per_page == 0
            || self.contributors_per_page == 0
            || self.open_issues_count == 0
        {
            return Err(Error::config("page sizes must be greater than zero",),);
        }

        Ok((),)
    }
}
