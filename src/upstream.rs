// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Outbound transport to the GitHub REST API.
///
/// Wraps an [`Octocrab`] client configured once at start-up. Responses are
/// returned raw (status, rate-limit header, body text) so classification can
/// see statuses that octocrab's typed helpers would turn into errors.
use masterror::AppError;
use octocrab::{Octocrab, service::middleware::retry::RetryConfig as TransportRetry};
use tracing::debug;

use crate::{config::Settings, outcome::RawResponse, request};

/// Header carrying the remaining request quota.
pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";
const BACKTRACE_MARKER: &str = "Found at";

/// Shared GitHub client; cheap to clone.
#[derive(Debug, Clone,)]
pub struct GithubClient
{
    octocrab: Octocrab,
}

impl GithubClient
{
    /// Builds a client from validated settings.
    ///
    /// Octocrab's own retry layer is disabled: the only retry performed is the
    /// commit-frequency re-poll.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when the base URL is rejected or the HTTP client
    /// cannot be constructed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use repo_insights::{GithubClient, Settings};
    ///
    /// # fn example() -> Result<(), masterror::AppError> {
    /// let client = GithubClient::new(&Settings::default(),)?;
    /// # let _ = client;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(settings: &Settings,) -> Result<Self, AppError,>
    {
        let mut builder = Octocrab::builder()
            .base_uri(settings.api_base_url.as_str(),)
            .map_err(|e| AppError::service(format!("invalid GitHub API base url: {e}"),),)?
            .add_retry_config(TransportRetry::None,)
            .set_connect_timeout(Some(settings.connect_timeout(),),)
            .set_read_timeout(Some(settings.request_timeout(),),);

        for (name, value,) in request::default_headers(settings.github_token(),) {
            builder = builder.add_header(name, value,);
        }

        let octocrab = builder
            .build()
            .map_err(|e| AppError::service(format!("failed to build GitHub client: {e}"),),)?;

        debug!(
            "GitHub client ready for {} ({})",
            settings.api_base_url,
            if settings.github_token().is_some() { "authenticated" } else { "unauthenticated" }
        );

        Ok(Self {
            octocrab,
        },)
    }

    /// Performs one `GET` and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns the transport failure description when no response was
    /// received or its body could not be read.
    pub async fn get(&self, path_and_query: &str,) -> Result<RawResponse, String,>
    {
        let response = self
            .octocrab
            ._get(path_and_query,)
            .await
            .map_err(|error| describe_error(&error,),)?;

        let status = response.status().as_u16();
        let rate_limit_remaining = response
            .headers()
            .get(RATE_LIMIT_REMAINING_HEADER,)
            .and_then(|value| value.to_str().ok(),)
            .map(str::to_owned,);

        let body = self
            .octocrab
            .body_to_string(response,)
            .await
            .map_err(|error| {
                format!("failed to read response body: {}", describe_error(&error,))
            },)?;

        Ok(RawResponse {
            status,
            rate_limit_remaining,
            body,
        },)
    }
}

/// Renders an error and its sources as a single line.
///
/// Only the leading line of each message is kept; octocrab appends a captured
/// backtrace to its own messages. Sources already contained in the text are
/// skipped.
fn describe_error(error: &(dyn std::error::Error + 'static),) -> String
{
    let mut parts: Vec<String,> = Vec::new();
    let mut current = Some(error,);

    while let Some(layer,) = current {
        let text = layer.to_string();
        let line = text
            .split(BACKTRACE_MARKER,)
            .next()
            .and_then(|head| head.lines().next(),)
            .unwrap_or_default()
            .trim();
        if !line.is_empty() && !parts.iter().any(|part| part.contains(line,),) {
            parts.push(line.to_owned(),);
        }
        current = layer.source();
    }

    if parts.is_empty() { "unknown transport error".to_owned() } else { parts.join(": ",) }
}
