// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Classification of upstream responses and rendering of per-resource
/// results.
///
/// Fetchers never return `Err`. A raw response is classified into a closed
/// set of [`FetchOutcome`] variants according to the status policy of its
/// [`Resource`], and the orchestrator renders each outcome into a [`Slot`]
/// that is embedded in the combined document.
use http::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::request::Resource;

/// Remaining-quota value GitHub sends once the rate limit is exhausted.
const RATE_LIMIT_EXHAUSTED: &str = "0";
/// Body text GitHub returns with `409` for repositories without commits.
const EMPTY_REPOSITORY_MARKER: &str = "Git Repository is empty";
/// Body prefix length quoted when an error body is not JSON.
const BODY_EXCERPT_CHARS: usize = 100;

/// Status, rate-limit header and body of one upstream response.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct RawResponse
{
    /// Numeric HTTP status.
    pub status:               u16,
    /// Value of the `x-ratelimit-remaining` header, if any.
    pub rate_limit_remaining: Option<String,>,
    /// Body decoded as text; empty when upstream sent none.
    pub body:                 String,
}

/// Classified result of a single fetch.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub enum FetchOutcome<T,>
{
    /// Upstream answered with usable data.
    Success(T,),
    /// `404`, or `409` with an empty-repository body for commits.
    NotFound,
    /// `403` with an exhausted rate limit.
    RateLimited,
    /// `403` for any other reason, with the upstream detail.
    Forbidden(String,),
    /// Any other non-success status.
    HttpError
    {
        /// Upstream status code.
        status: u16,
        /// Upstream message, canonical reason or body excerpt.
        detail: String,
    },
    /// Connection, timeout or body decoding failure.
    Transport(String,),
    /// `202`: upstream is still computing the data.
    Pending,
    /// `204`: upstream has no content for this resource.
    Empty,
}

impl<T,> FetchOutcome<T,>
{
    /// Maps the success payload, leaving every failure untouched.
    pub fn map<U, F,>(self, f: F,) -> FetchOutcome<U,>
    where
        F: FnOnce(T,) -> U,
    {
        match self {
            Self::Success(value,) => FetchOutcome::Success(f(value,),),
            Self::NotFound => FetchOutcome::NotFound,
            Self::RateLimited => FetchOutcome::RateLimited,
            Self::Forbidden(detail,) => FetchOutcome::Forbidden(detail,),
            Self::HttpError {
                status,
                detail,
            } => FetchOutcome::HttpError {
                status,
                detail,
            },
            Self::Transport(cause,) => FetchOutcome::Transport(cause,),
            Self::Pending => FetchOutcome::Pending,
            Self::Empty => FetchOutcome::Empty,
        }
    }

    /// Short variant name for log lines.
    pub fn kind(&self,) -> &'static str
    {
        match self {
            Self::Success(_,) => "success",
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::Forbidden(_,) => "forbidden",
            Self::HttpError {
                ..
            } => "http_error",
            Self::Transport(_,) => "transport_error",
            Self::Pending => "pending",
            Self::Empty => "empty",
        }
    }

    /// Renders the outcome into the value embedded under the resource key.
    ///
    /// # Example
    ///
    /// ```
    /// use repo_insights::{FetchOutcome, Resource, Slot};
    ///
    /// let slot = FetchOutcome::<()>::NotFound.into_slot(Resource::LatestRelease);
    /// assert_eq!(slot, Slot::message("No releases found for this repository."));
    /// ```
    pub fn into_slot(self, resource: Resource,) -> Slot<T,>
    {
        match self {
            Self::Success(value,) => Slot::Data(value,),
            Self::NotFound => not_found_slot(resource,),
            Self::RateLimited => Slot::error(rate_limited_message(resource,),),
            Self::Forbidden(detail,) => Slot::error(forbidden_message(resource, &detail,),),
            Self::HttpError {
                status,
                detail,
            } => Slot::error(http_error_message(resource, status, &detail,),),
            Self::Transport(cause,) => {
                Slot::error(format!("Request error fetching {}: {cause}", resource.label()),)
            }
            Self::Pending => Slot::message(pending_message(resource,),),
            Self::Empty => Slot::message(empty_message(resource,),),
        }
    }
}

/// Value stored under one key of the combined document: the normalized data,
/// an `{"error": ...}` object or an informational `{"message": ...}` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
#[serde(untagged)]
pub enum Slot<T,>
{
    /// Normalized resource.
    Data(T,),
    /// Failure description.
    Error
    {
        /// Human readable error text.
        error: String,
    },
    /// Informational notice, not a failure.
    Message
    {
        /// Human readable notice.
        message: String,
    },
}

impl<T,> Slot<T,>
{
    /// Builds an error slot.
    pub fn error(text: impl Into<String,>,) -> Self
    {
        Self::Error {
            error: text.into(),
        }
    }

    /// Builds an informational slot.
    pub fn message(text: impl Into<String,>,) -> Self
    {
        Self::Message {
            message: text.into(),
        }
    }

    /// Whether the slot carries an error.
    pub fn is_error(&self,) -> bool
    {
        matches!(self, Self::Error { .. })
    }
}

/// Status handling rules that differ between resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
struct StatusPolicy
{
    /// `403` is split into rate-limited and forbidden.
    distinct_forbidden:        bool,
    /// `409` with the empty-repository marker counts as not found.
    empty_repository_conflict: bool,
    /// `202` means the data is still being computed.
    accepted_is_pending:       bool,
    /// `204` means there is nothing to report.
    no_content_is_empty:       bool,
}

fn policy(resource: Resource,) -> StatusPolicy
{
    StatusPolicy {
        distinct_forbidden:        matches!(
            resource,
            Resource::Metadata | Resource::Commits | Resource::Contributors
        ),
        empty_repository_conflict: resource == Resource::Commits,
        accepted_is_pending:       matches!(
            resource,
            Resource::Contributors | Resource::CommitFrequency
        ),
        no_content_is_empty:       matches!(
            resource,
            Resource::Contributors | Resource::CommitFrequency
        ),
    }
}

/// Classifies a raw response for `resource`.
///
/// Success bodies are decoded as JSON; a body that cannot be decoded is
/// reported as a transport failure.
///
/// # Example
///
/// ```
/// use repo_insights::{FetchOutcome, RawResponse, Resource, classify};
///
/// let response = RawResponse {
///     status:               403,
///     rate_limit_remaining: Some("0".to_owned()),
///     body:                 r#"{"message":"API rate limit exceeded"}"#.to_owned(),
/// };
/// assert_eq!(classify(Resource::Metadata, &response), FetchOutcome::RateLimited);
/// ```
pub fn classify(resource: Resource, response: &RawResponse,) -> FetchOutcome<Value,>
{
    let policy = policy(resource,);
    let status = response.status;

    match status {
        202 if policy.accepted_is_pending => FetchOutcome::Pending,
        204 if policy.no_content_is_empty => FetchOutcome::Empty,
        200..=299 => match serde_json::from_str::<Value,>(&response.body,) {
            Ok(value,) => FetchOutcome::Success(value,),
            Err(error,) => {
                FetchOutcome::Transport(format!("invalid JSON in response body: {error}"),)
            }
        },
        404 => FetchOutcome::NotFound,
        409 if policy.empty_repository_conflict
            && response.body.contains(EMPTY_REPOSITORY_MARKER,) =>
        {
            FetchOutcome::NotFound
        }
        403 if policy.distinct_forbidden => {
            if response.rate_limit_remaining.as_deref() == Some(RATE_LIMIT_EXHAUSTED,) {
                FetchOutcome::RateLimited
            } else {
                FetchOutcome::Forbidden(error_detail(status, &response.body,),)
            }
        }
        _ => FetchOutcome::HttpError {
            status,
            detail: error_detail(status, &response.body,),
        },
    }
}

/// Extracts the human readable part of an error body.
///
/// JSON bodies contribute their `message` field, falling back to the
/// canonical status text; other bodies contribute their first 100
/// characters.
pub fn error_detail(status: u16, body: &str,) -> String
{
    match serde_json::from_str::<Value,>(body,) {
        Ok(value,) => match value.get("message",).and_then(Value::as_str,) {
            Some(message,) => message.to_owned(),
            None => canonical_status(status,),
        },
        Err(_,) => body.chars().take(BODY_EXCERPT_CHARS,).collect(),
    }
}

fn canonical_status(status: u16,) -> String
{
    let reason = StatusCode::from_u16(status,)
        .ok()
        .and_then(|code| code.canonical_reason(),)
        .unwrap_or("Unknown Status",);
    format!("{status} {reason}")
}

fn not_found_slot<T,>(resource: Resource,) -> Slot<T,>
{
    match resource {
        Resource::Metadata => Slot::error("Repository not found.",),
        Resource::Commits => Slot::error("Commit history not found or repository is empty.",),
        Resource::Contributors => Slot::error(
            "Contributor data not found (repository might be private or have no contributors).",
        ),
        Resource::Languages => Slot::message("Language data not available.",),
        Resource::OpenIssues => {
            Slot::error("Issues not found (repository might be private or issues disabled).",)
        }
        Resource::LatestRelease => Slot::message("No releases found for this repository.",),
        Resource::CommitFrequency => Slot::error("Commit activity stats not found.",),
    }
}

fn rate_limited_message(resource: Resource,) -> String
{
    match resource {
        Resource::Metadata => "GitHub API rate limit exceeded. Please try again later or use a \
                               GitHub Personal Access Token."
            .to_owned(),
        other => format!("GitHub API rate limit exceeded for {}.", other.label()),
    }
}

fn forbidden_message(resource: Resource, detail: &str,) -> String
{
    match resource {
        Resource::Metadata => format!(
            "GitHub API access forbidden. Check token permissions or rate limits. Details: {detail}"
        ),
        other => format!("GitHub API access forbidden for {}. Details: {detail}", other.label()),
    }
}

fn http_error_message(resource: Resource, status: u16, detail: &str,) -> String
{
    match resource {
        Resource::Metadata | Resource::Commits | Resource::Contributors => {
            format!("HTTP error: {status} - {detail}")
        }
        other => format!("HTTP error fetching {}: {status} - {detail}", other.label()),
    }
}

fn pending_message(resource: Resource,) -> String
{
    match resource {
        Resource::Contributors => {
            "Contributor data is being calculated by GitHub. Please try again shortly.".to_owned()
        }
        Resource::CommitFrequency => "Commit frequency data is being calculated by GitHub. \
                                      Please try again in a moment."
            .to_owned(),
        other => format!("{} data is being calculated by GitHub.", other.label()),
    }
}

fn empty_message(resource: Resource,) -> String
{
    match resource {
        Resource::CommitFrequency => "No commit activity data available (repository might be \
                                      new or empty, or data is being computed)."
            .to_owned(),
        other => format!("No {} data available.", other.label()),
    }
}

#[cfg(test)]
mod tests
{
    use serde_json::json;

    use super::*;

    fn response(status: u16, remaining: Option<&str,>, body: &str,) -> RawResponse
    {
        RawResponse {
            status,
            rate_limit_remaining: remaining.map(str::to_owned,),
            body: body.to_owned(),
        }
    }

    #[test]
    fn success_body_is_decoded()
    {
        let outcome = classify(Resource::Metadata, &response(200, None, r#"{"name":"x"}"#,),);
        assert_eq!(outcome, FetchOutcome::Success(json!({ "name": "x" })));
    }

    #[test]
    fn undecodable_success_body_is_transport_failure()
    {
        let outcome = classify(Resource::Languages, &response(200, None, "<html>",),);
        assert!(matches!(outcome, FetchOutcome::Transport(ref cause) if cause.starts_with("invalid JSON")));
    }

    #[test]
    fn forbidden_splits_on_rate_limit_header()
    {
        let limited = classify(Resource::Commits, &response(403, Some("0",), "{}",),);
        assert_eq!(limited, FetchOutcome::RateLimited);

        let forbidden = classify(
            Resource::Commits,
            &response(403, Some("12",), r#"{"message":"Resource not accessible"}"#,),
        );
        assert_eq!(forbidden, FetchOutcome::Forbidden("Resource not accessible".to_owned()));

        let no_header = classify(Resource::Metadata, &response(403, None, "{}",),);
        assert_eq!(no_header, FetchOutcome::Forbidden("403 Forbidden".to_owned()));
    }

    #[test]
    fn forbidden_is_generic_for_secondary_resources()
    {
        let outcome = classify(Resource::Languages, &response(403, Some("0",), "{}",),);
        assert!(matches!(outcome, FetchOutcome::HttpError { status: 403, .. }));
    }

    #[test]
    fn empty_repository_conflict_only_applies_to_commits()
    {
        let body = r#"{"message":"Git Repository is empty."}"#;
        assert_eq!(classify(Resource::Commits, &response(409, None, body,),), FetchOutcome::NotFound);
        assert!(matches!(
            classify(Resource::Commits, &response(409, None, r#"{"message":"Conflict"}"#,),),
            FetchOutcome::HttpError { status: 409, .. }
        ));
        assert!(matches!(
            classify(Resource::Metadata, &response(409, None, body,),),
            FetchOutcome::HttpError { status: 409, .. }
        ));
    }

    #[test]
    fn accepted_and_no_content_follow_policy()
    {
        assert_eq!(classify(Resource::Contributors, &response(202, None, "{}",),), FetchOutcome::Pending);
        assert_eq!(classify(Resource::CommitFrequency, &response(204, None, "",),), FetchOutcome::Empty);
        assert_eq!(
            classify(Resource::Metadata, &response(202, None, "{}",),),
            FetchOutcome::Success(json!({}))
        );
    }

    #[test]
    fn detail_prefers_message_then_excerpt()
    {
        assert_eq!(error_detail(500, r#"{"message":"boom"}"#,), "boom");
        assert_eq!(error_detail(502, r#"{"errors":[]}"#,), "502 Bad Gateway");
        let long_body = "x".repeat(250,);
        assert_eq!(error_detail(500, &long_body,).len(), 100);
    }

    #[test]
    fn slots_render_catalogue_messages()
    {
        let slot = FetchOutcome::<(),>::HttpError {
            status: 500, detail: "boom".to_owned(),
        }
        .into_slot(Resource::Metadata,);
        assert_eq!(slot, Slot::error("HTTP error: 500 - boom"));

        let slot = FetchOutcome::<(),>::HttpError {
            status: 500, detail: "boom".to_owned(),
        }
        .into_slot(Resource::OpenIssues,);
        assert_eq!(slot, Slot::error("HTTP error fetching open issues: 500 - boom"));

        let slot = FetchOutcome::<(),>::Transport("timed out".to_owned(),)
            .into_slot(Resource::Metadata,);
        assert_eq!(slot, Slot::error("Request error fetching repo metadata: timed out"));

        let slot = FetchOutcome::<(),>::Forbidden("nope".to_owned(),).into_slot(Resource::Contributors,);
        assert_eq!(
            slot,
            Slot::error("GitHub API access forbidden for contributor stats. Details: nope")
        );

        assert_eq!(
            FetchOutcome::<(),>::NotFound.into_slot(Resource::Languages,),
            Slot::message("Language data not available.")
        );
    }

    #[test]
    fn slot_serializes_untagged()
    {
        let data: Slot<Vec<u8,>,> = Slot::Data(vec![1, 2],);
        assert_eq!(serde_json::to_value(&data,).expect("serialize",), json!([1, 2]));

        let error: Slot<Vec<u8,>,> = Slot::error("bad",);
        assert_eq!(serde_json::to_value(&error,).expect("serialize",), json!({ "error": "bad" }));

        let message: Slot<Vec<u8,>,> = Slot::message("wait",);
        assert_eq!(serde_json::to_value(&message,).expect("serialize",), json!({ "message": "wait" }));
    }

    #[test]
    fn map_preserves_failures()
    {
        let outcome: FetchOutcome<u32,> = FetchOutcome::Forbidden("x".to_owned(),);
        assert_eq!(outcome.map(|n| n + 1,), FetchOutcome::Forbidden("x".to_owned()));
        assert_eq!(FetchOutcome::Success(1,).map(|n| n + 1,), FetchOutcome::Success(2));
    }

    #[test]
    fn every_catalogue_row_renders_exact_text()
    {
        use Resource::{
            Commits, CommitFrequency, Contributors, Languages, LatestRelease, Metadata, OpenIssues,
        };

        let forbidden = || FetchOutcome::<(),>::Forbidden("Resource not accessible".to_owned(),);
        let http = |status| FetchOutcome::<(),>::HttpError {
            status,
            detail: "Server Error".to_owned(),
        };
        let transport = || FetchOutcome::<(),>::Transport("connection refused".to_owned(),);

        let rows: Vec<(Resource, FetchOutcome<(),>, Slot<(),>,),> = vec![
            (Metadata, FetchOutcome::NotFound, Slot::error("Repository not found.",),),
            (
                Metadata,
                FetchOutcome::RateLimited,
                Slot::error(
                    "GitHub API rate limit exceeded. Please try again later or use a GitHub \
                     Personal Access Token.",
                ),
            ),
            (
                Metadata,
                forbidden(),
                Slot::error(
                    "GitHub API access forbidden. Check token permissions or rate limits. \
                     Details: Resource not accessible",
                ),
            ),
            (Metadata, http(500,), Slot::error("HTTP error: 500 - Server Error",),),
            (
                Metadata,
                transport(),
                Slot::error("Request error fetching repo metadata: connection refused",),
            ),
            (
                Commits,
                FetchOutcome::NotFound,
                Slot::error("Commit history not found or repository is empty.",),
            ),
            (
                Commits,
                FetchOutcome::RateLimited,
                Slot::error("GitHub API rate limit exceeded for commit activity.",),
            ),
            (
                Commits,
                forbidden(),
                Slot::error(
                    "GitHub API access forbidden for commit activity. Details: Resource not \
                     accessible",
                ),
            ),
            (Commits, http(502,), Slot::error("HTTP error: 502 - Server Error",),),
            (
                Commits,
                transport(),
                Slot::error("Request error fetching commit activity: connection refused",),
            ),
            (
                Contributors,
                FetchOutcome::Pending,
                Slot::message(
                    "Contributor data is being calculated by GitHub. Please try again shortly.",
                ),
            ),
            (
                Contributors,
                FetchOutcome::NotFound,
                Slot::error(
                    "Contributor data not found (repository might be private or have no \
                     contributors).",
                ),
            ),
            (
                Contributors,
                FetchOutcome::RateLimited,
                Slot::error("GitHub API rate limit exceeded for contributor stats.",),
            ),
            (
                Contributors,
                forbidden(),
                Slot::error(
                    "GitHub API access forbidden for contributor stats. Details: Resource not \
                     accessible",
                ),
            ),
            (Contributors, http(500,), Slot::error("HTTP error: 500 - Server Error",),),
            (
                Contributors,
                transport(),
                Slot::error("Request error fetching contributor stats: connection refused",),
            ),
            (Languages, FetchOutcome::NotFound, Slot::message("Language data not available.",),),
            (
                Languages,
                http(500,),
                Slot::error("HTTP error fetching languages: 500 - Server Error",),
            ),
            (
                Languages,
                transport(),
                Slot::error("Request error fetching languages: connection refused",),
            ),
            (
                OpenIssues,
                FetchOutcome::NotFound,
                Slot::error("Issues not found (repository might be private or issues disabled).",),
            ),
            (
                OpenIssues,
                http(500,),
                Slot::error("HTTP error fetching open issues: 500 - Server Error",),
            ),
            (
                OpenIssues,
                transport(),
                Slot::error("Request error fetching open issues: connection refused",),
            ),
            (
                LatestRelease,
                FetchOutcome::NotFound,
                Slot::message("No releases found for this repository.",),
            ),
            (
                LatestRelease,
                http(500,),
                Slot::error("HTTP error fetching latest release: 500 - Server Error",),
            ),
            (
                LatestRelease,
                transport(),
                Slot::error("Request error fetching latest release: connection refused",),
            ),
            (
                CommitFrequency,
                FetchOutcome::Pending,
                Slot::message(
                    "Commit frequency data is being calculated by GitHub. Please try again in a \
                     moment.",
                ),
            ),
            (
                CommitFrequency,
                FetchOutcome::Empty,
                Slot::message(
                    "No commit activity data available (repository might be new or empty, or \
                     data is being computed).",
                ),
            ),
            (
                CommitFrequency,
                FetchOutcome::NotFound,
                Slot::error("Commit activity stats not found.",),
            ),
            (
                CommitFrequency,
                http(500,),
                Slot::error("HTTP error fetching commit frequency: 500 - Server Error",),
            ),
            (
                CommitFrequency,
                transport(),
                Slot::error("Request error fetching commit frequency: connection refused",),
            ),
        ];

        for resource in Resource::ALL {
            assert!(
                rows.iter().any(|(row, _, _,)| *row == resource),
                "{resource:?} has no catalogue rows"
            );
        }

        for (resource, outcome, expected,) in rows {
            let description = format!("{resource:?} {}", outcome.kind());
            assert_eq!(outcome.into_slot(resource,), expected, "{description}");
        }
    }
}
