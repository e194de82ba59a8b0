//! Request orchestration for repository analysis.
//!
//! [`Insights::analyze`] validates the `(owner, repo)` pair, fetches the
//! repository metadata first and stops early only when that metadata is
//! missing or rate limited. Every other resource is fetched in sequence and
//! embedded in the combined [`AnalysisReport`], whatever its outcome.

#![allow(non_shorthand_field_patterns)]

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    config::Settings,
    error::Error,
    fetchers::ResourceFetcher,
    models::{
        CommitSummary, ContributorSummary, IssueSummary, LanguageBreakdown, ReleaseInfo,
        RepoMetadata, WeeklyCommitPoint,
    },
    outcome::{FetchOutcome, Slot},
    request::Resource,
    upstream::GithubClient,
};

/// Error text returned when the owner or repository is missing.
pub const MISSING_INPUT_MESSAGE: &str = "Owner and repository name are required.";

static REPOSITORY_REFERENCE: LazyLock<Option<Regex,>,> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://(?:www\.)?github\.com/)?([^/\s]+)/([^/\s]+?)(?:\.git)?/?$",).ok()
},);

/// Validated `(owner, repo)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct AnalysisRequest
{
    /// Account that owns the repository.
    pub owner: String,
    /// Repository name.
    pub repo:  String,
}

impl AnalysisRequest
{
    /// Validates an owner and repository name.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisFailure::MissingInput`] when either value is empty.
    pub fn new(owner: &str, repo: &str,) -> Result<Self, AnalysisFailure,>
    {
        let owner = owner.trim();
        let repo = repo.trim();
        if owner.is_empty() || repo.is_empty() {
            return Err(AnalysisFailure::MissingInput,);
        }

        Ok(Self {
            owner: owner.to_owned(), repo: repo.to_owned(),
        },)
    }

    /// Extracts the pair from a `/analyze` request body.
    ///
    /// Bodies that are not JSON objects, or whose `owner`/`repo` members are
    /// not strings, count as missing input.
    ///
    /// # Example
    ///
    /// ```
    /// use repo_insights::{AnalysisFailure, AnalysisRequest};
    ///
    /// let request = AnalysisRequest::from_json(br#"{"owner":"octocat","repo":"Hello-World"}"#)?;
    /// assert_eq!(request.repo, "Hello-World");
    ///
    /// let missing = AnalysisRequest::from_json(br#"{"owner":"octocat"}"#);
    /// assert_eq!(missing, Err(AnalysisFailure::MissingInput));
    /// # Ok::<(), AnalysisFailure>(())
    /// ```
    pub fn from_json(body: &[u8],) -> Result<Self, AnalysisFailure,>
    {
        let value: Value =
            serde_json::from_slice(body,).map_err(|_| AnalysisFailure::MissingInput,)?;
        let field = |name: &str| value.get(name,).and_then(Value::as_str,).unwrap_or_default();
        Self::new(field("owner",), field("repo",),)
    }

    /// Parses `owner/repo` or a `https://github.com/owner/repo` URL.
    ///
    /// A trailing `.git` or `/` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the reference has another shape.
    pub fn from_reference(reference: &str,) -> Result<Self, Error,>
    {
        let trimmed = reference.trim();
        let captures = REPOSITORY_REFERENCE
            .as_ref()
            .and_then(|pattern| pattern.captures(trimmed,),)
            .ok_or_else(|| {
                Error::validation(format!(
                    "'{trimmed}' is not an owner/repo pair or GitHub repository URL"
                ),)
            },)?;

        let owner = captures.get(1,).map_or("", |m| m.as_str(),);
        let repo = captures.get(2,).map_or("", |m| m.as_str(),);
        Self::new(owner, repo,).map_err(|failure| Error::validation(failure.to_string(),),)
    }
}

/// Request-level failures that replace the combined document.
#[derive(Debug, Clone, PartialEq, Eq, masterror::Error,)]
pub enum AnalysisFailure
{
    /// Owner or repository missing from the request.
    #[error("Owner and repository name are required.")]
    MissingInput,
    /// The repository metadata lookup returned not found.
    #[error("{message}")]
    NotFound
    {
        /// Error text forwarded to the client.
        message: String,
    },
    /// The repository metadata lookup hit the upstream rate limit.
    #[error("{message}")]
    RateLimited
    {
        /// Error text forwarded to the client.
        message: String,
    },
}

impl AnalysisFailure
{
    /// HTTP status associated with the failure.
    pub fn status_code(&self,) -> u16
    {
        match self {
            Self::MissingInput => 400,
            Self::NotFound {
                ..
            } => 404,
            Self::RateLimited {
                ..
            } => 429,
        }
    }
}

/// Combined analysis document returned by `/analyze`.
///
/// Every key is always present and holds either normalized data or an
/// error/message object.
#[derive(Debug, Clone, PartialEq, Serialize,)]
pub struct AnalysisReport
{
    /// Repository metadata.
    pub repo_details:      Slot<RepoMetadata,>,
    /// Most recent commits, newest first.
    pub commit_activity:   Slot<Vec<CommitSummary,>,>,
    /// Top contributors by commit count.
    pub contributor_stats: Slot<Vec<ContributorSummary,>,>,
    /// Language name to byte count.
    pub languages:         Slot<LanguageBreakdown,>,
    /// Recently opened issues, pull requests excluded.
    pub open_issues_list:  Slot<Vec<IssueSummary,>,>,
    /// Latest published release.
    pub latest_release:    Slot<ReleaseInfo,>,
    /// Weekly commit totals for the last twelve weeks, oldest first.
    pub commit_frequency:  Slot<Vec<WeeklyCommitPoint,>,>,
}

impl AnalysisReport
{
    /// Number of resources that ended up as error slots.
    pub fn error_count(&self,) -> usize
    {
        [
            self.repo_details.is_error(),
            self.commit_activity.is_error(),
            self.contributor_stats.is_error(),
            self.languages.is_error(),
            self.open_issues_list.is_error(),
            self.latest_release.is_error(),
            self.commit_frequency.is_error(),
        ]
        .into_iter()
        .filter(|failed| *failed,)
        .count()
    }
}

/// Repository insights aggregator.
#[derive(Debug, Clone,)]
pub struct Insights
{
    fetcher: ResourceFetcher,
}

impl Insights
{
    /// Wraps an existing fetcher.
    pub fn new(fetcher: ResourceFetcher,) -> Self
    {
        Self {
            fetcher,
        }
    }

    /// Validates `settings` and builds the GitHub client behind the
    /// aggregator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid settings and [`Error::Service`]
    /// when the HTTP client cannot be constructed.
    pub fn from_settings(settings: Settings,) -> Result<Self, Error,>
    {
        settings.validate()?;
        let client = GithubClient::new(&settings,)?;
        Ok(Self::new(ResourceFetcher::new(client, Arc::new(settings,),),),)
    }

    /// Runs the full analysis for `request`.
    ///
    /// Upstream calls run one after another. Only a missing or rate limited
    /// repository aborts the analysis; every other failure is embedded in its
    /// own slot.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisFailure::NotFound`] or
    /// [`AnalysisFailure::RateLimited`] from the metadata lookup.
    pub async fn analyze(&self, request: &AnalysisRequest,)
    -> Result<AnalysisReport, AnalysisFailure,>
    {
        let AnalysisRequest {
            owner,
            repo,
        } = request;
        info!("Analyzing {}/{}", owner, repo);

        let repo_details = match self.fetcher.repo_metadata(owner, repo,).await {
            outcome @ FetchOutcome::NotFound => {
                warn!("Repository {}/{} not found; skipping remaining resources", owner, repo);
                return Err(AnalysisFailure::NotFound {
                    message: slot_text(outcome.into_slot(Resource::Metadata,),),
                },);
            }
            outcome @ FetchOutcome::RateLimited => {
                warn!("Rate limited while fetching {}/{}; skipping remaining resources", owner, repo);
                return Err(AnalysisFailure::RateLimited {
                    message: slot_text(outcome.into_slot(Resource::Metadata,),),
                },);
            }
            outcome => outcome.into_slot(Resource::Metadata,),
        };

        let fetcher = &self.fetcher;
        let issue_count = fetcher.settings().open_issues_count;

        let report = AnalysisReport {
            repo_details,
            commit_activity: fetcher
                .commit_activity(owner, repo,)
                .await
                .into_slot(Resource::Commits,),
            contributor_stats: fetcher
                .contributors(owner, repo,)
                .await
                .into_slot(Resource::Contributors,),
            languages: fetcher.languages(owner, repo,).await.into_slot(Resource::Languages,),
            open_issues_list: fetcher
                .open_issues(owner, repo, issue_count,)
                .await
                .into_slot(Resource::OpenIssues,),
            latest_release: fetcher
                .latest_release(owner, repo,)
                .await
                .into_slot(Resource::LatestRelease,),
            commit_frequency: fetcher
                .commit_frequency(owner, repo,)
                .await
                .into_slot(Resource::CommitFrequency,),
        };

        info!(
            "Analysis of {}/{} finished with {} failed resources",
            owner,
            repo,
            report.error_count()
        );

        Ok(report,)
    }
}

fn slot_text<T,>(slot: Slot<T,>,) -> String
{
    match slot {
        Slot::Error {
            error,
        } => error,
        Slot::Message {
            message,
        } => message,
        Slot::Data(_,) => String::new(),
    }
}
