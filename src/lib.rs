//! Repository insights aggregator for the GitHub REST API.
//!
//! A single analysis fetches seven facets of a repository (metadata, recent
//! commits, top contributors, languages, open issues, the latest release and
//! weekly commit totals) and combines them into one JSON document. Failures of
//! individual facets are embedded in the document; only a missing or rate
//! limited repository aborts the analysis.
//!
//! The library is used by the `repo-insights` binary, which serves the
//! `POST /analyze` endpoint and offers a one-shot `analyze` command.

mod analyze;
mod config;
mod error;
mod fetchers;
mod json;
mod models;
mod outcome;
mod request;
pub mod retry;
mod server;
mod telemetry;
mod upstream;

pub use analyze::{
    AnalysisFailure, AnalysisReport, AnalysisRequest, Insights, MISSING_INPUT_MESSAGE,
};
pub use config::{DEFAULT_API_BASE_URL, Settings};
pub use error::{Error, io_error};
pub use fetchers::ResourceFetcher;
pub use json::JsonPath;
pub use models::{
    COMMIT_FREQUENCY_WEEKS, CommitSummary, ContributorSummary, IssueSummary, LanguageBreakdown,
    ReleaseInfo, RepoMetadata, WeeklyCommitPoint, normalize_commit_frequency, normalize_commits,
    normalize_contributors, normalize_issues, normalize_languages,
};
pub use outcome::{FetchOutcome, RawResponse, Slot, classify, error_detail};
pub use request::{ACCEPT_MEDIA_TYPE, Resource, UpstreamRequest, default_headers};
pub use server::{router, serve};
pub use telemetry::init_tracing;
pub use upstream::{GithubClient, RATE_LIMIT_REMAINING_HEADER};
