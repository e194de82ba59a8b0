// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Per-resource fetch-and-normalize routines.
///
/// Each routine performs exactly one outbound `GET` (commit frequency may
/// perform one more while the statistics are still being computed),
/// classifies the response and projects successful payloads into the
/// normalized shapes from [`crate::models`]. Nothing here returns `Err`.
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    config::Settings,
    models::{
        CommitSummary, ContributorSummary, IssueSummary, LanguageBreakdown, ReleaseInfo,
        RepoMetadata, WeeklyCommitPoint, normalize_commit_frequency, normalize_commits,
        normalize_contributors, normalize_issues, normalize_languages,
    },
    outcome::{FetchOutcome, classify},
    request::{Resource, UpstreamRequest},
    retry::{RetryConfig, repoll_while_pending},
    upstream::GithubClient,
};

/// Fetches repository facets through a shared [`GithubClient`].
#[derive(Debug, Clone,)]
pub struct ResourceFetcher
{
    client:   GithubClient,
    settings: Arc<Settings,>,
}

impl ResourceFetcher
{
    /// Creates a fetcher bound to `client` and read-only `settings`.
    pub fn new(client: GithubClient, settings: Arc<Settings,>,) -> Self
    {
        Self {
            client,
            settings,
        }
    }

    /// Settings this fetcher was built with.
    pub fn settings(&self,) -> &Settings
    {
        &self.settings
    }

    async fn fetch(&self, request: &UpstreamRequest,) -> FetchOutcome<Value,>
    {
        let target = request.path_and_query();
        debug!("Fetching {} from {}", request.resource.label(), target);

        let outcome = match self.client.get(&target,).await {
            Ok(response,) => classify(request.resource, &response,),
            Err(cause,) => FetchOutcome::Transport(cause,),
        };

        match &outcome {
            FetchOutcome::Success(_,) | FetchOutcome::Pending | FetchOutcome::Empty => {
                debug!("{} for {}: {}", request.resource.label(), target, outcome.kind());
            }
            _ => warn!("{} for {}: {}", request.resource.label(), target, outcome.kind()),
        }

        outcome
    }

    async fn fetch_resource(&self, resource: Resource, owner: &str, repo: &str,)
    -> FetchOutcome<Value,>
    {
        let request = UpstreamRequest::new(resource, owner, repo, &self.settings,);
        self.fetch(&request,).await
    }

    /// Fetches repository metadata.
    pub async fn repo_metadata(&self, owner: &str, repo: &str,) -> FetchOutcome<RepoMetadata,>
    {
        self.fetch_resource(Resource::Metadata, owner, repo,)
            .await
            .map(|value| RepoMetadata::from_value(&value,),)
    }

    /// Fetches the most recent commits.
    ///
    /// A `409` for an empty repository is reported like a `404`.
    pub async fn commit_activity(&self, owner: &str, repo: &str,)
    -> FetchOutcome<Vec<CommitSummary,>,>
    {
        self.fetch_resource(Resource::Commits, owner, repo,)
            .await
            .map(|value| normalize_commits(&value,),)
    }

    /// Fetches the top contributors.
    ///
    /// `204 No Content` means the repository has no contributors and yields an
    /// empty list. `202 Accepted` is reported as pending without re-polling.
    pub async fn contributors(&self, owner: &str, repo: &str,)
    -> FetchOutcome<Vec<ContributorSummary,>,>
    {
        match self.fetch_resource(Resource::Contributors, owner, repo,).await {
            FetchOutcome::Empty => FetchOutcome::Success(Vec::new(),),
            outcome => outcome.map(|value| normalize_contributors(&value,),),
        }
    }

    /// Fetches the language breakdown unchanged.
    pub async fn languages(&self, owner: &str, repo: &str,) -> FetchOutcome<LanguageBreakdown,>
    {
        self.fetch_resource(Resource::Languages, owner, repo,).await.map(normalize_languages,)
    }

    /// Fetches up to `count` recently opened issues, excluding pull requests.
    pub async fn open_issues(&self, owner: &str, repo: &str, count: u32,)
    -> FetchOutcome<Vec<IssueSummary,>,>
    {
        let request = UpstreamRequest::open_issues(owner, repo, count,);
        let limit = usize::try_from(count,).unwrap_or(usize::MAX,);
        self.fetch(&request,).await.map(|value| normalize_issues(&value, limit,),)
    }

    /// Fetches the latest published release.
    pub async fn latest_release(&self, owner: &str, repo: &str,) -> FetchOutcome<ReleaseInfo,>
    {
        self.fetch_resource(Resource::LatestRelease, owner, repo,)
            .await
            .map(|value| ReleaseInfo::from_value(&value,),)
    }

    /// Fetches weekly commit totals for the last twelve weeks.
    ///
    /// While GitHub is still computing the statistics (`202`), the request is
    /// repeated once after the configured delay.
    pub async fn commit_frequency(&self, owner: &str, repo: &str,)
    -> FetchOutcome<Vec<WeeklyCommitPoint,>,>
    {
        let request = UpstreamRequest::new(Resource::CommitFrequency, owner, repo, &self.settings,);
        let config = RetryConfig::once_after(self.settings.stats_retry_delay(),);
        let operation = format!("commit frequency for {owner}/{repo}");
        let request = &request;

        repoll_while_pending(
            &config,
            &operation,
            |outcome: &FetchOutcome<Value,>| matches!(outcome, FetchOutcome::Pending),
            move || self.fetch(request,),
        )
        .await
        .map(|value| normalize_commit_frequency(&value,),)
    }
}
