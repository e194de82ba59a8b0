// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Construction of outbound GitHub REST requests.
///
/// Everything here is plain data: resource paths, query parameters and the
/// header set shared by every call. No I/O happens in this module.
use http::header::{ACCEPT, AUTHORIZATION, HeaderName};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::config::Settings;

/// Media type requested from the REST API.
pub const ACCEPT_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

/// Bytes escaped inside a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ',)
    .add(b'"',)
    .add(b'#',)
    .add(b'%',)
    .add(b'&',)
    .add(b'/',)
    .add(b'<',)
    .add(b'>',)
    .add(b'?',)
    .add(b'\\',)
    .add(b'^',)
    .add(b'`',)
    .add(b'{',)
    .add(b'|',)
    .add(b'}',);

/// Upstream resources consumed by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub enum Resource
{
    /// `GET /repos/{owner}/{repo}`
    Metadata,
    /// `GET /repos/{owner}/{repo}/commits`
    Commits,
    /// `GET /repos/{owner}/{repo}/contributors`
    Contributors,
    /// `GET /repos/{owner}/{repo}/languages`
    Languages,
    /// `GET /repos/{owner}/{repo}/issues`
    OpenIssues,
    /// `GET /repos/{owner}/{repo}/releases/latest`
    LatestRelease,
    /// `GET /repos/{owner}/{repo}/stats/commit_activity`
    CommitFrequency,
}

impl Resource
{
    /// Every resource, in the order the orchestrator fetches them.
    #[cfg(test)]
    pub(crate) const ALL: [Resource; 7] = [
        Resource::Metadata,
        Resource::Commits,
        Resource::Contributors,
        Resource::Languages,
        Resource::OpenIssues,
        Resource::LatestRelease,
        Resource::CommitFrequency,
    ];

    /// Path suffix below `/repos/{owner}/{repo}`.
    fn suffix(self,) -> &'static str
    {
        match self {
            Self::Metadata => "",
            Self::Commits => "/commits",
            Self::Contributors => "/contributors",
            Self::Languages => "/languages",
            Self::OpenIssues => "/issues",
            Self::LatestRelease => "/releases/latest",
            Self::CommitFrequency => "/stats/commit_activity",
        }
    }

    /// Human readable label used in log lines and error messages.
    pub fn label(self,) -> &'static str
    {
        match self {
            Self::Metadata => "repo metadata",
            Self::Commits => "commit activity",
            Self::Contributors => "contributor stats",
            Self::Languages => "languages",
            Self::OpenIssues => "open issues",
            Self::LatestRelease => "latest release",
            Self::CommitFrequency => "commit frequency",
        }
    }
}

/// A fully described outbound request, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct UpstreamRequest
{
    /// Resource this request targets.
    pub resource: Resource,
    /// Absolute path beginning with `/repos/`.
    pub path:     String,
    /// Query parameters in emission order.
    pub query:    Vec<(&'static str, String,),>,
}

impl UpstreamRequest
{
    /// Builds the request for `resource` of `owner/repo`.
    ///
    /// Page sizes and the open issue count come from `settings`.
    ///
    /// # Example
    ///
    /// ```
    /// use repo_insights::{Resource, Settings, UpstreamRequest};
    ///
    /// let request = UpstreamRequest::new(
    ///     Resource::Commits,
    ///     "octocat",
    ///     "Hello-World",
    ///     &Settings::default(),
    /// );
    /// assert_eq!(request.path_and_query(), "/repos/octocat/Hello-World/commits?per_page=5");
    /// ```
    pub fn new(resource: Resource, owner: &str, repo: &str, settings: &Settings,) -> Self
    {
        let query = match resource {
            Resource::Commits => vec![("per_page", settings.commits_per_page.to_string(),)],
            Resource::Contributors => vec![
                ("per_page", settings.contributors_per_page.to_string(),),
                ("anon", "0".to_owned(),),
            ],
            Resource::OpenIssues => open_issue_query(settings.open_issues_count,),
            Resource::Metadata
            | Resource::Languages
            | Resource::LatestRelease
            | Resource::CommitFrequency => Vec::new(),
        };

        Self {
            resource,
            path: repository_path(owner, repo, resource,),
            query,
        }
    }

    /// Builds the open issues request with an explicit result count.
    pub fn open_issues(owner: &str, repo: &str, count: u32,) -> Self
    {
        Self {
            resource: Resource::OpenIssues,
            path:     repository_path(owner, repo, Resource::OpenIssues,),
            query:    open_issue_query(count,),
        }
    }

    /// Renders the path with its query string, ready to be resolved against
    /// the base URL.
    pub fn path_and_query(&self,) -> String
    {
        if self.query.is_empty() {
            return self.path.clone();
        }

        let query: Vec<String,> =
            self.query.iter().map(|(key, value,)| format!("{key}={value}"),).collect();
        format!("{}?{}", self.path, query.join("&"))
    }
}

/// `/repos/{owner}/{repo}{suffix}` with both names escaped as path segments,
/// so user input can neither add segments nor start a query string.
fn repository_path(owner: &str, repo: &str, resource: Resource,) -> String
{
    format!(
        "/repos/{}/{}{}",
        utf8_percent_encode(owner, PATH_SEGMENT,),
        utf8_percent_encode(repo, PATH_SEGMENT,),
        resource.suffix()
    )
}

fn open_issue_query(count: u32,) -> Vec<(&'static str, String,),>
{
    vec![
        ("state", "open".to_owned(),),
        ("sort", "created".to_owned(),),
        ("direction", "desc".to_owned(),),
        ("per_page", count.to_string(),),
    ]
}

/// Headers attached to every outbound request.
///
/// The accept header is always present; the authorization header only when a
/// token is configured.
pub fn default_headers(token: Option<&str,>,) -> Vec<(HeaderName, String,),>
{
    let mut headers = vec![(ACCEPT, ACCEPT_MEDIA_TYPE.to_owned(),)];
    if let Some(token,) = token {
        headers.push((AUTHORIZATION, format!("Bearer {token}"),),);
    }
    headers
}
