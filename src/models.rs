//! Normalized resource shapes returned to the client UI.
//!
//! Every projection is tolerant: fields that are absent upstream, or that
//! carry an unexpected type, become `null` in the output instead of failing
//! the whole resource. Structures are request scoped and never cached.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::json::JsonPath;

/// Number of most recent weeks kept from the yearly commit series.
pub const COMMIT_FREQUENCY_WEEKS: usize = 12;
/// Fallback commit message when upstream omits one.
pub const DEFAULT_COMMIT_MESSAGE: &str = "No commit message";
/// Fallback author name when upstream omits one.
pub const DEFAULT_COMMIT_AUTHOR: &str = "Unknown author";

/// Repository metadata exposed under `repo_details`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize,)]
pub struct RepoMetadata
{
    /// Repository name.
    pub name:        Option<String,>,
    /// Free-form description.
    pub description: Option<String,>,
    /// Stargazer count.
    pub stars:       Option<u64,>,
    /// Fork count.
    pub forks:       Option<u64,>,
    /// Open issue count (includes pull requests upstream).
    pub open_issues: Option<u64,>,
    /// Primary language.
    pub language:    Option<String,>,
    /// Creation timestamp.
    pub created_at:  Option<String,>,
    /// Timestamp of the last push.
    pub last_push:   Option<String,>,
    /// Canonical HTML URL.
    pub url:         Option<String,>,
}

impl RepoMetadata
{
    /// Projects a `GET /repos/{owner}/{repo}` payload.
    ///
    /// # Example
    ///
    /// ```
    /// use repo_insights::RepoMetadata;
    ///
    /// let payload = serde_json::json!({ "name": "Hello-World", "stargazers_count": 42 });
    /// let metadata = RepoMetadata::from_value(&payload);
    /// assert_eq!(metadata.stars, Some(42));
    /// assert_eq!(metadata.forks, None);
    /// ```
    pub fn from_value(value: &Value,) -> Self
    {
        Self {
            name:        value.str_at("name",),
            description: value.str_at("description",),
            stars:       value.u64_at("stargazers_count",),
            forks:       value.u64_at("forks_count",),
            open_issues: value.u64_at("open_issues_count",),
            language:    value.str_at("language",),
            created_at:  value.str_at("created_at",),
            last_push:   value.str_at("pushed_at",),
            url:         value.str_at("html_url",),
        }
    }
}

/// Single entry of `commit_activity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct CommitSummary
{
    /// Commit hash.
    pub sha:     Option<String,>,
    /// Full commit message, or a placeholder when upstream omits it.
    pub message: String,
    /// Git author name, or a placeholder when upstream omits it.
    pub author:  String,
    /// Authoring timestamp.
    pub date:    Option<String,>,
}

impl CommitSummary
{
    pub fn from_value(value: &Value,) -> Self
    {
        Self {
            sha:     value.str_at("sha",),
            message: value
                .str_at("commit.message",)
                .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE.to_owned(),),
            author:  value
                .str_at("commit.author.name",)
                .unwrap_or_else(|| DEFAULT_COMMIT_AUTHOR.to_owned(),),
            date:    value.str_at("commit.author.date",),
        }
    }
}

/// Single entry of `contributor_stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct ContributorSummary
{
    /// Account login.
    pub login:         Option<String,>,
    /// Commits counted for the account.
    pub contributions: Option<u64,>,
    /// Avatar image URL.
    pub avatar_url:    Option<String,>,
    /// Profile page URL.
    pub profile_url:   Option<String,>,
}

impl ContributorSummary
{
    pub fn from_value(value: &Value,) -> Self
    {
        Self {
            login:         value.str_at("login",),
            contributions: value.u64_at("contributions",),
            avatar_url:    value.str_at("avatar_url",),
            profile_url:   value.str_at("html_url",),
        }
    }
}

/// Language name to byte count, passed through from upstream.
pub type LanguageBreakdown = Map<String, Value,>;

/// Single entry of `open_issues_list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct IssueSummary
{
    /// Issue title.
    pub title:      Option<String,>,
    /// Issue number within the repository.
    pub number:     Option<u64,>,
    /// Issue page URL.
    pub url:        Option<String,>,
    /// Login of the reporter.
    pub user:       Option<String,>,
    /// Creation timestamp.
    pub created_at: Option<String,>,
}

impl IssueSummary
{
    pub fn from_value(value: &Value,) -> Self
    {
        Self {
            title:      value.str_at("title",),
            number:     value.u64_at("number",),
            url:        value.str_at("html_url",),
            user:       value.str_at("user.login",),
            created_at: value.str_at("created_at",),
        }
    }
}

/// Payload of `latest_release`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct ReleaseInfo
{
    /// Release title.
    pub name:         Option<String,>,
    /// Git tag the release points at.
    pub tag_name:     Option<String,>,
    /// Publication timestamp.
    pub published_at: Option<String,>,
    /// Release page URL.
    pub url:          Option<String,>,
    /// Release notes.
    pub body:         Option<String,>,
}

impl ReleaseInfo
{
    pub fn from_value(value: &Value,) -> Self
    {
        Self {
            name:         value.str_at("name",),
            tag_name:     value.str_at("tag_name",),
            published_at: value.str_at("published_at",),
            url:          value.str_at("html_url",),
            body:         value.str_at("body",),
        }
    }
}

/// Weekly total from the commit activity statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,)]
pub struct WeeklyCommitPoint
{
    /// Unix timestamp of the first day of the week.
    pub week_start_timestamp: Option<i64,>,
    /// Commits recorded during the week.
    pub total_commits:        Option<u64,>,
}

impl WeeklyCommitPoint
{
    pub fn from_value(value: &Value,) -> Self
    {
        Self {
            week_start_timestamp: value.i64_at("week",), total_commits: value.u64_at("total",),
        }
    }
}

fn items(value: &Value,) -> &[Value]
{
    value.as_array().map(Vec::as_slice,).unwrap_or_default()
}

/// Normalizes the commit list; non-array payloads yield an empty list.
pub fn normalize_commits(value: &Value,) -> Vec<CommitSummary,>
{
    items(value,).iter().map(CommitSummary::from_value,).collect()
}

/// Normalizes the contributor list; non-array payloads yield an empty list.
pub fn normalize_contributors(value: &Value,) -> Vec<ContributorSummary,>
{
    items(value,).iter().map(ContributorSummary::from_value,).collect()
}

/// Passes the language map through; non-object payloads yield an empty map.
pub fn normalize_languages(value: Value,) -> LanguageBreakdown
{
    match value {
        Value::Object(map,) => map,
        _ => LanguageBreakdown::new(),
    }
}

/// Normalizes open issues, dropping pull requests and keeping at most
/// `count` entries.
///
/// The issues endpoint also lists pull requests; those carry a non-empty
/// `pull_request` object.
///
/// # Example
///
/// ```
/// use repo_insights::normalize_issues;
///
/// let payload = serde_json::json!([
///     { "title": "bug", "number": 1 },
///     { "title": "fix", "number": 2, "pull_request": { "url": "https://example.com" } },
/// ]);
/// let issues = normalize_issues(&payload, 5);
/// assert_eq!(issues.len(), 1);
/// assert_eq!(issues[0].number, Some(1));
/// ```
pub fn normalize_issues(value: &Value, count: usize,) -> Vec<IssueSummary,>
{
    items(value,)
        .iter()
        .filter(|item| !item.truthy_at("pull_request",),)
        .take(count,)
        .map(IssueSummary::from_value,)
        .collect()
}

/// Normalizes the yearly commit series, keeping the most recent
/// [`COMMIT_FREQUENCY_WEEKS`] entries in upstream order.
pub fn normalize_commit_frequency(value: &Value,) -> Vec<WeeklyCommitPoint,>
{
    let weeks = items(value,);
    let start = weeks.len().saturating_sub(COMMIT_FREQUENCY_WEEKS,);
    weeks[start..].iter().map(WeeklyCommitPoint::from_value,).collect()
}

#[cfg(test)]
mod tests
{
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn metadata_projection_maps_upstream_names()
    {
        let payload = json!({
            "name": "Hello-World",
            "description": "My first repository",
            "stargazers_count": 42,
            "forks_count": 9,
            "open_issues_count": 3,
            "language": "Rust",
            "created_at": "2011-01-26T19:01:12Z",
            "pushed_at": "2011-01-26T19:06:43Z",
            "html_url": "https://github.com/octocat/Hello-World"
        });

        let metadata = RepoMetadata::from_value(&payload,);
        assert_eq!(metadata.name.as_deref(), Some("Hello-World"));
        assert_eq!(metadata.stars, Some(42));
        assert_eq!(metadata.forks, Some(9));
        assert_eq!(metadata.last_push.as_deref(), Some("2011-01-26T19:06:43Z"));
        assert_eq!(metadata.url.as_deref(), Some("https://github.com/octocat/Hello-World"));
    }

    #[test]
    fn metadata_serializes_absent_fields_as_null()
    {
        let metadata = RepoMetadata::from_value(&json!({ "stargazers_count": "lots" }),);
        let rendered = serde_json::to_value(&metadata,).expect("serialization failed",);
        assert_eq!(rendered["stars"], Value::Null);
        assert_eq!(rendered["description"], Value::Null);
        assert_eq!(rendered.as_object().map(|m| m.len()), Some(9));
    }

    #[test]
    fn commit_defaults_apply_when_fields_missing()
    {
        let commits = normalize_commits(&json!([
            { "sha": "abc123", "commit": {} },
            {
                "sha": "def456",
                "commit": {
                    "message": "Initial commit",
                    "author": { "name": "The Octocat", "date": "2012-03-06T23:06:50Z" }
                }
            }
        ]),);

        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].message, DEFAULT_COMMIT_MESSAGE);
        assert_eq!(commits[0].author, DEFAULT_COMMIT_AUTHOR);
        assert_eq!(commits[0].date, None);
        assert_eq!(commits[1].message, "Initial commit");
        assert_eq!(commits[1].author, "The Octocat");
    }

    #[test]
    fn contributor_projection_renames_profile_url()
    {
        let contributors = normalize_contributors(&json!([{
            "login": "octocat",
            "contributions": 32,
            "avatar_url": "https://avatars.example.com/u/583231",
            "html_url": "https://github.com/octocat"
        }]),);

        assert_eq!(contributors[0].profile_url.as_deref(), Some("https://github.com/octocat"));
        assert_eq!(contributors[0].contributions, Some(32));
    }

    #[test]
    fn non_array_payloads_normalize_to_empty_lists()
    {
        assert!(normalize_commits(&json!({ "message": "odd" }),).is_empty());
        assert!(normalize_contributors(&Value::Null,).is_empty());
        assert!(normalize_commit_frequency(&json!({}),).is_empty());
    }

    #[test]
    fn languages_pass_through_unchanged()
    {
        let languages = normalize_languages(json!({ "Rust": 12000, "Shell": 300 }),);
        assert_eq!(languages.get("Rust"), Some(&json!(12000)));
        assert_eq!(languages.len(), 2);
        assert!(normalize_languages(json!([]),).is_empty());
    }

    #[test]
    fn issues_drop_pull_requests()
    {
        let issues = normalize_issues(
            &json!([
                { "title": "first", "number": 1, "user": { "login": "a" } },
                { "title": "pr", "number": 2, "pull_request": { "url": "https://x" } },
                { "title": "third", "number": 3, "pull_request": null }
            ]),
            5,
        );

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].user.as_deref(), Some("a"));
        assert_eq!(issues[1].number, Some(3));
    }

    #[test]
    fn issues_are_capped_at_requested_count()
    {
        let payload = Value::Array((1..=8).map(|n| json!({ "number": n }),).collect(),);
        assert_eq!(normalize_issues(&payload, 5,).len(), 5);
    }

    #[test]
    fn release_projection()
    {
        let release = ReleaseInfo::from_value(&json!({
            "name": "v1.0.0",
            "tag_name": "v1.0.0",
            "published_at": "2013-02-27T19:35:32Z",
            "html_url": "https://github.com/octocat/Hello-World/releases/v1.0.0",
            "body": "Description of the release"
        }),);
        assert_eq!(release.tag_name.as_deref(), Some("v1.0.0"));
        assert_eq!(release.body.as_deref(), Some("Description of the release"));
    }

    #[test]
    fn frequency_keeps_last_twelve_weeks()
    {
        let payload = Value::Array(
            (0..52).map(|n| json!({ "week": 1_000 + n, "total": n, "days": [0, 0, 0, 0, 0, 0, 0] }),).collect(),
        );

        let series = normalize_commit_frequency(&payload,);
        assert_eq!(series.len(), COMMIT_FREQUENCY_WEEKS);
        assert_eq!(series[0].total_commits, Some(40));
        assert_eq!(series[11].week_start_timestamp, Some(1_051));
    }

    #[test]
    fn frequency_shorter_than_window_is_kept_whole()
    {
        let series = normalize_commit_frequency(&json!([{ "week": 1, "total": 4 }]),);
        assert_eq!(series, vec![WeeklyCommitPoint {
            week_start_timestamp: Some(1),
            total_commits:        Some(4),
        }]);
    }

    proptest! {
        #[test]
        fn frequency_is_suffix_of_input(totals in proptest::collection::vec(0u64..500, 0..80)) {
            let payload = Value::Array(
                totals.iter().enumerate().map(|(i, t)| json!({ "week": i, "total": t })).collect(),
            );
            let series = normalize_commit_frequency(&payload);
            let expected_len = totals.len().min(COMMIT_FREQUENCY_WEEKS);
            prop_assert_eq!(series.len(), expected_len);
            let tail = &totals[totals.len() - expected_len..];
            for (point, total) in series.iter().zip(tail) {
                prop_assert_eq!(point.total_commits, Some(*total));
            }
        }

        #[test]
        fn issues_never_contain_pull_requests(flags in proptest::collection::vec(any::<bool>(), 0..20)) {
            let payload = Value::Array(
                flags
                    .iter()
                    .enumerate()
                    .map(|(i, is_pr)| {
                        if *is_pr {
                            json!({ "number": i, "pull_request": { "url": "https://x" } })
                        } else {
                            json!({ "number": i })
                        }
                    })
                    .collect(),
            );
            let issues = normalize_issues(&payload, usize::MAX);
            let plain = flags.iter().filter(|is_pr| !**is_pr).count();
            prop_assert_eq!(issues.len(), plain);
        }
    }
}
