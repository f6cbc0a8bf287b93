// GitHub REST client: repository listing, contents, PRs, commits, workflow
// runs, and code search.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::FetchError;

use super::{
    Comment, CommitInfo, DirEntry, EntryKind, FileContent, PullSummary, RepoHost, RepoInfo,
    SearchHit, Workflow, WorkflowRun,
};

/// Maximum retry attempts for rate-limited requests.
const MAX_RETRIES: u32 = 5;
/// Pause and wait for reset when remaining drops below this threshold.
const RATE_LIMIT_PAUSE_THRESHOLD: u32 = 5;

/// GitHub REST API client.
#[derive(Debug)]
pub struct GitHubClient {
    base_url: String,
    token: Option<String>,
    client: Client,
    /// Remaining API calls before rate limit resets.
    rate_remaining: AtomicU32,
    /// Unix timestamp when the rate limit window resets.
    rate_reset: AtomicU64,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Self {
        Self::with_base_url("https://api.github.com", token)
    }

    /// Create with an explicit API base URL (for tests and GHE).
    pub fn with_base_url(base_url: impl Into<String>, token: Option<String>) -> Self {
        // reqwest's `no-provider` rustls feature requires a process-default
        // crypto provider; activate aws-lc-rs (ignore if already installed).
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
        Self {
            base_url: base_url.into(),
            token,
            client: Client::new(),
            rate_remaining: AtomicU32::new(u32::MAX),
            rate_reset: AtomicU64::new(0),
        }
    }

    async fn api_get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = format!("{}{path}", self.base_url);

        // Pre-check: if remaining is low, wait for reset
        self.wait_for_rate_reset().await;

        let mut delay = Duration::from_secs(1);

        for attempt in 0..=MAX_RETRIES {
            let mut req = self
                .client
                .get(&url)
                .header("Accept", "application/vnd.github+json")
                .header("User-Agent", "stackscout-cli/0.1");

            if let Some(token) = &self.token {
                req = req.header("Authorization", format!("Bearer {token}"));
            }

            debug!(url = %url, attempt, "GitHub API request");

            let resp = req
                .send()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;

            self.update_rate_limit(&resp);

            if resp.status().is_success() {
                return resp
                    .json()
                    .await
                    .map_err(|e| FetchError::Decode(format!("parse response: {e}")));
            }

            // Rate limited — retry with backoff
            let status = resp.status().as_u16();
            if (status == 403 || status == 429) && attempt < MAX_RETRIES {
                let wait = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .map_or(delay, Duration::from_secs);
                warn!(
                    attempt,
                    status,
                    wait_secs = wait.as_secs(),
                    "Rate limited, backing off"
                );
                tokio::time::sleep(wait).await;
                delay = (delay * 2).min(Duration::from_secs(60));
                continue;
            }

            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Api { status, body });
        }

        Err(FetchError::Network(format!(
            "max retries exceeded for {url}"
        )))
    }

    /// Update rate limit state from response headers.
    fn update_rate_limit(&self, resp: &reqwest::Response) {
        if let Some(remaining) = resp
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u32>().ok())
        {
            self.rate_remaining.store(remaining, Ordering::Relaxed);
            if remaining < 10 {
                warn!(remaining, "GitHub API rate limit low");
            }
        }
        if let Some(reset) = resp
            .headers()
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.rate_reset.store(reset, Ordering::Relaxed);
        }
    }

    /// Sleep until the rate limit window resets if remaining is low.
    async fn wait_for_rate_reset(&self) {
        if self.rate_remaining.load(Ordering::Relaxed) > RATE_LIMIT_PAUSE_THRESHOLD {
            return;
        }
        let reset_at = self.rate_reset.load(Ordering::Relaxed);
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        if reset_at > now {
            let wait = reset_at - now + 1;
            warn!(
                remaining = self.rate_remaining.load(Ordering::Relaxed),
                wait_secs = wait,
                "Rate limit low, waiting for reset"
            );
            tokio::time::sleep(Duration::from_secs(wait)).await;
        }
    }
}

#[async_trait::async_trait]
impl RepoHost for GitHubClient {
    async fn list_org_repos(&self, org: &str) -> Result<Vec<RepoInfo>, FetchError> {
        let mut repos = Vec::new();
        let mut page = 1u32;

        loop {
            let batch = self
                .api_get::<Vec<GhRepo>>(&format!("/orgs/{org}/repos?per_page=100&page={page}"))
                .await
                .map_err(|e| match e {
                    FetchError::Api { status: 404, .. } => FetchError::OrgNotFound(org.to_string()),
                    other => other,
                })?;

            let len = batch.len();
            repos.extend(batch.into_iter().map(GhRepo::into_info));

            if len < 100 {
                break;
            }
            page += 1;
        }

        Ok(repos)
    }

    async fn file_content(
        &self,
        repo: &str,
        path: &str,
    ) -> Result<Option<FileContent>, FetchError> {
        let value = match self
            .api_get::<serde_json::Value>(&format!("/repos/{repo}/contents/{path}"))
            .await
        {
            Ok(v) => v,
            Err(FetchError::Api { status: 404, .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        // A directory listing comes back as an array.
        if value.is_array() {
            return Ok(None);
        }

        let content: GhContent = serde_json::from_value(value)
            .map_err(|e| FetchError::Decode(format!("contents payload: {e}")))?;
        Ok(content.decode())
    }

    async fn list_dir(&self, repo: &str, path: &str) -> Result<Vec<DirEntry>, FetchError> {
        let entries = match self
            .api_get::<Vec<GhDirEntry>>(&format!("/repos/{repo}/contents/{path}"))
            .await
        {
            Ok(v) => v,
            Err(FetchError::Api { status: 404, .. }) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        Ok(entries
            .into_iter()
            .map(|e| DirEntry {
                kind: if e.kind == "dir" {
                    EntryKind::Dir
                } else {
                    EntryKind::File
                },
                name: e.name,
                path: e.path,
            })
            .collect())
    }

    async fn languages(&self, repo: &str) -> Result<BTreeMap<String, u64>, FetchError> {
        self.api_get(&format!("/repos/{repo}/languages")).await
    }

    async fn recent_pulls(&self, repo: &str, limit: u32) -> Result<Vec<PullSummary>, FetchError> {
        let mut pulls: Vec<PullSummary> = Vec::new();
        let mut page = 1u32;

        while (pulls.len() as u32) < limit {
            let batch = self
                .api_get::<Vec<GhPull>>(&format!(
                    "/repos/{repo}/pulls?state=all&sort=updated&direction=desc&per_page=100&page={page}"
                ))
                .await?;

            let len = batch.len();
            for pr in batch {
                if pulls.len() as u32 >= limit {
                    break;
                }
                pulls.push(PullSummary {
                    number: pr.number,
                    title: pr.title,
                    updated_at: pr.updated_at,
                });
            }

            if len < 100 {
                break;
            }
            page += 1;
        }

        Ok(pulls)
    }

    async fn pull_comments(&self, repo: &str, number: u64) -> Result<Vec<Comment>, FetchError> {
        // Issue comments and review comments live on different endpoints.
        let issue: Vec<GhComment> = self
            .api_get(&format!("/repos/{repo}/issues/{number}/comments?per_page=100"))
            .await?;
        let review: Vec<GhComment> = self
            .api_get(&format!("/repos/{repo}/pulls/{number}/comments?per_page=100"))
            .await?;

        Ok(issue
            .into_iter()
            .chain(review)
            .map(|c| Comment {
                author: c.user.map(|u| u.login),
                body: c.body,
            })
            .collect())
    }

    async fn recent_commits(&self, repo: &str, limit: u32) -> Result<Vec<CommitInfo>, FetchError> {
        let mut commits: Vec<CommitInfo> = Vec::new();
        let mut page = 1u32;

        while (commits.len() as u32) < limit {
            let batch = self
                .api_get::<Vec<GhCommit>>(&format!(
                    "/repos/{repo}/commits?per_page=100&page={page}"
                ))
                .await?;

            let len = batch.len();
            for c in batch {
                if commits.len() as u32 >= limit {
                    break;
                }
                commits.push(CommitInfo {
                    sha: c.sha,
                    message: c.commit.message,
                    timestamp: c.commit.author.and_then(|a| a.date),
                });
            }

            if len < 100 {
                break;
            }
            page += 1;
        }

        Ok(commits)
    }

    async fn list_workflows(&self, repo: &str, limit: u32) -> Result<Vec<Workflow>, FetchError> {
        let list: GhWorkflowList = self
            .api_get(&format!("/repos/{repo}/actions/workflows?per_page={limit}"))
            .await?;

        Ok(list
            .workflows
            .into_iter()
            .take(limit as usize)
            .map(|w| Workflow {
                id: w.id,
                name: w.name,
            })
            .collect())
    }

    async fn workflow_runs(
        &self,
        repo: &str,
        workflow_id: u64,
        limit: u32,
    ) -> Result<Vec<WorkflowRun>, FetchError> {
        let list: GhRunList = self
            .api_get(&format!(
                "/repos/{repo}/actions/workflows/{workflow_id}/runs?per_page={limit}"
            ))
            .await?;

        Ok(list
            .workflow_runs
            .into_iter()
            .take(limit as usize)
            .map(|r| WorkflowRun {
                conclusion: r.conclusion,
                created_at: r.created_at,
                updated_at: r.updated_at,
            })
            .collect())
    }

    async fn search_code(
        &self,
        repo: &str,
        phrase: &str,
        limit: u32,
    ) -> Result<Vec<SearchHit>, FetchError> {
        let query = encode_search_query(phrase, repo);
        let result: GhSearchResult = self
            .api_get(&format!("/search/code?q={query}&per_page={limit}"))
            .await?;

        Ok(result
            .items
            .into_iter()
            .take(limit as usize)
            .map(|i| SearchHit {
                path: i.path,
                html_url: i.html_url,
            })
            .collect())
    }
}

/// Build a `q=` value for `"<phrase>" repo:<repo>`, percent-encoding the
/// quotes and joining terms with `+`.
fn encode_search_query(phrase: &str, repo: &str) -> String {
    let quoted = format!("\"{phrase}\" repo:{repo}");
    quoted.replace('"', "%22").replace(' ', "+")
}

// ── GitHub API Types ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GhRepo {
    name: String,
    full_name: String,
    description: Option<String>,
    html_url: String,
    language: Option<String>,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    open_issues_count: u64,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    pushed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    default_branch: String,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    topics: Vec<String>,
}

impl GhRepo {
    fn into_info(self) -> RepoInfo {
        RepoInfo {
            name: self.name,
            full_name: self.full_name,
            description: self.description,
            url: self.html_url,
            language: self.language,
            size_kb: self.size,
            stars: self.stargazers_count,
            forks: self.forks_count,
            open_issues: self.open_issues_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
            pushed_at: self.pushed_at,
            default_branch: self.default_branch,
            archived: self.archived,
            topics: self.topics,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GhContent {
    path: String,
    #[serde(default)]
    size: u64,
    content: Option<String>,
    encoding: Option<String>,
}

impl GhContent {
    /// Decode a base64 contents payload; non-base64 or binary content is
    /// treated as absent.
    fn decode(self) -> Option<FileContent> {
        let raw = self.content?;
        if self.encoding.as_deref() != Some("base64") {
            return None;
        }
        let stripped: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = BASE64.decode(stripped).ok()?;
        let text = String::from_utf8(bytes).ok()?;
        Some(FileContent {
            path: self.path,
            content: text,
            size: self.size,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GhDirEntry {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct GhPull {
    number: u64,
    title: String,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct GhUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GhComment {
    user: Option<GhUser>,
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GhCommit {
    sha: String,
    commit: GhCommitDetail,
}

#[derive(Debug, Deserialize)]
struct GhCommitDetail {
    message: String,
    author: Option<GhCommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct GhCommitAuthor {
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct GhWorkflowList {
    workflows: Vec<GhWorkflow>,
}

#[derive(Debug, Deserialize)]
struct GhWorkflow {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct GhRunList {
    workflow_runs: Vec<GhRun>,
}

#[derive(Debug, Deserialize)]
struct GhRun {
    conclusion: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct GhSearchResult {
    items: Vec<GhSearchItem>,
}

#[derive(Debug, Deserialize)]
struct GhSearchItem {
    path: String,
    html_url: String,
}

// ── Tests ───────────────────────────────────────────────────────────
