//! Fetch layer: the host trait and the wire-facing data it returns.
//!
//! The core pipeline only talks to [`RepoHost`]; the GitHub REST
//! implementation lives in [`github`]. Tests substitute an in-memory host.

pub mod github;

pub use github::GitHubClient;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::FetchError;

/// Repository listing entry from the host.
#[derive(Debug, Clone, Default)]
pub struct RepoInfo {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub url: String,
    pub language: Option<String>,
    pub size_kb: u64,
    pub stars: u64,
    pub forks: u64,
    pub open_issues: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub default_branch: String,
    pub archived: bool,
    pub topics: Vec<String>,
}

/// Decoded content of a single file.
#[derive(Debug, Clone)]
pub struct FileContent {
    pub path: String,
    pub content: String,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// One entry from a directory listing.
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub name: String,
    pub path: String,
    pub kind: EntryKind,
}

/// Pull request header, most-recently-updated ordering.
#[derive(Debug, Clone)]
pub struct PullSummary {
    pub number: u64,
    pub title: String,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A PR comment body; `None` when the host returned a null body.
#[derive(Debug, Clone, Default)]
pub struct Comment {
    pub author: Option<String>,
    pub body: Option<String>,
}

/// Commit header with author timestamp.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub sha: String,
    pub message: String,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct Workflow {
    pub id: u64,
    pub name: String,
}

/// One workflow run record.
#[derive(Debug, Clone, Default)]
pub struct WorkflowRun {
    pub conclusion: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One code-search hit.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub path: String,
    pub html_url: String,
}

/// Source-control host contract (GitHub-like REST API).
///
/// Every call is fallible and may be rate limited; callers degrade failures
/// at the smallest enclosing operation. `repo` is the full name
/// (`owner/name`).
#[async_trait::async_trait]
pub trait RepoHost: Send + Sync {
    /// List all repositories of an organization.
    async fn list_org_repos(&self, org: &str) -> Result<Vec<RepoInfo>, FetchError>;

    /// Fetch a single file's decoded content; `Ok(None)` when the path is
    /// absent or is a directory.
    async fn file_content(&self, repo: &str, path: &str)
    -> Result<Option<FileContent>, FetchError>;

    /// List a directory; empty path lists the repository root.
    async fn list_dir(&self, repo: &str, path: &str) -> Result<Vec<DirEntry>, FetchError>;

    /// Language breakdown in bytes.
    async fn languages(&self, repo: &str) -> Result<BTreeMap<String, u64>, FetchError>;

    /// Most recently updated pull requests, up to `limit`.
    async fn recent_pulls(&self, repo: &str, limit: u32) -> Result<Vec<PullSummary>, FetchError>;

    /// Issue and review comments of one pull request.
    async fn pull_comments(&self, repo: &str, number: u64) -> Result<Vec<Comment>, FetchError>;

    /// Most recent commits, up to `limit`.
    async fn recent_commits(&self, repo: &str, limit: u32) -> Result<Vec<CommitInfo>, FetchError>;

    /// Workflows defined in the repository, up to `limit`.
    async fn list_workflows(&self, repo: &str, limit: u32) -> Result<Vec<Workflow>, FetchError>;

    /// Recent runs of one workflow, up to `limit`.
    async fn workflow_runs(
        &self,
        repo: &str,
        workflow_id: u64,
        limit: u32,
    ) -> Result<Vec<WorkflowRun>, FetchError>;

    /// Code search scoped to the repository, up to `limit` hits.
    async fn search_code(
        &self,
        repo: &str,
        phrase: &str,
        limit: u32,
    ) -> Result<Vec<SearchHit>, FetchError>;
}
