// In-memory host fixture for end-to-end pipeline tests.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};

use stackscout_core::error::FetchError;
use stackscout_core::fetch::{
    Comment, CommitInfo, DirEntry, EntryKind, FileContent, PullSummary, RepoHost, RepoInfo,
    SearchHit, Workflow, WorkflowRun,
};

/// A fully in-memory [`RepoHost`]: one organization, any number of
/// repositories, with per-surface failure toggles.
///
/// Anything not added behaves as confirmed-empty, so a default fixture
/// produces `Complete` extraction bundles with no data.
#[derive(Debug, Default)]
pub struct FixtureHost {
    org: String,
    repos: Vec<RepoInfo>,
    files: HashMap<(String, String), FileContent>,
    dirs: HashMap<(String, String), Vec<DirEntry>>,
    languages: HashMap<String, BTreeMap<String, u64>>,
    pulls: HashMap<String, Vec<PullSummary>>,
    comments: HashMap<(String, u64), Vec<Comment>>,
    commits: HashMap<String, Vec<CommitInfo>>,
    workflows: HashMap<String, Vec<Workflow>>,
    runs: HashMap<(String, u64), Vec<WorkflowRun>>,
    search: HashMap<(String, String), Vec<SearchHit>>,
    fail_paths: HashSet<String>,

    pub fail_org_listing: bool,
    pub fail_pull_comments: bool,
    pub fail_search: bool,
}

impl FixtureHost {
    pub fn new(org: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            ..Self::default()
        }
    }

    /// Register a repository under the fixture organization.
    #[must_use]
    pub fn with_repo(mut self, name: &str) -> Self {
        self.repos.push(RepoInfo {
            name: name.to_string(),
            full_name: format!("{}/{name}", self.org),
            url: format!("https://github.com/{}/{name}", self.org),
            default_branch: "main".to_string(),
            ..RepoInfo::default()
        });
        self
    }

    #[must_use]
    pub fn with_file(mut self, repo: &str, path: &str, content: &str) -> Self {
        self.files.insert(
            (self.full(repo), path.to_string()),
            FileContent {
                path: path.to_string(),
                content: content.to_string(),
                size: content.len() as u64,
            },
        );
        self
    }

    #[must_use]
    pub fn with_dir(mut self, repo: &str, path: &str, entries: Vec<(&str, EntryKind)>) -> Self {
        let listing = entries
            .into_iter()
            .map(|(name, kind)| DirEntry {
                name: name.to_string(),
                path: if path.is_empty() {
                    name.to_string()
                } else {
                    format!("{path}/{name}")
                },
                kind,
            })
            .collect();
        self.dirs.insert((self.full(repo), path.to_string()), listing);
        self
    }

    #[must_use]
    pub fn with_pull(mut self, repo: &str, number: u64, title: &str, comments: &[&str]) -> Self {
        let full = self.full(repo);
        self.pulls.entry(full.clone()).or_default().push(PullSummary {
            number,
            title: title.to_string(),
            updated_at: None,
        });
        self.comments.insert(
            (full, number),
            comments
                .iter()
                .map(|body| Comment {
                    author: Some("reviewer".to_string()),
                    body: Some((*body).to_string()),
                })
                .collect(),
        );
        self
    }

    #[must_use]
    pub fn with_commit(mut self, repo: &str, sha: &str, message: &str, ts: Option<&str>) -> Self {
        let full = self.full(repo);
        self.commits.entry(full).or_default().push(CommitInfo {
            sha: sha.to_string(),
            message: message.to_string(),
            timestamp: ts.map(|t| t.parse::<DateTime<Utc>>().expect("valid timestamp")),
        });
        self
    }

    #[must_use]
    pub fn with_workflow(mut self, repo: &str, id: u64, name: &str, runs: Vec<WorkflowRun>) -> Self {
        let full = self.full(repo);
        self.workflows.entry(full.clone()).or_default().push(Workflow {
            id,
            name: name.to_string(),
        });
        self.runs.insert((full, id), runs);
        self
    }

    #[must_use]
    pub fn with_search_hits(mut self, repo: &str, phrase: &str, paths: &[&str]) -> Self {
        let full = self.full(repo);
        self.search.insert(
            (full.clone(), phrase.to_string()),
            paths
                .iter()
                .map(|path| SearchHit {
                    path: (*path).to_string(),
                    html_url: format!("https://github.com/{full}/blob/main/{path}"),
                })
                .collect(),
        );
        self
    }

    /// Make `file_content` and `list_dir` fail for one path, in every
    /// repository. The empty path fails root listings.
    #[must_use]
    pub fn with_failing_path(mut self, path: &str) -> Self {
        self.fail_paths.insert(path.to_string());
        self
    }

    fn full(&self, repo: &str) -> String {
        format!("{}/{repo}", self.org)
    }

    fn api_failure() -> FetchError {
        FetchError::Api {
            status: 500,
            body: "fixture failure".to_string(),
        }
    }
}

#[async_trait::async_trait]
impl RepoHost for FixtureHost {
    async fn list_org_repos(&self, org: &str) -> Result<Vec<RepoInfo>, FetchError> {
        if self.fail_org_listing || org != self.org {
            return Err(FetchError::OrgNotFound(org.to_string()));
        }
        Ok(self.repos.clone())
    }

    async fn file_content(
        &self,
        repo: &str,
        path: &str,
    ) -> Result<Option<FileContent>, FetchError> {
        if self.fail_paths.contains(path) {
            return Err(Self::api_failure());
        }
        Ok(self
            .files
            .get(&(repo.to_string(), path.to_string()))
            .cloned())
    }

    async fn list_dir(&self, repo: &str, path: &str) -> Result<Vec<DirEntry>, FetchError> {
        if self.fail_paths.contains(path) {
            return Err(Self::api_failure());
        }
        Ok(self
            .dirs
            .get(&(repo.to_string(), path.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn languages(&self, repo: &str) -> Result<BTreeMap<String, u64>, FetchError> {
        Ok(self.languages.get(repo).cloned().unwrap_or_default())
    }

    async fn recent_pulls(&self, repo: &str, limit: u32) -> Result<Vec<PullSummary>, FetchError> {
        let mut pulls = self.pulls.get(repo).cloned().unwrap_or_default();
        pulls.truncate(limit as usize);
        Ok(pulls)
    }

    async fn pull_comments(&self, repo: &str, number: u64) -> Result<Vec<Comment>, FetchError> {
        if self.fail_pull_comments {
            return Err(Self::api_failure());
        }
        Ok(self
            .comments
            .get(&(repo.to_string(), number))
            .cloned()
            .unwrap_or_default())
    }

    async fn recent_commits(&self, repo: &str, limit: u32) -> Result<Vec<CommitInfo>, FetchError> {
        let mut commits = self.commits.get(repo).cloned().unwrap_or_default();
        commits.truncate(limit as usize);
        Ok(commits)
    }

    async fn list_workflows(&self, repo: &str, limit: u32) -> Result<Vec<Workflow>, FetchError> {
        let mut workflows = self.workflows.get(repo).cloned().unwrap_or_default();
        workflows.truncate(limit as usize);
        Ok(workflows)
    }

    async fn workflow_runs(
        &self,
        repo: &str,
        workflow_id: u64,
        limit: u32,
    ) -> Result<Vec<WorkflowRun>, FetchError> {
        let mut runs = self
            .runs
            .get(&(repo.to_string(), workflow_id))
            .cloned()
            .unwrap_or_default();
        runs.truncate(limit as usize);
        Ok(runs)
    }

    async fn search_code(
        &self,
        repo: &str,
        phrase: &str,
        limit: u32,
    ) -> Result<Vec<SearchHit>, FetchError> {
        if self.fail_search {
            return Err(Self::api_failure());
        }
        let mut hits = self
            .search
            .get(&(repo.to_string(), phrase.to_string()))
            .cloned()
            .unwrap_or_default();
        hits.truncate(limit as usize);
        Ok(hits)
    }
}
