//! Domain types shared across the ingestion pipeline.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum snippet length in characters, bounding memory per Signal.
pub const MAX_SNIPPET_CHARS: usize = 200;

/// One match event produced by an extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub source_id: String,
    pub source_title: String,
    pub matched_pattern: String,
    pub category: String,
    /// Bounded-length excerpt of the matching text.
    pub snippet: String,
}

impl Signal {
    /// Build a signal, truncating the snippet to [`MAX_SNIPPET_CHARS`].
    pub fn new(
        source_id: impl Into<String>,
        source_title: impl Into<String>,
        matched_pattern: impl Into<String>,
        category: impl Into<String>,
        text: &str,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            source_title: source_title.into(),
            matched_pattern: matched_pattern.into(),
            category: category.into(),
            snippet: bounded_snippet(text),
        }
    }
}

/// Truncate to at most [`MAX_SNIPPET_CHARS`] characters, char-boundary safe.
pub fn bounded_snippet(text: &str) -> String {
    text.chars().take(MAX_SNIPPET_CHARS).collect()
}

/// Severity of a synthesized finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A synthesized finding derived from one or more signals or aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub category: String,
    pub issue_code: String,
    pub severity: Severity,
    /// Human-readable description; includes the computed metric.
    pub description: String,
    /// Remediation text.
    pub suggestion: String,
}

/// Outcome of one extractor invocation.
///
/// Distinguishes "confirmed empty" (`Complete` with empty data) from
/// "fetch failed" (`Unavailable`) and "aborted mid-scan" (`Partial`),
/// replacing the blanket exception suppression of ad hoc ingesters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Collected<T> {
    /// All fetches succeeded; the data is authoritative.
    Complete {
        #[serde(flatten)]
        data: T,
    },
    /// A fetch failed mid-scan; the data holds whatever was accumulated.
    Partial {
        #[serde(flatten)]
        data: T,
    },
    /// Nothing could be fetched.
    Unavailable,
}

impl<T> Collected<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Complete { data } | Self::Partial { data } => Some(data),
            Self::Unavailable => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Complete { data } | Self::Partial { data } => Some(data),
            Self::Unavailable => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, Self::Partial { .. })
    }
}

// ── Comment mining ──────────────────────────────────────────────────

/// One entry in the aggregate pattern-frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCount {
    pub pattern: String,
    pub count: u32,
}

/// Result bundle of the PR comment mining pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentMiningSummary {
    pub prs_scanned: u32,
    pub comments_scanned: u32,
    pub confusion: Vec<Signal>,
    pub tech_debt: Vec<Signal>,
    pub fragility: Vec<Signal>,
    /// Combined frequency table across all three categories, descending,
    /// truncated to the top 10.
    pub top_patterns: Vec<PatternCount>,
}

// ── Shadow infrastructure ───────────────────────────────────────────

/// Low/medium/high bucketing used for env and compose complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

/// One build-file rule: target name plus its recorded commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTarget {
    pub name: String,
    pub commands: Vec<String>,
}

/// Heuristic summary of a Makefile-style build file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildFileSummary {
    pub targets: Vec<BuildTarget>,
    pub has_deploy_target: bool,
    pub has_test_target: bool,
    pub uses_docker: bool,
}

/// Summary of a script-runner manifest (package.json `scripts`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptSummary {
    pub scripts: BTreeMap<String, String>,
    pub has_fast_test_variant: bool,
    pub has_debug_script: bool,
    pub has_docker_script: bool,
    pub has_deploy_script: bool,
    pub has_postinstall_hook: bool,
}

/// Summary of an environment-variable template (.env.example).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvSummary {
    pub variables: Vec<String>,
    /// Keys whose names substring-match the suspicious-word list.
    pub red_flags: Vec<String>,
    /// Overlapping buckets: database, cache, cloud, auth, observability,
    /// feature_flag.
    pub buckets: BTreeMap<String, Vec<String>>,
    pub complexity: Complexity,
}

impl Default for EnvSummary {
    fn default() -> Self {
        Self {
            variables: Vec::new(),
            red_flags: Vec::new(),
            buckets: BTreeMap::new(),
            complexity: Complexity::Low,
        }
    }
}

/// A shell script flagged as a candidate workaround.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkaroundScript {
    pub path: String,
    /// Why it was flagged: `root_level` or `suspicious_name`.
    pub reason: String,
}

/// Heuristic summary of compose-manifest service declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeSummary {
    pub services: Vec<String>,
    pub has_database: bool,
    pub has_cache: bool,
    pub has_queue: bool,
    pub complexity: Complexity,
}

impl Default for ComposeSummary {
    fn default() -> Self {
        Self {
            services: Vec::new(),
            has_database: false,
            has_cache: false,
            has_queue: false,
            complexity: Complexity::Low,
        }
    }
}

/// Hardcoded-endpoint counts found in critical-file contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenDepsSummary {
    /// Endpoint count per critical-file category.
    pub per_file: BTreeMap<String, u32>,
    pub hardcoded_ips: u32,
    pub hardcoded_urls: u32,
    pub total: u32,
}

/// Result bundle of the shadow-infrastructure scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShadowSummary {
    pub build_file: Option<BuildFileSummary>,
    pub scripts: Option<ScriptSummary>,
    pub env: Option<EnvSummary>,
    pub workaround_scripts: Vec<WorkaroundScript>,
    pub compose: Option<ComposeSummary>,
    pub hidden_deps: HiddenDepsSummary,
}

// ── Commit archaeology ──────────────────────────────────────────────

/// A commit whose message matched the revert/rollback catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevertCommit {
    /// Short (7-char) SHA.
    pub sha: String,
    /// First line of the message, truncated to 100 characters.
    pub summary: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Aggregate statistics over recent commit history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitStats {
    pub total_commits: u32,
    /// Monday-first weekday histogram.
    pub weekday_histogram: [u32; 7],
    pub hour_histogram: [u32; 24],
    pub reverts: Vec<RevertCommit>,
    pub friday_commits: u32,
    pub weekend_commits: u32,
    pub mean_message_length: f64,
}

impl Default for CommitStats {
    fn default() -> Self {
        Self {
            total_commits: 0,
            weekday_histogram: [0; 7],
            hour_histogram: [0; 24],
            reverts: Vec::new(),
            friday_commits: 0,
            weekend_commits: 0,
            mean_message_length: 0.0,
        }
    }
}

// ── Code fear ───────────────────────────────────────────────────────

/// One code-search hit for a fear phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FearSignal {
    pub path: String,
    pub keyword: String,
    pub link: String,
}

/// Result bundle of the code-fear search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FearSummary {
    pub signals: Vec<FearSignal>,
    pub total_hits: u32,
    pub keywords_searched: u32,
}

// ── CI performance ──────────────────────────────────────────────────

/// Per-workflow run statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStats {
    pub name: String,
    pub runs_sampled: u32,
    pub failures: u32,
    pub failure_rate: f64,
    /// Absent when no run carried both timestamps.
    pub avg_duration_secs: Option<f64>,
    pub avg_duration_mins: Option<f64>,
}

/// Result bundle of the CI performance sampling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CiSummary {
    pub workflows: Vec<WorkflowStats>,
}

// ── Repository report ───────────────────────────────────────────────

/// Repository metadata block, mirrored from the host API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoMetadata {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub url: String,
    pub language: Option<String>,
    pub languages: BTreeMap<String, u64>,
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

/// Raw content of one fetched critical file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalFile {
    pub path: String,
    pub content: String,
    pub size: u64,
}

/// Critical-file categories hold either one file or a collected set
/// (workflows, terraform, k8s manifests).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CriticalFileEntry {
    Single(CriticalFile),
    Many(Vec<CriticalFile>),
}

/// Top-level directory flags derived from the root listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct StructureFlags {
    pub has_tests: bool,
    pub has_docs: bool,
    pub has_ci: bool,
    pub has_docker: bool,
    pub has_iac: bool,
    pub directories: Vec<String>,
}

/// The per-repository output document. Written once, never mutated after
/// serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryReport {
    pub metadata: RepoMetadata,
    /// Raw critical-file contents keyed by stack-file category.
    pub files: BTreeMap<String, CriticalFileEntry>,
    pub structure: StructureFlags,
    pub comment_mining: Collected<CommentMiningSummary>,
    pub shadow_infrastructure: Collected<ShadowSummary>,
    pub commit_patterns: Collected<CommitStats>,
    pub fear_signals: Collected<FearSummary>,
    pub ci_performance: Collected<CiSummary>,
    pub insights: Vec<Insight>,
    pub ingested_at: DateTime<Utc>,
}

/// The org-level summary document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgSummary {
    pub org: String,
    pub repos_ingested: usize,
    pub timestamp: DateTime<Utc>,
    pub repos: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_is_bounded_to_200_chars() {
        let long = "x".repeat(500);
        let signal = Signal::new("PR#1", "title", "hack", "tech_debt", &long);
        assert_eq!(signal.snippet.chars().count(), MAX_SNIPPET_CHARS);
    }

    #[test]
    fn snippet_respects_multibyte_boundaries() {
        let text = "é".repeat(300);
        let snippet = bounded_snippet(&text);
        assert_eq!(snippet.chars().count(), MAX_SNIPPET_CHARS);
    }

    #[test]
    fn short_snippet_is_untouched() {
        assert_eq!(bounded_snippet("short"), "short");
    }

    #[test]
    fn collected_serializes_with_status_tag() {
        let collected = Collected::Complete {
            data: FearSummary::default(),
        };
        let json = serde_json::to_value(&collected).unwrap();
        assert_eq!(json["status"], "complete");
        assert_eq!(json["total_hits"], 0);

        let unavailable: Collected<FearSummary> = Collected::Unavailable;
        let json = serde_json::to_value(&unavailable).unwrap();
        assert_eq!(json["status"], "unavailable");
        assert!(json.get("total_hits").is_none());
    }

    #[test]
    fn collected_data_accessors() {
        let partial = Collected::Partial {
            data: CiSummary::default(),
        };
        assert!(partial.is_partial());
        assert!(partial.data().is_some());
        assert!(Collected::<CiSummary>::Unavailable.data().is_none());
    }

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(Severity::High).unwrap(),
            serde_json::json!("high")
        );
    }
}
