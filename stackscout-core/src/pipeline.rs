//! Ingestion orchestrator: Fetch → Extract → Synthesize → Write, one
//! repository at a time.

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::catalog::{Catalogs, FEAR_PHRASES};
use crate::config::ScoutConfig;
use crate::error::Result;
use crate::extract::{ci, comments, commits, fear, hidden_deps, shadow, stack_files};
use crate::fetch::{RepoHost, RepoInfo};
use crate::insight::{synthesize_insights, InsightInputs};
use crate::progress::ProgressReporter;
use crate::report::ReportWriter;
use crate::types::{Collected, OrgSummary, RepositoryReport, ShadowSummary};

/// Drives the full ingestion of one organization.
pub struct OrgIngestor<'a> {
    host: &'a dyn RepoHost,
    config: &'a ScoutConfig,
    catalogs: Catalogs,
}

impl std::fmt::Debug for OrgIngestor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrgIngestor").finish_non_exhaustive()
    }
}

impl<'a> OrgIngestor<'a> {
    pub fn new(host: &'a dyn RepoHost, config: &'a ScoutConfig) -> Self {
        Self {
            host,
            config,
            catalogs: Catalogs::builtin(),
        }
    }

    /// Ingest every repository of `org`, writing one report per repository
    /// and a final `summary.json`.
    ///
    /// Failing to list the organization aborts the run; any failure inside a
    /// single repository degrades that repository's report instead.
    #[instrument(skip_all, fields(org = %org))]
    pub async fn ingest_org(
        &self,
        org: &str,
        writer: &ReportWriter,
        progress: &dyn ProgressReporter,
    ) -> Result<OrgSummary> {
        let repos = self.host.list_org_repos(org).await?;
        info!(count = repos.len(), "Repositories discovered");

        progress.start("Ingesting", Some(repos.len() as u64));
        let mut ingested = Vec::with_capacity(repos.len());

        for info in &repos {
            progress.step(&info.full_name);
            let report = self.ingest_repo(info).await;
            if let Err(e) = writer.write_repo(&info.name, &report) {
                warn!(repo = %info.full_name, error = %e, "Report write failed");
                continue;
            }
            ingested.push(info.name.clone());
        }
        progress.finish();

        let summary = OrgSummary {
            org: org.to_string(),
            repos_ingested: ingested.len(),
            timestamp: Utc::now(),
            repos: ingested,
        };
        writer.write_summary(&summary)?;
        info!(repos = summary.repos_ingested, "Organization ingested");
        Ok(summary)
    }

    /// Build the full report for one repository. Never fails: every
    /// sub-extraction degrades independently to `Partial` or `Unavailable`.
    #[instrument(skip_all, fields(repo = %info.full_name))]
    pub async fn ingest_repo(&self, info: &RepoInfo) -> RepositoryReport {
        let repo = info.full_name.as_str();
        let mining = &self.config.mining;

        let metadata = stack_files::build_metadata(self.host, info).await;
        let files = stack_files::fetch_critical_files(self.host, repo).await;
        let structure = stack_files::scan_structure(self.host, repo).await;

        let comment_mining =
            comments::mine_pull_comments(self.host, repo, &self.catalogs, mining.max_pull_requests)
                .await;

        let mut shadow_infrastructure = shadow::scan_shadow_infrastructure(self.host, repo).await;
        let hidden = hidden_deps::scan_hidden_dependencies(&files);
        match shadow_infrastructure.data_mut() {
            Some(data) => data.hidden_deps = hidden,
            // Endpoint findings survive even when the shadow fetches all failed.
            None if hidden.total > 0 => {
                shadow_infrastructure = Collected::Partial {
                    data: ShadowSummary {
                        hidden_deps: hidden,
                        ..ShadowSummary::default()
                    },
                };
            }
            None => {}
        }

        let commit_patterns = commits::dig_commit_history(
            self.host,
            repo,
            &self.catalogs.reverts,
            mining.max_commits,
        )
        .await;

        let fear_signals = fear::search_fear_signals(
            self.host,
            repo,
            FEAR_PHRASES,
            mining.max_search_hits_per_keyword,
        )
        .await;

        let ci_performance = ci::sample_ci_performance(
            self.host,
            repo,
            mining.max_workflows,
            mining.max_runs_per_workflow,
        )
        .await;

        let insights = synthesize_insights(&InsightInputs {
            shadow: shadow_infrastructure.data(),
            commits: commit_patterns.data(),
            fear: fear_signals.data(),
            ci: ci_performance.data(),
        });
        info!(insights = insights.len(), "Repository ingested");

        RepositoryReport {
            metadata,
            files,
            structure,
            comment_mining,
            shadow_infrastructure,
            commit_patterns,
            fear_signals,
            ci_performance,
            insights,
            ingested_at: Utc::now(),
        }
    }
}
