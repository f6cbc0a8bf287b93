//! Code-fear search: warning phrases committed into the tree.

use tracing::{debug, instrument, warn};

use crate::fetch::RepoHost;
use crate::types::{Collected, FearSignal, FearSummary};

/// Search the repository for each fear phrase, recording up to
/// `per_phrase_limit` hits per phrase.
///
/// A failed search contributes zero signals for that phrase only; the bundle
/// is `Partial` when some phrases failed and `Unavailable` when all did.
#[instrument(skip_all, fields(repo = %repo))]
pub async fn search_fear_signals(
    host: &dyn RepoHost,
    repo: &str,
    phrases: &[&str],
    per_phrase_limit: u32,
) -> Collected<FearSummary> {
    let mut summary = FearSummary::default();
    let mut failures = 0u32;

    for phrase in phrases {
        summary.keywords_searched += 1;
        match host.search_code(repo, phrase, per_phrase_limit).await {
            Ok(hits) => {
                for hit in hits.into_iter().take(per_phrase_limit as usize) {
                    summary.signals.push(FearSignal {
                        path: hit.path,
                        keyword: (*phrase).to_string(),
                        link: hit.html_url,
                    });
                }
            }
            Err(e) => {
                warn!(phrase, error = %e, "Code search failed");
                failures += 1;
            }
        }
    }

    summary.total_hits = summary.signals.len() as u32;
    debug!(hits = summary.total_hits, failures, "Fear search complete");

    if failures == 0 {
        Collected::Complete { data: summary }
    } else if failures < phrases.len() as u32 {
        Collected::Partial { data: summary }
    } else {
        Collected::Unavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::fetch::SearchHit;
    use std::collections::BTreeMap;
    use std::collections::HashMap;

    /// Host stub: per-phrase hit lists; unlisted phrases fail.
    struct SearchStub {
        hits: HashMap<&'static str, Vec<SearchHit>>,
    }

    #[async_trait::async_trait]
    impl RepoHost for SearchStub {
        async fn list_org_repos(
            &self,
            _org: &str,
        ) -> Result<Vec<crate::fetch::RepoInfo>, FetchError> {
            unimplemented!()
        }
        async fn file_content(
            &self,
            _repo: &str,
            _path: &str,
        ) -> Result<Option<crate::fetch::FileContent>, FetchError> {
            unimplemented!()
        }
        async fn list_dir(
            &self,
            _repo: &str,
            _path: &str,
        ) -> Result<Vec<crate::fetch::DirEntry>, FetchError> {
            unimplemented!()
        }
        async fn languages(&self, _repo: &str) -> Result<BTreeMap<String, u64>, FetchError> {
            unimplemented!()
        }
        async fn recent_pulls(
            &self,
            _repo: &str,
            _limit: u32,
        ) -> Result<Vec<crate::fetch::PullSummary>, FetchError> {
            unimplemented!()
        }
        async fn pull_comments(
            &self,
            _repo: &str,
            _number: u64,
        ) -> Result<Vec<crate::fetch::Comment>, FetchError> {
            unimplemented!()
        }
        async fn recent_commits(
            &self,
            _repo: &str,
            _limit: u32,
        ) -> Result<Vec<crate::fetch::CommitInfo>, FetchError> {
            unimplemented!()
        }
        async fn list_workflows(
            &self,
            _repo: &str,
            _limit: u32,
        ) -> Result<Vec<crate::fetch::Workflow>, FetchError> {
            unimplemented!()
        }
        async fn workflow_runs(
            &self,
            _repo: &str,
            _workflow_id: u64,
            _limit: u32,
        ) -> Result<Vec<crate::fetch::WorkflowRun>, FetchError> {
            unimplemented!()
        }
        async fn search_code(
            &self,
            _repo: &str,
            phrase: &str,
            _limit: u32,
        ) -> Result<Vec<SearchHit>, FetchError> {
            self.hits.get(phrase).cloned().ok_or(FetchError::Api {
                status: 422,
                body: "search unavailable".to_string(),
            })
        }
    }

    fn hit(path: &str) -> SearchHit {
        SearchHit {
            path: path.to_string(),
            html_url: format!("https://github.com/acme/widgets/blob/main/{path}"),
        }
    }

    #[tokio::test]
    async fn failed_phrases_contribute_zero_hits() {
        let mut hits = HashMap::new();
        hits.insert("FRAGILE", vec![hit("src/core.py"), hit("src/glue.py")]);
        let host = SearchStub { hits };

        let collected =
            search_fear_signals(&host, "acme/widgets", &["FRAGILE", "XXX"], 10).await;

        assert!(collected.is_partial());
        let summary = collected.data().unwrap();
        assert_eq!(summary.total_hits, 2);
        assert_eq!(summary.keywords_searched, 2);
        assert!(summary.signals.iter().all(|s| s.keyword == "FRAGILE"));
    }

    #[tokio::test]
    async fn all_phrases_failing_is_unavailable() {
        let host = SearchStub {
            hits: HashMap::new(),
        };
        let collected = search_fear_signals(&host, "acme/widgets", &["XXX"], 10).await;
        assert!(collected.is_unavailable());
    }

    #[tokio::test]
    async fn hits_are_capped_per_phrase() {
        let mut hits = HashMap::new();
        hits.insert(
            "XXX",
            (0..25).map(|i| hit(&format!("src/f{i}.py"))).collect(),
        );
        let host = SearchStub { hits };

        let collected = search_fear_signals(&host, "acme/widgets", &["XXX"], 10).await;
        assert_eq!(collected.data().unwrap().total_hits, 10);
    }
}
