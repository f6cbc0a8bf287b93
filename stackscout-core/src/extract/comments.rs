//! PR comment mining: confusion, tech-debt, and fragility signals.

use std::collections::HashMap;

use tracing::{debug, instrument, warn};

use crate::catalog::Catalogs;
use crate::fetch::{Comment, RepoHost};
use crate::types::{Collected, CommentMiningSummary, PatternCount, Signal};

/// One pull request's comment thread, as consumed by the pure miner.
#[derive(Debug, Clone)]
pub struct PullThread {
    pub number: u64,
    pub title: String,
    pub comments: Vec<Comment>,
}

/// Fetch up to `limit` most-recently-updated PRs and mine their comments.
///
/// A paging failure aborts the pass and returns whatever was accumulated as
/// `Partial`; the PR/comment counters then reflect what was actually scanned.
#[instrument(skip_all, fields(repo = %repo))]
pub async fn mine_pull_comments(
    host: &dyn RepoHost,
    repo: &str,
    catalogs: &Catalogs,
    limit: u32,
) -> Collected<CommentMiningSummary> {
    let pulls = match host.recent_pulls(repo, limit).await {
        Ok(pulls) => pulls,
        Err(e) => {
            warn!(error = %e, "PR listing failed");
            return Collected::Unavailable;
        }
    };

    let mut threads = Vec::new();
    for pr in pulls.iter().take(limit as usize) {
        match host.pull_comments(repo, pr.number).await {
            Ok(comments) => threads.push(PullThread {
                number: pr.number,
                title: pr.title.clone(),
                comments,
            }),
            Err(e) => {
                warn!(pr = pr.number, error = %e, "Comment paging failed, keeping partial scan");
                return Collected::Partial {
                    data: mine_threads(&threads, catalogs),
                };
            }
        }
    }

    let summary = mine_threads(&threads, catalogs);
    debug!(
        prs = summary.prs_scanned,
        comments = summary.comments_scanned,
        "Comment mining complete"
    );
    Collected::Complete { data: summary }
}

/// Mine an ordered set of comment threads against the three catalogs.
///
/// Matching is first-match-wins per category per comment: a comment
/// containing several trigger phrases of one category contributes exactly
/// one signal for it. Null bodies count as scanned but never match.
pub fn mine_threads(threads: &[PullThread], catalogs: &Catalogs) -> CommentMiningSummary {
    let mut summary = CommentMiningSummary::default();
    let mut frequency: HashMap<&'static str, u32> = HashMap::new();

    for thread in threads {
        summary.prs_scanned += 1;
        for comment in &thread.comments {
            summary.comments_scanned += 1;
            let body = comment.body.as_deref().unwrap_or("");

            for (catalog, bucket) in [
                (&catalogs.confusion, &mut summary.confusion),
                (&catalogs.tech_debt, &mut summary.tech_debt),
                (&catalogs.fragility, &mut summary.fragility),
            ] {
                if let Some(pattern) = catalog.first_match(body) {
                    *frequency.entry(pattern).or_insert(0) += 1;
                    bucket.push(Signal::new(
                        format!("PR#{}", thread.number),
                        thread.title.clone(),
                        pattern,
                        catalog.name(),
                        body,
                    ));
                }
            }
        }
    }

    summary.top_patterns = top_patterns(&frequency, 10);
    summary
}

/// Sort the combined frequency table descending by count (pattern name
/// breaks ties for determinism) and truncate.
fn top_patterns(frequency: &HashMap<&'static str, u32>, keep: usize) -> Vec<PatternCount> {
    let mut entries: Vec<PatternCount> = frequency
        .iter()
        .map(|(pattern, count)| PatternCount {
            pattern: (*pattern).to_string(),
            count: *count,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then(a.pattern.cmp(&b.pattern)));
    entries.truncate(keep);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread(number: u64, bodies: &[Option<&str>]) -> PullThread {
        PullThread {
            number,
            title: format!("PR {number}"),
            comments: bodies
                .iter()
                .map(|b| Comment {
                    author: None,
                    body: b.map(String::from),
                })
                .collect(),
        }
    }

    #[test]
    fn clean_comments_yield_no_signals() {
        let threads = vec![thread(1, &[Some("looks good"), Some("ship it")])];
        let summary = mine_threads(&threads, &Catalogs::builtin());
        assert!(summary.confusion.is_empty());
        assert!(summary.tech_debt.is_empty());
        assert!(summary.fragility.is_empty());
        assert_eq!(summary.prs_scanned, 1);
        assert_eq!(summary.comments_scanned, 2);
    }

    #[test]
    fn first_match_wins_within_category() {
        // Both "workaround" and "hack" are tech-debt triggers.
        let threads = vec![thread(7, &[Some("this hack is a workaround for the API")])];
        let summary = mine_threads(&threads, &Catalogs::builtin());
        assert_eq!(summary.tech_debt.len(), 1);
        assert_eq!(summary.tech_debt[0].matched_pattern, "workaround");
        assert_eq!(summary.tech_debt[0].source_id, "PR#7");
    }

    #[test]
    fn one_comment_can_hit_multiple_categories() {
        let threads = vec![thread(
            2,
            &[Some("not sure why this fragile hack is needed")],
        )];
        let summary = mine_threads(&threads, &Catalogs::builtin());
        assert_eq!(summary.confusion.len(), 1);
        assert_eq!(summary.tech_debt.len(), 1);
        assert_eq!(summary.fragility.len(), 1);
    }

    #[test]
    fn null_bodies_count_as_scanned_without_matching() {
        let threads = vec![thread(3, &[None, None, Some("hack")])];
        let summary = mine_threads(&threads, &Catalogs::builtin());
        assert_eq!(summary.comments_scanned, 3);
        assert_eq!(summary.tech_debt.len(), 1);
    }

    #[test]
    fn frequency_table_is_sorted_and_truncated() {
        let mut bodies = Vec::new();
        for _ in 0..3 {
            bodies.push(Some("total hack"));
        }
        bodies.push(Some("fragile stuff"));
        let threads = vec![thread(4, &bodies)];
        let summary = mine_threads(&threads, &Catalogs::builtin());

        assert!(summary.top_patterns.len() <= 10);
        assert_eq!(summary.top_patterns[0].pattern, "hack");
        assert_eq!(summary.top_patterns[0].count, 3);
    }

    #[test]
    fn empty_input_is_all_zero() {
        let summary = mine_threads(&[], &Catalogs::builtin());
        assert_eq!(summary.prs_scanned, 0);
        assert_eq!(summary.comments_scanned, 0);
        assert!(summary.top_patterns.is_empty());
    }
}
