//! Commit archaeology: when work happens and how often it gets rolled back.
//
// Statistical computations intentionally cast int→float.
#![allow(clippy::cast_precision_loss)]

use chrono::{Datelike, Timelike, Weekday};
use tracing::{instrument, warn};

use crate::catalog::PatternCatalog;
use crate::fetch::{CommitInfo, RepoHost};
use crate::types::{Collected, CommitStats, RevertCommit};

/// Fetch up to `limit` recent commits and compute history statistics.
#[instrument(skip_all, fields(repo = %repo))]
pub async fn dig_commit_history(
    host: &dyn RepoHost,
    repo: &str,
    reverts: &PatternCatalog,
    limit: u32,
) -> Collected<CommitStats> {
    match host.recent_commits(repo, limit).await {
        Ok(commits) => Collected::Complete {
            data: analyze_commits(&commits, reverts),
        },
        Err(e) => {
            warn!(error = %e, "Commit listing failed");
            Collected::Unavailable
        }
    }
}

/// Compute weekday/hour histograms, the revert subsequence, Friday and
/// weekend counts, and mean message length. Commits without an author
/// timestamp count toward totals and message stats but not the histograms.
pub fn analyze_commits(commits: &[CommitInfo], reverts: &PatternCatalog) -> CommitStats {
    let mut stats = CommitStats {
        total_commits: commits.len() as u32,
        ..CommitStats::default()
    };

    let mut message_chars = 0usize;

    for commit in commits {
        message_chars += commit.message.chars().count();

        if let Some(ts) = commit.timestamp {
            let weekday = ts.weekday();
            stats.weekday_histogram[weekday.num_days_from_monday() as usize] += 1;
            stats.hour_histogram[ts.hour() as usize] += 1;
            if weekday == Weekday::Fri {
                stats.friday_commits += 1;
            }
            if matches!(weekday, Weekday::Sat | Weekday::Sun) {
                stats.weekend_commits += 1;
            }
        }

        if reverts.first_match(&commit.message).is_some() {
            stats.reverts.push(RevertCommit {
                sha: commit.sha.chars().take(7).collect(),
                summary: commit
                    .message
                    .lines()
                    .next()
                    .unwrap_or("")
                    .chars()
                    .take(100)
                    .collect(),
                timestamp: commit.timestamp,
            });
        }
    }

    if !commits.is_empty() {
        stats.mean_message_length = message_chars as f64 / commits.len() as f64;
    }

    stats
}
