//! CI performance sampling: failure rates and run durations per workflow.
//
// Statistical computations intentionally cast int→float.
#![allow(clippy::cast_precision_loss)]

use tracing::{instrument, warn};

use crate::fetch::{RepoHost, WorkflowRun};
use crate::types::{CiSummary, Collected, WorkflowStats};

/// Sample up to `max_workflows` workflows with up to `max_runs` recent runs
/// each.
///
/// A failed run listing skips that workflow and marks the bundle `Partial`;
/// a failed workflow listing yields `Unavailable`.
#[instrument(skip_all, fields(repo = %repo))]
pub async fn sample_ci_performance(
    host: &dyn RepoHost,
    repo: &str,
    max_workflows: u32,
    max_runs: u32,
) -> Collected<CiSummary> {
    let workflows = match host.list_workflows(repo, max_workflows).await {
        Ok(w) => w,
        Err(e) => {
            warn!(error = %e, "Workflow listing failed");
            return Collected::Unavailable;
        }
    };

    let mut summary = CiSummary::default();
    let mut failures = 0u32;

    for workflow in workflows.iter().take(max_workflows as usize) {
        match host.workflow_runs(repo, workflow.id, max_runs).await {
            Ok(runs) => summary
                .workflows
                .push(summarize_runs(&workflow.name, &runs)),
            Err(e) => {
                warn!(workflow = %workflow.name, error = %e, "Run listing failed");
                failures += 1;
            }
        }
    }

    if failures == 0 {
        Collected::Complete { data: summary }
    } else {
        Collected::Partial { data: summary }
    }
}

/// Aggregate one workflow's sampled runs.
///
/// Durations come from `(updated - created)` deltas; runs missing either
/// timestamp contribute no duration, and with zero qualifying runs the
/// averages stay absent.
pub fn summarize_runs(name: &str, runs: &[WorkflowRun]) -> WorkflowStats {
    let failures = runs
        .iter()
        .filter(|r| r.conclusion.as_deref() == Some("failure"))
        .count() as u32;

    let durations: Vec<f64> = runs
        .iter()
        .filter_map(|r| {
            let created = r.created_at?;
            let updated = r.updated_at?;
            Some((updated - created).num_seconds() as f64)
        })
        .collect();

    let avg_secs = if durations.is_empty() {
        None
    } else {
        Some(durations.iter().sum::<f64>() / durations.len() as f64)
    };

    let runs_sampled = runs.len() as u32;
    WorkflowStats {
        name: name.to_string(),
        runs_sampled,
        failures,
        failure_rate: if runs_sampled == 0 {
            0.0
        } else {
            f64::from(failures) / f64::from(runs_sampled)
        },
        avg_duration_secs: avg_secs,
        avg_duration_mins: avg_secs.map(|s| s / 60.0),
    }
}
