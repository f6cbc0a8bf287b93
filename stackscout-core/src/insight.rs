//! Insight synthesis: threshold rules over the collected sub-results.
//
// Fraction thresholds intentionally cast int→float.
#![allow(clippy::cast_precision_loss)]

use crate::types::{
    CiSummary, CommitStats, Complexity, FearSummary, Insight, Severity, ShadowSummary,
};

/// Revert fraction above this fires the high-severity stability insight.
const REVERT_RATE_THRESHOLD: f64 = 0.03;
/// Friday fraction below this suggests deploy avoidance.
const FRIDAY_RATE_FLOOR: f64 = 0.05;
/// Weekend fraction above this suggests off-hours firefighting.
const WEEKEND_RATE_THRESHOLD: f64 = 0.15;
/// Mean commit-message length below this flags terse history.
const MESSAGE_LENGTH_FLOOR: f64 = 20.0;
/// Total fear hits above this fires the repository-level fear insight.
const FEAR_HIT_THRESHOLD: u32 = 5;
/// Average workflow duration above this (minutes) is slow.
const SLOW_WORKFLOW_MINUTES: f64 = 15.0;
/// Failure rate above this is flaky.
const FLAKY_FAILURE_RATE: f64 = 0.20;
/// Compose service count above this makes local dev complex.
const COMPOSE_SERVICE_THRESHOLD: usize = 3;

/// One repository's sub-results, as available.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsightInputs<'a> {
    pub shadow: Option<&'a ShadowSummary>,
    pub commits: Option<&'a CommitStats>,
    pub fear: Option<&'a FearSummary>,
    pub ci: Option<&'a CiSummary>,
}

/// Apply every rule independently, in declaration order. No rule suppresses
/// another; unavailable sub-results simply skip their rules.
pub fn synthesize_insights(inputs: &InsightInputs<'_>) -> Vec<Insight> {
    let mut insights = Vec::new();

    if let Some(shadow) = inputs.shadow {
        shadow_rules(shadow, &mut insights);
    }
    if let Some(commits) = inputs.commits {
        commit_rules(commits, &mut insights);
    }
    if let Some(fear) = inputs.fear {
        fear_rules(fear, &mut insights);
    }
    if let Some(ci) = inputs.ci {
        ci_rules(ci, &mut insights);
    }

    insights
}

fn shadow_rules(shadow: &ShadowSummary, insights: &mut Vec<Insight>) {
    if shadow
        .build_file
        .as_ref()
        .is_some_and(|b| b.has_deploy_target)
    {
        insights.push(insight(
            "deployment",
            "manual_deployment_detected",
            Severity::Medium,
            "Build file defines a deploy target; deployments appear to be run by hand",
            "Move deployment into CI so releases are repeatable and audited",
        ));
    }

    if let Some(scripts) = &shadow.scripts {
        if scripts.has_fast_test_variant {
            insights.push(insight(
                "testing",
                "slow_tests",
                Severity::Medium,
                "A fast/quick test script exists, suggesting the full suite is too slow to run routinely",
                "Profile the slowest tests and bring the full suite under a few minutes",
            ));
        }
        if scripts.has_postinstall_hook {
            insights.push(insight(
                "dependencies",
                "postinstall_patches",
                Severity::High,
                "A postinstall hook patches dependencies after install",
                "Upstream the patches or pin forked packages instead of patching at install time",
            ));
        }
    }

    if let Some(env) = &shadow.env {
        if env.complexity == Complexity::High {
            insights.push(insight(
                "configuration",
                "high_config_complexity",
                Severity::Medium,
                &format!(
                    "{} environment variables are required to run this service",
                    env.variables.len()
                ),
                "Group settings into profiles and document which are truly required",
            ));
        }
        if !env.red_flags.is_empty() {
            insights.push(insight(
                "configuration",
                "config_red_flags",
                Severity::High,
                &format!(
                    "Suspicious environment variable names: {}",
                    env.red_flags.join(", ")
                ),
                "Rename or remove variables that encode warnings in their names; document the real constraint",
            ));
        }
    }

    if !shadow.workaround_scripts.is_empty() {
        insights.push(insight(
            "process",
            "workaround_scripts_found",
            Severity::Medium,
            &format!(
                "{} shell script(s) look like ad hoc workarounds",
                shadow.workaround_scripts.len()
            ),
            "Fold one-off scripts into the build file or delete them once the underlying issue is fixed",
        ));
    }

    if shadow
        .compose
        .as_ref()
        .is_some_and(|c| c.services.len() > COMPOSE_SERVICE_THRESHOLD)
    {
        let count = shadow.compose.as_ref().map_or(0, |c| c.services.len());
        insights.push(insight(
            "local_dev",
            "complex_local_dev",
            Severity::Medium,
            &format!("Local development requires {count} services"),
            "Provide a slim default profile; start heavyweight services on demand",
        ));
    }

    if shadow.hidden_deps.total > 0 {
        insights.push(insight(
            "dependencies",
            "hardcoded_dependencies",
            Severity::Medium,
            &format!(
                "{} hardcoded endpoint(s) found in stack files ({} IPs, {} URLs)",
                shadow.hidden_deps.total,
                shadow.hidden_deps.hardcoded_ips,
                shadow.hidden_deps.hardcoded_urls
            ),
            "Move endpoints into configuration so environments stay interchangeable",
        ));
    }
}

fn commit_rules(commits: &CommitStats, insights: &mut Vec<Insight>) {
    if commits.total_commits == 0 {
        return;
    }
    let total = f64::from(commits.total_commits);

    let revert_rate = commits.reverts.len() as f64 / total;
    if revert_rate > REVERT_RATE_THRESHOLD {
        insights.push(insight(
            "stability",
            "high_revert_rate",
            Severity::High,
            &format!(
                "{:.1}% of recent commits are reverts or rollbacks ({} of {})",
                revert_rate * 100.0,
                commits.reverts.len(),
                commits.total_commits
            ),
            "Investigate why changes keep getting rolled back; strengthen pre-merge verification",
        ));
    }

    let friday_rate = f64::from(commits.friday_commits) / total;
    if friday_rate < FRIDAY_RATE_FLOOR {
        insights.push(insight(
            "deployment",
            "deploy_avoidance",
            Severity::Medium,
            &format!(
                "Only {:.1}% of commits land on Fridays; the team avoids shipping before weekends",
                friday_rate * 100.0
            ),
            "Treat deploy confidence as the real problem: better rollbacks and smoke tests",
        ));
    }

    let weekend_rate = f64::from(commits.weekend_commits) / total;
    if weekend_rate > WEEKEND_RATE_THRESHOLD {
        insights.push(insight(
            "work_patterns",
            "weekend_work",
            Severity::Medium,
            &format!(
                "{:.1}% of commits land on weekends",
                weekend_rate * 100.0
            ),
            "Check whether weekend commits are firefighting; fix the sources of pages",
        ));
    }

    if commits.mean_message_length < MESSAGE_LENGTH_FLOOR {
        insights.push(insight(
            "hygiene",
            "terse_commit_messages",
            Severity::Low,
            &format!(
                "Mean commit message length is {:.0} characters",
                commits.mean_message_length
            ),
            "Encourage messages that explain why, not just what",
        ));
    }
}

fn fear_rules(fear: &FearSummary, insights: &mut Vec<Insight>) {
    if fear.total_hits > FEAR_HIT_THRESHOLD {
        insights.push(insight(
            "fear",
            "high_fear_signals",
            Severity::High,
            &format!(
                "{} warning markers (DO NOT TOUCH, FRAGILE, ...) found in the tree",
                fear.total_hits
            ),
            "Each marker is a missing test or a missing doc; schedule them for conversion",
        ));
    }
}

fn ci_rules(ci: &CiSummary, insights: &mut Vec<Insight>) {
    for workflow in &ci.workflows {
        if workflow
            .avg_duration_mins
            .is_some_and(|m| m > SLOW_WORKFLOW_MINUTES)
        {
            insights.push(insight(
                "ci",
                "slow_ci_workflow",
                Severity::Medium,
                &format!(
                    "Workflow '{}' averages {:.1} minutes per run",
                    workflow.name,
                    workflow.avg_duration_mins.unwrap_or_default()
                ),
                "Cache dependencies and split the workflow into parallel jobs",
            ));
        }
        if workflow.runs_sampled > 0 && workflow.failure_rate > FLAKY_FAILURE_RATE {
            insights.push(insight(
                "ci",
                "flaky_ci_workflow",
                Severity::High,
                &format!(
                    "Workflow '{}' failed {:.0}% of its recent runs",
                    workflow.name,
                    workflow.failure_rate * 100.0
                ),
                "Quarantine flaky tests and make the workflow a trustworthy gate again",
            ));
        }
    }
}

fn insight(
    category: &str,
    issue_code: &str,
    severity: Severity,
    description: &str,
    suggestion: &str,
) -> Insight {
    Insight {
        category: category.to_string(),
        issue_code: issue_code.to_string(),
        severity,
        description: description.to_string(),
        suggestion: suggestion.to_string(),
    }
}
