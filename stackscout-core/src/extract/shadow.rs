//! Shadow infrastructure scan: build files, script manifests, env templates,
//! loose shell scripts, and compose manifests.
//!
//! All parsing is deliberately line-heuristic, not grammar-driven; the point
//! is behavioral signal, not correctness.

use std::collections::BTreeMap;

use tracing::{instrument, warn};

use crate::catalog::{
    CACHE_SERVICES, COMPOSE_FILES, DATABASE_SERVICES, ENV_BUCKETS, QUEUE_SERVICES,
    SUSPICIOUS_WORDS,
};
use crate::fetch::{DirEntry, EntryKind, RepoHost};
use crate::types::{
    BuildFileSummary, BuildTarget, Collected, Complexity, ComposeSummary, EnvSummary,
    ScriptSummary, ShadowSummary, WorkaroundScript,
};

/// Fetch the local-workflow artifacts and run all sub-parsers.
///
/// Each fetch failure degrades its own sub-result to absent; the bundle is
/// `Partial` when any fetch failed and `Unavailable` only when every fetch
/// failed.
#[instrument(skip_all, fields(repo = %repo))]
pub async fn scan_shadow_infrastructure(
    host: &dyn RepoHost,
    repo: &str,
) -> Collected<ShadowSummary> {
    let mut summary = ShadowSummary::default();
    let mut calls = 0u32;
    let mut failures = 0u32;

    calls += 1;
    match host.file_content(repo, "Makefile").await {
        Ok(content) => summary.build_file = content.map(|f| parse_build_file(&f.content)),
        Err(e) => {
            warn!(error = %e, "Makefile fetch failed");
            failures += 1;
        }
    }

    calls += 1;
    match host.file_content(repo, "package.json").await {
        Ok(content) => summary.scripts = content.and_then(|f| parse_script_manifest(&f.content)),
        Err(e) => {
            warn!(error = %e, "package.json fetch failed");
            failures += 1;
        }
    }

    calls += 1;
    match host.file_content(repo, ".env.example").await {
        Ok(content) => summary.env = content.map(|f| parse_env_template(&f.content)),
        Err(e) => {
            warn!(error = %e, ".env.example fetch failed");
            failures += 1;
        }
    }

    calls += 1;
    let root_entries = match host.list_dir(repo, "").await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "Root listing failed");
            failures += 1;
            Vec::new()
        }
    };

    calls += 1;
    let script_entries = match host.list_dir(repo, "scripts").await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "scripts/ listing failed");
            failures += 1;
            Vec::new()
        }
    };
    summary.workaround_scripts = classify_shell_scripts(&root_entries, &script_entries);

    let mut compose_texts = Vec::new();
    for name in COMPOSE_FILES {
        calls += 1;
        match host.file_content(repo, name).await {
            Ok(Some(f)) => compose_texts.push(f.content),
            Ok(None) => {}
            Err(e) => {
                warn!(file = name, error = %e, "Compose fetch failed");
                failures += 1;
            }
        }
    }
    if !compose_texts.is_empty() {
        summary.compose = Some(parse_compose_manifests(&compose_texts));
    }

    if failures == 0 {
        Collected::Complete { data: summary }
    } else if failures < calls {
        Collected::Partial { data: summary }
    } else {
        Collected::Unavailable
    }
}

// ── Build file ──────────────────────────────────────────────────────

/// Parse a Makefile-style build file.
///
/// A line is a target when it does not start with a tab, is not a comment,
/// and contains a colon; tab lines attach to the most recent target as
/// commands, with echo/comment commands dropped and a leading `@` stripped.
pub fn parse_build_file(text: &str) -> BuildFileSummary {
    let mut summary = BuildFileSummary::default();

    for line in text.lines() {
        if line.starts_with('\t') {
            let Some(target) = summary.targets.last_mut() else {
                continue;
            };
            let command = line.trim_start_matches('\t').trim();
            let command = command.strip_prefix('@').unwrap_or(command).trim_start();
            if command.is_empty() || command.starts_with("echo") || command.starts_with('#') {
                continue;
            }
            target.commands.push(command.to_string());
        } else {
            let trimmed = line.trim();
            if trimmed.starts_with('#') {
                continue;
            }
            let Some((name, _)) = trimmed.split_once(':') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            summary.targets.push(BuildTarget {
                name: name.to_string(),
                commands: Vec::new(),
            });
        }
    }

    summary.has_deploy_target = summary.targets.iter().any(|t| t.name.contains("deploy"));
    summary.has_test_target = summary.targets.iter().any(|t| t.name.contains("test"));
    summary.uses_docker = summary
        .targets
        .iter()
        .flat_map(|t| &t.commands)
        .any(|c| c.contains("docker"));
    summary
}

// ── Script manifest ─────────────────────────────────────────────────

/// Parse the `scripts` map of a package.json; malformed JSON is treated the
/// same as an absent file.
pub fn parse_script_manifest(text: &str) -> Option<ScriptSummary> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let scripts: BTreeMap<String, String> = value
        .get("scripts")?
        .as_object()?
        .iter()
        .filter_map(|(k, v)| Some((k.clone(), v.as_str()?.to_string())))
        .collect();

    let names: Vec<&str> = scripts.keys().map(String::as_str).collect();
    let has = |needle: &str| names.iter().any(|n| n.contains(needle));

    Some(ScriptSummary {
        has_fast_test_variant: names
            .iter()
            .any(|n| n.contains("test") && (n.contains("fast") || n.contains("quick"))),
        has_debug_script: has("debug"),
        has_docker_script: has("docker"),
        has_deploy_script: has("deploy"),
        has_postinstall_hook: names.contains(&"postinstall"),
        scripts,
    })
}

// ── Env template ────────────────────────────────────────────────────

/// Parse a `.env` template into variables, red flags, and buckets.
pub fn parse_env_template(text: &str) -> EnvSummary {
    let mut summary = EnvSummary::default();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((key, _)) = trimmed.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        let lower = key.to_lowercase();
        if SUSPICIOUS_WORDS.iter().any(|w| lower.contains(w)) {
            summary.red_flags.push(key.to_string());
        }
        for (bucket, needles) in ENV_BUCKETS {
            if needles.iter().any(|n| lower.contains(n)) {
                summary
                    .buckets
                    .entry((*bucket).to_string())
                    .or_default()
                    .push(key.to_string());
            }
        }
        summary.variables.push(key.to_string());
    }

    summary.complexity = env_complexity(summary.variables.len());
    summary
}

/// Variable-count thresholds: `<5` low, `<15` medium, else high.
fn env_complexity(count: usize) -> Complexity {
    if count < 5 {
        Complexity::Low
    } else if count < 15 {
        Complexity::Medium
    } else {
        Complexity::High
    }
}

// ── Shell inventory ─────────────────────────────────────────────────

/// Flag loose shell scripts: any `.sh` directly in the repository root is a
/// candidate workaround; `.sh` files under `scripts/` are flagged only when
/// the filename matches the suspicious-word list.
pub fn classify_shell_scripts(
    root_entries: &[DirEntry],
    script_entries: &[DirEntry],
) -> Vec<WorkaroundScript> {
    let mut flagged = Vec::new();

    for entry in root_entries {
        if entry.kind == EntryKind::File && entry.name.ends_with(".sh") {
            flagged.push(WorkaroundScript {
                path: entry.path.clone(),
                reason: "root_level".to_string(),
            });
        }
    }

    for entry in script_entries {
        if entry.kind != EntryKind::File || !entry.name.ends_with(".sh") {
            continue;
        }
        let lower = entry.name.to_lowercase();
        if SUSPICIOUS_WORDS.iter().any(|w| lower.contains(w)) {
            flagged.push(WorkaroundScript {
                path: entry.path.clone(),
                reason: "suspicious_name".to_string(),
            });
        }
    }

    flagged
}

// ── Compose manifests ───────────────────────────────────────────────

/// Collect service names across every found compose manifest and derive the
/// stack booleans and complexity class.
pub fn parse_compose_manifests(texts: &[String]) -> ComposeSummary {
    let mut services: Vec<String> = Vec::new();

    for text in texts {
        for name in scan_services_block(text) {
            if !services.contains(&name) {
                services.push(name);
            }
        }
    }

    let joined = services.join(" ").to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| joined.contains(n));

    ComposeSummary {
        has_database: has(DATABASE_SERVICES),
        has_cache: has(CACHE_SERVICES),
        has_queue: has(QUEUE_SERVICES),
        complexity: compose_complexity(services.len()),
        services,
    }
}

/// Scan one manifest for the `services:` block; the block ends at a
/// top-level `volumes:` or `networks:` key. Child keys indented by one or
/// two spaces are service names; deeper lines belong to a service body.
fn scan_services_block(text: &str) -> Vec<String> {
    let mut services = Vec::new();
    let mut in_services = false;

    for line in text.lines() {
        let trimmed = line.trim_end();
        if trimmed.trim_start().starts_with('#') || trimmed.is_empty() {
            continue;
        }

        if trimmed == "services:" {
            in_services = true;
            continue;
        }
        if trimmed == "volumes:" || trimmed == "networks:" {
            in_services = false;
            continue;
        }
        if !in_services {
            continue;
        }

        let indent = trimmed.len() - trimmed.trim_start().len();
        if indent == 0 {
            // Another top-level key ends the block too.
            in_services = false;
            continue;
        }
        if indent <= 2 {
            if let Some(name) = trimmed.trim().strip_suffix(':') {
                if !name.is_empty() && !name.contains(' ') {
                    services.push(name.to_string());
                }
            }
        }
    }

    services
}

/// Service-count thresholds: `≤2` low, `≤4` medium, else high.
fn compose_complexity(count: usize) -> Complexity {
    if count <= 2 {
        Complexity::Low
    } else if count <= 4 {
        Complexity::Medium
    } else {
        Complexity::High
    }
}
