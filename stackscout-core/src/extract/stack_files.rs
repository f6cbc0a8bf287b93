//! Critical stack-file retrieval and repository structure flags.

use std::collections::BTreeMap;

use tracing::{debug, instrument, warn};

use crate::catalog::{CRITICAL_FILES, K8S_DIRS};
use crate::fetch::{DirEntry, EntryKind, FileContent, RepoHost, RepoInfo};
use crate::types::{CriticalFile, CriticalFileEntry, RepoMetadata, StructureFlags};

const TEST_DIRS: &[&str] = &["test", "tests", "__tests__", "spec"];
const DOC_DIRS: &[&str] = &["docs", "documentation"];
const CI_DIRS: &[&str] = &[".github", ".gitlab", ".circleci"];
const IAC_DIRS: &[&str] = &["terraform", "k8s", "kubernetes"];

/// Assemble the metadata block from the listing entry plus the language
/// breakdown (which degrades to empty on fetch failure).
pub async fn build_metadata(host: &dyn RepoHost, info: &RepoInfo) -> RepoMetadata {
    let languages = match host.languages(&info.full_name).await {
        Ok(languages) => languages,
        Err(e) => {
            warn!(repo = %info.full_name, error = %e, "Language breakdown fetch failed");
            BTreeMap::new()
        }
    };

    RepoMetadata {
        name: info.name.clone(),
        full_name: info.full_name.clone(),
        description: info.description.clone(),
        url: info.url.clone(),
        language: info.language.clone(),
        languages,
        size_kb: info.size_kb,
        stars: info.stars,
        forks: info.forks,
        open_issues: info.open_issues,
        created_at: info.created_at,
        updated_at: info.updated_at,
        pushed_at: info.pushed_at,
        default_branch: info.default_branch.clone(),
        archived: info.archived,
        topics: info.topics.clone(),
    }
}

/// Fetch every critical file that exists, keyed by stack-file category.
///
/// Workflow, terraform, and k8s manifests are collected as sets under their
/// own categories. Every fetch failure degrades that one entry to absent.
#[instrument(skip_all, fields(repo = %repo))]
pub async fn fetch_critical_files(
    host: &dyn RepoHost,
    repo: &str,
) -> BTreeMap<String, CriticalFileEntry> {
    let mut files = BTreeMap::new();

    for (path, category) in CRITICAL_FILES {
        match host.file_content(repo, path).await {
            Ok(Some(f)) => {
                files.insert(
                    (*category).to_string(),
                    CriticalFileEntry::Single(to_critical(f)),
                );
            }
            Ok(None) => {}
            Err(e) => warn!(path, error = %e, "Critical file fetch failed"),
        }
    }

    let workflows = fetch_manifest_set(host, repo, &[".github/workflows"]).await;
    if !workflows.is_empty() {
        files.insert(
            "github_actions".to_string(),
            CriticalFileEntry::Many(workflows),
        );
    }

    let terraform = fetch_root_terraform(host, repo).await;
    if !terraform.is_empty() {
        files.insert("terraform_all".to_string(), CriticalFileEntry::Many(terraform));
    }

    let k8s = fetch_manifest_set(host, repo, K8S_DIRS).await;
    if !k8s.is_empty() {
        files.insert("k8s_all".to_string(), CriticalFileEntry::Many(k8s));
    }

    debug!(categories = files.len(), "Critical files fetched");
    files
}

/// Collect `.yml`/`.yaml` files from a set of candidate directories.
async fn fetch_manifest_set(
    host: &dyn RepoHost,
    repo: &str,
    dirs: &[&str],
) -> Vec<CriticalFile> {
    let mut found = Vec::new();

    for dir in dirs {
        let entries = match host.list_dir(repo, dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir, error = %e, "Manifest directory listing failed");
                continue;
            }
        };

        for entry in entries {
            if entry.kind != EntryKind::File || !is_yaml(&entry.name) {
                continue;
            }
            match host.file_content(repo, &entry.path).await {
                Ok(Some(f)) => found.push(to_critical(f)),
                Ok(None) => {}
                Err(e) => warn!(path = %entry.path, error = %e, "Manifest fetch failed"),
            }
        }
    }

    found
}

/// Collect `*.tf` files from the repository root.
async fn fetch_root_terraform(host: &dyn RepoHost, repo: &str) -> Vec<CriticalFile> {
    let entries = match host.list_dir(repo, "").await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "Root listing failed for terraform scan");
            return Vec::new();
        }
    };

    let mut found = Vec::new();
    for entry in entries {
        if entry.kind != EntryKind::File || !entry.name.ends_with(".tf") {
            continue;
        }
        match host.file_content(repo, &entry.path).await {
            Ok(Some(f)) => found.push(to_critical(f)),
            Ok(None) => {}
            Err(e) => warn!(path = %entry.path, error = %e, "Terraform file fetch failed"),
        }
    }
    found
}

/// Derive top-level structure flags from the root listing; a failed listing
/// degrades to all-false.
#[instrument(skip_all, fields(repo = %repo))]
pub async fn scan_structure(host: &dyn RepoHost, repo: &str) -> StructureFlags {
    let entries = match host.list_dir(repo, "").await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "Root listing failed for structure scan");
            return StructureFlags::default();
        }
    };
    classify_structure(&entries)
}

/// Pure classification of a root directory listing.
pub fn classify_structure(entries: &[DirEntry]) -> StructureFlags {
    let mut flags = StructureFlags::default();

    for entry in entries {
        match entry.kind {
            EntryKind::Dir => {
                flags.directories.push(entry.name.clone());
                let name = entry.name.as_str();
                if TEST_DIRS.contains(&name) {
                    flags.has_tests = true;
                }
                if DOC_DIRS.contains(&name) {
                    flags.has_docs = true;
                }
                if CI_DIRS.contains(&name) {
                    flags.has_ci = true;
                }
                if IAC_DIRS.contains(&name) {
                    flags.has_iac = true;
                }
            }
            EntryKind::File => {
                if entry.name == "Dockerfile" {
                    flags.has_docker = true;
                }
            }
        }
    }

    flags
}

fn to_critical(f: FileContent) -> CriticalFile {
    CriticalFile {
        path: f.path,
        content: f.content,
        size: f.size,
    }
}

fn is_yaml(name: &str) -> bool {
    name.ends_with(".yml") || name.ends_with(".yaml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir(name: &str) -> DirEntry {
        DirEntry {
            name: name.to_string(),
            path: name.to_string(),
            kind: EntryKind::Dir,
        }
    }

    fn file(name: &str) -> DirEntry {
        DirEntry {
            name: name.to_string(),
            path: name.to_string(),
            kind: EntryKind::File,
        }
    }

    #[test]
    fn structure_flags_from_listing() {
        let entries = vec![
            dir("src"),
            dir("tests"),
            dir(".github"),
            dir("terraform"),
            file("Dockerfile"),
            file("README.md"),
        ];
        let flags = classify_structure(&entries);
        assert!(flags.has_tests);
        assert!(flags.has_ci);
        assert!(flags.has_iac);
        assert!(flags.has_docker);
        assert!(!flags.has_docs);
        assert_eq!(
            flags.directories,
            vec!["src", "tests", ".github", "terraform"]
        );
    }

    #[test]
    fn empty_listing_is_all_false() {
        let flags = classify_structure(&[]);
        assert!(!flags.has_tests);
        assert!(flags.directories.is_empty());
    }

    #[test]
    fn yaml_detection() {
        assert!(is_yaml("ci.yml"));
        assert!(is_yaml("deploy.yaml"));
        assert!(!is_yaml("ci.yml.bak"));
        assert!(!is_yaml("Jenkinsfile"));
    }
}
