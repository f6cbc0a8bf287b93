//! Report writing: one JSON document per repository plus the org summary.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::error::{ReportError, Result};
use crate::types::{OrgSummary, RepositoryReport};

/// Writes pretty-printed JSON documents under a single output directory.
#[derive(Debug)]
pub struct ReportWriter {
    directory: PathBuf,
}

impl ReportWriter {
    /// Create the output directory (and parents) if missing.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory).map_err(ReportError::Io)?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write `<repo-name>.json`. Existing files are overwritten.
    #[instrument(skip_all, fields(repo = %name))]
    pub fn write_repo(&self, name: &str, report: &RepositoryReport) -> Result<PathBuf> {
        let path = self.directory.join(format!("{name}.json"));
        self.write_json(&path, report)?;
        info!(path = %path.display(), "Repository report written");
        Ok(path)
    }

    /// Write the org-level `summary.json`.
    pub fn write_summary(&self, summary: &OrgSummary) -> Result<PathBuf> {
        let path = self.directory.join("summary.json");
        self.write_json(&path, summary)?;
        info!(path = %path.display(), repos = summary.repos_ingested, "Summary written");
        Ok(path)
    }

    fn write_json<T: serde::Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(ReportError::Serialization)?;
        std::fs::write(path, json).map_err(ReportError::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Collected, OrgSummary, RepoMetadata, StructureFlags};
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn minimal_report() -> RepositoryReport {
        RepositoryReport {
            metadata: RepoMetadata {
                name: "widgets".to_string(),
                full_name: "acme/widgets".to_string(),
                ..RepoMetadata::default()
            },
            files: BTreeMap::new(),
            structure: StructureFlags::default(),
            comment_mining: Collected::Unavailable,
            shadow_infrastructure: Collected::Unavailable,
            commit_patterns: Collected::Unavailable,
            fear_signals: Collected::Unavailable,
            ci_performance: Collected::Unavailable,
            insights: Vec::new(),
            ingested_at: Utc::now(),
        }
    }

    #[test]
    fn writes_repo_report_as_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("out")).unwrap();

        let path = writer.write_repo("widgets", &minimal_report()).unwrap();
        assert_eq!(path.file_name().unwrap(), "widgets.json");

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["metadata"]["full_name"], "acme/widgets");
        assert_eq!(parsed["fear_signals"]["status"], "unavailable");
    }

    #[test]
    fn writes_summary_with_repo_list() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path()).unwrap();

        let summary = OrgSummary {
            org: "acme".to_string(),
            repos_ingested: 2,
            timestamp: Utc::now(),
            repos: vec!["widgets".to_string(), "gadgets".to_string()],
        };
        let path = writer.write_summary(&summary).unwrap();
        assert_eq!(path.file_name().unwrap(), "summary.json");

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed["org"], "acme");
        assert_eq!(parsed["repos_ingested"], 2);
    }

    #[test]
    fn overwrites_existing_report() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path()).unwrap();

        writer.write_repo("widgets", &minimal_report()).unwrap();
        let mut second = minimal_report();
        second.metadata.description = Some("updated".to_string());
        let path = writer.write_repo("widgets", &second).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed["metadata"]["description"], "updated");
    }

    #[test]
    fn creates_nested_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let writer = ReportWriter::new(&nested).unwrap();
        assert!(writer.directory().exists());
    }
}
