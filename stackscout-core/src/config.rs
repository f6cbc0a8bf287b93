use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level Stackscout configuration, matching `stackscout.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoutConfig {
    #[serde(default)]
    pub github: GithubSection,
    #[serde(default)]
    pub mining: MiningSection,
    #[serde(default)]
    pub output: OutputSection,
}

impl ScoutConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::NotFound(path.display().to_string()))?;
        toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubSection {
    /// Environment variable holding the bearer token.
    pub token_env: String,
    /// REST API base URL; overridable for tests.
    pub api_base: String,
}

impl Default for GithubSection {
    fn default() -> Self {
        Self {
            token_env: "GITHUB_TOKEN".to_string(),
            api_base: "https://api.github.com".to_string(),
        }
    }
}

/// Iteration caps for the mining passes. These are implicit circuit breakers
/// against unbounded API consumption, not timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningSection {
    pub max_pull_requests: u32,
    pub max_commits: u32,
    pub max_search_hits_per_keyword: u32,
    pub max_workflows: u32,
    pub max_runs_per_workflow: u32,
}

impl Default for MiningSection {
    fn default() -> Self {
        Self {
            max_pull_requests: 100,
            max_commits: 200,
            max_search_hits_per_keyword: 10,
            max_workflows: 5,
            max_runs_per_workflow: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Directory for `<repo>.json` files and `summary.json`.
    pub directory: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            directory: "output".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_mining_caps() {
        let config = ScoutConfig::default();
        assert_eq!(config.mining.max_pull_requests, 100);
        assert_eq!(config.mining.max_commits, 200);
        assert_eq!(config.mining.max_search_hits_per_keyword, 10);
        assert_eq!(config.mining.max_workflows, 5);
        assert_eq!(config.mining.max_runs_per_workflow, 10);
        assert_eq!(config.github.token_env, "GITHUB_TOKEN");
        assert_eq!(config.output.directory, "output");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: ScoutConfig = toml::from_str("[mining]\nmax_commits = 50\n").unwrap();
        assert_eq!(config.mining.max_commits, 50);
        assert_eq!(config.mining.max_pull_requests, 100);
        assert_eq!(config.github.api_base, "https://api.github.com");
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let err = ScoutConfig::load(Path::new("/nonexistent/stackscout.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
