//! Configuration types and loading for the sync system.
//!
//! The main entry points are [`BeadsConfig`] (per-repo `.beads/config.yaml`-
//! equivalent settings) and [`ServerConfig`] (the `syncd` process's
//! `server.yaml`), both loaded through the same `figment` layering: a YAML
//! file merged with environment overrides.

use std::collections::HashMap;
use std::path::Path;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Layered config extraction failed (bad YAML, type mismatch, etc).
    #[error("failed to load config: {0}")]
    Load(#[from] figment::Error),

    /// The configuration could not be serialized back to YAML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_yaml::Error),

    /// The `.beads/` directory was not found.
    #[error("no .beads directory found (run 'bd init' first)")]
    BeadsDirNotFound,

    /// A configuration value was invalid.
    #[error("invalid configuration value for key '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Conflict policy (SPEC_FULL §4.8 / §6.4)
// ---------------------------------------------------------------------------

/// How the sync orchestrator resolves a field-level conflict between two
/// upstreams. `newest-wins` is the default for file<->beads reconciliation;
/// webhook-originated updates use `upstream-wins` within the fields that
/// upstream owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    #[default]
    NewestWins,
    BeadsWins,
    FileWins,
    UpstreamWins,
}

/// Per-field merge strategy overrides (e.g. `labels` should union rather
/// than take the newest writer's value wholesale).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldStrategy {
    Newest,
    Union,
    Manual,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConflictConfig {
    #[serde(default)]
    pub policy: ConflictPolicy,

    #[serde(default)]
    pub fields: HashMap<String, FieldStrategy>,
}

// ---------------------------------------------------------------------------
// RepoContext (SPEC_FULL §4.1.2 / C10)
// ---------------------------------------------------------------------------

/// Identifies one Coordinator's durable key and upstream binding. Set once
/// per Coordinator instance lifetime (the Attach state resolves it).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoContext {
    pub owner: String,
    pub name: String,

    /// The GitHub App installation id backing this repo, if connected.
    #[serde(default)]
    pub installation_id: Option<String>,

    #[serde(default = "default_branch")]
    pub default_branch: String,

    #[serde(default)]
    pub conflict: ConflictConfig,
}

fn default_branch() -> String {
    "main".to_string()
}

impl RepoContext {
    /// The durable registry key used by the Coordinator registry (`owner/name`).
    pub fn key(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

// ---------------------------------------------------------------------------
// Per-repo config (.beads/config.yaml-equivalent)
// ---------------------------------------------------------------------------

/// Custom issue types/statuses, loaded per repo. Comma-separated in YAML to
/// match the teacher's existing `.beads/config.yaml` convention.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TypesConfig {
    #[serde(default)]
    pub custom: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StatusConfig {
    #[serde(default)]
    pub custom: String,
}

/// The full per-repo configuration, corresponding to `.beads/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BeadsConfig {
    /// Issue ID prefix (e.g., `"bd-"`).
    #[serde(default, rename = "issue-prefix")]
    pub prefix: Option<String>,

    #[serde(default)]
    pub types: TypesConfig,

    #[serde(default)]
    pub status: StatusConfig,

    #[serde(default)]
    pub conflict: ConflictConfig,
}

impl BeadsConfig {
    pub fn custom_types(&self) -> Vec<String> {
        parse_comma_list(&self.types.custom)
    }

    pub fn custom_statuses(&self) -> Vec<String> {
        parse_comma_list(&self.status.custom)
    }
}

fn parse_comma_list(s: &str) -> Vec<String> {
    if s.is_empty() {
        return Vec::new();
    }
    s.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Load `.beads/config.yaml` inside `beads_dir`, layered with any `BEADS_*`
/// environment overrides. A missing file yields the default config.
pub fn load_config(beads_dir: &Path) -> Result<BeadsConfig> {
    let config_path = beads_dir.join("config.yaml");
    if !config_path.exists() {
        return Ok(BeadsConfig::default());
    }

    Figment::new()
        .merge(Yaml::file(&config_path))
        .merge(Env::prefixed("BEADS_"))
        .extract()
        .map_err(ConfigError::from)
}

/// Save configuration to `.beads/config.yaml`, creating the directory if
/// needed.
pub fn save_config(beads_dir: &Path, config: &BeadsConfig) -> Result<()> {
    std::fs::create_dir_all(beads_dir)?;
    let config_path = beads_dir.join("config.yaml");
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(config_path, yaml)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Server config (syncd's server.yaml)
// ---------------------------------------------------------------------------

/// The `syncd` process's own configuration: listen address, webhook secret
/// reference, and the set of repos it coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Name of the environment variable holding the webhook HMAC secret
    /// (never the secret itself -- see C9).
    #[serde(default = "default_webhook_secret_env")]
    pub webhook_secret_env: String,

    #[serde(default)]
    pub repos: Vec<RepoContext>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            webhook_secret_env: default_webhook_secret_env(),
            repos: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8787
}

fn default_webhook_secret_env() -> String {
    "SYNCD_WEBHOOK_SECRET".to_string()
}

/// Load `server.yaml` at `path`, layered with `SYNCD_*` environment
/// overrides. A missing file yields the default config (no configured
/// repos).
pub fn load_server_config(path: &Path) -> Result<ServerConfig> {
    let mut figment = Figment::new();
    if path.exists() {
        figment = figment.merge(Yaml::file(path));
    }
    figment
        .merge(Env::prefixed("SYNCD_"))
        .extract()
        .map_err(ConfigError::from)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_config() {
        let cfg = BeadsConfig::default();
        assert!(cfg.prefix.is_none());
        assert!(cfg.custom_types().is_empty());
        assert!(cfg.custom_statuses().is_empty());
        assert_eq!(cfg.conflict.policy, ConflictPolicy::NewestWins);
    }

    #[test]
    fn load_missing_config_returns_default() {
        let dir = PathBuf::from("/nonexistent/path/.beads");
        let cfg = load_config(&dir).unwrap();
        assert!(cfg.prefix.is_none());
    }

    #[test]
    fn parse_comma_list_trims_and_skips_empty() {
        assert_eq!(parse_comma_list(""), Vec::<String>::new());
        assert_eq!(parse_comma_list("a, b, c"), vec!["a", "b", "c"]);
        assert_eq!(parse_comma_list(",,"), Vec::<String>::new());
    }

    #[test]
    fn roundtrip_config() {
        let dir = tempfile::tempdir().unwrap();
        let beads_dir = dir.path().join(".beads");

        let mut cfg = BeadsConfig::default();
        cfg.prefix = Some("test-".to_string());
        cfg.types.custom = "epic, spike".to_string();

        save_config(&beads_dir, &cfg).unwrap();
        let loaded = load_config(&beads_dir).unwrap();

        assert_eq!(loaded.prefix.as_deref(), Some("test-"));
        assert_eq!(loaded.custom_types(), vec!["epic", "spike"]);
    }

    #[test]
    fn conflict_policy_serializes_to_spec_exact_strings() {
        assert_eq!(serde_yaml::to_string(&ConflictPolicy::NewestWins).unwrap().trim(), "newest-wins");
        assert_eq!(serde_yaml::to_string(&ConflictPolicy::BeadsWins).unwrap().trim(), "beads-wins");
        assert_eq!(serde_yaml::to_string(&ConflictPolicy::FileWins).unwrap().trim(), "file-wins");
        assert_eq!(serde_yaml::to_string(&ConflictPolicy::UpstreamWins).unwrap().trim(), "upstream-wins");
    }

    #[test]
    fn repo_context_key_is_owner_slash_name() {
        let ctx = RepoContext {
            owner: "acme".into(),
            name: "widgets".into(),
            installation_id: None,
            default_branch: default_branch(),
            conflict: ConflictConfig::default(),
        };
        assert_eq!(ctx.key(), "acme/widgets");
    }

    #[test]
    fn server_config_defaults_to_no_repos() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("server.yaml");
        let cfg = load_server_config(&missing).unwrap();
        assert!(cfg.repos.is_empty());
        assert_eq!(cfg.port, 8787);
    }

    #[test]
    fn server_config_loads_repos_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.yaml");
        std::fs::write(
            &path,
            "port: 9000\nrepos:\n  - owner: acme\n    name: widgets\n",
        )
        .unwrap();

        let cfg = load_server_config(&path).unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.repos.len(), 1);
        assert_eq!(cfg.repos[0].key(), "acme/widgets");
    }
}
