use anyhow::Result;
use serde::Deserialize;
use serde_yaml;

use super::common::{CreationPoll, Replacement, ServiceIdentity};
use crate::rewrite::DEFAULT_REWRITE_PATHS;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Config {
    pub source_org: String,
    pub target_org: String,
    #[serde(default)]
    pub source_prefix: String,
    #[serde(default)]
    pub target_prefix: String,
    pub token: Option<String>,
    pub api_url: Option<String>,
    #[serde(default = "default_git_url")]
    pub git_url: String,
    #[serde(default = "default_repository_type")]
    pub repository_type: String,
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: String,
    #[serde(default = "default_artifact_file")]
    pub artifact_file: String,
    #[serde(default = "default_delay")]
    pub delay_between_repositories_secs: u64,
    #[serde(default)]
    pub creation_poll: CreationPoll,
    pub service_identity: ServiceIdentity,
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
    #[serde(default)]
    pub replacements: Vec<Replacement>,
    #[serde(default = "default_rewrite_paths")]
    pub rewrite_paths: Vec<String>,
}

fn default_git_url() -> String {
    "https://github.com".to_string()
}

fn default_repository_type() -> String {
    "github_repository".to_string()
}

fn default_snapshot_file() -> String {
    "repositories.tf.json".to_string()
}

fn default_artifact_file() -> String {
    "imports.tf".to_string()
}

fn default_delay() -> u64 {
    5
}

fn default_commit_message() -> String {
    "Update references after organization migration".to_string()
}

fn default_rewrite_paths() -> Vec<String> {
    DEFAULT_REWRITE_PATHS.iter().map(|p| p.to_string()).collect()
}

pub fn read_config(config: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(config)?;

    Ok(config)
}
