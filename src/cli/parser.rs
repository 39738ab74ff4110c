use std::path::{Path, PathBuf};
use std::time::Duration;

use super::reader;
use crate::descriptor::NamePrefixes;
use crate::error::{MigrationError, Result};
use crate::pipeline::{PipelineSettings, PollPolicy};
use crate::rewrite::{ReplacementRule, Rewriter};

#[derive(Clone, Debug)]
pub struct ParsedConfig {
    pub prefixes: NamePrefixes,
    pub token: String,
    pub api_url: Option<String>,
    pub repository_type: String,
    pub snapshot_path: PathBuf,
    pub artifact_path: PathBuf,
    pub pipeline: PipelineSettings,
}

/// Validates a raw config. Relative snapshot and artifact files resolve
/// against `directory`; the token falls back to `env_token`.
pub fn parse_config(
    config: reader::Config,
    directory: &Path,
    env_token: Option<String>,
) -> Result<ParsedConfig> {
    let token = config
        .token
        .or(env_token)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            MigrationError::Validation(
                "no token configured; set `token` or GITHUB_TOKEN".to_string(),
            )
        })?;

    if config.creation_poll.attempts == 0 {
        return Err(MigrationError::Validation(
            "creation_poll.attempts must be at least 1".to_string(),
        ));
    }

    let rules = config
        .replacements
        .iter()
        .map(|r| {
            if r.pattern.is_empty() {
                return Err(MigrationError::Validation(
                    "replacement patterns must not be empty".to_string(),
                ));
            }
            ReplacementRule::literal(&r.pattern, &r.replacement).map_err(|error| {
                MigrationError::Validation(format!("invalid replacement `{}`: {}", r.pattern, error))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    for pattern in &config.rewrite_paths {
        glob::Pattern::new(pattern).map_err(|error| {
            MigrationError::Validation(format!("invalid rewrite path `{}`: {}", pattern, error))
        })?;
    }

    Ok(ParsedConfig {
        prefixes: NamePrefixes::new(config.source_prefix, config.target_prefix),
        token,
        api_url: config.api_url,
        repository_type: config.repository_type,
        snapshot_path: directory.join(config.snapshot_file),
        artifact_path: directory.join(config.artifact_file),
        pipeline: PipelineSettings {
            source_org: config.source_org,
            target_org: config.target_org,
            git_url: config.git_url,
            creation_poll: PollPolicy {
                attempts: config.creation_poll.attempts,
                interval: Duration::from_secs(config.creation_poll.interval_secs),
            },
            delay_between_repositories: Duration::from_secs(
                config.delay_between_repositories_secs,
            ),
            identity: config.service_identity,
            commit_message: config.commit_message,
            rewriter: Rewriter::new(rules, config.rewrite_paths),
        },
    })
}
