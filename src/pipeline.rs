//! Per-repository migration state machine.
//!
//! Repositories are migrated one at a time. Each one walks
//!
//! ```text
//! Pending -> RemoteCreated -> ActionsDisabled -> HistoryMigrated
//!         -> ReferencesFixed -> ActionsEnabled -> Done
//! ```
//!
//! with `HistoryMigrated` and `ReferencesFixed` only reached on the fork
//! path. A structural failure deletes the half-created target repository and
//! stops the whole run; repositories migrated before it stay in place.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use tempfile::TempDir;
use tracing::{error, info, warn};

use crate::cli::ServiceIdentity;
use crate::descriptor::RepositoryDescriptor;
use crate::error::{MigrationError, RemoteError};
use crate::git::VersionControl;
use crate::prober::{Action, RepositoryState};
use crate::provider::Provider;
use crate::rewrite::Rewriter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MigrationState {
    Pending,
    RemoteCreated,
    ActionsDisabled,
    HistoryMigrated,
    ReferencesFixed,
    ActionsEnabled,
    Done,
    Failed,
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MigrationState::Pending => "PENDING",
            MigrationState::RemoteCreated => "REMOTE_CREATED",
            MigrationState::ActionsDisabled => "ACTIONS_DISABLED",
            MigrationState::HistoryMigrated => "HISTORY_MIGRATED",
            MigrationState::ReferencesFixed => "REFERENCES_FIXED",
            MigrationState::ActionsEnabled => "ACTIONS_ENABLED",
            MigrationState::Done => "DONE",
            MigrationState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Skipped,
    Failed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MigrationResult {
    pub descriptor: RepositoryDescriptor,
    pub action: Action,
    pub outcome: Outcome,
    pub final_state: MigrationState,
    pub error: Option<String>,
    pub warnings: Vec<String>,
}

impl MigrationResult {
    pub fn skipped(descriptor: RepositoryDescriptor, action: Action) -> Self {
        MigrationResult {
            descriptor,
            action,
            outcome: Outcome::Skipped,
            final_state: MigrationState::Pending,
            error: None,
            warnings: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

#[derive(Clone, Debug)]
pub struct PipelineSettings {
    pub source_org: String,
    pub target_org: String,
    /// Git host base, e.g. `https://github.com`.
    pub git_url: String,
    pub creation_poll: PollPolicy,
    pub delay_between_repositories: Duration,
    pub identity: ServiceIdentity,
    pub commit_message: String,
    pub rewriter: Rewriter,
}

impl PipelineSettings {
    pub fn remote_url(&self, org: &str, name: &str) -> String {
        format!(
            "{base}/{org}/{name}.git",
            base = self.git_url.trim_end_matches('/'),
            org = org,
            name = name
        )
    }
}

/// Results of a pipeline run. `aborted` holds the failure that stopped it.
#[derive(Debug)]
pub struct PipelineRun {
    pub results: Vec<MigrationResult>,
    pub aborted: Option<MigrationError>,
}

pub struct Pipeline<'a> {
    provider: &'a dyn Provider,
    vcs: &'a dyn VersionControl,
    settings: &'a PipelineSettings,
}

struct Progress<'a> {
    repository: &'a str,
    state: MigrationState,
    warnings: Vec<String>,
}

impl<'a> Progress<'a> {
    fn new(repository: &'a str) -> Self {
        Progress {
            repository,
            state: MigrationState::Pending,
            warnings: Vec::new(),
        }
    }

    fn advance(&mut self, next: MigrationState) {
        info!(repository = self.repository, from = %self.state, to = %next, "state changed");
        self.state = next;
    }

    fn warn(&mut self, step: &str, error: &RemoteError) {
        warn!(repository = self.repository, step, %error, "step failed, continuing");
        self.warnings.push(format!("{}: {}", step, error));
    }
}

impl<'a> Pipeline<'a> {
    pub fn new(
        provider: &'a dyn Provider,
        vcs: &'a dyn VersionControl,
        settings: &'a PipelineSettings,
    ) -> Self {
        Pipeline {
            provider,
            vcs,
            settings,
        }
    }

    /// Migrates every repository in order, stopping at the first failure.
    pub async fn run(&self, probed: Vec<(RepositoryDescriptor, RepositoryState)>) -> PipelineRun {
        let total = probed.len();
        let mut results = Vec::with_capacity(total);

        for (index, (descriptor, state)) in probed.into_iter().enumerate() {
            if index > 0 && !self.settings.delay_between_repositories.is_zero() {
                tokio::time::sleep(self.settings.delay_between_repositories).await;
            }

            info!(
                repository = %descriptor.target_name,
                action = %state.action,
                position = index + 1,
                total,
                "migrating"
            );

            let mut progress = Progress::new(&descriptor.target_name);
            let migrated = self.migrate(&descriptor, state.action, &mut progress).await;
            let Progress {
                state: final_state,
                warnings,
                ..
            } = progress;

            match migrated {
                Ok(()) => results.push(MigrationResult {
                    descriptor,
                    action: state.action,
                    outcome: Outcome::Success,
                    final_state,
                    error: None,
                    warnings,
                }),
                Err(source) => {
                    let failure = MigrationError::StepFailure {
                        repository: descriptor.target_name.clone(),
                        state: final_state,
                        source,
                    };
                    error!(%failure, "aborting run");
                    results.push(MigrationResult {
                        descriptor,
                        action: state.action,
                        outcome: Outcome::Failed,
                        final_state: MigrationState::Failed,
                        error: Some(failure.to_string()),
                        warnings,
                    });
                    return PipelineRun {
                        results,
                        aborted: Some(failure),
                    };
                }
            }
        }

        PipelineRun {
            results,
            aborted: None,
        }
    }

    async fn migrate(
        &self,
        descriptor: &RepositoryDescriptor,
        action: Action,
        progress: &mut Progress<'_>,
    ) -> Result<(), RemoteError> {
        let org = &self.settings.target_org;
        let name = &descriptor.target_name;

        let id = self
            .provider
            .create_repo(org, name, descriptor.visibility)
            .await?;
        info!(repository = %name, id, "created");
        progress.advance(MigrationState::RemoteCreated);

        let result = self.after_create(descriptor, action, progress).await;
        if result.is_err() {
            self.compensate(org, name).await;
        }
        result
    }

    async fn after_create(
        &self,
        descriptor: &RepositoryDescriptor,
        action: Action,
        progress: &mut Progress<'_>,
    ) -> Result<(), RemoteError> {
        let org = &self.settings.target_org;
        let name = &descriptor.target_name;

        self.wait_for_repository(org, name).await?;

        self.provider
            .set_workflow_execution_enabled(org, name, false)
            .await?;
        progress.advance(MigrationState::ActionsDisabled);

        if action == Action::Fork {
            self.transfer_history(descriptor).await?;
            progress.advance(MigrationState::HistoryMigrated);

            match self.fix_references(descriptor).await {
                Ok(true) => info!(repository = %name, "references updated"),
                Ok(false) => info!(repository = %name, "no references to update"),
                Err(error) => progress.warn("reference rewrite", &error),
            }
            progress.advance(MigrationState::ReferencesFixed);
        }

        self.provider
            .set_workflow_execution_enabled(org, name, true)
            .await?;
        progress.advance(MigrationState::ActionsEnabled);

        if let Err(error) = self
            .provider
            .set_workflow_pr_approval_permission(org, name, true)
            .await
        {
            progress.warn("pull request approval permission", &error);
        }
        progress.advance(MigrationState::Done);

        Ok(())
    }

    async fn wait_for_repository(&self, org: &str, name: &str) -> Result<(), RemoteError> {
        let poll = &self.settings.creation_poll;

        for attempt in 1..=poll.attempts {
            if self.provider.repo_exists(org, name).await? {
                return Ok(());
            }
            info!(repository = name, attempt, "waiting for repository to appear");
            if attempt < poll.attempts {
                tokio::time::sleep(poll.interval).await;
            }
        }

        Err(RemoteError::Timeout {
            repository: format!("{}/{}", org, name),
            attempts: poll.attempts,
        })
    }

    async fn transfer_history(&self, descriptor: &RepositoryDescriptor) -> Result<(), RemoteError> {
        let workdir = work_dir()?;
        let mirror = workdir.path().join(format!("{}.git", descriptor.source_name));

        let source = self
            .settings
            .remote_url(&self.settings.source_org, &descriptor.source_name);
        let target = self
            .settings
            .remote_url(&self.settings.target_org, &descriptor.target_name);

        self.vcs.mirror_clone(&source, &mirror).await?;
        self.vcs.mirror_push(&mirror, &target).await?;

        info!(repository = %descriptor.target_name, "history transferred");
        Ok(())
    }

    /// Returns whether a commit was pushed.
    async fn fix_references(&self, descriptor: &RepositoryDescriptor) -> Result<bool, RemoteError> {
        let workdir = work_dir()?;
        let checkout = workdir.path().join(&descriptor.target_name);
        let target = self
            .settings
            .remote_url(&self.settings.target_org, &descriptor.target_name);

        self.vcs.clone(&target, &checkout).await?;

        let changed = self.settings.rewriter.rewrite_tree(&checkout)?;
        if changed.is_empty() {
            return Ok(false);
        }

        self.commit_and_push(&checkout, changed.len()).await?;
        Ok(true)
    }

    async fn commit_and_push(&self, checkout: &Path, changed: usize) -> Result<(), RemoteError> {
        let branch = self.vcs.current_branch(checkout).await?;
        self.vcs
            .commit(checkout, &self.settings.identity, &self.settings.commit_message)
            .await?;
        self.vcs.push(checkout, &branch).await?;

        info!(changed, branch = %branch, "pushed reference updates");
        Ok(())
    }

    async fn compensate(&self, org: &str, name: &str) {
        warn!(repository = name, "deleting partially migrated repository");
        if let Err(error) = self.provider.delete_repo(org, name).await {
            error!(
                repository = name,
                %error,
                "compensating delete failed, manual cleanup required"
            );
        }
    }
}

fn work_dir() -> Result<TempDir, RemoteError> {
    Ok(tempfile::Builder::new().prefix("repo-migrate-").tempdir()?)
}
