//! In-memory collaborators that record every call, for tests.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::cli::ServiceIdentity;
use crate::descriptor::{RepositoryDescriptor, Visibility};
use crate::error::RemoteError;
use crate::git::VersionControl;
use crate::provider::Provider;

/// `github_repository.<name>` mapped from `legacy-<name>` to `acme-<name>`.
pub fn descriptor(name: &str) -> RepositoryDescriptor {
    RepositoryDescriptor {
        resource_address: format!("github_repository.{}", name),
        target_name: format!("acme-{}", name),
        source_name: format!("legacy-{}", name),
        visibility: Visibility::Private,
    }
}

fn injected_failure(call: &str) -> RemoteError {
    RemoteError::Status {
        method: "FAKE",
        route: call.to_string(),
        status: 500,
        body: "injected failure".to_string(),
    }
}

#[derive(Default)]
struct ProviderState {
    repos: HashSet<(String, String)>,
    calls: Vec<String>,
}

/// Fake hosting provider.
///
/// Calls are recorded as `"<operation> <org>/<name>[ <arg>]"`. A call fails
/// when it starts with one of the prefixes registered by `failing_on`.
#[derive(Default)]
pub struct FakeProvider {
    state: Mutex<ProviderState>,
    failing: Vec<String>,
    hide_created: bool,
}

impl FakeProvider {
    pub fn with_repo(self, org: &str, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .repos
            .insert((org.to_string(), name.to_string()));
        self
    }

    pub fn failing_on(mut self, call_prefix: &str) -> Self {
        self.failing.push(call_prefix.to_string());
        self
    }

    /// Created repositories never become visible to `repo_exists`.
    pub fn hiding_created_repos(mut self) -> Self {
        self.hide_created = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Every recorded call except `repo_exists`.
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| !call.starts_with("repo_exists"))
            .collect()
    }

    pub fn has_repo(&self, org: &str, name: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .repos
            .contains(&(org.to_string(), name.to_string()))
    }

    fn record(&self, call: String) -> Result<(), RemoteError> {
        self.state.lock().unwrap().calls.push(call.clone());
        if self.failing.iter().any(|prefix| call.starts_with(prefix)) {
            return Err(injected_failure(&call));
        }
        Ok(())
    }
}

#[async_trait]
impl Provider for FakeProvider {
    async fn repo_exists(&self, org: &str, name: &str) -> Result<bool, RemoteError> {
        self.record(format!("repo_exists {}/{}", org, name))?;
        Ok(self.has_repo(org, name))
    }

    async fn create_repo(
        &self,
        org: &str,
        name: &str,
        visibility: Visibility,
    ) -> Result<u64, RemoteError> {
        self.record(format!("create_repo {}/{} {}", org, name, visibility.as_str()))?;
        let mut state = self.state.lock().unwrap();
        if !self.hide_created {
            state.repos.insert((org.to_string(), name.to_string()));
        }
        Ok(state.calls.len() as u64)
    }

    async fn delete_repo(&self, org: &str, name: &str) -> Result<(), RemoteError> {
        self.record(format!("delete_repo {}/{}", org, name))?;
        self.state
            .lock()
            .unwrap()
            .repos
            .remove(&(org.to_string(), name.to_string()));
        Ok(())
    }

    async fn set_workflow_execution_enabled(
        &self,
        org: &str,
        name: &str,
        enabled: bool,
    ) -> Result<(), RemoteError> {
        self.record(format!("set_workflow_execution_enabled {}/{} {}", org, name, enabled))
    }

    async fn set_workflow_pr_approval_permission(
        &self,
        org: &str,
        name: &str,
        allowed: bool,
    ) -> Result<(), RemoteError> {
        self.record(format!(
            "set_workflow_pr_approval_permission {}/{} {}",
            org, name, allowed
        ))
    }
}

/// Fake version control.
///
/// `clone` materializes the configured files in the destination; `commit`
/// records the identity and message. Calls are recorded like
/// [`FakeProvider`] with paths left out, so recordings stay stable across
/// temporary directories.
#[derive(Default)]
pub struct FakeVcs {
    calls: Mutex<Vec<String>>,
    work_dirs: Mutex<Vec<std::path::PathBuf>>,
    files: Vec<(String, String)>,
    failing: Vec<String>,
}

impl FakeVcs {
    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.push((path.to_string(), content.to_string()));
        self
    }

    pub fn failing_on(mut self, call_prefix: &str) -> Self {
        self.failing.push(call_prefix.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Every directory the fake was handed to work in.
    pub fn work_dirs(&self) -> Vec<std::path::PathBuf> {
        self.work_dirs.lock().unwrap().clone()
    }

    fn record(&self, call: String, dir: &Path) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(call.clone());
        self.work_dirs.lock().unwrap().push(dir.to_path_buf());
        if self.failing.iter().any(|prefix| call.starts_with(prefix)) {
            return Err(RemoteError::Git {
                args: call,
                stderr: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VersionControl for FakeVcs {
    async fn mirror_clone(&self, url: &str, dest: &Path) -> Result<(), RemoteError> {
        self.record(format!("mirror_clone {}", url), dest)?;
        std::fs::create_dir_all(dest)?;
        Ok(())
    }

    async fn mirror_push(&self, path: &Path, url: &str) -> Result<(), RemoteError> {
        self.record(format!("mirror_push {}", url), path)
    }

    async fn clone(&self, url: &str, dest: &Path) -> Result<(), RemoteError> {
        self.record(format!("clone {}", url), dest)?;
        for (relative, content) in &self.files {
            let path = dest.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
        }
        Ok(())
    }

    async fn current_branch(&self, path: &Path) -> Result<String, RemoteError> {
        self.record("current_branch".to_string(), path)?;
        Ok("main".to_string())
    }

    async fn commit(
        &self,
        path: &Path,
        identity: &ServiceIdentity,
        message: &str,
    ) -> Result<(), RemoteError> {
        self.record(
            format!("commit {} <{}> {}", identity.name, identity.email, message),
            path,
        )
    }

    async fn push(&self, path: &Path, branch: &str) -> Result<(), RemoteError> {
        self.record(format!("push {}", branch), path)
    }
}
