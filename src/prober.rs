use std::fmt;

use tracing::{info, warn};

use crate::descriptor::RepositoryDescriptor;
use crate::error::{MigrationError, Result};
use crate::provider::Provider;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Recreate from the archived source with its full history.
    Fork,
    /// No source exists; create an empty repository.
    CreateFresh,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Fork => write!(f, "fork"),
            Action::CreateFresh => write!(f, "create-fresh"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryState {
    pub source_exists: bool,
    pub target_exists: bool,
    pub action: Action,
}

impl RepositoryState {
    pub fn new(source_exists: bool, target_exists: bool) -> Self {
        RepositoryState {
            source_exists,
            target_exists,
            action: if source_exists {
                Action::Fork
            } else {
                Action::CreateFresh
            },
        }
    }
}

/// Probes both organizations for every descriptor.
///
/// Fails with [`MigrationError::Conflict`] if any target repository already
/// exists. Only read calls are made.
pub async fn probe(
    provider: &dyn Provider,
    source_org: &str,
    target_org: &str,
    descriptors: Vec<RepositoryDescriptor>,
) -> Result<Vec<(RepositoryDescriptor, RepositoryState)>> {
    let mut probed = Vec::with_capacity(descriptors.len());

    for descriptor in descriptors {
        let source_exists = provider
            .repo_exists(source_org, &descriptor.source_name)
            .await
            .map_err(|source| MigrationError::Probe {
                repository: descriptor.source_name.clone(),
                source,
            })?;
        let target_exists = provider
            .repo_exists(target_org, &descriptor.target_name)
            .await
            .map_err(|source| MigrationError::Probe {
                repository: descriptor.target_name.clone(),
                source,
            })?;

        let state = RepositoryState::new(source_exists, target_exists);
        info!(
            repository = %descriptor.target_name,
            source = %descriptor.source_name,
            action = %state.action,
            target_exists,
            "probed"
        );
        probed.push((descriptor, state));
    }

    let conflicts: Vec<String> = probed
        .iter()
        .filter(|(_, state)| state.target_exists)
        .map(|(descriptor, _)| descriptor.target_name.clone())
        .collect();

    if !conflicts.is_empty() {
        warn!(count = conflicts.len(), "target repositories already exist");
        return Err(MigrationError::Conflict {
            org: target_org.to_string(),
            repositories: conflicts,
        });
    }

    Ok(probed)
}
