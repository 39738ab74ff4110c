use std::collections::HashSet;

use tracing::{info, warn};

use crate::descriptor::RepositoryDescriptor;
use crate::error::{MigrationError, Result};

/// Include/exclude selection over target repository names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub only: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
}

impl Selection {
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection {
            only: Some(names.into_iter().map(Into::into).collect()),
            exclude: None,
        }
    }

    pub fn exclude<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection {
            only: None,
            exclude: Some(names.into_iter().map(Into::into).collect()),
        }
    }
}

pub fn filter(
    descriptors: Vec<RepositoryDescriptor>,
    selection: &Selection,
) -> Result<Vec<RepositoryDescriptor>> {
    if selection.only.is_some() && selection.exclude.is_some() {
        return Err(MigrationError::Usage(
            "--only and --exclude are mutually exclusive".to_string(),
        ));
    }

    let mut selected = descriptors;

    if let Some(only) = &selection.only {
        for name in only {
            if !selected.iter().any(|d| &d.target_name == name) {
                warn!(repository = %name, "--only names a repository not in the snapshot");
            }
        }

        let only: HashSet<&str> = only.iter().map(String::as_str).collect();
        selected.retain(|d| only.contains(d.target_name.as_str()));
    }

    if let Some(exclude) = &selection.exclude {
        let exclude: HashSet<&str> = exclude.iter().map(String::as_str).collect();
        selected.retain(|d| !exclude.contains(d.target_name.as_str()));
    }

    info!(count = selected.len(), "repositories selected");

    Ok(selected)
}
