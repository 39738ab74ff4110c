//! Desired state extraction from a Terraform JSON configuration snapshot.
//!
//! The snapshot has the shape `{"resource": {<type>: {<name>: {...}}}}`. Only
//! resources of the repository type become descriptors, but every declared
//! address is kept so related resources can be targeted after a migration.

use std::path::Path;

use serde_json::{Map, Value};

use crate::descriptor::{NamePrefixes, RepositoryDescriptor, Visibility};
use crate::error::{MigrationError, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub repositories: Vec<RepositoryDescriptor>,
    /// Every `<type>.<name>` address in the snapshot, sorted.
    pub addresses: Vec<String>,
}

pub fn read_snapshot(
    path: &Path,
    repository_type: &str,
    prefixes: &NamePrefixes,
) -> Result<Snapshot> {
    let content = std::fs::read_to_string(path).map_err(|error| {
        MigrationError::Validation(format!("could not read snapshot `{}`: {}", path.display(), error))
    })?;

    parse_snapshot(&content, repository_type, prefixes)
}

pub fn parse_snapshot(
    content: &str,
    repository_type: &str,
    prefixes: &NamePrefixes,
) -> Result<Snapshot> {
    let document: Value = serde_json::from_str(content)
        .map_err(|error| MigrationError::Validation(format!("malformed snapshot: {}", error)))?;

    let resources = document
        .get("resource")
        .and_then(Value::as_object)
        .ok_or_else(|| MigrationError::Validation("snapshot has no `resource` block".to_string()))?;

    let repositories = resources
        .get(repository_type)
        .and_then(Value::as_object)
        .ok_or_else(|| {
            MigrationError::Validation(format!(
                "snapshot declares no `{}` resources",
                repository_type
            ))
        })?;

    let mut descriptors = repositories
        .iter()
        .map(|(resource_name, config)| {
            to_descriptor(repository_type, resource_name, config, prefixes)
        })
        .collect::<Result<Vec<_>>>()?;
    descriptors.sort_by(|a, b| a.resource_address.cmp(&b.resource_address));

    Ok(Snapshot {
        repositories: descriptors,
        addresses: collect_addresses(resources),
    })
}

fn to_descriptor(
    repository_type: &str,
    resource_name: &str,
    config: &Value,
    prefixes: &NamePrefixes,
) -> Result<RepositoryDescriptor> {
    let resource_address = format!("{}.{}", repository_type, resource_name);

    let target_name = config
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            MigrationError::Validation(format!("`{}` has no string `name`", resource_address))
        })?;

    let visibility = match config.get("visibility") {
        Some(value) => serde_json::from_value::<Visibility>(value.clone()).map_err(|error| {
            MigrationError::Validation(format!(
                "`{}` has an invalid visibility: {}",
                resource_address, error
            ))
        })?,
        None => Visibility::default(),
    };

    Ok(RepositoryDescriptor {
        source_name: prefixes.source_name(target_name),
        target_name: target_name.to_string(),
        resource_address,
        visibility,
    })
}

fn collect_addresses(resources: &Map<String, Value>) -> Vec<String> {
    let mut addresses: Vec<String> = resources
        .iter()
        .filter_map(|(resource_type, by_name)| {
            by_name
                .as_object()
                .map(|by_name| (resource_type, by_name))
        })
        .flat_map(|(resource_type, by_name)| {
            by_name
                .keys()
                .map(move |name| format!("{}.{}", resource_type, name))
        })
        .collect();
    addresses.sort();
    addresses
}

impl Snapshot {
    /// `-target=` flags for every resource belonging to `repository`.
    ///
    /// A resource belongs to a repository when its name is the repository's
    /// resource name or starts with `<name>_`.
    pub fn target_flags(&self, repository: &RepositoryDescriptor) -> Vec<String> {
        let name = repository.resource_name();
        let prefix = format!("{}_", name);

        self.addresses
            .iter()
            .filter(|address| {
                let resource_name = address
                    .split_once('.')
                    .map(|(_, n)| n)
                    .unwrap_or(address.as_str());
                resource_name == name || resource_name.starts_with(&prefix)
            })
            .map(|address| format!("-target={}", address))
            .collect()
    }
}
