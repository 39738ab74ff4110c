//! Terraform import declarations for migrated repositories.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::info;

use crate::descriptor::RepositoryDescriptor;
use crate::prober::Action;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportBlock {
    pub resource_address: String,
    pub external_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportArtifact {
    pub imports: Vec<ImportBlock>,
    /// Repositories created empty; there is nothing to import for them.
    pub fresh: Vec<ImportBlock>,
}

impl ImportArtifact {
    pub fn build<'a, I>(target_org: &str, repositories: I) -> Self
    where
        I: IntoIterator<Item = (&'a RepositoryDescriptor, Action)>,
    {
        let mut artifact = ImportArtifact::default();

        for (descriptor, action) in repositories {
            let block = ImportBlock {
                resource_address: descriptor.resource_address.clone(),
                external_id: format!("{}/{}", target_org, descriptor.target_name),
            };
            match action {
                Action::Fork => artifact.imports.push(block),
                Action::CreateFresh => artifact.fresh.push(block),
            }
        }

        artifact
    }

    /// Everything but the first line depends only on `self`.
    pub fn render(&self, generated_at: DateTime<Utc>) -> String {
        let mut out = String::new();

        let _ = writeln!(
            out,
            "# Generated by repo-migrate at {}",
            generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        );

        for block in &self.imports {
            let _ = write!(
                out,
                "\nimport {{\n  to = {}\n  id = \"{}\"\n}}\n",
                block.resource_address, block.external_id
            );
        }

        if !self.fresh.is_empty() {
            out.push('\n');
        }
        for block in &self.fresh {
            let _ = writeln!(
                out,
                "# create-fresh (not importable): {} => {}",
                block.resource_address, block.external_id
            );
        }

        out
    }

    pub fn write(&self, path: &Path, generated_at: DateTime<Utc>) -> std::io::Result<()> {
        std::fs::write(path, self.render(generated_at))?;
        info!(
            path = %path.display(),
            imports = self.imports.len(),
            fresh = self.fresh.len(),
            "wrote import artifact"
        );
        Ok(())
    }
}
