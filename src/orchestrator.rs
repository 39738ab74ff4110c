use std::path::PathBuf;

use chrono::Utc;
use tracing::{error, info};

use crate::artifact::ImportArtifact;
use crate::cli::ParsedConfig;
use crate::error::Result;
use crate::filter::{filter, Selection};
use crate::git::VersionControl;
use crate::pipeline::{MigrationResult, Outcome, Pipeline};
use crate::prober::probe;
use crate::provider::Provider;
use crate::report::Summary;
use crate::snapshot::read_snapshot;

#[derive(Debug, PartialEq)]
pub enum RunReport {
    /// The filter left nothing to do.
    NothingSelected,
    Completed {
        dry_run: bool,
        summary: Summary,
        artifact: PathBuf,
    },
}

/// Extract, filter, probe, migrate (unless dry run) and write the import
/// artifact. Nothing is mutated before every repository has been probed.
pub async fn run(
    config: &ParsedConfig,
    selection: &Selection,
    execute: bool,
    provider: &dyn Provider,
    vcs: &dyn VersionControl,
) -> Result<RunReport> {
    let snapshot = read_snapshot(
        &config.snapshot_path,
        &config.repository_type,
        &config.prefixes,
    )?;
    info!(
        repositories = snapshot.repositories.len(),
        path = %config.snapshot_path.display(),
        "read snapshot"
    );

    let selected = filter(snapshot.repositories.clone(), selection)?;
    if selected.is_empty() {
        info!("no repositories selected, nothing to do");
        return Ok(RunReport::NothingSelected);
    }

    let settings = &config.pipeline;
    let probed = probe(provider, &settings.source_org, &settings.target_org, selected).await?;

    let results = if execute {
        let run = Pipeline::new(provider, vcs, settings).run(probed).await;
        if let Some(failure) = run.aborted {
            let summary = Summary::from_results(&run.results, &snapshot);
            error!("run aborted\n{}", summary);
            return Err(failure);
        }
        run.results
    } else {
        info!("dry run, pass --yes to migrate");
        probed
            .into_iter()
            .map(|(descriptor, state)| MigrationResult::skipped(descriptor, state.action))
            .collect()
    };

    let artifact = ImportArtifact::build(
        &settings.target_org,
        results
            .iter()
            .filter(|result| result.outcome != Outcome::Failed)
            .map(|result| (&result.descriptor, result.action)),
    );
    artifact.write(&config.artifact_path, Utc::now())?;

    Ok(RunReport::Completed {
        dry_run: !execute,
        summary: Summary::from_results(&results, &snapshot),
        artifact: config.artifact_path.clone(),
    })
}
