use thiserror::Error;

use crate::pipeline::MigrationState;

/// Errors raised by the hosting and version-control clients.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error(transparent)]
    Api(#[from] octocrab::Error),

    #[error("{method} {route} returned {status}: {body}")]
    Status {
        method: &'static str,
        route: String,
        status: u16,
        body: String,
    },

    #[error("could not decode response from {route}: {message}")]
    Decode { route: String, message: String },

    #[error("`git {args}` failed: {stderr}")]
    Git { args: String, stderr: String },

    #[error("repository `{repository}` did not appear after {attempts} attempts")]
    Timeout { repository: String, attempts: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("usage error: {0}")]
    Usage(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(
        "repositories already in `{org}` ({}): {}. \
         Delete them, or rerun with --exclude={}, before migrating",
        .repositories.len(),
        .repositories.join(", "),
        .repositories.join(",")
    )]
    Conflict {
        org: String,
        repositories: Vec<String>,
    },

    #[error("could not probe `{repository}`: {source}")]
    Probe {
        repository: String,
        #[source]
        source: RemoteError,
    },

    #[error("migration of `{repository}` failed after reaching {state}: {source}")]
    StepFailure {
        repository: String,
        state: MigrationState,
        #[source]
        source: RemoteError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = MigrationError> = std::result::Result<T, E>;
