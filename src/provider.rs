use async_trait::async_trait;

use crate::descriptor::Visibility;
use crate::error::RemoteError;

/// The repository-hosting operations the migration needs.
///
/// Implementations must be idempotent-safe to call sequentially; the
/// migration never issues two calls concurrently.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn repo_exists(&self, org: &str, name: &str) -> Result<bool, RemoteError>;

    /// Creates an empty repository and returns its numeric id.
    async fn create_repo(
        &self,
        org: &str,
        name: &str,
        visibility: Visibility,
    ) -> Result<u64, RemoteError>;

    async fn delete_repo(&self, org: &str, name: &str) -> Result<(), RemoteError>;

    async fn set_workflow_execution_enabled(
        &self,
        org: &str,
        name: &str,
        enabled: bool,
    ) -> Result<(), RemoteError>;

    async fn set_workflow_pr_approval_permission(
        &self,
        org: &str,
        name: &str,
        allowed: bool,
    ) -> Result<(), RemoteError>;
}
