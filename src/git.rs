use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::cli::ServiceIdentity;
use crate::error::RemoteError;

/// Local version-control operations. Every call names its working directory
/// explicitly; nothing relies on the process working directory.
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Bare mirror clone of `url` into `dest`.
    async fn mirror_clone(&self, url: &str, dest: &Path) -> Result<(), RemoteError>;

    /// Pushes every ref of the mirror at `path` to `url` in one push.
    async fn mirror_push(&self, path: &Path, url: &str) -> Result<(), RemoteError>;

    /// Regular clone with a working tree.
    async fn clone(&self, url: &str, dest: &Path) -> Result<(), RemoteError>;

    async fn current_branch(&self, path: &Path) -> Result<String, RemoteError>;

    /// Stages every change in the working tree and commits it.
    async fn commit(
        &self,
        path: &Path,
        identity: &ServiceIdentity,
        message: &str,
    ) -> Result<(), RemoteError>;

    async fn push(&self, path: &Path, branch: &str) -> Result<(), RemoteError>;
}

/// Runs the `git` binary.
pub struct GitCli {
    auth_header: Option<String>,
}

impl GitCli {
    pub fn new(token: Option<&str>) -> Self {
        let auth_header = token.map(|token| {
            let credentials = base64::encode(format!("x-access-token:{}", token));
            format!("http.extraheader=Authorization: Basic {}", credentials)
        });

        GitCli { auth_header }
    }

    async fn git(&self, dir: Option<&Path>, args: &[&str]) -> Result<String, RemoteError> {
        let mut command = Command::new("git");
        if let Some(header) = &self.auth_header {
            command.arg("-c").arg(header);
        }
        command.args(args).env("GIT_TERMINAL_PROMPT", "0");
        if let Some(dir) = dir {
            command.current_dir(dir);
        }

        debug!(args = %args.join(" "), "running git");
        let output = command.output().await?;

        if !output.status.success() {
            return Err(RemoteError::Git {
                args: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[async_trait]
impl VersionControl for GitCli {
    async fn mirror_clone(&self, url: &str, dest: &Path) -> Result<(), RemoteError> {
        let dest = path_arg(dest);
        self.git(None, &["clone", "--mirror", url, &dest]).await?;
        Ok(())
    }

    async fn mirror_push(&self, path: &Path, url: &str) -> Result<(), RemoteError> {
        self.git(Some(path), &["push", "--mirror", url]).await?;
        Ok(())
    }

    async fn clone(&self, url: &str, dest: &Path) -> Result<(), RemoteError> {
        let dest = path_arg(dest);
        self.git(None, &["clone", url, &dest]).await?;
        Ok(())
    }

    async fn current_branch(&self, path: &Path) -> Result<String, RemoteError> {
        self.git(Some(path), &["symbolic-ref", "--short", "HEAD"]).await
    }

    async fn commit(
        &self,
        path: &Path,
        identity: &ServiceIdentity,
        message: &str,
    ) -> Result<(), RemoteError> {
        let name = format!("user.name={}", identity.name);
        let email = format!("user.email={}", identity.email);

        self.git(Some(path), &["add", "--all"]).await?;
        self.git(
            Some(path),
            &["-c", &name, "-c", &email, "commit", "--message", message],
        )
        .await?;
        Ok(())
    }

    async fn push(&self, path: &Path, branch: &str) -> Result<(), RemoteError> {
        self.git(Some(path), &["push", "origin", branch]).await?;
        Ok(())
    }
}
