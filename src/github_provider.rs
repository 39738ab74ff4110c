use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::descriptor::Visibility;
use crate::error::RemoteError;
use crate::provider::Provider;

pub struct GithubProvider {
    instance: Octocrab,
}

#[derive(Debug, Deserialize)]
struct CreatedRepository {
    id: u64,
}

impl GithubProvider {
    pub fn new(token: &str, base_url: Option<&str>) -> Result<Self, RemoteError> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());
        if let Some(url) = base_url {
            builder = builder.base_url(url)?;
        }

        Ok(GithubProvider {
            instance: builder.build()?,
        })
    }

    async fn check(
        method: &'static str,
        route: &str,
        response: Response,
    ) -> Result<Response, RemoteError> {
        let status = response.status();
        debug!(method, route, status = status.as_u16(), "github response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::Status {
            method,
            route: route.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    async fn put(&self, route: &str, body: serde_json::Value) -> Result<(), RemoteError> {
        let url = self.instance.absolute_url(route)?;
        let response = self.instance._put(url, Some(&body)).await?;
        Self::check("PUT", route, response).await?;
        Ok(())
    }
}

#[async_trait]
impl Provider for GithubProvider {
    async fn repo_exists(&self, org: &str, name: &str) -> Result<bool, RemoteError> {
        let route = format!("/repos/{org}/{name}", org = org, name = name);
        let url = self.instance.absolute_url(&route)?;
        let response = self.instance._get(url, None::<&()>).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }

        Self::check("GET", &route, response).await?;
        Ok(true)
    }

    async fn create_repo(
        &self,
        org: &str,
        name: &str,
        visibility: Visibility,
    ) -> Result<u64, RemoteError> {
        let route = format!("/orgs/{org}/repos", org = org);
        let url = self.instance.absolute_url(&route)?;
        let body = json!({
            "name": name,
            "visibility": visibility.as_str(),
            "auto_init": false,
        });

        let response = self.instance._post(url, Some(&body)).await?;
        let response = Self::check("POST", &route, response).await?;

        let created: CreatedRepository =
            response.json().await.map_err(|error| RemoteError::Decode {
                route: route.clone(),
                message: error.to_string(),
            })?;

        Ok(created.id)
    }

    async fn delete_repo(&self, org: &str, name: &str) -> Result<(), RemoteError> {
        let route = format!("/repos/{org}/{name}", org = org, name = name);
        let url = self.instance.absolute_url(&route)?;
        let response = self.instance._delete(url, None::<&()>).await?;
        Self::check("DELETE", &route, response).await?;
        Ok(())
    }

    async fn set_workflow_execution_enabled(
        &self,
        org: &str,
        name: &str,
        enabled: bool,
    ) -> Result<(), RemoteError> {
        let route = format!(
            "/repos/{org}/{name}/actions/permissions",
            org = org,
            name = name
        );
        self.put(&route, json!({ "enabled": enabled })).await
    }

    async fn set_workflow_pr_approval_permission(
        &self,
        org: &str,
        name: &str,
        allowed: bool,
    ) -> Result<(), RemoteError> {
        let route = format!(
            "/repos/{org}/{name}/actions/permissions/workflow",
            org = org,
            name = name
        );
        self.put(&route, json!({ "can_approve_pull_request_reviews": allowed }))
            .await
    }
}
