use crate::mocks::github::{create_repo_mock, delete_repo_mock, get_repo_mock, put_mock};

use repo_migrate::{
    descriptor::Visibility, error::RemoteError, github_provider::GithubProvider,
    provider::Provider,
};
use serde_json::json;
use wiremock::MockServer;

fn provider(mock_server: &MockServer) -> GithubProvider {
    GithubProvider::new("random_token", Some(&mock_server.uri())).unwrap()
}

mod repo_exists {
    use super::*;

    #[tokio::test]
    async fn found() {
        let mock_server = MockServer::start().await;
        get_repo_mock("legacy", "legacy-a", 200)
            .mount(&mock_server)
            .await;

        let exists = provider(&mock_server)
            .repo_exists("legacy", "legacy-a")
            .await
            .unwrap();

        assert!(exists);
        mock_server.verify().await;
    }

    #[tokio::test]
    async fn not_found() {
        let mock_server = MockServer::start().await;
        get_repo_mock("acme", "acme-a", 404).mount(&mock_server).await;

        let exists = provider(&mock_server)
            .repo_exists("acme", "acme-a")
            .await
            .unwrap();

        assert!(!exists);
        mock_server.verify().await;
    }

    #[tokio::test]
    async fn server_error() {
        let mock_server = MockServer::start().await;
        get_repo_mock("acme", "acme-a", 502).mount(&mock_server).await;

        let result = provider(&mock_server)
            .repo_exists("acme", "acme-a")
            .await;

        match result {
            Err(RemoteError::Status { status, route, .. }) => {
                assert_eq!(status, 502);
                assert_eq!(route, "/repos/acme/acme-a");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn create_repo_returns_id() {
    let mock_server = MockServer::start().await;
    create_repo_mock(
        "acme",
        json!({ "name": "acme-a", "visibility": "internal", "auto_init": false }),
        json!({ "id": 42, "name": "acme-a", "full_name": "acme/acme-a" }),
    )
    .mount(&mock_server)
    .await;

    let id = provider(&mock_server)
        .create_repo("acme", "acme-a", Visibility::Internal)
        .await
        .unwrap();

    assert_eq!(id, 42);
    mock_server.verify().await;
}

#[tokio::test]
async fn delete_repo() {
    let mock_server = MockServer::start().await;
    delete_repo_mock("acme", "acme-a").mount(&mock_server).await;

    provider(&mock_server)
        .delete_repo("acme", "acme-a")
        .await
        .unwrap();

    mock_server.verify().await;
}

#[tokio::test]
async fn workflow_permissions() {
    let mock_server = MockServer::start().await;
    put_mock(
        "/repos/acme/acme-a/actions/permissions",
        json!({ "enabled": false }),
        204,
    )
    .mount(&mock_server)
    .await;
    put_mock(
        "/repos/acme/acme-a/actions/permissions/workflow",
        json!({ "can_approve_pull_request_reviews": true }),
        204,
    )
    .mount(&mock_server)
    .await;

    let provider = provider(&mock_server);
    provider
        .set_workflow_execution_enabled("acme", "acme-a", false)
        .await
        .unwrap();
    provider
        .set_workflow_pr_approval_permission("acme", "acme-a", true)
        .await
        .unwrap();

    mock_server.verify().await;
}

#[tokio::test]
async fn rejected_permission_change_is_an_error() {
    let mock_server = MockServer::start().await;
    put_mock(
        "/repos/acme/acme-a/actions/permissions/workflow",
        json!({ "can_approve_pull_request_reviews": true }),
        409,
    )
    .mount(&mock_server)
    .await;

    let result = provider(&mock_server)
        .set_workflow_pr_approval_permission("acme", "acme-a", true)
        .await;

    assert!(matches!(result, Err(RemoteError::Status { status: 409, .. })));
}
