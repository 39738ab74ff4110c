use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

pub fn get_repo_mock(owner: &str, repo: &str, status: u16) -> Mock {
    Mock::given(method("GET"))
        .and(path(format!(
            "/repos/{owner}/{repo}",
            owner = owner,
            repo = repo
        )))
        .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
            "message": "mock"
        })))
        .expect(1)
}

pub fn create_repo_mock(
    org: &str,
    request: serde_json::Value,
    response: serde_json::Value,
) -> Mock {
    Mock::given(method("POST"))
        .and(path(format!("/orgs/{org}/repos", org = org)))
        .and(body_json(request))
        .respond_with(ResponseTemplate::new(201).set_body_json(response))
        .expect(1)
}

pub fn delete_repo_mock(owner: &str, repo: &str) -> Mock {
    Mock::given(method("DELETE"))
        .and(path(format!(
            "/repos/{owner}/{repo}",
            owner = owner,
            repo = repo
        )))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
}

pub fn put_mock(route: &str, request: serde_json::Value, status: u16) -> Mock {
    Mock::given(method("PUT"))
        .and(path(route))
        .and(body_json(request))
        .respond_with(ResponseTemplate::new(status))
        .expect(1)
}
