use std::path::Path;

use serde_json::{json, Map, Value};

/// Writes `<dir>/repositories.tf.json` declaring one `github_repository`
/// per `(resource name, repository name)` pair, plus a branch protection
/// for each.
pub fn write_snapshot(dir: &Path, repositories: &[(&str, &str)]) {
    let mut repos = Map::new();
    let mut protections = Map::new();
    for (resource, name) in repositories {
        repos.insert(resource.to_string(), json!({ "name": name }));
        protections.insert(
            format!("{}_main", resource),
            json!({
                "repository_id": format!("${{github_repository.{}.node_id}}", resource),
                "pattern": "main",
            }),
        );
    }

    let document = json!({
        "resource": {
            "github_repository": Value::Object(repos),
            "github_branch_protection": Value::Object(protections),
        }
    });

    std::fs::write(
        dir.join("repositories.tf.json"),
        serde_json::to_string_pretty(&document).unwrap(),
    )
    .unwrap();
}
