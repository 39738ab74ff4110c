use std::path::Path;

use indoc::indoc;
use repo_migrate::{
    cli::{parser::parse_config, reader::read_config, ParsedConfig},
    error::MigrationError,
    filter::Selection,
    fixtures::fakes::{FakeProvider, FakeVcs},
    fixtures::snapshot::write_snapshot,
    orchestrator::{run, RunReport},
};

fn config(dir: &Path) -> ParsedConfig {
    let doc = indoc! {r#"
    source_org: legacy
    target_org: acme
    source_prefix: legacy-
    target_prefix: acme-
    token: random_token
    git_url: https://git.example
    delay_between_repositories_secs: 0
    creation_poll:
      attempts: 2
      interval_secs: 0
    service_identity:
      name: acme-bot
      email: bot@acme.example
    replacements:
      - pattern: "@legacy/platform"
        replacement: "@acme/platform"
    "#};

    parse_config(read_config(doc).unwrap(), dir, None).unwrap()
}

/// Repos `a` and `b` exist in the archive, `c` does not.
fn scenario() -> (tempfile::TempDir, FakeProvider) {
    let dir = tempfile::tempdir().unwrap();
    write_snapshot(dir.path(), &[("a", "acme-a"), ("b", "acme-b"), ("c", "acme-c")]);

    let provider = FakeProvider::default()
        .with_repo("legacy", "legacy-a")
        .with_repo("legacy", "legacy-b");

    (dir, provider)
}

fn artifact_body(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("imports.tf"))
        .unwrap()
        .lines()
        .skip(1)
        .map(str::to_string)
        .collect()
}

fn count_lines(lines: &[String], prefix: &str) -> usize {
    lines.iter().filter(|line| line.starts_with(prefix)).count()
}

#[tokio::test]
async fn dry_run_writes_artifact_without_mutations() {
    let (dir, provider) = scenario();
    let vcs = FakeVcs::default();
    let config = config(dir.path());

    let report = run(&config, &Selection::default(), false, &provider, &vcs)
        .await
        .unwrap();

    match report {
        RunReport::Completed {
            dry_run, summary, ..
        } => {
            assert!(dry_run);
            assert_eq!(summary.skipped, 3);
            assert_eq!(summary.succeeded, 0);
        }
        other => panic!("unexpected report {:?}", other),
    }

    assert!(provider.mutations().is_empty());
    assert!(vcs.calls().is_empty());

    let body = artifact_body(dir.path());
    assert_eq!(count_lines(&body, "import {"), 2);
    assert_eq!(count_lines(&body, "#"), 1);
    assert!(body.contains(&"  id = \"acme/acme-a\"".to_string()));
    assert!(body.contains(&"  id = \"acme/acme-b\"".to_string()));
    assert!(body.contains(
        &"# create-fresh (not importable): github_repository.c => acme/acme-c".to_string()
    ));
}

#[tokio::test]
async fn execute_migrates_in_order_and_writes_same_artifact() {
    let (dir, provider) = scenario();
    let vcs = FakeVcs::default().with_file(".github/CODEOWNERS", "* @legacy/platform\n");
    let config = config(dir.path());

    run(&config, &Selection::default(), false, &provider, &vcs)
        .await
        .unwrap();
    let dry_body = artifact_body(dir.path());

    let report = run(&config, &Selection::default(), true, &provider, &vcs)
        .await
        .unwrap();

    match report {
        RunReport::Completed {
            dry_run, summary, ..
        } => {
            assert!(!dry_run);
            assert_eq!(summary.succeeded, 3);
            assert!(summary
                .target_flags
                .contains(&"-target=github_branch_protection.c_main".to_string()));
        }
        other => panic!("unexpected report {:?}", other),
    }

    let creates: Vec<String> = provider
        .mutations()
        .into_iter()
        .filter(|call| call.starts_with("create_repo"))
        .collect();
    assert_eq!(
        creates,
        vec![
            "create_repo acme/acme-a private",
            "create_repo acme/acme-b private",
            "create_repo acme/acme-c private",
        ]
    );

    let mirrors: Vec<String> = vcs
        .calls()
        .into_iter()
        .filter(|call| call.starts_with("mirror_clone"))
        .collect();
    assert_eq!(
        mirrors,
        vec![
            "mirror_clone https://git.example/legacy/legacy-a.git",
            "mirror_clone https://git.example/legacy/legacy-b.git",
        ]
    );

    assert_eq!(artifact_body(dir.path()), dry_body);
}

#[tokio::test]
async fn conflict_blocks_every_mutation_even_with_yes() {
    let (dir, provider) = scenario();
    let provider = provider.with_repo("acme", "acme-b");
    let vcs = FakeVcs::default();
    let config = config(dir.path());

    let result = run(&config, &Selection::default(), true, &provider, &vcs).await;

    match result {
        Err(MigrationError::Conflict { repositories, .. }) => {
            assert_eq!(repositories, vec!["acme-b"])
        }
        other => panic!("expected conflict, got {:?}", other),
    }
    assert!(provider.mutations().is_empty());
    assert!(vcs.calls().is_empty());
    assert!(!dir.path().join("imports.tf").exists());
}

#[tokio::test]
async fn step_failure_aborts_remaining_repositories() {
    let (dir, provider) = scenario();
    let vcs = FakeVcs::default().failing_on("mirror_clone https://git.example/legacy/legacy-a.git");
    let config = config(dir.path());

    let result = run(&config, &Selection::default(), true, &provider, &vcs).await;

    assert!(matches!(result, Err(MigrationError::StepFailure { .. })));
    assert!(!provider.has_repo("acme", "acme-a"));
    assert!(!provider
        .calls()
        .iter()
        .any(|call| call.contains("acme-b") && !call.starts_with("repo_exists")));
    assert!(!dir.path().join("imports.tf").exists());
}

#[tokio::test]
async fn only_selects_a_subset() {
    let (dir, provider) = scenario();
    let vcs = FakeVcs::default();
    let config = config(dir.path());

    run(&config, &Selection::only(["acme-c"]), true, &provider, &vcs)
        .await
        .unwrap();

    assert!(provider.has_repo("acme", "acme-c"));
    assert!(!provider.has_repo("acme", "acme-a"));
    let body = artifact_body(dir.path());
    assert_eq!(count_lines(&body, "import {"), 0);
    assert_eq!(count_lines(&body, "# create-fresh"), 1);
}

#[tokio::test]
async fn empty_selection_does_nothing() {
    let (dir, provider) = scenario();
    let vcs = FakeVcs::default();
    let config = config(dir.path());

    let report = run(
        &config,
        &Selection::exclude(["acme-a", "acme-b", "acme-c"]),
        true,
        &provider,
        &vcs,
    )
    .await
    .unwrap();

    assert_eq!(report, RunReport::NothingSelected);
    assert!(provider.calls().is_empty());
    assert!(!dir.path().join("imports.tf").exists());
}

#[tokio::test]
async fn both_only_and_exclude_is_a_usage_error() {
    let (dir, provider) = scenario();
    let vcs = FakeVcs::default();
    let config = config(dir.path());
    let selection = Selection {
        only: Some(vec!["acme-a".to_string()]),
        exclude: Some(vec!["acme-b".to_string()]),
    };

    let result = run(&config, &selection, true, &provider, &vcs).await;

    assert!(matches!(result, Err(MigrationError::Usage(_))));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn missing_snapshot_is_a_validation_error() {
    let dir = tempfile::tempdir().unwrap();
    let provider = FakeProvider::default();
    let vcs = FakeVcs::default();
    let config = config(dir.path());

    let result = run(&config, &Selection::default(), false, &provider, &vcs).await;

    assert!(matches!(result, Err(MigrationError::Validation(_))));
}
