use std::fmt;

use crate::pipeline::{MigrationResult, Outcome};
use crate::snapshot::Snapshot;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    /// `(repository, warning)` pairs in result order.
    pub warnings: Vec<(String, String)>,
    /// Terraform `-target` flags for the repositories covered by the run.
    pub target_flags: Vec<String>,
}

impl Summary {
    pub fn from_results(results: &[MigrationResult], snapshot: &Snapshot) -> Self {
        let mut summary = Summary::default();

        for result in results {
            match result.outcome {
                Outcome::Success => summary.succeeded += 1,
                Outcome::Skipped => summary.skipped += 1,
                Outcome::Failed => summary.failed += 1,
            }

            for warning in &result.warnings {
                summary
                    .warnings
                    .push((result.descriptor.target_name.clone(), warning.clone()));
            }

            if result.outcome != Outcome::Failed {
                summary
                    .target_flags
                    .extend(snapshot.target_flags(&result.descriptor));
            }
        }

        summary
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "migrated: {}, skipped: {}, failed: {}, warnings: {}",
            self.succeeded,
            self.skipped,
            self.failed,
            self.warnings.len()
        )?;

        for (repository, warning) in &self.warnings {
            writeln!(f, "  warning [{}]: {}", repository, warning)?;
        }

        if !self.target_flags.is_empty() {
            writeln!(f, "follow up with:")?;
            writeln!(f, "  terraform apply {}", self.target_flags.join(" "))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::NamePrefixes;
    use crate::fixtures::fakes::descriptor;
    use crate::pipeline::MigrationState;
    use crate::prober::Action;
    use crate::snapshot::parse_snapshot;

    fn result(name: &str, outcome: Outcome, warnings: &[&str]) -> MigrationResult {
        MigrationResult {
            descriptor: descriptor(name),
            action: Action::Fork,
            outcome,
            final_state: MigrationState::Done,
            error: None,
            warnings: warnings.iter().map(|w| w.to_string()).collect(),
        }
    }

    fn snapshot() -> Snapshot {
        let doc = r#"{"resource": {
            "github_repository": {"a": {"name": "acme-a"}, "b": {"name": "acme-b"}},
            "github_branch_protection": {"a_main": {}, "b_main": {}}
        }}"#;
        parse_snapshot(doc, "github_repository", &NamePrefixes::new("legacy-", "acme-")).unwrap()
    }

    #[test]
    fn counts_outcomes_and_collects_warnings() {
        let results = vec![
            result("a", Outcome::Success, &["reference rewrite: boom"]),
            result("b", Outcome::Failed, &[]),
        ];

        let summary = Summary::from_results(&results, &snapshot());

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 0);
        assert_eq!(
            summary.warnings,
            vec![("acme-a".to_string(), "reference rewrite: boom".to_string())]
        );
        assert_eq!(
            summary.target_flags,
            vec![
                "-target=github_branch_protection.a_main",
                "-target=github_repository.a"
            ]
        );
    }

    #[test]
    fn display_lists_follow_up_command() {
        let results = vec![result("b", Outcome::Skipped, &[])];

        let rendered = Summary::from_results(&results, &snapshot()).to_string();

        assert!(rendered.starts_with("migrated: 0, skipped: 1, failed: 0, warnings: 0\n"));
        assert!(rendered.contains(
            "terraform apply -target=github_branch_protection.b_main -target=github_repository.b"
        ));
    }
}
