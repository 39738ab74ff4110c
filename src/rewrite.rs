//! Literal token rewriting across workflow and ownership files.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use regex::{NoExpand, Regex};
use tracing::debug;

/// Files considered for rewriting, relative to the repository root.
pub const DEFAULT_REWRITE_PATHS: &[&str] = &[
    ".github/workflows/*.yml",
    ".github/workflows/*.yaml",
    "CODEOWNERS",
    ".github/CODEOWNERS",
    "docs/CODEOWNERS",
];

/// Replaces every literal occurrence of `pattern` with `replacement`.
#[derive(Clone, Debug)]
pub struct ReplacementRule {
    pattern: Regex,
    replacement: String,
}

impl ReplacementRule {
    pub fn literal(pattern: &str, replacement: &str) -> Result<Self, regex::Error> {
        Ok(ReplacementRule {
            pattern: Regex::new(&regex::escape(pattern))?,
            replacement: replacement.to_string(),
        })
    }

    pub fn apply(&self, content: &str) -> String {
        self.pattern
            .replace_all(content, NoExpand(&self.replacement))
            .into_owned()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Rewriter {
    rules: Vec<ReplacementRule>,
    paths: Vec<String>,
}

impl Rewriter {
    pub fn new(rules: Vec<ReplacementRule>, paths: Vec<String>) -> Self {
        Rewriter { rules, paths }
    }

    /// Applies the rules in order. Returns `None` when nothing changed.
    pub fn rewrite_content(&self, content: &str) -> Option<String> {
        let rewritten = self
            .rules
            .iter()
            .fold(content.to_string(), |acc, rule| rule.apply(&acc));

        if rewritten == content {
            None
        } else {
            Some(rewritten)
        }
    }

    /// Rewrites matching files under `root` in place and returns the changed
    /// paths relative to `root`.
    pub fn rewrite_tree(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        let mut changed = Vec::new();

        for path in self.candidates(root)? {
            let bytes = std::fs::read(&path)?;
            let content = match String::from_utf8(bytes) {
                Ok(content) => content,
                Err(_) => {
                    debug!(path = %path.display(), "skipping non utf-8 file");
                    continue;
                }
            };

            if let Some(rewritten) = self.rewrite_content(&content) {
                std::fs::write(&path, rewritten)?;
                let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
                debug!(path = %relative.display(), "rewrote references");
                changed.push(relative);
            }
        }

        Ok(changed)
    }

    fn candidates(&self, root: &Path) -> io::Result<BTreeSet<PathBuf>> {
        let mut candidates = BTreeSet::new();

        for pattern in &self.paths {
            let full = root.join(pattern);
            let entries = glob::glob(&full.to_string_lossy())
                .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;

            for entry in entries {
                let path = entry.map_err(io::Error::from)?;
                if path.is_file() {
                    candidates.insert(path);
                }
            }
        }

        Ok(candidates)
    }
}
