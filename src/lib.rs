pub mod artifact;
pub mod cli;
pub mod descriptor;
pub mod error;
pub mod filter;
pub mod fixtures;
pub mod git;
pub mod github_provider;
pub mod orchestrator;
pub mod pipeline;
pub mod prober;
pub mod provider;
pub mod report;
pub mod rewrite;
pub mod snapshot;
