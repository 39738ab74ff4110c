use repo_migrate::{
    cli, git::GitCli, github_provider::GithubProvider, orchestrator, orchestrator::RunReport,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("repo_migrate=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let invocation = cli::run()?;
    let config = &invocation.config;

    let provider = GithubProvider::new(&config.token, config.api_url.as_deref())?;
    let git = GitCli::new(Some(&config.token));

    let report = orchestrator::run(
        config,
        &invocation.selection,
        invocation.execute,
        &provider,
        &git,
    )
    .await?;

    match report {
        RunReport::NothingSelected => println!("no repositories selected"),
        RunReport::Completed {
            dry_run,
            summary,
            artifact,
        } => {
            if dry_run {
                println!("dry run, nothing was changed");
            }
            print!("{}", summary);
            println!("import artifact: {}", artifact.display());
        }
    }

    Ok(())
}
