use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use stackscout_core::config::ScoutConfig;
use stackscout_core::fetch::GitHubClient;
use stackscout_core::pipeline::OrgIngestor;
use stackscout_core::progress::IndicatifReporter;
use stackscout_core::report::ReportWriter;

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// GitHub organization to ingest
    #[arg(long)]
    pub org: String,

    /// API token (falls back to the env var named in config, GITHUB_TOKEN
    /// by default)
    #[arg(long)]
    pub token: Option<String>,

    /// Output directory (overrides config)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Path to a stackscout config file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub async fn run(args: IngestArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => ScoutConfig::load(path)
            .with_context(|| format!("Cannot load config: {}", path.display()))?,
        None => ScoutConfig::default(),
    };

    // Resolve the token before touching the network or the filesystem.
    let token = match args.token {
        Some(token) => token,
        None => std::env::var(&config.github.token_env).map_err(|_| {
            anyhow::anyhow!(
                "Missing credential: set {} or pass --token",
                config.github.token_env
            )
        })?,
    };

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.output.directory));
    let writer = ReportWriter::new(&output).context("Cannot create output directory")?;

    let client = GitHubClient::with_base_url(config.github.api_base.clone(), Some(token));
    let ingestor = OrgIngestor::new(&client, &config);
    let progress = IndicatifReporter::new();

    info!(org = %args.org, output = %output.display(), "Starting ingestion");
    let summary = ingestor
        .ingest_org(&args.org, &writer, &progress)
        .await
        .context("Ingestion failed")?;

    println!(
        "✓ Ingested {} repositories from {} into {}",
        summary.repos_ingested,
        summary.org,
        output.display()
    );
    Ok(())
}
