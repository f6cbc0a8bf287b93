pub mod ingest;

use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ingest every repository of an organization into JSON reports
    Ingest(ingest::IngestArgs),
}

pub async fn run(cmd: Command) -> anyhow::Result<()> {
    match cmd {
        Command::Ingest(args) => ingest::run(args).await,
    }
}
