use clap::Parser;

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "stackscout",
    version,
    about = "Mine a GitHub organization for stack intelligence"
)]
struct Cli {
    #[command(subcommand)]
    command: commands::Command,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Classify an error into an exit code.
///
/// Exit codes:
///   0 — success
///   1 — general/unknown error
///   2 — configuration error (bad config file, missing token)
///   3 — organization not found
///   5 — host API error (auth, rate limit)
///   7 — report write failed
fn classify_exit_code(err: &anyhow::Error) -> i32 {
    let msg = format!("{err:#}");
    let lower = msg.to_lowercase();

    if lower.contains("organization not found") {
        3
    } else if lower.contains("config") || lower.contains("missing credential") {
        2
    } else if lower.contains("api error")
        || lower.contains("rate limit")
        || lower.contains("network error")
    {
        5
    } else if lower.contains("io error") || lower.contains("serialization error") {
        7
    } else {
        1
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let filter = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (_, 0) => "warn",
        (_, 1) => "info",
        (_, 2) => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: Failed to create runtime: {e}");
            std::process::exit(1);
        }
    };

    match runtime.block_on(commands::run(cli.command)) {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(classify_exit_code(&e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_org_not_found() {
        let err = anyhow::anyhow!("Fetch error: Organization not found: acme");
        assert_eq!(classify_exit_code(&err), 3);
    }

    #[test]
    fn exit_code_missing_token() {
        let err = anyhow::anyhow!("Missing credential: set GITHUB_TOKEN or pass --token");
        assert_eq!(classify_exit_code(&err), 2);
    }

    #[test]
    fn exit_code_bad_config() {
        let err = anyhow::anyhow!("Cannot parse config: bad toml");
        assert_eq!(classify_exit_code(&err), 2);
    }

    #[test]
    fn exit_code_api_error() {
        let err = anyhow::anyhow!("API error (HTTP 403): rate limit exceeded");
        assert_eq!(classify_exit_code(&err), 5);
    }

    #[test]
    fn exit_code_report_write() {
        let err = anyhow::anyhow!("Report error: IO error: permission denied");
        assert_eq!(classify_exit_code(&err), 7);
    }

    #[test]
    fn exit_code_general() {
        let err = anyhow::anyhow!("Something unexpected happened");
        assert_eq!(classify_exit_code(&err), 1);
    }
}
