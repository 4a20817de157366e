// Binary entrypoint for link-trail.
//
// Expands the file arguments, parses every transcript for web-fetch blocks
// and prints the resulting records as a JSON array on stdout. Progress and
// diagnostics go to stderr.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use linktrail_core::{expand_paths, LinkTrailError, LinkTrailResult, ScanConfig, TranscriptParser};

/// Extract web-fetch activity from session transcripts as JSON.
#[derive(Parser, Debug)]
#[command(name = "link-trail", version, about = "Recover fetched URLs and outcomes from session transcripts")]
struct Args {
    /// Transcript files or glob patterns (e.g. `.specstory/history/*.md`).
    #[arg(required = true)]
    patterns: Vec<String>,

    /// Path to a TOML scan configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Lines of context before each fetch block.
    #[arg(long)]
    lookback: Option<usize>,

    /// Worker threads for parsing files.
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Print the JSON array on a single line.
    #[arg(long)]
    compact: bool,

    /// Write JSON to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only log warnings and errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log per-block debug details.
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(args: &Args) {
    let default_level = if args.quiet {
        "warn"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn load_config(args: &Args) -> LinkTrailResult<ScanConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let config = ScanConfig::load(path)?;
            info!("Loaded configuration from {}", path.display());
            config
        }
        None => ScanConfig::default(),
    };
    // CLI flag overrides the config file value.
    if let Some(lookback) = args.lookback {
        config.lookback_lines = lookback;
    }
    Ok(config)
}

fn run(args: &Args) -> LinkTrailResult<()> {
    let config = load_config(args)?;
    let parser = TranscriptParser::new(&config)?;

    let files = expand_paths(&args.patterns);
    if files.is_empty() {
        return Err(LinkTrailError::NoInput(
            "no files found matching the provided patterns".to_string(),
        ));
    }

    info!("Processing {} file(s)...", files.len());
    let records = parser.parse_files(&files, args.jobs);

    let json = if args.compact {
        serde_json::to_string(&records)?
    } else {
        serde_json::to_string_pretty(&records)?
    };

    match &args.output {
        Some(path) => std::fs::write(path, json + "\n")?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }

    info!("Found {} {} instance(s).", records.len(), config.fetch_tool);
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linktrail_core::FetchRecord;

    fn args(extra: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("link-trail").chain(extra.iter().copied())).unwrap()
    }

    const BLOCK: &str = "<tool-use data-tool-name=\"WebFetch\">\n```\n# Landing Page\n```\n</tool-use>\n";

    #[test]
    fn test_no_matching_files_is_no_input() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.md", dir.path().display());
        let missing = dir.path().join("absent.md").display().to_string();
        assert!(matches!(run(&args(&[pattern.as_str()])), Err(LinkTrailError::NoInput(_))));
        assert!(matches!(run(&args(&[missing.as_str()])), Err(LinkTrailError::NoInput(_))));
    }

    #[test]
    fn test_missing_file_skipped_and_output_written() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("session.md");
        std::fs::write(&good, BLOCK).unwrap();
        let missing = dir.path().join("absent.md");
        let out = dir.path().join("records.json");

        let result = run(&args(&[
            good.display().to_string().as_str(),
            missing.display().to_string().as_str(),
            "--compact",
            "-o",
            out.display().to_string().as_str(),
        ]));
        assert!(result.is_ok());

        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written.lines().count(), 1);
        let records: Vec<FetchRecord> = serde_json::from_str(&written).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].summary.as_deref(), Some("Landing Page"));
    }

    #[test]
    fn test_invalid_config_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = dir.path().join("session.md");
        std::fs::write(&transcript, BLOCK).unwrap();
        let config = dir.path().join("scan.toml");
        std::fs::write(&config, "lookback_lines = 0\n").unwrap();

        let result = run(&args(&[
            transcript.display().to_string().as_str(),
            "--config",
            config.display().to_string().as_str(),
        ]));
        assert!(matches!(result, Err(LinkTrailError::Config(_))));
    }

    #[test]
    fn test_lookback_flag_overrides_config() {
        let config = load_config(&args(&["x.md", "--lookback", "7"])).unwrap();
        assert_eq!(config.lookback_lines, 7);
    }

    #[test]
    fn test_patterns_required() {
        assert!(Args::try_parse_from(["link-trail"]).is_err());
        assert!(Args::try_parse_from(["link-trail", "a.md", "-q", "-v"]).is_err());
    }
}
