//! Modpack attributor CLI
//!
//! Reads a CurseForge modpack, resolves every bundled mod through the
//! CurseForge API and prints a credits document.
//!
//! # Usage
//!
//! ```bash
//! CURSEFORGE_API_KEY=... modpack-attributor pack.zip --output CREDITS.md
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use attributor::{
    load_modpack, AttributorConfigBuilder, AttributorError, CancellationToken, ConsoleProgressReporter,
    CreditsFormat, CurseForgeClient, IntoProgressCallback, Resolver,
};
use clap::Parser;
use tracing::{debug, info};

/// Exit code used when the run was interrupted
const EXIT_CANCELLED: u8 = 130;
/// Exit code used with --strict when some projects could not be resolved
const EXIT_UNRESOLVED: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "modpack-attributor")]
#[command(about = "Generate a mod attribution list for a CurseForge modpack", long_about = None)]
struct Args {
    /// Modpack archive (.zip) or its manifest.json
    modpack: PathBuf,

    /// Write the credits to this file instead of stdout (extension added from --format when missing)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Credits format: markdown (md) or json
    #[arg(long, value_parser = clap::value_parser!(CreditsFormat), default_value = "markdown")]
    format: CreditsFormat,

    /// Maximum number of catalog requests in flight
    #[arg(long, default_value = "4")]
    max_concurrent: usize,

    /// CurseForge API key
    #[arg(long, env = "CURSEFORGE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Catalog API base URL
    #[arg(long, default_value = attributor::config::DEFAULT_API_BASE)]
    api_base: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Retry attempts for transient catalog failures
    #[arg(long, default_value = "3")]
    retries: usize,

    /// Exit with status 2 when any project could not be resolved
    #[arg(long)]
    strict: bool,

    /// Verbose output (repeat for debug logging)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(hint) = e.downcast_ref::<AttributorError>().and_then(|ae| ae.suggestion()) {
                eprintln!("Hint: {}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let manifest = load_modpack(&args.modpack)
        .await
        .with_context(|| format!("could not read modpack {}", args.modpack.display()))?;
    info!(
        "Loaded '{}' {} with {} mod entries",
        manifest.name,
        manifest.version,
        manifest.references().len()
    );

    let mut builder = AttributorConfigBuilder::new()
        .max_concurrent_fetches(args.max_concurrent)
        .api_base(args.api_base.clone())
        .timeout(Duration::from_secs(args.timeout))
        .max_retries(args.retries);
    if let Some(ref key) = args.api_key {
        builder = builder.api_key(key.clone());
    }
    let config = builder.build();

    let client = CurseForgeClient::new(config.clone())?;
    let resolver = Resolver::new(client, config)
        .with_progress_callback(ConsoleProgressReporter::new(args.verbose > 0).into_callback());

    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupt received");
            ctrl_c_token.cancel();
        }
    });

    let Some(set) = resolver.resolve_with_cancellation(manifest.references(), &token).await else {
        eprintln!("Cancelled.");
        return Ok(ExitCode::from(EXIT_CANCELLED));
    };

    let document = args.format.render(&set)?;
    match args.output {
        Some(ref path) => write_output(&output_path(path, args.format), &document).await?,
        None => print!("{}", document),
    }

    let snapshot = resolver.metrics().snapshot();
    info!(
        "{} unique projects, {} duplicate references, {} unresolved",
        snapshot.unique_projects,
        snapshot.duplicate_references,
        snapshot.failed_projects()
    );

    let unresolved = set.failed().count();
    if unresolved > 0 {
        eprintln!("Warning: {} project(s) could not be resolved", unresolved);
        if args.strict {
            return Ok(ExitCode::from(EXIT_UNRESOLVED));
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Give an extensionless output path the extension of its format
fn output_path(path: &Path, format: CreditsFormat) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(format.file_extension())
    }
}

async fn write_output(path: &Path, document: &str) -> anyhow::Result<()> {
    tokio::fs::write(path, document)
        .await
        .with_context(|| format!("could not write credits to {}", path.display()))?;
    eprintln!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["modpack-attributor", "pack.zip"]).unwrap();

        assert_eq!(args.modpack, PathBuf::from("pack.zip"));
        assert_eq!(args.max_concurrent, 4);
        assert_eq!(args.format, CreditsFormat::Markdown);
        assert_eq!(args.api_base, attributor::config::DEFAULT_API_BASE);
        assert!(!args.strict);
    }

    #[test]
    fn test_json_format_and_verbosity() {
        let args = Args::try_parse_from(["modpack-attributor", "manifest.json", "--format", "json", "-vv"]).unwrap();

        assert_eq!(args.format, CreditsFormat::Json);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_format_aliases_and_rejection() {
        let args = Args::try_parse_from(["modpack-attributor", "pack.zip", "--format", "MD"]).unwrap();
        assert_eq!(args.format, CreditsFormat::Markdown);

        assert!(Args::try_parse_from(["modpack-attributor", "pack.zip", "--format", "html"]).is_err());
    }

    #[test]
    fn test_output_path_takes_extension_from_format() {
        assert_eq!(output_path(Path::new("CREDITS"), CreditsFormat::Markdown), PathBuf::from("CREDITS.md"));
        assert_eq!(output_path(Path::new("out/credits"), CreditsFormat::Json), PathBuf::from("out/credits.json"));
        assert_eq!(output_path(Path::new("credits.txt"), CreditsFormat::Json), PathBuf::from("credits.txt"));
    }
}
