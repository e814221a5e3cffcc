use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::{debug, error};
use voiceterrain::config::{Config, ConfigArgs};
use voiceterrain::{Capabilities, Processor, RequestResult};

const USAGE: &str = "Usage: voiceterrain [OPTIONS] <audio_file_path>";

/// Turn a spoken landscape description into terrain generator parameters.
#[derive(Parser, Debug)]
#[command(name = "voiceterrain", version, about)]
struct Cli {
    /// Audio file to interpret
    audio_file: PathBuf,

    /// Print per-stage timings to stderr
    #[arg(long)]
    timings: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

async fn run<F>(cli: Cli, connect: F) -> anyhow::Result<RequestResult>
where
    F: FnOnce(&Config) -> anyhow::Result<Capabilities>,
{
    let config = cli.config.into_config();
    debug!(?config, "resolved configuration");
    let processor = Processor::new(connect(&config)?);

    let (result, timings) = processor.process_timed(&cli.audio_file).await;

    if cli.timings {
        eprintln!("\nTimings:");
        for t in &timings {
            eprintln!("  {:20} {:8.1} ms", t.name, t.ms);
        }
    }

    Ok(result)
}

/// Maps a command line to the single result document. Argument errors,
/// `--help`/`--version`, errors and panics all become `{"error": ...}`.
async fn outcome<I, T, F>(args: I, connect: F) -> RequestResult
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    F: FnOnce(&Config) -> anyhow::Result<Capabilities> + Send + 'static,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return RequestResult::failure(e.render().to_string().trim_end());
        }
        Err(e) => {
            debug!(error = %e, "bad arguments");
            return RequestResult::failure(USAGE);
        }
    };

    match tokio::spawn(run(cli, connect)).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            error!(error = %e, "processing failed");
            RequestResult::failure(format!("{e:#}"))
        }
        Err(e) => {
            error!(error = %e, "processing panicked");
            RequestResult::failure(e.to_string())
        }
    }
}

/// Every outcome is one JSON document on stdout with exit status 0.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    voiceterrain::init_tracing();
    let result = outcome(std::env::args_os(), |config| Ok(config.capabilities()?)).await;
    println!("{}", result.to_json_pretty());
}
