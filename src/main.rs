// Entrypoint for the batch uploader.
// - Keeps `main` small: parse flags, run the sync, print the result.
// - Errors go to stderr with exit status 1; elapsed time is printed either way.

use anyhow::Context;
use clap::Parser;
use insight_sync::api::ClientConfig;
use insight_sync::ui::{Console, Stopwatch};
use insight_sync::{init_logging, parse_args, sync_files, RecordType, SyncOptions, SyncOutcome};
use insight_sync::DEFAULT_BATCH_SIZE;

#[derive(Parser, Debug)]
#[command(name = "insight-sync")]
#[command(about = "Upload a JSON data file to an Insight subscription")]
#[command(override_usage = "insight-sync [-b number] -c credFile -f dataFile -t type")]
struct Cli {
    /// batch size (0: entire file)
    #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,
    /// credentials file
    #[arg(short, long)]
    creds: String,
    /// data file
    #[arg(short, long)]
    file: String,
    /// object type
    #[arg(short = 't', long = "type", value_enum, ignore_case = true)]
    record_type: RecordType,
}

fn main() {
    init_logging();
    let cli: Cli = parse_args();
    let opts = SyncOptions {
        creds: cli.creds,
        file: cli.file,
        record_type: cli.record_type,
        batch_size: cli.batch_size,
    };

    let stopwatch = Stopwatch::start();
    let mut console = Console::stdout();
    let result = sync_files(&opts, &ClientConfig::from_env(), &mut console)
        .with_context(|| format!("sync of {} failed", opts.file));
    match result {
        Ok(outcome) => {
            match outcome {
                SyncOutcome::Tally(tally) => console.line(tally),
                SyncOutcome::Raw(body) if !body.is_empty() => console.line(body),
                _ => {}
            }
            println!("{}", stopwatch.report());
        }
        Err(e) => {
            println!("{}", stopwatch.report());
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    }
}
