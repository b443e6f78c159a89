// Record-at-a-time uploader: `insight-sync-single <creds> <type> <file> [-s]`.

use anyhow::{Context, Result};
use clap::Parser;
use insight_sync::api::{ApiClient, ClientConfig};
use insight_sync::loader::{load_credentials, load_dataset};
use insight_sync::single::{process_data, SingleOutcome};
use insight_sync::ui::{Console, Stopwatch};
use insight_sync::{init_logging, parse_args};

#[derive(Parser, Debug)]
#[command(name = "insight-sync-single")]
#[command(about = "Upload records one at a time, or the whole file in one request")]
struct Cli {
    /// credentials file
    credential_file: String,
    /// object type (school, section, student, teacher, term)
    record_type: String,
    /// data file
    filename: String,
    /// submit each record individually
    #[arg(short, long)]
    single: bool,
}

fn run(cli: Cli) -> Result<SingleOutcome> {
    let creds = load_credentials(&cli.credential_file)?;
    let data = load_dataset(&cli.filename)?;
    let client = ApiClient::new(&creds, &ClientConfig::from_env())?;
    let mut console = Console::stdout();
    let outcome = process_data(&client, &creds, &cli.record_type, data, cli.single, &mut console)
        .with_context(|| format!("upload of {} failed", cli.filename))?;
    Ok(outcome)
}

fn main() {
    init_logging();
    let cli: Cli = parse_args();
    let stopwatch = Stopwatch::start();
    let result = run(cli);
    println!("{}", stopwatch.report());
    if let Err(e) = result {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn single_defaults_to_false() {
        let cli = Cli::try_parse_from(["insight-sync-single", "c.json", "Student", "d.json"]).unwrap();
        assert!(!cli.single);
        assert_eq!(cli.credential_file, "c.json");
        assert_eq!(cli.record_type, "Student");
        assert_eq!(cli.filename, "d.json");
    }

    #[test]
    fn single_flag_short_and_long() {
        let short = Cli::try_parse_from(["insight-sync-single", "-s", "c.json", "term", "d.json"]).unwrap();
        let long =
            Cli::try_parse_from(["insight-sync-single", "c.json", "term", "d.json", "--single"]).unwrap();
        assert!(short.single);
        assert!(long.single);
    }

    #[test]
    fn missing_positionals_are_rejected() {
        let err = Cli::try_parse_from(["insight-sync-single", "c.json", "term"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(err.use_stderr());
    }
}
