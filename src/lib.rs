// Library root
// -----------
// Everything the three binaries need lives here so it can be tested
// without a network or a terminal.
//
// Module responsibilities:
// - `record`: record/type model and the `_date` field cleanup.
// - `loader`: credentials and data files (JSON on local disk).
// - `api`: the `Transport` seam and the blocking HTTP client.
// - `batch`: chunked, per-record and whole-file uploads with tallies.
// - `single`: record-at-a-time upload with per-record error reporting.
// - `combine`: merge per-record fragments into one file per type.
// - `ui`: progress bar, console lines and timing.
pub mod api;
pub mod batch;
pub mod combine;
pub mod error;
pub mod loader;
pub mod record;
pub mod single;
pub mod ui;

pub use batch::{submit_batches, sync_files, SyncOptions, SyncOutcome, DEFAULT_BATCH_SIZE};
pub use error::{RequestError, SubmitError};
pub use record::{Dataset, Record, RecordType};

/// Install the `env_logger` backend; `RUST_LOG` overrides the default
/// `warn` level.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();
}

/// Parse command-line arguments, exiting with status 1 on usage errors
/// (help and version still exit 0).
pub fn parse_args<P: clap::Parser>() -> P {
    match P::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    }
}
