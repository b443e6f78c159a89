// Batch upload: split the dataset into contiguous chunks, POST them one
// after another and add up the per-label counts the server returns.

use crate::api::{ApiClient, ApiResponse, ClientConfig, Transport};
use crate::error::{RequestError, SubmitError};
use crate::loader::{load_credentials, load_dataset, Credentials};
use crate::record::{record_id, Record, RecordType};
use crate::ui::Console;
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

pub const DEFAULT_BATCH_SIZE: usize = 200;

/// How a dataset is split into requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    /// Whole dataset in one request.
    Whole,
    /// One request per record, to `{endpoint}/{id}`.
    PerRecord,
    /// Contiguous chunks of this many records.
    Chunked(usize),
}

impl BatchMode {
    pub fn from_size(size: usize) -> Self {
        match size {
            0 => BatchMode::Whole,
            1 => BatchMode::PerRecord,
            n => BatchMode::Chunked(n),
        }
    }

    /// Number of requests needed for `total` records.
    pub fn requests(self, total: usize) -> usize {
        match self {
            BatchMode::Whole => 1,
            BatchMode::PerRecord => total,
            BatchMode::Chunked(n) => total.div_ceil(n),
        }
    }
}

/// Running totals of the outcome counts reported by the bulk endpoint,
/// e.g. `{"created": 5, "updated": 1}`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultTally(BTreeMap<String, u64>);

impl ResultTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one batch's counts and return that batch's total.
    pub fn merge(&mut self, counts: &Map<String, Value>) -> u64 {
        let mut batch_total: u64 = 0;
        for (label, value) in counts {
            match value.as_u64() {
                Some(n) => {
                    let count = self.0.entry(label.clone()).or_insert(0);
                    *count = count.saturating_add(n);
                    batch_total = batch_total.saturating_add(n);
                }
                None => warn!("ignoring non-count result {}={}", label, value),
            }
        }
        batch_total
    }

    pub fn get(&self, label: &str) -> u64 {
        self.0.get(label).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl fmt::Display for ResultTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.0) {
            Ok(s) => f.write_str(&s),
            Err(_) => Err(fmt::Error),
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Per-record uploads; the endpoint returns no counts.
    Empty,
    Tally(ResultTally),
    /// Raw body of the single whole-dataset request.
    Raw(String),
}

/// Options of the batch command.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub creds: String,
    pub file: String,
    pub record_type: RecordType,
    pub batch_size: usize,
}

/// Counters for one run. The summary line is written when this is
/// dropped, so it appears on success and on every error path.
struct Summary<'a, W: Write> {
    console: &'a mut Console<W>,
    total: usize,
    processed: u64,
    batches: usize,
}

impl<W: Write> Drop for Summary<'_, W> {
    fn drop(&mut self) {
        self.console.finish();
        let line = format!(
            "\nProcessed {}/{} in {} batches.",
            self.processed, self.total, self.batches
        );
        self.console.line(line);
    }
}

/// POST `body` and treat any non-2xx status as an error.
pub(crate) fn post_checked<T: Transport + ?Sized>(
    transport: &T,
    url: &str,
    body: &Value,
) -> Result<ApiResponse, RequestError> {
    let response = transport.post(url, body)?;
    if !response.is_success() {
        return Err(RequestError::Rejected {
            status: response.status,
            body: response.body,
        });
    }
    Ok(response)
}

fn pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unprintable: {}>", e))
}

/// Upload `data` to the `record_type` collection of `creds`' subscription.
///
/// `batch_size` 0 sends everything in one request, 1 sends each record to
/// its own URL, anything larger sends contiguous chunks of that size and
/// accumulates the returned counts. The first failure stops the run.
pub fn submit_batches<T, W>(
    transport: &T,
    creds: &Credentials,
    record_type: RecordType,
    data: &[Record],
    batch_size: usize,
    console: &mut Console<W>,
) -> Result<SyncOutcome, SubmitError>
where
    T: Transport + ?Sized,
    W: Write,
{
    let url = creds.endpoint(record_type);
    let mode = BatchMode::from_size(batch_size);
    let total = data.len();
    info!("uploading {} {} records to {} ({:?})", total, record_type, url, mode);

    match mode {
        BatchMode::Whole => console.line(format!("Submitting {} objects all at once.", total)),
        _ => console.line(format!(
            "Total objects: {} sending in batches of: {}",
            total, batch_size
        )),
    }
    console.start(mode.requests(total) as u64);

    let mut summary = Summary {
        console,
        total,
        processed: 0,
        batches: 0,
    };

    match mode {
        BatchMode::Whole => {
            let body = Value::Array(data.iter().cloned().map(Value::Object).collect());
            let response = post_checked(transport, &url, &body)?;
            summary.console.tick();
            summary.batches = 1;
            summary.processed = total as u64;
            Ok(SyncOutcome::Raw(response.body))
        }
        BatchMode::PerRecord => {
            for (index, record) in data.iter().enumerate() {
                let sent = record_id(record)
                    .ok_or(RequestError::MissingId)
                    .and_then(|id| {
                        let record_url = format!("{}/{}", url, urlencoding::encode(&id));
                        post_checked(transport, &record_url, &Value::Object(record.clone()))
                    });
                if let Err(source) = sent {
                    summary.console.error(format!("\n\nERROR: {}", source));
                    return Err(SubmitError::Batch {
                        index,
                        payload: pretty(record),
                        source,
                    });
                }
                summary.console.tick();
                summary.batches += 1;
                summary.processed += 1;
            }
            Ok(SyncOutcome::Empty)
        }
        BatchMode::Chunked(size) => {
            let mut tally = ResultTally::new();
            for (n, chunk) in data.chunks(size).enumerate() {
                let index = n * size;
                let body = Value::Array(chunk.iter().cloned().map(Value::Object).collect());
                debug!("batch {} at index {} ({} records)", n, index, chunk.len());
                let counted = post_checked(transport, &url, &body).and_then(|response| {
                    serde_json::from_str::<Map<String, Value>>(&response.body)
                        .map_err(|_| RequestError::BadResponse(response.body))
                });
                let counts = match counted {
                    Ok(counts) => counts,
                    Err(source) => {
                        summary.console.error(format!("\n\nERROR: {}", source));
                        summary.console.line(&tally);
                        return Err(SubmitError::Batch {
                            index,
                            payload: pretty(chunk),
                            source,
                        });
                    }
                };
                let batch_total = tally.merge(&counts);
                if batch_total != chunk.len() as u64 {
                    warn!(
                        "batch at index {} had {} records, server counted {}",
                        index,
                        chunk.len(),
                        batch_total
                    );
                }
                summary.console.tick();
                summary.batches += 1;
                // a batch never accounts for more records than it carried
                summary.processed += batch_total.min(chunk.len() as u64);
            }
            Ok(SyncOutcome::Tally(tally))
        }
    }
}

/// Load both files, build the HTTP client and run `submit_batches`.
pub fn sync_files<W: Write>(
    opts: &SyncOptions,
    config: &ClientConfig,
    console: &mut Console<W>,
) -> Result<SyncOutcome, SubmitError> {
    let creds = load_credentials(&opts.creds)?;
    let data = load_dataset(&opts.file)?;
    let client = ApiClient::new(&creds, config)?;
    submit_batches(&client, &creds, opts.record_type, &data, opts.batch_size, console)
}
