// Record-at-a-time upload with date cleanup, or one bulk POST of the
// whole file. Used by `insight-sync-single`.

use crate::api::Transport;
use crate::batch::post_checked;
use crate::error::{RequestError, SubmitError};
use crate::loader::Credentials;
use crate::record::{clean_date_fields, record_id, Record, RecordType};
use crate::ui::Console;
use log::info;
use serde_json::Value;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingleOutcome {
    /// Number of records uploaded one by one.
    Processed(usize),
    /// Raw response body of the bulk request.
    Bulk(String),
}

/// Count of records uploaded one by one, printed when dropped so it also
/// shows after a failing record.
struct RecordSummary<'a, W: Write> {
    console: &'a mut Console<W>,
    count: usize,
}

impl<W: Write> Drop for RecordSummary<'_, W> {
    fn drop(&mut self) {
        self.console.finish();
        let line = format!("\nProcessed {} records", self.count);
        self.console.line(line);
    }
}

/// Upload `data` as `record_type` records. The type is checked before any
/// request is made.
pub fn process_data<T, W>(
    transport: &T,
    creds: &Credentials,
    record_type: &str,
    data: Vec<Record>,
    single: bool,
    console: &mut Console<W>,
) -> Result<SingleOutcome, SubmitError>
where
    T: Transport + ?Sized,
    W: Write,
{
    let record_type: RecordType = record_type.parse()?;
    let url = creds.endpoint(record_type);

    if !single {
        info!("bulk upload of {} {} records", data.len(), record_type);
        let body = Value::Array(data.into_iter().map(Value::Object).collect());
        let response = post_checked(transport, &url, &body)?;
        console.line(&response.body);
        return Ok(SingleOutcome::Bulk(response.body));
    }

    info!("uploading {} {} records one at a time", data.len(), record_type);
    console.start(data.len() as u64);
    let mut summary = RecordSummary { console, count: 0 };
    for (index, mut record) in data.into_iter().enumerate() {
        clean_date_fields(&mut record);
        let sent = record_id(&record)
            .ok_or(RequestError::MissingId)
            .and_then(|id| {
                let record_url = format!("{}/{}", url, urlencoding::encode(&id));
                post_checked(transport, &record_url, &Value::Object(record.clone()))
            });
        if let Err(source) = sent {
            return Err(SubmitError::Record {
                index,
                payload: serde_json::to_string(&record).unwrap_or_default(),
                source,
            });
        }
        summary.console.tick();
        summary.count += 1;
    }
    Ok(SingleOutcome::Processed(summary.count))
}
