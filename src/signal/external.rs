//! Intake of caller-supplied traces.
//!
//! Uploaded content is CSV with a header row followed by `time,voltage,...`
//! rows. Only the first two columns are read.

use std::io::Read;

use log::debug;

use super::{SignalError, Trace};

/// Extension an uploaded file name must carry
pub const CSV_EXTENSION: &str = ".csv";

const HEADER_LINE: u64 = 1;
const MISSING_HEADER: &str = "missing header row";

/// Reject file names that do not end in `.csv`
pub fn check_csv_filename(filename: &str) -> Result<(), SignalError> {
    if filename.ends_with(CSV_EXTENSION) {
        Ok(())
    } else {
        Err(SignalError::UnsupportedFormat)
    }
}

/// Build a trace from already-split rows.
///
/// The first row is the header and is discarded; an empty row set has no
/// header and is rejected. Rows with fewer than two fields are skipped; a
/// non-numeric time or voltage fails the whole call.
pub fn accept_external<I, R, S>(rows: I) -> Result<Trace, SignalError>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let mut rows = rows.into_iter().enumerate();
    if rows.next().is_none() {
        return Err(SignalError::malformed(HEADER_LINE, MISSING_HEADER));
    }

    let mut time = Vec::new();
    let mut voltage = Vec::new();

    for (idx, row) in rows {
        let fields = row.as_ref();
        let line = idx as u64 + 1;

        if fields.len() < 2 {
            debug!("Skipping line {}: {} field(s)", line, fields.len());
            continue;
        }

        time.push(parse_field(line, "time", fields[0].as_ref())?);
        voltage.push(parse_field(line, "voltage", fields[1].as_ref())?);
    }

    Ok(Trace::new(time, voltage)?)
}

/// Parse CSV content from any reader.
///
/// The whole payload is read before any row is parsed.
pub fn parse_csv<R: Read>(mut reader: R) -> Result<Trace, SignalError> {
    let mut content = Vec::new();
    reader.read_to_end(&mut content)?;
    parse_csv_bytes(&content)
}

/// Parse an uploaded CSV payload, which must be valid UTF-8.
///
/// Physical line 1 is the header even when it is blank, so a blank first
/// line makes the column names the first data row. Zero-byte content has no
/// header at all and is rejected.
pub fn parse_csv_bytes(bytes: &[u8]) -> Result<Trace, SignalError> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        SignalError::malformed(0, format!("content is not valid UTF-8: {}", e))
    })?;
    if text.is_empty() {
        return Err(SignalError::malformed(HEADER_LINE, MISSING_HEADER));
    }

    // The tokenizer drops blank lines, so the header is found by position
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut time = Vec::new();
    let mut voltage = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if line == HEADER_LINE {
            continue;
        }
        if record.len() < 2 {
            debug!("Skipping line {}: {} field(s)", line, record.len());
            continue;
        }

        time.push(parse_field(line, "time", &record[0])?);
        voltage.push(parse_field(line, "voltage", &record[1])?);
    }

    debug!("Parsed {} samples from CSV", time.len());

    Ok(Trace::new(time, voltage)?)
}

fn parse_field(line: u64, name: &str, raw: &str) -> Result<f64, SignalError> {
    raw.trim().parse::<f64>().map_err(|_| {
        SignalError::malformed(line, format!("could not convert {} '{}' to float", name, raw))
    })
}
