use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use crate::base::{SentimentReading, SentimentSnapshot};
use crate::error::{Result, SentimentError};

pub const FIELD_NAMES: [&str; 6] = [
    "timestamp",
    "instrumentID",
    "buyersPercentage",
    "sellersPercentage",
    "imbalance",
    "price",
];

const FILE_PREFIX: &str = "plus500_";
const ROW_TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";
const SNAPSHOT_NAME_FORMAT: &str = "%y%m%d_%H%M";

#[derive(Serialize)]
struct InstrumentLogRow<'r> {
    timestamp: String,
    instrument: &'r str,
    buyers_percentage: f64,
    sellers_percentage: f64,
    imbalance: f64,
    price: f64,
}

#[derive(Serialize)]
struct SnapshotRow<'r> {
    instrument: &'r str,
    buyers_percentage: f64,
    sellers_percentage: f64,
    imbalance: f64,
    price: f64,
}

/// Writes per-instrument history logs and per-run snapshots into one directory.
///
/// The directory must already exist.
pub struct SentimentCsvWriter<'a> {
    output_dir: PathBuf,
    fields: &'a [&'a str; 6],
}

impl SentimentCsvWriter<'static> {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        SentimentCsvWriter::with_fields(output_dir, &FIELD_NAMES)
    }
}

impl<'a> SentimentCsvWriter<'a> {
    /// `fields` is the full log header, one name per log column.
    /// The snapshot header drops the timestamp column.
    pub fn with_fields<P: AsRef<Path>>(output_dir: P, fields: &'a [&'a str; 6]) -> Self {
        SentimentCsvWriter { output_dir: output_dir.as_ref().to_owned(), fields }
    }

    pub fn instrument_log_path(&self, instrument: &str) -> PathBuf {
        self.output_dir.join(format!("{}{}.csv", FILE_PREFIX, instrument))
    }

    pub fn snapshot_path(&self, run_time: &NaiveDateTime) -> PathBuf {
        self.output_dir.join(format!("{}{}.csv", FILE_PREFIX, run_time.format(SNAPSHOT_NAME_FORMAT)))
    }

    /// Appends one row to the instrument's log, writing the header first for a new file.
    pub fn append_instrument_row(&self, instrument: &str, reading: &SentimentReading,
                                 run_time: &NaiveDateTime) -> Result<PathBuf> {
        let path = self.instrument_log_path(instrument);
        let is_new = !path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SentimentError::OutputIo { path: path.clone(), source })?;

        let mut csv_writer = csv_writer(file);
        if is_new {
            csv_writer.write_record(&self.fields[..])
                .map_err(|source| SentimentError::Csv { path: path.clone(), source })?;
        }
        let row = InstrumentLogRow {
            timestamp: run_time.format(ROW_TIMESTAMP_FORMAT).to_string(),
            instrument,
            buyers_percentage: reading.buyers_percentage,
            sellers_percentage: reading.sellers_percentage,
            imbalance: reading.imbalance,
            price: reading.price,
        };
        csv_writer
            .serialize(row)
            .map_err(|source| SentimentError::Csv { path: path.clone(), source })?;
        finish(csv_writer, &path)?;

        debug!("Appended {} to {}", instrument, path.display());
        Ok(path)
    }

    /// Creates or truncates the run's snapshot file.
    pub fn write_snapshot(&self, snapshot: &SentimentSnapshot, run_time: &NaiveDateTime) -> Result<PathBuf> {
        let path = self.snapshot_path(run_time);
        let file = File::create(&path)
            .map_err(|source| SentimentError::OutputIo { path: path.clone(), source })?;

        let mut csv_writer = csv_writer(file);
        csv_writer.write_record(&self.fields[1..])
            .map_err(|source| SentimentError::Csv { path: path.clone(), source })?;
        for (instrument, reading) in snapshot.iter() {
            let row = SnapshotRow {
                instrument,
                buyers_percentage: reading.buyers_percentage,
                sellers_percentage: reading.sellers_percentage,
                imbalance: reading.imbalance,
                price: reading.price,
            };
            csv_writer
                .serialize(row)
                .map_err(|source| SentimentError::Csv { path: path.clone(), source })?;
        }
        finish(csv_writer, &path)?;

        debug!("Wrote {} instruments to {}", snapshot.len(), path.display());
        Ok(path)
    }
}

fn csv_writer<W: Write>(w: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(w)
}

fn finish<W: Write>(mut csv_writer: csv::Writer<W>, path: &Path) -> Result<()> {
    csv_writer.flush()
        .map_err(|source| SentimentError::OutputIo { path: path.to_owned(), source })
}

/// Persists a run: one row per instrument log plus the run snapshot.
/// Returns the snapshot path.
pub fn write_results<P: AsRef<Path>>(snapshot: &SentimentSnapshot, output_dir: P,
                                     run_time: &NaiveDateTime) -> Result<PathBuf> {
    let writer = SentimentCsvWriter::new(output_dir);
    for (instrument, reading) in snapshot.iter() {
        writer.append_instrument_row(instrument, reading, run_time)?;
    }
    writer.write_snapshot(snapshot, run_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn run_time(hour: u32, min: u32, sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(hour, min, sec).unwrap()
    }

    fn sample_snapshot() -> SentimentSnapshot {
        let mut snapshot = SentimentSnapshot::new();
        snapshot.insert("EURUSD", SentimentReading::new(70.0, 30.0, 1.0845));
        snapshot.insert("AAPL", SentimentReading::new(48.0, 52.0, 171.5));
        snapshot
    }

    #[test]
    fn file_names() {
        let writer = SentimentCsvWriter::new("/tmp/out");
        assert_eq!(writer.instrument_log_path("AAPL"), PathBuf::from("/tmp/out/plus500_AAPL.csv"));
        assert_eq!(writer.snapshot_path(&run_time(9, 5, 59)), PathBuf::from("/tmp/out/plus500_240305_0905.csv"));
    }

    #[test]
    fn instrument_log_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SentimentCsvWriter::new(dir.path());
        let reading = SentimentReading::new(70.0, 30.0, 123.45);

        writer.append_instrument_row("AAPL", &reading, &run_time(14, 7, 9)).unwrap();
        let path = writer.append_instrument_row("AAPL", &reading, &run_time(14, 8, 10)).unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content, "\
timestamp,instrumentID,buyersPercentage,sellersPercentage,imbalance,price
2024/03/05 14:07:09,AAPL,70.0,30.0,40.0,123.45
2024/03/05 14:08:10,AAPL,70.0,30.0,40.0,123.45
");
    }

    #[test]
    fn snapshot_has_five_columns() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SentimentCsvWriter::new(dir.path());
        let path = writer.write_snapshot(&sample_snapshot(), &run_time(14, 7, 9)).unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content, "\
instrumentID,buyersPercentage,sellersPercentage,imbalance,price
EURUSD,70.0,30.0,40.0,1.0845
AAPL,48.0,52.0,-4.0,171.5
");
    }

    #[test]
    fn custom_fields_drive_both_headers() {
        let dir = tempfile::tempdir().unwrap();
        let fields = ["ts", "id", "buy", "sell", "imb", "px"];
        let writer = SentimentCsvWriter::with_fields(dir.path(), &fields);
        let snapshot = sample_snapshot();
        let time = run_time(1, 2, 3);

        let log = writer.append_instrument_row("AAPL", snapshot.get("AAPL").unwrap(), &time).unwrap();
        let snap = writer.write_snapshot(&snapshot, &time).unwrap();

        assert!(fs::read_to_string(log).unwrap().starts_with("ts,id,buy,sell,imb,px\n"));
        assert!(fs::read_to_string(snap).unwrap().starts_with("id,buy,sell,imb,px\n"));
    }

    #[test]
    fn header_width_matches_rows() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SentimentCsvWriter::new(dir.path());
        let snapshot = sample_snapshot();
        let time = run_time(1, 2, 3);

        let log = writer.append_instrument_row("AAPL", snapshot.get("AAPL").unwrap(), &time).unwrap();
        let snap = writer.write_snapshot(&snapshot, &time).unwrap();

        for (path, width) in vec![(log, 6), (snap, 5)] {
            let content = fs::read_to_string(path).unwrap();
            for line in content.lines() {
                assert_eq!(line.split(',').count(), width, "{}", line);
            }
        }
    }

    #[test]
    fn empty_snapshot_still_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_results(&SentimentSnapshot::new(), dir.path(), &run_time(0, 0, 0)).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(),
            "instrumentID,buyersPercentage,sellersPercentage,imbalance,price\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_output_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = write_results(&sample_snapshot(), &missing, &run_time(0, 0, 0)).unwrap_err();
        assert!(matches!(err, SentimentError::OutputIo { .. }));
    }
}
