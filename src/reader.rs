//! CSV log reader.
//!
//! Log files carry a header row, then one row per sample:
//! column 0 is a Unix timestamp in seconds, column 1 a human-readable date
//! (ignored), and every further column a numeric channel named by the header.

use crate::error::PlotError;
use crate::series::{Channel, TimeSeries};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Columns before the first channel: timestamp and date string
const LEADING_COLUMNS: usize = 2;

/// Read a log file into a [`TimeSeries`]
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<TimeSeries, PlotError> {
    let path = path.as_ref();
    info!("Reading {}", path.display());

    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PlotError::FileNotFound(path.to_path_buf()),
        _ => PlotError::Io(e),
    })?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Fields)
        .from_reader(file);

    let header = reader.headers()?.clone();
    if header.len() <= LEADING_COLUMNS {
        return Err(structural(
            path,
            format!(
                "header has {} column(s), expected a timestamp, a date and at least one channel",
                header.len()
            ),
        ));
    }

    let names: Vec<String> = header.iter().skip(LEADING_COLUMNS).map(String::from).collect();
    let mut timestamps = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];

    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.len() != header.len() {
            return Err(structural(
                path,
                format!(
                    "line {}: {} field(s), header has {}",
                    line,
                    record.len(),
                    header.len()
                ),
            ));
        }

        timestamps.push(parse_field(path, line, &header, &record, 0)?);
        for (idx, column) in columns.iter_mut().enumerate() {
            column.push(parse_field(path, line, &header, &record, idx + LEADING_COLUMNS)?);
        }
    }

    if timestamps.is_empty() {
        return Err(structural(path, "no data rows after the header".to_string()));
    }

    debug!(
        rows = timestamps.len(),
        channels = names.len(),
        "parsed {}",
        path.display()
    );

    let channels = names
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Channel::new(name, values))
        .collect();

    TimeSeries::new(timestamps, channels).map_err(|e| match e {
        PlotError::InvalidArgument(reason) => structural(path, reason),
        other => other,
    })
}

/// File names in `dir` starting with `prefix`, sorted by name
pub fn find_files_with_prefix<P: AsRef<Path>>(dir: P, prefix: &str) -> Result<Vec<PathBuf>, PlotError> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with(prefix) {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

fn parse_field(
    path: &Path,
    line: u64,
    header: &StringRecord,
    record: &StringRecord,
    idx: usize,
) -> Result<f64, PlotError> {
    let raw = record.get(idx).unwrap_or_default();
    raw.parse::<f64>().map_err(|_| PlotError::Parse {
        path: path.to_path_buf(),
        line,
        column: header.get(idx).unwrap_or_default().to_string(),
        value: raw.to_string(),
    })
}

fn structural(path: &Path, reason: String) -> PlotError {
    PlotError::Structural {
        path: path.to_path_buf(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("sumpplot_reader_{}_{}", std::process::id(), name))
    }

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let path = temp_path(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_well_formed_log() {
        let path = write_temp(
            "well_formed.csv",
            "t,date,Cycles,Energy,Runtime\n\
             1000,2021-03-25 10:00,1,12.5,30\n\
             1900,2021-03-25 10:15,0,0,0\n\
             2800,2021-03-25 10:30,2,20.0,61\n",
        );

        let ts = read_csv(&path).unwrap();
        assert_eq!(ts.channel_names(), vec!["Cycles", "Energy", "Runtime"]);
        assert_eq!(ts.timestamps(), &[1000.0, 1900.0, 2800.0]);
        for channel in ts.channels() {
            assert_eq!(channel.values.len(), 3);
        }
        assert_eq!(ts.channels()[1].values, vec![12.5, 0.0, 20.0]);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_read_keeps_file_order() {
        let path = write_temp("unsorted.csv", "t,date,A\n300,x,1\n100,y,2\n200,z,3\n");

        let ts = read_csv(&path).unwrap();
        assert_eq!(ts.timestamps(), &[300.0, 100.0, 200.0]);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_read_tolerates_padded_fields() {
        let path = write_temp("padded.csv", "t,date,A\n 100 , x , 1.5 \n");

        let ts = read_csv(&path).unwrap();
        assert_eq!(ts.timestamps(), &[100.0]);
        assert_eq!(ts.channels()[0].values, vec![1.5]);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file() {
        let err = read_csv(temp_path("does_not_exist.csv")).unwrap_err();
        assert!(matches!(err, PlotError::FileNotFound(_)));
    }

    #[test]
    fn test_non_numeric_value_is_parse_error() {
        let path = write_temp("bad_value.csv", "t,date,A\n100,x,1\n200,y,oops\n");

        match read_csv(&path).unwrap_err() {
            PlotError::Parse { line, column, value, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column, "A");
                assert_eq!(value, "oops");
            }
            other => panic!("unexpected error: {other}"),
        }

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_non_numeric_timestamp_is_parse_error() {
        let path = write_temp("bad_time.csv", "t,date,A\nnoon,x,1\n");

        let err = read_csv(&path).unwrap_err();
        assert!(matches!(err, PlotError::Parse { .. }));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_short_row_is_structural_error() {
        let path = write_temp("short_row.csv", "t,date,A,B\n100,x,1,2\n200,y,3\n");

        let err = read_csv(&path).unwrap_err();
        assert!(matches!(err, PlotError::Structural { .. }));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_header_only_is_structural_error() {
        let path = write_temp("header_only.csv", "t,date,A\n");

        let err = read_csv(&path).unwrap_err();
        assert!(matches!(err, PlotError::Structural { .. }));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_header_without_channels_is_structural_error() {
        let path = write_temp("no_channels.csv", "t,date\n100,x\n");

        let err = read_csv(&path).unwrap_err();
        assert!(matches!(err, PlotError::Structural { .. }));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_duplicate_channel_is_structural_error() {
        let path = write_temp("duplicate.csv", "t,date,A,A\n100,x,1,2\n");

        let err = read_csv(&path).unwrap_err();
        assert!(matches!(err, PlotError::Structural { .. }));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_find_files_with_prefix_sorted() {
        let dir = temp_path("prefix_dir");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("pump_logDetails_nested")).unwrap();
        fs::write(dir.join("pump_logDetails_2.csv"), "").unwrap();
        fs::write(dir.join("pump_logDetails_1.csv"), "").unwrap();
        fs::write(dir.join("pump_logEnergy.csv"), "").unwrap();

        let found = find_files_with_prefix(&dir, "pump_logDetails_").unwrap();
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["pump_logDetails_1.csv", "pump_logDetails_2.csv"]);

        fs::remove_dir_all(&dir).unwrap();
    }
}
