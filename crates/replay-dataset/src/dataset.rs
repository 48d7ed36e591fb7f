//! Dataset loading.
//!
//! A dataset is an immutable header plus an ordered list of data rows read
//! from a CSV file, optionally gzip-compressed. It is loaded once at startup
//! and shared read-only by every replay worker for the process lifetime.

use crate::error::DatasetError;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

/// Buffer size for dataset reads.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// An immutable telemetry dataset: trimmed header plus verbatim data rows.
///
/// Every row is guaranteed to have exactly as many cells as the header.
/// Cell values are kept verbatim; trimming and type coercion happen at
/// encode time, per column role.
#[derive(Debug, Clone)]
pub struct Dataset {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Build a dataset from an already-parsed header and rows.
    ///
    /// Header cells are trimmed. Rows with zero cells are skipped; every
    /// remaining row must match the header length, and at least one data
    /// row must remain.
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, DatasetError> {
        let header: Vec<String> = header.into_iter().map(|h| h.trim().to_string()).collect();
        let mut kept = Vec::with_capacity(rows.len());
        for (i, row) in rows.into_iter().enumerate() {
            if row.is_empty() {
                continue;
            }
            if row.len() != header.len() {
                return Err(DatasetError::RowArity {
                    line: i as u64 + 2,
                    expected: header.len(),
                    actual: row.len(),
                });
            }
            kept.push(row);
        }
        if kept.is_empty() {
            return Err(DatasetError::Empty);
        }
        Ok(Self { header, rows: kept })
    }

    /// Load a dataset from a CSV file.
    ///
    /// Paths ending in `.gz` are transparently decompressed.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        info!("Loading dataset from {}", path.display());

        let file = File::open(path)?;
        let gzipped = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("gz"))
            .unwrap_or(false);

        let dataset = if gzipped {
            let reader = BufReader::with_capacity(READ_BUFFER_SIZE, GzDecoder::new(file));
            Self::from_reader(reader)?
        } else {
            let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
            Self::from_reader(reader)?
        };

        info!(
            "Dataset loaded: {} rows, {} columns",
            dataset.row_count(),
            dataset.header.len()
        );
        Ok(dataset)
    }

    /// Parse CSV content from an arbitrary reader.
    ///
    /// The reader is flexible (ragged rows are admitted by the parser) so
    /// that the arity check is ours and its error can carry the line number.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = csv_reader.records();

        let header: Vec<String> = match records.next() {
            Some(record) => record?.iter().map(|h| h.trim().to_string()).collect(),
            None => return Err(DatasetError::MissingHeader),
        };
        debug!("Dataset header: {header:?}");

        let mut rows: Vec<Vec<String>> = Vec::with_capacity(1024);
        for record in records {
            let record = record?;
            if record.is_empty() {
                continue;
            }
            if record.len() != header.len() {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                return Err(DatasetError::RowArity {
                    line,
                    expected: header.len(),
                    actual: record.len(),
                });
            }
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        if rows.is_empty() {
            return Err(DatasetError::Empty);
        }

        Ok(Self { header, rows })
    }

    /// Column names, positionally aligned with every row.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Data rows, in file order.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of the first column with the given name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    const SAMPLE: &str = "time,name,value\n2024-01-01T00:00:00Z,cpu,1\n,mem,2\n";

    fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_plain_csv() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "sample.csv", SAMPLE);

        let dataset = Dataset::from_path(&path).unwrap();

        assert_eq!(dataset.header(), &["time", "name", "value"]);
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.rows()[0], vec!["2024-01-01T00:00:00Z", "cpu", "1"]);
        assert_eq!(dataset.rows()[1], vec!["", "mem", "2"]);
    }

    #[test]
    fn test_load_gzipped_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sample.csv.gz");

        let file = std::fs::File::create(&path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(SAMPLE.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let dataset = Dataset::from_path(&path).unwrap();

        assert_eq!(dataset.header(), &["time", "name", "value"]);
        assert_eq!(dataset.row_count(), 2);
    }

    #[test]
    fn test_header_cells_are_trimmed() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "sample.csv", " time , name ,value\n1,cpu,2\n");

        let dataset = Dataset::from_path(&path).unwrap();

        assert_eq!(dataset.header(), &["time", "name", "value"]);
        // Data cells are kept verbatim.
        assert_eq!(dataset.rows()[0][0], "1");
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "sample.csv", "a,b\n1,2\n\n3,4\n");

        let dataset = Dataset::from_path(&path).unwrap();

        assert_eq!(dataset.row_count(), 2);
    }

    #[test]
    fn test_empty_file_is_missing_header() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "empty.csv", "");

        let err = Dataset::from_path(&path).unwrap_err();
        assert!(matches!(err, DatasetError::MissingHeader));
    }

    #[test]
    fn test_header_only_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "header.csv", "a,b,c\n");

        let err = Dataset::from_path(&path).unwrap_err();
        assert!(matches!(err, DatasetError::Empty));
    }

    #[test]
    fn test_short_row_is_rejected_with_line_number() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "short.csv", "a,b,c\n1,2,3\n4,5\n");

        let err = Dataset::from_path(&path).unwrap_err();
        match err {
            DatasetError::RowArity {
                line,
                expected,
                actual,
            } => {
                assert_eq!(line, 3);
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("expected RowArity, got {other:?}"),
        }
    }

    #[test]
    fn test_new_rejects_arity_mismatch() {
        let err = Dataset::new(
            vec!["a".into(), "b".into()],
            vec![vec!["1".into(), "2".into()], vec!["3".into()]],
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::RowArity { .. }));
    }

    #[test]
    fn test_column_index_finds_first_match() {
        let dataset = Dataset::new(
            vec!["time".into(), "name".into(), "time".into()],
            vec![vec!["1".into(), "2".into(), "3".into()]],
        )
        .unwrap();

        assert_eq!(dataset.column_index("time"), Some(0));
        assert_eq!(dataset.column_index("name"), Some(1));
        assert_eq!(dataset.column_index("missing"), None);
    }
}
