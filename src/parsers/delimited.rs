//! Delimited text table parser.
//!
//! Parses comma, semicolon or tab separated files with a header row into
//! [`DataSet`]s, either in one pass or as a lazy sequence of bounded slices.

use rayon::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::types::{Column, DataSet, Value};

/// Delimiters considered when sniffing the header line
const CANDIDATE_DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// Failure while reading a delimited file
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("No data in the file")]
    Empty,
    #[error("Malformed row at line {line}: {message}")]
    Malformed { line: u64, message: String },
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}

impl ParseError {
    fn from_csv(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(e) => ParseError::Io(e),
            csv::ErrorKind::Utf8 { .. } | csv::ErrorKind::UnequalLengths { .. } => {
                ParseError::Malformed { line, message }
            }
            _ => ParseError::Other(message),
        }
    }
}

/// Pick the candidate delimiter occurring most often in the header line.
/// Comma wins ties and is the fallback.
pub fn sniff_delimiter(header_line: &[u8]) -> u8 {
    let mut best = b',';
    let mut best_count = 0;
    for candidate in CANDIDATE_DELIMITERS {
        let count = header_line.iter().filter(|&&b| b == candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

/// Make header names usable as unique column keys.
///
/// Blank names become `Unnamed: <index>`; repeats get `.1`, `.2`, ... suffixes.
pub fn normalize_headers<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for (idx, name) in raw.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            name.trim().to_string()
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while names.contains(&candidate) {
            candidate = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        names.push(candidate);
    }
    names
}

/// Delimited file parser
#[derive(Clone, Copy, Debug, Default)]
pub struct DelimitedParser {
    /// Fixed delimiter; sniffed from the header line when `None`
    delimiter: Option<u8>,
}

impl DelimitedParser {
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            delimiter: Some(delimiter),
        }
    }

    /// Parse the whole file into a single [`DataSet`]
    pub fn parse_file(&self, path: &Path) -> Result<DataSet, ParseError> {
        let mut chunks = self.chunks(path, usize::MAX)?;
        let data = chunks.next().unwrap_or(Err(ParseError::Empty))?;

        tracing::info!(
            "Parsed {}: {} columns, {} rows",
            path.display(),
            data.column_count(),
            data.row_count()
        );

        Ok(data)
    }

    /// Open the file and return a lazy sequence of row slices.
    ///
    /// Every call starts a fresh pass over the file.
    pub fn chunks(&self, path: &Path, rows_per_chunk: usize) -> Result<Chunks, ParseError> {
        let mut file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ParseError::NotFound(path.to_path_buf()),
            _ => ParseError::Io(e),
        })?;
        let total_bytes = file.metadata()?.len();

        let delimiter = match self.delimiter {
            Some(d) => d,
            None => {
                let mut first_line = Vec::new();
                BufReader::new(&file).read_until(b'\n', &mut first_line)?;
                file.rewind()?;
                sniff_delimiter(&first_line)
            }
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = reader.headers().map_err(ParseError::from_csv)?;
        if headers.is_empty() {
            return Err(ParseError::Empty);
        }
        let header = normalize_headers(headers.iter());

        tracing::debug!(
            "Opened {} ({} bytes, delimiter {:?}, {} columns)",
            path.display(),
            total_bytes,
            delimiter as char,
            header.len()
        );

        Ok(Chunks {
            reader,
            header,
            rows_per_chunk: rows_per_chunk.max(1),
            total_bytes,
            delivered: 0,
            done: false,
        })
    }
}

/// Lazy sequence of row slices from one pass over a file.
///
/// Yields `Err(ParseError::Empty)` when the file holds no data rows, and
/// stops after the first error.
pub struct Chunks {
    reader: csv::Reader<File>,
    header: Vec<String>,
    rows_per_chunk: usize,
    total_bytes: u64,
    delivered: usize,
    done: bool,
}

impl Chunks {
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Byte offset reached so far
    pub fn bytes_read(&self) -> u64 {
        self.reader.position().byte().min(self.total_bytes)
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    fn read_slice(&mut self) -> Result<Vec<csv::StringRecord>, ParseError> {
        let mut records = Vec::with_capacity(self.rows_per_chunk.min(8192));
        let mut record = csv::StringRecord::new();
        while records.len() < self.rows_per_chunk {
            if !self
                .reader
                .read_record(&mut record)
                .map_err(ParseError::from_csv)?
            {
                break;
            }
            records.push(record.clone());
        }
        Ok(records)
    }
}

/// Type every cell of a slice, one column per rayon task
fn build_batch(header: &[String], records: &[csv::StringRecord]) -> DataSet {
    let columns = (0..header.len())
        .into_par_iter()
        .map(|idx| {
            let values = records
                .iter()
                .map(|r| Value::from_field(r.get(idx).unwrap_or("")))
                .collect();
            Column::new(header[idx].clone(), values)
        })
        .collect();
    DataSet::new(columns)
}

impl Iterator for Chunks {
    type Item = Result<DataSet, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let records = match self.read_slice() {
            Ok(records) => records,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        if records.is_empty() {
            self.done = true;
            return if self.delivered == 0 {
                Some(Err(ParseError::Empty))
            } else {
                None
            };
        }

        if records.len() < self.rows_per_chunk {
            // Short slice means the reader hit end of file
            self.done = true;
        }
        self.delivered += 1;
        Some(Ok(build_batch(&self.header, &records)))
    }
}
