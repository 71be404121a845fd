//! Background file loading.
//!
//! A [`Loader`] owns one load of one file. It runs on a worker thread and
//! reports back through a channel of [`LoadEvent`]s: progress updates and
//! row batches in file order, terminated by either `Finished` or a single
//! `Error`. The worker never touches display state.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use strum::{AsRefStr, Display};
use thiserror::Error;

use crate::parsers::{DataSet, DelimitedParser, ParseError};

/// Rows per batch in chunked mode
pub const DEFAULT_CHUNK_ROWS: usize = 50_000;

/// How a file is handed to the display layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadMode {
    /// One batch holding the whole file
    WholeFile,
    /// Bounded slices delivered as soon as they are parsed
    Chunked { rows: usize },
}

impl Default for LoadMode {
    fn default() -> Self {
        LoadMode::Chunked {
            rows: DEFAULT_CHUNK_ROWS,
        }
    }
}

/// Classification of a failed load
#[derive(AsRefStr, Clone, Copy, Debug, Display, PartialEq, Eq)]
#[strum(serialize_all = "kebab-case")]
pub enum LoadErrorKind {
    NotFound,
    Empty,
    ParseError,
    Other,
}

/// Terminal error of a load
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{message}")]
pub struct LoadError {
    pub kind: LoadErrorKind,
    pub message: String,
}

impl From<ParseError> for LoadError {
    fn from(err: ParseError) -> Self {
        let (kind, message) = match &err {
            ParseError::NotFound(_) => (LoadErrorKind::NotFound, "File not found.".to_string()),
            ParseError::Empty => (LoadErrorKind::Empty, "No data in the file.".to_string()),
            ParseError::Malformed { .. } => (
                LoadErrorKind::ParseError,
                format!("Error parsing the file. {}", err),
            ),
            ParseError::Io(_) | ParseError::Other(_) => (LoadErrorKind::Other, err.to_string()),
        };
        Self { kind, message }
    }
}

/// Progress of one load. `batches` grows by one per delivered batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadProgress {
    pub batches: usize,
    pub bytes_read: u64,
    pub total_bytes: u64,
}

impl LoadProgress {
    /// Fraction of the file consumed, for progress bars
    pub fn fraction(&self) -> f32 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        (self.bytes_read as f64 / self.total_bytes as f64).clamp(0.0, 1.0) as f32
    }
}

/// Event emitted by a load, in production order
#[derive(Clone, Debug, PartialEq)]
pub enum LoadEvent {
    Progress(LoadProgress),
    Batch(DataSet),
    Finished { batches: usize, rows: usize },
    Error(LoadError),
}

impl LoadEvent {
    /// `Finished` and `Error` end a load
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadEvent::Finished { .. } | LoadEvent::Error(_))
    }
}

/// One file-loading operation
#[derive(Clone, Debug)]
pub struct Loader {
    path: PathBuf,
    mode: LoadMode,
    parser: DelimitedParser,
}

impl Loader {
    pub fn new(path: impl Into<PathBuf>, mode: LoadMode) -> Self {
        Self {
            path: path.into(),
            mode,
            parser: DelimitedParser::default(),
        }
    }

    pub fn with_parser(mut self, parser: DelimitedParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run the load on the calling thread.
    ///
    /// `emit` returns `false` once nobody is listening any more; the load
    /// then stops without emitting further events.
    pub fn run(&self, mut emit: impl FnMut(LoadEvent) -> bool) {
        tracing::info!("Loading {} ({:?})", self.path.display(), self.mode);

        let outcome = match self.mode {
            LoadMode::WholeFile => self.run_whole(&mut emit),
            LoadMode::Chunked { rows } => self.run_chunked(rows, &mut emit),
        };

        match outcome {
            Ok(Some((batches, rows))) => {
                tracing::info!(
                    "Loaded {}: {} rows in {} batches",
                    self.path.display(),
                    rows,
                    batches
                );
                emit(LoadEvent::Finished { batches, rows });
            }
            Ok(None) => {
                tracing::debug!("Load of {} abandoned by receiver", self.path.display());
            }
            Err(e) => {
                let error = LoadError::from(e);
                tracing::warn!(
                    "Failed to load {} ({}): {}",
                    self.path.display(),
                    error.kind,
                    error.message
                );
                emit(LoadEvent::Error(error));
            }
        }
    }

    fn run_whole(
        &self,
        emit: &mut impl FnMut(LoadEvent) -> bool,
    ) -> Result<Option<(usize, usize)>, ParseError> {
        let data = self.parser.parse_file(&self.path)?;
        let rows = data.row_count();
        let total_bytes = std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);

        if !emit(LoadEvent::Batch(data)) {
            return Ok(None);
        }
        let progress = LoadProgress {
            batches: 1,
            bytes_read: total_bytes,
            total_bytes,
        };
        if !emit(LoadEvent::Progress(progress)) {
            return Ok(None);
        }
        Ok(Some((1, rows)))
    }

    fn run_chunked(
        &self,
        rows_per_chunk: usize,
        emit: &mut impl FnMut(LoadEvent) -> bool,
    ) -> Result<Option<(usize, usize)>, ParseError> {
        let mut chunks = self.parser.chunks(&self.path, rows_per_chunk)?;
        tracing::debug!("Columns: {}", chunks.header().join(", "));
        let mut batches = 0;
        let mut rows = 0;

        // Not a `for` loop: the offsets are read between slices.
        while let Some(batch) = chunks.next() {
            let batch = batch?;
            batches += 1;
            rows += batch.row_count();
            tracing::debug!("Batch {}: {} rows", batches, batch.row_count());

            if !emit(LoadEvent::Batch(batch)) {
                return Ok(None);
            }
            let progress = LoadProgress {
                batches,
                bytes_read: chunks.bytes_read(),
                total_bytes: chunks.total_bytes(),
            };
            if !emit(LoadEvent::Progress(progress)) {
                return Ok(None);
            }
        }

        Ok(Some((batches, rows)))
    }

    /// Start the load on a worker thread
    pub fn spawn(self) -> LoadHandle {
        let (sender, receiver) = channel();
        let path = self.path.clone();

        let worker = thread::spawn(move || {
            self.run(|event| sender.send(event).is_ok());
        });

        LoadHandle {
            path,
            receiver,
            worker: Some(worker),
            finished: false,
        }
    }
}

/// Consumer side of a running load.
///
/// Dropping the handle disconnects the channel, which stops the worker at
/// its next event.
pub struct LoadHandle {
    path: PathBuf,
    receiver: Receiver<LoadEvent>,
    worker: Option<JoinHandle<()>>,
    finished: bool,
}

impl LoadHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display name for the file being loaded
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Whether the terminal event has been received
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Take every event produced so far without blocking
    pub fn drain(&mut self) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        while !self.finished {
            match self.receiver.try_recv() {
                Ok(event) => {
                    self.finished = event.is_terminal();
                    events.push(event);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // Worker died without a terminal event
                    self.finished = true;
                    events.push(stopped_unexpectedly());
                }
            }
        }
        if self.finished {
            // Worker is past its last send; let it exit on its own
            self.worker = None;
        }
        events
    }

    /// Block until the load ends and return all remaining events
    pub fn wait(mut self) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        while !self.finished {
            match self.receiver.recv() {
                Ok(event) => {
                    self.finished = event.is_terminal();
                    events.push(event);
                }
                Err(_) => {
                    self.finished = true;
                    events.push(stopped_unexpectedly());
                }
            }
        }
        self.join_worker();
        events
    }

    fn join_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Loader thread for {} panicked", self.path.display());
            }
        }
    }
}

/// Reported when the worker disconnects without a terminal event
fn stopped_unexpectedly() -> LoadEvent {
    LoadEvent::Error(LoadError {
        kind: LoadErrorKind::Other,
        message: "Loader stopped unexpectedly.".to_string(),
    })
}
