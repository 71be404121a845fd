//! Core application state types and constants.
//!
//! [`AppState`] is the controller: it starts loads, dispatches loader events
//! into the [`DisplaySink`], and turns button presses into plot requests.
//! It is owned by the app and handed to the renderers by reference.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use strum::{AsRefStr, Display, EnumIter};

use crate::config::AppConfig;
use crate::display::{DisplaySink, PlotError, PlotRequest};
use crate::loader::{LoadErrorKind, LoadEvent, LoadHandle, LoadProgress, Loader};

// ============================================================================
// Constants
// ============================================================================

/// Maximum points to render in chart (for performance via LTTB downsampling)
pub const MAX_CHART_POINTS: usize = 2000;

/// Column plotted on the x-axis
pub const X_AXIS_COLUMN: &str = "RPM";

/// Measurement columns offered before any file is loaded
pub const MEASUREMENT_COLUMNS: &[&str] = &["CM-FF", "CM-TCF", "CM-TRF"];

/// Chart line color (olive green)
pub const CHART_COLOR: [u8; 3] = [113, 120, 78];

/// Status shown before anything happened
pub const STATUS_READY: &str = "Select a CSV file to start analysis...";

// ============================================================================
// Controls
// ============================================================================

/// Plot category buttons. All of them trigger the same plot action.
#[derive(AsRefStr, Clone, Copy, Debug, Display, EnumIter, PartialEq, Eq)]
pub enum Category {
    Postprocessing,
    #[strum(serialize = "Idle Range")]
    IdleRange,
    #[strum(serialize = "Mid Range")]
    MidRange,
    #[strum(serialize = "High Range")]
    HighRange,
    #[strum(serialize = "Front Fatigue")]
    FrontFatigue,
    #[strum(serialize = "Torsional Crack")]
    TorsionalCrack,
    #[strum(serialize = "Rear Fracture")]
    RearFracture,
}

/// Groups the category buttons are laid out in
#[derive(AsRefStr, Clone, Copy, Debug, Display, EnumIter, PartialEq, Eq)]
pub enum CategoryGroup {
    Analysis,
    #[strum(serialize = "Operating Range")]
    OperatingRange,
    #[strum(serialize = "Failure Mode")]
    FailureMode,
}

impl Category {
    pub fn group(&self) -> CategoryGroup {
        match self {
            Category::Postprocessing => CategoryGroup::Analysis,
            Category::IdleRange | Category::MidRange | Category::HighRange => {
                CategoryGroup::OperatingRange
            }
            Category::FrontFatigue | Category::TorsionalCrack | Category::RearFracture => {
                CategoryGroup::FailureMode
            }
        }
    }
}

/// Excitation choices. Only shown in the chart title.
#[derive(AsRefStr, Clone, Copy, Debug, Default, Display, EnumIter, PartialEq, Eq)]
pub enum Excitation {
    #[default]
    #[strum(serialize = "Sine Sweep")]
    SineSweep,
    Random,
    Shock,
}

/// Toast notification types with associated colors
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToastType {
    #[default]
    Info,
    Success,
    Warning,
}

impl ToastType {
    /// Background color
    pub fn color(&self) -> [u8; 3] {
        match self {
            ToastType::Info => [71, 108, 155],    // Blue
            ToastType::Success => [113, 120, 78], // Olive green
            ToastType::Warning => [253, 193, 73], // Amber
        }
    }

    pub fn text_color(&self) -> [u8; 3] {
        match self {
            ToastType::Warning => [30, 30, 30],
            _ => [255, 255, 255],
        }
    }

    /// How long the toast stays on screen. Warnings linger.
    pub fn duration(&self) -> Duration {
        match self {
            ToastType::Warning => Duration::from_secs(5),
            _ => Duration::from_secs(3),
        }
    }
}

// ============================================================================
// Load lifecycle
// ============================================================================

/// Current state of file loading
#[derive(Clone, Debug, PartialEq)]
pub enum LoadingState {
    /// Nothing loaded yet
    Idle,
    /// Loading a file (filename, latest progress)
    Loading(String, LoadProgress),
    /// Last load finished normally
    Loaded(String),
    /// Last load ended with an error
    Errored(String, LoadErrorKind),
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading(..))
    }
}

/// Application state owned by the UI thread
pub struct AppState {
    pub config: AppConfig,
    pub display: DisplaySink,
    pub loading_state: LoadingState,
    /// Status line text
    pub status: String,
    /// Message shown in the modal error window
    pub error_message: Option<String>,
    /// Toast messages for user feedback
    pub toast_message: Option<(String, Instant, ToastType)>,
    /// Column plotted on the y-axis
    pub measurement: String,
    pub excitation: Excitation,
    load: Option<LoadHandle>,
    batches_this_load: usize,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            display: DisplaySink::default(),
            loading_state: LoadingState::Idle,
            status: STATUS_READY.to_string(),
            error_message: None,
            toast_message: None,
            measurement: MEASUREMENT_COLUMNS[0].to_string(),
            excitation: Excitation::default(),
            load: None,
            batches_this_load: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading_state.is_loading()
    }

    /// Start loading a file on a worker thread.
    ///
    /// Rejected while another load is still running.
    pub fn start_load(&mut self, path: PathBuf) -> bool {
        if self.is_loading() {
            tracing::warn!("Ignoring load of {} while another load runs", path.display());
            self.show_toast("A file is already loading", ToastType::Warning);
            return false;
        }

        let handle = Loader::new(path, self.config.load_mode).spawn();
        self.begin_load(handle.file_name());
        self.load = Some(handle);
        true
    }

    /// The file chooser was closed without a choice
    pub fn file_not_selected(&mut self) {
        tracing::debug!("No file selected");
        self.status = "No file selected!".to_string();
    }

    pub(crate) fn begin_load(&mut self, name: String) {
        self.status = "Loading data...".to_string();
        self.loading_state = LoadingState::Loading(name, LoadProgress::default());
        self.batches_this_load = 0;
    }

    /// Dispatch every event the worker produced since the last frame.
    /// Returns whether anything was received.
    pub fn poll_loader(&mut self) -> bool {
        let Some(handle) = self.load.as_mut() else {
            return false;
        };
        let events = handle.drain();
        let finished = handle.is_finished();

        let received = !events.is_empty();
        for event in events {
            self.apply_event(event);
        }
        if finished {
            self.load = None;
        }
        received
    }

    /// Apply one loader event to the displayed state
    pub fn apply_event(&mut self, event: LoadEvent) {
        let name = match &self.loading_state {
            LoadingState::Loading(name, _) => name.clone(),
            _ => {
                tracing::warn!("Dropping loader event outside of a load");
                return;
            }
        };

        match event {
            LoadEvent::Progress(progress) => {
                self.loading_state = LoadingState::Loading(name, progress);
            }
            LoadEvent::Batch(batch) => {
                let first = self.batches_this_load == 0;
                self.display.receive_batch(batch, first);
                self.batches_this_load += 1;
                if first {
                    self.pick_default_measurement();
                }
                let rows = self.display.table().map(|t| t.row_count()).unwrap_or(0);
                self.status = format!("Loading data... {} rows", rows);
            }
            LoadEvent::Finished { rows, .. } => {
                self.status = "Data loading complete!".to_string();
                self.show_toast(&format!("Loaded {} rows from {}", rows, name), ToastType::Success);
                self.loading_state = LoadingState::Loaded(name);
            }
            LoadEvent::Error(error) => {
                self.status = "Error occurred while loading data".to_string();
                self.loading_state = LoadingState::Errored(name, error.kind);
                self.show_error(error.message);
            }
        }
    }

    /// Keep the chosen measurement if the new table has it, otherwise take
    /// the first known measurement column, then the first other numeric one.
    fn pick_default_measurement(&mut self) {
        let Some(table) = self.display.table() else {
            return;
        };
        if table.column(&self.measurement).is_some() {
            return;
        }
        let known = MEASUREMENT_COLUMNS
            .iter()
            .find(|name| table.column(name).is_some())
            .map(|name| name.to_string());
        let kinds = self.display.column_kinds();
        let fallback = || {
            table
                .columns
                .iter()
                .zip(kinds)
                .find(|(c, kind)| c.name != X_AXIS_COLUMN && kind.is_numeric())
                .map(|(c, _)| c.name.clone())
        };
        if let Some(name) = known.or_else(fallback) {
            self.measurement = name;
        }
    }

    /// Columns offered in the measurement selector
    pub fn measurement_choices(&self) -> Vec<String> {
        match self.display.table() {
            Some(table) => {
                let mut numeric = Vec::new();
                let mut other = Vec::new();
                let columns = table.columns.iter().zip(self.display.column_kinds());
                for (column, kind) in columns.filter(|(c, _)| c.name != X_AXIS_COLUMN) {
                    if kind.is_numeric() {
                        numeric.push(column.name.clone());
                    } else {
                        other.push(column.name.clone());
                    }
                }
                numeric.extend(other);
                numeric
            }
            None => MEASUREMENT_COLUMNS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Handle a category button: plot RPM against the selected measurement
    pub fn request_plot(&mut self, category: Category) -> Result<(), PlotError> {
        let request = PlotRequest::new(X_AXIS_COLUMN, self.measurement.clone());
        let title = format!(
            "{}: {} vs {} ({})",
            category, request.y, request.x, self.excitation
        );

        match self.display.plot(&request, &title) {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::warn!("Plot for {} failed: {}", category, e);
                self.show_error(e.to_string());
                Err(e)
            }
        }
    }

    /// Open the modal error window
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    pub fn show_toast(&mut self, message: &str, toast_type: ToastType) {
        self.toast_message = Some((message.to_string(), Instant::now(), toast_type));
    }

    /// The toast still on screen, if any. Expired toasts are dropped here.
    pub fn active_toast(&mut self) -> Option<(&str, ToastType)> {
        let expired = matches!(
            &self.toast_message,
            Some((_, shown, toast_type)) if shown.elapsed() >= toast_type.duration()
        );
        if expired {
            self.toast_message = None;
        }
        self.toast_message
            .as_ref()
            .map(|(message, _, toast_type)| (message.as_str(), *toast_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{LoadError, LoadMode};
    use crate::parsers::{Column, DataSet, Value};
    use std::io::Write;
    use strum::IntoEnumIterator;

    fn batch(rpm: &[i64], cm_ff: &[f64]) -> DataSet {
        DataSet::new(vec![
            Column::new("RPM", rpm.iter().map(|&v| Value::Int(v)).collect()),
            Column::new("CM-FF", cm_ff.iter().map(|&v| Value::Float(v)).collect()),
        ])
    }

    fn loaded_state() -> AppState {
        let mut state = AppState::new(AppConfig::default());
        state.begin_load("run.csv".to_string());
        state.apply_event(LoadEvent::Batch(batch(&[1000, 2000], &[0.5, 0.7])));
        state.apply_event(LoadEvent::Finished {
            batches: 1,
            rows: 2,
        });
        state
    }

    #[test]
    fn test_state_machine() {
        let mut state = AppState::new(AppConfig::default());
        assert_eq!(state.loading_state, LoadingState::Idle);
        assert_eq!(state.status, STATUS_READY);

        state.begin_load("run.csv".to_string());
        assert!(state.is_loading());

        state.apply_event(LoadEvent::Batch(batch(&[1000], &[0.5])));
        let progress = LoadProgress {
            batches: 1,
            bytes_read: 10,
            total_bytes: 20,
        };
        state.apply_event(LoadEvent::Progress(progress));
        assert_eq!(
            state.loading_state,
            LoadingState::Loading("run.csv".to_string(), progress)
        );

        state.apply_event(LoadEvent::Finished {
            batches: 1,
            rows: 1,
        });
        assert_eq!(state.loading_state, LoadingState::Loaded("run.csv".to_string()));
        assert_eq!(state.status, "Data loading complete!");
    }

    #[test]
    fn test_batches_append_in_order() {
        let mut state = AppState::new(AppConfig::default());
        state.begin_load("run.csv".to_string());
        state.apply_event(LoadEvent::Batch(batch(&[1000, 2000], &[0.5, 0.7])));
        state.apply_event(LoadEvent::Batch(batch(&[3000], &[0.9])));

        let table = state.display.table().unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.value(2, 0), Some(&Value::Int(3000)));
    }

    #[test]
    fn test_new_load_supersedes_previous_data() {
        let mut state = loaded_state();
        state.begin_load("second.csv".to_string());
        state.apply_event(LoadEvent::Batch(batch(&[500], &[0.1])));

        assert_eq!(state.display.table().unwrap().row_count(), 1);
    }

    #[test]
    fn test_load_error_keeps_previous_data() {
        let mut state = loaded_state();
        state.begin_load("missing.csv".to_string());
        state.apply_event(LoadEvent::Error(LoadError {
            kind: LoadErrorKind::NotFound,
            message: "File not found.".to_string(),
        }));

        assert_eq!(state.display.table().unwrap().row_count(), 2);
        assert_eq!(state.error_message.as_deref(), Some("File not found."));
        assert_eq!(
            state.loading_state,
            LoadingState::Errored("missing.csv".to_string(), LoadErrorKind::NotFound)
        );
    }

    #[test]
    fn test_plot_before_load() {
        let mut state = AppState::new(AppConfig::default());
        let err = state.request_plot(Category::Postprocessing).unwrap_err();
        assert_eq!(err, PlotError::NoDataLoaded);
        assert!(state.display.chart().is_none());
        assert!(state.error_message.is_some());
    }

    #[test]
    fn test_every_category_plots_rpm_against_measurement() {
        let mut state = loaded_state();
        for category in Category::iter() {
            state.request_plot(category).unwrap();
            let chart = state.display.chart().unwrap();
            assert_eq!(chart.x_label, "RPM");
            assert_eq!(chart.y_label, "CM-FF");
            assert_eq!(chart.points, vec![[1000.0, 0.5], [2000.0, 0.7]]);
            assert!(chart.title.starts_with(&category.to_string()));
        }
    }

    #[test]
    fn test_missing_measurement_column() {
        let mut state = loaded_state();
        state.request_plot(Category::Postprocessing).unwrap();
        let before = state.display.chart().cloned();

        state.measurement = "CM-TRF".to_string();
        let err = state.request_plot(Category::RearFracture).unwrap_err();
        assert_eq!(err, PlotError::MissingColumn("CM-TRF".to_string()));
        assert_eq!(state.display.chart().cloned(), before);
    }

    #[test]
    fn test_default_measurement_follows_loaded_columns() {
        let mut state = AppState::new(AppConfig::default());
        state.begin_load("deflection.csv".to_string());
        state.apply_event(LoadEvent::Batch(DataSet::new(vec![
            Column::new("RPM", vec![Value::Int(1000)]),
            Column::new("Label", vec![Value::Text("a".into())]),
            Column::new("Deflection", vec![Value::Float(0.2)]),
        ])));

        assert_eq!(state.measurement, "Deflection");
        assert_eq!(state.measurement_choices(), vec!["Deflection", "Label"]);
    }

    #[test]
    fn test_measurement_choices_follow_later_batches() {
        let mut state = AppState::new(AppConfig::default());
        state.begin_load("run.csv".to_string());
        state.apply_event(LoadEvent::Batch(DataSet::new(vec![
            Column::new("RPM", vec![Value::Int(1000)]),
            Column::new("Note", vec![Value::Int(1)]),
            Column::new("CM-FF", vec![Value::Float(0.5)]),
        ])));
        assert_eq!(state.measurement_choices(), vec!["Note", "CM-FF"]);

        state.apply_event(LoadEvent::Batch(DataSet::new(vec![
            Column::new("RPM", vec![Value::Int(2000)]),
            Column::new("Note", vec![Value::Text("spike".into())]),
            Column::new("CM-FF", vec![Value::Float(0.7)]),
        ])));
        assert_eq!(state.measurement_choices(), vec!["CM-FF", "Note"]);
    }

    #[test]
    fn test_toasts_expire_by_type() {
        let mut state = AppState::new(AppConfig::default());
        assert!(state.active_toast().is_none());

        state.show_toast("Loaded", ToastType::Success);
        assert_eq!(state.active_toast(), Some(("Loaded", ToastType::Success)));

        let four_seconds_ago = Instant::now()
            .checked_sub(Duration::from_secs(4))
            .unwrap();
        state.toast_message = Some(("busy".to_string(), four_seconds_ago, ToastType::Warning));
        assert_eq!(state.active_toast(), Some(("busy", ToastType::Warning)));

        state.toast_message = Some(("done".to_string(), four_seconds_ago, ToastType::Info));
        assert!(state.active_toast().is_none());
        assert!(state.toast_message.is_none());
    }

    #[test]
    fn test_events_outside_load_are_ignored() {
        let mut state = AppState::new(AppConfig::default());
        state.apply_event(LoadEvent::Batch(batch(&[1000], &[0.5])));
        assert!(state.display.table().is_none());
    }

    #[test]
    fn test_category_groups() {
        assert_eq!(Category::Postprocessing.group(), CategoryGroup::Analysis);
        assert_eq!(Category::MidRange.group(), CategoryGroup::OperatingRange);
        assert_eq!(Category::TorsionalCrack.group(), CategoryGroup::FailureMode);
        assert_eq!(Category::IdleRange.to_string(), "Idle Range");
        assert_eq!(Excitation::default().to_string(), "Sine Sweep");
    }

    fn poll_until_idle(state: &mut AppState) {
        for _ in 0..500 {
            state.poll_loader();
            if !state.is_loading() {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("load did not finish");
    }

    #[test]
    fn test_background_load_end_to_end() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"RPM,CM-FF\n1000,0.5\n2000,0.7\n").unwrap();

        let mut state = AppState::new(AppConfig {
            startup_path: None,
            load_mode: LoadMode::Chunked { rows: 1 },
        });
        assert!(state.start_load(file.path().to_path_buf()));
        assert!(!state.start_load(file.path().to_path_buf()));

        poll_until_idle(&mut state);
        assert!(matches!(state.loading_state, LoadingState::Loaded(_)));
        let table = state.display.table().unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_names(), vec!["RPM", "CM-FF"]);

        state.request_plot(Category::Postprocessing).unwrap();
        assert_eq!(
            state.display.chart().unwrap().points,
            vec![[1000.0, 0.5], [2000.0, 0.7]]
        );
    }

    #[test]
    fn test_background_load_not_found() {
        let mut state = AppState::new(AppConfig::default());
        assert!(state.start_load(PathBuf::from("/no/such/dir/data.csv")));
        poll_until_idle(&mut state);

        assert!(matches!(
            state.loading_state,
            LoadingState::Errored(_, LoadErrorKind::NotFound)
        ));
        assert!(state.display.table().is_none());
        assert_eq!(state.error_message.as_deref(), Some("File not found."));
    }

    #[test]
    fn test_no_file_selected() {
        let mut state = AppState::new(AppConfig::default());
        state.file_not_selected();
        assert_eq!(state.status, "No file selected!");
        assert_eq!(state.loading_state, LoadingState::Idle);
    }
}
