//! Display sink: the table and chart the UI draws from.
//!
//! Rows only ever accumulate here, in arrival order. Plots are built from the
//! held table and replace the previous chart only when they succeed.

use thiserror::Error;

use crate::parsers::{ColumnKind, DataSet};
use crate::state::MAX_CHART_POINTS;

/// Errors raised when a plot is requested
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PlotError {
    #[error("No data loaded. Load a CSV file before plotting.")]
    NoDataLoaded,
    #[error("Column '{0}' not found in the loaded data.")]
    MissingColumn(String),
}

/// A pair of column names to plot against each other
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlotRequest {
    pub x: String,
    pub y: String,
}

impl PlotRequest {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }
}

/// A rendered line chart
#[derive(Clone, Debug, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Points in row order, downsampled for rendering
    pub points: Vec<[f64; 2]>,
    /// Number of plottable rows before downsampling
    pub source_points: usize,
}

/// Visible table and chart
#[derive(Default)]
pub struct DisplaySink {
    table: Option<DataSet>,
    /// Kind of each table column, updated per batch so frames never rescan
    kinds: Vec<ColumnKind>,
    chart: Option<Chart>,
}

impl DisplaySink {
    pub fn table(&self) -> Option<&DataSet> {
        self.table.as_ref()
    }

    pub fn chart(&self) -> Option<&Chart> {
        self.chart.as_ref()
    }

    /// Column kinds of the held table, in column order
    pub fn column_kinds(&self) -> &[ColumnKind] {
        &self.kinds
    }

    /// Take a batch from a load.
    ///
    /// The first batch of a load replaces whatever was shown before; later
    /// batches are appended below the existing rows.
    pub fn receive_batch(&mut self, batch: DataSet, first_of_load: bool) {
        let batch_kinds: Vec<ColumnKind> = batch.columns.iter().map(|c| c.kind()).collect();

        if first_of_load || self.table.is_none() {
            self.table = Some(batch);
            self.kinds = batch_kinds;
            self.chart = None;
        } else if let Some(table) = &mut self.table {
            if table.append(batch) {
                for (kind, extra) in self.kinds.iter_mut().zip(batch_kinds) {
                    *kind = kind.merge(extra);
                }
            } else {
                tracing::warn!("Dropped batch with a different header");
            }
        }
    }

    /// Build a line chart of `request.y` against `request.x`.
    ///
    /// On error the previous chart is kept.
    pub fn plot(&mut self, request: &PlotRequest, title: &str) -> Result<&Chart, PlotError> {
        let table = self.table.as_ref().ok_or(PlotError::NoDataLoaded)?;
        let x = table
            .column(&request.x)
            .ok_or_else(|| PlotError::MissingColumn(request.x.clone()))?;
        let y = table
            .column(&request.y)
            .ok_or_else(|| PlotError::MissingColumn(request.y.clone()))?;

        let points: Vec<[f64; 2]> = x
            .values
            .iter()
            .zip(&y.values)
            .filter_map(|(xv, yv)| Some([xv.as_f64()?, yv.as_f64()?]))
            .collect();
        let source_points = points.len();

        tracing::info!(
            "Plotting {} against {} ({} points)",
            request.y,
            request.x,
            source_points
        );

        Ok(&*self.chart.insert(Chart {
            title: title.to_string(),
            x_label: request.x.clone(),
            y_label: request.y.clone(),
            points: downsample_lttb(&points, MAX_CHART_POINTS),
            source_points,
        }))
    }
}

/// LTTB (Largest Triangle Three Buckets) downsampling algorithm.
/// Reduces data points while preserving visual shape.
pub fn downsample_lttb(points: &[[f64; 2]], target_points: usize) -> Vec<[f64; 2]> {
    let n = points.len();

    if n <= target_points || target_points < 3 {
        return points.to_vec();
    }

    let mut result = Vec::with_capacity(target_points);

    // Always include first point
    result.push(points[0]);

    let bucket_size = (n - 2) as f64 / (target_points - 2) as f64;
    let mut a_index = 0usize;

    for i in 0..(target_points - 2) {
        let bucket_start = ((i as f64) * bucket_size).floor() as usize + 1;
        let bucket_end = (((i + 1) as f64) * bucket_size).floor() as usize + 1;
        let bucket_end = bucket_end.min(n - 1);

        // Average of the next bucket is the third triangle corner
        let next_start = bucket_end;
        let next_end = ((((i + 2) as f64) * bucket_size).floor() as usize + 1).min(n);
        let (avg_x, avg_y) = if next_start < next_end {
            let count = (next_end - next_start) as f64;
            let (sum_x, sum_y) = points[next_start..next_end]
                .iter()
                .fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));
            (sum_x / count, sum_y / count)
        } else {
            (points[n - 1][0], points[n - 1][1])
        };

        let [a_x, a_y] = points[a_index];
        let mut max_area = -1.0f64;
        let mut max_index = bucket_start;

        for (j, p) in points.iter().enumerate().take(bucket_end).skip(bucket_start) {
            let area = ((a_x - avg_x) * (p[1] - a_y) - (a_x - p[0]) * (avg_y - a_y)).abs();
            if area > max_area {
                max_area = area;
                max_index = j;
            }
        }

        result.push(points[max_index]);
        a_index = max_index;
    }

    // Always include last point
    result.push(points[n - 1]);

    result
}
