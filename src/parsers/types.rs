use serde::Serialize;
use strum::{AsRefStr, Display};

/// Value types for table cells
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl Value {
    /// Type a raw cell. Empty cells (and the usual NA spellings) become `Missing`.
    ///
    /// Only finite floats are kept; `nan`, `inf` and friends in any case are
    /// treated as missing.
    pub fn from_field(field: &str) -> Self {
        let field = field.trim();
        if field.is_empty() || Self::is_na(field) {
            return Value::Missing;
        }
        if let Ok(i) = field.parse::<i64>() {
            return Value::Int(i);
        }
        match field.parse::<f64>() {
            Ok(f) if f.is_finite() => Value::Float(f),
            Ok(_) => Value::Missing,
            Err(_) => Value::Text(field.to_string()),
        }
    }

    fn is_na(field: &str) -> bool {
        matches!(field, "NA" | "N/A" | "NaN" | "nan" | "null" | "NULL")
    }

    /// Convert value to f64 for charting. Non-numeric cells have no position.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(_) | Value::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
            Value::Missing => f.write_str(""),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Missing => serializer.serialize_none(),
        }
    }
}

/// Dominant kind of a column, used for display and for picking plot columns
#[derive(AsRefStr, Clone, Copy, Debug, Display, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
    Empty,
}

impl ColumnKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }

    /// Kind of two stretches of the same column joined together
    pub fn merge(self, other: ColumnKind) -> ColumnKind {
        match (self, other) {
            (ColumnKind::Text, _) | (_, ColumnKind::Text) => ColumnKind::Text,
            (ColumnKind::Empty, k) | (k, ColumnKind::Empty) => k,
            (ColumnKind::Float, _) | (_, ColumnKind::Float) => ColumnKind::Float,
            _ => ColumnKind::Integer,
        }
    }
}

/// One named column of a [`DataSet`]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Text wins over Float, Float wins over Integer; all-missing is Empty.
    pub fn kind(&self) -> ColumnKind {
        let mut kind = ColumnKind::Empty;
        for value in &self.values {
            kind = match (kind, value) {
                (_, Value::Text(_)) => return ColumnKind::Text,
                (ColumnKind::Empty, Value::Int(_)) => ColumnKind::Integer,
                (_, Value::Float(_)) => ColumnKind::Float,
                (k, _) => k,
            };
        }
        kind
    }

    /// Number of cells holding a value
    pub fn present_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_missing()).count()
    }
}

/// Rectangular in-memory table produced by parsing one input file.
///
/// Stored column-major; every column holds `row_count()` values.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DataSet {
    pub columns: Vec<Column>,
}

impl DataSet {
    pub fn new(columns: Vec<Column>) -> Self {
        debug_assert!(
            columns.windows(2).all(|w| w[0].values.len() == w[1].values.len()),
            "columns must have equal length"
        );
        Self { columns }
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Find column index by name
    pub fn find_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get the cell at a row/column position
    pub fn value(&self, row: usize, column: usize) -> Option<&Value> {
        self.columns.get(column).and_then(|c| c.values.get(row))
    }

    /// Append the rows of another batch of the same load.
    ///
    /// Returns `false` (and leaves `self` untouched) when the column names differ.
    pub fn append(&mut self, other: DataSet) -> bool {
        if self.columns.is_empty() {
            *self = other;
            return true;
        }
        let same_header = self.columns.len() == other.columns.len()
            && self
                .columns
                .iter()
                .zip(&other.columns)
                .all(|(a, b)| a.name == b.name);
        if !same_header {
            return false;
        }
        for (column, extra) in self.columns.iter_mut().zip(other.columns) {
            column.values.extend(extra.values);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataSet {
        DataSet::new(vec![
            Column::new("RPM", vec![Value::Int(1000), Value::Int(2000)]),
            Column::new("CM-FF", vec![Value::Float(0.5), Value::Missing]),
        ])
    }

    #[test]
    fn test_value_from_field() {
        assert_eq!(Value::from_field("1000"), Value::Int(1000));
        assert_eq!(Value::from_field(" 0.5 "), Value::Float(0.5));
        assert_eq!(Value::from_field("1e3"), Value::Float(1000.0));
        assert_eq!(Value::from_field("abc"), Value::Text("abc".to_string()));
        assert_eq!(Value::from_field(""), Value::Missing);
        assert_eq!(Value::from_field("NaN"), Value::Missing);
    }

    #[test]
    fn test_non_finite_floats_are_missing() {
        for field in ["inf", "-inf", "Infinity", "NAN"] {
            assert_eq!(Value::from_field(field), Value::Missing, "field {:?}", field);
            assert_eq!(Value::from_field(field).as_f64(), None);
        }
        assert_eq!(Value::from_field("-2.5"), Value::Float(-2.5));
    }

    #[test]
    fn test_column_kind() {
        let ds = sample();
        assert_eq!(ds.columns[0].kind(), ColumnKind::Integer);
        assert_eq!(ds.columns[1].kind(), ColumnKind::Float);

        let mixed = Column::new("x", vec![Value::Int(1), Value::Float(2.5)]);
        assert_eq!(mixed.kind(), ColumnKind::Float);

        let text = Column::new("x", vec![Value::Int(1), Value::Text("a".into())]);
        assert_eq!(text.kind(), ColumnKind::Text);

        let empty = Column::new("x", vec![Value::Missing]);
        assert_eq!(empty.kind(), ColumnKind::Empty);
        assert_eq!(empty.present_count(), 0);
    }

    #[test]
    fn test_merged_kind_matches_joined_column() {
        let stretches = [
            vec![Value::Missing],
            vec![Value::Int(1)],
            vec![Value::Float(0.5)],
            vec![Value::Text("a".into())],
        ];
        for a in &stretches {
            for b in &stretches {
                let joined: Vec<Value> = a.iter().chain(b).cloned().collect();
                let merged = Column::new("x", a.clone())
                    .kind()
                    .merge(Column::new("x", b.clone()).kind());
                assert_eq!(merged, Column::new("x", joined).kind());
            }
        }
    }

    #[test]
    fn test_append_batches() {
        let mut ds = DataSet::default();
        assert!(ds.append(sample()));
        assert!(ds.append(sample()));
        assert_eq!(ds.row_count(), 4);
        assert_eq!(ds.value(2, 0), Some(&Value::Int(1000)));

        let other = DataSet::new(vec![Column::new("Other", vec![Value::Int(1)])]);
        assert!(!ds.append(other));
        assert_eq!(ds.row_count(), 4);
    }

    #[test]
    fn test_lookup() {
        let ds = sample();
        assert_eq!(ds.column_names(), vec!["RPM", "CM-FF"]);
        assert_eq!(ds.find_column_index("CM-FF"), Some(1));
        assert!(ds.column("missing").is_none());
        assert_eq!(ds.value(1, 1), Some(&Value::Missing));
        assert_eq!(ds.value(5, 0), None);
    }
}
