pub mod delimited;
pub mod types;

pub use delimited::{Chunks, DelimitedParser, ParseError};
pub use types::{Column, ColumnKind, DataSet, Value};
