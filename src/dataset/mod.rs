//! Row sources and training datasets.
//!
//! Parsing rows is delegated to a [`RowSource`] so the pipeline never depends on
//! where rows come from. Two sources ship with the crate:
//!
//! - [`CsvRowSource`]: header-bound CSV reader (any `io::Read` or a file path).
//! - [`InMemoryRows`]: a pre-built `Vec` of records.
//!
//! [`LabeledFeatures`] is the `(X, y)` pair handed to a trainer once rows have
//! been transformed into feature vectors.
//!
//! # Example
//!
//! ```rust
//! use titanic_survival::dataset::{CsvRowSource, RowSource};
//! use titanic_survival::schema::PredictionRecord;
//!
//! let csv = "PassengerId,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked\n\
//!            892,3,\"Kelly, Mr. James\",male,34.5,0,0,330911,7.8292,,Q\n";
//! let mut source = CsvRowSource::from_reader(csv.as_bytes());
//! let rows: Vec<PredictionRecord> = source.read_rows(None).unwrap();
//! assert_eq!(rows[0].passenger_id, 892);
//! ```

use crate::error::Result;

pub mod memory;
pub mod reader;

pub use self::memory::{InMemoryRows, LabeledFeatures};
pub use self::reader::{BoundRow, CsvRowSource, FromRow, SchemaBinding};

/// Source of parsed records.
pub trait RowSource<R> {
    /// Read up to `limit` records (all records when `None`).
    ///
    /// A single malformed row fails the whole read.
    fn read_rows(&mut self, limit: Option<usize>) -> Result<Vec<R>>;
}
