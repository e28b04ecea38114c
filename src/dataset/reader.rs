//! CSV row source bound to a schema descriptor.
//!
//! Header cells are matched against the schema's field names and aliases, so
//! both the canonical layout (`PassengerClass,Gender,...`) and the Kaggle layout
//! (`Pclass,Sex,...`) load without configuration. Cells are trimmed; an empty
//! cell is a missing value.

use crate::dataset::RowSource;
use crate::error::{PipelineError, Result};
use crate::schema::{Column, Schema};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Records that can be built from a schema-bound CSV row.
pub trait FromRow: Sized {
    /// Schema the header must satisfy.
    fn schema() -> &'static Schema;

    fn from_row(row: &BoundRow<'_>) -> Result<Self>;
}

/// Header positions of each schema column.
#[derive(Clone, Debug)]
pub struct SchemaBinding {
    positions: [Option<usize>; Column::COUNT],
}

impl SchemaBinding {
    /// Bind every field of `schema` to a header cell.
    ///
    /// Extra header cells are ignored. A field with no matching header is a
    /// schema error.
    pub fn bind(schema: &Schema, headers: &StringRecord) -> Result<Self> {
        let mut positions = [None; Column::COUNT];
        for spec in schema.fields() {
            let pos = headers
                .iter()
                .position(|h| spec.matches_header(h.trim()))
                .ok_or_else(|| {
                    PipelineError::schema(
                        1,
                        spec.column.name(),
                        format!("column not found in {} header", schema.name()),
                    )
                })?;
            positions[spec.column.index()] = Some(pos);
        }
        Ok(Self { positions })
    }

    pub fn position(&self, column: Column) -> Option<usize> {
        self.positions[column.index()]
    }
}

/// One CSV record viewed through a [`SchemaBinding`].
pub struct BoundRow<'a> {
    binding: &'a SchemaBinding,
    record: &'a StringRecord,
    line: u64,
}

impl<'a> BoundRow<'a> {
    pub fn new(binding: &'a SchemaBinding, record: &'a StringRecord, line: u64) -> Self {
        Self {
            binding,
            record,
            line,
        }
    }

    /// 1-based line number of the record in its source.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Trimmed cell text, `None` when the cell is empty or the column is unbound.
    pub fn text(&self, column: Column) -> Option<&'a str> {
        let pos = self.binding.position(column)?;
        let cell = self.record.get(pos)?.trim();
        if cell.is_empty() {
            None
        } else {
            Some(cell)
        }
    }

    pub fn required_text(&self, column: Column) -> Result<&'a str> {
        self.text(column)
            .ok_or_else(|| self.error(column, "required value is missing"))
    }

    /// Integer cell. Integral floats such as `3.0` are accepted.
    pub fn required_int(&self, column: Column) -> Result<i64> {
        self.optional_int(column)?
            .ok_or_else(|| self.error(column, "required value is missing"))
    }

    /// Integer cell; empty cells are missing.
    pub fn optional_int(&self, column: Column) -> Result<Option<i64>> {
        let Some(cell) = self.text(column) else {
            return Ok(None);
        };
        if let Ok(v) = cell.parse::<i64>() {
            return Ok(Some(v));
        }
        match cell.parse::<f64>() {
            Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(Some(v as i64)),
            _ => Err(self.mismatch(column, "an integer", cell)),
        }
    }

    /// Float cell; empty cells and `NaN` are missing.
    pub fn optional_float(&self, column: Column) -> Result<Option<f64>> {
        let Some(cell) = self.text(column) else {
            return Ok(None);
        };
        match cell.parse::<f64>() {
            Ok(v) if v.is_nan() => Ok(None),
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(self.mismatch(column, "a number", cell)),
        }
    }

    /// Boolean cell: `1`/`0` or `true`/`false` (any case).
    pub fn required_bool(&self, column: Column) -> Result<bool> {
        let cell = self.required_text(column)?;
        if cell == "1" || cell.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if cell == "0" || cell.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(self.mismatch(column, "0/1 or true/false", cell))
        }
    }

    fn error(&self, column: Column, message: impl Into<String>) -> PipelineError {
        PipelineError::schema(self.line, column.name(), message)
    }

    fn mismatch(&self, column: Column, expected: &str, cell: &str) -> PipelineError {
        self.error(column, format!("expected {expected}, got {cell:?}"))
    }
}

/// Header-bound CSV reader.
pub struct CsvRowSource<R: Read> {
    reader: csv::Reader<R>,
}

impl CsvRowSource<BufReader<File>> {
    /// Open a CSV file for reading.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: Read> CsvRowSource<R> {
    pub fn from_reader(reader: R) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);
        Self { reader }
    }
}

impl<R: Read, T: FromRow> RowSource<T> for CsvRowSource<R> {
    fn read_rows(&mut self, limit: Option<usize>) -> Result<Vec<T>> {
        let headers = self.reader.headers().map_err(csv_error)?.clone();
        let binding = SchemaBinding::bind(T::schema(), &headers)?;

        let mut rows = Vec::new();
        let mut record = StringRecord::new();
        while limit.map_or(true, |max| rows.len() < max) {
            if !self.reader.read_record(&mut record).map_err(csv_error)? {
                break;
            }
            let line = record.position().map_or(0, |p| p.line());
            rows.push(T::from_row(&BoundRow::new(&binding, &record, line))?);
        }

        debug!(
            schema = T::schema().name(),
            rows = rows.len(),
            "read csv rows"
        );
        Ok(rows)
    }
}

/// Ragged rows are a schema problem, not a transport one.
fn csv_error(err: csv::Error) -> PipelineError {
    if let csv::ErrorKind::UnequalLengths {
        pos,
        expected_len,
        len,
    } = err.kind()
    {
        return PipelineError::schema(
            pos.as_ref().map_or(0, |p| p.line()),
            "*",
            format!("expected {} fields, found {}", expected_len, len),
        );
    }
    PipelineError::Csv(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{PassengerRecord, PredictionRecord};

    const KAGGLE_TRAIN: &str = "\
PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked
1,0,3,\"Braund, Mr. Owen Harris\",male,22,1,0,A/5 21171,7.25,,S
2,1,1,\"Cumings, Mrs. John Bradley (Florence Briggs Thayer)\",female,38,1,0,PC 17599,71.2833,C85,C
6,0,3,\"Moran, Mr. James\",male,,0,0,330877,8.4583,,Q
62,1,1,\"Icard, Miss. Amelie\",female,38,0,0,113572,80,B28,
";

    fn read<T: FromRow>(csv: &str, limit: Option<usize>) -> Result<Vec<T>> {
        CsvRowSource::from_reader(csv.as_bytes()).read_rows(limit)
    }

    #[test]
    fn test_reads_kaggle_layout() {
        let rows: Vec<PassengerRecord> = read(KAGGLE_TRAIN, None).unwrap();
        assert_eq!(rows.len(), 4);

        let first = &rows[0];
        assert_eq!(first.passenger.passenger_id, 1);
        assert_eq!(first.passenger.passenger_class, Some(3));
        assert_eq!(first.passenger.name, "Braund, Mr. Owen Harris");
        assert_eq!(first.passenger.gender.as_deref(), Some("male"));
        assert_eq!(first.passenger.age, Some(22.0));
        assert_eq!(first.passenger.cabin, None);
        assert_eq!(first.passenger.embarked.as_deref(), Some("S"));
        assert!(!first.survived);

        assert_eq!(rows[2].passenger.age, None);
        assert_eq!(rows[3].passenger.embarked, None);
        assert!(rows[3].survived);
    }

    #[test]
    fn test_reads_canonical_layout() {
        let csv = "\
PassengerId,PassengerClass,Name,Gender,Age,SiblingsOrSpouses,ParentsOrChildren,Ticket,Fare,Cabin,Embarked,Survived
7,1,\"McCarthy, Mr. Timothy J\",male,54,0,0,17463,51.8625,E46,S,false
";
        let rows: Vec<PassengerRecord> = read(csv, None).unwrap();
        assert_eq!(rows[0].passenger.passenger_id, 7);
        assert_eq!(rows[0].passenger.fare, Some(51.8625));
        assert!(!rows[0].survived);
    }

    #[test]
    fn test_prediction_schema_ignores_label_column() {
        let rows: Vec<PredictionRecord> = read(KAGGLE_TRAIN, None).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1].passenger_id, 2);
    }

    #[test]
    fn test_missing_header_column() {
        let csv = "PassengerId,Pclass,Name,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked\n";
        let err = read::<PredictionRecord>(csv, None).unwrap_err();
        match err {
            PipelineError::Schema { column, .. } => assert_eq!(column, "Gender"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_integer_reports_line() {
        let csv = "\
PassengerId,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked
892,3,\"Kelly, Mr. James\",male,34.5,0,0,330911,7.8292,,Q
893,first,\"Wilkes, Mrs. James\",female,47,1,0,363272,7,,S
";
        let err = read::<PredictionRecord>(csv, None).unwrap_err();
        match err {
            PipelineError::Schema { line, column, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column, "PassengerClass");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_label() {
        let csv = "\
PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked
1,maybe,3,Someone,male,22,1,0,A/5,7.25,,S
";
        assert!(matches!(
            read::<PassengerRecord>(csv, None),
            Err(PipelineError::Schema { .. })
        ));
    }

    #[test]
    fn test_ragged_row_is_schema_error() {
        let csv = "\
PassengerId,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked
892,3,Kelly,male,34.5,0,0
";
        assert!(matches!(
            read::<PredictionRecord>(csv, None),
            Err(PipelineError::Schema { line: 2, .. })
        ));
    }

    #[test]
    fn test_missing_fare_and_integral_float() {
        let csv = "\
PassengerId,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked
1044,3.0,\"Storey, Mr. Thomas\",male,60.5,0,0,3701,,,S
";
        let rows: Vec<PredictionRecord> = read(csv, None).unwrap();
        assert_eq!(rows[0].passenger_class, Some(3));
        assert_eq!(rows[0].fare, None);
    }

    #[test]
    fn test_empty_categorical_cells_are_missing() {
        let csv = "\
PassengerId,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked
893,,\"Wilkes, Mrs. James\",,47,1,0,363272,7,,S
";
        let rows: Vec<PredictionRecord> = read(csv, None).unwrap();
        assert_eq!(rows[0].passenger_class, None);
        assert_eq!(rows[0].gender, None);
        assert_eq!(rows[0].age, Some(47.0));
    }

    #[test]
    fn test_nan_is_missing() {
        let csv = "\
PassengerId,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked
1,3,A,male,NaN,0,0,T,7.0,,S
";
        let rows: Vec<PredictionRecord> = read(csv, None).unwrap();
        assert_eq!(rows[0].age, None);
    }

    #[test]
    fn test_limit_caps_rows() {
        let rows: Vec<PassengerRecord> = read(KAGGLE_TRAIN, Some(2)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].passenger.passenger_id, 2);
    }

    #[test]
    fn test_from_path_missing_file() {
        let path = std::env::temp_dir().join("titanic_survival_does_not_exist.csv");
        assert!(matches!(
            CsvRowSource::from_path(&path),
            Err(PipelineError::Io(_))
        ));
    }
}
