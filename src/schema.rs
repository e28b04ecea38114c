//! Passenger row schema.
//!
//! The schema is an explicit, ordered descriptor of typed fields. Both the CSV
//! row reader and the column transformer chain consume it, so columns are
//! always bound by name rather than by position.

use crate::dataset::{BoundRow, FromRow};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Every column of the passenger dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    PassengerId,
    PassengerClass,
    Name,
    Gender,
    Age,
    SiblingsOrSpouses,
    ParentsOrChildren,
    Ticket,
    Fare,
    Cabin,
    Embarked,
    Survived,
}

impl Column {
    pub const COUNT: usize = 12;

    pub const ALL: [Column; Column::COUNT] = [
        Column::PassengerId,
        Column::PassengerClass,
        Column::Name,
        Column::Gender,
        Column::Age,
        Column::SiblingsOrSpouses,
        Column::ParentsOrChildren,
        Column::Ticket,
        Column::Fare,
        Column::Cabin,
        Column::Embarked,
        Column::Survived,
    ];

    /// Canonical column name.
    pub fn name(self) -> &'static str {
        match self {
            Column::PassengerId => "PassengerId",
            Column::PassengerClass => "PassengerClass",
            Column::Name => "Name",
            Column::Gender => "Gender",
            Column::Age => "Age",
            Column::SiblingsOrSpouses => "SiblingsOrSpouses",
            Column::ParentsOrChildren => "ParentsOrChildren",
            Column::Ticket => "Ticket",
            Column::Fare => "Fare",
            Column::Cabin => "Cabin",
            Column::Embarked => "Embarked",
            Column::Survived => "Survived",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value type of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Float,
    /// Discrete value set; encoded by one-hot at transform time.
    Categorical,
    /// Free text carried through parsing but never featurized.
    Text,
    Boolean,
}

impl FieldKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, FieldKind::Integer | FieldKind::Float)
    }
}

/// Typed description of a single field.
#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
    pub column: Column,
    pub kind: FieldKind,
    /// Whether an empty cell is a legal (missing) value.
    pub nullable: bool,
    /// Alternative header names accepted when binding a CSV header.
    pub aliases: &'static [&'static str],
}

impl FieldSpec {
    const fn new(column: Column, kind: FieldKind, nullable: bool) -> Self {
        Self {
            column,
            kind,
            nullable,
            aliases: &[],
        }
    }

    const fn with_aliases(self, aliases: &'static [&'static str]) -> Self {
        Self { aliases, ..self }
    }

    /// Whether `header` names this field.
    pub fn matches_header(&self, header: &str) -> bool {
        header == self.column.name() || self.aliases.contains(&header)
    }
}

/// Ordered list of field specs describing one record shape.
#[derive(Debug)]
pub struct Schema {
    name: &'static str,
    fields: &'static [FieldSpec],
}

impl Schema {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    pub fn field(&self, column: Column) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.column == column)
    }

    pub fn contains(&self, column: Column) -> bool {
        self.field(column).is_some()
    }
}

const PASSENGER_FIELDS: [FieldSpec; 11] = [
    FieldSpec::new(Column::PassengerId, FieldKind::Integer, false),
    FieldSpec::new(Column::PassengerClass, FieldKind::Categorical, true)
        .with_aliases(&["Pclass"]),
    FieldSpec::new(Column::Name, FieldKind::Text, false),
    FieldSpec::new(Column::Gender, FieldKind::Categorical, true)
        .with_aliases(&["Sex"]),
    FieldSpec::new(Column::Age, FieldKind::Float, true),
    FieldSpec::new(Column::SiblingsOrSpouses, FieldKind::Integer, false)
        .with_aliases(&["SibSp"]),
    FieldSpec::new(Column::ParentsOrChildren, FieldKind::Integer, false)
        .with_aliases(&["Parch"]),
    FieldSpec::new(Column::Ticket, FieldKind::Text, false),
    FieldSpec::new(Column::Fare, FieldKind::Float, true),
    FieldSpec::new(Column::Cabin, FieldKind::Text, true),
    FieldSpec::new(Column::Embarked, FieldKind::Categorical, true),
];

const TRAINING_FIELDS: [FieldSpec; 12] = [
    PASSENGER_FIELDS[0],
    PASSENGER_FIELDS[1],
    PASSENGER_FIELDS[2],
    PASSENGER_FIELDS[3],
    PASSENGER_FIELDS[4],
    PASSENGER_FIELDS[5],
    PASSENGER_FIELDS[6],
    PASSENGER_FIELDS[7],
    PASSENGER_FIELDS[8],
    PASSENGER_FIELDS[9],
    PASSENGER_FIELDS[10],
    FieldSpec::new(Column::Survived, FieldKind::Boolean, false),
];

/// Inference-only rows: every passenger field, no label.
pub static PREDICTION_SCHEMA: Schema = Schema {
    name: "prediction",
    fields: &PASSENGER_FIELDS,
};

/// Labeled training rows.
pub static TRAINING_SCHEMA: Schema = Schema {
    name: "training",
    fields: &TRAINING_FIELDS,
};

/// A borrowed field value.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue<'a> {
    Integer(i64),
    Float(f64),
    Text(&'a str),
    Boolean(bool),
    Missing,
}

impl<'a> FieldValue<'a> {
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            FieldValue::Integer(v) => Some(v as f64),
            FieldValue::Float(v) => Some(v),
            FieldValue::Boolean(v) => Some(if v { 1.0 } else { 0.0 }),
            FieldValue::Text(_) | FieldValue::Missing => None,
        }
    }

    /// Key used to look the value up in a category vocabulary.
    pub fn category_key(&self) -> Option<Cow<'a, str>> {
        match *self {
            FieldValue::Text(s) => Some(Cow::Borrowed(s)),
            FieldValue::Integer(v) => Some(Cow::Owned(v.to_string())),
            FieldValue::Float(v) => Some(Cow::Owned(v.to_string())),
            FieldValue::Boolean(v) => Some(Cow::Owned(v.to_string())),
            FieldValue::Missing => None,
        }
    }
}

/// Named-field access to a parsed row.
pub trait Record {
    fn value(&self, column: Column) -> FieldValue<'_>;

    fn passenger_id(&self) -> i64 {
        match self.value(Column::PassengerId) {
            FieldValue::Integer(id) => id,
            _ => 0,
        }
    }
}

/// A passenger row without the label.
#[derive(Clone, Debug, PartialEq)]
pub struct PredictionRecord {
    pub passenger_id: i64,
    /// Ticket class; an empty cell is missing and encodes to zeros.
    pub passenger_class: Option<i64>,
    pub name: String,
    pub gender: Option<String>,
    pub age: Option<f64>,
    pub siblings_or_spouses: i64,
    pub parents_or_children: i64,
    pub ticket: String,
    pub fare: Option<f64>,
    pub cabin: Option<String>,
    pub embarked: Option<String>,
}

impl Record for PredictionRecord {
    fn value(&self, column: Column) -> FieldValue<'_> {
        fn text(s: &Option<String>) -> FieldValue<'_> {
            s.as_deref().map_or(FieldValue::Missing, FieldValue::Text)
        }
        fn float(v: Option<f64>) -> FieldValue<'static> {
            v.map_or(FieldValue::Missing, FieldValue::Float)
        }
        fn int(v: Option<i64>) -> FieldValue<'static> {
            v.map_or(FieldValue::Missing, FieldValue::Integer)
        }

        match column {
            Column::PassengerId => FieldValue::Integer(self.passenger_id),
            Column::PassengerClass => int(self.passenger_class),
            Column::Name => FieldValue::Text(&self.name),
            Column::Gender => text(&self.gender),
            Column::Age => float(self.age),
            Column::SiblingsOrSpouses => FieldValue::Integer(self.siblings_or_spouses),
            Column::ParentsOrChildren => FieldValue::Integer(self.parents_or_children),
            Column::Ticket => FieldValue::Text(&self.ticket),
            Column::Fare => float(self.fare),
            Column::Cabin => text(&self.cabin),
            Column::Embarked => text(&self.embarked),
            Column::Survived => FieldValue::Missing,
        }
    }

    fn passenger_id(&self) -> i64 {
        self.passenger_id
    }
}

impl FromRow for PredictionRecord {
    fn schema() -> &'static Schema {
        &PREDICTION_SCHEMA
    }

    fn from_row(row: &BoundRow<'_>) -> Result<Self> {
        Ok(Self {
            passenger_id: row.required_int(Column::PassengerId)?,
            passenger_class: row.optional_int(Column::PassengerClass)?,
            name: row.required_text(Column::Name)?.to_string(),
            gender: row.text(Column::Gender).map(str::to_string),
            age: row.optional_float(Column::Age)?,
            siblings_or_spouses: row.required_int(Column::SiblingsOrSpouses)?,
            parents_or_children: row.required_int(Column::ParentsOrChildren)?,
            ticket: row.required_text(Column::Ticket)?.to_string(),
            fare: row.optional_float(Column::Fare)?,
            cabin: row.text(Column::Cabin).map(str::to_string),
            embarked: row.text(Column::Embarked).map(str::to_string),
        })
    }
}

/// A labeled training row.
#[derive(Clone, Debug, PartialEq)]
pub struct PassengerRecord {
    pub passenger: PredictionRecord,
    pub survived: bool,
}

impl Record for PassengerRecord {
    fn value(&self, column: Column) -> FieldValue<'_> {
        match column {
            Column::Survived => FieldValue::Boolean(self.survived),
            other => self.passenger.value(other),
        }
    }

    fn passenger_id(&self) -> i64 {
        self.passenger.passenger_id
    }
}

impl FromRow for PassengerRecord {
    fn schema() -> &'static Schema {
        &TRAINING_SCHEMA
    }

    fn from_row(row: &BoundRow<'_>) -> Result<Self> {
        Ok(Self {
            passenger: PredictionRecord::from_row(row)?,
            survived: row.required_bool(Column::Survived)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::passenger;

    #[test]
    fn test_schema_field_order() {
        let cols: Vec<Column> = TRAINING_SCHEMA.fields().iter().map(|f| f.column).collect();
        assert_eq!(cols, Column::ALL.to_vec());
        assert_eq!(PREDICTION_SCHEMA.fields().len(), 11);
        assert!(!PREDICTION_SCHEMA.contains(Column::Survived));
    }

    #[test]
    fn test_field_spec_aliases() {
        let gender = TRAINING_SCHEMA.field(Column::Gender).unwrap();
        assert!(gender.matches_header("Gender"));
        assert!(gender.matches_header("Sex"));
        assert!(!gender.matches_header("sex"));
    }

    #[test]
    fn test_column_index_matches_all() {
        for (i, col) in Column::ALL.iter().enumerate() {
            assert_eq!(col.index(), i);
        }
    }

    #[test]
    fn test_record_named_access() {
        let row = passenger(5, 3, "male", None, 1, 0, Some("S"), true);
        assert_eq!(row.value(Column::Age), FieldValue::Missing);
        assert_eq!(row.value(Column::Gender), FieldValue::Text("male"));
        assert_eq!(row.value(Column::SiblingsOrSpouses), FieldValue::Integer(1));
        assert_eq!(row.value(Column::Survived), FieldValue::Boolean(true));
        assert_eq!(row.passenger_id(), 5);
        assert_eq!(row.passenger.value(Column::Survived), FieldValue::Missing);
    }

    #[test]
    fn test_category_key() {
        assert_eq!(FieldValue::Integer(3).category_key().unwrap(), "3");
        assert_eq!(FieldValue::Text("C").category_key().unwrap(), "C");
        assert!(FieldValue::Missing.category_key().is_none());
    }
}
