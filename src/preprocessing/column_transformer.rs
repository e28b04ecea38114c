//! ColumnTransformer implementation.
//!
//! Applies per-column transformers to named columns of a row and concatenates
//! the results into one feature vector in a fixed order.

use crate::error::{PipelineError, Result};
use crate::preprocessing::encoding::{
    EncodingWarning, FittedOneHotEncoder, HandleUnknown, OneHotEncoder,
};
use crate::preprocessing::imputation::{FittedSimpleImputer, ImputeStrategy, SimpleImputer};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::schema::{Column, FieldKind, Record, Schema};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One stage of a [`ColumnTransformer`].
#[derive(Clone, Debug)]
pub enum TransformStep {
    /// Exclude columns from the feature set.
    Drop(Vec<Column>),
    /// Fill missing values of a numeric column.
    Impute(Column, SimpleImputer),
    /// One-hot encode a categorical column.
    OneHot(Column, OneHotEncoder),
    /// Assemble the feature vector from these columns, in this order.
    Concatenate(Vec<Column>),
}

impl TransformStep {
    fn columns(&self) -> &[Column] {
        match self {
            TransformStep::Drop(cols) | TransformStep::Concatenate(cols) => cols,
            TransformStep::Impute(col, _) | TransformStep::OneHot(col, _) => {
                std::slice::from_ref(col)
            }
        }
    }
}

/// ColumnTransformer maps rows to numeric feature vectors.
///
/// Steps are declared with a builder and checked against the row schema when
/// the transformer is fitted.
///
/// # Example
/// ```
/// use titanic_survival::preprocessing::{ColumnTransformer, ImputeStrategy, OneHotEncoder, SimpleImputer};
/// use titanic_survival::schema::Column;
///
/// let ct = ColumnTransformer::new()
///     .drop(vec![Column::Name, Column::Ticket])
///     .impute(Column::Age, SimpleImputer::new(ImputeStrategy::Mean))
///     .one_hot(Column::Gender, OneHotEncoder::new())
///     .concatenate(vec![Column::Gender, Column::Age]);
/// assert_eq!(ct.steps().len(), 4);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ColumnTransformer {
    steps: Vec<TransformStep>,
}

impl ColumnTransformer {
    /// Create a new empty ColumnTransformer.
    pub fn new() -> Self {
        Self::default()
    }

    /// The passenger chain: drop identifiers and free text, impute `Age` with
    /// its mean, one-hot the three categorical columns and concatenate
    /// `PassengerClass, Gender, Age, SiblingsOrSpouses, ParentsOrChildren, Embarked`.
    pub fn passenger_default() -> Self {
        let one_hot = OneHotEncoder::new()
            .with_handle_unknown(HandleUnknown::Ignore);
        Self::new()
            .drop(vec![
                Column::PassengerId,
                Column::Name,
                Column::Ticket,
                Column::Fare,
                Column::Cabin,
            ])
            .impute(Column::Age, SimpleImputer::new(ImputeStrategy::Mean))
            .one_hot(Column::Gender, one_hot.clone())
            .one_hot(Column::Embarked, one_hot.clone())
            .one_hot(Column::PassengerClass, one_hot)
            .concatenate(vec![
                Column::PassengerClass,
                Column::Gender,
                Column::Age,
                Column::SiblingsOrSpouses,
                Column::ParentsOrChildren,
                Column::Embarked,
            ])
    }

    pub fn drop(mut self, columns: Vec<Column>) -> Self {
        self.steps.push(TransformStep::Drop(columns));
        self
    }

    pub fn impute(mut self, column: Column, imputer: SimpleImputer) -> Self {
        self.steps.push(TransformStep::Impute(column, imputer));
        self
    }

    pub fn one_hot(mut self, column: Column, encoder: OneHotEncoder) -> Self {
        self.steps.push(TransformStep::OneHot(column, encoder));
        self
    }

    pub fn concatenate(mut self, columns: Vec<Column>) -> Self {
        self.steps.push(TransformStep::Concatenate(columns));
        self
    }

    pub fn steps(&self) -> &[TransformStep] {
        &self.steps
    }

    /// Check the steps against `schema` and return the concatenation order.
    fn validate(&self, schema: &Schema) -> Result<(&[Column], Vec<Column>)> {
        let invalid = |msg: String| Err(PipelineError::InvalidInput(msg));
        let reject = |col: Column, problem: &str| invalid(format!("column {col} {problem}"));

        let concatenations: Vec<&[Column]> = self
            .steps
            .iter()
            .filter_map(|s| match s {
                TransformStep::Concatenate(cols) => Some(cols.as_slice()),
                _ => None,
            })
            .collect();
        let [output] = concatenations.as_slice() else {
            return invalid(format!(
                "column transformer needs exactly one Concatenate step, found {}",
                concatenations.len()
            ));
        };
        let output: &[Column] = *output;
        if output.is_empty() {
            return invalid("Concatenate step lists no columns".into());
        }

        let schema_name = schema.name();
        for step in &self.steps {
            for &col in step.columns() {
                if !schema.contains(col) {
                    return invalid(format!("column {col} is not in the {schema_name} schema"));
                }
            }
        }

        let dropped: Vec<Column> = self
            .steps
            .iter()
            .filter_map(|s| match s {
                TransformStep::Drop(cols) => Some(cols.iter().copied()),
                _ => None,
            })
            .flatten()
            .collect();

        let mut transformed: Vec<Column> = Vec::new();
        for step in &self.steps {
            if let TransformStep::Impute(col, _) | TransformStep::OneHot(col, _) = step {
                if transformed.contains(col) {
                    return reject(*col, "has more than one transform");
                }
                if !output.contains(col) {
                    return reject(*col, "is transformed but never concatenated");
                }
                transformed.push(*col);
            }
        }

        for (i, &col) in output.iter().enumerate() {
            if output[..i].contains(&col) {
                return reject(col, "is concatenated twice");
            }
            if dropped.contains(&col) {
                return reject(col, "is both dropped and concatenated");
            }
            // Presence was checked above.
            let Some(spec) = schema.field(col) else {
                continue;
            };
            let step = self.step_for(col);
            match spec.kind {
                FieldKind::Categorical if !matches!(step, Some(TransformStep::OneHot(..))) => {
                    return reject(col, "is categorical and must be one-hot encoded");
                }
                kind if kind.is_numeric() && spec.nullable && step.is_none() => {
                    return reject(col, "is nullable and must be imputed");
                }
                FieldKind::Text | FieldKind::Boolean if step.is_none() => {
                    return reject(col, "cannot be used as a raw feature");
                }
                _ => {}
            }
        }

        Ok((output, dropped))
    }

    fn step_for(&self, column: Column) -> Option<&TransformStep> {
        self.steps.iter().find(|s| match s {
            TransformStep::Impute(col, _) | TransformStep::OneHot(col, _) => *col == column,
            _ => false,
        })
    }

    /// Fit every per-column transformer on the training rows.
    ///
    /// # Errors
    /// Returns [`PipelineError::InvalidInput`] when the steps do not fit the
    /// schema, when `rows` is empty, or when a column has nothing to learn from.
    pub fn fit<R: Record>(&self, schema: &Schema, rows: &[R]) -> Result<FittedColumnTransformer> {
        let (output, dropped) = self.validate(schema)?;
        if rows.is_empty() {
            let msg = "cannot fit column transformer on empty data";
            return Err(PipelineError::InvalidInput(msg.into()));
        }
        debug!(?dropped, "dropped columns");

        let mut columns = Vec::with_capacity(output.len());
        for &col in output {
            let fitted = match self.step_for(col) {
                Some(TransformStep::Impute(_, imputer)) => {
                    FittedColumn::Imputed(imputer.fit(col, rows)?)
                }
                Some(TransformStep::OneHot(_, encoder)) => {
                    FittedColumn::OneHot(encoder.fit(col, rows)?)
                }
                _ => FittedColumn::PassThrough(col),
            };
            columns.push(fitted);
        }

        let fitted = FittedColumnTransformer::new(columns, dropped);
        debug!(
            n_features_out = fitted.n_features_out(),
            features = ?fitted.feature_names(),
            "fitted column transformer"
        );
        Ok(fitted)
    }
}

/// A fitted output column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FittedColumn {
    /// Numeric value copied unchanged.
    PassThrough(Column),
    Imputed(FittedSimpleImputer),
    OneHot(FittedOneHotEncoder),
}

impl FittedColumn {
    pub fn column(&self) -> Column {
        match self {
            FittedColumn::PassThrough(col) => *col,
            FittedColumn::Imputed(t) => t.column(),
            FittedColumn::OneHot(t) => t.column(),
        }
    }

    pub fn n_features_out(&self) -> usize {
        match self {
            FittedColumn::PassThrough(_) => 1,
            FittedColumn::Imputed(t) => t.n_features_out(),
            FittedColumn::OneHot(t) => t.n_features_out(),
        }
    }

    fn feature_names(&self) -> Vec<String> {
        match self {
            FittedColumn::PassThrough(col) => vec![col.name().to_string()],
            FittedColumn::Imputed(t) => t.feature_names(),
            FittedColumn::OneHot(t) => t.feature_names(),
        }
    }

    fn transform_into<R: Record + ?Sized>(
        &self,
        row: &R,
        out: &mut Vec<f64>,
    ) -> Result<Option<EncodingWarning>> {
        let value = row.value(self.column());
        match self {
            FittedColumn::PassThrough(col) => {
                let v = value.as_f64().ok_or_else(|| {
                    PipelineError::InvalidInput(format!(
                        "passenger {}: {} has no numeric value",
                        row.passenger_id(),
                        col
                    ))
                })?;
                out.push(v);
                Ok(None)
            }
            FittedColumn::Imputed(t) => t.transform_value(&value, out),
            FittedColumn::OneHot(t) => t.transform_value(&value, out),
        }
    }
}

/// Fitted ColumnTransformer ready for inference.
///
/// Immutable after fitting; transforming a row is a pure function of the row
/// and this value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedColumnTransformer {
    columns: Vec<FittedColumn>,
    dropped: Vec<Column>,
    n_features_out: usize,
}

impl FittedColumnTransformer {
    fn new(columns: Vec<FittedColumn>, dropped: Vec<Column>) -> Self {
        let n_features_out = columns.iter().map(FittedColumn::n_features_out).sum();
        Self {
            columns,
            dropped,
            n_features_out,
        }
    }

    /// Length of every feature vector this transformer produces.
    pub fn n_features_out(&self) -> usize {
        self.n_features_out
    }

    /// Output columns in concatenation order.
    pub fn columns(&self) -> &[FittedColumn] {
        &self.columns
    }

    pub fn dropped(&self) -> &[Column] {
        &self.dropped
    }

    /// Name of each output feature, e.g. `Gender=male` or `Age`.
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(FittedColumn::feature_names)
            .collect()
    }

    /// Learned one-hot vocabulary of `column`.
    pub fn vocabulary(&self, column: Column) -> Option<&[String]> {
        self.columns.iter().find_map(|c| match c {
            FittedColumn::OneHot(t) if t.column() == column => Some(t.categories()),
            _ => None,
        })
    }

    /// Learned fill value of `column`.
    pub fn imputed_value(&self, column: Column) -> Option<f64> {
        self.columns.iter().find_map(|c| match c {
            FittedColumn::Imputed(t) if t.column() == column => Some(t.statistic()),
            _ => None,
        })
    }

    /// Transform one row, logging any encoding warnings.
    pub fn transform<R: Record + ?Sized>(&self, row: &R) -> Result<Array1<f64>> {
        let (features, warnings) = self.transform_with_warnings(row)?;
        for w in &warnings {
            warn!(passenger_id = row.passenger_id(), "{}", w);
        }
        Ok(features)
    }

    /// Transform one row and return the encoding warnings alongside.
    pub fn transform_with_warnings<R: Record + ?Sized>(
        &self,
        row: &R,
    ) -> Result<(Array1<f64>, Vec<EncodingWarning>)> {
        let mut out = Vec::with_capacity(self.n_features_out);
        let mut warnings = Vec::new();
        for column in &self.columns {
            if let Some(w) = column.transform_into(row, &mut out)? {
                warnings.push(w);
            }
        }
        Ok((Array1::from(out), warnings))
    }

    /// Transform rows into an `(n_rows, n_features_out)` matrix.
    pub fn transform_batch<R: Record>(&self, rows: &[R]) -> Result<Array2<f64>> {
        let mut data = Vec::with_capacity(rows.len() * self.n_features_out);
        let mut n_warnings = 0usize;
        for row in rows {
            for column in &self.columns {
                if let Some(w) = column.transform_into(row, &mut data)? {
                    debug!(passenger_id = row.passenger_id(), "{}", w);
                    n_warnings += 1;
                }
            }
        }
        if n_warnings > 0 {
            warn!(
                n_warnings,
                rows = rows.len(),
                "rows encoded with all-zero fallbacks"
            );
        }
        Array2::from_shape_vec((rows.len(), self.n_features_out), data)
            .map_err(|e| PipelineError::InvalidInput(e.to_string()))
    }
}
