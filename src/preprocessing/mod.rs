//! Preprocessing: turning passenger rows into numeric feature vectors.
//!
//! # Transformer Lifecycle
//!
//! Per-column transformers follow a fit/transform split:
//! 1. Create an unfitted transformer with hyperparameters.
//! 2. Call `fit(column, &rows)` to learn from the training rows.
//! 3. Use the fitted transformer to encode values at inference time.
//!
//! The [`ColumnTransformer`] chains them: drop, impute, one-hot encode, then
//! concatenate into a fixed-order vector.
//!
//! ```
//! use titanic_survival::preprocessing::ColumnTransformer;
//! use titanic_survival::schema::{Column, TRAINING_SCHEMA, PassengerRecord, PredictionRecord};
//!
//! # fn row(id: i64, gender: &str, age: Option<f64>, survived: bool) -> PassengerRecord {
//! #     PassengerRecord {
//! #         passenger: PredictionRecord {
//! #             passenger_id: id, passenger_class: Some(3), name: "A".into(), gender: Some(gender.into()),
//! #             age, siblings_or_spouses: 0, parents_or_children: 0, ticket: "T".into(),
//! #             fare: None, cabin: None, embarked: Some("S".into()),
//! #         },
//! #         survived,
//! #     }
//! # }
//! let rows = vec![row(1, "male", Some(20.0), false), row(2, "female", None, true)];
//! let fitted = ColumnTransformer::passenger_default()
//!     .fit(&TRAINING_SCHEMA, &rows)
//!     .unwrap();
//! assert_eq!(fitted.imputed_value(Column::Age), Some(20.0));
//! assert_eq!(fitted.transform(&rows[1]).unwrap().len(), fitted.n_features_out());
//! ```

pub mod column_transformer;
pub mod encoding;
pub mod imputation;
pub mod traits;

pub use column_transformer::{
    ColumnTransformer, FittedColumn, FittedColumnTransformer, TransformStep,
};
pub use encoding::{EncodingWarning, FittedOneHotEncoder, HandleUnknown, OneHotEncoder};
pub use imputation::{FittedSimpleImputer, ImputeStrategy, SimpleImputer};
pub use traits::{FittedTransformer, Transformer};
