//! Column transform: standardise numeric columns, one-hot encode categorical ones.
//!
//! A table is encoded into one dense row-major matrix of `rows * width`
//! values, numeric columns first, then each categorical column's indicators
//! in vocabulary order.

use std::collections::HashSet;

use bankmark_core::{FeatureRecord, FeatureTable, schema};

use crate::artifact::{TransformSchema, UnknownCategoryPolicy};
use crate::error::{LoadError, PipelineError};

#[derive(Debug, Clone)]
struct NumericColumn {
    field: String,
    mean: f64,
    scale: f64,
}

#[derive(Debug, Clone)]
struct CategoricalColumn {
    field: String,
    categories: Vec<String>,
    policy: UnknownCategoryPolicy,
}

/// Validated feature transform.
#[derive(Debug, Clone)]
pub struct FeatureTransform {
    numeric: Vec<NumericColumn>,
    categorical: Vec<CategoricalColumn>,
    width: usize,
}

impl FeatureTransform {
    /// Number of encoded columns per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Input fields consumed by the transform.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.numeric
            .iter()
            .map(|c| c.field.as_str())
            .chain(self.categorical.iter().map(|c| c.field.as_str()))
    }

    /// Encode the whole table.
    pub fn transform(&self, table: &FeatureTable) -> Result<Vec<f64>, PipelineError> {
        let mut matrix = vec![0.0; table.len() * self.width];
        for (row, (record, out)) in table
            .iter()
            .zip(matrix.chunks_exact_mut(self.width))
            .enumerate()
        {
            self.encode_row(row, record, out)?;
        }
        Ok(matrix)
    }

    fn encode_row(&self, row: usize, record: &FeatureRecord, out: &mut [f64]) -> Result<(), PipelineError> {
        let (numeric_out, mut onehot_out) = out.split_at_mut(self.numeric.len());

        for (col, slot) in self.numeric.iter().zip(numeric_out.iter_mut()) {
            let value = record
                .get(&col.field)
                .ok_or_else(|| missing(row, &col.field))?
                .as_f64()
                .ok_or_else(|| PipelineError::ColumnType {
                    row,
                    column: col.field.clone(),
                })?;
            *slot = (value - col.mean) / col.scale;
        }

        for col in &self.categorical {
            let (indicators, rest) = std::mem::take(&mut onehot_out).split_at_mut(col.categories.len());
            onehot_out = rest;

            let value = record
                .get(&col.field)
                .ok_or_else(|| missing(row, &col.field))?
                .as_category()
                .ok_or_else(|| PipelineError::ColumnType {
                    row,
                    column: col.field.clone(),
                })?;

            match col.categories.iter().position(|c| c == value) {
                Some(idx) => indicators[idx] = 1.0,
                None if col.policy == UnknownCategoryPolicy::Ignore => {}
                None => {
                    return Err(PipelineError::UnknownCategory {
                        row,
                        column: col.field.clone(),
                        value: value.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

fn missing(row: usize, field: &str) -> PipelineError {
    PipelineError::MissingColumn {
        row,
        column: field.to_string(),
    }
}

impl TryFrom<TransformSchema> for FeatureTransform {
    type Error = LoadError;

    fn try_from(schema: TransformSchema) -> Result<Self, Self::Error> {
        if schema.numeric.is_empty() && schema.categorical.is_empty() {
            return Err(LoadError::incompatible("transform has no columns"));
        }

        let mut seen = HashSet::new();
        let mut claim = |field: &str| -> Result<(), LoadError> {
            if seen.insert(field.to_string()) {
                Ok(())
            } else {
                Err(LoadError::incompatible(format!("column {field} appears twice")))
            }
        };

        let mut numeric = Vec::with_capacity(schema.numeric.len());
        for col in schema.numeric {
            claim(&col.field)?;
            match schema::field(&col.field) {
                Some(spec) if spec.kind.is_numeric() => {}
                Some(_) => {
                    return Err(LoadError::incompatible(format!(
                        "column {} is categorical in the feature schema",
                        col.field
                    )));
                }
                None => return Err(unknown_field(&col.field)),
            }
            if !col.mean.is_finite() || !col.scale.is_finite() || col.scale == 0.0 {
                return Err(LoadError::incompatible(format!(
                    "column {} needs a finite mean and a finite non-zero scale",
                    col.field
                )));
            }
            numeric.push(NumericColumn {
                field: col.field,
                mean: col.mean,
                scale: col.scale,
            });
        }

        let mut categorical = Vec::with_capacity(schema.categorical.len());
        for col in schema.categorical {
            claim(&col.field)?;
            match schema::field(&col.field) {
                Some(spec) if spec.kind.is_categorical() => {}
                Some(_) => {
                    return Err(LoadError::incompatible(format!(
                        "column {} is numeric in the feature schema",
                        col.field
                    )));
                }
                None => return Err(unknown_field(&col.field)),
            }
            let unique: HashSet<&str> = col.categories.iter().map(String::as_str).collect();
            if col.categories.is_empty() || unique.len() != col.categories.len() {
                return Err(LoadError::incompatible(format!(
                    "column {} needs a non-empty list of distinct categories",
                    col.field
                )));
            }
            categorical.push(CategoricalColumn {
                field: col.field,
                categories: col.categories,
                policy: col.handle_unknown,
            });
        }

        let width = numeric.len() + categorical.iter().map(|c| c.categories.len()).sum::<usize>();
        Ok(Self {
            numeric,
            categorical,
            width,
        })
    }
}

fn unknown_field(field: &str) -> LoadError {
    LoadError::incompatible(format!("column {field} is not part of the feature schema"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{CategoricalColumnSchema, NumericColumnSchema};

    fn numeric(field: &str, mean: f64, scale: f64) -> NumericColumnSchema {
        NumericColumnSchema {
            field: field.to_string(),
            mean,
            scale,
        }
    }

    fn categorical(field: &str, categories: &[&str], policy: UnknownCategoryPolicy) -> CategoricalColumnSchema {
        CategoricalColumnSchema {
            field: field.to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            handle_unknown: policy,
        }
    }

    fn contact_transform(policy: UnknownCategoryPolicy) -> FeatureTransform {
        FeatureTransform::try_from(TransformSchema {
            numeric: vec![numeric("age", 40.0, 10.0)],
            categorical: vec![categorical("contact_mode", &["cellular", "telephone"], policy)],
        })
        .unwrap()
    }

    #[test]
    fn encodes_rows_in_order() {
        let t = contact_transform(UnknownCategoryPolicy::Error);
        assert_eq!(t.width(), 3);
        assert_eq!(t.fields().collect::<Vec<_>>(), vec!["age", "contact_mode"]);

        let table = FeatureTable::new(vec![
            FeatureRecord::new().with("age", 50).with("contact_mode", "telephone"),
            FeatureRecord::new().with("age", 30).with("contact_mode", "cellular"),
        ]);

        let m = t.transform(&table).unwrap();
        assert_eq!(m, vec![1.0, 0.0, 1.0, -1.0, 1.0, 0.0]);
    }

    #[test]
    fn unknown_category_policy() {
        let table = FeatureTable::single(FeatureRecord::new().with("age", 40).with("contact_mode", "fax"));

        let err = contact_transform(UnknownCategoryPolicy::Error)
            .transform(&table)
            .unwrap_err();
        assert_eq!(
            err,
            PipelineError::UnknownCategory {
                row: 0,
                column: "contact_mode".into(),
                value: "fax".into(),
            }
        );

        let m = contact_transform(UnknownCategoryPolicy::Ignore)
            .transform(&table)
            .unwrap();
        assert_eq!(m, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn missing_and_mistyped_columns_fail() {
        let t = contact_transform(UnknownCategoryPolicy::Error);

        let missing = FeatureTable::single(FeatureRecord::new().with("contact_mode", "cellular"));
        assert!(matches!(
            t.transform(&missing),
            Err(PipelineError::MissingColumn { row: 0, .. })
        ));

        let mistyped = FeatureTable::new(vec![
            FeatureRecord::new().with("age", 40).with("contact_mode", "cellular"),
            FeatureRecord::new().with("age", 40).with("contact_mode", 7),
        ]);
        assert_eq!(
            t.transform(&mistyped).unwrap_err(),
            PipelineError::ColumnType {
                row: 1,
                column: "contact_mode".into()
            }
        );
    }

    #[test]
    fn rejects_incompatible_columns() {
        let cases = vec![
            TransformSchema::default(),
            TransformSchema {
                numeric: vec![numeric("age", 0.0, 1.0), numeric("age", 0.0, 1.0)],
                categorical: vec![],
            },
            TransformSchema {
                numeric: vec![numeric("month", 0.0, 1.0)],
                categorical: vec![],
            },
            TransformSchema {
                numeric: vec![],
                categorical: vec![categorical("age", &["1"], UnknownCategoryPolicy::Error)],
            },
            TransformSchema {
                numeric: vec![numeric("balance", 0.0, 1.0)],
                categorical: vec![],
            },
            TransformSchema {
                numeric: vec![numeric("age", 0.0, 0.0)],
                categorical: vec![],
            },
            TransformSchema {
                numeric: vec![],
                categorical: vec![categorical("month", &["may", "may"], UnknownCategoryPolicy::Error)],
            },
        ];

        for schema in cases {
            let err = FeatureTransform::try_from(schema.clone()).unwrap_err();
            assert!(matches!(err, LoadError::Incompatible(_)), "{schema:?} gave {err:?}");
        }
    }
}
