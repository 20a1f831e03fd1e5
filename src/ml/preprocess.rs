//! Feature preprocessing fitted on training rows.
//!
//! Numeric columns are standardized, categorical columns one-hot encoded.
//! The transformed matrix lists every scaled numeric column first, then the
//! indicator columns of each categorical column, both in schema order.

use crate::dataset::{ColumnKind, FeatureTable};
use crate::error::{AppError, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Mean / population standard deviation scaler for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub column: String,
    pub mean: f64,
    pub scale: f64,
}

impl StandardScaler {
    pub fn fit(column: &str, values: &[f64]) -> Self {
        let n = values.len().max(1) as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();

        Self {
            column: column.to_string(),
            mean,
            // constant columns pass through centred
            scale: if std > 0.0 { std } else { 1.0 },
        }
    }

    pub fn transform_value(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }
}

/// One-hot encoder over the categories seen while fitting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub column: String,
    /// Sorted, distinct
    pub categories: Vec<String>,
}

impl OneHotEncoder {
    pub fn fit(column: &str, values: &[String]) -> Self {
        let categories: BTreeSet<&String> = values.iter().collect();
        Self {
            column: column.to_string(),
            categories: categories.into_iter().cloned().collect(),
        }
    }

    /// Indicator position of `value`; `None` for a category not seen in training
    pub fn position(&self, value: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|category| category.as_str().cmp(value))
            .ok()
    }

    pub fn width(&self) -> usize {
        self.categories.len()
    }
}

/// Fitted numeric + categorical preprocessing for a fixed column schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformer {
    schema: Vec<(String, ColumnKind)>,
    scalers: Vec<StandardScaler>,
    encoders: Vec<OneHotEncoder>,
}

impl ColumnTransformer {
    /// Fit on `table`, which must hold exactly the columns in `schema`
    pub fn fit(table: &FeatureTable, schema: &[(&str, ColumnKind)]) -> Result<Self> {
        table.check_schema(schema.iter().copied())?;
        if table.n_rows() == 0 {
            return Err(AppError::FitData(
                "cannot fit preprocessing on an empty table".to_string(),
            ));
        }

        let mut scalers = Vec::new();
        let mut encoders = Vec::new();
        for &(name, kind) in schema {
            match kind {
                ColumnKind::Numeric => scalers.push(StandardScaler::fit(name, table.numeric(name)?)),
                ColumnKind::Categorical => {
                    encoders.push(OneHotEncoder::fit(name, table.categorical(name)?))
                }
            }
        }

        Ok(Self {
            schema: schema
                .iter()
                .map(|&(name, kind)| (name.to_string(), kind))
                .collect(),
            scalers,
            encoders,
        })
    }

    /// Columns the transformer was fitted on
    pub fn schema(&self) -> &[(String, ColumnKind)] {
        &self.schema
    }

    /// Width of the transformed matrix
    pub fn n_features_out(&self) -> usize {
        self.scalers.len() + self.encoders.iter().map(OneHotEncoder::width).sum::<usize>()
    }

    /// Transform `table` into the model matrix
    pub fn transform(&self, table: &FeatureTable) -> Result<Array2<f64>> {
        table.check_schema(self.schema.iter().map(|(name, kind)| (name.as_str(), *kind)))?;

        let n_rows = table.n_rows();
        let mut matrix = Array2::zeros((n_rows, self.n_features_out()));

        for (j, scaler) in self.scalers.iter().enumerate() {
            for (i, &value) in table.numeric(&scaler.column)?.iter().enumerate() {
                matrix[[i, j]] = scaler.transform_value(value);
            }
        }

        let mut offset = self.scalers.len();
        for encoder in &self.encoders {
            for (i, value) in table.categorical(&encoder.column)?.iter().enumerate() {
                if let Some(position) = encoder.position(value) {
                    matrix[[i, offset + position]] = 1.0;
                }
            }
            offset += encoder.width();
        }

        Ok(matrix)
    }

    /// Names of the transformed features, in matrix column order
    pub fn feature_names_out(&self) -> Vec<String> {
        let numeric = self.scalers.iter().map(|s| format!("num__{}", s.column));
        let categorical = self.encoders.iter().flat_map(|e| {
            e.categories
                .iter()
                .map(move |category| format!("cat__{}_{}", e.column, category))
        });
        numeric.chain(categorical).collect()
    }

    /// Input column each transformed feature derives from, in matrix column order
    pub fn source_columns(&self) -> Vec<&str> {
        let numeric = self.scalers.iter().map(|s| s.column.as_str());
        let categorical = self
            .encoders
            .iter()
            .flat_map(|e| std::iter::repeat(e.column.as_str()).take(e.width()));
        numeric.chain(categorical).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;

    fn schema() -> Vec<(&'static str, ColumnKind)> {
        vec![("speed", ColumnKind::Numeric), ("road", ColumnKind::Categorical)]
    }

    fn table(speeds: &[f64], roads: &[&str]) -> FeatureTable {
        let mut table = FeatureTable::new();
        table.insert("speed", Column::Numeric(speeds.to_vec()));
        table.insert(
            "road",
            Column::Categorical(roads.iter().map(|s| s.to_string()).collect()),
        );
        table
    }

    #[test]
    fn test_scaler_uses_population_std() {
        let scaler = StandardScaler::fit("x", &[1.0, 3.0]);
        assert_eq!(scaler.mean, 2.0);
        assert_eq!(scaler.scale, 1.0);
        assert_eq!(scaler.transform_value(3.0), 1.0);

        let scaler = StandardScaler::fit("x", &[0.0, 4.0]);
        assert_eq!(scaler.scale, 2.0);
    }

    #[test]
    fn test_constant_column_is_centred_only() {
        let scaler = StandardScaler::fit("x", &[5.0, 5.0, 5.0]);
        assert_eq!(scaler.scale, 1.0);
        assert_eq!(scaler.transform_value(7.0), 2.0);
    }

    #[test]
    fn test_encoder_sorts_categories() {
        let values: Vec<String> = ["urban", "highway", "urban", "offroad"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let encoder = OneHotEncoder::fit("road", &values);
        assert_eq!(encoder.categories, vec!["highway", "offroad", "urban"]);
        assert_eq!(encoder.position("offroad"), Some(1));
        assert_eq!(encoder.position("mixed"), None);
    }

    #[test]
    fn test_transform_layout() {
        let train = table(&[10.0, 30.0], &["urban", "highway"]);
        let transformer = ColumnTransformer::fit(&train, &schema()).unwrap();

        assert_eq!(transformer.n_features_out(), 3);
        assert_eq!(
            transformer.feature_names_out(),
            vec!["num__speed", "cat__road_highway", "cat__road_urban"]
        );
        assert_eq!(transformer.source_columns(), vec!["speed", "road", "road"]);

        let matrix = transformer.transform(&train).unwrap();
        assert_eq!(matrix.row(0).to_vec(), vec![-1.0, 0.0, 1.0]);
        assert_eq!(matrix.row(1).to_vec(), vec![1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_unknown_category_encodes_to_zeros() {
        let train = table(&[10.0, 30.0], &["urban", "highway"]);
        let transformer = ColumnTransformer::fit(&train, &schema()).unwrap();

        let matrix = transformer.transform(&table(&[20.0], &["mixed"])).unwrap();
        assert_eq!(matrix.row(0).to_vec(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_transform_rejects_missing_column() {
        let train = table(&[10.0, 30.0], &["urban", "highway"]);
        let transformer = ColumnTransformer::fit(&train, &schema()).unwrap();

        let mut incomplete = table(&[20.0], &["urban"]);
        incomplete.remove("road");
        let err = transformer.transform(&incomplete).unwrap_err();
        assert!(matches!(err, AppError::SchemaMismatch(_)));
    }

    #[test]
    fn test_fit_rejects_empty_table() {
        let err = ColumnTransformer::fit(&table(&[], &[]), &schema()).unwrap_err();
        assert!(matches!(err, AppError::FitData(_)));
    }
}
