use crate::dataset::frame::Frame;
use crate::dataset::schema::{ColumnKind, ColumnSpec, ColumnValue};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// A typed column of feature values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Column {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl Column {
    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Numeric(_) => ColumnKind::Numeric,
            Column::Categorical(_) => ColumnKind::Categorical,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gather rows by index, in the given order
    pub fn select(&self, indices: &[usize]) -> Column {
        match self {
            Column::Numeric(values) => {
                Column::Numeric(indices.iter().map(|&i| values[i]).collect())
            }
            Column::Categorical(values) => {
                Column::Categorical(indices.iter().map(|&i| values[i].clone()).collect())
            }
        }
    }
}

impl From<ColumnValue> for Column {
    fn from(value: ColumnValue) -> Self {
        match value {
            ColumnValue::Numeric(x) => Column::Numeric(vec![x]),
            ColumnValue::Categorical(s) => Column::Categorical(vec![s]),
        }
    }
}

/// Named, typed columns of equal length; the value handed to a pipeline
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureTable {
    columns: Vec<(String, Column)>,
}

impl FeatureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a column, replacing any column of the same name
    pub fn insert(&mut self, name: &str, column: Column) {
        match self.columns.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = column,
            None => self.columns.push((name.to_string(), column)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Column> {
        let idx = self.columns.iter().position(|(n, _)| n == name)?;
        Some(self.columns.remove(idx).1)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, column)| column)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Row count, taken from the first column
    pub fn n_rows(&self) -> usize {
        self.columns.first().map(|(_, c)| c.len()).unwrap_or(0)
    }

    pub fn numeric(&self, name: &str) -> Result<&[f64]> {
        match self.column(name) {
            Some(Column::Numeric(values)) => Ok(values),
            Some(Column::Categorical(_)) => Err(AppError::SchemaMismatch(format!(
                "column '{}' is categorical, expected numeric",
                name
            ))),
            None => Err(AppError::SchemaMismatch(format!("missing column '{}'", name))),
        }
    }

    pub fn categorical(&self, name: &str) -> Result<&[String]> {
        match self.column(name) {
            Some(Column::Categorical(values)) => Ok(values),
            Some(Column::Numeric(_)) => Err(AppError::SchemaMismatch(format!(
                "column '{}' is numeric, expected categorical",
                name
            ))),
            None => Err(AppError::SchemaMismatch(format!("missing column '{}'", name))),
        }
    }

    /// New table holding the given rows of every column
    pub fn select_rows(&self, indices: &[usize]) -> FeatureTable {
        FeatureTable {
            columns: self
                .columns
                .iter()
                .map(|(name, column)| (name.clone(), column.select(indices)))
                .collect(),
        }
    }

    /// Verify the exact column set, column kinds and equal column lengths
    pub fn check_schema<'a, I>(&self, expected: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, ColumnKind)>,
    {
        let expected: Vec<(&str, ColumnKind)> = expected.into_iter().collect();
        let mut problems = Vec::new();

        for &(name, kind) in &expected {
            match self.column(name) {
                None => problems.push(format!("missing column '{}'", name)),
                Some(column) if column.kind() != kind => problems.push(format!(
                    "column '{}' is {:?}, expected {:?}",
                    name,
                    column.kind(),
                    kind
                )),
                Some(_) => {}
            }
        }

        for (name, _) in &self.columns {
            if !expected.iter().any(|(expected_name, _)| *expected_name == name.as_str()) {
                problems.push(format!("unexpected column '{}'", name));
            }
        }

        let n_rows = self.n_rows();
        for (name, column) in &self.columns {
            if column.len() != n_rows {
                problems.push(format!(
                    "column '{}' has {} rows, expected {}",
                    name,
                    column.len(),
                    n_rows
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AppError::SchemaMismatch(problems.join("; ")))
        }
    }

    /// Type the given frame columns; numeric cells must parse as numbers
    pub fn from_frame<'a>(
        frame: &Frame,
        specs: impl IntoIterator<Item = &'a ColumnSpec>,
    ) -> Result<Self> {
        let mut table = FeatureTable::new();

        for spec in specs {
            let cells = frame.column(spec.name).ok_or_else(|| {
                AppError::SchemaMismatch(format!("dataset is missing column '{}'", spec.name))
            })?;

            let column = match spec.kind {
                ColumnKind::Numeric => Column::Numeric(
                    cells
                        .iter()
                        .enumerate()
                        .map(|(row, cell)| {
                            cell.trim()
                                .parse::<f64>()
                                .ok()
                                .filter(|value| value.is_finite())
                                .ok_or_else(|| {
                                    AppError::SchemaMismatch(format!(
                                        "column '{}' row {}: '{}' is not a finite number",
                                        spec.name,
                                        row + 1,
                                        cell
                                    ))
                                })
                        })
                        .collect::<Result<Vec<f64>>>()?,
                ),
                ColumnKind::Categorical => {
                    Column::Categorical(cells.iter().map(|cell| cell.to_string()).collect())
                }
            };

            table.insert(spec.name, column);
        }

        Ok(table)
    }
}
