//! Column contract shared by the generator, the trainer and the predictor.

use serde::{Deserialize, Serialize};

pub const VEHICLE_TYPE: &str = "vehicle_type";
pub const ENGINE_CAPACITY_CC: &str = "engine_capacity_cc";
pub const OIL_FILTER_CHANGE_DATE: &str = "oil_filter_change_date";
pub const CURRENT_DATE: &str = "current_date";
pub const OIL_FILTER_AGE_DAYS: &str = "oil_filter_age_days";
pub const KM_AFTER_CHANGE: &str = "km_after_change";
pub const ROAD_TYPE: &str = "road_type";
pub const LOAD_TYPE: &str = "load_type";
pub const AVG_OIL_TEMPERATURE: &str = "avg_oil_temperature";
pub const OIL_VISCOSITY_INDEX: &str = "oil_viscosity_index";
pub const ENGINE_RPM_AVG: &str = "engine_rpm_avg";
pub const IDLING_PERCENTAGE: &str = "idling_percentage";
pub const AMBIENT_TEMPERATURE: &str = "ambient_temperature";
pub const FUEL_TYPE: &str = "fuel_type";
pub const DRIVING_STYLE: &str = "driving_style";
pub const OIL_FILTER_CONDITION: &str = "oil_filter_condition";

/// Target column
pub const TARGET_COLUMN: &str = OIL_FILTER_CONDITION;

/// Raw calendar columns; never fed to the model
pub const DATE_COLUMNS: [&str; 2] = [OIL_FILTER_CHANGE_DATE, CURRENT_DATE];

/// Column order of the generated CSV
pub const DATASET_COLUMNS: [&str; 16] = [
    VEHICLE_TYPE,
    ENGINE_CAPACITY_CC,
    OIL_FILTER_CHANGE_DATE,
    CURRENT_DATE,
    OIL_FILTER_AGE_DAYS,
    KM_AFTER_CHANGE,
    ROAD_TYPE,
    LOAD_TYPE,
    AVG_OIL_TEMPERATURE,
    OIL_VISCOSITY_INDEX,
    ENGINE_RPM_AVG,
    IDLING_PERCENTAGE,
    AMBIENT_TEMPERATURE,
    FUEL_TYPE,
    DRIVING_STYLE,
    OIL_FILTER_CONDITION,
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// Static description of one feature column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    const fn numeric(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Numeric,
        }
    }

    const fn categorical(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Categorical,
        }
    }

    /// `(name, kind)` form accepted by `FeatureTable::check_schema`
    pub fn pair(&self) -> (&'static str, ColumnKind) {
        (self.name, self.kind)
    }
}

/// The training feature schema as `(name, kind)` pairs
pub fn feature_schema() -> Vec<(&'static str, ColumnKind)> {
    FEATURE_COLUMNS.iter().map(ColumnSpec::pair).collect()
}

/// The model's input columns, in the order the record lists them
pub const FEATURE_COLUMNS: [ColumnSpec; 13] = [
    ColumnSpec::categorical(VEHICLE_TYPE),
    ColumnSpec::numeric(ENGINE_CAPACITY_CC),
    ColumnSpec::numeric(OIL_FILTER_AGE_DAYS),
    ColumnSpec::numeric(KM_AFTER_CHANGE),
    ColumnSpec::categorical(ROAD_TYPE),
    ColumnSpec::categorical(LOAD_TYPE),
    ColumnSpec::numeric(AVG_OIL_TEMPERATURE),
    ColumnSpec::numeric(OIL_VISCOSITY_INDEX),
    ColumnSpec::numeric(ENGINE_RPM_AVG),
    ColumnSpec::numeric(IDLING_PERCENTAGE),
    ColumnSpec::numeric(AMBIENT_TEMPERATURE),
    ColumnSpec::categorical(FUEL_TYPE),
    ColumnSpec::categorical(DRIVING_STYLE),
];

/// Names of the numeric feature columns
pub fn numeric_columns() -> Vec<&'static str> {
    FEATURE_COLUMNS
        .iter()
        .filter(|spec| spec.kind == ColumnKind::Numeric)
        .map(|spec| spec.name)
        .collect()
}

/// Names of the categorical feature columns
pub fn categorical_columns() -> Vec<&'static str> {
    FEATURE_COLUMNS
        .iter()
        .filter(|spec| spec.kind == ColumnKind::Categorical)
        .map(|spec| spec.name)
        .collect()
}

/// A single cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnValue {
    Numeric(f64),
    Categorical(String),
}

impl ColumnValue {
    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnValue::Numeric(_) => ColumnKind::Numeric,
            ColumnValue::Categorical(_) => ColumnKind::Categorical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_column_split() {
        assert_eq!(numeric_columns().len(), 8);
        assert_eq!(categorical_columns().len(), 5);
    }

    #[test]
    fn test_dataset_columns_cover_features() {
        for spec in FEATURE_COLUMNS {
            assert!(DATASET_COLUMNS.contains(&spec.name));
        }
        for date in DATE_COLUMNS {
            assert!(DATASET_COLUMNS.contains(&date));
            assert!(!FEATURE_COLUMNS.iter().any(|spec| spec.name == date));
        }
        assert_eq!(DATASET_COLUMNS[15], TARGET_COLUMN);
    }
}
