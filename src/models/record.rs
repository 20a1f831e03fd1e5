use crate::dataset::schema::{self, ColumnKind, ColumnValue};
use crate::dataset::{Column, FeatureTable};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display, EnumIter,
)]
pub enum VehicleType {
    #[serde(rename = "SUV")]
    #[strum(serialize = "SUV")]
    Suv,
    Sedan,
    Hatchback,
    #[serde(rename = "LCV")]
    #[strum(serialize = "LCV")]
    Lcv,
    Truck,
    Bus,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RoadType {
    City,
    Highway,
    Offroad,
    Mixed,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LoadType {
    Light,
    Medium,
    Heavy,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display, EnumIter,
)]
pub enum FuelType {
    Petrol,
    Diesel,
    #[serde(rename = "CNG")]
    #[strum(serialize = "CNG")]
    Cng,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DrivingStyle {
    Calm,
    Normal,
    Aggressive,
}

/// Every value of a categorical field, in declaration order
pub fn variants<T: IntoEnumIterator>() -> Vec<T> {
    T::iter().collect()
}

/// One row of vehicle and sensor inputs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureRecord {
    pub vehicle_type: VehicleType,
    pub engine_capacity_cc: u32,
    /// Days since the filter was changed; negative for a change date in the future
    pub oil_filter_age_days: i64,
    pub km_after_change: u32,
    pub road_type: RoadType,
    pub load_type: LoadType,
    pub avg_oil_temperature: f64,
    pub oil_viscosity_index: f64,
    pub engine_rpm_avg: u32,
    pub idling_percentage: u32,
    pub ambient_temperature: f64,
    pub fuel_type: FuelType,
    pub driving_style: DrivingStyle,
}

impl FeatureRecord {
    /// Value of a feature column, keyed by its dataset column name
    pub fn value(&self, column: &str) -> Option<ColumnValue> {
        let value = match column {
            schema::VEHICLE_TYPE => ColumnValue::Categorical(self.vehicle_type.to_string()),
            schema::ENGINE_CAPACITY_CC => ColumnValue::Numeric(self.engine_capacity_cc as f64),
            schema::OIL_FILTER_AGE_DAYS => ColumnValue::Numeric(self.oil_filter_age_days as f64),
            schema::KM_AFTER_CHANGE => ColumnValue::Numeric(self.km_after_change as f64),
            schema::ROAD_TYPE => ColumnValue::Categorical(self.road_type.to_string()),
            schema::LOAD_TYPE => ColumnValue::Categorical(self.load_type.to_string()),
            schema::AVG_OIL_TEMPERATURE => ColumnValue::Numeric(self.avg_oil_temperature),
            schema::OIL_VISCOSITY_INDEX => ColumnValue::Numeric(self.oil_viscosity_index),
            schema::ENGINE_RPM_AVG => ColumnValue::Numeric(self.engine_rpm_avg as f64),
            schema::IDLING_PERCENTAGE => ColumnValue::Numeric(self.idling_percentage as f64),
            schema::AMBIENT_TEMPERATURE => ColumnValue::Numeric(self.ambient_temperature),
            schema::FUEL_TYPE => ColumnValue::Categorical(self.fuel_type.to_string()),
            schema::DRIVING_STYLE => ColumnValue::Categorical(self.driving_style.to_string()),
            _ => return None,
        };
        Some(value)
    }

    /// Single-row table with exactly the training feature columns
    pub fn to_table(&self) -> FeatureTable {
        Self::batch_table(std::slice::from_ref(self))
    }

    /// Columnar table of many records, one row per record
    pub fn batch_table(records: &[FeatureRecord]) -> FeatureTable {
        let mut table = FeatureTable::new();
        for spec in schema::FEATURE_COLUMNS {
            let values = records.iter().filter_map(|record| record.value(spec.name));
            let column = match spec.kind {
                ColumnKind::Numeric => Column::Numeric(
                    values
                        .filter_map(|value| match value {
                            ColumnValue::Numeric(x) => Some(x),
                            ColumnValue::Categorical(_) => None,
                        })
                        .collect(),
                ),
                ColumnKind::Categorical => Column::Categorical(
                    values
                        .filter_map(|value| match value {
                            ColumnValue::Categorical(s) => Some(s),
                            ColumnValue::Numeric(_) => None,
                        })
                        .collect(),
                ),
            };
            table.insert(spec.name, column);
        }
        table
    }
}
