use crate::error::{AppError, Result};
use crate::models::{
    DrivingStyle, FeatureRecord, FuelType, LoadType, RoadType, VehicleType,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// User-entered vehicle details; bounds mirror the input widgets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FormInput {
    pub vehicle_type: VehicleType,

    #[validate(range(min = 800, max = 8000))]
    pub engine_capacity_cc: u32,

    pub oil_filter_change_date: NaiveDate,

    #[validate(range(max = 300000))]
    pub km_after_change: u32,

    pub road_type: RoadType,
    pub load_type: LoadType,

    #[validate(range(min = 60.0, max = 140.0))]
    pub avg_oil_temperature: f64,

    #[validate(range(min = 0.0, max = 100.0))]
    pub oil_viscosity_index: f64,

    #[validate(range(min = 600, max = 5000))]
    pub engine_rpm_avg: u32,

    #[validate(range(max = 100))]
    pub idling_percentage: u32,

    #[validate(range(min = -5.0, max = 60.0))]
    pub ambient_temperature: f64,

    pub fuel_type: FuelType,
    pub driving_style: DrivingStyle,
}

impl FormInput {
    /// Whole days from the change date to `today`; negative for a future change date
    pub fn filter_age_days(&self, today: NaiveDate) -> i64 {
        (today - self.oil_filter_change_date).num_days()
    }

    /// Range checks pass NaN, so the float fields are checked separately
    fn check_finite(&self) -> Result<()> {
        let fields = [
            ("avg_oil_temperature", self.avg_oil_temperature),
            ("oil_viscosity_index", self.oil_viscosity_index),
            ("ambient_temperature", self.ambient_temperature),
        ];
        match fields.iter().find(|(_, value)| !value.is_finite()) {
            Some((name, value)) => Err(AppError::Validation(format!(
                "{}: {} is not a finite number",
                name, value
            ))),
            None => Ok(()),
        }
    }

    /// Validate the bounds and derive the model's feature record
    pub fn to_record(&self, today: NaiveDate) -> Result<FeatureRecord> {
        self.validate()?;
        self.check_finite()?;

        Ok(FeatureRecord {
            vehicle_type: self.vehicle_type,
            engine_capacity_cc: self.engine_capacity_cc,
            oil_filter_age_days: self.filter_age_days(today),
            km_after_change: self.km_after_change,
            road_type: self.road_type,
            load_type: self.load_type,
            avg_oil_temperature: self.avg_oil_temperature,
            oil_viscosity_index: self.oil_viscosity_index,
            engine_rpm_avg: self.engine_rpm_avg,
            idling_percentage: self.idling_percentage,
            ambient_temperature: self.ambient_temperature,
            fuel_type: self.fuel_type,
            driving_style: self.driving_style,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_form() -> FormInput {
        FormInput {
            vehicle_type: VehicleType::Sedan,
            engine_capacity_cc: 1600,
            oil_filter_change_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            km_after_change: 5000,
            road_type: RoadType::City,
            load_type: LoadType::Medium,
            avg_oil_temperature: 95.0,
            oil_viscosity_index: 60.0,
            engine_rpm_avg: 2200,
            idling_percentage: 15,
            ambient_temperature: 25.0,
            fuel_type: FuelType::Petrol,
            driving_style: DrivingStyle::Normal,
        }
    }

    #[test]
    fn test_age_from_change_date() {
        let form = sample_form();
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(form.filter_age_days(today), 60);

        let record = form.to_record(today).unwrap();
        assert_eq!(record.oil_filter_age_days, 60);
        assert_eq!(record.engine_capacity_cc, 1600);
    }

    #[test]
    fn test_future_change_date_gives_negative_age() {
        let form = sample_form();
        let today = NaiveDate::from_ymd_opt(2023, 12, 22).unwrap();
        assert_eq!(form.to_record(today).unwrap().oil_filter_age_days, -10);
    }

    #[test]
    fn test_out_of_range_input_is_rejected() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let mut form = sample_form();
        form.engine_capacity_cc = 500;
        assert!(matches!(form.to_record(today), Err(AppError::Validation(_))));

        let mut form = sample_form();
        form.ambient_temperature = -6.0;
        assert!(matches!(form.to_record(today), Err(AppError::Validation(_))));

        let mut form = sample_form();
        form.ambient_temperature = -5.0;
        form.idling_percentage = 100;
        assert!(form.to_record(today).is_ok());
    }

    #[test]
    fn test_non_finite_input_is_rejected() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let mut form = sample_form();
        form.avg_oil_temperature = f64::NAN;
        let err = form.to_record(today).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("avg_oil_temperature"));

        let mut form = sample_form();
        form.oil_viscosity_index = f64::NAN;
        assert!(matches!(form.to_record(today), Err(AppError::Validation(_))));

        let mut form = sample_form();
        form.ambient_temperature = f64::INFINITY;
        assert!(matches!(form.to_record(today), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = serde_json::json!({
            "vehicle_type": "SUV",
            "engine_capacity_cc": 2500,
            "oil_filter_change_date": "2024-02-10",
            "km_after_change": 12000,
            "road_type": "offroad",
            "load_type": "heavy",
            "avg_oil_temperature": 115.0,
            "oil_viscosity_index": 35.0,
            "engine_rpm_avg": 3200,
            "idling_percentage": 20,
            "ambient_temperature": 30.0,
            "fuel_type": "Diesel",
            "driving_style": "aggressive"
        });
        let form: FormInput = serde_json::from_value(json).unwrap();
        assert_eq!(form.vehicle_type, VehicleType::Suv);
        assert_eq!(form.road_type, RoadType::Offroad);
        assert_eq!(form.driving_style, DrivingStyle::Aggressive);
    }
}
