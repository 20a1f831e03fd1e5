/// Synthetic dataset generation
///
/// Draws vehicle and sensor readings from fixed ranges, labels each row with
/// the age + stress heuristic in [`labeling`], and writes the result as the
/// CSV consumed by the training pipeline.
pub mod labeling;

pub use labeling::{base_label, escalate, label_record, stress_score};

use crate::config::GeneratorConfig;
use crate::dataset::schema::DATASET_COLUMNS;
use crate::dataset::Frame;
use crate::error::{AppError, Result};
use crate::models::{
    variants, ConditionLabel, DrivingStyle, FeatureRecord, FuelType, LoadType, RoadType,
    VehicleType,
};
use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// A generated record with its calendar dates and label
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedRow {
    pub record: FeatureRecord,
    pub change_date: NaiveDate,
    pub current_date: NaiveDate,
    pub label: ConditionLabel,
}

impl GeneratedRow {
    /// Cells in `DATASET_COLUMNS` order
    pub fn to_cells(&self) -> Vec<String> {
        let r = &self.record;
        vec![
            r.vehicle_type.to_string(),
            r.engine_capacity_cc.to_string(),
            self.change_date.format("%Y-%m-%d").to_string(),
            self.current_date.format("%Y-%m-%d").to_string(),
            r.oil_filter_age_days.to_string(),
            r.km_after_change.to_string(),
            r.road_type.to_string(),
            r.load_type.to_string(),
            r.avg_oil_temperature.to_string(),
            r.oil_viscosity_index.to_string(),
            r.engine_rpm_avg.to_string(),
            r.idling_percentage.to_string(),
            r.ambient_temperature.to_string(),
            r.fuel_type.to_string(),
            r.driving_style.to_string(),
            self.label.to_string(),
        ]
    }
}

/// Random row source
pub struct SyntheticGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl SyntheticGenerator {
    /// Seeded from the config when a seed is set, otherwise from OS entropy
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { config, rng }
    }

    /// Draw one labelled row
    pub fn generate_row(&mut self) -> Result<GeneratedRow> {
        let vehicle_type = self.pick(&variants::<VehicleType>());
        let engine_capacity_cc = self.rng.gen_range(1200..=8000);

        let year = self.config.reference_year;
        let month = self.rng.gen_range(1..=12);
        let day = self.rng.gen_range(1..=28);
        let current_date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            AppError::Configuration(format!("invalid reference date {}-{}-{}", year, month, day))
        })?;

        let days_old = self.rng.gen_range(0..=self.config.max_age_days);
        let change_date = current_date
            .checked_sub_days(Days::new(days_old as u64))
            .ok_or_else(|| {
                AppError::Configuration(format!(
                    "{} days before {} is out of range",
                    days_old, current_date
                ))
            })?;
        let oil_filter_age_days = (current_date - change_date).num_days();

        let km_after_change = (days_old as f64 * self.rng.gen_range(10.0..200.0)) as u32;

        let road_type = self.pick(&variants::<RoadType>());
        let load_type = self.pick(&variants::<LoadType>());

        let record = FeatureRecord {
            vehicle_type,
            engine_capacity_cc,
            oil_filter_age_days,
            km_after_change,
            road_type,
            load_type,
            avg_oil_temperature: self.rng.gen_range(70.0..130.0),
            oil_viscosity_index: self.rng.gen_range(20.0..100.0),
            engine_rpm_avg: self.rng.gen_range(1200..=4000),
            idling_percentage: self.rng.gen_range(5..=40),
            ambient_temperature: self.rng.gen_range(10.0..45.0),
            fuel_type: self.pick(&variants::<FuelType>()),
            driving_style: self.pick(&variants::<DrivingStyle>()),
        };

        let label = label_record(&record);

        Ok(GeneratedRow {
            record,
            change_date,
            current_date,
            label,
        })
    }

    /// Draw `config.rows` rows
    pub fn generate(&mut self) -> Result<Vec<GeneratedRow>> {
        let rows = (0..self.config.rows)
            .map(|_| self.generate_row())
            .collect::<Result<Vec<_>>>()?;

        let mut distribution: BTreeMap<ConditionLabel, usize> = BTreeMap::new();
        for row in &rows {
            *distribution.entry(row.label).or_insert(0) += 1;
        }
        debug!(?distribution, "Generated label distribution");

        Ok(rows)
    }

    fn pick<T: Copy>(&mut self, values: &[T]) -> T {
        values[self.rng.gen_range(0..values.len())]
    }
}

/// Lay generated rows out as the dataset frame
pub fn to_frame(rows: &[GeneratedRow]) -> Result<Frame> {
    let mut frame = Frame::new(DATASET_COLUMNS);
    for row in rows {
        frame.push_row(row.to_cells())?;
    }
    Ok(frame)
}

/// Generate a dataset per `config` and write it to `config.output_path`
pub fn generate_dataset(config: &GeneratorConfig) -> Result<Vec<GeneratedRow>> {
    let mut generator = SyntheticGenerator::new(config.clone());
    let rows = generator.generate()?;
    write_dataset(&config.output_path, &rows)?;
    Ok(rows)
}

pub fn write_dataset(path: &Path, rows: &[GeneratedRow]) -> Result<()> {
    to_frame(rows)?.write_csv(path)?;
    info!(rows = rows.len(), path = %path.display(), "Synthetic dataset written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::schema;

    fn seeded_config(rows: usize, seed: u64) -> GeneratorConfig {
        GeneratorConfig {
            rows,
            seed: Some(seed),
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn test_rows_respect_ranges() {
        let rows = SyntheticGenerator::new(seeded_config(500, 7)).generate().unwrap();
        assert_eq!(rows.len(), 500);

        for row in &rows {
            let r = &row.record;
            assert!((0..=400).contains(&r.oil_filter_age_days));
            assert!((1200..=8000).contains(&r.engine_capacity_cc));
            assert!(r.km_after_change as i64 <= r.oil_filter_age_days * 200);
            assert!((70.0..130.0).contains(&r.avg_oil_temperature));
            assert!((20.0..100.0).contains(&r.oil_viscosity_index));
            assert!((1200..=4000).contains(&r.engine_rpm_avg));
            assert!((5..=40).contains(&r.idling_percentage));
            assert!((10.0..45.0).contains(&r.ambient_temperature));
            assert_eq!(row.current_date.format("%Y").to_string(), "2024");
            assert_eq!((row.current_date - row.change_date).num_days(), r.oil_filter_age_days);
        }
    }

    #[test]
    fn test_labels_never_below_age_label() {
        let rows = SyntheticGenerator::new(seeded_config(500, 11)).generate().unwrap();
        for row in &rows {
            assert!(row.record.oil_filter_age_days >= 0);
            assert!(row.label >= base_label(row.record.oil_filter_age_days));
            assert_eq!(row.label, label_record(&row.record));
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = SyntheticGenerator::new(seeded_config(50, 3)).generate().unwrap();
        let b = SyntheticGenerator::new(seeded_config(50, 3)).generate().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_frame_layout() {
        let rows = SyntheticGenerator::new(seeded_config(5, 1)).generate().unwrap();
        let frame = to_frame(&rows).unwrap();
        assert_eq!(frame.headers().len(), 16);
        assert_eq!(frame.headers()[2], schema::OIL_FILTER_CHANGE_DATE);
        assert_eq!(frame.n_rows(), 5);

        let labels = frame.column(schema::TARGET_COLUMN).unwrap();
        assert_eq!(labels[0], rows[0].label.to_string());
    }

    #[test]
    fn test_generate_dataset_writes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeneratorConfig {
            output_path: dir.path().join("dataset.csv"),
            ..seeded_config(20, 5)
        };

        generate_dataset(&config).unwrap();

        let frame = Frame::read_csv(&config.output_path).unwrap();
        assert_eq!(frame.n_rows(), 20);
        frame.require_columns(&DATASET_COLUMNS).unwrap();
    }
}
