//! Synthetic condition labelling.
//!
//! A row's label starts from the filter age and is pushed one severity step
//! worse for every three wear-inducing operating conditions present.

use crate::models::{ConditionLabel, DrivingStyle, FeatureRecord, LoadType, RoadType};

/// Oil temperature above which the engine counts as running hot (°C)
pub const HOT_OIL_TEMPERATURE: f64 = 110.0;

/// Viscosity index below which the oil counts as thin
pub const LOW_VISCOSITY_INDEX: f64 = 40.0;

/// Average RPM above which the engine counts as high-revving
pub const HIGH_RPM: u32 = 3000;

/// Stress points needed for one escalation step
pub const STRESS_PER_STEP: u8 = 3;

/// Inclusive upper age bounds (days) for each label below Red
const AGE_THRESHOLDS: [(i64, ConditionLabel); 5] = [
    (30, ConditionLabel::Green),
    (90, ConditionLabel::LightGreen),
    (180, ConditionLabel::Yellow),
    (270, ConditionLabel::Orange),
    (330, ConditionLabel::DarkOrange),
];

/// Label implied by filter age alone
pub fn base_label(age_days: i64) -> ConditionLabel {
    AGE_THRESHOLDS
        .iter()
        .find(|(limit, _)| age_days <= *limit)
        .map(|(_, label)| *label)
        .unwrap_or(ConditionLabel::Red)
}

/// Count of wear-inducing conditions, 0 through 6
pub fn stress_score(record: &FeatureRecord) -> u8 {
    [
        record.load_type == LoadType::Heavy,
        record.road_type == RoadType::Offroad,
        record.avg_oil_temperature > HOT_OIL_TEMPERATURE,
        record.oil_viscosity_index < LOW_VISCOSITY_INDEX,
        record.engine_rpm_avg > HIGH_RPM,
        record.driving_style == DrivingStyle::Aggressive,
    ]
    .iter()
    .filter(|&&hit| hit)
    .count() as u8
}

/// Worsen `base` by one step per full `STRESS_PER_STEP` points, capped at Red
pub fn escalate(base: ConditionLabel, stress: u8) -> ConditionLabel {
    let steps = (stress / STRESS_PER_STEP) as usize;
    let index = (base.index() + steps).min(ConditionLabel::WORST.index());
    ConditionLabel::from_index(index)
}

/// Final synthetic label for a record
pub fn label_record(record: &FeatureRecord) -> ConditionLabel {
    escalate(base_label(record.oil_filter_age_days), stress_score(record))
}
