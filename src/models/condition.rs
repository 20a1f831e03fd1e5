use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Oil filter wear, ordered from freshest to most degraded
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumString,
    Display,
    EnumIter,
)]
pub enum ConditionLabel {
    Green,
    #[strum(serialize = "Light-Green")]
    #[serde(rename = "Light-Green")]
    LightGreen,
    Yellow,
    Orange,
    #[strum(serialize = "Dark-Orange")]
    #[serde(rename = "Dark-Orange")]
    DarkOrange,
    Red,
}

impl ConditionLabel {
    /// Most severe label
    pub const WORST: ConditionLabel = ConditionLabel::Red;

    /// Severity index, 0 (Green) through 5 (Red)
    pub fn index(&self) -> usize {
        match self {
            ConditionLabel::Green => 0,
            ConditionLabel::LightGreen => 1,
            ConditionLabel::Yellow => 2,
            ConditionLabel::Orange => 3,
            ConditionLabel::DarkOrange => 4,
            ConditionLabel::Red => 5,
        }
    }

    /// Label at a severity index; indices past the end saturate at Red
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => ConditionLabel::Green,
            1 => ConditionLabel::LightGreen,
            2 => ConditionLabel::Yellow,
            3 => ConditionLabel::Orange,
            4 => ConditionLabel::DarkOrange,
            _ => ConditionLabel::Red,
        }
    }

    /// All labels in severity order
    pub fn all() -> Vec<ConditionLabel> {
        ConditionLabel::iter().collect()
    }

    /// Check if the filter should be replaced right away
    pub fn is_critical(&self) -> bool {
        matches!(self, ConditionLabel::Red)
    }

    /// Display triple shown to the user for this label
    pub fn presentation(&self) -> Presentation {
        match self {
            ConditionLabel::Green => Presentation::new("🟢", "#1f8a3a", "Excellent — Filter is fresh"),
            ConditionLabel::LightGreen => {
                Presentation::new("🟢", "#3fbf5c", "Good — Recently changed")
            }
            ConditionLabel::Yellow => Presentation::new("🟡", "#bfa21f", "Moderate — Inspect soon"),
            ConditionLabel::Orange => {
                Presentation::new("🟠", "#d48233", "Ageing — Service recommended")
            }
            ConditionLabel::DarkOrange => {
                Presentation::new("🟠", "#a85f23", "Critical — Replace soon")
            }
            ConditionLabel::Red => Presentation::new("🔴", "#b33636", "Replace Immediately"),
        }
    }
}

/// Icon, color and message rendered for a prediction
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub struct Presentation {
    pub icon: &'static str,
    pub color: &'static str,
    pub message: &'static str,
}

impl Presentation {
    const fn new(icon: &'static str, color: &'static str, message: &'static str) -> Self {
        Self {
            icon,
            color,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::str::FromStr;

    #[test]
    fn test_label_ordering() {
        assert!(ConditionLabel::Green < ConditionLabel::LightGreen);
        assert!(ConditionLabel::DarkOrange < ConditionLabel::Red);
        assert_eq!(ConditionLabel::all().len(), 6);
    }

    #[test]
    fn test_index_round_trip() {
        for label in ConditionLabel::all() {
            assert_eq!(ConditionLabel::from_index(label.index()), label);
        }
        assert_eq!(ConditionLabel::from_index(9), ConditionLabel::Red);
    }

    #[test]
    fn test_string_forms() {
        assert_eq!(ConditionLabel::LightGreen.to_string(), "Light-Green");
        assert_eq!(ConditionLabel::DarkOrange.to_string(), "Dark-Orange");
        assert_eq!(
            ConditionLabel::from_str("Dark-Orange").unwrap(),
            ConditionLabel::DarkOrange
        );
        assert!(ConditionLabel::from_str("dark-orange").is_err());
        assert!(ConditionLabel::from_str("Purple").is_err());
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&ConditionLabel::LightGreen).unwrap();
        assert_eq!(json, "\"Light-Green\"");
        let back: ConditionLabel = serde_json::from_str("\"Dark-Orange\"").unwrap();
        assert_eq!(back, ConditionLabel::DarkOrange);
    }

    #[test]
    fn test_presentation_is_injective() {
        let presentations: HashSet<Presentation> = ConditionLabel::all()
            .iter()
            .map(|label| label.presentation())
            .collect();
        assert_eq!(presentations.len(), 6);

        let messages: HashSet<&str> = ConditionLabel::all()
            .iter()
            .map(|label| label.presentation().message)
            .collect();
        assert_eq!(messages.len(), 6);
    }

    #[test]
    fn test_red_presentation() {
        let presentation = ConditionLabel::Red.presentation();
        assert_eq!(presentation.icon, "🔴");
        assert_eq!(presentation.color, "#b33636");
        assert_eq!(presentation.message, "Replace Immediately");
        assert!(ConditionLabel::Red.is_critical());
        assert!(!ConditionLabel::DarkOrange.is_critical());
    }
}
