//! Core domain types for pool dosing.
//!
//! This module defines the fundamental types used throughout the system:
//! - Measurement input (volume, water test readings, occupancy, sticks)
//! - Dosing actions for pH and chlorine
//! - Maintenance stick recommendations
//! - Safety warnings

use serde::{Deserialize, Serialize};

// ============================================================================
// Input Types
// ============================================================================

/// Whether the house belonging to the pool is currently let out
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Occupancy {
    Vacant,
    Occupied,
}

/// Number of slow-release sticks already sitting in the chlorinator
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StickCount {
    One,
    Two,
}

impl StickCount {
    pub fn get(self) -> u32 {
        match self {
            StickCount::One => 1,
            StickCount::Two => 2,
        }
    }
}

impl TryFrom<u32> for StickCount {
    type Error = crate::Error;

    fn try_from(value: u32) -> crate::Result<Self> {
        match value {
            1 => Ok(StickCount::One),
            2 => Ok(StickCount::Two),
            other => Err(crate::Error::InvalidInput(format!(
                "existing stick count must be 1 or 2, got {}",
                other
            ))),
        }
    }
}

/// One set of water-test readings for a pool, built fresh per evaluation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MeasurementInput {
    pub volume_m3: f64,
    pub current_ph: f64,
    pub current_chlorine_mgl: f64,
    pub occupancy: Occupancy,
    pub existing_stick_present: bool,
    /// Required when `existing_stick_present` is set; ignored otherwise.
    pub existing_stick_count: Option<StickCount>,
}

impl MeasurementInput {
    /// Readings for a pool with no stick in the chlorinator
    pub fn new(
        volume_m3: f64,
        current_ph: f64,
        current_chlorine_mgl: f64,
        occupancy: Occupancy,
    ) -> Self {
        Self {
            volume_m3,
            current_ph,
            current_chlorine_mgl,
            occupancy,
            existing_stick_present: false,
            existing_stick_count: None,
        }
    }

    /// Mark an existing stick as present. `None` leaves the count unanswered.
    pub fn with_existing_sticks(mut self, count: Option<StickCount>) -> Self {
        self.existing_stick_present = true;
        self.existing_stick_count = count;
        self
    }

    /// Check the input against the calculator's domain
    pub fn validate(&self) -> crate::Result<()> {
        if !self.volume_m3.is_finite() || self.volume_m3 <= 0.0 {
            return Err(crate::Error::InvalidInput(format!(
                "volume must be a positive number of m³, got {}",
                self.volume_m3
            )));
        }
        if !self.current_ph.is_finite() || !(0.0..=14.0).contains(&self.current_ph) {
            return Err(crate::Error::InvalidInput(format!(
                "pH must be between 0 and 14, got {}",
                self.current_ph
            )));
        }
        if !self.current_chlorine_mgl.is_finite() || self.current_chlorine_mgl < 0.0 {
            return Err(crate::Error::InvalidInput(format!(
                "free chlorine must be 0 mg/l or more, got {}",
                self.current_chlorine_mgl
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Recommendation Types
// ============================================================================

/// pH correction, with the effective delta it was computed from
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PhAction {
    None,
    /// pH-minus dose
    Lower { delta_ph: f64, amount_ml: f64 },
    /// pH-plus dose
    Raise { delta_ph: f64, amount_ml: f64 },
}

/// Anti-chlor dose for an over-chlorinated pool
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ChlorineReduction {
    /// Grams (or ml for liquid product)
    pub antichlor_amount: f64,
    pub resulting_level: f64,
}

/// Chlorine briquettes to reach the departure target
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ChlorineAddition {
    pub briquette_count_exact: f64,
    pub briquette_count_rounded: u32,
    pub resulting_level: f64,
}

/// Why no sticks are proposed
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum NotApplicableReason {
    NotOccupied,
    /// Chlorine level the projection started from is already above target
    ChlorineSufficient { level: f64 },
}

/// Maintenance stick outcome for the coming 5-7 days
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StickRecommendation {
    NotApplicable(NotApplicableReason),
    ExistingSufficient { count: u32 },
    Needed {
        count: u32,
        added_chlorine_estimate: f64,
        ph_rise_estimate: f64,
    },
    /// Existing stick flagged without a count; stick output withheld
    AwaitingInput,
}

impl StickRecommendation {
    /// pH rise expected from newly added sticks
    pub fn ph_rise(&self) -> f64 {
        match self {
            StickRecommendation::Needed {
                ph_rise_estimate, ..
            } => *ph_rise_estimate,
            _ => 0.0,
        }
    }
}

/// Warning severity, most severe first
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Severe,
    Moderate,
    Caution,
}

/// What a warning is about
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Extremely low pH while chlorine must be added
    ChlorineGasSevere,
    /// Low pH while chlorine must be added
    ChlorineGasModerate,
    /// Anti-chlor added; wait before dosing further
    AntichlorWait,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Warning {
    pub severity: Severity,
    pub kind: WarningKind,
    pub message: String,
}

/// Full outcome of one evaluation
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DosingRecommendation {
    pub ph_action: PhAction,
    pub chlorine_reduction: Option<ChlorineReduction>,
    pub chlorine_addition: Option<ChlorineAddition>,
    pub stick_recommendation: StickRecommendation,
    pub warnings: Vec<Warning>,
}

impl DosingRecommendation {
    pub fn has_warning(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stick_count_conversion() {
        assert_eq!(StickCount::try_from(1).unwrap(), StickCount::One);
        assert_eq!(StickCount::try_from(2).unwrap().get(), 2);
        assert!(matches!(
            StickCount::try_from(0),
            Err(crate::Error::InvalidInput(_))
        ));
        assert!(StickCount::try_from(3).is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_volume() {
        for volume in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let input = MeasurementInput::new(volume, 7.0, 1.0, Occupancy::Vacant);
            assert!(
                matches!(input.validate(), Err(crate::Error::InvalidInput(_))),
                "volume {} should be rejected",
                volume
            );
        }
    }

    #[test]
    fn test_validate_ph_and_chlorine_domain() {
        assert!(MeasurementInput::new(25.0, 0.0, 0.0, Occupancy::Vacant)
            .validate()
            .is_ok());
        assert!(MeasurementInput::new(25.0, 14.0, 0.0, Occupancy::Vacant)
            .validate()
            .is_ok());
        assert!(MeasurementInput::new(25.0, 14.1, 0.0, Occupancy::Vacant)
            .validate()
            .is_err());
        assert!(MeasurementInput::new(25.0, -0.1, 0.0, Occupancy::Vacant)
            .validate()
            .is_err());
        assert!(MeasurementInput::new(25.0, 7.0, -0.5, Occupancy::Vacant)
            .validate()
            .is_err());
    }

    #[test]
    fn test_with_existing_sticks_sets_flag() {
        let input = MeasurementInput::new(25.0, 7.0, 1.0, Occupancy::Occupied)
            .with_existing_sticks(None);
        assert!(input.existing_stick_present);
        assert_eq!(input.existing_stick_count, None);
    }

    #[test]
    fn test_recommendation_serializes_tagged() {
        let rec = DosingRecommendation {
            ph_action: PhAction::Lower {
                delta_ph: 0.5,
                amount_ml: 437.5,
            },
            chlorine_reduction: None,
            chlorine_addition: None,
            stick_recommendation: StickRecommendation::AwaitingInput,
            warnings: vec![],
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["ph_action"]["action"], "lower");
        assert_eq!(json["stick_recommendation"]["status"], "awaiting_input");
    }
}
