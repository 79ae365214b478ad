//! Dosing constants and the maintenance target policy.
//!
//! Product rates are per m³ of pool water. Stick figures are quoted for a
//! 25 m³ reference pool and scale inversely with volume.

use crate::Occupancy;
use serde::{Deserialize, Serialize};

// -- Targets --

/// pH every correction aims for.
pub const TARGET_PH: f64 = 7.0;

/// Free chlorine [mg/l] the pool should hold when the technician leaves.
pub const TARGET_CHLORINE_ON_DEPARTURE: f64 = 4.0;

/// Above this free chlorine [mg/l] anti-chlor is dosed (exclusive).
pub const HIGH_CHLORINE_THRESHOLD: f64 = 6.0;

/// |ΔpH| below this needs no correction.
pub const PH_TOLERANCE: f64 = 0.05;

/// Chlorine deficits [mg/l] below this need no briquettes.
pub const MIN_BRIQUETTE_DEFICIT: f64 = 0.3;

// -- Product rates --

/// pH-minus [ml per pH unit per m³].
pub const PH_MINUS_RATE: f64 = 35.0;

/// pH-plus [ml per pH unit per m³].
pub const PH_PLUS_RATE: f64 = 49.0;

/// Anti-chlor [g per mg/l reduction per m³].
pub const ANTICHLOR_RATE: f64 = 0.83;

/// Chlorine briquettes [units per mg/l deficit per m³].
pub const BRIQUETTE_RATE: f64 = 0.21;

// -- Slow-release sticks --

/// Volume [m³] the stick figures below are quoted for.
pub const STICK_REFERENCE_VOLUME: f64 = 25.0;

/// Free chlorine [mg/l] one stick adds to the reference pool.
pub const STICK_CHLORINE_YIELD: f64 = 8.0;

/// pH rise one stick causes in the reference pool.
pub const STICK_PH_RISE: f64 = 0.4;

// -- Chlorine gas hazard --

/// Below this pH, adding chlorine is a severe gas hazard.
pub const SEVERE_HAZARD_PH: f64 = 4.0;

/// Up to and including this pH, adding chlorine is a moderate gas hazard.
pub const MODERATE_HAZARD_PH_MAX: f64 = 6.9;

fn default_fixed_target() -> f64 {
    TARGET_CHLORINE_ON_DEPARTURE
}

fn default_occupied_target() -> f64 {
    5.5
}

fn default_vacant_target() -> f64 {
    3.8
}

/// Chlorine level slow-release sticks should maintain.
///
/// Two incompatible policies are in use in the field:
///
/// - `Fixed`: one target regardless of occupancy, projected from the level
///   expected right after briquette dosing. This is the default.
/// - `ByOccupancy`: a higher target while the house is let out, projected
///   from the current reading.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MaintenancePolicy {
    Fixed {
        #[serde(default = "default_fixed_target")]
        target_mgl: f64,
    },
    ByOccupancy {
        #[serde(default = "default_occupied_target")]
        occupied_mgl: f64,
        #[serde(default = "default_vacant_target")]
        vacant_mgl: f64,
    },
}

impl Default for MaintenancePolicy {
    fn default() -> Self {
        Self::fixed()
    }
}

impl MaintenancePolicy {
    pub fn fixed() -> Self {
        MaintenancePolicy::Fixed {
            target_mgl: default_fixed_target(),
        }
    }

    pub fn by_occupancy() -> Self {
        MaintenancePolicy::ByOccupancy {
            occupied_mgl: default_occupied_target(),
            vacant_mgl: default_vacant_target(),
        }
    }

    /// Maintenance target [mg/l] for the given occupancy
    pub fn target(&self, occupancy: Occupancy) -> f64 {
        match self {
            MaintenancePolicy::Fixed { target_mgl } => *target_mgl,
            MaintenancePolicy::ByOccupancy {
                occupied_mgl,
                vacant_mgl,
            } => match occupancy {
                Occupancy::Occupied => *occupied_mgl,
                Occupancy::Vacant => *vacant_mgl,
            },
        }
    }

    /// Level the stick projection starts from
    ///
    /// `Fixed` assumes briquettes have already topped the pool up to the
    /// departure target; `ByOccupancy` works from the raw reading.
    pub fn baseline(&self, current_chlorine_mgl: f64, departure_deficit: f64) -> f64 {
        match self {
            MaintenancePolicy::Fixed { .. } => current_chlorine_mgl + departure_deficit,
            MaintenancePolicy::ByOccupancy { .. } => current_chlorine_mgl,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MaintenancePolicy::Fixed { .. } => "fixed",
            MaintenancePolicy::ByOccupancy { .. } => "by_occupancy",
        }
    }

    /// Parse a policy name into the policy with its default targets
    pub fn from_name(name: &str) -> crate::Result<Self> {
        match name.to_lowercase().replace('-', "_").as_str() {
            "fixed" => Ok(Self::fixed()),
            "by_occupancy" | "occupancy" => Ok(Self::by_occupancy()),
            other => Err(crate::Error::Config(format!(
                "unknown maintenance policy '{}' (expected fixed or by-occupancy)",
                other
            ))),
        }
    }
}

/// Policy parameters an evaluation runs under
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DosingPolicy {
    #[serde(default)]
    pub maintenance: MaintenancePolicy,
}

impl DosingPolicy {
    pub fn new(maintenance: MaintenancePolicy) -> Self {
        Self { maintenance }
    }
}

/// Scale factor from the 25 m³ stick reference pool to `volume_m3`
pub fn stick_scale(volume_m3: f64) -> f64 {
    STICK_REFERENCE_VOLUME / volume_m3
}
