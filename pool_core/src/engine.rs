//! Dosing engine: turns one set of water-test readings into a recommendation.
//!
//! Evaluation order:
//! 1. Chlorine gas hazard check (low pH while chlorine must be added)
//! 2. Maintenance stick projection
//! 3. pH correction, netted against the pH rise from new sticks
//! 4. Chlorine reduction (anti-chlor) or addition (briquettes), never both
//!
//! Every step reads only the input; the order fixes how warnings and
//! sections are presented.

use crate::policy::{
    stick_scale, MaintenancePolicy, ANTICHLOR_RATE, BRIQUETTE_RATE, HIGH_CHLORINE_THRESHOLD,
    MIN_BRIQUETTE_DEFICIT, MODERATE_HAZARD_PH_MAX, PH_MINUS_RATE, PH_PLUS_RATE, PH_TOLERANCE,
    SEVERE_HAZARD_PH, STICK_CHLORINE_YIELD, STICK_PH_RISE, TARGET_CHLORINE_ON_DEPARTURE,
    TARGET_PH,
};
use crate::{
    ChlorineAddition, ChlorineReduction, DosingPolicy, DosingRecommendation, MeasurementInput,
    NotApplicableReason, Occupancy, PhAction, Result, Severity, StickRecommendation, Warning,
    WarningKind,
};

/// Evaluate one measurement under the given policy
///
/// Fails only with [`crate::Error::InvalidInput`] when the readings are
/// outside the calculator's domain. An existing stick flagged without a
/// count is not an error: the stick section comes back as
/// [`StickRecommendation::AwaitingInput`] and every other section is
/// computed as usual.
pub fn evaluate(input: &MeasurementInput, policy: &DosingPolicy) -> Result<DosingRecommendation> {
    input.validate()?;

    let deficit = departure_deficit(input.current_chlorine_mgl);

    let mut warnings = hazard_warnings(input.current_ph, deficit);

    let stick_recommendation = project_sticks(input, &policy.maintenance, deficit);
    tracing::debug!("Stick projection: {:?}", stick_recommendation);

    let ph_action = ph_action(input, stick_recommendation.ph_rise());
    tracing::debug!("pH action: {:?}", ph_action);

    let (chlorine_reduction, chlorine_addition) = match chlorine_dose(input, deficit) {
        ChlorineDose::Reduce(reduction) => {
            warnings.push(Warning {
                severity: Severity::Caution,
                kind: WarningKind::AntichlorWait,
                message: "Wait 1-2 hours after adding anti-chlor and measure again \
                          before adding any more chlorine."
                    .into(),
            });
            (Some(reduction), None)
        }
        ChlorineDose::Add(addition) => (None, Some(addition)),
        ChlorineDose::Nothing => (None, None),
    };

    Ok(DosingRecommendation {
        ph_action,
        chlorine_reduction,
        chlorine_addition,
        stick_recommendation,
        warnings,
    })
}

/// Chlorine [mg/l] missing to reach the departure target, never negative
pub fn departure_deficit(current_chlorine_mgl: f64) -> f64 {
    (TARGET_CHLORINE_ON_DEPARTURE - current_chlorine_mgl).max(0.0)
}

/// Chlorine gas warnings for dosing chlorine into low-pH water
fn hazard_warnings(current_ph: f64, deficit: f64) -> Vec<Warning> {
    let mut warnings = Vec::new();
    if deficit <= 0.0 {
        return warnings;
    }

    if current_ph < SEVERE_HAZARD_PH {
        tracing::warn!(
            "pH {:.2} with chlorine deficit {:.2} mg/l: severe chlorine gas hazard",
            current_ph,
            deficit
        );
        warnings.push(Warning {
            severity: Severity::Severe,
            kind: WarningKind::ChlorineGasSevere,
            message: [
                "SEVERE WARNING: EXTREMELY LOW pH + CHLORINE ADDITION!",
                "The risk of releasing dangerous chlorine gas is very high.",
                "- STOP! Measure pH again and raise it to at least 7.0 BEFORE adding chlorine.",
                "- Never use chlorine and pH-minus at the same time.",
                "- Dissolve chlorine in a bucket of water, add it slowly, keep good circulation and fresh air.",
                "- Leave the area if you smell chlorine or have trouble breathing.",
                "- Contact poison control if symptoms appear.",
            ]
            .join("\n"),
        });
    } else if (SEVERE_HAZARD_PH..=MODERATE_HAZARD_PH_MAX).contains(&current_ph) {
        tracing::warn!(
            "pH {:.2} with chlorine deficit {:.2} mg/l: chlorine gas hazard",
            current_ph,
            deficit
        );
        warnings.push(Warning {
            severity: Severity::Moderate,
            kind: WarningKind::ChlorineGasModerate,
            message: [
                "Warning: low pH + chlorine addition can release chlorine gas!",
                "- Make sure pH is at least 7.0 before adding chlorine.",
                "- Dissolve chlorine in a bucket of water first and add it slowly in front of the jets.",
                "- Keep good circulation and fresh air in the pool house.",
                "- Measure again after 30-60 minutes.",
            ]
            .join("\n"),
        });
    }

    warnings
}

/// Decide how many new slow-release sticks the pool needs
fn project_sticks(
    input: &MeasurementInput,
    maintenance: &MaintenancePolicy,
    deficit: f64,
) -> StickRecommendation {
    if input.existing_stick_present {
        return match input.existing_stick_count {
            Some(count) => StickRecommendation::ExistingSufficient { count: count.get() },
            None => {
                tracing::info!("Existing stick flagged without a count, withholding sticks");
                StickRecommendation::AwaitingInput
            }
        };
    }

    if input.occupancy == Occupancy::Vacant {
        return StickRecommendation::NotApplicable(NotApplicableReason::NotOccupied);
    }

    let baseline = maintenance.baseline(input.current_chlorine_mgl, deficit);
    let target = maintenance.target(input.occupancy);
    let maintenance_deficit = (target - baseline).max(0.0);

    let scale = stick_scale(input.volume_m3);
    let raise_per_stick = STICK_CHLORINE_YIELD * scale;

    let count = if maintenance_deficit > 0.0 {
        // Round to nearest, but never fewer than one stick
        ((maintenance_deficit / raise_per_stick).round() as u32).max(1)
    } else if baseline <= target {
        // Sitting exactly at target still gets one stick for the week
        1
    } else {
        0
    };

    tracing::debug!(
        "Maintenance ({}): baseline {:.2} mg/l, target {:.2} mg/l, {} stick(s)",
        maintenance.name(),
        baseline,
        target,
        count
    );

    if count == 0 {
        return StickRecommendation::NotApplicable(NotApplicableReason::ChlorineSufficient {
            level: baseline,
        });
    }

    StickRecommendation::Needed {
        count,
        added_chlorine_estimate: count as f64 * raise_per_stick,
        ph_rise_estimate: STICK_PH_RISE * count as f64 * scale,
    }
}

/// pH correction, including the rise expected from new sticks
fn ph_action(input: &MeasurementInput, ph_rise_from_sticks: f64) -> PhAction {
    let delta_ph = (input.current_ph - TARGET_PH) + ph_rise_from_sticks;

    if delta_ph.abs() < PH_TOLERANCE {
        PhAction::None
    } else if delta_ph > 0.0 {
        PhAction::Lower {
            delta_ph,
            amount_ml: PH_MINUS_RATE * delta_ph * input.volume_m3,
        }
    } else {
        PhAction::Raise {
            delta_ph: -delta_ph,
            amount_ml: PH_PLUS_RATE * -delta_ph * input.volume_m3,
        }
    }
}

enum ChlorineDose {
    Reduce(ChlorineReduction),
    Add(ChlorineAddition),
    Nothing,
}

fn chlorine_dose(input: &MeasurementInput, deficit: f64) -> ChlorineDose {
    let current = input.current_chlorine_mgl;

    if current > HIGH_CHLORINE_THRESHOLD {
        let reduction = current - TARGET_CHLORINE_ON_DEPARTURE;
        tracing::debug!("Chlorine {:.1} mg/l too high, reducing by {:.1}", current, reduction);
        return ChlorineDose::Reduce(ChlorineReduction {
            antichlor_amount: ANTICHLOR_RATE * reduction * input.volume_m3,
            resulting_level: TARGET_CHLORINE_ON_DEPARTURE,
        });
    }

    if deficit < MIN_BRIQUETTE_DEFICIT {
        return ChlorineDose::Nothing;
    }

    let exact = BRIQUETTE_RATE * deficit * input.volume_m3;
    ChlorineDose::Add(ChlorineAddition {
        briquette_count_exact: exact,
        briquette_count_rounded: exact.round() as u32,
        resulting_level: current + deficit,
    })
}
