//! Text rendering of dosing recommendations.

use pool_core::policy::TARGET_CHLORINE_ON_DEPARTURE;
use pool_core::{
    DosingRecommendation, MeasurementInput, NotApplicableReason, Occupancy, PhAction, Pool,
    Severity, StickRecommendation, WarningKind,
};

const RULE: &str = "─────────────────────────────────────────";

const STICK_PLACEMENT: &str = "Tempo Sticks always go in the CHLORINATOR, or in the SKIMMER via a \
                               Tempo Stick dispenser - never directly in the skimmer or the pool!";

/// Full report for one evaluation
pub fn render_report(
    pool: Option<&Pool>,
    input: &MeasurementInput,
    rec: &DosingRecommendation,
) -> String {
    let mut out = Vec::new();

    out.push(String::new());
    match pool {
        Some(pool) => {
            out.push(format!("  {}", pool.heading()));
            let info = pool.info.display_lines();
            if !info.is_empty() {
                out.push(format!("  {}", info.join(" | ")));
            }
        }
        None => out.push(format!("  Pool - {:.1} m³", input.volume_m3)),
    }
    out.push(format!(
        "  House: {} | pH {:.2} | Free chlorine {:.1} mg/l",
        match input.occupancy {
            Occupancy::Occupied => "let out",
            Occupancy::Vacant => "not let out",
        },
        input.current_ph,
        input.current_chlorine_mgl
    ));
    out.push(String::new());

    for warning in rec
        .warnings
        .iter()
        .filter(|w| w.kind != WarningKind::AntichlorWait)
    {
        let marker = match warning.severity {
            Severity::Severe => "!!!",
            Severity::Moderate => "!!",
            Severity::Caution => "!",
        };
        for line in warning.message.lines() {
            out.push(format!("  {} {}", marker, line));
        }
        out.push(String::new());
    }

    out.push("╭─────────────────────────────────────────╮".into());
    out.push("│  DO THIS FIRST - step by step".into());
    out.push("╰─────────────────────────────────────────╯".into());
    out.push("  1. Adjust pH first (dissolve pH-minus in a bucket of pool water and add it slowly, preferably in front of the jets)".into());
    out.push(format!(
        "  2. Add chlorine briquettes if needed to reach ~{:.0} mg/l when leaving the pool house",
        TARGET_CHLORINE_ON_DEPARTURE
    ));
    out.push("  3. Add Tempo Sticks in the CHLORINATOR or the SKIMMER BASKET via a dispenser (only if no sticks are present and the house is let out)".into());
    out.push(String::new());

    out.push(RULE.into());
    out.push("RECOMMENDED DOSING".into());
    out.push(RULE.into());
    out.extend(render_ph(&rec.ph_action));
    out.push(String::new());
    out.extend(render_chlorine(input, rec));
    out.push(String::new());
    out.extend(render_sticks(&rec.stick_recommendation));
    out.push(String::new());

    out.join("\n")
}

fn render_ph(action: &PhAction) -> Vec<String> {
    match action {
        PhAction::None => vec!["pH looks fine - no adjustment needed".into()],
        PhAction::Lower {
            delta_ph,
            amount_ml,
        } => vec![
            format!("Lower pH by {:.2}", delta_ph),
            format!("  → pH-minus: {} ml", amount_ml.round() as i64),
        ],
        PhAction::Raise {
            delta_ph,
            amount_ml,
        } => vec![
            format!("Raise pH by {:.2}", delta_ph),
            format!("  → pH-plus: {} ml", amount_ml.round() as i64),
        ],
    }
}

fn render_chlorine(input: &MeasurementInput, rec: &DosingRecommendation) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(reduction) = &rec.chlorine_reduction {
        lines.push(format!(
            "Lower chlorine (too high: {:.1} mg/l)",
            input.current_chlorine_mgl
        ));
        lines.push(format!(
            "  → Anti-chlor: {} gram/ml",
            reduction.antichlor_amount.round() as i64
        ));
        lines.push(format!(
            "  lowers chlorine from {:.1} mg/l to {:.1} mg/l",
            input.current_chlorine_mgl, reduction.resulting_level
        ));
        for warning in rec
            .warnings
            .iter()
            .filter(|w| w.kind == WarningKind::AntichlorWait)
        {
            lines.push(format!("  ! {}", warning.message));
        }
    } else if let Some(addition) = &rec.chlorine_addition {
        lines.push(format!(
            "Chlorinate to {:.1} mg/l on departure",
            TARGET_CHLORINE_ON_DEPARTURE
        ));
        lines.push(format!(
            "  → HTH Briquettes/Daytabs: {:.1} pcs → round to {} pcs",
            addition.briquette_count_exact, addition.briquette_count_rounded
        ));
        lines.push(format!(
            "  raises chlorine from {:.1} mg/l to {:.1} mg/l",
            input.current_chlorine_mgl, addition.resulting_level
        ));
    } else {
        lines.push("Chlorine OK on departure - no briquettes needed".into());
    }

    lines
}

fn render_sticks(stick: &StickRecommendation) -> Vec<String> {
    let mut lines = vec!["Maintenance - Tempo Sticks (5-7 days)".to_string()];

    match stick {
        StickRecommendation::ExistingSufficient { count } => lines.push(format!(
            "  {} stick(s) already in place → no new sticks suggested",
            count
        )),
        StickRecommendation::NotApplicable(NotApplicableReason::NotOccupied) => {
            lines.push("  The house is not let out → no Tempo Sticks needed".into())
        }
        StickRecommendation::NotApplicable(NotApplicableReason::ChlorineSufficient { level }) => {
            lines.push(format!(
                "  Chlorine after dosing is {:.1} mg/l, above the maintenance target → no new sticks needed",
                level
            ))
        }
        StickRecommendation::Needed {
            count,
            added_chlorine_estimate,
            ph_rise_estimate,
        } => {
            lines.push(format!("  → HTH Tempo Sticks: {} pcs", count));
            lines.push(format!(
                "  adds approx. +{:.1} mg/l chlorine and +{:.2} pH",
                added_chlorine_estimate, ph_rise_estimate
            ));
            lines.push(format!("  {}", STICK_PLACEMENT));
        }
        StickRecommendation::AwaitingInput => lines.push(
            "  Choose how many Tempo Sticks are already in place (--sticks 1 or 2) to get a stick recommendation."
                .into(),
        ),
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pool_core::{evaluate, DosingPolicy, PoolInfo, StickCount};

    fn report(input: &MeasurementInput) -> String {
        let rec = evaluate(input, &DosingPolicy::default()).unwrap();
        render_report(None, input, &rec)
    }

    #[test]
    fn test_low_chlorine_occupied_report() {
        let input = MeasurementInput::new(45.0, 7.5, 1.5, Occupancy::Occupied);
        let text = report(&input);

        assert!(text.contains("Pool - 45.0 m³"));
        assert!(text.contains("Lower pH by 0.72"));
        assert!(text.contains("pH-minus: 1138 ml"));
        assert!(text.contains("23.6 pcs → round to 24 pcs"));
        assert!(text.contains("from 1.5 mg/l to 4.0 mg/l"));
        assert!(text.contains("HTH Tempo Sticks: 1 pcs"));
        assert!(text.contains("+4.4 mg/l chlorine and +0.22 pH"));
    }

    #[test]
    fn test_high_chlorine_report() {
        let input = MeasurementInput::new(25.0, 7.0, 8.0, Occupancy::Vacant);
        let text = report(&input);

        assert!(text.contains("Lower chlorine (too high: 8.0 mg/l)"));
        assert!(text.contains("Anti-chlor: 83 gram/ml"));
        assert!(text.contains("Wait 1-2 hours"));
        assert!(text.contains("pH looks fine"));
        assert!(text.contains("not let out"));
    }

    #[test]
    fn test_awaiting_input_report() {
        let input = MeasurementInput::new(25.0, 6.5, 4.0, Occupancy::Occupied)
            .with_existing_sticks(None);
        let text = report(&input);

        assert!(text.contains("--sticks 1 or 2"));
        assert!(text.contains("Raise pH by 0.50"));
        assert!(text.contains("pH-plus: 613 ml"));
    }

    #[test]
    fn test_existing_sticks_report() {
        let input = MeasurementInput::new(25.0, 7.0, 4.0, Occupancy::Occupied)
            .with_existing_sticks(Some(StickCount::Two));
        assert!(report(&input).contains("2 stick(s) already in place"));
    }

    #[test]
    fn test_severe_warning_shown_first() {
        let input = MeasurementInput::new(25.0, 3.5, 1.0, Occupancy::Vacant);
        let text = report(&input);

        let warning_at = text.find("!!! SEVERE WARNING").unwrap();
        let dosing_at = text.find("RECOMMENDED DOSING").unwrap();
        assert!(warning_at < dosing_at);
    }

    #[test]
    fn test_pool_heading_and_info() {
        let mut info = PoolInfo::default();
        info.insert("address", Some("Strandvej 1".into()));
        info.insert("keybox_code", None);
        let pool = Pool {
            name: "Villa Sol".into(),
            volume_m3: 45.0,
            info,
        };
        let input = MeasurementInput::new(45.0, 7.0, 4.0, Occupancy::Vacant);
        let rec = evaluate(&input, &DosingPolicy::default()).unwrap();
        let text = render_report(Some(&pool), &input, &rec);

        assert!(text.contains("Villa Sol - 45.0 m³"));
        assert!(text.contains("Address: Strandvej 1 | Keybox code: Not specified"));
    }
}
