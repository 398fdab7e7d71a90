use crate::infra::parse_instant;
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use iop_target::assessment::{assess_patient, Adherence, DiseaseSeverity, PatientContext};
use iop_target::config::AssessmentConfig;
use iop_target::error::AppError;
use iop_target::monitoring::{Measurement, MeasurementLog};
use iop_target::risk::{
    ClinicalReadings, CupDiscRatio, MeanDeviation, Notching, PerEyeFactors, Presence,
    SharedFactors,
};
use iop_target::targets::{
    compute_trbs, BilateralTargets, CalculationMode, TargetHistory, TargetProposal, TrbsRequest,
};
use iop_target::{Eye, EyePair};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Assessment time (RFC 3339 or YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = parse_instant)]
    pub(crate) as_of: Option<DateTime<Utc>>,
    /// Use the top of each tier's reduction range
    #[arg(long)]
    pub(crate) aggressive: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let as_of = args.as_of.unwrap_or_else(Utc::now);
    let config = AssessmentConfig::default();

    println!("IOP target engine demo");
    let request = demo_request(args.aggressive);
    let targets = compute_trbs(&request);
    render_targets(&targets);

    let set_at = as_of - Duration::days(150);
    let mut history = TargetHistory::new();
    let proposal = TargetProposal::new(CalculationMode::Trbs, targets.targets())
        .override_eye(Eye::Od, 15.0)
        .justification("Fellow eye lost to advanced disease; holding OD at 15")
        .rationale("TRBS calculation at diagnosis")
        .set_by("demo clinician");
    let record = history.supersede(proposal, set_at)?;
    println!(
        "\nTarget record v{} set {} (OD {:.1}{} | OS {:.1})",
        record.version,
        record.valid_from.format("%Y-%m-%d"),
        record.final_targets.od,
        if record.overridden.od { " overridden" } else { "" },
        record.final_targets.os,
    );
    let final_targets = record.final_targets;

    let log = demo_measurements(as_of);
    println!("\nMeasurements ({} visits, newest first)", log.len());
    for measurement in log.iter() {
        let status = measurement.classify(&final_targets);
        println!(
            "- {} | OD {} | OS {}",
            measurement.taken_at.format("%Y-%m-%d"),
            describe_reading(measurement.iop.od, status.od.map(|eval| eval.status.label())),
            describe_reading(measurement.iop.os, status.os.map(|eval| eval.status.label())),
        );
    }

    let context = PatientContext {
        targets: final_targets,
        disease_severity: DiseaseSeverity::Moderate,
        adherence: Adherence::Good,
    };
    let assessment = match assess_patient(&context, &log, as_of, &config) {
        Ok(assessment) => assessment,
        Err(err) => {
            println!("  Assessment unavailable: {}", err);
            return Ok(());
        }
    };

    println!("\nAssessment as of {}", assessment.as_of.format("%Y-%m-%d"));
    println!(
        "- IOP {} (severity {}) | fluctuation {:.1} mmHg",
        assessment.iop_status.label(),
        assessment.iop_severity,
        assessment.fluctuation
    );
    println!(
        "- Structural {:?} (severity {}) | Functional {:?} (severity {})",
        assessment.structural.status,
        assessment.structural.severity,
        assessment.functional.status,
        assessment.functional.severity
    );
    println!(
        "- Composite risk {} (score {})",
        assessment.risk.level.label(),
        assessment.risk.score
    );
    for reason in &assessment.risk.reasons {
        println!("    - {reason}");
    }
    println!(
        "- Follow up in {} days (next visit {})",
        assessment.follow_up.days,
        assessment.next_visit.format("%Y-%m-%d")
    );
    for action in &assessment.follow_up.actions {
        println!("    - {action}");
    }

    Ok(())
}

fn render_targets(targets: &BilateralTargets) {
    println!("Calculated targets");
    for eye in Eye::BOTH {
        let computation = targets.get(eye);
        let cap = match computation.ceiling {
            Some(ceiling) if computation.cap_applied => {
                format!(" (capped at {:.1} by {:?})", ceiling.value, ceiling.source)
            }
            _ => String::new(),
        };
        println!(
            "- {}: baseline {:.1} | TRBS {} ({}) | -{}% -> {:.1} mmHg{}",
            eye,
            computation.baseline,
            computation.trbs,
            computation.tier.label(),
            computation.reduction_percent,
            computation.target,
            cap
        );
    }
    let worse = targets.worse_eye();
    println!("  Worse eye: {} (TRBS {})", worse.eye, worse.trbs);
}

fn describe_reading(reading: Option<f64>, status: Option<&str>) -> String {
    match (reading, status) {
        (Some(value), Some(status)) => format!("{value:.0} {status}"),
        _ => "not measured".to_string(),
    }
}

fn demo_request(aggressive: bool) -> TrbsRequest {
    let od = PerEyeFactors {
        cup_disc_ratio: CupDiscRatio::R08,
        notching: Notching::Unipolar,
        disc_hemorrhage: Presence::Present,
        mean_deviation: MeanDeviation::Minus6ToMinus12,
        ..PerEyeFactors::default()
    };
    // Age and the left disc come in as raw chart values.
    let readings = ClinicalReadings {
        age_years: Some(64),
        cup_disc_ratio: EyePair::new(None, Some(0.6)),
        corneal_thickness: EyePair::both(Some(545.0)),
        ..ClinicalReadings::default()
    };

    TrbsRequest {
        baselines: EyePair::new(32.0, 24.0),
        shared: SharedFactors {
            family_history: Presence::Present,
            ..SharedFactors::default()
        },
        per_eye: EyePair::new(od, PerEyeFactors::default()),
        aggressive,
        readings,
    }
}

fn demo_measurements(as_of: DateTime<Utc>) -> MeasurementLog {
    let visits = [
        (120, Some(17.0), Some(18.0), 82.0, -7.1),
        (60, Some(16.0), Some(19.0), 80.5, -7.6),
        (7, Some(19.0), Some(18.0), 79.0, -8.4),
    ];

    let mut log = MeasurementLog::new();
    for (days_ago, od, os, rnfl, md) in visits {
        let mut measurement = Measurement::new(as_of - Duration::days(days_ago), od, os);
        measurement.rnfl = EyePair::new(Some(rnfl), Some(95.0));
        measurement.vf_md = EyePair::new(Some(md), Some(-1.2));
        measurement.device = Some("Goldmann".to_string());
        log.record(measurement);
    }
    log
}
