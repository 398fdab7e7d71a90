use crate::infra::{parse_instant, parse_risk_level, parse_severity, print_json, read_json};
use chrono::{DateTime, Utc};
use clap::Args;
use iop_target::assessment::{
    assess_patient, recommend_followup, DiseaseSeverity, PatientContext, RiskLevel,
};
use iop_target::config::AppConfig;
use iop_target::error::AppError;
use iop_target::monitoring::MeasurementLog;
use iop_target::targets::{
    compute_grade_based, compute_trbs, CalculationMode, GradeRequest, TrbsRequest,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct InputArgs {
    /// JSON request file, in the same shape the HTTP endpoint accepts
    #[arg(long)]
    pub(crate) input: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// JSON file with the targets in force, disease severity and adherence
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Measurement CSV export
    #[arg(long)]
    pub(crate) measurements: PathBuf,
    /// Assessment time (RFC 3339 or YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = parse_instant)]
    pub(crate) as_of: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
pub(crate) struct FollowUpArgs {
    /// Composite risk level (low, moderate, high)
    #[arg(long, value_parser = parse_risk_level)]
    pub(crate) level: RiskLevel,
    /// Disease severity (mild, moderate, severe)
    #[arg(long, value_parser = parse_severity, default_value = "moderate")]
    pub(crate) severity: DiseaseSeverity,
}

pub(crate) fn run_calculation(mode: CalculationMode, args: InputArgs) -> Result<(), AppError> {
    match mode {
        CalculationMode::Trbs => {
            let request: TrbsRequest = read_json(&args.input)?;
            print_json(&compute_trbs(&request))
        }
        CalculationMode::GradeBased => {
            let request: GradeRequest = read_json(&args.input)?;
            print_json(&compute_grade_based(&request))
        }
    }
}

pub(crate) fn run_assessment(args: AssessArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let context: PatientContext = read_json(&args.input)?;
    let log = MeasurementLog::from_csv_path(&args.measurements)?;
    let as_of = args.as_of.unwrap_or_else(Utc::now);

    let assessment = assess_patient(&context, &log, as_of, &config.assessment)?;
    print_json(&assessment)
}

pub(crate) fn run_followup(args: FollowUpArgs) -> Result<(), AppError> {
    let plan = recommend_followup(args.level, args.severity);
    println!(
        "{} risk, {} disease: return in {} days",
        args.level.label(),
        args.severity.label(),
        plan.days
    );
    for action in &plan.actions {
        println!("  - {action}");
    }
    Ok(())
}
