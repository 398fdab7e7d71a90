//! Stateless JSON endpoints over the engine. Nothing is persisted: callers send the
//! inputs (and, for record changes, the history) with every request.

use axum::{extract::State, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assessment::{
    assess_patient, compute_composite_risk, recommend_followup, risk_trend, Assessment,
    CompositeInput, CompositeRisk, DiseaseSeverity, FollowUpPlan, PatientContext, RiskLevel,
    RiskSnapshot, RiskTrend,
};
use crate::config::AssessmentConfig;
use crate::error::AppError;
use crate::eye::EyePair;
use crate::monitoring::{
    assess_progression, evaluate_pressure_status, measurement_validity, resolve_baseline,
    BaselineIop, Measurement, MeasurementLog, MeasurementValidity, PressureEvaluation,
    ProgressionAssessment, ProgressionKind,
};
use crate::risk::{lenient, ClinicalReadings, PerEyeFactors, SharedFactors};
use crate::targets::{
    compute_grade_based, compute_trbs, BilateralTargets, CalculationOutcome, CalculationRequest,
    GradeOutcome, GradeRequest, TargetHistory, TargetProposal, TrbsRequest,
};

pub fn engine_router(config: AssessmentConfig) -> Router {
    Router::new()
        .route("/api/v1/targets/trbs", post(trbs_handler))
        .route("/api/v1/targets/grade", post(grade_handler))
        .route("/api/v1/targets/calculate", post(calculate_handler))
        .route("/api/v1/targets/supersede", post(supersede_handler))
        .route("/api/v1/pressure/evaluate", post(pressure_handler))
        .route("/api/v1/progression/assess", post(progression_handler))
        .route("/api/v1/risk/composite", post(composite_handler))
        .route("/api/v1/followup", post(followup_handler))
        .route("/api/v1/assessments", post(assessment_handler))
        .route("/api/v1/measurements/validity", post(validity_handler))
        .route("/api/v1/measurements/baseline", post(baseline_handler))
        .route("/api/v1/risk/trend", post(trend_handler))
        .route("/api/v1/risk/brackets", post(brackets_handler))
        .with_state(config)
}

#[derive(Debug, Deserialize)]
pub(crate) struct PressureRequest {
    pub(crate) measured: f64,
    pub(crate) target: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProgressionRequest {
    pub(crate) current: f64,
    /// Prior values, newest first.
    #[serde(default)]
    pub(crate) history: Vec<f64>,
    #[serde(default)]
    pub(crate) months_between: Option<u32>,
    pub(crate) kind: ProgressionKind,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FollowUpRequest {
    pub(crate) level: RiskLevel,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) disease_severity: DiseaseSeverity,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SupersedeRequest {
    #[serde(default)]
    pub(crate) history: TargetHistory,
    pub(crate) proposal: TargetProposal,
    pub(crate) at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SupersedeResponse {
    pub(crate) version: u32,
    pub(crate) history: TargetHistory,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssessmentRequest {
    #[serde(flatten)]
    pub(crate) context: PatientContext,
    pub(crate) measurements: Vec<Measurement>,
    #[serde(default)]
    pub(crate) as_of: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ValidityRequest {
    #[serde(default)]
    pub(crate) measurements: Vec<Measurement>,
    #[serde(default)]
    pub(crate) as_of: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BaselineRequest {
    /// Baselines stored on the patient record.
    #[serde(default)]
    pub(crate) stored: EyePair<Option<f64>>,
    #[serde(default)]
    pub(crate) measurements: Vec<Measurement>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrendRequest {
    #[serde(default)]
    pub(crate) history: Vec<RiskSnapshot>,
    #[serde(default)]
    pub(crate) as_of: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BracketRequest {
    pub(crate) readings: ClinicalReadings,
    #[serde(default)]
    pub(crate) shared: SharedFactors,
    #[serde(default)]
    pub(crate) per_eye: EyePair<PerEyeFactors>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BracketResponse {
    pub(crate) shared: SharedFactors,
    pub(crate) per_eye: EyePair<PerEyeFactors>,
}

pub(crate) async fn trbs_handler(Json(request): Json<TrbsRequest>) -> Json<BilateralTargets> {
    Json(compute_trbs(&request))
}

pub(crate) async fn grade_handler(Json(request): Json<GradeRequest>) -> Json<GradeOutcome> {
    Json(compute_grade_based(&request))
}

pub(crate) async fn calculate_handler(
    Json(request): Json<CalculationRequest>,
) -> Json<CalculationOutcome> {
    Json(request.calculate())
}

pub(crate) async fn supersede_handler(
    Json(request): Json<SupersedeRequest>,
) -> Result<Json<SupersedeResponse>, AppError> {
    let SupersedeRequest {
        mut history,
        proposal,
        at,
    } = request;
    let version = history.supersede(proposal, at)?.version;
    Ok(Json(SupersedeResponse { version, history }))
}

pub(crate) async fn pressure_handler(
    Json(request): Json<PressureRequest>,
) -> Json<PressureEvaluation> {
    Json(evaluate_pressure_status(request.measured, request.target))
}

pub(crate) async fn progression_handler(
    State(config): State<AssessmentConfig>,
    Json(request): Json<ProgressionRequest>,
) -> Json<ProgressionAssessment> {
    let months = request
        .months_between
        .unwrap_or(config.months_between_visits);
    Json(assess_progression(
        request.current,
        &request.history,
        months,
        request.kind,
    ))
}

pub(crate) async fn composite_handler(Json(input): Json<CompositeInput>) -> Json<CompositeRisk> {
    Json(compute_composite_risk(&input))
}

pub(crate) async fn followup_handler(Json(request): Json<FollowUpRequest>) -> Json<FollowUpPlan> {
    Json(recommend_followup(request.level, request.disease_severity))
}

pub(crate) async fn assessment_handler(
    State(config): State<AssessmentConfig>,
    Json(request): Json<AssessmentRequest>,
) -> Result<Json<Assessment>, AppError> {
    let as_of = request.as_of.unwrap_or_else(Utc::now);
    let log = MeasurementLog::from(request.measurements);
    let assessment = assess_patient(&request.context, &log, as_of, &config)?;
    Ok(Json(assessment))
}

pub(crate) async fn validity_handler(
    Json(request): Json<ValidityRequest>,
) -> Json<MeasurementValidity> {
    let as_of = request.as_of.unwrap_or_else(Utc::now);
    let log = MeasurementLog::from(request.measurements);
    Json(measurement_validity(&log, as_of))
}

pub(crate) async fn baseline_handler(Json(request): Json<BaselineRequest>) -> Json<BaselineIop> {
    let log = MeasurementLog::from(request.measurements);
    Json(resolve_baseline(&request.stored, &log))
}

pub(crate) async fn trend_handler(Json(request): Json<TrendRequest>) -> Json<RiskTrend> {
    let as_of = request.as_of.unwrap_or_else(Utc::now);
    Json(risk_trend(&request.history, as_of))
}

pub(crate) async fn brackets_handler(Json(request): Json<BracketRequest>) -> Json<BracketResponse> {
    let BracketRequest {
        readings,
        mut shared,
        mut per_eye,
    } = request;
    readings.apply(&mut shared, &mut per_eye);
    Json(BracketResponse { shared, per_eye })
}
