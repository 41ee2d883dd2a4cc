use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, error::ErrorKind};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    DEFAULT_TUITION_LEVELS, Inputs, MarginTier, ModelRecord, ModelResult, RuleTables, Staffing,
    SweepPoint, SweepResult, ViableEnrollment, rule_tables, run_enrollment_sweep, run_model,
};

const MIN_STUDENTS: u32 = 10;
const MAX_STUDENTS: u32 = 500;
const MAX_LEASE_ALLOCATION: u32 = 100;
const MAX_TUITION_LEVELS: usize = 8;

// Validation messages name inputs the way the caller spelled them.
#[derive(Copy, Clone, Debug)]
struct InputNames {
    students: &'static str,
    lease_allocation: &'static str,
    tuition: &'static str,
    sweep_min: &'static str,
    sweep_max: &'static str,
    sweep_step: &'static str,
}

const CLI_NAMES: InputNames = InputNames {
    students: "--students",
    lease_allocation: "--lease-allocation",
    tuition: "--tuition",
    sweep_min: "--sweep-min",
    sweep_max: "--sweep-max",
    sweep_step: "--sweep-step",
};

const API_NAMES: InputNames = InputNames {
    students: "studentCount",
    lease_allocation: "leaseAllocationPercent",
    tuition: "tuitionLevels",
    sweep_min: "sweepMin",
    sweep_max: "sweepMax",
    sweep_step: "sweepStep",
};

#[derive(Parser, Debug)]
#[command(
    name = "facility-budget",
    about = "School facility budget estimator (lease + other facilities + capex under a target margin)"
)]
struct Cli {
    #[arg(long, default_value_t = 150, help = "Enrolled students (10-500)")]
    students: u32,
    #[arg(
        long,
        default_value_t = 70,
        help = "Share of the facility budget for lease + other facilities in percent; the rest goes to capex"
    )]
    lease_allocation: u32,
    #[arg(
        long = "tuition",
        value_delimiter = ',',
        help = "Annual tuition level; repeat or comma-separate. Defaults to 40000,50000,65000"
    )]
    tuition_levels: Vec<f64>,
    #[arg(long, help = "Lowest enrollment in a sweep; enables sweep output")]
    sweep_min: Option<u32>,
    #[arg(long, help = "Highest enrollment in a sweep; enables sweep output")]
    sweep_max: Option<u32>,
    #[arg(long, default_value_t = 10, help = "Enrollment step between sweep points")]
    sweep_step: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum ApiTuitionLevels {
    List(Vec<f64>),
    Csv(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ModelPayload {
    #[serde(alias = "students")]
    student_count: Option<u32>,
    #[serde(alias = "leaseAllocation")]
    lease_allocation_percent: Option<u32>,
    #[serde(alias = "tuition")]
    tuition_levels: Option<ApiTuitionLevels>,
    sweep_min: Option<u32>,
    sweep_max: Option<u32>,
    sweep_step: Option<u32>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct SweepOptions {
    min_students: u32,
    max_students: u32,
    step: u32,
}

#[derive(Debug)]
struct ApiRequest {
    inputs: Inputs,
    sweep: Option<SweepOptions>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EvaluateResponse {
    student_count: u32,
    lease_allocation_percent: u32,
    tuition_levels: Vec<f64>,
    margin_tier: MarginTier,
    target_margin: f64,
    lease_term_years: u32,
    staffing: Staffing,
    models: Vec<ModelRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SweepResponse {
    lease_allocation_percent: u32,
    tuition_levels: Vec<f64>,
    sweep_min: u32,
    sweep_max: u32,
    sweep_step: u32,
    points: Vec<SweepPoint>,
    viable_enrollment: Vec<ViableEnrollment>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn run_cli<I, T>(args: I) -> Result<String, String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return Ok(e.to_string());
        }
        Err(e) => return Err(e.to_string()),
    };
    let request = api_request_from_cli(cli, CLI_NAMES)?;
    let inputs = &request.inputs;
    let json = match request.sweep {
        Some(sweep) => {
            let result = run_enrollment_sweep(
                inputs.lease_allocation_percent,
                &inputs.tuition_levels,
                sweep.min_students,
                sweep.max_students,
                sweep.step,
            );
            serde_json::to_string_pretty(&build_sweep_response(inputs, sweep, result))
        }
        None => serde_json::to_string_pretty(&build_evaluate_response(inputs, run_model(inputs))),
    };
    json.map_err(|e| format!("Failed to serialize response: {e}"))
}

fn build_inputs(cli: &Cli, names: InputNames) -> Result<Inputs, String> {
    if !(MIN_STUDENTS..=MAX_STUDENTS).contains(&cli.students) {
        return Err(format!(
            "{} must be between {MIN_STUDENTS} and {MAX_STUDENTS}",
            names.students
        ));
    }

    if cli.lease_allocation > MAX_LEASE_ALLOCATION {
        return Err(format!(
            "{} must be between 0 and {MAX_LEASE_ALLOCATION}",
            names.lease_allocation
        ));
    }

    if cli.tuition_levels.len() > MAX_TUITION_LEVELS {
        return Err(format!(
            "{} accepts at most {MAX_TUITION_LEVELS} values",
            names.tuition
        ));
    }

    if cli
        .tuition_levels
        .iter()
        .any(|tuition| !tuition.is_finite() || *tuition <= 0.0)
    {
        return Err(format!("{} values must be > 0", names.tuition));
    }

    let tuition_levels = if cli.tuition_levels.is_empty() {
        DEFAULT_TUITION_LEVELS.to_vec()
    } else {
        cli.tuition_levels.clone()
    };

    Ok(Inputs {
        student_count: cli.students,
        lease_allocation_percent: cli.lease_allocation,
        tuition_levels,
    })
}

fn build_sweep_options(cli: &Cli, names: InputNames) -> Result<Option<SweepOptions>, String> {
    if cli.sweep_min.is_none() && cli.sweep_max.is_none() {
        return Ok(None);
    }

    let min_students = cli.sweep_min.unwrap_or(MIN_STUDENTS);
    let max_students = cli.sweep_max.unwrap_or(MAX_STUDENTS);

    for (name, value) in [
        (names.sweep_min, min_students),
        (names.sweep_max, max_students),
    ] {
        if !(MIN_STUDENTS..=MAX_STUDENTS).contains(&value) {
            return Err(format!(
                "{name} must be between {MIN_STUDENTS} and {MAX_STUDENTS}"
            ));
        }
    }

    if min_students > max_students {
        return Err(format!(
            "{} cannot exceed {}",
            names.sweep_min, names.sweep_max
        ));
    }

    if cli.sweep_step == 0 {
        return Err(format!("{} must be > 0", names.sweep_step));
    }

    Ok(Some(SweepOptions {
        min_students,
        max_students,
        step: cli.sweep_step,
    }))
}

fn api_request_from_cli(cli: Cli, names: InputNames) -> Result<ApiRequest, String> {
    let inputs = build_inputs(&cli, names)?;
    let sweep = build_sweep_options(&cli, names)?;
    Ok(ApiRequest { inputs, sweep })
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/evaluate",
            get(evaluate_get_handler).post(evaluate_post_handler),
        )
        .route("/api/rules", get(rules_handler))
        .route("/api/sweep", get(sweep_get_handler).post(sweep_post_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    log::info!("Facility budget HTTP API listening on http://{addr}");
    log::info!("Local access: http://127.0.0.1:{port}/api/evaluate");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn rules_handler() -> Response {
    let rules: RuleTables = rule_tables();
    json_response(StatusCode::OK, rules)
}

async fn evaluate_get_handler(
    payload: Result<Query<ModelPayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => evaluate_handler_impl(payload).await,
        Err(rejection) => bad_request(&rejection.body_text()),
    }
}

async fn evaluate_post_handler(payload: Result<Json<ModelPayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => evaluate_handler_impl(payload).await,
        Err(rejection) => bad_request(&rejection.body_text()),
    }
}

async fn sweep_get_handler(payload: Result<Query<ModelPayload>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => sweep_handler_impl(payload).await,
        Err(rejection) => bad_request(&rejection.body_text()),
    }
}

async fn sweep_post_handler(payload: Result<Json<ModelPayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => sweep_handler_impl(payload).await,
        Err(rejection) => bad_request(&rejection.body_text()),
    }
}

async fn evaluate_handler_impl(payload: ModelPayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return bad_request(&msg),
    };

    let inputs = &request.inputs;
    log::debug!(
        "evaluate students={} lease_allocation={} tuition_levels={}",
        inputs.student_count,
        inputs.lease_allocation_percent,
        inputs.tuition_levels.len()
    );
    let model = run_model(inputs);
    json_response(StatusCode::OK, build_evaluate_response(inputs, model))
}

async fn sweep_handler_impl(payload: ModelPayload) -> Response {
    let mut request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return bad_request(&msg),
    };

    let sweep = request.sweep.take().unwrap_or(SweepOptions {
        min_students: MIN_STUDENTS,
        max_students: MAX_STUDENTS,
        step: 10,
    });
    let inputs = &request.inputs;
    log::debug!(
        "sweep students={}..={} step={} lease_allocation={}",
        sweep.min_students,
        sweep.max_students,
        sweep.step,
        inputs.lease_allocation_percent
    );
    let result = run_enrollment_sweep(
        inputs.lease_allocation_percent,
        &inputs.tuition_levels,
        sweep.min_students,
        sweep.max_students,
        sweep.step,
    );
    json_response(StatusCode::OK, build_sweep_response(inputs, sweep, result))
}

fn bad_request(msg: &str) -> Response {
    log::warn!("rejected request: {msg}");
    error_response(StatusCode::BAD_REQUEST, msg)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<ModelPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: ModelPayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.student_count {
        cli.students = v;
    }
    if let Some(v) = payload.lease_allocation_percent {
        cli.lease_allocation = v;
    }
    if let Some(v) = payload.tuition_levels {
        cli.tuition_levels = parse_tuition_levels(v)?;
        if cli.tuition_levels.is_empty() {
            return Err("tuitionLevels must not be empty".to_string());
        }
    }
    if let Some(v) = payload.sweep_min {
        cli.sweep_min = Some(v);
    }
    if let Some(v) = payload.sweep_max {
        cli.sweep_max = Some(v);
    }
    if let Some(v) = payload.sweep_step {
        cli.sweep_step = v;
    }

    api_request_from_cli(cli, API_NAMES)
}

fn parse_tuition_levels(levels: ApiTuitionLevels) -> Result<Vec<f64>, String> {
    match levels {
        ApiTuitionLevels::List(values) => Ok(values),
        ApiTuitionLevels::Csv(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<f64>()
                    .map_err(|_| format!("tuitionLevels contains a non-numeric value: {part}"))
            })
            .collect(),
    }
}

fn default_cli_for_api() -> Cli {
    Cli {
        students: 150,
        lease_allocation: 70,
        tuition_levels: DEFAULT_TUITION_LEVELS.to_vec(),
        sweep_min: None,
        sweep_max: None,
        sweep_step: 10,
    }
}

fn build_evaluate_response(inputs: &Inputs, model: ModelResult) -> EvaluateResponse {
    EvaluateResponse {
        student_count: inputs.student_count,
        lease_allocation_percent: inputs.lease_allocation_percent,
        tuition_levels: inputs.tuition_levels.clone(),
        margin_tier: model.margin_tier,
        target_margin: model.margin_tier.rate(),
        lease_term_years: model.lease_term_years,
        staffing: model.staffing,
        models: model.records,
    }
}

fn build_sweep_response(
    inputs: &Inputs,
    sweep: SweepOptions,
    result: SweepResult,
) -> SweepResponse {
    SweepResponse {
        lease_allocation_percent: inputs.lease_allocation_percent,
        tuition_levels: inputs.tuition_levels.clone(),
        sweep_min: sweep.min_students,
        sweep_max: sweep.max_students,
        sweep_step: sweep.step,
        points: result.points,
        viable_enrollment: result.viable_enrollment,
    }
}
