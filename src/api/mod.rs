use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, ServerConfig};
use crate::core::{
    Evaluation, FilingStatus, Inputs, ScenarioResult, evaluate, format_currency,
    scan_default_returns,
};
use crate::error::{AppError, InputError};
use crate::telemetry;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliFilingStatus {
    Single,
    MarriedJoint,
    MarriedSeparate,
    HeadOfHousehold,
}

impl From<CliFilingStatus> for FilingStatus {
    fn from(value: CliFilingStatus) -> Self {
        match value {
            CliFilingStatus::Single => FilingStatus::Single,
            CliFilingStatus::MarriedJoint => FilingStatus::MarriedJoint,
            CliFilingStatus::MarriedSeparate => FilingStatus::MarriedSeparate,
            CliFilingStatus::HeadOfHousehold => FilingStatus::HeadOfHousehold,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiFilingStatus {
    Single,
    #[serde(alias = "marriedJoint", alias = "married_joint", alias = "mfj")]
    MarriedJoint,
    #[serde(alias = "marriedSeparate", alias = "married_separate", alias = "mfs")]
    MarriedSeparate,
    #[serde(alias = "headOfHousehold", alias = "head_of_household", alias = "hoh")]
    HeadOfHousehold,
}

impl From<ApiFilingStatus> for CliFilingStatus {
    fn from(value: ApiFilingStatus) -> Self {
        match value {
            ApiFilingStatus::Single => CliFilingStatus::Single,
            ApiFilingStatus::MarriedJoint => CliFilingStatus::MarriedJoint,
            ApiFilingStatus::MarriedSeparate => CliFilingStatus::MarriedSeparate,
            ApiFilingStatus::HeadOfHousehold => CliFilingStatus::HeadOfHousehold,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EvaluatePayload {
    net_worth: Option<f64>,
    salary: Option<f64>,
    salary_tax_rate: Option<f64>,
    invest_return: Option<f64>,
    invest_tax_rate: Option<f64>,
    spend: Option<f64>,
    side_income: Option<f64>,
    cash_on_hand: Option<f64>,
    state: Option<String>,
    filing: Option<ApiFilingStatus>,
    scan: Option<bool>,
}

#[derive(Parser, Debug)]
#[command(
    name = "coast-fire",
    about = "Coast FIRE readiness check (salary ratio, return coverage and cash buffer rules)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate one input snapshot and print the report
    Evaluate(EvaluateArgs),
    /// Serve the JSON API
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Override COAST_HOST
    #[arg(long)]
    host: Option<String>,
    /// Override COAST_PORT
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug, Clone)]
struct EvaluateArgs {
    #[arg(long, help = "Current net worth")]
    net_worth: f64,
    #[arg(long, help = "Gross annual salary")]
    salary: f64,
    #[arg(
        long,
        default_value_t = 25.0,
        help = "Flat effective tax rate on salary in percent"
    )]
    salary_tax_rate: f64,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Expected annual investment return in percent"
    )]
    invest_return: f64,
    #[arg(
        long,
        default_value_t = 15.0,
        help = "Flat effective tax rate on investment returns in percent"
    )]
    invest_tax_rate: f64,
    #[arg(long, help = "Annual spending")]
    spend: f64,
    #[arg(long, default_value_t = 0.0, help = "After-tax annual side income")]
    side_income: f64,
    #[arg(long, default_value_t = 0.0)]
    cash_on_hand: f64,
    #[arg(long, default_value = "CA", help = "State of residence (display only)")]
    state: String,
    #[arg(
        long,
        value_enum,
        default_value_t = CliFilingStatus::Single,
        help = "Tax filing status (display only)"
    )]
    filing: CliFilingStatus,
    #[arg(long, help = "Also print the return sensitivity table")]
    scan: bool,
}

#[derive(Debug)]
struct ApiRequest {
    inputs: Inputs,
    include_scan: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EvaluateResponse {
    state: String,
    filing: FilingStatus,
    evaluation: Evaluation,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenarios: Option<Vec<ScenarioResult>>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Evaluate(args) => {
            let include_scan = args.scan;
            let inputs = build_inputs(args)?;
            let evaluation = evaluate(&inputs);
            let scenarios = include_scan.then(|| scan_default_returns(&inputs, &evaluation));
            print!(
                "{}",
                render_report(&inputs, &evaluation, scenarios.as_deref())
            );
            Ok(())
        }
        Command::Serve(mut args) => {
            let mut config = AppConfig::load()?;
            if let Some(host) = args.host.take() {
                config.server.host = host;
            }
            if let Some(port) = args.port.take() {
                config.server.port = port;
            }
            telemetry::init(&config.telemetry)?;
            run_http_server(&config.server).await
        }
    }
}

fn build_inputs(args: EvaluateArgs) -> Result<Inputs, InputError> {
    for (flag, value) in [
        ("--net-worth", args.net_worth),
        ("--salary", args.salary),
        ("--spend", args.spend),
        ("--side-income", args.side_income),
        ("--cash-on-hand", args.cash_on_hand),
    ] {
        if !value.is_finite() {
            return Err(InputError::NotFinite { flag });
        }
        if value < 0.0 {
            return Err(InputError::Negative { flag });
        }
    }

    // Spend is a divisor in every coverage and buffer ratio.
    if args.spend <= 0.0 {
        return Err(InputError::NotPositive { flag: "--spend" });
    }

    for (flag, value) in [
        ("--salary-tax-rate", args.salary_tax_rate),
        ("--invest-return", args.invest_return),
        ("--invest-tax-rate", args.invest_tax_rate),
    ] {
        if !value.is_finite() {
            return Err(InputError::NotFinite { flag });
        }
        if !(0.0..=100.0).contains(&value) {
            return Err(InputError::PercentOutOfRange { flag });
        }
    }

    let state = args.state.trim().to_ascii_uppercase();
    if state.is_empty() {
        return Err(InputError::Empty { flag: "--state" });
    }

    Ok(Inputs {
        net_worth: args.net_worth,
        salary: args.salary,
        salary_tax_rate: args.salary_tax_rate / 100.0,
        invest_return: args.invest_return / 100.0,
        invest_tax_rate: args.invest_tax_rate / 100.0,
        spend: args.spend,
        side_income: args.side_income,
        cash_on_hand: args.cash_on_hand,
        state,
        filing: args.filing.into(),
    })
}

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/evaluate",
            get(evaluate_get_handler).post(evaluate_post_handler),
        )
        .fallback(not_found_handler)
}

pub async fn run_http_server(config: &ServerConfig) -> Result<(), AppError> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "coast FIRE API listening");

    axum::serve(listener, router()).await?;
    Ok(())
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, serde_json::json!({ "status": "ok" }))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn evaluate_get_handler(Query(payload): Query<EvaluatePayload>) -> Response {
    evaluate_handler_impl(payload)
}

async fn evaluate_post_handler(Json(payload): Json<EvaluatePayload>) -> Response {
    evaluate_handler_impl(payload)
}

fn evaluate_handler_impl(payload: EvaluatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(err) => {
            warn!(error = %err, "rejected evaluate payload");
            return error_response(StatusCode::BAD_REQUEST, &err.to_string());
        }
    };

    let response = build_evaluate_response(&request.inputs, request.include_scan);
    debug!(
        verdict = response.evaluation.verdict.label(),
        driver = response.evaluation.driver_label,
        "evaluated inputs"
    );
    json_response(StatusCode::OK, response)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
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
    let payload = serde_json::from_str::<EvaluatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload).map_err(|e| e.to_string())
}

fn api_request_from_payload(payload: EvaluatePayload) -> Result<ApiRequest, InputError> {
    let mut args = default_args_for_api();

    if let Some(v) = payload.net_worth {
        args.net_worth = v;
    }
    if let Some(v) = payload.salary {
        args.salary = v;
    }
    if let Some(v) = payload.salary_tax_rate {
        args.salary_tax_rate = v;
    }
    if let Some(v) = payload.invest_return {
        args.invest_return = v;
    }
    if let Some(v) = payload.invest_tax_rate {
        args.invest_tax_rate = v;
    }
    if let Some(v) = payload.spend {
        args.spend = v;
    }
    if let Some(v) = payload.side_income {
        args.side_income = v;
    }
    if let Some(v) = payload.cash_on_hand {
        args.cash_on_hand = v;
    }
    if let Some(v) = payload.state {
        args.state = v;
    }
    if let Some(v) = payload.filing {
        args.filing = v.into();
    }

    let include_scan = payload.scan.unwrap_or(true);
    let inputs = build_inputs(args)?;
    Ok(ApiRequest {
        inputs,
        include_scan,
    })
}

fn default_args_for_api() -> EvaluateArgs {
    EvaluateArgs {
        net_worth: 3_000_000.0,
        salary: 480_000.0,
        salary_tax_rate: 25.0,
        invest_return: 10.0,
        invest_tax_rate: 20.0,
        spend: 180_000.0,
        side_income: 0.0,
        cash_on_hand: 60_000.0,
        state: "CA".to_string(),
        filing: CliFilingStatus::Single,
        scan: true,
    }
}

fn build_evaluate_response(inputs: &Inputs, include_scan: bool) -> EvaluateResponse {
    let evaluation = evaluate(inputs);
    let scenarios = include_scan.then(|| scan_default_returns(inputs, &evaluation));
    EvaluateResponse {
        state: inputs.state.clone(),
        filing: inputs.filing,
        evaluation,
        scenarios,
    }
}

fn fmt_percent(fraction: f64) -> String {
    if fraction.is_finite() {
        format!("{:.1}%", fraction * 100.0)
    } else {
        "n/a".to_string()
    }
}

fn fmt_gap(gap: f64) -> String {
    if gap.is_finite() {
        format!("{:+.1}%", gap * 100.0)
    } else if gap.is_nan() {
        "n/a".to_string()
    } else if gap > 0.0 {
        "+inf".to_string()
    } else {
        "-inf".to_string()
    }
}

fn pass_label(pass: bool) -> &'static str {
    if pass { "PASS" } else { "FAIL" }
}

fn render_report(
    inputs: &Inputs,
    evaluation: &Evaluation,
    scenarios: Option<&[ScenarioResult]>,
) -> String {
    let rules = &evaluation.rules;
    let derived = &evaluation.derived;

    let mut lines = vec![
        format!(
            "Coast FIRE check ({}, {})",
            inputs.state,
            inputs.filing.label()
        ),
        format!("Verdict: {}", evaluation.verdict.label()),
        evaluation.subline.to_string(),
        format!("Top driver: {}", evaluation.driver_label),
        format!("Next step: {}", evaluation.next_step_message),
        String::new(),
        "Rules".to_string(),
        format!(
            "- Salary vs net worth: {} (after-tax salary is {} of net worth, limit 10.0%, gap {})",
            pass_label(rules.salary_ratio.pass),
            fmt_percent(derived.salary_vs_net_worth),
            fmt_gap(rules.salary_ratio.gap)
        ),
        format!(
            "- Coverage: {} (after-tax return {} + side income {} vs spend {}, gap {})",
            pass_label(rules.coverage.pass),
            format_currency(derived.after_tax_portfolio_return),
            format_currency(inputs.side_income),
            format_currency(inputs.spend),
            fmt_gap(rules.coverage.gap)
        ),
        format!(
            "- Cash buffer: {} (cash {} vs 6-month target {}, gap {})",
            pass_label(rules.cash_buffer.pass),
            format_currency(inputs.cash_on_hand),
            format_currency(derived.buffer_target),
            fmt_gap(rules.cash_buffer.gap)
        ),
    ];

    if let Some(rows) = scenarios {
        lines.push(String::new());
        lines.push("Return sensitivity".to_string());
        lines.extend(rows.iter().map(|row| {
            format!(
                "- {:>5}: after-tax return {}, coverage {:.2}x, {}",
                fmt_percent(row.rate),
                format_currency(row.after_tax_return),
                row.coverage,
                row.verdict.label()
            )
        }));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
