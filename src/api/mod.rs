use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::core::{HistoricalReturns, InvestorProfile, ProjectionSummary, run_projection};
use crate::data::load_history;

const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    annual_contribution: Option<f64>,
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    starting_balance: Option<f64>,
    stock_allocation: Option<f64>,
    simulations: Option<u32>,
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
#[command(
    name = "nestegg",
    about = "Monte Carlo portfolio growth estimator (resamples historical stock and bond years)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "Serve the projection API over HTTP")]
    Serve(ServeArgs),
    #[command(about = "Run a single projection and print the quartile outcomes")]
    Project(ProjectArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
    #[command(flatten)]
    pub history: HistoryArgs,
}

#[derive(Args, Debug)]
pub struct ProjectArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,
    #[arg(long, default_value_t = DEFAULT_SEED, help = "Seed for reproducible sampling")]
    pub seed: u64,
    #[arg(long, help = "Also print the year-by-year quartile trajectories")]
    pub trajectories: bool,
    #[command(flatten)]
    pub history: HistoryArgs,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    #[arg(
        long,
        help = "File with one fractional stock return per line, oldest year first"
    )]
    pub stock_history: PathBuf,
    #[arg(
        long,
        help = "File with one fractional bond return per line, oldest year first"
    )]
    pub bond_history: PathBuf,
    #[arg(
        long,
        default_value_t = 1928,
        help = "Calendar year of the first line in the history files"
    )]
    pub base_year: u32,
}

#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Amount contributed at the start of every simulated year"
    )]
    pub annual_contribution: f64,
    #[arg(long)]
    pub current_age: u32,
    #[arg(long)]
    pub retirement_age: u32,
    #[arg(long, default_value_t = 0.0)]
    pub starting_balance: f64,
    #[arg(
        long,
        default_value_t = 100.0,
        help = "Share of the portfolio held in stocks in percent, remainder in bonds"
    )]
    pub stock_allocation: f64,
    #[arg(long, default_value_t = 1_000, help = "Number of Monte Carlo runs")]
    pub simulations: u32,
}

fn build_profile(args: &ProfileArgs) -> Result<InvestorProfile, String> {
    if args.retirement_age <= args.current_age {
        return Err("--retirement-age must be greater than --current-age".to_string());
    }
    if args.simulations == 0 {
        return Err("--simulations must be > 0".to_string());
    }
    if !args.annual_contribution.is_finite() || args.annual_contribution < 0.0 {
        return Err("--annual-contribution must be >= 0".to_string());
    }
    if !args.starting_balance.is_finite() || args.starting_balance < 0.0 {
        return Err("--starting-balance must be >= 0".to_string());
    }
    if !args.stock_allocation.is_finite() || !(0.0..=100.0).contains(&args.stock_allocation) {
        return Err("--stock-allocation must be between 0 and 100".to_string());
    }

    Ok(InvestorProfile {
        annual_contribution: args.annual_contribution,
        current_age: args.current_age,
        retirement_age: args.retirement_age,
        starting_balance: args.starting_balance,
        stock_allocation: args.stock_allocation / 100.0,
        simulations: args.simulations,
    })
}

#[derive(Debug)]
struct ProjectionRequest {
    profile: InvestorProfile,
    seed: u64,
}

// API-specific defaults for omitted payload fields; each provided field
// overrides its default one by one.
fn default_profile_args() -> ProfileArgs {
    ProfileArgs {
        annual_contribution: 10_000.0,
        current_age: 30,
        retirement_age: 65,
        starting_balance: 25_000.0,
        stock_allocation: 70.0,
        simulations: 1_000,
    }
}

#[cfg(test)]
fn projection_request_from_json(json: &str) -> Result<ProjectionRequest, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    projection_request_from_payload(payload)
}

fn projection_request_from_payload(payload: ProjectPayload) -> Result<ProjectionRequest, String> {
    let mut args = default_profile_args();
    let mut seed = DEFAULT_SEED;

    if let Some(v) = payload.annual_contribution {
        args.annual_contribution = v;
    }
    if let Some(v) = payload.current_age {
        args.current_age = v;
    }
    if let Some(v) = payload.retirement_age {
        args.retirement_age = v;
    }
    if let Some(v) = payload.starting_balance {
        args.starting_balance = v;
    }
    if let Some(v) = payload.stock_allocation {
        args.stock_allocation = v;
    }
    if let Some(v) = payload.simulations {
        args.simulations = v;
    }
    if let Some(v) = payload.seed {
        seed = v;
    }

    let profile = build_profile(&args)?;
    Ok(ProjectionRequest { profile, seed })
}

#[derive(Clone)]
struct ApiState {
    history: Arc<HistoricalReturns>,
}

pub async fn run_serve_command(args: &ServeArgs) -> Result<(), String> {
    let history = load_history(
        &args.history.stock_history,
        &args.history.bond_history,
        args.history.base_year,
    )
    .map_err(|e| e.to_string())?;

    run_http_server(args.port, history)
        .await
        .map_err(|e| format!("server error: {e}"))
}

pub async fn run_http_server(port: u16, history: HistoricalReturns) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let state = ApiState {
        history: Arc::new(history),
    };
    let app = Router::new()
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route("/api/history", get(history_handler))
        .fallback(not_found_handler)
        .with_state(state);

    let listener = TcpListener::bind(addr).await?;
    println!("nestegg HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/api/history");
    axum::serve(listener, app).await
}

async fn project_get_handler(
    State(state): State<ApiState>,
    Query(payload): Query<ProjectPayload>,
) -> Response {
    project_handler_impl(state, payload).await
}

async fn project_post_handler(
    State(state): State<ApiState>,
    Json(payload): Json<ProjectPayload>,
) -> Response {
    project_handler_impl(state, payload).await
}

async fn project_handler_impl(state: ApiState, payload: ProjectPayload) -> Response {
    let request = match projection_request_from_payload(payload) {
        Ok(request) => request,
        Err(message) => {
            warn!("rejected projection request: {message}");
            return error_response(StatusCode::BAD_REQUEST, &message);
        }
    };

    info!(
        "projection request: {} runs over {} years",
        request.profile.simulations,
        request.profile.horizon_years()
    );

    match run_projection(&request.profile, &state.history, request.seed) {
        Ok(summary) => json_response(StatusCode::OK, summary),
        Err(e) => {
            warn!("projection failed: {e}");
            error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryResponse {
    min_year: u32,
    max_year: u32,
    years: u32,
}

async fn history_handler(State(state): State<ApiState>) -> Response {
    let response = HistoryResponse {
        min_year: state.history.min_year(),
        max_year: state.history.max_year(),
        years: state.history.years(),
    };
    json_response(StatusCode::OK, response)
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, message: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: message.to_string(),
        },
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

pub fn run_project_command(args: &ProjectArgs) -> Result<(), String> {
    let history = load_history(
        &args.history.stock_history,
        &args.history.bond_history,
        args.history.base_year,
    )
    .map_err(|e| e.to_string())?;

    let profile = build_profile(&args.profile)?;
    let summary = run_projection(&profile, &history, args.seed).map_err(|e| e.to_string())?;

    println!("{}", format_quartile_line(&summary));
    if args.trajectories {
        print_trajectories(&profile, &summary);
    }
    Ok(())
}

fn format_quartile_line(summary: &ProjectionSummary) -> String {
    format!(
        "Bottom Quartile: {} * Middle Quartile: {} * Upper Quartile: {}",
        format_thousands(summary.lower_quartile.display_balance),
        format_thousands(summary.middle_quartile.display_balance),
        format_thousands(summary.upper_quartile.display_balance)
    )
}

fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    let lead = digits.len() % 3;
    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (position + 3 - lead) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn print_trajectories(profile: &InvestorProfile, summary: &ProjectionSummary) {
    println!();
    println!(
        "{:>4} {:>16} {:>16} {:>16}",
        "Age", "Bottom", "Middle", "Upper"
    );
    let rows = summary
        .lower_quartile
        .trajectory
        .iter()
        .zip(summary.middle_quartile.trajectory.iter())
        .zip(summary.upper_quartile.trajectory.iter());
    for (offset, ((lower, middle), upper)) in rows.enumerate() {
        println!(
            "{:>4} {:>16.2} {:>16.2} {:>16.2}",
            profile.current_age + offset as u32 + 1,
            lower,
            middle,
            upper
        );
    }
}
