use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use placement_hub::config::AppConfig;
use placement_hub::error::AppError;
use placement_hub::platform::{
    availability, platform_router, seed_demo_data, EnrollmentError, EnrollmentService,
    MemoryStore, PlatformState, SeedReport,
};
use placement_hub::telemetry;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct InfraState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Placement Hub",
    about = "Run the placement platform service or a seeded enrollment demo",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Seed demo fixtures and print a candidate's enrollment walkthrough
    Demo,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
    /// Populate the in-memory store with demo fixtures on startup
    #[arg(long)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Demo => run_demo(),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let store = Arc::new(MemoryStore::default());
    if args.seed_demo {
        seed_demo_data(store.clone())?;
    }
    let platform = PlatformState::new(store);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let infra = InfraState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(infra)
        .merge(platform_router(platform))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "placement platform ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_demo() -> Result<(), AppError> {
    let store = Arc::new(MemoryStore::default());
    let report = seed_demo_data(store.clone())?;
    let enrollment = EnrollmentService::new(store.clone());

    println!("Placement platform demo");
    println!(
        "Seeded candidate {} at institution {}",
        report.candidate_id.0, report.institution_id.0
    );

    print_snapshot(store.as_ref(), &report);

    println!("\nEnrolling in the gated drive before completing prerequisites");
    match enrollment.enroll_in_drive(&report.candidate_id, &report.gated_drive_id) {
        Ok(receipt) => println!(
            "  Unexpectedly enrolled (already_enrolled={})",
            receipt.already_enrolled
        ),
        Err(EnrollmentError::PrerequisiteNotCompleted { missing }) => {
            println!("  Rejected: prerequisites not completed");
            for item in missing {
                println!("    - {} ({})", item.name, item.id.0);
            }
        }
        Err(err) => println!("  Enrollment unavailable: {err}"),
    }

    println!("\nEnrolling in an open activity and the open drive");
    match enrollment.enroll_in_activity(&report.candidate_id, &report.workshop_id, None) {
        Ok(row) => println!("  Activity {} -> {}", row.activity_id.0, row.status.label()),
        Err(err) => println!("  Activity enrollment unavailable: {err}"),
    }
    match enrollment.enroll_in_drive(&report.candidate_id, &report.open_drive_id) {
        Ok(receipt) => {
            println!(
                "  Drive {} -> {} ({} cascaded activity rows)",
                receipt.candidate_drive.drive_id.0,
                receipt.candidate_drive.status.label(),
                receipt.candidate_activities.len()
            );
            match serde_json::to_string_pretty(&receipt) {
                Ok(body) => println!("  Receipt payload:\n{body}"),
                Err(err) => println!("  Receipt payload unavailable: {err}"),
            }
        }
        Err(err) => println!("  Drive enrollment unavailable: {err}"),
    }

    println!("\nAvailability after enrollment");
    print_snapshot(store.as_ref(), &report);

    Ok(())
}

fn print_snapshot(store: &MemoryStore, report: &SeedReport) {
    match availability::activities_for_candidate(store, &report.candidate_id) {
        Ok(view) => {
            println!(
                "Activities: {} available, {} enrolled",
                view.available.len(),
                view.enrolled.len()
            );
            for listing in &view.available {
                println!("  - {} (price {})", listing.name, listing.base_price);
            }
        }
        Err(err) => println!("Activity snapshot unavailable: {err}"),
    }
    match availability::drives_for_candidate(store, &report.candidate_id) {
        Ok(view) => {
            println!(
                "Drives: {} available, {} enrolled",
                view.available.len(),
                view.enrolled.len()
            );
            for listing in &view.available {
                println!(
                    "  - {} ({} positions)",
                    listing.name, listing.available_positions
                );
            }
        }
        Err(err) => println!("Drive snapshot unavailable: {err}"),
    }
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<InfraState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<InfraState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
