//! services/coach_cli/src/bin/coach.rs

use coach_cli_lib::{
    adapters::{wire::parse_workout_library, HttpCoachAdapter},
    config::Config,
    console,
    error::AppError,
};
use coach_core::{CoachSession, WorkoutOrder};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!(base_url = %config.api_base_url, "Configuration loaded. Starting coach client...");
    if config.auth_token.is_none() {
        warn!("COACH_AUTH_TOKEN is not set; messages to the coach will be rejected.");
    }

    // --- 2. Initialize the Backend Adapter & Session ---
    let backend = Arc::new(HttpCoachAdapter::new(
        &config.api_base_url,
        config.auth_token.clone(),
        config.request_timeout,
    ));
    let mut session = CoachSession::new(backend).with_health_window(config.health_window_days);

    // --- 3. Preload Data Files ---
    if let Some(path) = &config.workout_library {
        let json = std::fs::read_to_string(path)?;
        let workouts = parse_workout_library(&json).map_err(AppError::Library)?;
        info!(workouts = workouts.len(), "Workout library loaded from {}", path.display());
        session.set_available_workouts(workouts);
    }
    if let Some(path) = &config.health_csv {
        let report = console::load_health(&mut session, path)?;
        println!("{}", report);
    }
    if let Some(path) = &config.workout_csv {
        let report = console::load_workouts(&mut session, path, WorkoutOrder::Upload)?;
        println!("{}", report);
    }

    // --- 4. Check the Backend ---
    match session.check_connection().await {
        Ok(()) => info!("Coach backend is reachable."),
        Err(e) => warn!(error = %e, "Coach backend connection check failed."),
    }

    // --- 5. Run the Console ---
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    console::run(&mut session, stdin, &mut stdout).await?;

    Ok(())
}
