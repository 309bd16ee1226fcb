//! services/coach_cli/src/console/mod.rs
//!
//! The interactive console: reads commands line by line, drives the `CoachSession`
//! and prints the results. Failures of a single command are shown to the user and
//! never end the loop; only I/O errors on the console itself do.

pub mod commands;
pub mod render;

use crate::error::AppError;
use coach_core::{demo, CoachSession, PortError, TurnError};
use commands::{Command, TemplateKind, HELP};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

const PROMPT: &str = "> ";

/// Runs the console until `/quit` or the end of input.
pub async fn run<R, W>(session: &mut CoachSession, input: R, out: &mut W) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "AI Coach. Type /help for commands.")?;
    let mut lines = input.lines();

    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(command) = Command::parse(&line) else {
            continue;
        };
        if command == Command::Quit {
            break;
        }
        execute(session, command, out).await?;
    }

    writeln!(out)?;
    info!("Console closed.");
    Ok(())
}

/// Executes a single command against the session.
pub async fn execute<W: Write>(
    session: &mut CoachSession,
    command: Command,
    out: &mut W,
) -> Result<(), AppError> {
    match command {
        Command::Help => writeln!(out, "{}", HELP)?,
        Command::SetProfile(profile) => {
            let missing = profile.missing_fields();
            session.set_profile(profile);
            writeln!(out, "{}", render::profile(session.profile()))?;
            if !missing.is_empty() {
                writeln!(out, "Still missing: {}", missing.join(", "))?;
            }
        }
        Command::LoadHealth(path) => match load_health(session, &path) {
            Ok(report) => writeln!(out, "{}", report)?,
            Err(e) => writeln!(out, "{}", e)?,
        },
        Command::LoadWorkouts(path, order) => match load_workouts(session, &path, order) {
            Ok(report) => writeln!(out, "{}", report)?,
            Err(e) => writeln!(out, "{}", e)?,
        },
        Command::Template(kind, path) => {
            let template = match kind {
                TemplateKind::Health => demo::HEALTH_CSV_TEMPLATE,
                TemplateKind::Workout => demo::WORKOUT_CSV_TEMPLATE,
            };
            match path {
                Some(path) => match std::fs::write(&path, template) {
                    Ok(()) => writeln!(out, "Template written to {}", path.display())?,
                    Err(e) => writeln!(out, "{}", AppError::from(e))?,
                },
                None => write!(out, "{}", template)?,
            }
        }
        Command::Demo => {
            session.load_demo_data();
            writeln!(out, "Demo data loaded.")?;
            show(session, out)?;
        }
        Command::Show => show(session, out)?,
        Command::Tokens => writeln!(out, "{}", render::tokens(session.conversation()))?,
        Command::ConfirmClear => writeln!(
            out,
            "Are you sure you want to clear all messages? Type /clear confirm to proceed."
        )?,
        Command::Clear => {
            let result = session.clear_conversation().await;
            writeln!(out, "Conversation cleared.")?;
            if let Err(e) = result {
                writeln!(out, "The server copy could not be cleared: {}", render::port_error(&e))?;
            }
        }
        Command::Refresh => match session.refresh_conversation().await {
            Ok(()) => writeln!(out, "{}", render::transcript(session.conversation()))?,
            Err(e) => writeln!(out, "{}", render::port_error(&e))?,
        },
        Command::Status => match session.check_connection().await {
            Ok(()) => writeln!(out, "Coach backend is reachable.")?,
            Err(e) => writeln!(out, "{}", render::port_error(&e))?,
        },
        Command::Tool(message) => {
            writeln!(out, "Coach is thinking...")?;
            let result = session.send_tool_turn(&message).await;
            reply(result, out)?;
        }
        Command::Send(message) => {
            writeln!(out, "Coach is thinking...")?;
            let result = session.send_turn(&message).await;
            reply(result, out)?;
        }
        Command::Invalid(usage) => writeln!(out, "{}", usage)?,
        Command::Unknown(name) => writeln!(out, "Unknown command {}. Type /help.", name)?,
        Command::Quit => {}
    }
    Ok(())
}

fn reply<W: Write>(
    result: Result<&coach_core::Message, TurnError>,
    out: &mut W,
) -> Result<(), AppError> {
    match result {
        Ok(message) => writeln!(out, "{}", render::message(message))?,
        Err(e) => {
            if let TurnError::Port(PortError::Server { status, .. }) = &e {
                warn!(status, "Coach reply failed");
            }
            writeln!(out, "{}", render::turn_error(&e))?;
        }
    }
    Ok(())
}

fn show<W: Write>(session: &CoachSession, out: &mut W) -> Result<(), AppError> {
    writeln!(out, "{}", render::profile(session.profile()))?;
    writeln!(out, "{}", render::health_preview(session.health_data()))?;
    writeln!(out, "{}", render::workout_history(session.workout_history()))?;
    writeln!(out, "{}", render::library(session.available_workouts()))?;
    Ok(())
}

/// Loads a health CSV into the session and returns the upload report.
pub fn load_health(session: &mut CoachSession, path: &Path) -> Result<String, AppError> {
    let file = File::open(path)?;
    let errors = session.load_health_csv(file)?;
    Ok(render::upload_report(
        "day(s) of health data",
        session.health_data().len(),
        &errors,
    ))
}

/// Loads a workout history CSV into the session and returns the upload report.
pub fn load_workouts(
    session: &mut CoachSession,
    path: &Path,
    order: coach_core::WorkoutOrder,
) -> Result<String, AppError> {
    let file = File::open(path)?;
    let errors = session.load_workout_csv(file, order)?;
    Ok(render::upload_report(
        "workout session(s)",
        session.workout_history().len(),
        &errors,
    ))
}
