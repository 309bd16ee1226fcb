//! services/coach_cli/src/console/render.rs
//!
//! Plain-text rendering of session state for the console.

use coach_core::{
    AvailableWorkout, BmiBand, Conversation, HealthRecord, Message, PortError, Profile, Role,
    RowError, TurnError, WorkoutHistoryEntry,
};
use std::fmt::Write;

const PREVIEW_DAYS: usize = 7;
const MAX_REPORTED_ROW_ERRORS: usize = 10;

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn message(message: &Message) -> String {
    match message.role {
        Role::User => format!("You: {}", message.content),
        Role::Assistant => {
            let mut out = format!("Coach: {}", message.content);
            if let Some(usage) = message.usage {
                let _ = write!(
                    out,
                    "\n  [tokens: {} in / {} out]",
                    usage.input_tokens, usage.output_tokens
                );
            }
            out
        }
    }
}

pub fn transcript(conversation: &Conversation) -> String {
    if conversation.is_empty() {
        return "No messages yet.".to_string();
    }
    conversation
        .messages()
        .iter()
        .map(message)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn tokens(conversation: &Conversation) -> String {
    let totals = conversation.token_totals();
    format!(
        "Tokens this conversation: {} input, {} output, {} total",
        totals.input_tokens,
        totals.output_tokens,
        totals.total()
    )
}

pub fn profile(profile: Option<&Profile>) -> String {
    let Some(p) = profile else {
        return "Profile: not set (use /profile)".to_string();
    };
    let mut out = format!(
        "Profile: {}, {} years, {}, {} cm, {} kg",
        p.name.as_deref().unwrap_or("(no name)"),
        p.age,
        p.gender,
        p.height,
        p.weight
    );
    if let (Some(bmi), Some(band)) = (p.bmi(), p.bmi_band()) {
        let band = match band {
            BmiBand::Normal => "normal",
            BmiBand::Overweight => "overweight",
            BmiBand::Obese => "obese",
        };
        let _ = write!(out, " (BMI {:.1}, {})", bmi, band);
    }
    out
}

/// Shows the latest days of health data; records are already most recent first.
pub fn health_preview(records: &[HealthRecord]) -> String {
    if records.is_empty() {
        return "Health data: none loaded".to_string();
    }
    let mut out = format!("Health data: {} day(s)", records.len());
    let _ = write!(out, "\n  {:<10}  {:>7}  {:>5}  {:>4}", "date", "steps", "sleep", "hr");
    for r in records.iter().take(PREVIEW_DAYS) {
        let _ = write!(
            out,
            "\n  {:<10}  {:>7}  {:>5}  {:>4}",
            r.date.format("%Y-%m-%d").to_string(),
            or_dash(r.steps),
            or_dash(r.sleep_duration),
            or_dash(r.heart_rate)
        );
    }
    out
}

pub fn workout_history(entries: &[WorkoutHistoryEntry]) -> String {
    if entries.is_empty() {
        return "Workout history: none loaded".to_string();
    }
    let mut out = format!("Workout history: {} session(s)", entries.len());
    for e in entries.iter().take(PREVIEW_DAYS) {
        let _ = write!(
            out,
            "\n  {}  {} ({}, {} min){}",
            e.date.format("%Y-%m-%d"),
            e.workout_name,
            e.category,
            e.duration_minutes,
            if e.completed { "" } else { " - skipped" }
        );
    }
    out
}

/// Lists library workouts grouped by category, in the order categories first appear.
pub fn library(workouts: &[AvailableWorkout]) -> String {
    let mut out = format!("Workout library: {} workout(s)", workouts.len());
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for w in workouts {
        match groups.iter_mut().find(|(category, _)| *category == w.category.as_str()) {
            Some((_, names)) => names.push(w.name.as_str()),
            None => groups.push((w.category.as_str(), vec![w.name.as_str()])),
        }
    }
    for (category, names) in groups {
        let _ = write!(out, "\n  {}: {}", category, names.join(", "));
    }
    out
}

/// Summarizes a finished upload: how many rows made it and why others did not.
pub fn upload_report(kind: &str, loaded: usize, errors: &[RowError]) -> String {
    let mut out = format!("Loaded {} {}", loaded, kind);
    if errors.is_empty() {
        return out;
    }
    let _ = write!(out, "; {} row(s) rejected:", errors.len());
    for e in errors.iter().take(MAX_REPORTED_ROW_ERRORS) {
        let _ = write!(out, "\n  {}", e);
    }
    if errors.len() > MAX_REPORTED_ROW_ERRORS {
        let _ = write!(out, "\n  ... and {} more", errors.len() - MAX_REPORTED_ROW_ERRORS);
    }
    out
}

pub fn port_error(e: &PortError) -> String {
    match e {
        PortError::Unauthorized => {
            "Not signed in: set COACH_AUTH_TOKEN to a valid token and restart.".to_string()
        }
        PortError::Unreachable(_) => {
            "Cannot reach the coach backend. Check COACH_API_BASE_URL and that the server is running."
                .to_string()
        }
        PortError::Timeout => "The coach took too long to answer. Please try again.".to_string(),
        PortError::Server { status, body } if body.trim().is_empty() => {
            format!("The coach backend failed (HTTP {}).", status)
        }
        PortError::Server { status, body } => {
            format!("The coach backend failed (HTTP {}): {}", status, body.trim())
        }
        PortError::InvalidResponse(detail) => {
            format!("The coach backend sent a response that could not be read: {}", detail)
        }
    }
}

pub fn turn_error(e: &TurnError) -> String {
    match e {
        TurnError::Port(port) => port_error(port),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use coach_core::{demo, Gender, TokenUsage};

    #[test]
    fn assistant_messages_show_token_counts() {
        let reply = Message::assistant(
            "Try a light jog.",
            TokenUsage {
                input_tokens: 812,
                output_tokens: 64,
            },
        );
        assert_eq!(
            message(&reply),
            "Coach: Try a light jog.\n  [tokens: 812 in / 64 out]"
        );
        assert_eq!(message(&Message::user("hi")), "You: hi");
    }

    #[test]
    fn profile_includes_bmi_band() {
        let p = Profile {
            name: None,
            age: 40,
            gender: Gender::Male,
            height: 180.0,
            weight: 90.0,
        };
        let text = profile(Some(&p));
        assert!(text.contains("(no name)"));
        assert!(text.contains("BMI 27.8, overweight"));
        assert!(profile(None).contains("not set"));
    }

    #[test]
    fn health_preview_dashes_missing_metrics() {
        let mut record = HealthRecord::new(NaiveDate::from_ymd_opt(2026, 2, 7).unwrap());
        record.steps = Some(9800);
        let text = health_preview(&[record]);
        assert!(text.contains("2026-02-07"));
        assert!(text.contains("9800"));
        assert!(text.contains('-'));
    }

    #[test]
    fn library_groups_by_category() {
        let mut workouts = demo::demo_available_workouts();
        workouts[4].category = "balance".to_string();
        let text = library(&workouts);
        assert!(text.contains("strength: Full Body Strength, Upper Body Focus"));
        assert!(text.contains("cardio: Cardio Blast, HIIT Training"));
        assert!(text.ends_with("balance: Yoga & Flexibility"));
    }

    #[test]
    fn upload_report_caps_listed_errors() {
        let errors: Vec<RowError> = (1..=12)
            .map(|row| RowError {
                row,
                column: "date",
                reason: "bad date".to_string(),
            })
            .collect();
        let text = upload_report("day(s) of health data", 3, &errors);
        assert!(text.starts_with("Loaded 3 day(s) of health data; 12 row(s) rejected:"));
        assert!(text.contains("row 10, column 'date'"));
        assert!(!text.contains("row 11,"));
        assert!(text.ends_with("... and 2 more"));
    }

    #[test]
    fn port_errors_read_as_guidance() {
        assert!(turn_error(&TurnError::Port(PortError::Timeout)).contains("too long"));
        assert_eq!(
            port_error(&PortError::Server {
                status: 500,
                body: "boom".to_string()
            }),
            "The coach backend failed (HTTP 500): boom"
        );
        assert_eq!(turn_error(&TurnError::EmptyMessage), "Please enter a message");
    }
}
