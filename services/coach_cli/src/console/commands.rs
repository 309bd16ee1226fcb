//! services/coach_cli/src/console/commands.rs
//!
//! Parses one line of console input into a `Command`.

use coach_core::{Gender, Profile, WorkoutOrder};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Health,
    Workout,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    SetProfile(Profile),
    LoadHealth(PathBuf),
    LoadWorkouts(PathBuf, WorkoutOrder),
    Template(TemplateKind, Option<PathBuf>),
    Demo,
    Show,
    Tokens,
    /// `/clear` alone only asks for confirmation.
    ConfirmClear,
    Clear,
    Refresh,
    Status,
    Tool(String),
    Send(String),
    Quit,
    /// A command that was recognized but used wrongly, with a usage hint.
    Invalid(String),
    Unknown(String),
}

pub const HELP: &str = "\
Commands:
  /profile <age> <gender> <height_cm> <weight_kg> [name]   set your profile
  /health <file.csv>                 load health data (date,metric,value)
  /workouts <file.csv> [--by-date]   load workout history
  /template health|workout [file]    print or save a CSV template
  /demo                              load demo profile and data
  /show                              show profile and loaded data
  /tokens                            show token usage for this conversation
  /tools <message>                   ask the coach in tool mode
  /refresh                           reload the conversation from the server
  /clear confirm                     clear the conversation here and on the server
  /status                            check the backend connection
  /help                              show this help
  /quit                              exit
Anything else is sent to the coach.";

impl Command {
    /// Returns `None` for a blank line.
    pub fn parse(line: &str) -> Option<Command> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if !line.starts_with('/') {
            return Some(Command::Send(line.to_string()));
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match name.to_lowercase().as_str() {
            "/help" | "/?" => Command::Help,
            "/profile" => parse_profile(&args),
            "/health" => match args.as_slice() {
                [path] => Command::LoadHealth(PathBuf::from(path)),
                _ => Command::Invalid("usage: /health <file.csv>".to_string()),
            },
            "/workouts" => parse_workouts(&args),
            "/template" => parse_template(&args),
            "/demo" => Command::Demo,
            "/show" => Command::Show,
            "/tokens" => Command::Tokens,
            "/clear" => match args.as_slice() {
                [] => Command::ConfirmClear,
                [word] if word.eq_ignore_ascii_case("confirm") || word.eq_ignore_ascii_case("yes") => {
                    Command::Clear
                }
                _ => Command::Invalid("usage: /clear confirm".to_string()),
            },
            "/refresh" => Command::Refresh,
            "/status" => Command::Status,
            "/tools" if !rest.is_empty() => Command::Tool(rest.to_string()),
            "/tools" => Command::Invalid("usage: /tools <message>".to_string()),
            "/quit" | "/exit" => Command::Quit,
            _ => Command::Unknown(name.to_string()),
        };
        Some(command)
    }
}

fn parse_profile(args: &[&str]) -> Command {
    const USAGE: &str = "usage: /profile <age> <gender> <height_cm> <weight_kg> [name]";
    if args.len() < 4 {
        return Command::Invalid(USAGE.to_string());
    }

    let age = match args[0].parse::<u32>() {
        Ok(age) => age,
        Err(_) => return Command::Invalid(format!("age '{}' is not a whole number", args[0])),
    };
    let gender = match args[1].parse::<Gender>() {
        Ok(gender) => gender,
        Err(e) => return Command::Invalid(format!("gender {}", e)),
    };
    let height = match args[2].parse::<f64>() {
        Ok(h) if h.is_finite() => h,
        _ => return Command::Invalid(format!("height '{}' is not a number", args[2])),
    };
    let weight = match args[3].parse::<f64>() {
        Ok(w) if w.is_finite() => w,
        _ => return Command::Invalid(format!("weight '{}' is not a number", args[3])),
    };
    let name = (args.len() > 4).then(|| args[4..].join(" "));

    Command::SetProfile(Profile {
        name,
        age,
        gender,
        height,
        weight,
    })
}

fn parse_workouts(args: &[&str]) -> Command {
    match args {
        [path] => Command::LoadWorkouts(PathBuf::from(path), WorkoutOrder::Upload),
        [path, "--by-date"] | ["--by-date", path] => {
            Command::LoadWorkouts(PathBuf::from(path), WorkoutOrder::DateDescending)
        }
        _ => Command::Invalid("usage: /workouts <file.csv> [--by-date]".to_string()),
    }
}

fn parse_template(args: &[&str]) -> Command {
    let kind = match args.first().map(|a| a.to_lowercase()) {
        Some(k) if k == "health" => TemplateKind::Health,
        Some(k) if k == "workout" || k == "workouts" => TemplateKind::Workout,
        _ => return Command::Invalid("usage: /template health|workout [file]".to_string()),
    };
    match args.len() {
        1 => Command::Template(kind, None),
        2 => Command::Template(kind, Some(PathBuf::from(args[1]))),
        _ => Command::Invalid("usage: /template health|workout [file]".to_string()),
    }
}
