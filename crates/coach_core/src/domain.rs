//! crates/coach_core/src/domain.rs
//!
//! Defines the pure, core data structures for the coach client.
//! These structs are independent of any wire or file format.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

//=========================================================================================
// Profile
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(format!("'{}' is not one of male, female, other", other)),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user's manually entered profile. Overwritten on edit, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub name: Option<String>,
    pub age: u32,
    pub gender: Gender,
    /// Centimetres.
    pub height: f64,
    /// Kilograms.
    pub weight: f64,
}

/// Coarse BMI band shown next to the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiBand {
    Normal,
    Overweight,
    Obese,
}

impl Profile {
    /// Body mass index, or `None` while no height has been entered.
    pub fn bmi(&self) -> Option<f64> {
        let height_m = self.height / 100.0;
        if height_m <= 0.0 {
            return None;
        }
        Some(self.weight / (height_m * height_m))
    }

    pub fn bmi_band(&self) -> Option<BmiBand> {
        self.bmi().map(|bmi| {
            if bmi < 25.0 {
                BmiBand::Normal
            } else if bmi < 30.0 {
                BmiBand::Overweight
            } else {
                BmiBand::Obese
            }
        })
    }

    /// Returns the names of all fields that must be filled in before a message
    /// can be sent. An empty list means the profile is complete.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.age == 0 {
            missing.push("age");
        }
        if self.height <= 0.0 {
            missing.push("height");
        }
        if self.weight <= 0.0 {
            missing.push("weight");
        }
        missing
    }
}

//=========================================================================================
// Health and Workout Data
//=========================================================================================

/// One day of health metrics, pivoted from (date, metric, value) rows.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthRecord {
    pub date: NaiveDate,
    pub steps: Option<i64>,
    /// Hours.
    pub sleep_duration: Option<f64>,
    /// Beats per minute.
    pub heart_rate: Option<i64>,
    pub blood_pressure_sys: Option<i64>,
    pub blood_pressure_dia: Option<i64>,
    /// Percent.
    pub body_fat: Option<f64>,
    /// Percent.
    pub oxygen_saturation: Option<f64>,
}

impl HealthRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            steps: None,
            sleep_duration: None,
            heart_rate: None,
            blood_pressure_sys: None,
            blood_pressure_dia: None,
            body_fat: None,
            oxygen_saturation: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkoutCategory {
    Strength,
    Cardio,
    Flexibility,
}

impl WorkoutCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutCategory::Strength => "strength",
            WorkoutCategory::Cardio => "cardio",
            WorkoutCategory::Flexibility => "flexibility",
        }
    }
}

impl FromStr for WorkoutCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strength" => Ok(WorkoutCategory::Strength),
            "cardio" => Ok(WorkoutCategory::Cardio),
            "flexibility" => Ok(WorkoutCategory::Flexibility),
            other => Err(format!(
                "'{}' is not one of strength, cardio, flexibility",
                other
            )),
        }
    }
}

impl fmt::Display for WorkoutCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A workout the user has done (or skipped).
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutHistoryEntry {
    pub date: NaiveDate,
    pub workout_name: String,
    pub category: WorkoutCategory,
    pub duration_minutes: u32,
    pub completed: bool,
}

/// Library fields this client does not model, keyed by field name. Values are kept
/// as raw JSON text so they reach the backend unchanged.
pub type ExtraFields = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct Equipment {
    pub id: i64,
    pub name: String,
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkoutExercise {
    pub id: i64,
    pub name: String,
    pub reps: Option<u32>,
    pub sets: Option<u32>,
    pub rest_seconds: Option<u32>,
    pub duration_seconds: Option<u32>,
    pub equipment: Vec<Equipment>,
    pub extra: ExtraFields,
}

/// An entry of the backend's workout library. Forwarded verbatim on every request.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailableWorkout {
    pub id: i64,
    pub name: String,
    /// Whatever category the library uses; it is not limited to `WorkoutCategory`.
    pub category: String,
    pub duration_minutes: u32,
    pub difficulty_level: String,
    pub description: Option<String>,
    pub primary_muscles: String,
    pub secondary_muscles: Option<String>,
    pub sets_count: Option<u32>,
    pub equipment: Vec<Equipment>,
    pub exercises: Vec<WorkoutExercise>,
    pub extra: ExtraFields,
}

//=========================================================================================
// Conversation
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Token usage reported by the backend for one assistant message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

impl std::ops::AddAssign for TokenUsage {
    fn add_assign(&mut self, other: Self) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Server-assigned identifier, when the backend returned one.
    pub id: Option<String>,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Only present on assistant messages.
    pub usage: Option<TokenUsage>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: None,
            role: Role::User,
            content: content.into(),
            created_at: Utc::now(),
            usage: None,
        }
    }

    pub fn assistant(content: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            id: None,
            role: Role::Assistant,
            content: content.into(),
            created_at: Utc::now(),
            usage: Some(usage),
        }
    }
}

/// The session's conversation log. Messages are only ever appended.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    pub id: Option<String>,
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends one completed turn in order: the user's message, then the reply.
    pub fn append_turn(&mut self, user: Message, assistant: Message) {
        self.messages.push(user);
        self.messages.push(assistant);
    }

    /// Replaces the whole log with a snapshot fetched from the backend.
    pub fn replace(&mut self, id: Option<String>, messages: Vec<Message>) {
        self.id = id;
        self.messages = messages;
    }

    pub fn clear(&mut self) {
        self.id = None;
        self.messages.clear();
    }

    /// Sum of the token counts of every message in the log.
    pub fn token_totals(&self) -> TokenUsage {
        let mut totals = TokenUsage::default();
        for usage in self.messages.iter().filter_map(|m| m.usage) {
            totals += usage;
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(height: f64, weight: f64) -> Profile {
        Profile {
            name: Some("Alex".to_string()),
            age: 28,
            gender: Gender::Male,
            height,
            weight,
        }
    }

    #[test]
    fn bmi_uses_height_in_metres() {
        let bmi = profile(178.0, 75.0).bmi().unwrap();
        assert!((bmi - 23.67).abs() < 0.01);
        assert_eq!(profile(178.0, 75.0).bmi_band(), Some(BmiBand::Normal));
        assert_eq!(profile(170.0, 80.0).bmi_band(), Some(BmiBand::Overweight));
        assert_eq!(profile(0.0, 80.0).bmi(), None);
    }

    #[test]
    fn missing_fields_lists_every_gap() {
        let p = Profile {
            name: None,
            age: 0,
            gender: Gender::Other,
            height: 0.0,
            weight: 70.0,
        };
        assert_eq!(p.missing_fields(), vec!["age", "height"]);
        assert!(profile(180.0, 80.0).missing_fields().is_empty());
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("Female".parse::<Gender>(), Ok(Gender::Female));
        assert_eq!(" CARDIO ".parse::<WorkoutCategory>(), Ok(WorkoutCategory::Cardio));
        assert!("yoga".parse::<WorkoutCategory>().is_err());
    }

    #[test]
    fn token_totals_sum_assistant_messages() {
        let mut conversation = Conversation::new();
        conversation.append_turn(
            Message::user("hi"),
            Message::assistant("hello", TokenUsage { input_tokens: 10, output_tokens: 4 }),
        );
        conversation.append_turn(
            Message::user("plan?"),
            Message::assistant("sure", TokenUsage { input_tokens: 20, output_tokens: 6 }),
        );
        let totals = conversation.token_totals();
        assert_eq!(totals.input_tokens, 30);
        assert_eq!(totals.output_tokens, 10);
        assert_eq!(totals.total(), 40);
        assert_eq!(conversation.messages()[0].role, Role::User);
        assert_eq!(conversation.messages()[3].content, "sure");
    }
}
