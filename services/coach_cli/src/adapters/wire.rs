//! services/coach_cli/src/adapters/wire.rs
//!
//! JSON shapes exchanged with the coach backend. Field names here are fixed by the
//! backend and must not change. Each record converts to or from its pure domain
//! counterpart in `coach_core`.

use chrono::{DateTime, Utc};
use coach_core::{
    AvailableWorkout, CoachReply, CoachRequest, ConversationSnapshot, Equipment, ExtraFields, HealthRecord,
    Message, PortError, PortResult, Role, TokenUsage, WorkoutExercise,
    WorkoutHistoryEntry,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

//=========================================================================================
// Outbound Records
//=========================================================================================

/// Body of `POST /api/ai-coach/conversation/messages-with-data`.
///
/// Profile fields that are empty or zero are left out, as the backend treats a
/// missing field and an unset one the same way.
#[derive(Debug, Serialize)]
pub struct DataMessageBody<'a> {
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    pub health_data: Vec<HealthRecordBody>,
    pub workout_history: Vec<WorkoutSessionBody>,
    pub available_workouts: Vec<AvailableWorkoutRecord>,
    pub conversation_history: Vec<HistoryEntryBody<'a>>,
}

impl<'a> DataMessageBody<'a> {
    pub fn from_request(request: &'a CoachRequest) -> Self {
        let profile = &request.profile;
        Self {
            message: &request.message,
            name: profile.name.as_deref().map(str::trim).filter(|n| !n.is_empty()),
            age: Some(profile.age).filter(|a| *a > 0),
            gender: Some(profile.gender.as_str()),
            height: Some(profile.height).filter(|h| *h > 0.0),
            weight: Some(profile.weight).filter(|w| *w > 0.0),
            health_data: request.health_data.iter().map(HealthRecordBody::from).collect(),
            workout_history: request
                .workout_history
                .iter()
                .map(WorkoutSessionBody::from)
                .collect(),
            available_workouts: request
                .available_workouts
                .iter()
                .map(AvailableWorkoutRecord::from)
                .collect(),
            conversation_history: request
                .history
                .iter()
                .map(|m| HistoryEntryBody {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageBody<'a> {
    pub message: &'a str,
}

#[derive(Debug, Serialize)]
pub struct HistoryEntryBody<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

/// One day of metrics. Absent metrics are sent as `null`.
#[derive(Debug, Serialize)]
pub struct HealthRecordBody {
    /// The date at noon UTC, e.g. `2026-02-07T12:00:00Z`.
    pub recorded_at: String,
    pub steps_count: Option<i64>,
    pub sleep_duration: Option<f64>,
    pub heart_rate: Option<i64>,
    pub blood_pressure_sys: Option<i64>,
    pub blood_pressure_dia: Option<i64>,
    pub body_fat: Option<f64>,
    pub oxygen_saturation: Option<f64>,
}

impl From<&HealthRecord> for HealthRecordBody {
    fn from(record: &HealthRecord) -> Self {
        Self {
            recorded_at: format!("{}T12:00:00Z", record.date.format("%Y-%m-%d")),
            steps_count: record.steps,
            sleep_duration: record.sleep_duration,
            heart_rate: record.heart_rate,
            blood_pressure_sys: record.blood_pressure_sys,
            blood_pressure_dia: record.blood_pressure_dia,
            body_fat: record.body_fat,
            oxygen_saturation: record.oxygen_saturation,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WorkoutSessionBody {
    pub date: String,
    /// Midnight UTC of `date`.
    pub started_at: String,
    pub workout_name: String,
    pub category: &'static str,
    pub is_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
}

impl From<&WorkoutHistoryEntry> for WorkoutSessionBody {
    fn from(entry: &WorkoutHistoryEntry) -> Self {
        let date = entry.date.format("%Y-%m-%d").to_string();
        Self {
            started_at: format!("{}T00:00:00Z", date),
            date,
            workout_name: entry.workout_name.clone(),
            category: entry.category.as_str(),
            is_completed: entry.completed,
            duration_seconds: Some(u64::from(entry.duration_minutes) * 60).filter(|s| *s > 0),
        }
    }
}

//=========================================================================================
// Workout Library Records (both directions)
//=========================================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentRecord {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseRecord {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub equipment: Vec<EquipmentRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One library workout. Fields the client does not model are collected in `extra`
/// and written back out untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableWorkoutRecord {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub duration_minutes: u32,
    pub difficulty_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub primary_muscles: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_muscles: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets_count: Option<u32>,
    #[serde(default)]
    pub equipment: Vec<EquipmentRecord>,
    #[serde(default)]
    pub exercises: Vec<ExerciseRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn extra_to_domain(extra: Map<String, Value>) -> ExtraFields {
    extra.into_iter().map(|(k, v)| (k, v.to_string())).collect()
}

fn extra_to_wire(extra: &ExtraFields) -> Map<String, Value> {
    extra
        .iter()
        .map(|(k, raw)| {
            let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()));
            (k.clone(), value)
        })
        .collect()
}

impl From<&Equipment> for EquipmentRecord {
    fn from(e: &Equipment) -> Self {
        Self {
            id: e.id,
            name: e.name.clone(),
            extra: extra_to_wire(&e.extra),
        }
    }
}

impl From<&WorkoutExercise> for ExerciseRecord {
    fn from(x: &WorkoutExercise) -> Self {
        Self {
            id: x.id,
            name: x.name.clone(),
            reps: x.reps,
            sets: x.sets,
            rest_seconds: x.rest_seconds,
            duration_seconds: x.duration_seconds,
            equipment: x.equipment.iter().map(EquipmentRecord::from).collect(),
            extra: extra_to_wire(&x.extra),
        }
    }
}

impl From<&AvailableWorkout> for AvailableWorkoutRecord {
    fn from(w: &AvailableWorkout) -> Self {
        Self {
            id: w.id,
            name: w.name.clone(),
            category: w.category.clone(),
            duration_minutes: w.duration_minutes,
            difficulty_level: w.difficulty_level.clone(),
            description: w.description.clone(),
            primary_muscles: w.primary_muscles.clone(),
            secondary_muscles: w.secondary_muscles.clone(),
            sets_count: w.sets_count,
            equipment: w.equipment.iter().map(EquipmentRecord::from).collect(),
            exercises: w.exercises.iter().map(ExerciseRecord::from).collect(),
            extra: extra_to_wire(&w.extra),
        }
    }
}

impl EquipmentRecord {
    pub fn to_domain(self) -> Equipment {
        Equipment {
            id: self.id,
            name: self.name,
            extra: extra_to_domain(self.extra),
        }
    }
}

impl ExerciseRecord {
    pub fn to_domain(self) -> WorkoutExercise {
        WorkoutExercise {
            id: self.id,
            name: self.name,
            reps: self.reps,
            sets: self.sets,
            rest_seconds: self.rest_seconds,
            duration_seconds: self.duration_seconds,
            equipment: self.equipment.into_iter().map(EquipmentRecord::to_domain).collect(),
            extra: extra_to_domain(self.extra),
        }
    }
}

impl AvailableWorkoutRecord {
    pub fn to_domain(self) -> AvailableWorkout {
        AvailableWorkout {
            id: self.id,
            name: self.name,
            category: self.category,
            duration_minutes: self.duration_minutes,
            difficulty_level: self.difficulty_level,
            description: self.description,
            primary_muscles: self.primary_muscles,
            secondary_muscles: self.secondary_muscles,
            sets_count: self.sets_count,
            equipment: self.equipment.into_iter().map(EquipmentRecord::to_domain).collect(),
            exercises: self.exercises.into_iter().map(ExerciseRecord::to_domain).collect(),
            extra: extra_to_domain(self.extra),
        }
    }
}

//=========================================================================================
// Inbound Records
//=========================================================================================

/// The backend has used both numeric (`0`/`1`) and named roles.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RoleRecord {
    Code(u8),
    Name(String),
}

impl RoleRecord {
    fn to_domain(&self) -> Option<Role> {
        match self {
            RoleRecord::Code(0) => Some(Role::User),
            RoleRecord::Code(1) => Some(Role::Assistant),
            RoleRecord::Name(name) if name.eq_ignore_ascii_case("user") => Some(Role::User),
            RoleRecord::Name(name) if name.eq_ignore_ascii_case("assistant") => Some(Role::Assistant),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageRecord {
    #[serde(default, alias = "id")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub role: Option<RoleRecord>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub input_tokens: Option<u64>,
    #[serde(default)]
    pub output_tokens: Option<u64>,
}

impl MessageRecord {
    /// Converts to a domain message, using `fallback` when the record has no role.
    fn to_domain(self, fallback: Option<Role>) -> PortResult<Message> {
        let role = self
            .role
            .as_ref()
            .and_then(RoleRecord::to_domain)
            .or(fallback)
            .ok_or_else(|| PortError::InvalidResponse(format!("message has unknown role: {:?}", self.role)))?;

        let usage = match role {
            Role::Assistant => Some(TokenUsage {
                input_tokens: self.input_tokens.unwrap_or(0),
                output_tokens: self.output_tokens.unwrap_or(0),
            }),
            Role::User => None,
        };

        Ok(Message {
            id: self.uuid,
            role,
            content: self.content.unwrap_or_default(),
            created_at: self.created_at.unwrap_or_else(Utc::now),
            usage,
        })
    }
}

/// Response of both message endpoints.
#[derive(Debug, Deserialize)]
pub struct SendMessageResponse {
    #[serde(default)]
    pub conversation_uuid: Option<String>,
    #[serde(default)]
    pub user_message: Option<MessageRecord>,
    #[serde(default)]
    pub assistant_message: Option<MessageRecord>,
}

impl SendMessageResponse {
    pub fn to_domain(self) -> PortResult<CoachReply> {
        let user = self
            .user_message
            .ok_or_else(|| PortError::InvalidResponse("user_message is missing".to_string()))?;
        let assistant = self
            .assistant_message
            .ok_or_else(|| PortError::InvalidResponse("assistant_message is missing".to_string()))?;
        Ok(CoachReply {
            conversation_id: self.conversation_uuid,
            user_message: user.to_domain(Some(Role::User))?,
            assistant_message: assistant.to_domain(Some(Role::Assistant))?,
        })
    }
}

/// Response of `GET /api/ai-coach/conversation`.
#[derive(Debug, Deserialize)]
pub struct ConversationRecord {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub messages: Vec<MessageRecord>,
}

impl ConversationRecord {
    pub fn to_domain(self) -> PortResult<ConversationSnapshot> {
        let messages = self
            .messages
            .into_iter()
            .map(|m| m.to_domain(None))
            .collect::<PortResult<Vec<_>>>()?;
        Ok(ConversationSnapshot {
            conversation_id: self.uuid,
            messages,
        })
    }
}

/// Parses a workout library file: a JSON array of library records.
pub fn parse_workout_library(json: &str) -> Result<Vec<AvailableWorkout>, String> {
    let records: Vec<AvailableWorkoutRecord> =
        serde_json::from_str(json).map_err(|e| format!("invalid workout library: {}", e))?;
    Ok(records.into_iter().map(AvailableWorkoutRecord::to_domain).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use coach_core::{demo, Gender, Profile, WorkoutCategory};
    use serde_json::json;

    fn request() -> CoachRequest {
        let mut record = HealthRecord::new(NaiveDate::from_ymd_opt(2026, 2, 7).unwrap());
        record.steps = Some(10000);
        record.sleep_duration = Some(8.0);
        CoachRequest {
            message: "Hi".to_string(),
            profile: Profile {
                name: None,
                age: 28,
                gender: Gender::Female,
                height: 165.0,
                weight: 0.0,
            },
            health_data: vec![record],
            workout_history: vec![WorkoutHistoryEntry {
                date: NaiveDate::from_ymd_opt(2026, 2, 4).unwrap(),
                workout_name: "HIIT Training".to_string(),
                category: WorkoutCategory::Cardio,
                duration_minutes: 25,
                completed: false,
            }],
            available_workouts: demo::demo_available_workouts(),
            history: vec![Message::user("earlier")],
        }
    }

    #[test]
    fn data_message_body_uses_backend_field_names() {
        let request = request();
        let body = serde_json::to_value(DataMessageBody::from_request(&request)).unwrap();

        assert_eq!(body["message"], "Hi");
        assert_eq!(body["age"], 28);
        assert_eq!(body["gender"], "female");
        assert_eq!(body["height"], 165.0);
        assert!(body.get("name").is_none());
        assert!(body.get("weight").is_none());

        assert_eq!(
            body["health_data"][0],
            json!({
                "recorded_at": "2026-02-07T12:00:00Z",
                "steps_count": 10000,
                "sleep_duration": 8.0,
                "heart_rate": null,
                "blood_pressure_sys": null,
                "blood_pressure_dia": null,
                "body_fat": null,
                "oxygen_saturation": null
            })
        );
        assert_eq!(
            body["workout_history"][0],
            json!({
                "date": "2026-02-04",
                "started_at": "2026-02-04T00:00:00Z",
                "workout_name": "HIIT Training",
                "category": "cardio",
                "is_completed": false,
                "duration_seconds": 1500
            })
        );
        assert_eq!(body["available_workouts"].as_array().unwrap().len(), 5);
        assert_eq!(body["available_workouts"][0]["exercises"][0]["name"], "Bench Press");
        assert_eq!(
            body["conversation_history"],
            json!([{ "role": "user", "content": "earlier" }])
        );
    }

    #[test]
    fn reply_keeps_server_ids_and_token_counts() {
        let response: SendMessageResponse = serde_json::from_value(json!({
            "conversation_uuid": "c-1",
            "user_message": { "uuid": "u-1", "content": "Hi", "created_at": "2026-02-07T08:00:00Z" },
            "assistant_message": { "uuid": "a-1", "content": "Hello!", "input_tokens": 812, "output_tokens": 64 }
        }))
        .unwrap();

        let reply = response.to_domain().unwrap();
        assert_eq!(reply.conversation_id.as_deref(), Some("c-1"));
        assert_eq!(reply.user_message.id.as_deref(), Some("u-1"));
        assert_eq!(reply.user_message.role, Role::User);
        assert_eq!(reply.assistant_message.usage.unwrap().output_tokens, 64);
    }

    #[test]
    fn missing_assistant_message_is_invalid() {
        let response: SendMessageResponse =
            serde_json::from_value(json!({ "user_message": { "content": "Hi" } })).unwrap();
        assert!(matches!(response.to_domain(), Err(PortError::InvalidResponse(_))));
    }

    #[test]
    fn conversation_accepts_numeric_and_named_roles() {
        let record: ConversationRecord = serde_json::from_value(json!({
            "uuid": "c-9",
            "messages": [
                { "role": 0, "content": "hi" },
                { "role": "assistant", "content": "hey", "input_tokens": 5, "output_tokens": 2 }
            ]
        }))
        .unwrap();
        let snapshot = record.to_domain().unwrap();
        assert_eq!(snapshot.messages[0].role, Role::User);
        assert_eq!(snapshot.messages[1].role, Role::Assistant);
        assert_eq!(snapshot.messages[1].usage.unwrap().total(), 7);
    }

    #[test]
    fn library_records_keep_their_own_category() {
        let record: AvailableWorkoutRecord = serde_json::from_value(json!({
            "id": 7,
            "name": "Mobility Flow",
            "category": "Flexibility",
            "duration_minutes": 20,
            "difficulty_level": "beginner",
            "primary_muscles": "hips",
            "exercises": [{ "id": 1, "name": "Hip Opener", "duration_seconds": 120 }]
        }))
        .unwrap();
        let workout = record.to_domain();
        assert_eq!(workout.category, "Flexibility");
        assert_eq!(workout.exercises[0].duration_seconds, Some(120));

        let library = parse_workout_library(
            r#"[{ "id": 8, "name": "Balance", "category": "balance", "duration_minutes": 15,
                  "difficulty_level": "beginner", "primary_muscles": "core" }]"#,
        )
        .unwrap();
        assert_eq!(library[0].category, "balance");
    }

    #[test]
    fn unmodelled_library_fields_are_forwarded_unchanged() {
        let input = json!([{
            "id": 1,
            "name": "Leg Day",
            "category": "strength",
            "duration_minutes": 50,
            "difficulty_level": "advanced",
            "primary_muscles": "legs",
            "image_url": "https://cdn.example.com/leg-day.png",
            "tags": ["legs", { "focus": "quads" }],
            "equipment": [{ "id": 2, "name": "Barbell", "weight_kg": 20 }],
            "exercises": [{ "id": 1, "name": "Squat", "reps": 5, "tempo": "3-1-1", "video": null }]
        }]);
        let library = parse_workout_library(&input.to_string()).unwrap();
        assert_eq!(library[0].extra.len(), 2);

        let request = CoachRequest {
            available_workouts: library,
            ..request()
        };
        let body = serde_json::to_value(DataMessageBody::from_request(&request)).unwrap();
        assert_eq!(body["available_workouts"], input);
    }

    #[test]
    fn very_long_workout_duration_does_not_overflow() {
        let entry = WorkoutHistoryEntry {
            date: NaiveDate::from_ymd_opt(2026, 2, 4).unwrap(),
            workout_name: "Ultra".to_string(),
            category: WorkoutCategory::Cardio,
            duration_minutes: u32::MAX,
            completed: true,
        };
        let body = WorkoutSessionBody::from(&entry);
        assert_eq!(body.duration_seconds, Some(u64::from(u32::MAX) * 60));
    }

    #[test]
    fn workout_library_file_round_trips_the_demo_library() {
        let records: Vec<AvailableWorkoutRecord> = demo::demo_available_workouts()
            .iter()
            .map(AvailableWorkoutRecord::from)
            .collect();
        let json = serde_json::to_string(&records).unwrap();
        assert_eq!(parse_workout_library(&json).unwrap(), demo::demo_available_workouts());
        assert!(parse_workout_library("{}").is_err());
    }
}
