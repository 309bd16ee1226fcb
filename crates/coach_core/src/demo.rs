//! crates/coach_core/src/demo.rs
//!
//! Static demo data and the downloadable CSV templates.

use crate::domain::{
    AvailableWorkout, Equipment, ExtraFields, Gender, HealthRecord, Profile, WorkoutCategory, WorkoutExercise,
    WorkoutHistoryEntry,
};
use chrono::NaiveDate;

pub const HEALTH_CSV_TEMPLATE: &str = "\
date,metric,value
2026-02-10,Steps,8500
2026-02-10,Sleep Duration,7.5
2026-02-10,Heart Rate,72
2026-02-10,Blood Pressure Sys,120
2026-02-10,Blood Pressure Dia,80
2026-02-10,Body Fat,18.5
2026-02-10,Oxygen Saturation,98.0
2026-02-09,Steps,10200
2026-02-09,Sleep Duration,8.0
2026-02-09,Heart Rate,68
";

pub const WORKOUT_CSV_TEMPLATE: &str = "\
date,workout_name,category,duration_mins,completed
2026-02-10,Full Body Strength,strength,45,true
2026-02-09,Cardio Blast,cardio,30,true
2026-02-08,Upper Body Focus,strength,40,true
2026-02-07,HIIT Training,cardio,25,false
2026-02-06,Yoga & Flexibility,flexibility,30,true
";

// Demo dates are fixed constants, so construction cannot fail.
fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, d).unwrap_or(NaiveDate::MIN)
}

pub fn demo_profile() -> Profile {
    Profile {
        name: Some("Alex Johnson".to_string()),
        age: 28,
        gender: Gender::Male,
        height: 178.0,
        weight: 75.0,
    }
}

/// Five days of complete metrics, most recent first.
pub fn demo_health_records() -> Vec<HealthRecord> {
    let rows: [(u32, i64, f64, i64, i64, i64, f64, f64); 5] = [
        (7, 9800, 8.1, 71, 120, 80, 18.2, 98.1),
        (6, 11500, 7.8, 70, 119, 79, 18.3, 98.2),
        (5, 9100, 7.2, 75, 122, 82, 18.5, 97.8),
        (4, 10200, 8.0, 68, 118, 78, 18.4, 98.5),
        (3, 8500, 7.5, 72, 120, 80, 18.5, 98.0),
    ];
    rows.iter()
        .map(|&(d, steps, sleep, hr, sys, dia, fat, o2)| HealthRecord {
            date: day(d),
            steps: Some(steps),
            sleep_duration: Some(sleep),
            heart_rate: Some(hr),
            blood_pressure_sys: Some(sys),
            blood_pressure_dia: Some(dia),
            body_fat: Some(fat),
            oxygen_saturation: Some(o2),
        })
        .collect()
}

pub fn demo_workout_history() -> Vec<WorkoutHistoryEntry> {
    let entry = |d, name: &str, category, minutes, completed| WorkoutHistoryEntry {
        date: day(d),
        workout_name: name.to_string(),
        category,
        duration_minutes: minutes,
        completed,
    };
    vec![
        entry(7, "Full Body Strength", WorkoutCategory::Strength, 45, true),
        entry(6, "Cardio Blast", WorkoutCategory::Cardio, 30, true),
        entry(5, "Upper Body Focus", WorkoutCategory::Strength, 40, true),
        entry(4, "HIIT Training", WorkoutCategory::Cardio, 25, false),
        entry(3, "Yoga & Flexibility", WorkoutCategory::Flexibility, 30, true),
    ]
}

fn equipment(id: i64, name: &str) -> Equipment {
    Equipment {
        id,
        name: name.to_string(),
        extra: ExtraFields::new(),
    }
}

fn sets_exercise(id: i64, name: &str, reps: u32, sets: u32, rest: u32, gear: Vec<Equipment>) -> WorkoutExercise {
    WorkoutExercise {
        id,
        name: name.to_string(),
        reps: Some(reps),
        sets: Some(sets),
        rest_seconds: Some(rest),
        duration_seconds: None,
        equipment: gear,
        extra: ExtraFields::new(),
    }
}

fn timed_exercise(id: i64, name: &str, seconds: u32, rest: Option<u32>) -> WorkoutExercise {
    WorkoutExercise {
        id,
        name: name.to_string(),
        rest_seconds: rest,
        duration_seconds: Some(seconds),
        ..Default::default()
    }
}

fn reps_exercise(id: i64, name: &str, reps: u32, rest: u32) -> WorkoutExercise {
    WorkoutExercise {
        id,
        name: name.to_string(),
        reps: Some(reps),
        rest_seconds: Some(rest),
        ..Default::default()
    }
}

/// The default workout library a session starts with.
pub fn demo_available_workouts() -> Vec<AvailableWorkout> {
    let barbell = || vec![equipment(2, "Barbell")];
    let dumbbell = || vec![equipment(1, "Dumbbell")];
    let treadmill = || vec![equipment(3, "Treadmill")];

    vec![
        AvailableWorkout {
            id: 1,
            name: "Full Body Strength".to_string(),
            category: WorkoutCategory::Strength.to_string(),
            duration_minutes: 45,
            difficulty_level: "intermediate".to_string(),
            description: Some("A comprehensive full-body strength workout".to_string()),
            primary_muscles: "chest, back, legs".to_string(),
            secondary_muscles: Some("shoulders, arms".to_string()),
            sets_count: Some(3),
            equipment: vec![equipment(1, "Dumbbell"), equipment(2, "Barbell")],
            exercises: vec![
                sets_exercise(1, "Bench Press", 10, 3, 90, barbell()),
                sets_exercise(2, "Deadlifts", 8, 3, 120, barbell()),
                sets_exercise(3, "Squats", 12, 3, 90, barbell()),
            ],
            extra: ExtraFields::new(),
        },
        AvailableWorkout {
            id: 2,
            name: "Cardio Blast".to_string(),
            category: WorkoutCategory::Cardio.to_string(),
            duration_minutes: 30,
            difficulty_level: "beginner".to_string(),
            description: Some("Quick cardio workout to boost your heart rate".to_string()),
            primary_muscles: "cardiovascular".to_string(),
            secondary_muscles: Some("legs".to_string()),
            sets_count: Some(1),
            equipment: treadmill(),
            exercises: vec![WorkoutExercise {
                equipment: treadmill(),
                ..timed_exercise(4, "Running", 1800, None)
            }],
            extra: ExtraFields::new(),
        },
        AvailableWorkout {
            id: 3,
            name: "Upper Body Focus".to_string(),
            category: WorkoutCategory::Strength.to_string(),
            duration_minutes: 40,
            difficulty_level: "intermediate".to_string(),
            description: Some("Focused workout for chest, back, and arms".to_string()),
            primary_muscles: "chest, back, arms".to_string(),
            secondary_muscles: Some("shoulders".to_string()),
            sets_count: Some(3),
            equipment: dumbbell(),
            exercises: vec![
                sets_exercise(5, "Dumbbell Chest Press", 12, 3, 60, dumbbell()),
                sets_exercise(6, "Lat Pulldown", 10, 3, 75, Vec::new()),
            ],
            extra: ExtraFields::new(),
        },
        AvailableWorkout {
            id: 4,
            name: "HIIT Training".to_string(),
            category: WorkoutCategory::Cardio.to_string(),
            duration_minutes: 25,
            difficulty_level: "advanced".to_string(),
            description: Some("High-intensity interval training for maximum burn".to_string()),
            primary_muscles: "full body".to_string(),
            secondary_muscles: Some("cardiovascular".to_string()),
            sets_count: Some(2),
            equipment: Vec::new(),
            exercises: vec![
                reps_exercise(7, "Burpees", 20, 30),
                timed_exercise(8, "Mountain Climbers", 60, Some(30)),
                reps_exercise(9, "Jump Squats", 20, 30),
            ],
            extra: ExtraFields::new(),
        },
        AvailableWorkout {
            id: 5,
            name: "Yoga & Flexibility".to_string(),
            category: WorkoutCategory::Flexibility.to_string(),
            duration_minutes: 30,
            difficulty_level: "beginner".to_string(),
            description: Some("Relax and improve flexibility with gentle yoga".to_string()),
            primary_muscles: "full body".to_string(),
            secondary_muscles: Some("flexibility".to_string()),
            sets_count: Some(1),
            equipment: Vec::new(),
            exercises: vec![
                timed_exercise(10, "Sun Salutation", 600, None),
                timed_exercise(11, "Downward Dog", 300, None),
                timed_exercise(12, "Child's Pose", 300, None),
            ],
            extra: ExtraFields::new(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::{parse_health_csv, parse_workout_csv, WorkoutOrder};

    #[test]
    fn templates_parse_cleanly() {
        let health = parse_health_csv(HEALTH_CSV_TEMPLATE.as_bytes()).unwrap();
        assert!(health.is_clean());
        assert_eq!(health.records.len(), 2);
        assert_eq!(health.records[0].oxygen_saturation, Some(98.0));

        let workouts = parse_workout_csv(WORKOUT_CSV_TEMPLATE.as_bytes(), WorkoutOrder::Upload).unwrap();
        assert!(workouts.is_clean());
        assert_eq!(workouts.records.len(), 5);
    }

    #[test]
    fn demo_records_are_most_recent_first() {
        let records = demo_health_records();
        assert!(records.windows(2).all(|w| w[0].date > w[1].date));
        assert_eq!(demo_available_workouts().len(), 5);
        assert!(demo_profile().missing_fields().is_empty());
    }
}
