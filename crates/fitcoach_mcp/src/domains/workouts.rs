use chrono::{DateTime, Utc};
use fitcoach_client::{NewExercise, NewWorkout, WorkoutRecord};
use schemars::JsonSchema;
use serde::Serialize;

use crate::error::{McpError, McpResult};

pub const DEFAULT_WORKOUT_TYPE: &str = "strength";

#[derive(Debug, Clone, Serialize, JsonSchema, PartialEq)]
pub struct WorkoutTypeInfo {
    pub value: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

/// Types offered by front-ends. The store accepts any non-empty type.
pub const WORKOUT_TYPES: [WorkoutTypeInfo; 3] = [
    WorkoutTypeInfo {
        value: "strength",
        title: "Strength Training",
        description: "Build muscle and increase strength",
    },
    WorkoutTypeInfo {
        value: "cardio",
        title: "Cardio",
        description: "Improve endurance and burn calories",
    },
    WorkoutTypeInfo {
        value: "hiit",
        title: "HIIT",
        description: "High-intensity interval training",
    },
];

#[derive(Debug, Clone, Serialize, JsonSchema, PartialEq)]
pub struct WorkoutSummary {
    pub id: String,
    #[serde(rename = "type")]
    pub workout_type: String,
    /// RFC 3339
    pub start_time: String,
    pub end_time: Option<String>,
    pub notes: Option<String>,
    pub duration_minutes: Option<f64>,
    /// Kilograms
    pub total_weight: f64,
}

impl From<&WorkoutRecord> for WorkoutSummary {
    fn from(w: &WorkoutRecord) -> Self {
        Self {
            id: w.id.clone(),
            workout_type: w.workout_type.clone(),
            start_time: w.start_time.to_rfc3339(),
            end_time: w.end_time.map(|t| t.to_rfc3339()),
            notes: w.notes.clone(),
            duration_minutes: w.duration_millis().map(|ms| ms as f64 / 60_000.0),
            total_weight: w.total_volume(),
        }
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema, PartialEq)]
pub struct EntryDetail {
    pub exercise: Option<String>,
    pub category: Option<String>,
    pub sets: Option<f64>,
    pub reps: Option<f64>,
    pub weight: Option<f64>,
    pub volume: f64,
}

#[derive(Debug, Clone, Serialize, JsonSchema, PartialEq)]
pub struct WorkoutDetail {
    pub workout: WorkoutSummary,
    pub entries: Vec<EntryDetail>,
}

impl From<&WorkoutRecord> for WorkoutDetail {
    fn from(w: &WorkoutRecord) -> Self {
        Self {
            workout: WorkoutSummary::from(w),
            entries: w
                .exercise_entries
                .iter()
                .map(|e| EntryDetail {
                    exercise: e.exercise.as_ref().map(|x| x.name.clone()),
                    category: e.exercise.as_ref().and_then(|x| x.category.clone()),
                    sets: e.sets,
                    reps: e.reps,
                    weight: e.weight,
                    volume: e.volume(),
                })
                .collect(),
        }
    }
}

/// Validate caller input and assemble a [`NewWorkout`].
///
/// `start_time` accepts RFC 3339 and defaults to `now`.
pub fn build_workout(
    user_id: String,
    workout_type: Option<&str>,
    notes: Option<String>,
    start_time: Option<&str>,
    exercises: Vec<NewExercise>,
    now: DateTime<Utc>,
) -> McpResult<NewWorkout> {
    let workout_type = workout_type
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_WORKOUT_TYPE)
        .to_string();
    let start_time = match start_time.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|_| McpError::Validation(format!("start_time must be RFC 3339, got {raw}")))?,
        None => now,
    };

    let mut cleaned = Vec::with_capacity(exercises.len());
    for ex in exercises {
        let name = ex.name.trim();
        if name.is_empty() {
            return Err(McpError::Validation("exercise name must not be empty".into()));
        }
        if !ex.weight.is_finite() {
            return Err(McpError::Validation(format!(
                "exercise {name} has a non-numeric weight"
            )));
        }
        cleaned.push(NewExercise {
            name: name.to_string(),
            ..ex
        });
    }

    Ok(NewWorkout {
        user_id,
        workout_type,
        notes: notes.filter(|n| !n.trim().is_empty()),
        start_time,
        exercises: cleaned,
    })
}
