//! `FitnessStore` trait, row models and the reqwest-based collaborators
//! (PostgREST store and chat-completion transport).

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod chat;
pub mod config;
pub mod http_client;
pub mod observability;
pub mod retry;
pub mod utils;

use utils::{
    deserialize_id, deserialize_lenient_number, deserialize_opt_timestamp, deserialize_timestamp,
};

#[derive(Debug, Error)]
pub enum FitcoachError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("api error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FitcoachError {
    /// Map an unsuccessful HTTP status and a body snippet to an error.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            404 => FitcoachError::NotFound(body),
            401 | 403 => FitcoachError::Auth(body),
            400 | 409 | 422 => FitcoachError::InvalidInput(body),
            _ => FitcoachError::Api { status, body },
        }
    }
}

/// Exercise catalogue entry nested under a workout entry.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ExerciseInfo {
    pub name: String,
    pub category: Option<String>,
}

/// One exercise performed within a workout.
///
/// The numeric columns are kept as fetched: a missing or non-numeric value is
/// `None`, and [`ExerciseEntry::volume`] treats it as a zero contribution.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ExerciseEntry {
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub sets: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub reps: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise: Option<ExerciseInfo>,
}

impl ExerciseEntry {
    pub fn new(sets: f64, reps: f64, weight: f64) -> Self {
        Self {
            sets: Some(sets),
            reps: Some(reps),
            weight: Some(weight),
            exercise: None,
        }
    }

    /// `sets × reps × weight`, or `0` when a factor is missing or the product
    /// is not a finite number.
    pub fn volume(&self) -> f64 {
        match (self.sets, self.reps, self.weight) {
            (Some(s), Some(r), Some(w)) => {
                let product = s * r * w;
                if product.is_finite() { product } else { 0.0 }
            }
            _ => 0.0,
        }
    }
}

/// One completed or in-progress exercise session.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct WorkoutRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type", default)]
    pub workout_type: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub start_time: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_opt_timestamp")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(rename = "workout_exercises", default)]
    pub exercise_entries: Vec<ExerciseEntry>,
}

impl WorkoutRecord {
    /// Sum of [`ExerciseEntry::volume`] over every entry.
    pub fn total_volume(&self) -> f64 {
        self.exercise_entries.iter().map(ExerciseEntry::volume).sum()
    }

    /// Elapsed milliseconds, when the session has been closed.
    pub fn duration_millis(&self) -> Option<i64> {
        self.end_time
            .map(|end| (end - self.start_time).num_milliseconds())
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, JsonSchema)]
pub struct NewExercise {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    /// Kilograms
    pub weight: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewWorkout {
    pub user_id: String,
    pub workout_type: String,
    pub notes: Option<String>,
    pub start_time: DateTime<Utc>,
    pub exercises: Vec<NewExercise>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    #[default]
    #[serde(alias = "snacks")]
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, JsonSchema)]
pub struct NewFood {
    pub name: String,
    pub serving_size: f64,
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewMeal {
    pub user_id: String,
    pub name: String,
    pub meal_type: MealType,
    pub notes: Option<String>,
    pub date: NaiveDate,
    pub foods: Vec<NewFood>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Meal {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub meal_type: MealType,
    #[serde(default)]
    pub notes: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub foods: Vec<NewFood>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FitnessLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl std::fmt::Display for FitnessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FitnessLevel::Beginner => "beginner",
            FitnessLevel::Intermediate => "intermediate",
            FitnessLevel::Advanced => "advanced",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, JsonSchema)]
pub struct UserProfile {
    pub id: String,
    pub full_name: Option<String>,
    /// Centimetres
    pub height: Option<f64>,
    /// Kilograms
    pub weight: Option<f64>,
    /// Kilograms
    pub goal_weight: Option<f64>,
    pub fitness_level: Option<FitnessLevel>,
}

/// Persistence collaborator backing every read and write of the application.
#[async_trait]
pub trait FitnessStore: Send + Sync + 'static {
    /// Workouts owned by `user_id` whose start time lies in `[start, end]`,
    /// each joined with its exercise entries, in the order the store returns them.
    async fn get_workouts_in_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<WorkoutRecord>, FitcoachError>;

    /// Most recent workouts first, without entries.
    async fn get_recent_workouts(
        &self,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<WorkoutRecord>, FitcoachError>;

    /// A single workout with entries and their exercise names.
    async fn get_workout(&self, workout_id: &str) -> Result<WorkoutRecord, FitcoachError>;

    async fn create_workout(&self, workout: NewWorkout) -> Result<WorkoutRecord, FitcoachError>;

    async fn create_meal(&self, meal: NewMeal) -> Result<Meal, FitcoachError>;

    /// `Ok(None)` when the user has not completed profile setup.
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, FitcoachError>;

    async fn create_profile(&self, profile: UserProfile) -> Result<UserProfile, FitcoachError>;
}
