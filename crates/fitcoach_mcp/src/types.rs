use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use fitcoach_client::{FitnessLevel, MealType, NewExercise, NewFood, UserProfile};

use crate::domains::meals::{MealSummary, MealTypeInfo};
use crate::domains::stats::DailyStat;
use crate::domains::workouts::{WorkoutSummary, WorkoutTypeInfo};

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct UserParam {
    /// Falls back to the server's default user when omitted
    #[serde(default, alias = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct WeeklyStatsParams {
    #[serde(default, alias = "userId")]
    pub user_id: Option<String>,
    /// Any instant in the week: YYYY-MM-DD or RFC 3339 (default: now)
    #[serde(default)]
    pub date: Option<String>,
    /// List days Monday to Sunday instead of first-logged order
    #[serde(default)]
    pub calendar_order: Option<bool>,
    /// Workouts per week to measure progress against (default: 7)
    #[serde(default)]
    pub goal: Option<u32>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct WeeklyStatsResult {
    pub user_id: String,
    /// RFC 3339, inclusive
    pub week_start: String,
    /// RFC 3339, inclusive
    pub week_end: String,
    pub daily_stats: Vec<DailyStat>,
    pub total_workouts: u32,
    pub average_duration_minutes: f64,
    pub total_weight_lifted: f64,
    pub weekly_goal: u32,
    pub goal_progress_percent: f64,
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct RecentWorkoutsParams {
    #[serde(default, alias = "userId")]
    pub user_id: Option<String>,
    /// Maximum rows (default: 5)
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct WorkoutListResult {
    pub workouts: Vec<WorkoutSummary>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct WorkoutIdParam {
    pub workout_id: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct LogWorkoutParams {
    #[serde(default, alias = "userId")]
    pub user_id: Option<String>,
    /// strength, cardio, hiit or any other label (default: strength)
    #[serde(default, rename = "type", alias = "workout_type")]
    pub workout_type: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// RFC 3339 (default: now)
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub exercises: Vec<NewExercise>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct WorkoutTypesResult {
    pub workout_types: Vec<WorkoutTypeInfo>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct LogMealParams {
    #[serde(default, alias = "userId")]
    pub user_id: Option<String>,
    pub name: String,
    /// breakfast, lunch, dinner or snack (default: snack)
    #[serde(default)]
    pub meal_type: Option<MealType>,
    #[serde(default)]
    pub notes: Option<String>,
    /// YYYY-MM-DD (default: today)
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub foods: Vec<NewFood>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct MealTypesResult {
    pub meal_types: Vec<MealTypeInfo>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct MealResult {
    pub meal: MealSummary,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct SaveProfileParams {
    #[serde(default, alias = "userId")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    /// Centimetres
    #[serde(default)]
    pub height: Option<f64>,
    /// Kilograms
    #[serde(default)]
    pub weight: Option<f64>,
    /// Kilograms
    #[serde(default)]
    pub goal_weight: Option<f64>,
    #[serde(default)]
    pub fitness_level: Option<FitnessLevel>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ProfileResult {
    /// Absent until the user has completed profile setup
    pub profile: Option<UserProfile>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct CoachChatParams {
    pub message: String,
    #[serde(default, alias = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CoachReply {
    pub message: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct WeeklyReviewParams {
    /// Any day in the week to review (default: this week)
    #[serde(default)]
    pub date: Option<String>,
    /// Workouts per week the user is aiming for (default: 7)
    #[serde(default)]
    pub goal: Option<u32>,
}
