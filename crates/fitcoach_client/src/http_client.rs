//! PostgREST (Supabase) implementation of [`FitnessStore`](crate::FitnessStore).
//!
//! Every table is addressed as `{base_url}/rest/v1/{table}` and authenticated
//! with the project's anon key in both the `apikey` and bearer headers.

use crate::observability::record_store_request;
use crate::retry::RetryPolicy;
use crate::utils::deserialize_id;
use crate::{
    ExerciseEntry, ExerciseInfo, FitcoachError, FitnessStore, Meal, NewExercise, NewFood, NewMeal,
    NewWorkout, UserProfile, WorkoutRecord,
};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use futures_util::future::try_join_all;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

pub const DEFAULT_RECENT_LIMIT: u32 = 5;

const WEEKLY_SELECT: &str = "*,workout_exercises(sets,reps,weight)";
const DETAIL_SELECT: &str = "*,workout_exercises(sets,reps,weight,exercise:exercises(name,category))";

#[derive(Debug, Deserialize)]
struct IdRow {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,
}

/// Store client for a Supabase project, using reqwest.
#[derive(Clone, Debug)]
pub struct PostgrestStore {
    base_url: String,
    api_key: SecretString,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl PostgrestStore {
    /// Create a new store instance.
    ///
    /// # Arguments
    /// * `base_url` - The project URL (e.g., "https://xyz.supabase.co")
    /// * `api_key` - The project's anon key
    pub fn new(base_url: &str, api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy used for reads.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Build an authenticated GET request.
    fn get_request(&self, table: &str) -> reqwest::RequestBuilder {
        let key = self.api_key.expose_secret();
        self.client
            .get(self.table_url(table))
            .header("apikey", key)
            .bearer_auth(key)
    }

    /// Build an authenticated POST request that returns the inserted rows.
    fn post_request(&self, table: &str) -> reqwest::RequestBuilder {
        let key = self.api_key.expose_secret();
        self.client
            .post(self.table_url(table))
            .header("apikey", key)
            .bearer_auth(key)
            .header("Prefer", "return=representation")
    }

    /// Select rows from `table`; transient failures are retried.
    async fn select_rows<T: DeserializeOwned>(
        &self,
        table: &'static str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, FitcoachError> {
        tracing::debug!(table, ?query, "store select");
        let result = self
            .retry
            .retry_async_if(
                || async move {
                    let resp = self.get_request(table).query(query).send().await?;
                    self.handle_response::<Vec<T>>(resp).await
                },
                FitcoachError::is_transient,
            )
            .await;
        record_store_request(table, result.is_ok());
        result
    }

    /// Insert one row into `table` and return its representation.
    async fn insert_row<T: DeserializeOwned>(
        &self,
        table: &'static str,
        body: serde_json::Value,
    ) -> Result<T, FitcoachError> {
        tracing::debug!(table, "store insert");
        let result = async {
            let resp = self.post_request(table).json(&body).send().await?;
            let mut rows: Vec<T> = self.handle_response(resp).await?;
            if rows.is_empty() {
                return Err(FitcoachError::Api {
                    status: 200,
                    body: format!("insert into {table} returned no rows"),
                });
            }
            Ok(rows.swap_remove(0))
        }
        .await;
        record_store_request(table, result.is_ok());
        result
    }

    /// Handle a response, converting status codes to appropriate errors.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, FitcoachError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(self.error_from_response(resp).await);
        }
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> FitcoachError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let body_snippet: String = body.chars().take(256).collect();
        FitcoachError::from_status(status, body_snippet)
    }

    /// Look an exercise up by name, creating it under `category` when absent.
    async fn find_or_create_exercise(
        &self,
        name: &str,
        category: &str,
    ) -> Result<String, FitcoachError> {
        let existing: Vec<IdRow> = self
            .select_rows(
                "exercises",
                &[
                    ("select", "id".to_string()),
                    ("name", format!("eq.{name}")),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        if let Some(row) = existing.into_iter().next() {
            return Ok(row.id);
        }
        let created: IdRow = self
            .insert_row("exercises", json!({ "name": name, "category": category }))
            .await?;
        Ok(created.id)
    }

    async fn insert_entry(
        &self,
        workout_id: &str,
        category: &str,
        exercise: &NewExercise,
    ) -> Result<ExerciseEntry, FitcoachError> {
        let exercise_id = self.find_or_create_exercise(&exercise.name, category).await?;
        let _: serde_json::Value = self
            .insert_row(
                "workout_exercises",
                json!({
                    "workout_id": workout_id,
                    "exercise_id": exercise_id,
                    "sets": exercise.sets,
                    "reps": exercise.reps,
                    "weight": exercise.weight,
                }),
            )
            .await?;
        Ok(ExerciseEntry {
            sets: Some(f64::from(exercise.sets)),
            reps: Some(f64::from(exercise.reps)),
            weight: Some(exercise.weight),
            exercise: Some(ExerciseInfo {
                name: exercise.name.clone(),
                category: Some(category.to_string()),
            }),
        })
    }

    async fn insert_food(&self, meal_id: &str, food: &NewFood) -> Result<(), FitcoachError> {
        let item: IdRow = self
            .insert_row(
                "food_items",
                json!({
                    "name": food.name,
                    "calories": food.calories,
                    "protein": food.protein,
                    "carbs": food.carbs,
                    "fat": food.fat,
                }),
            )
            .await?;
        let _: serde_json::Value = self
            .insert_row(
                "meal_foods",
                json!({
                    "meal_id": meal_id,
                    "food_id": item.id,
                    "serving_size": food.serving_size,
                }),
            )
            .await?;
        Ok(())
    }
}

fn timestamp_param(op: &str, ts: DateTime<Utc>) -> String {
    format!("{op}.{}", ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[async_trait]
impl FitnessStore for PostgrestStore {
    async fn get_workouts_in_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<WorkoutRecord>, FitcoachError> {
        self.select_rows(
            "workouts",
            &[
                ("select", WEEKLY_SELECT.to_string()),
                ("user_id", format!("eq.{user_id}")),
                ("start_time", timestamp_param("gte", start)),
                ("start_time", timestamp_param("lte", end)),
            ],
        )
        .await
    }

    async fn get_recent_workouts(
        &self,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<WorkoutRecord>, FitcoachError> {
        let limit = limit.unwrap_or(DEFAULT_RECENT_LIMIT);
        self.select_rows(
            "workouts",
            &[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{user_id}")),
                ("order", "start_time.desc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn get_workout(&self, workout_id: &str) -> Result<WorkoutRecord, FitcoachError> {
        let rows: Vec<WorkoutRecord> = self
            .select_rows(
                "workouts",
                &[
                    ("select", DETAIL_SELECT.to_string()),
                    ("id", format!("eq.{workout_id}")),
                ],
            )
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| FitcoachError::NotFound(format!("workout {workout_id}")))
    }

    async fn create_workout(&self, workout: NewWorkout) -> Result<WorkoutRecord, FitcoachError> {
        let mut record: WorkoutRecord = self
            .insert_row(
                "workouts",
                json!({
                    "user_id": workout.user_id,
                    "type": workout.workout_type,
                    "notes": workout.notes,
                    "start_time": workout.start_time.to_rfc3339_opts(SecondsFormat::Millis, true),
                }),
            )
            .await?;

        let entries = try_join_all(
            workout
                .exercises
                .iter()
                .map(|e| self.insert_entry(&record.id, &workout.workout_type, e)),
        )
        .await?;
        tracing::info!(
            workout_id = %record.id,
            entries = entries.len(),
            "workout created"
        );
        record.exercise_entries = entries;
        Ok(record)
    }

    async fn create_meal(&self, meal: NewMeal) -> Result<Meal, FitcoachError> {
        let mut record: Meal = self
            .insert_row(
                "meals",
                json!({
                    "user_id": meal.user_id,
                    "name": meal.name,
                    "meal_type": meal.meal_type.as_str(),
                    "notes": meal.notes,
                    "date": meal.date.format("%Y-%m-%d").to_string(),
                }),
            )
            .await?;

        try_join_all(meal.foods.iter().map(|f| self.insert_food(&record.id, f))).await?;
        tracing::info!(meal_id = %record.id, foods = meal.foods.len(), "meal logged");
        record.foods = meal.foods;
        Ok(record)
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, FitcoachError> {
        let rows: Vec<UserProfile> = self
            .select_rows(
                "user_profiles",
                &[
                    ("select", "*".to_string()),
                    ("id", format!("eq.{user_id}")),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn create_profile(&self, profile: UserProfile) -> Result<UserProfile, FitcoachError> {
        let body = serde_json::to_value(&profile)?;
        self.insert_row("user_profiles", body).await
    }
}
