//! In-memory `FitnessStore` and `ChatModel` doubles for unit tests.
#![cfg(test)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

use fitcoach_client::chat::{ChatMessage, ChatModel};
use fitcoach_client::{
    ExerciseEntry, ExerciseInfo, FitcoachError, FitnessStore, Meal, NewMeal, NewWorkout,
    UserProfile, WorkoutRecord,
};

pub fn workout(
    id: &str,
    start: &str,
    end: Option<&str>,
    entries: Vec<ExerciseEntry>,
) -> WorkoutRecord {
    let ts = |s: &str| {
        DateTime::parse_from_rfc3339(s)
            .expect("test timestamp")
            .with_timezone(&Utc)
    };
    WorkoutRecord {
        id: id.to_string(),
        user_id: "u1".to_string(),
        workout_type: "strength".to_string(),
        start_time: ts(start),
        end_time: end.map(ts),
        notes: None,
        exercise_entries: entries,
    }
}

type Range = (String, DateTime<Utc>, DateTime<Utc>);

#[derive(Default)]
pub struct MockStore {
    workouts: Mutex<Vec<WorkoutRecord>>,
    meals: Mutex<Vec<Meal>>,
    profiles: Mutex<HashMap<String, UserProfile>>,
    last_range: Mutex<Option<Range>>,
    failing: bool,
}

impl MockStore {
    pub fn with_workouts(self, workouts: Vec<WorkoutRecord>) -> Self {
        Self {
            workouts: Mutex::new(workouts),
            ..self
        }
    }

    pub fn with_profile(self, profile: UserProfile) -> Self {
        let mut map = HashMap::new();
        map.insert(profile.id.clone(), profile);
        Self {
            profiles: Mutex::new(map),
            ..self
        }
    }

    /// Every call returns a 503 API error.
    pub fn failing(self) -> Self {
        Self {
            failing: true,
            ..self
        }
    }

    pub async fn last_range(&self) -> Option<Range> {
        self.last_range.lock().await.clone()
    }

    pub async fn meals(&self) -> Vec<Meal> {
        self.meals.lock().await.clone()
    }

    fn check(&self) -> Result<(), FitcoachError> {
        if self.failing {
            Err(FitcoachError::Api {
                status: 503,
                body: "unavailable".into(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl FitnessStore for MockStore {
    async fn get_workouts_in_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<WorkoutRecord>, FitcoachError> {
        *self.last_range.lock().await = Some((user_id.to_string(), start, end));
        self.check()?;
        Ok(self
            .workouts
            .lock()
            .await
            .iter()
            .filter(|w| w.user_id == user_id && w.start_time >= start && w.start_time <= end)
            .cloned()
            .collect())
    }

    async fn get_recent_workouts(
        &self,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<WorkoutRecord>, FitcoachError> {
        self.check()?;
        let mut rows: Vec<_> = self
            .workouts
            .lock()
            .await
            .iter()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        rows.truncate(limit.unwrap_or(5) as usize);
        Ok(rows)
    }

    async fn get_workout(&self, workout_id: &str) -> Result<WorkoutRecord, FitcoachError> {
        self.check()?;
        self.workouts
            .lock()
            .await
            .iter()
            .find(|w| w.id == workout_id)
            .cloned()
            .ok_or_else(|| FitcoachError::NotFound(format!("workout {workout_id}")))
    }

    async fn create_workout(&self, workout: NewWorkout) -> Result<WorkoutRecord, FitcoachError> {
        self.check()?;
        let mut rows = self.workouts.lock().await;
        let record = WorkoutRecord {
            id: format!("w{}", rows.len() + 1),
            user_id: workout.user_id,
            workout_type: workout.workout_type.clone(),
            start_time: workout.start_time,
            end_time: None,
            notes: workout.notes,
            exercise_entries: workout
                .exercises
                .into_iter()
                .map(|e| ExerciseEntry {
                    exercise: Some(ExerciseInfo {
                        name: e.name,
                        category: Some(workout.workout_type.clone()),
                    }),
                    ..ExerciseEntry::new(f64::from(e.sets), f64::from(e.reps), e.weight)
                })
                .collect(),
        };
        rows.push(record.clone());
        Ok(record)
    }

    async fn create_meal(&self, meal: NewMeal) -> Result<Meal, FitcoachError> {
        self.check()?;
        let mut rows = self.meals.lock().await;
        let created = Meal {
            id: format!("m{}", rows.len() + 1),
            user_id: meal.user_id,
            name: meal.name,
            meal_type: meal.meal_type,
            notes: meal.notes,
            date: meal.date,
            foods: meal.foods,
        };
        rows.push(created.clone());
        Ok(created)
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, FitcoachError> {
        self.check()?;
        Ok(self.profiles.lock().await.get(user_id).cloned())
    }

    async fn create_profile(&self, profile: UserProfile) -> Result<UserProfile, FitcoachError> {
        self.check()?;
        let mut map = self.profiles.lock().await;
        if map.contains_key(&profile.id) {
            return Err(FitcoachError::InvalidInput(format!(
                "profile {} already exists",
                profile.id
            )));
        }
        map.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }
}

/// Chat double that records every conversation it is sent.
#[derive(Default)]
pub struct MockChat {
    reply: Option<String>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockChat {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            seen: Mutex::default(),
        }
    }

    /// Every completion fails with a 500.
    pub fn broken() -> Self {
        Self::default()
    }

    pub async fn conversations(&self) -> Vec<Vec<ChatMessage>> {
        self.seen.lock().await.clone()
    }
}

#[async_trait]
impl ChatModel for MockChat {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, FitcoachError> {
        self.seen.lock().await.push(messages.to_vec());
        self.reply.clone().ok_or_else(|| FitcoachError::Api {
            status: 500,
            body: "model exploded".into(),
        })
    }
}
