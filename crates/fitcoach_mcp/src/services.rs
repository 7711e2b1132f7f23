//! Operations shared by the MCP tools and the HTTP routes.

use std::sync::Arc;

use chrono::Utc;
use fitcoach_client::chat::{ChatModel, OpenAiChatClient};
use fitcoach_client::config::Config;
use fitcoach_client::http_client::PostgrestStore;
use fitcoach_client::observability::Health;
use fitcoach_client::{FitcoachError, FitnessStore, UserProfile};

use crate::domains::coach::CoachService;
use crate::domains::stats::{local_now, parse_reference_date};
use crate::domains::meals::{MEAL_TYPES, MealSummary, build_meal};
use crate::domains::workouts::{WORKOUT_TYPES, WorkoutDetail, WorkoutSummary, build_workout};
use crate::domains::{DEFAULT_WEEKLY_GOAL, StatsAggregator, StatsWindow};
use crate::error::{McpError, McpResult};
use crate::types::{
    CoachChatParams, CoachReply, LogMealParams, LogWorkoutParams, MealResult, MealTypesResult,
    ProfileResult, SaveProfileParams, WeeklyStatsParams, WeeklyStatsResult, WorkoutListResult,
    WorkoutTypesResult,
};

#[derive(Clone)]
pub struct FitnessService {
    store: Arc<dyn FitnessStore>,
    stats: StatsAggregator,
    coach: Option<CoachService>,
    default_user: Option<String>,
}

impl FitnessService {
    pub fn new(
        store: Arc<dyn FitnessStore>,
        model: Option<Arc<dyn ChatModel>>,
        default_user: Option<String>,
    ) -> Self {
        Self {
            stats: StatsAggregator::new(store.clone()),
            coach: model.map(|m| CoachService::new(store.clone(), m)),
            store,
            default_user: default_user.filter(|u| !u.trim().is_empty()),
        }
    }

    /// Wire the PostgREST store and, when an API key is configured, the chat client.
    pub fn from_config(config: &Config) -> Self {
        let store: Arc<dyn FitnessStore> = Arc::new(PostgrestStore::new(
            &config.supabase_url,
            config.supabase_key.clone(),
        ));
        let model = config
            .llm
            .as_ref()
            .map(|llm| Arc::new(OpenAiChatClient::new(llm)) as Arc<dyn ChatModel>);
        Self::new(store, model, config.default_user_id.clone())
    }

    pub fn coach_enabled(&self) -> bool {
        self.coach.is_some()
    }

    pub fn health(&self) -> Health {
        Health::readiness(self.coach_enabled())
    }

    pub fn resolve_user(&self, user_id: Option<String>) -> McpResult<String> {
        user_id
            .filter(|u| !u.trim().is_empty())
            .or_else(|| self.default_user.clone())
            .ok_or_else(|| {
                McpError::Validation(
                    "user_id is required (or set FITCOACH_DEFAULT_USER_ID)".to_string(),
                )
            })
    }

    pub async fn weekly_stats(&self, params: WeeklyStatsParams) -> McpResult<WeeklyStatsResult> {
        let user_id = self.resolve_user(params.user_id)?;
        if params.goal == Some(0) {
            return Err(McpError::Validation("goal must be at least 1".into()));
        }
        let now = local_now();
        let reference = match params.date.as_deref().filter(|d| !d.trim().is_empty()) {
            Some(raw) => parse_reference_date(raw, *now.offset()).ok_or_else(|| {
                McpError::Validation(format!("date must be YYYY-MM-DD or RFC 3339, got {raw}"))
            })?,
            None => now,
        };
        let window = StatsWindow::containing(reference);
        let summary = self.stats.compute_weekly_stats(&user_id, reference).await;

        let goal = params.goal.unwrap_or(DEFAULT_WEEKLY_GOAL);
        let goal_progress_percent = summary.goal_progress_percent(goal);
        let daily_stats = if params.calendar_order.unwrap_or(false) {
            summary.calendar_ordered()
        } else {
            summary.daily_stats
        };

        Ok(WeeklyStatsResult {
            user_id,
            week_start: window.start.to_rfc3339(),
            week_end: window.end.to_rfc3339(),
            daily_stats,
            total_workouts: summary.total_workouts,
            average_duration_minutes: summary.average_duration_minutes,
            total_weight_lifted: summary.total_weight_lifted,
            weekly_goal: goal,
            goal_progress_percent,
        })
    }

    pub async fn recent_workouts(
        &self,
        user_id: Option<String>,
        limit: Option<u32>,
    ) -> McpResult<WorkoutListResult> {
        let user_id = self.resolve_user(user_id)?;
        if limit == Some(0) {
            return Err(McpError::Validation("limit must be at least 1".into()));
        }
        let rows = self.store.get_recent_workouts(&user_id, limit).await?;
        Ok(WorkoutListResult {
            workouts: rows.iter().map(WorkoutSummary::from).collect(),
        })
    }

    pub async fn workout_detail(&self, workout_id: &str) -> McpResult<WorkoutDetail> {
        let id = workout_id.trim();
        if id.is_empty() {
            return Err(McpError::Validation("workout_id must not be empty".into()));
        }
        match self.store.get_workout(id).await {
            Ok(w) => Ok(WorkoutDetail::from(&w)),
            Err(FitcoachError::NotFound(_)) => Err(McpError::NotFound(format!("workout {id}"))),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn log_workout(&self, params: LogWorkoutParams) -> McpResult<WorkoutDetail> {
        let user_id = self.resolve_user(params.user_id)?;
        let new = build_workout(
            user_id,
            params.workout_type.as_deref(),
            params.notes,
            params.start_time.as_deref(),
            params.exercises,
            Utc::now(),
        )?;
        let created = self.store.create_workout(new).await?;
        tracing::info!(workout_id = %created.id, entries = created.exercise_entries.len(), "workout logged");
        Ok(WorkoutDetail::from(&created))
    }

    pub fn workout_types(&self) -> WorkoutTypesResult {
        WorkoutTypesResult {
            workout_types: WORKOUT_TYPES.to_vec(),
        }
    }

    pub async fn log_meal(&self, params: LogMealParams) -> McpResult<MealResult> {
        let user_id = self.resolve_user(params.user_id)?;
        let new = build_meal(
            user_id,
            &params.name,
            params.meal_type,
            params.notes,
            params.date.as_deref(),
            params.foods,
            local_now().date_naive(),
        )?;
        let created = self.store.create_meal(new).await?;
        tracing::info!(meal_id = %created.id, foods = created.foods.len(), "meal logged");
        Ok(MealResult {
            meal: MealSummary::from(&created),
        })
    }

    pub fn meal_types(&self) -> MealTypesResult {
        MealTypesResult {
            meal_types: MEAL_TYPES.to_vec(),
        }
    }

    pub async fn profile(&self, user_id: Option<String>) -> McpResult<ProfileResult> {
        let user_id = self.resolve_user(user_id)?;
        let profile = self.store.get_profile(&user_id).await?;
        Ok(ProfileResult { profile })
    }

    pub async fn save_profile(&self, params: SaveProfileParams) -> McpResult<ProfileResult> {
        let id = self.resolve_user(params.user_id)?;
        let measurements = [params.height, params.weight, params.goal_weight];
        if measurements.iter().flatten().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(McpError::Validation(
                "height, weight and goal_weight must be positive numbers".into(),
            ));
        }
        let saved = self
            .store
            .create_profile(UserProfile {
                id,
                full_name: params.full_name.filter(|n| !n.trim().is_empty()),
                height: params.height,
                weight: params.weight,
                goal_weight: params.goal_weight,
                fitness_level: params.fitness_level,
            })
            .await?;
        Ok(ProfileResult {
            profile: Some(saved),
        })
    }

    pub async fn coach_chat(&self, params: CoachChatParams) -> McpResult<CoachReply> {
        let coach = self.coach.as_ref().ok_or_else(|| {
            McpError::Unavailable("coach chat is disabled (OPENAI_API_KEY not set)".into())
        })?;
        let user_id = params
            .user_id
            .filter(|u| !u.trim().is_empty())
            .or_else(|| self.default_user.clone());
        let message = coach.reply(&params.message, user_id.as_deref()).await?;
        Ok(CoachReply { message })
    }
}
