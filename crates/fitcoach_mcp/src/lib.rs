use rmcp::Json;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    AnnotateAble, GetPromptRequestParams, GetPromptResult, ListPromptsResult, ListResourcesResult,
    PaginatedRequestParam, PaginatedRequestParams, RawResource, ReadResourceRequestParam,
    ReadResourceResult, ResourceContents,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer};
use rmcp::{prompt, prompt_handler, prompt_router, tool, tool_handler, tool_router};

pub mod domains;
pub mod error;
pub mod http;
mod prompts;
pub mod services;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use error::{McpError, McpResult};
pub use services::FitnessService;

use domains::DEFAULT_WEEKLY_GOAL;
use domains::workouts::WorkoutDetail;
use types::{
    CoachChatParams, CoachReply, LogMealParams, LogWorkoutParams, MealResult, MealTypesResult,
    ProfileResult, RecentWorkoutsParams, SaveProfileParams, UserParam, WeeklyReviewParams,
    WeeklyStatsParams, WeeklyStatsResult, WorkoutIdParam, WorkoutListResult, WorkoutTypesResult,
};

pub const PROFILE_RESOURCE_URI: &str = "fitcoach://profile";

/// Tracing filter for both binaries: `FITCOACH_LOG_LEVEL`, else `RUST_LOG`,
/// else `info`, with rmcp internals held at `warn`.
pub fn log_filter<F>(get: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let set = |key: &str| get(key).filter(|v| !v.trim().is_empty());
    let level = set("FITCOACH_LOG_LEVEL")
        .or_else(|| set("RUST_LOG"))
        .unwrap_or_else(|| "info".to_string());
    format!("{level},rmcp=warn,serve_inner=warn")
}

#[derive(Clone)]
pub struct FitcoachMcpHandler {
    service: FitnessService,
    tool_router: rmcp::handler::server::tool::ToolRouter<FitcoachMcpHandler>,
    prompt_router: rmcp::handler::server::router::prompt::PromptRouter<FitcoachMcpHandler>,
}

#[tool_router]
#[prompt_router]
impl FitcoachMcpHandler {
    pub fn new(service: FitnessService) -> Self {
        Self {
            service,
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
        }
    }

    pub fn tool_count(&self) -> usize {
        self.tool_router.list_all().len()
    }

    pub fn prompt_count(&self) -> usize {
        self.prompt_router.list_all().len()
    }

    #[tool(
        name = "get_weekly_stats",
        description = "Workout count, weight lifted and average duration for the Monday-Sunday week around a date, with per-day breakdown and goal progress"
    )]
    async fn get_weekly_stats(
        &self,
        params: Parameters<WeeklyStatsParams>,
    ) -> Result<Json<WeeklyStatsResult>, String> {
        self.service
            .weekly_stats(params.0)
            .await
            .map(Json)
            .map_err(String::from)
    }

    #[tool(
        name = "get_recent_workouts",
        description = "List the most recent workouts, newest first"
    )]
    async fn get_recent_workouts(
        &self,
        params: Parameters<RecentWorkoutsParams>,
    ) -> Result<Json<WorkoutListResult>, String> {
        let p = params.0;
        self.service
            .recent_workouts(p.user_id, p.limit)
            .await
            .map(Json)
            .map_err(String::from)
    }

    #[tool(
        name = "get_workout",
        description = "Get one workout with its exercises"
    )]
    async fn get_workout(
        &self,
        params: Parameters<WorkoutIdParam>,
    ) -> Result<Json<WorkoutDetail>, String> {
        self.service
            .workout_detail(&params.0.workout_id)
            .await
            .map(Json)
            .map_err(String::from)
    }

    #[tool(
        name = "log_workout",
        description = "Record a workout and its exercises; unknown exercises are added to the catalogue"
    )]
    async fn log_workout(
        &self,
        params: Parameters<LogWorkoutParams>,
    ) -> Result<Json<WorkoutDetail>, String> {
        self.service
            .log_workout(params.0)
            .await
            .map(Json)
            .map_err(String::from)
    }

    #[tool(name = "list_workout_types", description = "List suggested workout types")]
    async fn list_workout_types(&self) -> Result<Json<WorkoutTypesResult>, String> {
        Ok(Json(self.service.workout_types()))
    }

    #[tool(
        name = "log_meal",
        description = "Record a meal with its foods and macros"
    )]
    async fn log_meal(&self, params: Parameters<LogMealParams>) -> Result<Json<MealResult>, String> {
        self.service
            .log_meal(params.0)
            .await
            .map(Json)
            .map_err(String::from)
    }

    #[tool(
        name = "list_meal_types",
        description = "List meal types with their usual time of day"
    )]
    async fn list_meal_types(&self) -> Result<Json<MealTypesResult>, String> {
        Ok(Json(self.service.meal_types()))
    }

    #[tool(name = "get_profile", description = "Get the user's fitness profile")]
    async fn get_profile(&self, params: Parameters<UserParam>) -> Result<Json<ProfileResult>, String> {
        self.service
            .profile(params.0.user_id)
            .await
            .map(Json)
            .map_err(String::from)
    }

    #[tool(
        name = "save_profile",
        description = "Create the user's fitness profile (height, weight, goal weight, fitness level)"
    )]
    async fn save_profile(
        &self,
        params: Parameters<SaveProfileParams>,
    ) -> Result<Json<ProfileResult>, String> {
        self.service
            .save_profile(params.0)
            .await
            .map(Json)
            .map_err(String::from)
    }

    #[tool(
        name = "coach_chat",
        description = "Ask the AI fitness coach a question; answers are tailored to the user's profile when one exists"
    )]
    async fn coach_chat(
        &self,
        params: Parameters<CoachChatParams>,
    ) -> Result<Json<CoachReply>, String> {
        self.service
            .coach_chat(params.0)
            .await
            .map(Json)
            .map_err(String::from)
    }

    /// Weekly progress review built on the stats tools
    #[prompt(
        name = "weekly-review",
        description = "Review a week of training against a workouts-per-week goal"
    )]
    async fn weekly_review(&self, params: Parameters<WeeklyReviewParams>) -> GetPromptResult {
        let goal = params.0.goal.unwrap_or(DEFAULT_WEEKLY_GOAL);
        prompts::weekly_review_prompt(params.0.date.as_deref(), goal)
    }

    async fn profile_resource_text(&self) -> McpResult<String> {
        let profile = self.service.profile(None).await?;
        let stats = self.service.weekly_stats(WeeklyStatsParams::default()).await?;
        let body = serde_json::json!({
            "profile": profile.profile,
            "this_week": stats,
        });
        Ok(serde_json::to_string_pretty(&body)?)
    }
}

#[tool_handler]
#[prompt_handler(router = self.prompt_router)]
impl rmcp::ServerHandler for FitcoachMcpHandler {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo::new(
            rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .enable_resources()
                .build(),
        )
        .with_instructions(
            "Fitness coach MCP server - log workouts and meals, review weekly training \
             statistics, manage the fitness profile and ask the AI coach for advice.",
        )
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        let mut res = RawResource::new(PROFILE_RESOURCE_URI, "Fitness Profile").no_annotation();
        res.description =
            Some("Default user's profile together with this week's training statistics".to_string());
        res.mime_type = Some("application/json".to_string());

        Ok(ListResourcesResult {
            resources: vec![res],
            next_cursor: None,
            meta: None,
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        if request.uri != PROFILE_RESOURCE_URI {
            return Err(ErrorData::invalid_params(
                format!("Unknown resource URI: {}", request.uri),
                None,
            ));
        }
        let text = self
            .profile_resource_text()
            .await
            .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;
        Ok(ReadResourceResult::new(vec![
            ResourceContents::TextResourceContents {
                uri: request.uri.clone(),
                mime_type: Some("application/json".to_string()),
                text,
                meta: None,
            },
        ]))
    }
}
