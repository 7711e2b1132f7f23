//! Coach conversation: system prompt, profile context and the single
//! completion round-trip.

use std::sync::Arc;

use fitcoach_client::chat::{ChatMessage, ChatModel};
use fitcoach_client::{FitnessStore, UserProfile};

use crate::error::{McpError, McpResult};

pub const COACH_SYSTEM_PROMPT: &str = "You are an AI fitness coach with expertise in exercise, nutrition, and overall wellness.
Your role is to provide personalized advice based on the user's fitness level, goals, and any health considerations.

Guidelines:
1. Always prioritize safety and proper form
2. Provide evidence-based recommendations
3. Encourage sustainable habits over quick fixes
4. Be motivating and supportive
5. When discussing nutrition, focus on balanced, whole foods
6. Adapt advice based on user's fitness level and goals

Remember to:
- Ask clarifying questions when needed
- Provide specific, actionable advice
- Explain the reasoning behind recommendations
- Encourage gradual progress
- Stay within your scope of expertise

Do not:
- Provide medical diagnoses
- Recommend extreme diets or dangerous exercises
- Make promises about specific results
- Give advice about injuries or medical conditions";

/// Opening line shown by chat front-ends before the first exchange.
pub const COACH_GREETING: &str = "Hi! I'm your AI fitness coach. I can help you with workout plans, nutrition advice, and answer any fitness-related questions. How can I assist you today?";

/// The only error text callers of the coach ever see.
pub const COACH_FAILURE: &str = "Failed to process your request";

fn or_unknown(v: Option<f64>, unit: &str) -> String {
    v.map(|n| format!("{n}{unit}"))
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn profile_context(profile: &UserProfile) -> String {
    let level = profile
        .fitness_level
        .map(|l| l.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    format!(
        "User Profile:\n- Fitness Level: {level}\n- Current Weight: {}\n- Goal Weight: {}\n- Height: {}\n\nTailor your response based on this information.",
        or_unknown(profile.weight, "kg"),
        or_unknown(profile.goal_weight, "kg"),
        or_unknown(profile.height, "cm"),
    )
}

pub fn build_messages(message: &str, profile: Option<&UserProfile>) -> Vec<ChatMessage> {
    let system = match profile {
        Some(p) => format!("{COACH_SYSTEM_PROMPT}\n{}", profile_context(p)),
        None => COACH_SYSTEM_PROMPT.to_string(),
    };
    vec![ChatMessage::system(system), ChatMessage::user(message)]
}

#[derive(Clone)]
pub struct CoachService {
    store: Arc<dyn FitnessStore>,
    model: Arc<dyn ChatModel>,
}

impl CoachService {
    pub fn new(store: Arc<dyn FitnessStore>, model: Arc<dyn ChatModel>) -> Self {
        Self { store, model }
    }

    /// Answer one message. A profile that cannot be read is skipped; a model
    /// failure is logged and reported as [`COACH_FAILURE`].
    pub async fn reply(&self, message: &str, user_id: Option<&str>) -> McpResult<String> {
        if message.trim().is_empty() {
            return Err(McpError::Validation("message must not be empty".into()));
        }

        let profile = match user_id.filter(|u| !u.trim().is_empty()) {
            Some(uid) => match self.store.get_profile(uid).await {
                Ok(p) => p,
                Err(e) => {
                    tracing::debug!(user_id = uid, error = %e, "coach: profile lookup failed; answering without context");
                    None
                }
            },
            None => None,
        };

        let messages = build_messages(message, profile.as_ref());
        self.model.complete(&messages).await.map_err(|e| {
            tracing::error!(error = %e, "coach: completion failed");
            McpError::Internal(COACH_FAILURE.to_string())
        })
    }
}
