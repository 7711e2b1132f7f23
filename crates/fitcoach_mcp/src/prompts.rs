use rmcp::model::{GetPromptResult, PromptMessage, PromptMessageRole};

pub fn weekly_review_prompt(date: Option<&str>, goal: u32) -> GetPromptResult {
    let week = date
        .map(|d| format!("the week containing {d}"))
        .unwrap_or_else(|| "this week".to_string());
    let date_arg = date
        .map(|d| format!(" with date={d}"))
        .unwrap_or_default();
    GetPromptResult::new(vec![PromptMessage::new_text(
            PromptMessageRole::User,
            format!(
                "Review my training for {week}. My goal is {goal} workouts per week.\n\nInclude:\n1. Workouts completed and progress toward the goal\n2. Which days I trained and how the load was spread\n3. Total weight lifted and average session length\n4. Suggestions for the rest of the week, adjusted to my fitness level\n\nUse get_weekly_stats{date_arg} and goal={goal}, get_recent_workouts for context on the latest sessions, and get_profile to tailor advice to my level and goal weight. Keep recommendations safe and gradual."
            ),
        )])
    .with_description(format!("Training review for {week}"))
}
