use fitcoach_client::config::Config;
use fitcoach_mcp::FitnessService;
use fitcoach_mcp::types::WeeklyStatsParams;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: expects FITCOACH_SUPABASE_URL, FITCOACH_SUPABASE_ANON_KEY and
    // FITCOACH_DEFAULT_USER_ID in env; an optional first argument picks the week
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    let service = FitnessService::from_config(&cfg);
    let stats = service
        .weekly_stats(WeeklyStatsParams {
            date: std::env::args().nth(1),
            calendar_order: Some(true),
            ..Default::default()
        })
        .await?;

    println!("week {} .. {}", stats.week_start, stats.week_end);
    for day in &stats.daily_stats {
        println!(
            "  {}: {} workout(s), {:.0} kg",
            day.day, day.workout_count, day.total_weight
        );
    }
    println!(
        "total {} workouts, {:.0} kg, avg {:.1} min, goal {:.0}%",
        stats.total_workouts,
        stats.total_weight_lifted,
        stats.average_duration_minutes,
        stats.goal_progress_percent
    );
    Ok(())
}
