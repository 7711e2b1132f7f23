use fitcoach_client::{FitnessStore, config::Config, http_client::PostgrestStore};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: expects FITCOACH_SUPABASE_URL, FITCOACH_SUPABASE_ANON_KEY and
    // FITCOACH_DEFAULT_USER_ID in env
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    let Some(user_id) = cfg.default_user_id.clone() else {
        eprintln!("FITCOACH_DEFAULT_USER_ID not set");
        return Ok(());
    };
    let store = PostgrestStore::new(&cfg.supabase_url, cfg.supabase_key);
    for w in store.get_recent_workouts(&user_id, None).await? {
        println!(
            "{} {} {} ({:.0} kg)",
            w.start_time.format("%Y-%m-%d"),
            w.workout_type,
            w.id,
            w.total_volume()
        );
    }
    Ok(())
}
