/// Startup wiring shared by the stdio and HTTP binaries: log filter, config
/// and handler construction.
use fitcoach_client::config::Config;
use fitcoach_mcp::{FitcoachMcpHandler, FitnessService, log_filter};
use serial_test::serial;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let owned: Vec<(String, String)> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| owned.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
}

#[test]
fn test_log_level_prefers_fitcoach_variable() {
    let get = env_of(&[("FITCOACH_LOG_LEVEL", "debug"), ("RUST_LOG", "trace")]);
    assert_eq!(log_filter(get), "debug,rmcp=warn,serve_inner=warn");
}

#[test]
fn test_log_level_falls_back_to_rust_log_then_info() {
    assert_eq!(
        log_filter(env_of(&[("RUST_LOG", "warn")])),
        "warn,rmcp=warn,serve_inner=warn"
    );
    assert_eq!(log_filter(env_of(&[])), "info,rmcp=warn,serve_inner=warn");
}

#[test]
fn test_blank_log_level_falls_through_to_rust_log() {
    let get = env_of(&[("FITCOACH_LOG_LEVEL", "  "), ("RUST_LOG", "debug")]);
    assert_eq!(log_filter(get), "debug,rmcp=warn,serve_inner=warn");
    let get = env_of(&[("FITCOACH_LOG_LEVEL", ""), ("RUST_LOG", "")]);
    assert_eq!(log_filter(get), "info,rmcp=warn,serve_inner=warn");
}

#[test]
fn test_env_filter_creation() {
    for level in ["trace", "debug", "info", "warn", "error"] {
        let filter = log_filter(env_of(&[("FITCOACH_LOG_LEVEL", level)]));
        assert!(tracing_subscriber::EnvFilter::try_new(&filter).is_ok());
    }
}

#[test]
fn test_env_filter_fallback() {
    let filter = log_filter(env_of(&[("FITCOACH_LOG_LEVEL", "invalid[[[filter")]));
    let env_filter = tracing_subscriber::EnvFilter::try_new(&filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,rmcp=warn,serve_inner=warn"));
    assert!(!format!("{:?}", env_filter).is_empty());
}

#[test]
fn test_handler_initialization_without_coach() {
    let cfg = Config::from_env_with(env_of(&[
        ("FITCOACH_SUPABASE_URL", "http://localhost:54321"),
        ("FITCOACH_SUPABASE_ANON_KEY", "anon"),
    ]))
    .expect("config");
    let service = FitnessService::from_config(&cfg);
    assert!(!service.coach_enabled());

    let handler = FitcoachMcpHandler::new(service);
    assert_eq!(handler.tool_count(), 10);
    assert_eq!(handler.prompt_count(), 1);
}

#[test]
fn test_coach_enabled_by_api_key() {
    let cfg = Config::from_env_with(env_of(&[
        ("FITCOACH_SUPABASE_URL", "http://localhost:54321"),
        ("FITCOACH_SUPABASE_ANON_KEY", "anon"),
        ("OPENAI_API_KEY", "sk-test"),
    ]))
    .expect("config");
    assert!(FitnessService::from_config(&cfg).coach_enabled());
}

#[test]
#[serial]
fn test_process_env_is_read() {
    // SAFETY: serialised with every other test that touches the environment
    unsafe {
        std::env::set_var("FITCOACH_SUPABASE_URL", "http://127.0.0.1:9");
        std::env::set_var("FITCOACH_SUPABASE_ANON_KEY", "anon");
        std::env::set_var("FITCOACH_DEFAULT_USER_ID", "u-env");
    }
    let cfg = Config::from_env();
    unsafe {
        std::env::remove_var("FITCOACH_SUPABASE_URL");
        std::env::remove_var("FITCOACH_SUPABASE_ANON_KEY");
        std::env::remove_var("FITCOACH_DEFAULT_USER_ID");
    }
    let cfg = cfg.expect("config from process env");
    assert_eq!(cfg.default_user_id.as_deref(), Some("u-env"));
    let service = FitnessService::from_config(&cfg);
    assert_eq!(service.resolve_user(None).unwrap(), "u-env");
}

#[test]
#[serial]
fn test_missing_supabase_url_is_a_config_error() {
    unsafe {
        std::env::remove_var("FITCOACH_SUPABASE_URL");
    }
    assert!(Config::from_env().is_err());
}
