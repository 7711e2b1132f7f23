use fitcoach_client::config::Config;
use fitcoach_mcp::{FitcoachMcpHandler, FitnessService, log_filter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = log_filter(|k| std::env::var(k).ok());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,rmcp=warn,serve_inner=warn"));
    // stdout carries the MCP protocol
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    tracing::info!("fitcoach_mcp: log filter: {}", filter);

    let config = Config::from_env()?;
    let service = FitnessService::from_config(&config);
    if !service.coach_enabled() {
        tracing::info!("fitcoach_mcp: OPENAI_API_KEY not set; coach_chat disabled");
    }
    let handler = FitcoachMcpHandler::new(service);

    tracing::info!(
        "fitcoach_mcp: registered {} tools and {} prompts",
        handler.tool_count(),
        handler.prompt_count()
    );
    tracing::info!("fitcoach_mcp: starting stdio MCP server...");

    use rmcp::serve_server;
    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let server = serve_server(handler, transport).await?;

    tracing::info!("fitcoach_mcp: service initialized as server");

    server.waiting().await?;

    Ok(())
}
