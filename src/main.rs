//! Career Pathfinder - Entry Point

use career_pathfinder::{Config, PathfinderServer};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// `RUST_LOG` directives, or `info` when unset or unparseable
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Parse args
    let args: Vec<String> = std::env::args().collect();
    let json_logs = args.iter().any(|a| a == "--json");
    let help_mode = args.iter().any(|a| a == "--help" || a == "-h");

    if help_mode {
        println!("Career Pathfinder v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Usage: career-pathfinder [OPTIONS]");
        println!();
        println!("Options:");
        println!("  --json      Log as JSON");
        println!("  --help, -h  Show this help");
        println!();
        println!("Environment variables:");
        println!("  GROQ_API_KEY                Groq API key");
        println!("  GROQ_BASE_URL               OpenAI-compatible endpoint");
        println!("  TAVILY_API_KEY              Tavily web search key");
        println!("  PATHFINDER_FAST_MODEL       Quiz and level model (default: llama3-8b-8192)");
        println!("  PATHFINDER_RESEARCH_MODEL   Track and roadmap model (default: llama-3.3-70b-versatile)");
        println!("  PATHFINDER_DB_PATH          SQLite database path");
        println!("  PATHFINDER_BIND_ADDR        Listen address (default: 127.0.0.1)");
        println!("  PATHFINDER_PORT             Listen port (default: 8000)");
        println!("  PATHFINDER_MAX_ATTEMPTS     Model attempts per agent call (default: 3)");
        println!("  PATHFINDER_BACKOFF_SECS     Retry backoff base (default: 2)");
        println!("  PATHFINDER_RESUME_PATH      Resume used to tailor questions (default: data/resume.txt)");
        println!("  PATHFINDER_MAX_TOOL_ROUNDS  Web search rounds per call (default: 5)");
        return Ok(());
    }

    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = log_filter(rust_log.as_deref());

    if json_logs {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_ansi(false)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_ansi(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    info!("Career Pathfinder v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    let server = PathfinderServer::from_config(config)?;
    server.run().await?;

    Ok(())
}
