//! memos CLI: run the memory hooks around an echo LLM over stdin, show loaded config.
//! Config from env and optional CLI args.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use memory_inmemory::InMemoryMemoryClient;
use memos_core::{
    init_tracing, InMemoryConversationManager, LlmHook, LlmResponse, MemoryClient, MessageEvent,
    ProviderRequest, UnifiedMsgOrigin,
};
use memos_middleware::{MemosConfig, MemosMiddleware};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// How long to wait for background saves on exit.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "memos")]
#[command(about = "MemOS memory middleware CLI: chat, config", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read prompts from stdin, inject memories, answer with an echo LLM, save the exchange.
    Chat {
        #[arg(long, default_value = "cli")]
        platform: String,
        #[arg(long, default_value = "FriendMessage")]
        message_type: String,
        #[arg(short, long, default_value = "local")]
        session: String,
        /// Target model name; selects prompt framing (qwen / gemini / default).
        #[arg(short, long)]
        model: Option<String>,
        /// Run without a memory client even if MEMOS_API_KEY is set.
        #[arg(long)]
        degraded: bool,
    },
    /// Print the config loaded from env (API key masked).
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = MemosConfig::load()?;
    config.validate()?;

    match cli.command {
        Commands::Chat {
            platform,
            message_type,
            session,
            model,
            degraded,
        } => {
            init_tracing(Some(&config.log_file), &config.log_level)
                .context("Initialize tracing (check LOG_FILE and MEMOS_LOG_LEVEL)")?;
            let origin = UnifiedMsgOrigin::new(platform, message_type, session);
            handle_chat(config, origin, model, degraded).await
        }
        Commands::Config => {
            print_config(&config);
            Ok(())
        }
    }
}

fn mask(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{}****", visible)
}

fn print_config(config: &MemosConfig) {
    println!(
        "api_key:          {}",
        config.api_key.as_deref().map(mask).unwrap_or_else(|| "(unset)".to_string())
    );
    println!("base_url:         {}", config.base_url);
    println!("memory_limit:     {}", config.memory_limit);
    println!("prompt_language:  {}", config.prompt_language);
    println!("pending_ttl_secs: {}", config.pending_ttl_secs);
    println!("log_file:         {}", config.log_file);
    println!("log_level:        {}", config.log_level);
}

/// The API key gates the memory client like in a real host; `degraded` overrides it.
fn build_middleware(config: MemosConfig, degraded: bool) -> MemosMiddleware {
    let conversations = Arc::new(InMemoryConversationManager::new());
    if degraded {
        return MemosMiddleware::new(config, None, conversations);
    }
    MemosMiddleware::from_config(config, conversations, |_| {
        let client: Arc<dyn MemoryClient> = Arc::new(InMemoryMemoryClient::new());
        Ok(client)
    })
}

/// Handle the chat command.
///
/// Each stdin line is one exchange: request hook, echo reply, response hook. With MEMOS_API_KEY set
/// the in-memory memory client is used, so memories saved earlier in the session are injected into
/// later prompts; without it the hooks run in degraded mode.
async fn handle_chat(
    config: MemosConfig,
    origin: UnifiedMsgOrigin,
    model: Option<String>,
    degraded: bool,
) -> Result<()> {
    let middleware = build_middleware(config, degraded);
    if !middleware.is_enabled() {
        println!("Memory disabled (set MEMOS_API_KEY or drop --degraded); prompts pass through.");
    }
    let hook: &dyn LlmHook = &middleware;

    println!("Type a message per line; Ctrl-D to exit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event = MessageEvent::new(origin.clone(), line);
        let mut request = ProviderRequest::new(line, model.clone());
        hook.on_llm_request(&event, &mut request).await;
        println!("--- prompt sent to LLM ---\n{}\n", request.prompt);

        let response = LlmResponse::new(format!("(echo) {}", line));
        println!("--- LLM reply ---\n{}\n", response.completion_text);

        hook.on_llm_response(&event, &response, Some(&mut request)).await;
        println!("--- prompt kept in history ---\n{}\n", request.prompt);
    }

    let aborted = middleware.shutdown(SHUTDOWN_GRACE).await;
    info!(aborted, "memos chat finished");
    Ok(())
}
