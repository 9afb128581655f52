mod pages;
mod routes;

use chrono::Utc;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use summarize_core::{
    GenerativeClient, Mode, OpenAiClient, OpenAiConfig, RankingAlgorithm, RemoteError,
    RemoteSummarizer, SummarizerConfig, SummaryOptions, SummaryOrchestrator,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "summarize-web", version)]
struct Cli {
    /// Default summarizer when a request does not pick one.
    #[arg(long, env = "SUMMARIZER_MODE", default_value = "local", value_parser = parse_mode)]
    mode: Mode,

    /// Sentence ranking used by the local summarizer: text-rank, frequency or lsa.
    #[arg(long, env = "SUMMARIZER_RANKING", default_value = "text-rank")]
    ranking: RankingAlgorithm,

    /// API key for the remote summarizer. Remote requests fall back to the
    /// local summarizer when unset.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = summarize_core::clients::openai::DEFAULT_BASE_URL)]
    openai_base_url: String,

    #[arg(long, env = "OPENAI_MODEL", default_value = summarize_core::clients::openai::DEFAULT_MODEL)]
    openai_model: String,

    /// Per-call timeout for the remote summarizer, in seconds.
    #[arg(long, env = "REMOTE_TIMEOUT_SECS", default_value = "30")]
    remote_timeout_secs: u64,

    /// Budget for a whole remote summary, chunk calls and merge included,
    /// in seconds. Slower requests fall back to the local summarizer.
    #[arg(long, env = "REMOTE_DEADLINE_SECS", default_value = "120")]
    remote_deadline_secs: u64,

    /// Inputs needing more remote chunks than this use the local summarizer.
    #[arg(long, env = "REMOTE_MAX_CHUNKS", default_value = "16")]
    remote_max_chunks: usize,

    /// Most sentences handed to the local ranker; longer inputs are narrowed
    /// by term frequency first.
    #[arg(long, env = "MAX_RANKED_SENTENCES", default_value = "1000")]
    max_ranked_sentences: usize,

    /// Largest accepted upload or pasted text, in bytes.
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value = "26214400")]
    max_upload_bytes: usize,

    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    #[arg(long, env = "PORT", default_value = "5002")]
    port: u16,
}

impl Cli {
    fn summarizer_config(&self) -> SummarizerConfig {
        SummarizerConfig {
            mode: self.mode,
            ranking: self.ranking,
            max_input_bytes: self.max_upload_bytes,
            options: SummaryOptions {
                max_ranked_sentences: self.max_ranked_sentences.max(1),
                remote_max_chunks: self.remote_max_chunks.max(1),
                remote_deadline: Duration::from_secs(self.remote_deadline_secs.max(1)),
                ..SummaryOptions::default()
            },
        }
    }

    fn remote_client(&self) -> Result<OpenAiClient, RemoteError> {
        OpenAiClient::new(OpenAiConfig {
            base_url: self.openai_base_url.clone(),
            api_key: self.openai_api_key.clone(),
            model: self.openai_model.clone(),
            timeout: Duration::from_secs(self.remote_timeout_secs.max(1)),
            ..OpenAiConfig::default()
        })
    }
}

fn parse_mode(value: &str) -> Result<Mode, String> {
    value.parse::<Mode>().map_err(|error| error.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = cli.summarizer_config();

    let remote = match cli.remote_client() {
        Ok(client) => {
            info!(endpoint = %client.endpoint(), model = %cli.openai_model, "remote summarizer enabled");
            let client: Arc<dyn GenerativeClient> = Arc::new(client);
            Some(RemoteSummarizer::new(client, &config.options))
        }
        Err(error) => {
            if config.mode == Mode::Remote {
                warn!(%error, "remote mode is the default but the remote summarizer is unavailable");
            } else {
                info!(%error, "remote summarizer disabled");
            }
            None
        }
    };

    let orchestrator = SummaryOrchestrator::new(config, remote)?;
    let app = routes::router(Arc::new(orchestrator));

    let listener = tokio::net::TcpListener::bind((cli.host.as_str(), cli.port)).await?;
    let addr = listener.local_addr()?;

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        %addr,
        mode = %cli.mode,
        ranking = %cli.ranking,
        "summarize-web boot"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("summarize-web stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
