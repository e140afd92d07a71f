//! Headless host bridge binary.
//!
//! Loads the config, wires the Gemini backend and host-driven context and
//! speech into an [`OverlayStore`], then speaks newline-delimited JSON over
//! stdin/stdout. All diagnostics go to stderr (and optionally a log file).
//!
//! Usage: `screenwise-host [CONFIG_PATH]`

use std::path::PathBuf;
use std::sync::Arc;

use screenwise::ai::gemini::{GeminiConfig, GeminiTextService};
use screenwise::config::ScreenwiseConfig;
use screenwise::context::SharedContext;
use screenwise::credentials::{ConfigSecrets, CredentialManager, create_manager};
use screenwise::host::{HostBridge, HostSpeechInput, run_stdio_bridge};
use screenwise::overlay::{Collaborators, OverlayStore, StoreOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(ScreenwiseConfig::default_config_path);
    let from_file = config_path.exists();
    let config = ScreenwiseConfig::load_or_default(&config_path)
        .map_err(|e| anyhow::anyhow!("failed to load {}: {e}", config_path.display()))?;

    screenwise::logging::init(&config.logging)?;
    if !from_file {
        tracing::info!(path = %config_path.display(), "no config file; using defaults");
    }
    tracing::info!(config = %config_path.display(), model = %config.ai.model, "screenwise-host starting");

    let credentials: Arc<dyn CredentialManager> = Arc::from(create_manager());
    let secrets = ConfigSecrets::new(config.ai.api_key.clone(), credentials);
    let ai = GeminiTextService::new(GeminiConfig::from(&config.ai), Arc::new(secrets));

    let context = SharedContext::new();
    let (speech, recognizer) = HostSpeechInput::new();
    let speech = Arc::new(speech);

    let store = OverlayStore::new(
        Collaborators {
            context: Arc::new(context.clone()),
            ai: Arc::new(ai),
            speech: speech.clone(),
        },
        StoreOptions::from(&config),
    )?;

    run_stdio_bridge(
        HostBridge {
            store,
            context,
            speech,
        },
        recognizer,
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "screenwise-host exited with error");
        anyhow::anyhow!("screenwise-host failed: {e}")
    })?;

    tracing::info!("screenwise-host shut down cleanly");
    Ok(())
}
