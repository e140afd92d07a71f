//! Stdin/stdout JSON bridge between the engine and the native host.
//!
//! Reads newline-delimited [`CommandEnvelope`]s and writes
//! [`EventEnvelope`]s. Stdout is reserved for the protocol; diagnostics go
//! to stderr through `tracing`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::StreamExt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::{Mutex, broadcast, mpsc};

use super::contract::{CommandEnvelope, EventEnvelope, HostCommand, HostEvent, RecognizerControl};
use super::speech::HostSpeechInput;
use crate::context::SharedContext;
use crate::error::{Result, ScreenwiseError};
use crate::overlay::OverlayStore;

/// Everything the bridge drives.
#[derive(Clone)]
pub struct HostBridge {
    pub store: OverlayStore,
    pub context: SharedContext,
    pub speech: Arc<HostSpeechInput>,
}

/// Serialized, sequenced event output.
struct EventWriter<W> {
    out: Mutex<W>,
    seq: AtomicU64,
}

impl<W: AsyncWrite + Unpin> EventWriter<W> {
    fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            seq: AtomicU64::new(0),
        }
    }

    async fn send(&self, event: HostEvent) -> Result<()> {
        let mut out = self.out.lock().await;
        let envelope = EventEnvelope::new(self.seq.fetch_add(1, Ordering::Relaxed), event);
        let json = serde_json::to_string(&envelope)
            .map_err(|e| ScreenwiseError::Host(format!("failed to serialize event: {e}")))?;
        out.write_all(json.as_bytes()).await?;
        out.write_all(b"\n").await?;
        out.flush().await?;
        Ok(())
    }
}

/// Run the bridge over the process's stdin and stdout.
pub async fn run_stdio_bridge(
    bridge: HostBridge,
    recognizer: mpsc::UnboundedReceiver<RecognizerControl>,
) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = BufWriter::new(tokio::io::stdout());
    run_bridge(bridge, recognizer, stdin, stdout).await
}

/// Run the bridge until the input closes or a shutdown command arrives.
///
/// Three forwarders write to the output concurrently with the reader:
/// state snapshots, side effects, and recognizer requests.
pub async fn run_bridge<R, W>(
    bridge: HostBridge,
    mut recognizer: mpsc::UnboundedReceiver<RecognizerControl>,
    input: R,
    output: W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let writer = Arc::new(EventWriter::new(output));

    let state_writer = Arc::clone(&writer);
    let mut states = bridge.store.state_stream();
    let state_task = tokio::spawn(async move {
        while let Some(state) = states.next().await {
            if let Err(e) = state_writer.send(HostEvent::State { state }).await {
                tracing::warn!(error = %e, "failed to write state; stopping state forwarder");
                break;
            }
        }
    });

    let effect_writer = Arc::clone(&writer);
    let mut effects = bridge.store.subscribe_effects();
    let effect_task = tokio::spawn(async move {
        loop {
            match effects.recv().await {
                Ok(effect) => {
                    if let Err(e) = effect_writer.send(HostEvent::Effect { effect }).await {
                        tracing::warn!(error = %e, "failed to write effect; stopping effect forwarder");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "effect forwarder lagged; effects were dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let recognizer_writer = Arc::clone(&writer);
    let recognizer_task = tokio::spawn(async move {
        while let Some(control) = recognizer.recv().await {
            if let Err(e) = recognizer_writer
                .send(HostEvent::Recognizer { control })
                .await
            {
                tracing::warn!(error = %e, "failed to write recognizer request");
                break;
            }
        }
    });

    let result = run_reader(&bridge, input, &writer).await;

    state_task.abort();
    effect_task.abort();
    recognizer_task.abort();
    result
}

async fn run_reader<R, W>(bridge: &HostBridge, input: R, writer: &EventWriter<W>) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let envelope = match CommandEnvelope::parse(trimmed) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(error = %e, "rejected command line");
                writer
                    .send(HostEvent::Error {
                        message: e.to_string(),
                    })
                    .await?;
                continue;
            }
        };

        match envelope.command {
            HostCommand::Intent { intent } => bridge.store.dispatch(intent),
            HostCommand::Context { text } => bridge.context.set(text),
            HostCommand::Speech { event } => {
                bridge.speech.push(event);
            }
            HostCommand::Shutdown => {
                tracing::info!("shutdown received; stopping host bridge");
                return Ok(());
            }
        }
    }
    tracing::info!("input closed; stopping host bridge");
    Ok(())
}
