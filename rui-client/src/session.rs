//! A live connection to the render server.
//!
//! Wires the transport to the outbound muxer, the inbound demuxer, the
//! frame sink and the control panel, then runs the reception task until
//! the console finishes.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rui_core::{
    Connection, ConnectionInfo, ControlPanel, Demuxer, FrameBufferSink, ModelMenu, Muxer,
    RuiError, WriterTask,
};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::console::Console;

/// How long shutdown waits for queued packets such as `stop` to be written.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

pub struct Session {
    info: ConnectionInfo,
    panel: ControlPanel<Muxer>,
    sink: Arc<FrameBufferSink>,
    reception: JoinHandle<()>,
    writer: WriterTask,
}

impl Session {
    /// Connect to the configured server and start receiving.
    pub async fn connect(config: &ClientConfig, models: ModelMenu) -> Result<Self, RuiError> {
        let info = ConnectionInfo::new(config.network.host.clone(), config.network.port);
        let timeout = Duration::from_millis(config.network.timeout_ms);

        info!("connecting to server at {info}");
        let conn = Connection::connect(&info, timeout).await?;
        info!("connected to {info}");

        Ok(Self::start(info, conn, config.controls.devices.clone(), models))
    }

    /// Wire an established connection. Subscriptions are registered
    /// before the reception task starts, and the panel publishes its
    /// initial values here.
    pub fn start(
        info: ConnectionInfo,
        conn: Connection,
        devices: Vec<String>,
        models: ModelMenu,
    ) -> Self {
        let (tx, rx, writer) = conn.into_split();

        let mut demux = Demuxer::new();
        let sink = FrameBufferSink::new();
        sink.subscribe(&mut demux);
        let panel = ControlPanel::new(Muxer::new(tx), &mut demux, devices, models);
        debug!(?demux, "subscriptions registered");

        let reception = tokio::spawn(demux.run(rx));

        Self {
            info,
            panel,
            sink,
            reception,
            writer,
        }
    }

    pub fn sink(&self) -> &Arc<FrameBufferSink> {
        &self.sink
    }

    /// Run the console on a blocking thread until it exits, then shut
    /// the session down.
    pub async fn run<R, W>(self, input: R, output: W, save_path: PathBuf) -> Result<(), RuiError>
    where
        R: BufRead + Send + 'static,
        W: Write + Send + 'static,
    {
        let Self {
            info,
            panel,
            sink,
            reception,
            writer,
        } = self;

        let console = Console::new(panel, Arc::clone(&sink), save_path);
        let panel = tokio::task::spawn_blocking(move || console.run(input, output))
            .await
            .map_err(|e| RuiError::Other(format!("console thread failed: {e}")))?;

        Self {
            info,
            panel,
            sink,
            reception,
            writer,
        }
        .shutdown()
        .await;
        Ok(())
    }

    /// Stop publishing first and let the writer flush what is queued, then
    /// tear down the reception side.
    pub async fn shutdown(self) {
        drop(self.panel);
        if !self.writer.flushed(FLUSH_TIMEOUT).await {
            warn!("outbound queue not flushed within {FLUSH_TIMEOUT:?}");
        }
        self.reception.abort();
        // Aborted is the expected outcome here.
        let _ = self.reception.await;
        info!("disconnected from {}", self.info);
    }
}
