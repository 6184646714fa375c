//! gesture-daemon: turns head and eye gestures into desktop macros
//!
//! Reads per-frame head-pose and eye-state classifications from an external
//! landmark tracker on stdin and provides:
//! - Debounced, validated gesture recognition with a zoom toggle latch
//! - Macro dispatch, written as JSON lines on stdout
//! - IPC server for status queries, mode changes and gesture notifications
//!
//! Out of scope: camera capture, landmark detection, and injecting the
//! keystrokes into the OS.

mod config;
mod dispatch;
mod events;
mod gesture;
mod ipc;
mod lifecycle;
mod source;

use anyhow::Result;
use tokio::io::BufReader;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::dispatch::{Dispatcher, JsonLinesSink, Shortcuts};
use crate::events::DaemonEvent;
use crate::gesture::{GestureSession, SessionStatus};
use crate::ipc::Server;
use crate::lifecycle::ShutdownSignal;
use crate::source::FrameReader;

#[tokio::main]
async fn main() -> Result<()> {
    // Stdout carries dispatch records, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "gesture-daemon starting"
    );

    // Load configuration
    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(
        ?config.socket_path,
        head_frames = config.thresholds.head_frames.get(),
        eye_frames = config.thresholds.eye_frames.get(),
        require_wake = config.require_wake,
        "configuration loaded"
    );

    let shortcuts = match &config.shortcuts_path {
        Some(path) => Shortcuts::load(path)?,
        None => Shortcuts::defaults(),
    };

    let mut shutdown = ShutdownSignal::new()?;

    // Frame reader -> gesture session
    let (source_tx, source_rx) = mpsc::channel(64);
    // IPC server -> gesture session
    let (control_tx, control_rx) = mpsc::channel(8);
    // Gesture session -> dispatcher and IPC subscribers
    let (event_tx, _event_rx) = broadcast::channel::<DaemonEvent>(64);
    // Gesture session -> IPC status queries
    let (status_tx, status_rx) = watch::channel(SessionStatus::default());

    let mut session = GestureSession::new(
        config.thresholds,
        config.require_wake,
        event_tx.clone(),
        status_tx,
    );

    let mut dispatcher = Dispatcher::new(shortcuts, JsonLinesSink::new(std::io::stdout()));
    let dispatch_rx = event_tx.subscribe();
    let dispatch_task = tokio::spawn(async move { dispatcher.run(dispatch_rx).await });

    let reader = FrameReader::new(BufReader::new(tokio::io::stdin()));
    let reader_task = tokio::spawn(async move {
        if let Err(e) = reader.run(source_tx).await {
            error!(error = %e, "symbol source failed");
        }
    });

    let server = Server::new(&config.socket_path, status_rx, control_tx, event_tx.subscribe())?;
    // The session now holds the only sender
    drop(event_tx);

    info!("daemon initialized, entering main loop");

    tokio::select! {
        // Runs until the symbol source closes
        _ = session.run(source_rx, control_rx) => {
            info!("gesture session exited");
        }

        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
    }

    info!("shutting down...");

    reader_task.abort();
    server.shutdown().await;

    // Dropping the last event sender lets the dispatcher drain and exit
    drop(session);
    if let Err(e) = dispatch_task.await {
        error!(?e, "dispatcher task failed");
    }

    info!("gesture-daemon stopped");

    Ok(())
}
