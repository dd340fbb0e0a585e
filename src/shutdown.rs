//! Shutdown coordination.
//!
//! A [`ShutdownController`] raises a one-shot notification that the producer
//! loop observes through its [`ShutdownSignal`]. The notification is latched:
//! a signal created or polled after the trigger still sees it.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Debug)]
pub struct ShutdownController {
    tx: watch::Sender<bool>,
}

#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownController {
    pub fn new() -> (Self, ShutdownSignal) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, ShutdownSignal { rx })
    }

    /// Requests shutdown. Later calls are no-ops.
    pub fn trigger(&self) {
        self.tx.send_if_modified(|requested| {
            if *requested {
                false
            } else {
                *requested = true;
                true
            }
        });
    }

    /// Spawns a task that triggers shutdown on the first OS termination
    /// signal.
    pub fn listen_for_os_signals(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            match wait_for_os_signal().await {
                Ok(()) => info!("Termination signal received, shutting down"),
                Err(e) => warn!("Failed to install signal handlers, shutting down: {}", e),
            }
            self.trigger();
        })
    }
}

impl ShutdownSignal {
    /// Resolves once shutdown has been requested, or when the controller is
    /// gone and no request can arrive any more.
    pub async fn notified(&mut self) {
        let _ = self.rx.wait_for(|requested| *requested).await;
    }
}

/// Completes on SIGINT, SIGTERM, SIGQUIT or Ctrl-C.
#[cfg(unix)]
pub async fn wait_for_os_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
pub async fn wait_for_os_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
