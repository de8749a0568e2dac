//! One-shot, broadcast cancellation shared by every scheduler loop
//!
//! A [`ShutdownTrigger`] fires once; every [`ShutdownSignal`] cloned from the
//! same channel observes it, including signals cloned after the trigger fired.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error};

/// Write side of the cancellation channel
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    sender: Arc<watch::Sender<bool>>,
}

/// Read side of the cancellation channel
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

/// Create a connected trigger/signal pair
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (sender, receiver) = watch::channel(false);
    (
        ShutdownTrigger {
            sender: Arc::new(sender),
        },
        ShutdownSignal { receiver },
    )
}

impl ShutdownTrigger {
    /// Request shutdown; triggering more than once has no further effect
    pub fn trigger(&self) {
        let already = self.sender.send_replace(true);
        if !already {
            debug!("shutdown triggered");
        }
    }
}

impl ShutdownSignal {
    /// A signal that never fires
    pub fn never() -> Self {
        let (_, signal) = shutdown_channel();
        signal
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Wait until the trigger fires
    ///
    /// If every trigger is dropped without firing, this never completes.
    pub async fn cancelled(&mut self) {
        if self.receiver.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Wait for Ctrl-C, or SIGTERM on unix
///
/// Never completes if no interrupt handler can be installed.
pub async fn os_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(terminate) => terminate,
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                wait_for_ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = wait_for_ctrl_c() => {}
            _ = terminate.recv() => debug!("received SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => debug!("received interrupt"),
        Err(e) => {
            error!("failed to listen for interrupt: {e}");
            std::future::pending::<()>().await;
        }
    }
}
