use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Shutdown coordinator listening for SIGINT and SIGTERM.
///
/// The first signal stops admission of new batches via the cancellation
/// token; the in-flight batch drains and the progress record is flushed
/// before the process exits cleanly. A second signal exits immediately,
/// with no flush guarantee. That escape hatch is deliberate.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    cancel_token: CancellationToken,
    shutdown_requested: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    pub fn new(cancel_token: CancellationToken) -> Self {
        Self {
            cancel_token,
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn register_handlers(&self) {
        let cancel_token = self.cancel_token.clone();
        let shutdown_flag = self.shutdown_requested.clone();

        tokio::spawn(async move {
            wait_for_signal().await;
            shutdown_flag.store(true, Ordering::SeqCst);
            cancel_token.cancel();
            info!("Shutdown requested; finishing the in-flight batch and checkpointing");

            wait_for_signal().await;
            warn!("Second shutdown signal; exiting immediately without checkpoint");
            std::process::exit(ExitCode::ShutdownForced.as_i32());
        });
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }
}

async fn wait_for_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }
}

/// Exit codes for the CLI application. A graceful first-signal shutdown
/// checkpoints and exits `Success`; only the forced second signal uses the
/// SIGINT convention.
#[derive(Debug, Clone, Copy)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    ShutdownForced = 130,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}
