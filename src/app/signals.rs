//! Process signal wiring.

use profile_finder_core::ShutdownSignal;
use tracing::{info, warn};

/// Exit code used when a second signal cuts the grace period short.
const FORCED_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignalAction {
    Shutdown,
    ForceExit,
}

/// The first signal asks for a graceful stop; any later one exits at once.
fn action_for(previous_signals: usize) -> SignalAction {
    if previous_signals == 0 {
        SignalAction::Shutdown
    } else {
        SignalAction::ForceExit
    }
}

/// Sets `shutdown` on the first SIGINT / SIGTERM and exits on the second.
pub(crate) fn spawn_signal_listener(shutdown: ShutdownSignal) {
    tokio::spawn(async move {
        let mut received = 0;
        while wait_for_signal().await {
            match action_for(received) {
                SignalAction::Shutdown => {
                    eprintln!(
                        "\n[i] Shutdown requested... stopping after current operations \
                         (press Ctrl-C again to force quit)."
                    );
                    info!("shutdown requested by signal");
                    shutdown.request();
                }
                SignalAction::ForceExit => {
                    eprintln!("\n[!] Forced exit.");
                    warn!("second signal received, exiting without waiting");
                    std::process::exit(FORCED_EXIT_CODE);
                }
            }
            received += 1;
        }
    });
}

#[cfg(unix)]
async fn wait_for_signal() -> bool {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => tokio::select! {
            result = tokio::signal::ctrl_c() => result.is_ok(),
            received = terminate.recv() => received.is_some(),
        },
        Err(e) => {
            warn!(error = %e, "cannot listen for SIGTERM");
            tokio::signal::ctrl_c().await.is_ok()
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> bool {
    tokio::signal::ctrl_c().await.is_ok()
}
