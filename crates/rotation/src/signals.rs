//! Signal handling for graceful shutdown.
//!
//! Supports SIGINT and SIGTERM on Unix and Ctrl+C on Windows.

use tokio::signal;
use tracing::info;

/// Waits until a termination signal arrives.
///
/// # Returns
///
/// `Ok(())` once SIGINT or SIGTERM (Ctrl+C on Windows) is received, or an
/// error if the signal handlers could not be installed.
///
/// # Example
///
/// ```rust,no_run
/// use lib_rotation::signals::wait_for_shutdown_signal;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     wait_for_shutdown_signal().await?;
///     Ok(())
/// }
/// ```
pub async fn wait_for_shutdown_signal() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(unix)]
    {
        use signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => (),
            _ = sigterm.recv() => ()
        }
    }

    #[cfg(windows)]
    signal::ctrl_c().await?;

    info!("📡 Received shutdown signal - stopping rotation");
    Ok(())
}
