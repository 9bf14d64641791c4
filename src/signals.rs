//! Operator signals during a scan.
//!
//! Ctrl+C requests a stop. On Unix, Ctrl+Z (`SIGTSTP`) toggles pause instead
//! of suspending the process.

use crate::output;
use crate::scanner::ScanControl;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Whether this platform can pause a scan from the keyboard.
pub const fn pause_supported() -> bool {
    cfg!(unix)
}

/// Signal listeners bound to one scan. Dropping this stops listening.
pub struct SignalHandlers {
    tasks: Vec<JoinHandle<()>>,
}

impl Drop for SignalHandlers {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Start forwarding operator signals to `control`.
pub fn install(control: &ScanControl) -> SignalHandlers {
    let mut tasks = vec![tokio::spawn(stop_on_ctrl_c(control.clone()))];

    #[cfg(unix)]
    tasks.push(tokio::spawn(pause_on_tstp(control.clone())));

    SignalHandlers { tasks }
}

async fn stop_on_ctrl_c(control: ScanControl) {
    loop {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            return;
        }
        if control.request_stop() {
            output::print_stop_notice();
        }
    }
}

#[cfg(unix)]
async fn pause_on_tstp(control: ScanControl) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut tstp = match signal(SignalKind::from_raw(libc::SIGTSTP)) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "failed to listen for SIGTSTP, pause disabled");
            return;
        }
    };

    while tstp.recv().await.is_some() {
        if control.is_stopped() {
            continue;
        }
        let paused = control.toggle_pause();
        debug!(paused, "pause toggled");
        output::print_pause_state(paused);
    }
}
