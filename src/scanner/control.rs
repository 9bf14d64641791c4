//! Cooperative stop/pause control shared by every worker of a scan run.
//!
//! State lives in a `tokio::sync::watch` channel so workers can block on a
//! change instead of polling: a paused worker sleeps until the pause is
//! toggled off or a stop is requested.

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ControlState {
    stopped: bool,
    paused: bool,
}

/// Handle to one run's control state. Clones share the same state.
///
/// Stop is one-way for the lifetime of the handle; pause toggles.
#[derive(Debug, Clone)]
pub struct ScanControl {
    state: Arc<watch::Sender<ControlState>>,
}

impl ScanControl {
    /// Fresh state: not stopped, not paused.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ControlState::default());
        Self {
            state: Arc::new(tx),
        }
    }

    /// Request an immediate stop. Returns `true` if this call set the flag.
    pub fn request_stop(&self) -> bool {
        self.state.send_if_modified(|state| {
            if state.stopped {
                false
            } else {
                state.stopped = true;
                true
            }
        })
    }

    /// Flip the pause flag and return the new value.
    pub fn toggle_pause(&self) -> bool {
        let mut paused = false;
        self.state.send_modify(|state| {
            state.paused = !state.paused;
            paused = state.paused;
        });
        paused
    }

    pub fn is_stopped(&self) -> bool {
        self.state.borrow().stopped
    }

    pub fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    /// Block while paused. Returns `false` if a stop was requested, in
    /// which case the caller must abandon its work.
    pub async fn wait_while_paused(&self) -> bool {
        let mut rx = self.state.subscribe();
        let proceed = match rx.wait_for(|state| state.stopped || !state.paused).await {
            Ok(state) => !state.stopped,
            Err(_) => false,
        };
        proceed
    }

    /// Resolves once a stop has been requested.
    pub async fn stopped(&self) {
        let mut rx = self.state.subscribe();
        let _ = rx.wait_for(|state| state.stopped).await;
    }
}

impl Default for ScanControl {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[test]
    fn test_initial_state() {
        let control = ScanControl::new();
        assert!(!control.is_stopped());
        assert!(!control.is_paused());
    }

    #[test]
    fn test_stop_is_one_way() {
        let control = ScanControl::new();
        assert!(control.request_stop());
        assert!(!control.request_stop());
        assert!(control.clone().is_stopped());
    }

    #[test]
    fn test_pause_toggles() {
        let control = ScanControl::new();
        assert!(control.toggle_pause());
        assert!(control.is_paused());
        assert!(!control.toggle_pause());
        assert!(!control.is_paused());
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_when_running() {
        let control = ScanControl::new();
        let proceed = timeout(Duration::from_millis(50), control.wait_while_paused())
            .await
            .unwrap();
        assert!(proceed);
    }

    #[tokio::test]
    async fn test_resume_wakes_paused_waiter() {
        let control = ScanControl::new();
        control.toggle_pause();

        let waiter = {
            let control = control.clone();
            tokio::spawn(async move { control.wait_while_paused().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        control.toggle_pause();
        let proceed = timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
        assert!(proceed);
    }

    #[tokio::test]
    async fn test_stop_releases_paused_waiter() {
        let control = ScanControl::new();
        control.toggle_pause();

        let waiter = {
            let control = control.clone();
            tokio::spawn(async move { control.wait_while_paused().await })
        };

        control.request_stop();
        let proceed = timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
        assert!(!proceed);
    }

    #[tokio::test]
    async fn test_stopped_future() {
        let control = ScanControl::new();
        let stopper = control.clone();
        tokio::spawn(async move { stopper.request_stop() });
        timeout(Duration::from_secs(1), control.stopped()).await.unwrap();
    }
}
