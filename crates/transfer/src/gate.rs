use std::sync::Arc;

use tokio::sync::watch;

/// Level-triggered pause gate.
///
/// While paused, every task inside [`wait_until_resumed`] suspends;
/// [`unpause`] releases all of them together. Repeated [`pause`] calls are
/// idempotent, and unpausing with no waiters is a no-op. There is no
/// timeout: a paused gate waits until it is unpaused.
///
/// [`pause`]: Self::pause
/// [`unpause`]: Self::unpause
/// [`wait_until_resumed`]: Self::wait_until_resumed
#[derive(Clone)]
pub struct PauseGate {
    paused: Arc<watch::Sender<bool>>,
}

impl PauseGate {
    /// Creates an unpaused gate.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            paused: Arc::new(tx),
        }
    }

    /// Pauses the gate.
    pub fn pause(&self) {
        self.paused.send_replace(true);
    }

    /// Unpauses the gate, releasing all current waiters.
    pub fn unpause(&self) {
        self.paused.send_replace(false);
    }

    /// Whether the gate is currently paused.
    pub fn is_paused(&self) -> bool {
        *self.paused.borrow()
    }

    /// Suspends until the gate is unpaused. Returns immediately when the
    /// gate is not paused.
    pub async fn wait_until_resumed(&self) {
        let mut rx = self.paused.subscribe();
        while *rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for PauseGate {
    fn default() -> Self {
        Self::new()
    }
}
