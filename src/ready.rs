//! One-shot gate opened when the gateway reports `Ready`.
//!
//! Background tasks hold a [`ReadyGate`] and wait on it before their first tick.
//! The framework setup callback owns the single [`ReadyTrigger`].

use tokio::sync::watch;

pub struct ReadyTrigger<T> {
    tx: watch::Sender<Option<T>>,
}

#[derive(Clone)]
pub struct ReadyGate<T> {
    rx: watch::Receiver<Option<T>>,
}

pub fn ready_gate<T: Clone>() -> (ReadyTrigger<T>, ReadyGate<T>) {
    let (tx, rx) = watch::channel(None);
    (ReadyTrigger { tx }, ReadyGate { rx })
}

impl<T> ReadyTrigger<T> {
    /// Open the gate. Later calls are ignored.
    pub fn open(&self, value: T) {
        self.tx.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(value);
            true
        });
    }
}

impl<T: Clone> ReadyGate<T> {
    /// Wait until the gate opens. Returns `None` if the trigger was dropped unopened.
    pub async fn wait(&mut self) -> Option<T> {
        let value = self.rx.wait_for(Option::is_some).await.ok()?;
        value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_gate_blocks_until_opened() {
        let (trigger, gate) = ready_gate::<u32>();

        let mut waiting = gate.clone();
        let blocked = timeout(Duration::from_millis(50), waiting.wait()).await;
        assert!(blocked.is_err(), "gate should not open before the trigger fires");

        let mut a = gate.clone();
        let mut b = gate;
        let task = tokio::spawn(async move { (a.wait().await, b.wait().await) });

        trigger.open(7);
        assert_eq!(task.await.unwrap(), (Some(7), Some(7)));
    }

    #[tokio::test]
    async fn test_gate_opens_once() {
        let (trigger, mut gate) = ready_gate::<u32>();
        trigger.open(1);
        trigger.open(2);
        assert_eq!(gate.wait().await, Some(1));
    }

    #[tokio::test]
    async fn test_dropped_trigger_releases_waiters() {
        let (trigger, mut gate) = ready_gate::<u32>();
        drop(trigger);
        assert_eq!(gate.wait().await, None);
    }
}
