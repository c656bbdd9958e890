//! Cancellable timers for the widget.
//!
//! Each timer runs as a tokio task that posts a [`TimerEvent`] into a
//! channel drained by the controller. Timers stop when their
//! [`TaskHandle`] is cancelled or dropped.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep, Instant};
use tracing::debug;

/// What a timer is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Layout has settled; scroll the message list to the latest entry.
    ScrollDue,
    /// The simulated reply delay elapsed.
    ReplyDue,
    /// Reveal one more character.
    RevealTick,
}

/// Event posted by a timer task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvent {
    /// Id of the task that posted the event.
    pub task: u64,
    /// Timer purpose.
    pub kind: TimerKind,
}

/// Handle to a running timer task.
///
/// Dropping the handle closes its cancel channel, which stops the task.
#[derive(Debug)]
pub struct TaskHandle {
    id: u64,
    cancel_tx: mpsc::Sender<()>,
}

impl TaskHandle {
    /// Id carried by events this task posts.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stop the task. Returns true if the cancel signal was delivered.
    pub fn cancel(&self) -> bool {
        self.cancel_tx.try_send(()).is_ok()
    }

    /// Whether `event` was posted by this task.
    pub fn owns(&self, event: &TimerEvent) -> bool {
        event.task == self.id
    }
}

/// Spawns timer tasks that report into one channel.
#[derive(Debug)]
pub struct Scheduler {
    event_tx: mpsc::UnboundedSender<TimerEvent>,
    next_id: u64,
}

impl Scheduler {
    /// Create a scheduler and the receiver its events arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (
            Self {
                event_tx,
                next_id: 1,
            },
            event_rx,
        )
    }

    /// Post `kind` once after `delay`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn after(&mut self, delay: Duration, kind: TimerKind) -> TaskHandle {
        let (id, cancel_tx, mut cancel_rx) = self.allocate();
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel_rx.recv() => {
                    debug!(task = id, ?kind, "Timer cancelled");
                }
                () = sleep(delay) => {
                    let _ = event_tx.send(TimerEvent { task: id, kind });
                }
            }
        });

        TaskHandle { id, cancel_tx }
    }

    /// Post `kind` every `period`, starting one period from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn every(&mut self, period: Duration, kind: TimerKind) -> TaskHandle {
        let (id, cancel_tx, mut cancel_rx) = self.allocate();
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = cancel_rx.recv() => {
                        debug!(task = id, ?kind, "Periodic timer cancelled");
                        break;
                    }
                    _ = ticks.tick() => {
                        if event_tx.send(TimerEvent { task: id, kind }).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        TaskHandle { id, cancel_tx }
    }

    fn allocate(&mut self) -> (u64, mpsc::Sender<()>, mpsc::Receiver<()>) {
        let id = self.next_id;
        self.next_id += 1;
        let (cancel_tx, cancel_rx) = mpsc::channel(1);
        (id, cancel_tx, cancel_rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut mpsc::UnboundedReceiver<TimerEvent>) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn test_after_fires_once_after_delay() {
        let (mut scheduler, mut rx) = Scheduler::new();
        let handle = scheduler.after(Duration::from_millis(1000), TimerKind::ReplyDue);

        sleep(Duration::from_millis(999)).await;
        assert!(drain(&mut rx).is_empty());

        sleep(Duration::from_millis(2)).await;
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(handle.owns(&events[0]));
        assert_eq!(events[0].kind, TimerKind::ReplyDue);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_firing() {
        let (mut scheduler, mut rx) = Scheduler::new();
        let handle = scheduler.after(Duration::from_millis(100), TimerKind::ScrollDue);

        assert!(handle.cancel());
        sleep(Duration::from_millis(500)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_prevents_firing() {
        let (mut scheduler, mut rx) = Scheduler::new();
        drop(scheduler.after(Duration::from_millis(100), TimerKind::ReplyDue));

        sleep(Duration::from_millis(500)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_ticks_until_cancelled() {
        let (mut scheduler, mut rx) = Scheduler::new();
        let handle = scheduler.every(Duration::from_millis(50), TimerKind::RevealTick);

        sleep(Duration::from_millis(175)).await;
        let events = drain(&mut rx);
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| handle.owns(e)));

        drop(handle);
        sleep(Duration::from_millis(500)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_ids_are_unique() {
        let (mut scheduler, _rx) = Scheduler::new();
        let a = scheduler.after(Duration::from_millis(10), TimerKind::ScrollDue);
        let b = scheduler.after(Duration::from_millis(10), TimerKind::ScrollDue);
        assert_ne!(a.id(), b.id());
    }
}
