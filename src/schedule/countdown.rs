use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, interval};
use tracing::debug;

/// Event produced once per second by a running countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    /// Seconds left before the countdown elapses
    Tick(u32),
    Elapsed,
}

/// Outcome of a confirmation countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Cancelled,
}

/// A one-second ticker that is stopped by dropping its handle
///
/// The handle owns both the ticker task and the receiving end, so nothing
/// can be observed from a countdown once it has been dropped.
pub struct Countdown {
    events: mpsc::Receiver<CountdownEvent>,
    task: JoinHandle<()>,
}

impl Countdown {
    /// Start counting down from `seconds`; the first tick is immediate
    pub fn start(seconds: u32) -> Self {
        let (tx, events) = mpsc::channel(1);

        let task = tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(1));
            for remaining in (1..=seconds).rev() {
                ticker.tick().await;
                if tx.send(CountdownEvent::Tick(remaining)).await.is_err() {
                    return;
                }
            }
            ticker.tick().await;
            let _ = tx.send(CountdownEvent::Elapsed).await;
        });

        Self { events, task }
    }

    /// Next event, or `None` once the countdown is over
    pub async fn next(&mut self) -> Option<CountdownEvent> {
        self.events.recv().await
    }

    /// Stop the countdown
    pub fn cancel(self) {}
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Run `countdown` until it elapses or `cancel` resolves, whichever is first
///
/// `on_tick` sees every remaining-seconds value. A countdown that stops
/// without elapsing counts as cancelled.
pub async fn confirm<F, T>(mut countdown: Countdown, cancel: F, mut on_tick: T) -> Confirmation
where
    F: Future<Output = ()>,
    T: FnMut(u32),
{
    tokio::pin!(cancel);

    loop {
        tokio::select! {
            biased;
            _ = &mut cancel => {
                debug!("Countdown cancelled");
                countdown.cancel();
                return Confirmation::Cancelled;
            }
            event = countdown.next() => match event {
                Some(CountdownEvent::Tick(remaining)) => on_tick(remaining),
                Some(CountdownEvent::Elapsed) => return Confirmation::Confirmed,
                None => return Confirmation::Cancelled,
            }
        }
    }
}
